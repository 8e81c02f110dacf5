use std::io::Write;

use flate2::write::DeflateDecoder;
use log::{debug, warn};

use crate::apk_zip::{CompressMethod, CENTRAL_DIRECTORY, CENTRAL_DIRECTORY_END, LOCAL_FILE_HEADER};
use crate::error::{Error, Result};
use crate::utils::{get_leu16_value, get_leu32_value};

/// One archive entry as read from the input stream, payload already inflated.
pub(crate) struct RawEntry {
    pub(crate) file_name: String,
    pub(crate) data: Vec<u8>,
    pub(crate) compress_method: CompressMethod,
}

/// Parses a zip byte stream into its entries, in central directory order.
pub(crate) fn read_entries(data: &[u8]) -> Result<Vec<RawEntry>> {
    if data.len() < 22 {
        return Err(Error::format(0, "too short for an end of central directory record"));
    }

    // The record sits at the tail, possibly followed by a comment.
    let mut seek_index: usize = 0;
    let eocd_offset = loop {
        let offset = data.len() - 22 - seek_index;
        if get_leu32_value(data, offset) == CENTRAL_DIRECTORY_END {
            break offset;
        }
        seek_index += 1;
        if data.len() < 22 + seek_index + 4 || seek_index > 65535 {
            return Err(Error::format(data.len(), "end of central directory not found"));
        }
    };

    let central_directory_offset = get_leu32_value(data, eocd_offset + 16) as usize;
    let dir_count = get_leu16_value(data, eocd_offset + 10);
    debug!(
        "archive: {} central directory records, directory at {:#x}",
        dir_count, central_directory_offset
    );

    let mut entries: Vec<RawEntry> = Vec::with_capacity(dir_count as usize);
    let mut current_offset = central_directory_offset;
    for _ in 0..dir_count {
        if current_offset + 46 > eocd_offset {
            return Err(Error::format(current_offset, "central directory record out of bounds"));
        }
        if get_leu32_value(data, current_offset) != CENTRAL_DIRECTORY {
            return Err(Error::format(current_offset, "bad central directory magic"));
        }

        let method_raw = get_leu16_value(data, current_offset + 10);
        let compressed_size = get_leu32_value(data, current_offset + 20) as usize;
        let file_name_len = get_leu16_value(data, current_offset + 28) as usize;
        let ext_len = get_leu16_value(data, current_offset + 30) as usize;
        let comment_len = get_leu16_value(data, current_offset + 32) as usize;
        let local_header_offset = get_leu32_value(data, current_offset + 42) as usize;

        let name_end = current_offset + 46 + file_name_len;
        if name_end > eocd_offset {
            return Err(Error::format(current_offset, "file name out of bounds"));
        }
        let file_name = match String::from_utf8(data[current_offset + 46..name_end].to_vec()) {
            Ok(v) => v,
            Err(_) => return Err(Error::format(current_offset, "file name is not valid utf-8")),
        };
        let compress_method = match CompressMethod::convert_from_u16(method_raw) {
            Some(m) => m,
            None => {
                warn!("entry {file_name}: unsupported compression method {method_raw}");
                return Err(Error::format(current_offset, "unsupported compression method"));
            }
        };

        let payload = inflate_entry(data, local_header_offset, compressed_size, compress_method)?;
        entries.push(RawEntry {
            file_name,
            data: payload,
            compress_method,
        });
        current_offset += 46 + file_name_len + ext_len + comment_len;
    }
    Ok(entries)
}

fn inflate_entry(
    data: &[u8],
    lfh_offset: usize,
    compressed_size: usize,
    method: CompressMethod,
) -> Result<Vec<u8>> {
    if lfh_offset + 30 > data.len() {
        return Err(Error::format(lfh_offset, "local file header out of bounds"));
    }
    if get_leu32_value(data, lfh_offset) != LOCAL_FILE_HEADER {
        return Err(Error::format(lfh_offset, "bad local file header magic"));
    }
    let file_name_len = get_leu16_value(data, lfh_offset + 26) as usize;
    let ext_len = get_leu16_value(data, lfh_offset + 28) as usize;
    let start = lfh_offset + 30 + file_name_len + ext_len;
    let end = start + compressed_size;
    if end > data.len() {
        return Err(Error::format(start, "entry data out of bounds"));
    }
    let raw = &data[start..end];
    match method {
        CompressMethod::Stored => Ok(raw.to_vec()),
        CompressMethod::Deflated => {
            let mut payload: Vec<u8> = Vec::new();
            let mut decoder = DeflateDecoder::new(&mut payload);
            decoder
                .write_all(raw)
                .map_err(|_| Error::format(start, "corrupt deflate stream"))?;
            decoder
                .finish()
                .map_err(|_| Error::format(start, "corrupt deflate stream"))?;
            Ok(payload)
        }
    }
}
