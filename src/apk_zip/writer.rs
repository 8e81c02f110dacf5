use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::apk_zip::{CompressMethod, CENTRAL_DIRECTORY, CENTRAL_DIRECTORY_END, LOCAL_FILE_HEADER};
use crate::error::Result;

// Data of Stored entries is kept 4-byte aligned, as installers expect.
const STORED_ALIGN: usize = 4;

/// One entry scheduled for serialization.
pub(crate) struct PendingEntry<'a> {
    pub(crate) file_name: &'a str,
    pub(crate) data: &'a [u8],
    pub(crate) compress_method: CompressMethod,
}

struct FileHeader<'a> {
    file_name: &'a str,
    compress_method: CompressMethod,
    origin_size: u32,
    compress_size: u32,
    crc32: u32,
}

impl<'a> FileHeader<'a> {
    fn write_cd<W: Write>(&self, mut writer: W, lfh_offset: u32) -> Result<usize> {
        writer.write_u32::<LittleEndian>(CENTRAL_DIRECTORY)?;
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(0)?; // flag
        writer.write_u16::<LittleEndian>(self.compress_method.value())?;
        writer.write_u32::<LittleEndian>(0)?; // modify
        writer.write_u32::<LittleEndian>(self.crc32)?;
        writer.write_u32::<LittleEndian>(self.compress_size)?;
        writer.write_u32::<LittleEndian>(self.origin_size)?;
        writer.write_u16::<LittleEndian>(self.file_name.len() as u16)?;
        writer.write_u16::<LittleEndian>(0)?; // ext len
        writer.write_u16::<LittleEndian>(0)?; // comment
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(0)?; // internal
        writer.write_u32::<LittleEndian>(0)?; // external
        writer.write_u32::<LittleEndian>(lfh_offset)?;
        writer.write_all(self.file_name.as_bytes())?;
        Ok(46 + self.file_name.len())
    }

    fn write_lfh<W: Write>(&self, mut writer: W, offset: usize) -> Result<usize> {
        let header_len = 30 + self.file_name.len();
        let align_count: usize = if self.compress_method != CompressMethod::Stored {
            0
        } else {
            (STORED_ALIGN - ((offset + header_len) % STORED_ALIGN)) % STORED_ALIGN
        };
        writer.write_u32::<LittleEndian>(LOCAL_FILE_HEADER)?;
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(self.compress_method.value())?;
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_u32::<LittleEndian>(self.crc32)?;
        writer.write_u32::<LittleEndian>(self.compress_size)?;
        writer.write_u32::<LittleEndian>(self.origin_size)?;
        writer.write_u16::<LittleEndian>(self.file_name.len() as u16)?;
        writer.write_u16::<LittleEndian>(align_count as u16)?;
        writer.write_all(self.file_name.as_bytes())?;
        for _ in 0..align_count {
            writer.write_u8(0)?;
        }
        Ok(header_len + align_count)
    }
}

/// Serializes entries in the given order into a complete zip stream.
pub(crate) fn write_archive<'a, I>(entries: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = PendingEntry<'a>>,
{
    let mut out: Vec<u8> = Vec::new();
    let mut central_directory_data: Vec<u8> = Vec::new();
    let mut current_offset: usize = 0;
    let mut file_count: u16 = 0;

    for entry in entries {
        file_count += 1;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(entry.data);
        let crc32 = hasher.finalize();

        let compressed: Option<Vec<u8>> = match entry.compress_method {
            CompressMethod::Stored => None,
            CompressMethod::Deflated => {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(entry.data)?;
                Some(encoder.finish()?)
            }
        };

        let header = FileHeader {
            file_name: entry.file_name,
            compress_method: entry.compress_method,
            origin_size: entry.data.len() as u32,
            compress_size: compressed.as_ref().map_or(entry.data.len(), Vec::len) as u32,
            crc32,
        };
        header.write_cd(&mut central_directory_data, current_offset as u32)?;
        current_offset += header.write_lfh(&mut out, current_offset)?;

        match &compressed {
            Some(data) => {
                out.write_all(data)?;
                current_offset += data.len();
            }
            None => {
                out.write_all(entry.data)?;
                current_offset += entry.data.len();
            }
        }
    }

    let central_directory_offset = current_offset as u32;
    out.write_all(central_directory_data.as_slice())?;
    out.write_u32::<LittleEndian>(CENTRAL_DIRECTORY_END)?;
    out.write_u16::<LittleEndian>(0)?;
    out.write_u16::<LittleEndian>(0)?;
    out.write_u16::<LittleEndian>(file_count)?;
    out.write_u16::<LittleEndian>(file_count)?;
    out.write_u32::<LittleEndian>(central_directory_data.len() as u32)?;
    out.write_u32::<LittleEndian>(central_directory_offset)?;
    out.write_u16::<LittleEndian>(0)?;
    Ok(out)
}
