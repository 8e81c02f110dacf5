use log::debug;

use crate::apk_zip::writer::{write_archive, PendingEntry};
use crate::apk_zip::zip::read_entries;
use crate::apk_zip::CompressMethod;
use crate::error::{Error, Result};

/// A named archive entry holding its uncompressed payload.
///
/// The compression method is a write-time hint carried from the input
/// archive, not part of the observable contract.
#[derive(Clone, Debug)]
pub struct Entry {
    pub name: String,
    pub data: Vec<u8>,
    method: CompressMethod,
}

impl Entry {
    fn new(name: String, data: Vec<u8>, method: CompressMethod) -> Entry {
        Entry { name, data, method }
    }
}

/// An immutable snapshot of archive entries, in declared order.
///
/// Every transform consumes the package and returns a new value, so the same
/// loaded package can feed independent pipelines and concurrent requests
/// share nothing. Duplicate entry names are representable; name lookups
/// resolve to the last occurrence.
#[derive(Clone, Debug, Default)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    /// An empty package, useful for assembling archives from scratch.
    pub fn new() -> Package {
        Package { entries: vec![] }
    }

    /// Parses a zip byte stream, inflating every entry and preserving the
    /// declared entry order.
    pub fn load(raw: &[u8]) -> Result<Package> {
        let entries: Vec<Entry> = read_entries(raw)?
            .into_iter()
            .map(|e| Entry::new(e.file_name, e.data, e.compress_method))
            .collect();
        debug!("loaded package with {} entries", entries.len());
        Ok(Package { entries })
    }

    /// Renames every entry ending in `.dex` to `assets/` + its original
    /// name, payload untouched, order preserved.
    ///
    /// The suffix match is byte-exact, so an entry already under `assets/`
    /// is prefixed again. Untouched names never end in `.dex`, which is why
    /// the rename cannot collide with them.
    pub fn relocate_dex(self) -> Package {
        let entries = self
            .entries
            .into_iter()
            .map(|mut entry| {
                if entry.name.ends_with(".dex") {
                    debug!("relocating {} to assets/{}", entry.name, entry.name);
                    entry.name = format!("assets/{}", entry.name);
                }
                entry
            })
            .collect();
        Package { entries }
    }

    /// Appends a `classes.dex` entry with the given payload.
    ///
    /// A pre-existing `classes.dex` is kept; which duplicate the consuming
    /// runtime reads is its own business.
    pub fn inject_root_dex(self, dex: &[u8]) -> Package {
        self.append(Entry::new(
            String::from("classes.dex"),
            dex.to_vec(),
            CompressMethod::Deflated,
        ))
    }

    /// Appends `assets/` + `file_name` holding the UTF-8 bytes of `content`.
    pub fn add_text_asset(self, content: &str, file_name: &str) -> Package {
        self.append(Entry::new(
            format!("assets/{file_name}"),
            content.as_bytes().to_vec(),
            CompressMethod::Deflated,
        ))
    }

    /// Appends an arbitrary entry with an explicit compression hint.
    pub fn add_entry(self, name: &str, data: Vec<u8>, method: CompressMethod) -> Package {
        self.append(Entry::new(name.to_string(), data, method))
    }

    /// Drops every entry matching `name` exactly.
    pub fn remove_entry(self, name: &str) -> Package {
        let entries = self.entries.into_iter().filter(|e| e.name != name).collect();
        Package { entries }
    }

    /// Drops every entry matching `name` exactly and appends `{name, data}`
    /// at the end. Degrades to a plain insert when the name was absent.
    pub fn replace_entry(self, name: &str, data: Vec<u8>) -> Package {
        let mut entries: Vec<Entry> =
            self.entries.into_iter().filter(|e| e.name != name).collect();
        entries.push(Entry::new(
            name.to_string(),
            data,
            CompressMethod::Deflated,
        ));
        Package { entries }
    }

    /// Payload of the last entry matching `name` exactly.
    pub fn extract_entry(&self, name: &str) -> Result<&[u8]> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the entry sequence into a zip stream. Payload bytes are
    /// written bit-identical to what each entry holds; duplicates are
    /// written as-is.
    pub fn finalize(&self) -> Result<Vec<u8>> {
        write_archive(self.entries.iter().map(|e| PendingEntry {
            file_name: e.name.as_str(),
            data: e.data.as_slice(),
            compress_method: e.method,
        }))
    }

    fn append(mut self, entry: Entry) -> Package {
        self.entries.push(entry);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, data: &[u8]) -> Entry {
        Entry::new(name.to_string(), data.to_vec(), CompressMethod::Deflated)
    }

    fn pairs(pkg: &Package) -> Vec<(String, Vec<u8>)> {
        pkg.entries
            .iter()
            .map(|e| (e.name.clone(), e.data.clone()))
            .collect()
    }

    #[test]
    fn relocate_renames_dex_entries_in_place() {
        let pkg = Package {
            entries: vec![
                entry("classes.dex", &[1]),
                entry("res/icon.png", &[2]),
                entry("assets/extra.dex", &[3]),
            ],
        };
        let pkg = pkg.relocate_dex();
        assert_eq!(
            pairs(&pkg),
            vec![
                ("assets/classes.dex".to_string(), vec![1]),
                ("res/icon.png".to_string(), vec![2]),
                ("assets/assets/extra.dex".to_string(), vec![3]),
            ]
        );
    }

    #[test]
    fn inject_keeps_existing_root_dex() {
        let pkg = Package {
            entries: vec![entry("classes.dex", &[1, 2])],
        };
        let pkg = pkg.inject_root_dex(&[0xAA, 0xBB]);
        assert_eq!(
            pairs(&pkg),
            vec![
                ("classes.dex".to_string(), vec![1, 2]),
                ("classes.dex".to_string(), vec![0xAA, 0xBB]),
            ]
        );
    }

    #[test]
    fn text_asset_payload_is_exact_utf8() {
        let pkg = Package::new().add_text_asset("hello", "name.txt");
        assert_eq!(pkg.extract_entry("assets/name.txt").unwrap(), b"hello");
        assert_eq!(pkg.extract_entry("assets/name.txt").unwrap().len(), 5);
    }

    #[test]
    fn extract_resolves_last_occurrence() {
        let pkg = Package {
            entries: vec![entry("classes.dex", &[1]), entry("classes.dex", &[2])],
        };
        assert_eq!(pkg.extract_entry("classes.dex").unwrap(), &[2]);
    }

    #[test]
    fn extract_missing_entry_fails() {
        let pkg = Package::new();
        assert!(matches!(
            pkg.extract_entry("AndroidManifest.xml"),
            Err(Error::EntryNotFound(_))
        ));
    }

    #[test]
    fn replace_removes_all_matches_and_appends() {
        let pkg = Package {
            entries: vec![
                entry("a.txt", &[1]),
                entry("dup.txt", &[2]),
                entry("dup.txt", &[3]),
            ],
        };
        let pkg = pkg.replace_entry("dup.txt", vec![9]);
        assert_eq!(
            pairs(&pkg),
            vec![
                ("a.txt".to_string(), vec![1]),
                ("dup.txt".to_string(), vec![9]),
            ]
        );
    }

    #[test]
    fn replace_degrades_to_insert() {
        let pkg = Package::new().replace_entry("fresh.txt", vec![7]);
        assert_eq!(pkg.extract_entry("fresh.txt").unwrap(), &[7]);
    }

    #[test]
    fn remove_drops_every_match() {
        let pkg = Package {
            entries: vec![entry("x", &[1]), entry("x", &[2]), entry("y", &[3])],
        };
        let pkg = pkg.remove_entry("x");
        assert_eq!(pairs(&pkg), vec![("y".to_string(), vec![3])]);
    }

    #[test]
    fn finalize_then_load_is_identity_without_dex() {
        let pkg = Package::new()
            .add_entry("AndroidManifest.xml", vec![1, 2, 3], CompressMethod::Deflated)
            .add_entry("resources.arsc", vec![4, 5], CompressMethod::Stored)
            .add_entry("assets/data.txt", vec![6], CompressMethod::Deflated);
        let raw = pkg.finalize().unwrap();
        let reloaded = Package::load(&raw).unwrap();
        assert_eq!(pairs(&reloaded), pairs(&pkg));
    }

    #[test]
    fn finalize_preserves_duplicates() {
        let pkg = Package {
            entries: vec![entry("classes.dex", &[1]), entry("classes.dex", &[2])],
        };
        let raw = pkg.finalize().unwrap();
        let reloaded = Package::load(&raw).unwrap();
        assert_eq!(
            pairs(&reloaded),
            vec![
                ("classes.dex".to_string(), vec![1]),
                ("classes.dex".to_string(), vec![2]),
            ]
        );
    }
}
