use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use stockroom_catalog::Product;
use stockroom_core::{validate_list_name, ListRepository, StorageError, StorageResult};

use crate::document;

const EXTENSION: &str = "json";

/// One pretty-printed JSON file per list, all inside a single storage root
#[derive(Debug, Clone)]
pub struct JsonListStore {
    root: PathBuf,
}

impl JsonListStore {
    /// Open a store rooted at `root`, creating the directory if it is missing
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            path: root.clone(),
            source,
        })?;
        tracing::debug!(root = %root.display(), "Opened list store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", encode_name(name), EXTENSION))
    }
}

impl ListRepository for JsonListStore {
    fn try_load(&self, name: &str) -> StorageResult<Vec<Product>> {
        let path = self.path_for(name);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(list = name, "No document on disk, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        let products = document::parse_products(name, &raw)?;
        tracing::debug!(list = name, count = products.len(), "Loaded list");
        Ok(products)
    }

    fn save(&mut self, name: &str, products: &[Product]) -> StorageResult<()> {
        validate_list_name(name)?;
        let body = document::render_products(name, products)?;

        fs::create_dir_all(&self.root).map_err(|source| StorageError::Io {
            path: self.root.clone(),
            source,
        })?;

        let path = self.path_for(name);
        let staging = path.with_extension(format!("{EXTENSION}.tmp"));

        fs::write(&staging, body).map_err(|source| StorageError::Io {
            path: staging.clone(),
            source,
        })?;

        if let Err(source) = fs::rename(&staging, &path) {
            let _ = fs::remove_file(&staging);
            return Err(StorageError::Io { path, source });
        }

        tracing::debug!(list = name, count = products.len(), "Saved list");
        Ok(())
    }

    fn list_names(&self) -> StorageResult<BTreeSet<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.root.clone(),
                    source,
                })
            }
        };

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();

            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }

            if let Some(name) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(decode_name)
            {
                names.insert(name);
            }
        }

        Ok(names)
    }

    fn delete_list(&mut self, name: &str) -> StorageResult<()> {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(list = name, "Deleted list document");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.path_for(name).is_file())
    }
}

// Uppercase is escaped so distinct names stay distinct on case-insensitive filesystems
fn is_plain(byte: u8) -> bool {
    byte.is_ascii_lowercase() || byte.is_ascii_digit() || matches!(byte, b'-' | b'_' | b' ')
}

/// Reversible file stem for a list name; every byte outside `[a-z0-9 _-]` becomes `%XX`
pub fn encode_name(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len());
    for byte in name.bytes() {
        if is_plain(byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

/// Inverse of [`encode_name`]; `None` for stems this store could not have written
pub fn decode_name(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = stem.get(i + 1..i + 3)?;
                decoded.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            byte if is_plain(byte) => {
                decoded.push(byte);
                i += 1;
            }
            _ => return None,
        }
    }

    if decoded.is_empty() {
        return None;
    }

    // Only the canonical spelling maps back to the same path
    String::from_utf8(decoded)
        .ok()
        .filter(|name| encode_name(name) == stem)
}
