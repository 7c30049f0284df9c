pub mod repository;

use std::path::PathBuf;

pub use repository::ListRepository;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("List not found: {0}")]
    NotFound(String),
    #[error("Invalid list name: {0:?}")]
    InvalidName(String),
    #[error("Corrupt document for list {name}: {source}")]
    Corrupt {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize list {name}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Storage I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StorageError::Corrupt { .. })
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// List names are case-sensitive and must contain something besides whitespace
pub fn validate_list_name(name: &str) -> StorageResult<()> {
    if name.trim().is_empty() {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_list_name() {
        assert!(validate_list_name("Pantry").is_ok());
        assert!(validate_list_name("freezer / garage").is_ok());
        assert!(matches!(validate_list_name(""), Err(StorageError::InvalidName(_))));
        assert!(matches!(validate_list_name("  \t"), Err(StorageError::InvalidName(_))));
    }
}
