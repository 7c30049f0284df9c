pub mod manager;

use stockroom_core::StorageError;

pub use manager::InventoryManager;

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Cannot delete list {0}: it is the only remaining list")]
    LastList(String),

    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("Invalid list name: {0:?}")]
    InvalidListName(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type InventoryResult<T> = Result<T, InventoryError>;
