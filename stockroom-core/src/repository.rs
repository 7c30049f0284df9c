use std::collections::BTreeSet;

use stockroom_catalog::Product;

use crate::StorageResult;

/// Persistence for named product lists.
///
/// A list is always read and written as a whole; there are no partial updates.
pub trait ListRepository {
    /// Strict read: absent lists are empty, unreadable documents are errors
    fn try_load(&self, name: &str) -> StorageResult<Vec<Product>>;

    /// Lenient read: any failure degrades to an empty list
    fn load(&self, name: &str) -> Vec<Product> {
        match self.try_load(name) {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(list = name, error = %e, "Unreadable list, treating as empty");
                Vec::new()
            }
        }
    }

    /// Replace the persisted contents of a list, creating it if needed
    fn save(&mut self, name: &str, products: &[Product]) -> StorageResult<()>;

    /// Names of every persisted list
    fn list_names(&self) -> StorageResult<BTreeSet<String>>;

    /// Remove a persisted list; `StorageError::NotFound` if there is none
    fn delete_list(&mut self, name: &str) -> StorageResult<()>;

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.list_names()?.contains(name))
    }
}
