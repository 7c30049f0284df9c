use std::collections::{BTreeMap, BTreeSet};

use stockroom_catalog::Product;
use stockroom_core::{validate_list_name, ListRepository, StorageError, StorageResult};

/// Keeps every list in memory; used in tests and when nothing should touch disk
#[derive(Debug, Clone, Default)]
pub struct InMemoryListStore {
    lists: BTreeMap<String, Vec<Product>>,
}

impl InMemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ListRepository for InMemoryListStore {
    fn try_load(&self, name: &str) -> StorageResult<Vec<Product>> {
        Ok(self.lists.get(name).cloned().unwrap_or_default())
    }

    fn save(&mut self, name: &str, products: &[Product]) -> StorageResult<()> {
        validate_list_name(name)?;
        self.lists.insert(name.to_string(), products.to_vec());
        Ok(())
    }

    fn list_names(&self) -> StorageResult<BTreeSet<String>> {
        Ok(self.lists.keys().cloned().collect())
    }

    fn delete_list(&mut self, name: &str) -> StorageResult<()> {
        self.lists
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }
}
