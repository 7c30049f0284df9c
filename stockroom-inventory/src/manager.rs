use std::collections::BTreeSet;

use stockroom_catalog::{FilterMode, Product, SearchQuery};
use stockroom_core::{validate_list_name, ListRepository, StorageError};
use uuid::Uuid;

use crate::{InventoryError, InventoryResult};

/// Owns the active list and keeps it in step with storage.
///
/// Exactly one list is active at a time. Only the active list's products are
/// held in memory; switching lists re-reads from the repository. Every
/// mutation is saved before it returns, and a failed save rolls the
/// in-memory list back to what it was before the call.
pub struct InventoryManager<R: ListRepository> {
    repo: R,
    lists: BTreeSet<String>,
    active: String,
    products: Vec<Product>,
    strict_reads: bool,
}

impl<R: ListRepository> InventoryManager<R> {
    /// Open with lenient reads: unreadable documents load as empty lists
    pub fn open(repo: R, default_list: &str) -> InventoryResult<Self> {
        Self::open_inner(repo, default_list, false)
    }

    /// Open with strict reads: unreadable documents are reported as errors
    pub fn open_strict(repo: R, default_list: &str) -> InventoryResult<Self> {
        Self::open_inner(repo, default_list, true)
    }

    fn open_inner(mut repo: R, default_list: &str, strict_reads: bool) -> InventoryResult<Self> {
        check_name(default_list)?;

        let mut lists = repo.list_names()?;
        if lists.is_empty() {
            repo.save(default_list, &[])?;
            lists.insert(default_list.to_string());
            tracing::info!(list = default_list, "Created default list");
        }

        let active = if lists.contains(default_list) {
            default_list.to_string()
        } else {
            lists
                .first()
                .cloned()
                .unwrap_or_else(|| default_list.to_string())
        };

        let mut manager = Self {
            repo,
            lists,
            active: String::new(),
            products: Vec::new(),
            strict_reads,
        };
        manager.products = manager.read(&active)?;
        manager.active = active;

        tracing::debug!(
            list = %manager.active,
            count = manager.products.len(),
            "Inventory opened"
        );
        Ok(manager)
    }

    pub fn list_names(&self) -> &BTreeSet<String> {
        &self.lists
    }

    pub fn active_list(&self) -> &str {
        &self.active
    }

    /// Products of the active list, in insertion order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: Uuid) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Re-derive the known list names from storage
    pub fn refresh_lists(&mut self) -> InventoryResult<()> {
        let mut lists = self.repo.list_names()?;
        lists.insert(self.active.clone());
        self.lists = lists;
        Ok(())
    }

    /// Create an empty list and make it active.
    ///
    /// Returns `false` without touching anything if the list already exists.
    pub fn create_list(&mut self, name: &str) -> InventoryResult<bool> {
        check_name(name)?;

        if self.lists.contains(name) || self.repo.exists(name)? {
            self.lists.insert(name.to_string());
            tracing::debug!(list = name, "List already exists");
            return Ok(false);
        }

        self.repo.save(name, &[])?;
        self.lists.insert(name.to_string());
        self.active = name.to_string();
        self.products.clear();

        tracing::info!(list = name, "Created list");
        Ok(true)
    }

    /// Make `name` the active list, reloading its products from storage
    pub fn switch_list(&mut self, name: &str) -> InventoryResult<()> {
        if !self.lists.contains(name) && !self.repo.exists(name)? {
            return Err(InventoryError::ListNotFound(name.to_string()));
        }

        let products = self.read(name)?;
        self.lists.insert(name.to_string());
        self.active = name.to_string();
        self.products = products;

        tracing::info!(list = name, count = self.products.len(), "Switched list");
        Ok(())
    }

    /// Delete a list and its persisted document.
    ///
    /// The last remaining list cannot be deleted. Deleting the active list
    /// activates the lexicographically first remaining one.
    pub fn delete_list(&mut self, name: &str) -> InventoryResult<()> {
        let mut lists = self.repo.list_names()?;
        lists.extend(self.lists.iter().cloned());

        if !lists.contains(name) {
            return Err(InventoryError::ListNotFound(name.to_string()));
        }
        if lists.len() <= 1 {
            return Err(InventoryError::LastList(name.to_string()));
        }
        lists.remove(name);

        // Read the fallback before deleting so a failed read changes nothing
        let fallback = if self.active == name {
            let next = lists
                .first()
                .cloned()
                .ok_or_else(|| InventoryError::LastList(name.to_string()))?;
            let products = self.read(&next)?;
            Some((next, products))
        } else {
            None
        };

        self.repo.delete_list(name).map_err(|e| match e {
            StorageError::NotFound(name) => InventoryError::ListNotFound(name),
            other => other.into(),
        })?;

        self.lists = lists;
        if let Some((next, products)) = fallback {
            tracing::info!(deleted = name, active = %next, "Deleted active list");
            self.active = next;
            self.products = products;
        } else {
            tracing::info!(list = name, "Deleted list");
        }
        Ok(())
    }

    /// Append a product to the active list and return its id.
    ///
    /// A nil id, or one already used in the active list, is replaced with a fresh one.
    pub fn add(&mut self, mut product: Product) -> InventoryResult<Uuid> {
        if product.id().is_nil() || self.get(product.id()).is_some() {
            product = product.with_id(Uuid::new_v4());
        }
        let id = product.id();

        self.products.push(product);
        if let Err(e) = self.persist() {
            self.products.pop();
            return Err(e);
        }

        tracing::debug!(list = %self.active, %id, "Added product");
        Ok(id)
    }

    /// Overwrite the record with the same id; a missing id is ignored
    pub fn update(&mut self, product: &Product) -> InventoryResult<bool> {
        let Some(index) = self.position(product.id()) else {
            tracing::debug!(
                list = %self.active,
                id = %product.id(),
                "Update target missing, ignoring"
            );
            return Ok(false);
        };

        let previous = self.products[index].clone();
        self.products[index].apply_changes(product);
        if let Err(e) = self.persist() {
            self.products[index] = previous;
            return Err(e);
        }

        tracing::debug!(list = %self.active, id = %product.id(), "Updated product");
        Ok(true)
    }

    /// Remove the record with this id; a missing id is ignored
    pub fn remove(&mut self, id: Uuid) -> InventoryResult<bool> {
        let Some(index) = self.position(id) else {
            tracing::debug!(list = %self.active, %id, "Remove target missing, ignoring");
            return Ok(false);
        };

        let removed = self.products.remove(index);
        if let Err(e) = self.persist() {
            self.products.insert(index, removed);
            return Err(e);
        }

        tracing::debug!(list = %self.active, %id, "Removed product");
        Ok(true)
    }

    /// Filter by perishability, then by a case-insensitive name/category term
    pub fn search(&self, term: &str, mode: FilterMode) -> Vec<Product> {
        self.search_query(&SearchQuery::new(term, mode))
    }

    pub fn search_query(&self, query: &SearchQuery) -> Vec<Product> {
        query.apply(&self.products)
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.products.iter().position(|p| p.id() == id)
    }

    fn read(&self, name: &str) -> InventoryResult<Vec<Product>> {
        if self.strict_reads {
            Ok(self.repo.try_load(name)?)
        } else {
            Ok(self.repo.load(name))
        }
    }

    fn persist(&mut self) -> InventoryResult<()> {
        self.repo.save(&self.active, &self.products)?;
        Ok(())
    }
}

fn check_name(name: &str) -> InventoryResult<()> {
    validate_list_name(name).map_err(|_| InventoryError::InvalidListName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::{Duration, Utc};
    use stockroom_core::StorageResult;
    use stockroom_store::InMemoryListStore;

    /// In-memory repository whose writes can be switched off
    #[derive(Default)]
    struct FlakyStore {
        lists: BTreeMap<String, Vec<Product>>,
        fail_writes: bool,
    }

    impl ListRepository for FlakyStore {
        fn try_load(&self, name: &str) -> StorageResult<Vec<Product>> {
            Ok(self.lists.get(name).cloned().unwrap_or_default())
        }

        fn save(&mut self, name: &str, products: &[Product]) -> StorageResult<()> {
            if self.fail_writes {
                return Err(StorageError::Io {
                    path: name.into(),
                    source: std::io::Error::other("disk full"),
                });
            }
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

    fn manager() -> InventoryManager<InMemoryListStore> {
        InventoryManager::open(InMemoryListStore::new(), "Default").unwrap()
    }

    fn rice() -> Product {
        Product::new("Rice", "Grains", 3, "kg", None)
    }

    fn yogurt() -> Product {
        Product::new("Yogurt", "Dairy", 4, "cups", Some(Utc::now() + Duration::days(10)))
    }

    #[test]
    fn test_open_creates_default_list() {
        let manager = manager();

        assert_eq!(manager.active_list(), "Default");
        assert!(manager.repository().exists("Default").unwrap());
        assert_eq!(manager.list_names().len(), 1);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_open_prefers_first_list_when_default_missing() {
        let mut store = InMemoryListStore::new();
        store.save("Shed", &[rice()]).unwrap();
        store.save("Garage", &[]).unwrap();

        let manager = InventoryManager::open(store, "Default").unwrap();

        assert_eq!(manager.active_list(), "Garage");
        assert!(!manager.list_names().contains("Default"));
    }

    #[test]
    fn test_create_list_is_idempotent() {
        let mut manager = manager();

        assert!(manager.create_list("Pantry").unwrap());
        manager.add(rice()).unwrap();
        manager.switch_list("Default").unwrap();

        assert!(!manager.create_list("Pantry").unwrap());
        assert_eq!(manager.active_list(), "Default");
        assert_eq!(manager.list_names().iter().filter(|n| *n == "Pantry").count(), 1);
        assert_eq!(manager.repository().load("Pantry").len(), 1);
    }

    #[test]
    fn test_create_list_rejects_blank_names() {
        let mut manager = manager();
        assert!(matches!(
            manager.create_list("   "),
            Err(InventoryError::InvalidListName(_))
        ));
    }

    #[test]
    fn test_switch_list_reloads_products() {
        let mut manager = manager();
        manager.add(rice()).unwrap();
        manager.create_list("Fridge").unwrap();
        manager.add(yogurt()).unwrap();

        manager.switch_list("Default").unwrap();
        assert_eq!(manager.products()[0].name, "Rice");

        manager.switch_list("Fridge").unwrap();
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.products()[0].name, "Yogurt");

        assert!(matches!(
            manager.switch_list("Nowhere"),
            Err(InventoryError::ListNotFound(_))
        ));
        assert_eq!(manager.active_list(), "Fridge");
    }

    #[test]
    fn test_delete_last_list_is_rejected() {
        let mut manager = manager();

        let result = manager.delete_list("Default");

        assert!(matches!(result, Err(InventoryError::LastList(_))));
        assert_eq!(manager.list_names().len(), 1);
        assert!(manager.repository().exists("Default").unwrap());
    }

    #[test]
    fn test_delete_active_list_falls_back_to_first_remaining() {
        let mut manager = manager();
        manager.add(rice()).unwrap();
        manager.create_list("Cellar").unwrap();
        manager.create_list("Zoo").unwrap();

        manager.delete_list("Zoo").unwrap();

        assert_eq!(manager.active_list(), "Cellar");
        assert!(!manager.list_names().contains("Zoo"));
        assert!(!manager.repository().exists("Zoo").unwrap());

        manager.delete_list("Cellar").unwrap();
        assert_eq!(manager.active_list(), "Default");
        assert_eq!(manager.products()[0].name, "Rice");
    }

    #[test]
    fn test_delete_inactive_list_keeps_active() {
        let mut manager = manager();
        manager.create_list("Cellar").unwrap();
        manager.switch_list("Default").unwrap();

        manager.delete_list("Cellar").unwrap();

        assert_eq!(manager.active_list(), "Default");
        assert!(matches!(
            manager.delete_list("Cellar"),
            Err(InventoryError::ListNotFound(_))
        ));
    }

    #[test]
    fn test_add_assigns_fresh_id_on_collision() {
        let mut manager = manager();
        let first = manager.add(rice()).unwrap();
        let clash = rice().with_id(first);
        let nil = rice().with_id(Uuid::nil());

        let second = manager.add(clash).unwrap();
        let third = manager.add(nil).unwrap();

        assert_ne!(first, second);
        assert!(!third.is_nil());
        assert_eq!(manager.len(), 3);
        assert_eq!(manager.repository().load("Default").len(), 3);
    }

    #[test]
    fn test_update_preserves_identity() {
        let mut manager = manager();
        let id = manager.add(rice()).unwrap();
        let created = manager.get(id).unwrap().created_date();

        let edit = Product::new("Basmati", "Grains", 7, "bags", None)
            .with_id(id)
            .with_created_date(Utc::now() - Duration::days(100));
        assert!(manager.update(&edit).unwrap());

        let stored = manager.get(id).unwrap();
        assert_eq!(stored.name, "Basmati");
        assert_eq!(stored.quantity, 7);
        assert_eq!(stored.created_date(), created);
        assert_eq!(manager.repository().load("Default")[0].name, "Basmati");
    }

    #[test]
    fn test_update_and_remove_missing_ids_are_no_ops() {
        let mut manager = manager();
        manager.add(rice()).unwrap();
        let before = manager.products().to_vec();

        assert!(!manager.update(&yogurt()).unwrap());
        assert!(!manager.remove(Uuid::new_v4()).unwrap());

        assert_eq!(manager.products(), before.as_slice());
    }

    #[test]
    fn test_remove_persists() {
        let mut manager = manager();
        let id = manager.add(rice()).unwrap();
        manager.add(yogurt()).unwrap();

        assert!(manager.remove(id).unwrap());

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.repository().load("Default")[0].name, "Yogurt");
    }

    #[test]
    fn test_search_modes_and_terms() {
        let mut manager = manager();
        manager.add(rice()).unwrap();
        manager.add(yogurt()).unwrap();

        let perishable = manager.search("", FilterMode::PerishableOnly);
        assert_eq!(perishable.len(), 1);
        assert_eq!(perishable[0].name, "Yogurt");

        let by_term = manager.search("ri", FilterMode::All);
        assert_eq!(by_term.len(), 1);
        assert_eq!(by_term[0].name, "Rice");

        assert_eq!(manager.search("  ", FilterMode::All).len(), 2);
        assert!(manager.search("dairy", FilterMode::NonPerishableOnly).is_empty());
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_failed_writes_roll_back() {
        let mut manager = InventoryManager::open(FlakyStore::default(), "Default").unwrap();
        let id = manager.add(rice()).unwrap();
        let before = manager.products().to_vec();

        manager.repo.fail_writes = true;

        assert!(manager.add(yogurt()).is_err());
        assert!(manager.update(&yogurt().with_id(id)).is_err());
        assert!(manager.remove(id).is_err());
        assert!(manager.create_list("Fridge").is_err());

        assert_eq!(manager.products(), before.as_slice());
        assert_eq!(manager.active_list(), "Default");
        assert!(!manager.list_names().contains("Fridge"));
    }
}
