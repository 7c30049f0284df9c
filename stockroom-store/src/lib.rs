pub mod app_config;
pub mod document;
pub mod json_store;
pub mod memory;

pub use json_store::JsonListStore;
pub use memory::InMemoryListStore;
