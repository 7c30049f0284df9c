pub mod product;
pub mod filter;
pub mod timestamp;

pub use product::{ExpiryStatus, Product, DEFAULT_UNIT};
pub use filter::{FilterMode, ParseFilterModeError, SearchQuery};
