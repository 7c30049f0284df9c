//! Reading and writing list documents.
//!
//! A document is a JSON array of product records. Field names are matched
//! case-insensitively on read so documents written with other casings
//! (`Name`, `ExpirationDate`, ...) still load.

use serde_json::{Map, Value};
use stockroom_catalog::Product;
use stockroom_core::{StorageError, StorageResult};

const PRODUCT_FIELDS: [&str; 7] = [
    "id",
    "name",
    "category",
    "quantity",
    "unit",
    "createdDate",
    "expirationDate",
];

pub fn parse_products(name: &str, raw: &str) -> StorageResult<Vec<Product>> {
    let corrupt = |source| StorageError::Corrupt {
        name: name.to_string(),
        source,
    };

    let mut value: Value = serde_json::from_str(raw).map_err(corrupt)?;
    normalize_field_names(&mut value);
    serde_json::from_value(value).map_err(corrupt)
}

pub fn render_products(name: &str, products: &[Product]) -> StorageResult<String> {
    serde_json::to_string_pretty(products).map_err(|source| StorageError::Serialize {
        name: name.to_string(),
        source,
    })
}

fn normalize_field_names(value: &mut Value) {
    let Value::Array(records) = value else {
        return;
    };

    for record in records {
        if let Value::Object(fields) = record {
            let normalized: Map<String, Value> = std::mem::take(fields)
                .into_iter()
                .map(|(key, value)| (canonical_field(key), value))
                .collect();
            *fields = normalized;
        }
    }
}

fn canonical_field(key: String) -> String {
    PRODUCT_FIELDS
        .iter()
        .find(|field| field.eq_ignore_ascii_case(&key))
        .map_or(key, |field| field.to_string())
}
