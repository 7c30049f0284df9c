use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timestamp;

/// Unit label used when a product is created or stored without one
pub const DEFAULT_UNIT: &str = "pcs";

const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d";

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

/// Current calendar date (UTC)
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Summary of a product's derived expiry flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    NonPerishable,
    Fresh,
    ExpiringSoon,
    Expired,
}

impl ExpiryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ExpiryStatus::NonPerishable => "non-perishable",
            ExpiryStatus::Fresh => "fresh",
            ExpiryStatus::ExpiringSoon => "expiring soon",
            ExpiryStatus::Expired => "expired",
        }
    }
}

/// A single inventory item.
///
/// Perishability is not stored: a product is perishable exactly when it
/// carries an expiration date, and every expiry flag is recomputed from
/// `created_date` and `expiration_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity: i32,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default = "Utc::now", deserialize_with = "timestamp::deserialize")]
    created_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub expiration_date: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: i32,
        unit: impl Into<String>,
        expiration_date: Option<DateTime<Utc>>,
    ) -> Self {
        let unit = unit.into();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            quantity,
            unit: if unit.trim().is_empty() { default_unit() } else { unit },
            created_date: Utc::now(),
            expiration_date,
        }
    }

    /// Re-key a product, e.g. to build an update payload for an existing record
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Backdate (or postdate) the creation timestamp
    pub fn with_created_date(mut self, created_date: DateTime<Utc>) -> Self {
        self.created_date = created_date;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    /// Overwrite the mutable fields from `other`, keeping id and creation date
    pub fn apply_changes(&mut self, other: &Product) {
        self.name = other.name.clone();
        self.category = other.category.clone();
        self.quantity = other.quantity;
        self.unit = other.unit.clone();
        self.expiration_date = other.expiration_date;
    }

    pub fn is_perishable(&self) -> bool {
        self.expiration_date.is_some()
    }

    /// Calendar day (UTC) on which the product expires
    pub fn expiration_day(&self) -> Option<NaiveDate> {
        self.expiration_date.map(|ts| ts.date_naive())
    }

    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiration_day().is_some_and(|expires| today >= expires)
    }

    /// True from the midpoint of the product's lifespan until the day before it expires
    pub fn is_expiring_soon_on(&self, today: NaiveDate) -> bool {
        let Some(expires) = self.expiration_day() else {
            return false;
        };

        let created = self.created_date.date_naive();
        let lifespan = (expires - created).num_days();
        if lifespan <= 0 {
            return false;
        }

        let elapsed = (today - created).num_days();
        elapsed * 2 >= lifespan && today < expires
    }

    /// Whole days left before expiry; negative once expired
    pub fn days_until_expiry_on(&self, today: NaiveDate) -> Option<i64> {
        self.expiration_day().map(|expires| (expires - today).num_days())
    }

    pub fn status_on(&self, today: NaiveDate) -> ExpiryStatus {
        if !self.is_perishable() {
            ExpiryStatus::NonPerishable
        } else if self.is_expired_on(today) {
            ExpiryStatus::Expired
        } else if self.is_expiring_soon_on(today) {
            ExpiryStatus::ExpiringSoon
        } else {
            ExpiryStatus::Fresh
        }
    }

    /// Status as of the current UTC date
    pub fn status(&self) -> ExpiryStatus {
        self.status_on(today())
    }

    pub fn created_display(&self) -> String {
        self.created_date.format(DATE_DISPLAY_FORMAT).to_string()
    }

    pub fn expiration_display(&self) -> String {
        match self.expiration_date {
            Some(ts) => ts.format(DATE_DISPLAY_FORMAT).to_string(),
            None => "-".to_string(),
        }
    }
}
