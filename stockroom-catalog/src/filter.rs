use std::fmt;
use std::str::FromStr;

use crate::product::Product;

/// Perishability restriction applied before the text term
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    All,
    PerishableOnly,
    NonPerishableOnly,
}

impl FilterMode {
    pub fn admits(&self, product: &Product) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::PerishableOnly => product.is_perishable(),
            FilterMode::NonPerishableOnly => !product.is_perishable(),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterMode::All => "all",
            FilterMode::PerishableOnly => "perishable",
            FilterMode::NonPerishableOnly => "non-perishable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown filter mode: {0} (expected all, perishable or non-perishable)")]
pub struct ParseFilterModeError(String);

impl FromStr for FilterMode {
    type Err = ParseFilterModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "all" => Ok(FilterMode::All),
            "perishable" | "perishable-only" => Ok(FilterMode::PerishableOnly),
            "non-perishable" | "non-perishable-only" | "nonperishable" => {
                Ok(FilterMode::NonPerishableOnly)
            }
            _ => Err(ParseFilterModeError(s.to_string())),
        }
    }
}

/// Text term plus perishability mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    term: Option<String>,
    pub mode: FilterMode,
}

impl SearchQuery {
    /// A blank term matches everything
    pub fn new(term: &str, mode: FilterMode) -> Self {
        let term = term.trim();
        Self {
            term: (!term.is_empty()).then(|| term.to_lowercase()),
            mode,
        }
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    pub fn matches(&self, product: &Product) -> bool {
        if !self.mode.admits(product) {
            return false;
        }

        match &self.term {
            None => true,
            Some(term) => {
                product.name.to_lowercase().contains(term)
                    || product.category.to_lowercase().contains(term)
            }
        }
    }

    /// Matching products, in list order
    pub fn apply<'a, I>(&self, products: I) -> Vec<Product>
    where
        I: IntoIterator<Item = &'a Product>,
    {
        products
            .into_iter()
            .filter(|product| self.matches(product))
            .cloned()
            .collect()
    }
}
