use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Produce categories with their shelf life under optimal conditions.
///
/// The estimator is calibrated against [`Product::Manzana`], the longest-lived
/// category. The other entries are only used when a deployment explicitly
/// configures a different product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    #[default]
    Manzana,
    Platano,
    Aguacate,
    Fresa,
    Lechuga,
}

impl Product {
    pub const ALL: [Product; 5] = [
        Product::Manzana,
        Product::Platano,
        Product::Aguacate,
        Product::Fresa,
        Product::Lechuga,
    ];

    /// Shelf life in days when stored within every optimal band
    pub fn baseline_days(self) -> f64 {
        match self {
            Product::Manzana => 90.0,
            Product::Platano => 14.0,
            Product::Aguacate => 21.0,
            Product::Fresa => 7.0,
            Product::Lechuga => 14.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Product::Manzana => "manzana",
            Product::Platano => "platano",
            Product::Aguacate => "aguacate",
            Product::Fresa => "fresa",
            Product::Lechuga => "lechuga",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Product {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Product::ALL
            .into_iter()
            .find(|product| product.as_str() == wanted)
            .ok_or_else(|| DomainError::UnknownProduct(s.to_string()))
    }
}
