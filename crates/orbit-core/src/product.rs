//! # Product Types
//!
//! Product catalog types for orbit-store.
//! A seed catalog can be loaded from `config/products.toml`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
        }
    }

    /// JPY has 0 decimals, the others have 2
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert a decimal amount to the smallest currency unit (cents, etc.)
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        (amount * multiplier).round() as i64
    }

    /// Convert from smallest unit back to decimal
    pub fn from_smallest_unit(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents for USD)
    pub amount: i64,
    #[serde(default)]
    pub currency: Currency,
}

impl Price {
    /// Upper bound for a catalog unit price, in the smallest currency unit
    pub const MAX_AMOUNT: i64 = 100_000_000_000;

    /// Create a new price from decimal amount
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount: currency.to_smallest_unit(amount),
            currency,
        }
    }

    pub fn from_cents(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Multiply by a quantity, `None` on overflow
    pub fn checked_times(&self, quantity: u32) -> Option<Self> {
        self.amount
            .checked_mul(i64::from(quantity))
            .map(|amount| Self {
                amount,
                currency: self.currency,
            })
    }

    /// Positive and no larger than [`Price::MAX_AMOUNT`]
    pub fn is_within_limit(&self) -> bool {
        self.amount > 0 && self.amount <= Self::MAX_AMOUNT
    }

    /// Format for display (e.g., "$10.00")
    pub fn display(&self) -> String {
        let symbol = match self.currency {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
        };
        if self.currency.decimal_places() == 0 {
            format!("{}{}", symbol, self.amount)
        } else {
            format!(
                "{}{:.2}",
                symbol,
                self.currency.from_smallest_unit(self.amount)
            )
        }
    }
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Document id
    #[serde(default = "new_id")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Unit price
    pub price: Price,

    /// Smallest quantity a single order may request
    #[serde(default = "default_minimum_quantity")]
    pub minimum_quantity: u32,

    /// Units in stock
    pub available_quantity: u32,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_minimum_quantity() -> u32 {
    1
}

impl Product {
    /// Create a product with a generated id
    pub fn new(name: impl Into<String>, price: Price, available_quantity: u32) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description: String::new(),
            image: None,
            price,
            minimum_quantity: 1,
            available_quantity,
        }
    }

    /// Builder: set id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set minimum order quantity
    pub fn with_minimum_quantity(mut self, minimum: u32) -> Self {
        self.minimum_quantity = minimum;
        self
    }

    /// Check whether an order for `quantity` units can be placed
    pub fn accepts_quantity(&self, quantity: u32) -> bool {
        quantity >= self.minimum_quantity && quantity <= self.available_quantity
    }
}

/// Seed catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ProductCatalog {
    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
