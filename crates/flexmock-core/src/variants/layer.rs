//! Provenance layers deciding which changes take precedence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Layers ordered from the base vendor layer up to end-user personalization.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Layer {
    #[default]
    Vendor,
    Partner,
    CustomerBase,
    Customer,
    User,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Vendor => "VENDOR",
            Layer::Partner => "PARTNER",
            Layer::CustomerBase => "CUSTOMER_BASE",
            Layer::Customer => "CUSTOMER",
            Layer::User => "USER",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown layer: {0}")]
pub struct UnknownLayer(pub String);

impl FromStr for Layer {
    type Err = UnknownLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VENDOR" => Ok(Layer::Vendor),
            "PARTNER" => Ok(Layer::Partner),
            "CUSTOMER_BASE" => Ok(Layer::CustomerBase),
            "CUSTOMER" => Ok(Layer::Customer),
            "USER" => Ok(Layer::User),
            _ => Err(UnknownLayer(s.to_string())),
        }
    }
}
