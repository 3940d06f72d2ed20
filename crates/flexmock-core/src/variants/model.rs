//! Variant model handed to the UI layer.

use crate::variants::layer::Layer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantModelEntry {
    pub key: String,
    pub title: String,
    pub layer: Layer,
    pub favorite: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantManagementModel {
    pub default_variant: String,
    /// One-shot initial variant if one was selected, otherwise the default
    pub current_variant: String,
    pub variants: Vec<VariantModelEntry>,
}
