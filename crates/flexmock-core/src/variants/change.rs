//! Change records and the change-file payload they arrive in.

use crate::variants::layer::Layer;
use crate::variants::variant::Variant;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const SET_TITLE: &str = "setTitle";
pub const SET_FAVORITE: &str = "setFavorite";
pub const SET_VISIBLE: &str = "setVisible";
pub const SET_DEFAULT: &str = "setDefault";

/// Change records grouped by change type, in insertion order per type.
pub type ChangeBuckets = BTreeMap<String, Vec<VariantChange>>;

/// Opaque change applied to a UI control.
///
/// Only the identifying fields are typed; everything else is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlChange {
    pub file_name: String,
    #[serde(default)]
    pub change_type: String,
    #[serde(default)]
    pub layer: Layer,
    #[serde(default)]
    pub selector: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ControlChange {
    pub fn id(&self) -> &str {
        &self.file_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    pub id: String,
}

/// Change to a variant's own metadata or to its variant management.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantChange {
    pub file_name: String,
    pub change_type: String,
    #[serde(default)]
    pub layer: Layer,
    pub selector: Selector,
    #[serde(default)]
    pub content: Map<String, Value>,
    #[serde(default)]
    pub texts: Map<String, Value>,
}

impl VariantChange {
    /// `texts.<name>.value`
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name)?.get("value")?.as_str()
    }

    pub fn content_bool(&self, name: &str) -> Option<bool> {
        self.content.get(name)?.as_bool()
    }

    pub fn content_str(&self, name: &str) -> Option<&str> {
        self.content.get(name)?.as_str()
    }
}

/// Change record tagged by its `fileType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fileType")]
pub enum ChangeRecord {
    /// Targets the variant named by `selector.id`
    #[serde(rename = "ctrl_variant_change")]
    Variant(VariantChange),
    /// Targets the variant management named by `selector.id`
    #[serde(rename = "ctrl_variant_management_change")]
    Management(VariantChange),
}

impl ChangeRecord {
    pub fn change(&self) -> &VariantChange {
        match self {
            ChangeRecord::Variant(change) | ChangeRecord::Management(change) => change,
        }
    }
}

/// Variants and management changes of one variant management reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSection {
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub variant_management_changes: ChangeBuckets,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Changes {
    #[serde(default)]
    pub variant_section: BTreeMap<String, VariantSection>,
}

/// Parsed change-file payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeFileContent {
    #[serde(default)]
    pub changes: Changes,
}
