//! Variant records as they appear in the change-file payload.

use crate::variants::change::{
    ChangeBuckets, ControlChange, VariantChange, SET_FAVORITE, SET_TITLE, SET_VISIBLE,
};
use crate::variants::layer::Layer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

fn default_true() -> bool {
    true
}

/// Presentation properties of a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantProperties {
    pub title: String,
    #[serde(default = "default_true")]
    pub favorite: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The variant file itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantContent {
    pub file_name: String,
    #[serde(default)]
    pub layer: Layer,
    /// Base variant whose changes this variant builds on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_reference: Option<String>,
    pub content: VariantProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A variant with its control changes and metadata change buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub content: VariantContent,
    #[serde(default)]
    pub control_changes: Vec<ControlChange>,
    #[serde(default)]
    pub variant_changes: ChangeBuckets,
}

impl Variant {
    /// Minimal variant, mostly useful for building stores by hand.
    pub fn new(file_name: impl Into<String>, title: impl Into<String>, layer: Layer) -> Self {
        Self {
            content: VariantContent {
                file_name: file_name.into(),
                layer,
                variant_reference: None,
                content: VariantProperties {
                    title: title.into(),
                    favorite: true,
                    visible: true,
                    extra: Map::new(),
                },
                extra: Map::new(),
            },
            control_changes: Vec::new(),
            variant_changes: ChangeBuckets::new(),
        }
    }

    pub fn with_reference(mut self, variant_reference: impl Into<String>) -> Self {
        self.content.variant_reference = Some(variant_reference.into());
        self
    }

    pub fn with_control_changes(mut self, changes: Vec<ControlChange>) -> Self {
        self.control_changes = changes;
        self
    }

    pub fn id(&self) -> &str {
        &self.content.file_name
    }

    pub fn title(&self) -> &str {
        &self.content.content.title
    }

    /// Referenced base variant; an empty reference counts as none.
    pub fn variant_reference(&self) -> Option<&str> {
        self.content
            .variant_reference
            .as_deref()
            .filter(|r| !r.is_empty())
    }

    /// Properties after applying the last `setTitle`/`setFavorite`/`setVisible` change.
    pub fn effective_properties(&self) -> VariantProperties {
        let mut props = self.content.content.clone();
        for (change_type, bucket) in &self.variant_changes {
            let Some(active) = bucket.last() else {
                continue;
            };
            match change_type.as_str() {
                SET_TITLE => {
                    if let Some(title) = active.text("title") {
                        props.title = title.to_string();
                    }
                }
                SET_FAVORITE => {
                    if let Some(favorite) = active.content_bool("favorite") {
                        props.favorite = favorite;
                    }
                }
                SET_VISIBLE => {
                    if let Some(visible) = active.content_bool("visible") {
                        props.visible = visible;
                    }
                }
                other => tracing::error!(
                    "No valid changes on variant {} available (change type {})",
                    props.title,
                    other
                ),
            }
        }
        props
    }

    pub(crate) fn bucket_mut(&mut self, change_type: &str) -> &mut Vec<VariantChange> {
        self.variant_changes
            .entry(change_type.to_string())
            .or_default()
    }
}

/// Case-insensitive title ordering.
pub fn compare_variants(a: &Variant, b: &Variant) -> Ordering {
    a.title().to_lowercase().cmp(&b.title().to_lowercase())
}

/// Position among `variants` (already sorted) where `candidate` goes; after equal titles.
pub fn sorted_index(variants: &[Variant], candidate: &Variant) -> usize {
    variants
        .iter()
        .position(|existing| compare_variants(candidate, existing) == Ordering::Less)
        .unwrap_or(variants.len())
}

/// Metadata overwrite used when a variant is renamed or toggled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub favorite: Option<bool>,
    #[serde(default)]
    pub visible: Option<bool>,
}
