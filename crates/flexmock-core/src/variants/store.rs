//! Variant store: variants and change records per variant management reference.
//!
//! Within each variant management the standard variant (the one whose file name equals
//! the management reference) stays at index 0 and all other variants are kept in
//! case-insensitive title order, stable on ties.

use crate::variants::change::{
    ChangeBuckets, ChangeFileContent, ChangeRecord, ControlChange, VariantChange, VariantSection,
    SET_DEFAULT,
};
use crate::variants::layer::Layer;
use crate::variants::model::{VariantManagementModel, VariantModelEntry};
use crate::variants::switch::VariantSwitch;
use crate::variants::variant::{compare_variants, sorted_index, Variant, VariantData};
use std::collections::{BTreeMap, HashMap};

/// App version used when none is given.
pub const DEFAULT_APP_VERSION: &str = "DEFAULT_APP_VERSION";

/// State of one variant management reference.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantManagement {
    pub variants: Vec<Variant>,
    pub default_variant: String,
    /// Selected from outside (e.g. URL parameters); consumed by the first model fill
    pub initial_variant: Option<String>,
    pub variant_management_changes: ChangeBuckets,
}

impl VariantManagement {
    fn build(reference: &str, section: VariantSection, selected_variants: &[String]) -> Self {
        let mut variants = section.variants;
        variants.sort_by(compare_variants);
        if let Some(index) = variants.iter().position(|v| v.id() == reference) {
            let standard = variants.remove(index);
            variants.insert(0, standard);
        }

        let initial_variant = selected_variants
            .iter()
            .find(|selected| variants.iter().any(|v| v.id() == selected.as_str()))
            .cloned();

        let mut entry = Self {
            variants,
            default_variant: reference.to_string(),
            initial_variant,
            variant_management_changes: section.variant_management_changes,
        };
        entry.apply_management_changes(reference);
        entry
    }

    /// Default variant from the last `setDefault` change, or the standard variant.
    fn apply_management_changes(&mut self, reference: &str) {
        self.default_variant = self
            .variant_management_changes
            .get(SET_DEFAULT)
            .and_then(|bucket| bucket.last())
            .and_then(|change| change.content_str("defaultVariant"))
            .unwrap_or(reference)
            .to_string();
    }

    pub fn variant(&self, variant_reference: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id() == variant_reference)
    }

    fn variant_mut(&mut self, variant_reference: &str) -> Option<&mut Variant> {
        self.variants.iter_mut().find(|v| v.id() == variant_reference)
    }

    /// Insert after the standard variant at the title-sorted position.
    fn insert_sorted(&mut self, variant: Variant) -> usize {
        let others = self.variants.get(1..).unwrap_or(&[]);
        let index = (sorted_index(others, &variant) + 1).min(self.variants.len());
        self.variants.insert(index, variant);
        index
    }
}

/// In-memory variant structure of one component, built from its change-file payload.
#[derive(Debug, Clone)]
pub struct VariantStore {
    component_name: String,
    app_version: String,
    current_layer: Layer,
    entries: BTreeMap<String, VariantManagement>,
}

impl VariantStore {
    /// Build the store from a change-file payload.
    ///
    /// `selected_variants` are externally requested variant references; per variant
    /// management the first one naming one of its variants becomes the initial variant.
    pub fn new(
        component_name: impl Into<String>,
        app_version: impl Into<String>,
        content: ChangeFileContent,
        selected_variants: &[String],
    ) -> Self {
        let app_version = app_version.into();
        let entries = content
            .changes
            .variant_section
            .into_iter()
            .map(|(reference, section)| {
                let entry = VariantManagement::build(&reference, section, selected_variants);
                (reference, entry)
            })
            .collect();

        Self {
            component_name: component_name.into(),
            app_version: if app_version.is_empty() {
                DEFAULT_APP_VERSION.to_string()
            } else {
                app_version
            },
            current_layer: Layer::Customer,
            entries,
        }
    }

    /// Layer new variants are created in; referenced changes below it are inherited.
    pub fn with_current_layer(mut self, layer: Layer) -> Self {
        self.current_layer = layer;
        self
    }

    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    pub fn current_layer(&self) -> Layer {
        self.current_layer
    }

    pub fn variant_management_references(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn variant_management(&self, vm_reference: &str) -> Option<&VariantManagement> {
        self.entries.get(vm_reference)
    }

    pub fn default_variant(&self, vm_reference: &str) -> Option<&str> {
        self.entries
            .get(vm_reference)
            .map(|entry| entry.default_variant.as_str())
    }

    pub fn initial_variant(&self, vm_reference: &str) -> Option<&str> {
        self.entries
            .get(vm_reference)
            .and_then(|entry| entry.initial_variant.as_deref())
    }

    /// Variants of a variant management; empty when the reference is unknown.
    pub fn variants(&self, vm_reference: &str) -> &[Variant] {
        self.entries
            .get(vm_reference)
            .map_or(&[], |entry| entry.variants.as_slice())
    }

    pub fn variant(&self, vm_reference: &str, variant_reference: &str) -> Option<&Variant> {
        self.entries.get(vm_reference)?.variant(variant_reference)
    }

    /// Control changes of a variant, or of the default variant when none is given.
    pub fn variant_changes(
        &self,
        vm_reference: &str,
        variant_reference: Option<&str>,
    ) -> Vec<ControlChange> {
        let Some(entry) = self.entries.get(vm_reference) else {
            return Vec::new();
        };
        let variant_reference = variant_reference.unwrap_or(&entry.default_variant);
        entry
            .variant(variant_reference)
            .map(|v| v.control_changes.clone())
            .unwrap_or_default()
    }

    /// Control changes of every initial variant, or of the default where none was selected.
    pub fn load_initial_changes(&self) -> Vec<ControlChange> {
        self.entries
            .iter()
            .flat_map(|(reference, entry)| {
                let variant = entry
                    .initial_variant
                    .as_deref()
                    .unwrap_or(&entry.default_variant);
                self.variant_changes(reference, Some(variant))
            })
            .collect()
    }

    /// Changes to revert and apply when switching from `current` to `target`.
    pub fn changes_for_variant_switch(
        &self,
        vm_reference: &str,
        current: &str,
        target: &str,
        materialized: &HashMap<String, Vec<ControlChange>>,
    ) -> VariantSwitch {
        VariantSwitch::between(
            &self.variant_changes(vm_reference, Some(current)),
            &self.variant_changes(vm_reference, Some(target)),
            materialized,
        )
    }

    /// Replace the control changes of a variant.
    ///
    /// Returns `false` (and logs) if either reference is empty or unknown.
    pub fn set_variant_changes(
        &mut self,
        vm_reference: &str,
        variant_reference: &str,
        changes: Vec<ControlChange>,
    ) -> bool {
        if vm_reference.is_empty() || variant_reference.is_empty() {
            tracing::error!("Cannot set variant changes without Variant reference");
            return false;
        }
        let Some(variant) = self
            .entries
            .get_mut(vm_reference)
            .and_then(|entry| entry.variant_mut(variant_reference))
        else {
            tracing::error!(
                "Cannot set variant changes: variant {} not found in {}",
                variant_reference,
                vm_reference
            );
            return false;
        };
        variant.control_changes = changes;
        true
    }

    /// Append a control change; no-op returning `false` if its file name is already present.
    pub fn add_change_to_variant(
        &mut self,
        vm_reference: &str,
        variant_reference: &str,
        change: ControlChange,
    ) -> bool {
        let mut changes = self.variant_changes(vm_reference, Some(variant_reference));
        if changes.iter().any(|c| c.id() == change.id()) {
            return false;
        }
        changes.push(change);
        self.set_variant_changes(vm_reference, variant_reference, changes)
    }

    /// Remove a control change by id; absent changes are ignored.
    pub fn remove_change_from_variant(
        &mut self,
        vm_reference: &str,
        variant_reference: &str,
        change: &ControlChange,
    ) -> bool {
        let mut changes = self.variant_changes(vm_reference, Some(variant_reference));
        changes.retain(|c| c.id() != change.id());
        self.set_variant_changes(vm_reference, variant_reference, changes)
    }

    /// Insert a new variant at its sorted position and return its index.
    ///
    /// A variant referencing a base variant inherits the base's control changes whose
    /// layer is below the current layer, ahead of its own.
    pub fn add_variant(&mut self, vm_reference: &str, mut variant: Variant) -> Option<usize> {
        if let Some(base) = variant.variant_reference() {
            let current_layer = self.current_layer;
            let mut changes: Vec<ControlChange> = self
                .variant_changes(vm_reference, Some(base))
                .into_iter()
                .filter(|c| c.layer < current_layer)
                .collect();
            changes.append(&mut variant.control_changes);
            variant.control_changes = changes;
        }

        let entry = self.entries.get_mut(vm_reference)?;
        Some(entry.insert_sorted(variant))
    }

    /// Remove a variant by file name and return the index it had.
    pub fn remove_variant(&mut self, vm_reference: &str, variant_reference: &str) -> Option<usize> {
        let entry = self.entries.get_mut(vm_reference)?;
        let index = entry.variants.iter().position(|v| v.id() == variant_reference)?;
        entry.variants.remove(index);
        Some(index)
    }

    /// Overwrite metadata of the variant at `previous_index` and move it to its new
    /// sorted position. The standard variant keeps index 0.
    pub fn set_variant_data(
        &mut self,
        vm_reference: &str,
        previous_index: usize,
        data: &VariantData,
    ) -> Option<usize> {
        let entry = self.entries.get_mut(vm_reference)?;
        let variant = entry.variants.get_mut(previous_index)?;

        let props = &mut variant.content.content;
        if let Some(title) = &data.title {
            props.title = title.clone();
        }
        if let Some(favorite) = data.favorite {
            props.favorite = favorite;
        }
        if let Some(visible) = data.visible {
            props.visible = visible;
        }

        if variant.id() == vm_reference {
            return Some(previous_index);
        }
        let variant = entry.variants.remove(previous_index);
        Some(entry.insert_sorted(variant))
    }

    /// Add a change record to, or remove it by file name from, its change-type bucket.
    ///
    /// Variant changes go to the variant named by their selector, management changes to
    /// the variant management itself. Returns `false` if the target does not exist.
    pub fn update_variant_change_buckets(
        &mut self,
        vm_reference: &str,
        record: &ChangeRecord,
        add: bool,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(vm_reference) else {
            return false;
        };

        match record {
            ChangeRecord::Variant(change) => {
                let Some(variant) = entry.variant_mut(&change.selector.id) else {
                    return false;
                };
                update_bucket(variant.bucket_mut(&change.change_type), change, add);
            }
            ChangeRecord::Management(change) => {
                let bucket = entry
                    .variant_management_changes
                    .entry(change.change_type.clone())
                    .or_default();
                update_bucket(bucket, change, add);
                if change.change_type == SET_DEFAULT {
                    entry.apply_management_changes(vm_reference);
                }
            }
        }
        true
    }

    /// Build the variant model and consume every one-shot initial variant.
    pub fn fill_variant_model(&mut self) -> BTreeMap<String, VariantManagementModel> {
        self.entries
            .iter_mut()
            .map(|(reference, entry)| {
                let current_variant = entry
                    .initial_variant
                    .take()
                    .unwrap_or_else(|| entry.default_variant.clone());
                let variants = entry
                    .variants
                    .iter()
                    .map(|variant| {
                        let props = variant.effective_properties();
                        VariantModelEntry {
                            key: variant.id().to_string(),
                            title: props.title,
                            layer: variant.content.layer,
                            favorite: props.favorite,
                            visible: props.visible,
                        }
                    })
                    .collect();

                let model = VariantManagementModel {
                    default_variant: entry.default_variant.clone(),
                    current_variant,
                    variants,
                };
                (reference.clone(), model)
            })
            .collect()
    }
}

fn update_bucket(bucket: &mut Vec<VariantChange>, change: &VariantChange, add: bool) {
    if add {
        bucket.push(change.clone());
    } else if let Some(index) = bucket.iter().position(|c| c.file_name == change.file_name) {
        bucket.remove(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::change::{Selector, SET_TITLE};
    use rstest::rstest;
    use serde_json::{json, Map, Value};

    const VM: &str = "variantMgmtId1";

    fn control(id: &str, layer: &str) -> Value {
        json!({
            "fileName": id,
            "fileType": "change",
            "changeType": "hideControl",
            "layer": layer,
            "selector": {"id": format!("button_{id}")}
        })
    }

    fn payload() -> ChangeFileContent {
        serde_json::from_value(json!({
            "changes": {
                "variantSection": {
                    VM: {
                        "variants": [
                            {
                                "content": {
                                    "fileName": "variant0",
                                    "layer": "CUSTOMER",
                                    "variantReference": VM,
                                    "content": {"title": "Personal"}
                                },
                                "controlChanges": [control("c1", "CUSTOMER"), control("c2", "CUSTOMER")]
                            },
                            {
                                "content": {
                                    "fileName": VM,
                                    "layer": "VENDOR",
                                    "content": {"title": "Standard"}
                                },
                                "controlChanges": [control("c0", "VENDOR"), control("c9", "CUSTOMER")]
                            },
                            {
                                "content": {
                                    "fileName": "variant2",
                                    "layer": "CUSTOMER",
                                    "content": {"title": "archive", "favorite": false}
                                },
                                "variantChanges": {
                                    "setTitle": [{
                                        "fileName": "t1",
                                        "changeType": "setTitle",
                                        "layer": "USER",
                                        "selector": {"id": "variant2"},
                                        "texts": {"title": {"value": "Archive (renamed)"}}
                                    }]
                                }
                            },
                            {
                                "content": {
                                    "fileName": "variant3",
                                    "layer": "USER",
                                    "content": {"title": "personal"}
                                },
                                "controlChanges": [control("c0", "VENDOR"), control("c3", "USER")]
                            }
                        ],
                        "variantManagementChanges": {
                            "setDefault": [{
                                "fileName": "d1",
                                "changeType": "setDefault",
                                "layer": "CUSTOMER",
                                "selector": {"id": VM},
                                "content": {"defaultVariant": "variant0"}
                            }]
                        }
                    },
                    "vm2": {
                        "variants": [{
                            "content": {"fileName": "vm2", "content": {"title": "Standard"}}
                        }]
                    }
                }
            }
        }))
        .expect("valid payload")
    }

    fn selected() -> Vec<String> {
        vec!["unknown".to_string(), "variant3".to_string(), "variant0".to_string()]
    }

    fn store() -> VariantStore {
        VariantStore::new("my.app.Component", "1.2.3", payload(), &selected())
    }

    fn ids(variants: &[Variant]) -> Vec<&str> {
        variants.iter().map(|v| v.id()).collect()
    }

    fn change_ids(changes: &[ControlChange]) -> Vec<&str> {
        changes.iter().map(|c| c.id()).collect()
    }

    fn control_change(id: &str, layer: &str) -> ControlChange {
        serde_json::from_value(control(id, layer)).expect("valid change")
    }

    fn variant_change(file_name: &str, change_type: &str, selector: &str) -> VariantChange {
        VariantChange {
            file_name: file_name.to_string(),
            change_type: change_type.to_string(),
            layer: Layer::User,
            selector: Selector {
                id: selector.to_string(),
            },
            content: Map::new(),
            texts: Map::new(),
        }
    }

    fn assert_ordering_invariant(store: &VariantStore, vm: &str) {
        let variants = store.variants(vm);
        assert_eq!(variants[0].id(), vm);
        for pair in variants[1..].windows(2) {
            assert_ne!(
                compare_variants(&pair[0], &pair[1]),
                std::cmp::Ordering::Greater
            );
        }
    }

    #[rstest]
    fn test_component_and_app_version() {
        let store = store();
        assert_eq!(store.component_name(), "my.app.Component");
        assert_eq!(store.app_version(), "1.2.3");
        assert_eq!(store.current_layer(), Layer::Customer);

        let unnamed = VariantStore::new("", "", ChangeFileContent::default(), &[]);
        assert_eq!(unnamed.app_version(), DEFAULT_APP_VERSION);
        assert_eq!(unnamed.variant_management_references().count(), 0);
    }

    #[rstest]
    fn test_construction_puts_standard_first_then_sorts_by_title() {
        let store = store();
        assert_eq!(
            ids(store.variants(VM)),
            vec![VM, "variant2", "variant0", "variant3"]
        );
        assert_ordering_invariant(&store, VM);
        assert_eq!(
            store.variant_management_references().collect::<Vec<_>>(),
            vec![VM, "vm2"]
        );
    }

    #[rstest]
    fn test_construction_applies_set_default_and_initial_variant() {
        let store = store();
        assert_eq!(store.default_variant(VM), Some("variant0"));
        assert_eq!(store.initial_variant(VM), Some("variant3"));
        assert_eq!(store.default_variant("vm2"), Some("vm2"));
        assert_eq!(store.initial_variant("vm2"), None);
    }

    #[rstest]
    fn test_missing_flags_default_to_true() {
        let store = store();
        let standard = store.variant(VM, VM).expect("standard");
        assert!(standard.content.content.favorite);
        assert!(standard.content.content.visible);
        assert!(!store.variant(VM, "variant2").expect("variant2").content.content.favorite);
    }

    #[rstest]
    fn test_queries_on_unknown_references() {
        let store = store();
        assert!(store.variants("nope").is_empty());
        assert!(store.variant(VM, "nope").is_none());
        assert!(store.variant_changes("nope", None).is_empty());
        assert!(store.variant_changes(VM, Some("nope")).is_empty());
        assert_eq!(store.default_variant("nope"), None);
    }

    #[rstest]
    fn test_variant_changes_fall_back_to_default_variant() {
        let store = store();
        assert_eq!(change_ids(&store.variant_changes(VM, None)), vec!["c1", "c2"]);
        assert_eq!(change_ids(&store.variant_changes(VM, Some(VM))), vec!["c0", "c9"]);
    }

    #[rstest]
    fn test_load_initial_changes_prefers_initial_variant() {
        let store = store();
        assert_eq!(change_ids(&store.load_initial_changes()), vec!["c0", "c3"]);
    }

    #[rstest]
    fn test_fill_variant_model_consumes_initial_variant() {
        let mut store = store();

        let model = store.fill_variant_model();
        let vm = &model[VM];
        assert_eq!(vm.default_variant, "variant0");
        assert_eq!(vm.current_variant, "variant3");
        assert_eq!(vm.variants.len(), 4);
        assert_eq!(vm.variants[1].key, "variant2");
        assert_eq!(vm.variants[1].title, "Archive (renamed)");
        assert!(!vm.variants[1].favorite);
        assert_eq!(vm.variants[3].layer, Layer::User);
        assert_eq!(model["vm2"].current_variant, "vm2");

        let again = store.fill_variant_model();
        assert_eq!(again[VM].current_variant, "variant0");
        assert_eq!(store.initial_variant(VM), None);
    }

    #[rstest]
    fn test_model_serializes_in_camel_case() {
        let mut store = store();
        let model = store.fill_variant_model();
        let value = serde_json::to_value(&model["vm2"]).expect("serialize");
        assert_eq!(
            value,
            json!({
                "defaultVariant": "vm2",
                "currentVariant": "vm2",
                "variants": [{
                    "key": "vm2",
                    "title": "Standard",
                    "layer": "VENDOR",
                    "favorite": true,
                    "visible": true
                }]
            })
        );
    }

    #[rstest]
    fn test_add_change_is_no_op_for_duplicate() {
        let mut store = store();
        assert!(!store.add_change_to_variant(VM, "variant0", control_change("c1", "CUSTOMER")));
        assert!(store.add_change_to_variant(VM, "variant0", control_change("c4", "CUSTOMER")));
        assert_eq!(
            change_ids(&store.variant_changes(VM, Some("variant0"))),
            vec!["c1", "c2", "c4"]
        );
    }

    #[rstest]
    fn test_remove_change_is_no_op_when_absent() {
        let mut store = store();
        let before = store.variant_changes(VM, Some("variant0"));
        store.remove_change_from_variant(VM, "variant0", &control_change("zz", "USER"));
        assert_eq!(store.variant_changes(VM, Some("variant0")), before);

        store.remove_change_from_variant(VM, "variant0", &control_change("c1", "USER"));
        assert_eq!(
            change_ids(&store.variant_changes(VM, Some("variant0"))),
            vec!["c2"]
        );
    }

    #[rstest]
    #[case("", "variant0")]
    #[case(VM, "")]
    #[case("nope", "variant0")]
    #[case(VM, "nope")]
    fn test_set_variant_changes_rejects_invalid_references(
        #[case] vm: &str,
        #[case] variant: &str,
    ) {
        let mut store = store();
        assert!(!store.set_variant_changes(vm, variant, vec![control_change("x", "USER")]));
        assert_eq!(
            change_ids(&store.variant_changes(VM, Some("variant0"))),
            vec!["c1", "c2"]
        );
    }

    #[rstest]
    fn test_set_variant_changes_replaces_list() {
        let mut store = store();
        assert!(store.set_variant_changes(VM, "variant0", vec![control_change("x", "USER")]));
        assert_eq!(change_ids(&store.variant_changes(VM, None)), vec!["x"]);
    }

    #[rstest]
    fn test_add_variant_inherits_referenced_changes_below_current_layer() {
        let mut store = store();
        let variant = Variant::new("variant4", "Beta", Layer::Customer)
            .with_reference(VM)
            .with_control_changes(vec![control_change("c5", "CUSTOMER")]);

        assert_eq!(store.add_variant(VM, variant), Some(2));
        assert_eq!(
            change_ids(&store.variant_changes(VM, Some("variant4"))),
            vec!["c0", "c5"]
        );
        assert_ordering_invariant(&store, VM);
    }

    #[rstest]
    fn test_add_variant_respects_current_layer() {
        let mut store = store().with_current_layer(Layer::User);
        let variant = Variant::new("variant4", "Beta", Layer::User).with_reference(VM);
        store.add_variant(VM, variant);
        assert_eq!(
            change_ids(&store.variant_changes(VM, Some("variant4"))),
            vec!["c0", "c9"]
        );
    }

    #[rstest]
    #[case("Aardvark", 1)]
    #[case("PERSONAL", 4)]
    #[case("zebra", 4)]
    fn test_add_variant_sorted_position(#[case] title: &str, #[case] expected: usize) {
        let mut store = store();
        let index = store.add_variant(VM, Variant::new("new", title, Layer::User));
        assert_eq!(index, Some(expected));
        assert_eq!(store.variants(VM)[expected].id(), "new");
        assert_ordering_invariant(&store, VM);
    }

    #[rstest]
    fn test_add_variant_to_unknown_management() {
        let mut store = store();
        assert_eq!(store.add_variant("nope", Variant::new("v", "t", Layer::User)), None);
    }

    #[rstest]
    fn test_remove_variant() {
        let mut store = store();
        assert_eq!(store.remove_variant(VM, "variant0"), Some(2));
        assert_eq!(ids(store.variants(VM)), vec![VM, "variant2", "variant3"]);
        assert_eq!(store.remove_variant(VM, "variant0"), None);
    }

    #[rstest]
    fn test_set_variant_data_resorts_non_standard_variant() {
        let mut store = store();
        let data = VariantData {
            title: Some("zulu".to_string()),
            favorite: Some(true),
            visible: Some(false),
        };
        assert_eq!(store.set_variant_data(VM, 1, &data), Some(3));

        let moved = store.variant(VM, "variant2").expect("variant2");
        assert_eq!(moved.title(), "zulu");
        assert!(moved.content.content.favorite);
        assert!(!moved.content.content.visible);
        assert_ordering_invariant(&store, VM);
    }

    #[rstest]
    fn test_set_variant_data_keeps_standard_first() {
        let mut store = store();
        let data = VariantData {
            title: Some("zzz".to_string()),
            ..VariantData::default()
        };
        assert_eq!(store.set_variant_data(VM, 0, &data), Some(0));
        assert_eq!(store.variants(VM)[0].title(), "zzz");
        assert_eq!(store.set_variant_data(VM, 9, &data), None);
    }

    #[rstest]
    fn test_variant_change_buckets_last_write_wins() {
        let mut store = store();
        let mut first = variant_change("t2", SET_TITLE, "variant0");
        first
            .texts
            .insert("title".to_string(), json!({"value": "First"}));
        let mut second = variant_change("t3", SET_TITLE, "variant0");
        second
            .texts
            .insert("title".to_string(), json!({"value": "Second"}));

        assert!(store.update_variant_change_buckets(VM, &ChangeRecord::Variant(first), true));
        assert!(store.update_variant_change_buckets(
            VM,
            &ChangeRecord::Variant(second.clone()),
            true
        ));
        assert_eq!(store.fill_variant_model()[VM].variants[2].title, "Second");

        assert!(store.update_variant_change_buckets(VM, &ChangeRecord::Variant(second), false));
        assert_eq!(store.fill_variant_model()[VM].variants[2].title, "First");
    }

    #[rstest]
    fn test_variant_change_for_unknown_variant() {
        let mut store = store();
        let change = variant_change("t2", SET_TITLE, "nope");
        assert!(!store.update_variant_change_buckets(VM, &ChangeRecord::Variant(change), true));
    }

    #[rstest]
    fn test_management_change_updates_default_variant() {
        let mut store = store();
        let mut change = variant_change("d2", SET_DEFAULT, VM);
        change
            .content
            .insert("defaultVariant".to_string(), json!("variant3"));
        let record = ChangeRecord::Management(change);

        store.update_variant_change_buckets(VM, &record, true);
        assert_eq!(store.default_variant(VM), Some("variant3"));

        store.update_variant_change_buckets(VM, &record, false);
        assert_eq!(store.default_variant(VM), Some("variant0"));
        assert_eq!(
            store.variant_management(VM).expect("vm").variant_management_changes[SET_DEFAULT].len(),
            1
        );
    }

    #[rstest]
    fn test_changes_for_variant_switch_round_trip() {
        let store = store();
        let on_controls = |changes: Vec<ControlChange>| {
            let mut map: HashMap<String, Vec<ControlChange>> = HashMap::new();
            for change in changes {
                let control = change.selector["id"].as_str().unwrap_or_default().to_string();
                map.entry(control).or_default().push(change);
            }
            map
        };

        let forth = store.changes_for_variant_switch(
            VM,
            "variant3",
            VM,
            &on_controls(store.variant_changes(VM, Some("variant3"))),
        );
        assert_eq!(change_ids(&forth.revert), vec!["c3"]);
        assert_eq!(change_ids(&forth.apply), vec!["c9"]);

        let back = store.changes_for_variant_switch(
            VM,
            VM,
            "variant3",
            &on_controls(store.variant_changes(VM, Some(VM))),
        );
        assert_eq!(change_ids(&back.revert), vec!["c9"]);
        assert_eq!(change_ids(&back.apply), vec!["c3"]);
    }
}
