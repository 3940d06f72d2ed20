//! NAPI bindings for the variant store.
//!
//! Payloads cross the boundary as plain JSON so change records keep every field.

use flexmock_core::config::parser;
use flexmock_core::variants::{
    ChangeFileContent, ChangeRecord, ControlChange, Layer, Variant, VariantData, VariantStore,
    DEFAULT_APP_VERSION,
};
use napi::bindgen_prelude::*;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

fn from_js<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::from_reason(e.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::from_reason(e.to_string()))
}

fn to_js_list<T: Serialize>(values: &[T]) -> Result<Vec<Value>> {
    values.iter().map(to_js).collect()
}

fn from_js_list<T: DeserializeOwned>(values: Vec<Value>) -> Result<Vec<T>> {
    values.into_iter().map(from_js).collect()
}

#[napi]
pub struct VariantController {
    inner: Arc<Mutex<VariantStore>>,
}

#[napi]
impl VariantController {
    /// Build the controller from a change-file payload.
    ///
    /// @param componentName - Owning component
    /// @param appVersion - Defaults to `DEFAULT_APP_VERSION`
    /// @param content - `{ changes: { variantSection: {...} } }`
    /// @param selectedVariants - Externally selected variant references
    /// @param currentLayer - Layer new variants are created in; defaults to `CUSTOMER`
    #[napi(constructor)]
    pub fn new(
        component_name: String,
        app_version: Option<String>,
        content: Value,
        selected_variants: Option<Vec<String>>,
        current_layer: Option<String>,
    ) -> Result<Self> {
        let content: ChangeFileContent = from_js(content)?;
        Self::build(component_name, app_version, content, selected_variants, current_layer)
    }

    /// Build the controller from a change file (JSON, JSONC or YAML).
    #[napi(factory)]
    pub fn from_file(
        component_name: String,
        app_version: Option<String>,
        path: String,
        selected_variants: Option<Vec<String>>,
        current_layer: Option<String>,
    ) -> Result<Self> {
        let content: ChangeFileContent = parser::load_config_file(&path)
            .map_err(|e| Error::from_reason(format!("Failed to load changes: {e}")))?;
        Self::build(component_name, app_version, content, selected_variants, current_layer)
    }

    fn build(
        component_name: String,
        app_version: Option<String>,
        content: ChangeFileContent,
        selected_variants: Option<Vec<String>>,
        current_layer: Option<String>,
    ) -> Result<Self> {
        let layer = match current_layer {
            Some(name) => name
                .parse::<Layer>()
                .map_err(|e| Error::from_reason(e.to_string()))?,
            None => Layer::Customer,
        };
        let store = VariantStore::new(
            component_name,
            app_version.unwrap_or_else(|| DEFAULT_APP_VERSION.to_string()),
            content,
            &selected_variants.unwrap_or_default(),
        )
        .with_current_layer(layer);
        tracing::debug!(
            "Variant controller created for {} ({})",
            store.component_name(),
            store.app_version()
        );

        Ok(Self {
            inner: Arc::new(Mutex::new(store)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, VariantStore>> {
        self.inner
            .lock()
            .map_err(|_| Error::from_reason("Variant store lock poisoned"))
    }

    #[napi(getter)]
    pub fn component_name(&self) -> Result<String> {
        Ok(self.lock()?.component_name().to_string())
    }

    #[napi(getter)]
    pub fn app_version(&self) -> Result<String> {
        Ok(self.lock()?.app_version().to_string())
    }

    #[napi]
    pub fn get_default_variant(&self, vm_reference: String) -> Result<Option<String>> {
        Ok(self.lock()?.default_variant(&vm_reference).map(String::from))
    }

    #[napi]
    pub fn get_initial_variant(&self, vm_reference: String) -> Result<Option<String>> {
        Ok(self.lock()?.initial_variant(&vm_reference).map(String::from))
    }

    #[napi]
    pub fn get_variants(&self, vm_reference: String) -> Result<Vec<Value>> {
        to_js_list(self.lock()?.variants(&vm_reference))
    }

    #[napi]
    pub fn get_variant(
        &self,
        vm_reference: String,
        variant_reference: String,
    ) -> Result<Option<Value>> {
        let store = self.lock()?;
        store
            .variant(&vm_reference, &variant_reference)
            .map(to_js)
            .transpose()
    }

    /// Control changes of a variant, or of the default variant when omitted
    #[napi]
    pub fn get_variant_changes(
        &self,
        vm_reference: String,
        variant_reference: Option<String>,
    ) -> Result<Vec<Value>> {
        let store = self.lock()?;
        to_js_list(&store.variant_changes(&vm_reference, variant_reference.as_deref()))
    }

    #[napi]
    pub fn load_initial_changes(&self) -> Result<Vec<Value>> {
        to_js_list(&self.lock()?.load_initial_changes())
    }

    /// Changes to revert and apply for a variant switch.
    ///
    /// @param materialized - Control id to the change instances currently applied to it
    /// @returns `{ revert, apply }`
    #[napi]
    pub fn get_changes_for_variant_switch(
        &self,
        vm_reference: String,
        current_variant: String,
        new_variant: String,
        materialized: HashMap<String, Vec<Value>>,
    ) -> Result<Value> {
        let materialized = materialized
            .into_iter()
            .map(|(control, changes)| Ok((control, from_js_list::<ControlChange>(changes)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        let store = self.lock()?;
        to_js(&store.changes_for_variant_switch(
            &vm_reference,
            &current_variant,
            &new_variant,
            &materialized,
        ))
    }

    #[napi]
    pub fn set_variant_changes(
        &self,
        vm_reference: String,
        variant_reference: String,
        changes: Vec<Value>,
    ) -> Result<bool> {
        let changes = from_js_list(changes)?;
        Ok(self
            .lock()?
            .set_variant_changes(&vm_reference, &variant_reference, changes))
    }

    #[napi]
    pub fn add_change_to_variant(
        &self,
        vm_reference: String,
        variant_reference: String,
        change: Value,
    ) -> Result<bool> {
        let change: ControlChange = from_js(change)?;
        Ok(self
            .lock()?
            .add_change_to_variant(&vm_reference, &variant_reference, change))
    }

    #[napi]
    pub fn remove_change_from_variant(
        &self,
        vm_reference: String,
        variant_reference: String,
        change: Value,
    ) -> Result<bool> {
        let change: ControlChange = from_js(change)?;
        Ok(self
            .lock()?
            .remove_change_from_variant(&vm_reference, &variant_reference, &change))
    }

    /// @returns index of the inserted variant, or null for an unknown variant management
    #[napi]
    pub fn add_variant(&self, vm_reference: String, variant: Value) -> Result<Option<u32>> {
        let variant: Variant = from_js(variant)?;
        Ok(self
            .lock()?
            .add_variant(&vm_reference, variant)
            .map(|i| i as u32))
    }

    #[napi]
    pub fn remove_variant(
        &self,
        vm_reference: String,
        variant_reference: String,
    ) -> Result<Option<u32>> {
        Ok(self
            .lock()?
            .remove_variant(&vm_reference, &variant_reference)
            .map(|i| i as u32))
    }

    /// @param data - `{ title?, favorite?, visible? }`
    /// @returns new index of the variant
    #[napi]
    pub fn set_variant_data(
        &self,
        vm_reference: String,
        previous_index: u32,
        data: Value,
    ) -> Result<Option<u32>> {
        let data: VariantData = from_js(data)?;
        Ok(self
            .lock()?
            .set_variant_data(&vm_reference, previous_index as usize, &data)
            .map(|i| i as u32))
    }

    /// @param record - Change record tagged by `fileType`
    #[napi]
    pub fn update_variant_change_buckets(
        &self,
        vm_reference: String,
        record: Value,
        add: bool,
    ) -> Result<bool> {
        let record: ChangeRecord = from_js(record)?;
        Ok(self
            .lock()?
            .update_variant_change_buckets(&vm_reference, &record, add))
    }

    /// Variant model per variant management reference; consumes initial variants
    #[napi]
    pub fn fill_variant_model(&self) -> Result<Value> {
        let model = self.lock()?.fill_variant_model();
        to_js(&model)
    }
}
