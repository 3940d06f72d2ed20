//! Variant management state for personalizable UI controls.

pub mod change;
pub mod layer;
pub mod model;
pub mod store;
pub mod switch;
pub mod variant;

pub use change::{ChangeFileContent, ChangeRecord, ControlChange, VariantChange};
pub use layer::Layer;
pub use model::{VariantManagementModel, VariantModelEntry};
pub use store::{VariantManagement, VariantStore, DEFAULT_APP_VERSION};
pub use switch::VariantSwitch;
pub use variant::{Variant, VariantData};
