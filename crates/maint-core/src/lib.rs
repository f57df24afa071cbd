pub mod error;
pub mod id;
pub mod model;
pub mod patch;
pub mod validate;

// Re-export commonly used types
pub use error::{PatchError, ValidationError};
pub use id::{DataVariantId, MaintenanceId, SettingId, SettingItemId};
pub use model::{
    DataVariant, DataVariantDraft, Maintenance, MaintenanceDraft, MaintenanceUpdate, Setting,
    SettingDraft, SettingItem, SettingItemDraft,
};
pub use patch::{apply_patch, PatchOperation};
pub use validate::validate_item_data;
