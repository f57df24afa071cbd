//! Value-domain validation for setting items.
//!
//! One rule: when an item declares any variants, its `itemData` must equal
//! the value of at least one of them. Duplicate variant values are allowed;
//! membership is existential. An item without variants accepts any integer.
//!
//! Every write path (aggregate create, standalone create, patch) goes
//! through these functions before it commits.

use crate::error::ValidationError;
use crate::model::{MaintenanceDraft, SettingItem, SettingItemDraft};

/// Checks `item_data` against the declared variant values.
pub fn validate_item_data<I>(item_data: i32, variants: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = i32>,
{
    let allowed: Vec<i32> = variants.into_iter().collect();
    if allowed.is_empty() || allowed.contains(&item_data) {
        return Ok(());
    }
    Err(ValidationError::ItemDataNotInVariants {
        path: String::new(),
        item_data,
        allowed,
    })
}

/// Validates a hydrated (possibly patched) setting item.
pub fn validate_setting_item(item: &SettingItem) -> Result<(), ValidationError> {
    validate_item_data(item.item_data, item.variant_values())
        .map_err(|e| e.at(&format!("settingItem[{}]", item.id)))
}

/// Validates a setting item draft, without checking its parent reference.
pub fn validate_setting_item_draft(draft: &SettingItemDraft) -> Result<(), ValidationError> {
    validate_item_data(draft.item_data, draft.variant_values()).map_err(|e| e.at("item"))
}

/// Validates every item nested in a maintenance draft.
///
/// Stops at the first violation; the error path points at it.
pub fn validate_maintenance_draft(draft: &MaintenanceDraft) -> Result<(), ValidationError> {
    for (s, setting) in draft.settings.iter().enumerate() {
        for (i, item) in setting.items.iter().enumerate() {
            validate_item_data(item.item_data, item.variant_values())
                .map_err(|e| e.at(&format!("settings[{s}].items[{i}]")))?;
        }
    }
    Ok(())
}
