//! The four-level maintenance configuration tree.
//!
//! A [`Maintenance`] owns an ordered list of [`Setting`]s, each of which owns
//! ordered [`SettingItem`]s, each of which owns its allowed [`DataVariant`]s.
//! Ownership is exclusive: a child belongs to exactly one parent and goes
//! away with it. Children carry their parent's ID as a back-pointer for
//! lookups only; a parent never depends on its children existing.
//!
//! Hydrated entities carry store-assigned IDs. The `*Draft` types are the
//! input shapes used for creation and never carry IDs of their own.
//!
//! Wire names are camelCase (`itemData`, `dataVariants`). Drafts also accept
//! the PascalCase collection names (`Settings`, `Items`, `DataVariants`).

use serde::{Deserialize, Serialize};

use crate::id::{DataVariantId, MaintenanceId, SettingId, SettingItemId};

/// A maintenance task together with its full owned subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Maintenance {
    pub id: MaintenanceId,
    /// Caller-supplied task number (not an identity; duplicates are allowed).
    pub number: i32,
    pub description: String,
    pub settings: Vec<Setting>,
}

/// A named group of setting items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: SettingId,
    /// Owning maintenance task.
    pub maintenance_id: MaintenanceId,
    pub name: String,
    pub description: String,
    pub items: Vec<SettingItem>,
}

/// A single configurable parameter and its currently active value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingItem {
    pub id: SettingItemId,
    /// Owning setting.
    pub setting_id: SettingId,
    pub name: String,
    pub description: String,
    /// The active value. Must match one of `data_variants` when any exist.
    pub item_data: i32,
    /// Allowed values. Empty means `item_data` is unconstrained.
    pub data_variants: Vec<DataVariant>,
}

impl SettingItem {
    /// Values of all declared variants, in declaration order.
    pub fn variant_values(&self) -> impl Iterator<Item = i32> + '_ {
        self.data_variants.iter().map(|v| v.value)
    }
}

/// One named, allowed value for a setting item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataVariant {
    pub id: DataVariantId,
    /// Owning setting item.
    pub setting_item_id: SettingItemId,
    pub value: i32,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

/// Input for creating a whole maintenance aggregate in one transaction.
///
/// Any `id` fields in the incoming document are ignored; the store assigns
/// fresh IDs to every entity in the subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceDraft {
    #[serde(default)]
    pub number: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "Settings")]
    pub settings: Vec<SettingDraft>,
}

/// A setting nested inside a [`MaintenanceDraft`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "Items")]
    pub items: Vec<SettingItemDraft>,
}

/// A setting item, either nested in a [`SettingDraft`] or created on its own.
///
/// `setting_id` is ignored for nested items (the enclosing draft decides the
/// parent) and required for standalone creates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingItemDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_id: Option<SettingId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub item_data: i32,
    #[serde(default, alias = "DataVariants")]
    pub data_variants: Vec<DataVariantDraft>,
}

impl SettingItemDraft {
    /// Values of all declared variants, in declaration order.
    pub fn variant_values(&self) -> impl Iterator<Item = i32> + '_ {
        self.data_variants.iter().map(|v| v.value)
    }
}

/// An allowed value declared in a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataVariantDraft {
    #[serde(default)]
    pub value: i32,
    #[serde(default)]
    pub description: String,
}

/// Full replacement of a maintenance task's own fields.
///
/// Nested settings in the incoming document are ignored: replacing a
/// maintenance never touches its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceUpdate {
    pub id: MaintenanceId,
    #[serde(default)]
    pub number: i32,
    #[serde(default)]
    pub description: String,
}

impl From<&DataVariant> for DataVariantDraft {
    fn from(variant: &DataVariant) -> Self {
        DataVariantDraft {
            value: variant.value,
            description: variant.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maintenance_serializes_with_camel_case_names() {
        let maintenance = Maintenance {
            id: MaintenanceId(1),
            number: 101,
            description: "Main maintenance task".into(),
            settings: vec![Setting {
                id: SettingId(2),
                maintenance_id: MaintenanceId(1),
                name: "Temperature".into(),
                description: "Temperature settings".into(),
                items: vec![SettingItem {
                    id: SettingItemId(3),
                    setting_id: SettingId(2),
                    name: "Heater".into(),
                    description: "Heater control".into(),
                    item_data: 25,
                    data_variants: vec![DataVariant {
                        id: DataVariantId(4),
                        setting_item_id: SettingItemId(3),
                        value: 25,
                        description: "Normal".into(),
                    }],
                }],
            }],
        };

        let value = serde_json::to_value(&maintenance).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["settings"][0]["maintenanceId"], 1);
        assert_eq!(value["settings"][0]["items"][0]["itemData"], 25);
        assert_eq!(value["settings"][0]["items"][0]["dataVariants"][0]["settingItemId"], 3);
    }

    #[test]
    fn draft_accepts_pascal_case_collections() {
        let draft: MaintenanceDraft = serde_json::from_value(json!({
            "number": 101,
            "description": "Main maintenance task",
            "Settings": [{
                "name": "Temperature",
                "Items": [{
                    "name": "Heater",
                    "itemData": 25,
                    "DataVariants": [{ "value": 20, "description": "Low" }]
                }]
            }]
        }))
        .unwrap();

        assert_eq!(draft.settings.len(), 1);
        assert_eq!(draft.settings[0].items[0].item_data, 25);
        assert_eq!(draft.settings[0].items[0].data_variants[0].value, 20);
    }

    #[test]
    fn draft_ignores_incoming_ids_and_fills_defaults() {
        let draft: SettingItemDraft = serde_json::from_value(json!({
            "id": 77,
            "settingId": 4,
            "name": "NozzleCheck"
        }))
        .unwrap();

        assert_eq!(draft.setting_id, Some(SettingId(4)));
        assert_eq!(draft.item_data, 0);
        assert!(draft.description.is_empty());
        assert!(draft.data_variants.is_empty());
    }

    #[test]
    fn update_ignores_nested_settings() {
        let update: MaintenanceUpdate = serde_json::from_value(json!({
            "id": 3,
            "number": 200,
            "description": "renamed",
            "settings": [{ "name": "ignored" }]
        }))
        .unwrap();

        assert_eq!(update.id, MaintenanceId(3));
        assert_eq!(update.number, 200);
    }
}
