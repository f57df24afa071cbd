//! Idempotent fixture loader.
//!
//! [`seed`] inserts the built-in maintenance fixtures when the store holds
//! no maintenance tasks, and does nothing otherwise. Fixtures go through
//! [`MaintenanceStore::create_maintenance`], so they are validated exactly
//! like client input.

use serde::Serialize;
use tracing::info;

use maint_core::{
    DataVariantDraft, MaintenanceDraft, MaintenanceId, SettingDraft, SettingItemDraft,
};

use crate::error::StorageError;
use crate::traits::MaintenanceStore;

/// What a call to [`seed`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SeedOutcome {
    /// The store already held data; nothing was inserted.
    Skipped { existing: usize },
    /// The fixtures were inserted under these IDs.
    Seeded { ids: Vec<MaintenanceId> },
}

fn variants(pairs: &[(i32, &str)]) -> Vec<DataVariantDraft> {
    pairs
        .iter()
        .map(|&(value, description)| DataVariantDraft {
            value,
            description: description.to_string(),
        })
        .collect()
}

fn item(name: &str, description: &str, item_data: i32, pairs: &[(i32, &str)]) -> SettingItemDraft {
    SettingItemDraft {
        setting_id: None,
        name: name.to_string(),
        description: description.to_string(),
        item_data,
        data_variants: variants(pairs),
    }
}

fn heater() -> SettingItemDraft {
    item(
        "Heater",
        "Heater control",
        25,
        &[(20, "Low"), (25, "Normal"), (30, "High")],
    )
}

/// The built-in fixture set, in insertion order.
pub fn fixtures() -> Vec<MaintenanceDraft> {
    vec![
        MaintenanceDraft {
            number: 101,
            description: "Main maintenance task".to_string(),
            settings: vec![SettingDraft {
                name: "Temperature".to_string(),
                description: "Temperature settings".to_string(),
                items: vec![heater()],
            }],
        },
        MaintenanceDraft {
            number: 102,
            description: "Uxxxx Initialize data".to_string(),
            settings: vec![
                SettingDraft {
                    name: "HeadCleaning".to_string(),
                    description: "Conduct cleaning head".to_string(),
                    items: vec![
                        heater(),
                        item("NozzleCheck", "Nozzle check control", 1, &[]),
                        item(
                            "HeadAlign",
                            "Head align control",
                            1,
                            &[(0, "Standard"), (1, "Advanced"), (2, "Strong")],
                        ),
                    ],
                },
                SettingDraft {
                    name: "InkCharge".to_string(),
                    description: "Ink charge settings".to_string(),
                    items: vec![item(
                        "ChargeLevel",
                        "Ink charge level",
                        3,
                        &[(1, "Low"), (2, "Medium"), (3, "High")],
                    )],
                },
            ],
        },
    ]
}

/// Loads [`fixtures`] into an empty store.
///
/// Running it twice is harmless: the second call sees existing data and
/// returns [`SeedOutcome::Skipped`].
pub fn seed<S: MaintenanceStore + ?Sized>(store: &mut S) -> Result<SeedOutcome, StorageError> {
    let existing = store.count_maintenances()?;
    if existing > 0 {
        info!(existing, "store already populated, skipping seed");
        return Ok(SeedOutcome::Skipped { existing });
    }

    let mut ids = Vec::new();
    for draft in fixtures() {
        ids.push(store.create_maintenance(&draft)?.id);
    }
    info!(count = ids.len(), "seeded maintenance fixtures");
    Ok(SeedOutcome::Seeded { ids })
}
