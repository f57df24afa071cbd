//! Stable ID newtypes for the four entity tables.
//!
//! All IDs are distinct newtype wrappers over `i64`, so a `SettingId` cannot
//! be passed where a `SettingItemId` is expected. The inner `i64` aligns with
//! SQLite's `INTEGER PRIMARY KEY`. Stores hand out IDs starting at 1; zero is
//! never a valid stored identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a maintenance task (the aggregate root).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MaintenanceId(pub i64);

/// Identity of a setting group within a maintenance task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SettingId(pub i64);

/// Identity of a single configurable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SettingItemId(pub i64);

/// Identity of one allowed value of a setting item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DataVariantId(pub i64);

// Display implementations -- just print the inner value.

impl fmt::Display for MaintenanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SettingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SettingItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DataVariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maintenance_id_display() {
        assert_eq!(format!("{}", MaintenanceId(7)), "7");
    }

    #[test]
    fn setting_item_id_display() {
        assert_eq!(format!("{}", SettingItemId(99)), "99");
    }

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&SettingId(42)).unwrap();
        assert_eq!(json, "42");

        let back: DataVariantId = serde_json::from_str("5").unwrap();
        assert_eq!(back, DataVariantId(5));
    }

    #[test]
    fn ids_order_by_inner_value() {
        let mut ids = vec![MaintenanceId(3), MaintenanceId(1), MaintenanceId(2)];
        ids.sort();
        assert_eq!(ids, vec![MaintenanceId(1), MaintenanceId(2), MaintenanceId(3)]);
    }
}
