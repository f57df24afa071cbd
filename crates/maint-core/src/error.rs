//! Core error types for maint-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the two
//! domain failure modes that do not depend on storage: a write that breaks a
//! value-domain or structural rule ([`ValidationError`]) and a malformed
//! field-level patch ([`PatchError`]).

use thiserror::Error;

use crate::id::SettingId;

/// A write was rejected because it would break a domain rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `itemData` does not match any declared variant value.
    #[error("itemData not in allowed variant set: {path} has itemData={item_data}, allowed={allowed:?}")]
    ItemDataNotInVariants {
        /// Location of the offending item (e.g. `settings[0].items[1]`).
        path: String,
        item_data: i32,
        allowed: Vec<i32>,
    },

    /// A standalone setting item create did not name its parent setting.
    #[error("settingId is required to create a setting item")]
    MissingParent,

    /// A standalone setting item create named a setting that does not exist.
    #[error("setting {0} does not exist")]
    UnknownParent(SettingId),
}

impl ValidationError {
    /// Prefixes the path of an [`ItemDataNotInVariants`] error.
    ///
    /// [`ItemDataNotInVariants`]: ValidationError::ItemDataNotInVariants
    pub fn at(self, prefix: &str) -> Self {
        match self {
            ValidationError::ItemDataNotInVariants {
                path,
                item_data,
                allowed,
            } => ValidationError::ItemDataNotInVariants {
                path: if path.is_empty() {
                    prefix.to_string()
                } else {
                    format!("{prefix}.{path}")
                },
                item_data,
                allowed,
            },
            other => other,
        }
    }
}

/// A patch document could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// The path does not name a patchable field.
    #[error("unknown or immutable field: {path}")]
    UnknownField { path: String },

    /// The value is missing or has the wrong type for the field.
    #[error("invalid value for {path}: expected {expected}")]
    InvalidValue { path: String, expected: &'static str },

    /// A recognised JSON Patch operation that this schema does not allow.
    #[error("operation '{op}' is not supported")]
    UnsupportedOperation { op: String },

    /// Not a JSON Patch operation at all.
    #[error("unknown operation '{op}'")]
    UnknownOperation { op: String },

    /// A `test` operation found a different value.
    #[error("test failed for {path}")]
    TestFailed { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_prefixes_nested_paths() {
        let err = ValidationError::ItemDataNotInVariants {
            path: "items[1]".into(),
            item_data: 9,
            allowed: vec![1, 2],
        }
        .at("settings[0]");

        match err {
            ValidationError::ItemDataNotInVariants { path, .. } => {
                assert_eq!(path, "settings[0].items[1]")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn at_leaves_parent_errors_alone() {
        assert_eq!(
            ValidationError::MissingParent.at("settings[0]"),
            ValidationError::MissingParent
        );
    }

    #[test]
    fn membership_message_names_the_rule() {
        let err = ValidationError::ItemDataNotInVariants {
            path: "item".into(),
            item_data: 99,
            allowed: vec![20, 25, 30],
        };
        assert!(err.to_string().starts_with("itemData not in allowed variant set"));
    }
}
