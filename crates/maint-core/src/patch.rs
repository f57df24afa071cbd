//! Field-level patching of setting items.
//!
//! Patches arrive as JSON Patch documents (a list of `{op, path, value}`
//! objects) but are interpreted against a closed schema rather than by
//! walking arbitrary JSON:
//!
//! | Path            | Value                               | Ops                  |
//! |-----------------|-------------------------------------|----------------------|
//! | `/name`         | string                              | add, replace, test   |
//! | `/description`  | string                              | add, replace, test   |
//! | `/itemData`     | 32-bit integer                      | add, replace, test   |
//! | `/dataVariants` | array of `{value, description}`     | add, replace         |
//!
//! `add` on an existing member behaves like `replace`. Variant lists can only
//! be replaced wholesale. Identity and parent fields are not patchable.
//!
//! [`apply_patch`] never touches the stored entity: it returns a candidate
//! that the caller validates and commits in the same transaction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PatchError;
use crate::id::DataVariantId;
use crate::model::{DataVariant, DataVariantDraft, SettingItem};

/// ID carried by variants introduced by a patch until the store assigns one.
pub const UNASSIGNED_VARIANT_ID: DataVariantId = DataVariantId(0);

/// One operation of a JSON Patch document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Only meaningful for `move`/`copy`, which are rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl PatchOperation {
    /// Convenience constructor for a `replace` operation.
    pub fn replace(path: &str, value: Value) -> Self {
        PatchOperation {
            op: "replace".to_string(),
            path: path.to_string(),
            value: Some(value),
            from: None,
        }
    }

    /// Convenience constructor for a `test` operation.
    pub fn test(path: &str, value: Value) -> Self {
        PatchOperation {
            op: "test".to_string(),
            path: path.to_string(),
            value: Some(value),
            from: None,
        }
    }
}

/// The patchable fields of a setting item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Description,
    ItemData,
    DataVariants,
}

impl Field {
    /// Resolves a single-segment JSON Pointer, ignoring case.
    fn parse(path: &str) -> Result<Self, PatchError> {
        let unknown = || PatchError::UnknownField {
            path: path.to_string(),
        };
        let segment = path.strip_prefix('/').ok_or_else(unknown)?;
        if segment.contains('/') {
            return Err(unknown());
        }
        match segment.to_ascii_lowercase().as_str() {
            "name" => Ok(Field::Name),
            "description" => Ok(Field::Description),
            "itemdata" => Ok(Field::ItemData),
            "datavariants" => Ok(Field::DataVariants),
            _ => Err(unknown()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Set,
    Test,
}

impl Op {
    fn parse(op: &str) -> Result<Self, PatchError> {
        match op.to_ascii_lowercase().as_str() {
            "add" | "replace" => Ok(Op::Set),
            "test" => Ok(Op::Test),
            "remove" | "move" | "copy" => Err(PatchError::UnsupportedOperation {
                op: op.to_string(),
            }),
            _ => Err(PatchError::UnknownOperation { op: op.to_string() }),
        }
    }
}

/// Applies `operations` in order to a copy of `item`.
///
/// Fails on the first malformed operation; the returned candidate is only
/// produced when every operation applied cleanly. Variants introduced by a
/// `/dataVariants` replacement carry [`UNASSIGNED_VARIANT_ID`].
pub fn apply_patch(
    item: &SettingItem,
    operations: &[PatchOperation],
) -> Result<SettingItem, PatchError> {
    let mut candidate = item.clone();
    for operation in operations {
        let op = Op::parse(&operation.op)?;
        let field = Field::parse(&operation.path)?;
        match op {
            Op::Set => set_field(&mut candidate, field, operation)?,
            Op::Test => test_field(&candidate, field, operation)?,
        }
    }
    Ok(candidate)
}

fn set_field(
    candidate: &mut SettingItem,
    field: Field,
    operation: &PatchOperation,
) -> Result<(), PatchError> {
    match field {
        Field::Name => candidate.name = string_value(operation)?,
        Field::Description => candidate.description = string_value(operation)?,
        Field::ItemData => candidate.item_data = int_value(operation)?,
        Field::DataVariants => {
            let drafts = variants_value(operation)?;
            candidate.data_variants = drafts
                .into_iter()
                .map(|draft| DataVariant {
                    id: UNASSIGNED_VARIANT_ID,
                    setting_item_id: candidate.id,
                    value: draft.value,
                    description: draft.description,
                })
                .collect();
        }
    }
    Ok(())
}

fn test_field(
    candidate: &SettingItem,
    field: Field,
    operation: &PatchOperation,
) -> Result<(), PatchError> {
    let matches = match field {
        Field::Name => candidate.name == string_value(operation)?,
        Field::Description => candidate.description == string_value(operation)?,
        Field::ItemData => candidate.item_data == int_value(operation)?,
        Field::DataVariants => {
            return Err(PatchError::UnsupportedOperation {
                op: format!("{} {}", operation.op, operation.path),
            })
        }
    };
    if matches {
        Ok(())
    } else {
        Err(PatchError::TestFailed {
            path: operation.path.clone(),
        })
    }
}

fn string_value(operation: &PatchOperation) -> Result<String, PatchError> {
    operation
        .value
        .as_ref()
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| invalid(operation, "string"))
}

fn int_value(operation: &PatchOperation) -> Result<i32, PatchError> {
    operation
        .value
        .as_ref()
        .and_then(Value::as_i64)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| invalid(operation, "32-bit integer"))
}

/// Wire shape of one `/dataVariants` entry. Stricter than
/// [`DataVariantDraft`]: `value` is required and no other keys are allowed.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct VariantEntry {
    value: i32,
    #[serde(default)]
    description: String,
}

fn variants_value(operation: &PatchOperation) -> Result<Vec<DataVariantDraft>, PatchError> {
    let expected = "array of {value, description}";
    let entries = operation
        .value
        .as_ref()
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(operation, expected))?;
    entries
        .iter()
        .map(|entry| {
            let entry: VariantEntry = serde_json::from_value(entry.clone())
                .map_err(|_| invalid(operation, expected))?;
            Ok(DataVariantDraft {
                value: entry.value,
                description: entry.description,
            })
        })
        .collect()
}

fn invalid(operation: &PatchOperation, expected: &'static str) -> PatchError {
    PatchError::InvalidValue {
        path: operation.path.clone(),
        expected,
    }
}
