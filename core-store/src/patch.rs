//! Tri-state field type for partial updates
//!
//! Update payloads need to distinguish "field not supplied" from "field set
//! to null": null on a relation field clears it, while an absent field leaves
//! the stored value untouched. `Option<T>` alone cannot express both, so
//! update types use `Patch<T>` for clearable fields.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// A field in a partial-update payload.
///
/// - `Unset`: the field was not supplied; leave the stored value alone.
/// - `Null`: the field was explicitly set to null; clear the stored value.
/// - `Value(T)`: the field was supplied; overwrite the stored value.
///
/// Deserialization maps a missing field to `Unset` (via `#[serde(default)]`
/// on the containing struct field) and an explicit JSON null to `Null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Field not present in the payload
    #[default]
    Unset,
    /// Field explicitly set to null
    Null,
    /// Field set to a value
    Value(T),
}

impl<T> Patch<T> {
    /// Whether the payload supplied this field at all
    pub fn is_set(&self) -> bool {
        !matches!(self, Patch::Unset)
    }

    /// The new stored value this patch resolves to, if the field was
    /// supplied: `Some(None)` clears, `Some(Some(v))` overwrites, `None`
    /// means leave untouched.
    pub fn resolve(self) -> Option<Option<T>> {
        match self {
            Patch::Unset => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }

    /// Borrowing variant of [`Patch::resolve`]
    pub fn as_resolved(&self) -> Option<Option<&T>> {
        match self {
            Patch::Unset => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the field is present; a missing field stays
        // Unset through #[serde(default)].
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Unset | Patch::Null => serializer.serialize_none(),
            Patch::Value(v) => serializer.serialize_some(v),
        }
    }
}
