//! Per-property "override or inherit the contextual default" values.
//!
//! Persisted associations store placement overrides as optional fields.
//! `Override<T>` keeps that wire shape (absent or `null` means inherit, an
//! inherited value is never written) but forces the default to be supplied
//! once, where the value is used.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Override<T> {
    /// Use whatever the caller's context provides
    Inherit,
    /// Use this value regardless of context
    Set(T),
}

impl<T> Override<T> {
    pub fn is_inherit(&self) -> bool {
        matches!(self, Override::Inherit)
    }

    /// Resolve against the contextual default
    pub fn resolve(self, default: T) -> T {
        match self {
            Override::Inherit => default,
            Override::Set(value) => value,
        }
    }
}

impl<T> Default for Override<T> {
    fn default() -> Self {
        Override::Inherit
    }
}

impl<T> From<Option<T>> for Override<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Override::Set(value),
            None => Override::Inherit,
        }
    }
}

impl<T> From<Override<T>> for Option<T> {
    fn from(value: Override<T>) -> Self {
        match value {
            Override::Inherit => None,
            Override::Set(value) => Some(value),
        }
    }
}

impl<T: Serialize> Serialize for Override<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Override::Inherit => serializer.serialize_none(),
            Override::Set(value) => serializer.serialize_some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Override<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Override::from)
    }
}
