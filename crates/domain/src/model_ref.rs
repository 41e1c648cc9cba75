//! Identifier resolution for attach and detach inputs.
//!
//! Mutation calls accept a loaded entity, a loose attribute mapping carrying an
//! `id` field, or a raw key. [`ModelRef`] captures those three shapes so the
//! services can resolve them to a key before touching storage.

use serde_json::{Map, Value};
use warden_core::{AppError, AppResult};

/// Entities that expose their primary key.
pub trait ModelKey: Sync {
    /// Returns the stored primary key.
    fn model_key(&self) -> i64;
}

/// Reference to a model in one of the accepted input shapes.
#[derive(Clone, Copy)]
pub enum ModelRef<'a> {
    /// Loaded entity.
    Entity(&'a dyn ModelKey),
    /// Attribute mapping that must carry an integer `id`.
    Mapping(&'a Map<String, Value>),
    /// Raw primary key.
    Raw(i64),
}

impl ModelRef<'_> {
    /// Resolves the reference to a primary key.
    ///
    /// A mapping's `id` may be a JSON integer or a string holding one. A
    /// mapping without such an `id` field is a contract violation.
    pub fn resolve_key(&self) -> AppResult<i64> {
        match self {
            Self::Entity(entity) => Ok(entity.model_key()),
            Self::Mapping(attributes) => match attributes.get("id") {
                Some(value) => mapping_key(value).ok_or_else(|| {
                    AppError::ContractViolation(format!(
                        "mapping field 'id' must be an integer, got '{value}'"
                    ))
                }),
                None => Err(AppError::ContractViolation(
                    "mapping has no 'id' field".to_owned(),
                )),
            },
            Self::Raw(key) => Ok(*key),
        }
    }
}

fn mapping_key(value: &Value) -> Option<i64> {
    match value {
        Value::String(text) => text.trim().parse::<i64>().ok(),
        other => other.as_i64(),
    }
}

impl std::fmt::Debug for ModelRef<'_> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entity(entity) => write!(formatter, "Entity({})", entity.model_key()),
            Self::Mapping(attributes) => write!(formatter, "Mapping({attributes:?})"),
            Self::Raw(key) => write!(formatter, "Raw({key})"),
        }
    }
}

impl<'a, T> From<&'a T> for ModelRef<'a>
where
    T: ModelKey,
{
    fn from(value: &'a T) -> Self {
        Self::Entity(value)
    }
}

impl<'a> From<&'a Map<String, Value>> for ModelRef<'a> {
    fn from(value: &'a Map<String, Value>) -> Self {
        Self::Mapping(value)
    }
}

impl From<i64> for ModelRef<'_> {
    fn from(value: i64) -> Self {
        Self::Raw(value)
    }
}
