//! User domain types and record ownership checks.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ModelKey;

const DEFAULT_MODEL_NAME: &str = "user";

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    /// Creates a user identifier from a stored key.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying key.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Records that can be inspected for a foreign key attribute.
pub trait RecordAttributes {
    /// Returns the integer value stored under `name`, if present.
    fn attribute_id(&self, name: &str) -> Option<i64>;
}

impl RecordAttributes for Map<String, Value> {
    fn attribute_id(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }
}

/// User record that roles and permissions are attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    model_name: String,
}

impl User {
    /// Creates a user with the conventional `user` model name.
    #[must_use]
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            model_name: DEFAULT_MODEL_NAME.to_owned(),
        }
    }

    /// Overrides the singular model name used to derive ownership keys.
    #[must_use]
    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the singular model name.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model_name.as_str()
    }

    /// Returns the foreign key name records use to point at this user.
    #[must_use]
    pub fn ownership_key(&self) -> String {
        format!("{}_id", self.model_name)
    }

    /// Returns whether the record points at this user through the default key.
    #[must_use]
    pub fn owns<R>(&self, record: &R) -> bool
    where
        R: RecordAttributes + ?Sized,
    {
        self.owns_by(record, self.ownership_key().as_str())
    }

    /// Returns whether the record points at this user through `foreign_key`.
    #[must_use]
    pub fn owns_by<R>(&self, record: &R, foreign_key: &str) -> bool
    where
        R: RecordAttributes + ?Sized,
    {
        record.attribute_id(foreign_key) == Some(self.id.as_i64())
    }
}

impl ModelKey for User {
    fn model_key(&self) -> i64 {
        self.id.as_i64()
    }
}
