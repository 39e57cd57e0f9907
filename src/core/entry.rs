//! Configuration entry model.
//!
//! A [`ConfigEntry`] is a single named, typed configuration record as the
//! store holds it. Entries are partitioned by application: records in
//! different applications never interact, and `(application, name)` is
//! unique among current records. The store enforces that uniqueness and
//! stamps `updated_at` on every write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque store-assigned identifier for a configuration entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl EntryId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the store has not assigned an identifier yet.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared primitive kind of a configuration value.
///
/// The raw value is always stored as a string; the kind records how the
/// value is meant to be read. Conversion rules live in [`crate::core::convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Free-form text; conversion always succeeds.
    String,
    /// Base-10 signed integer.
    Int,
    /// Invariant decimal floating point.
    Double,
    /// `true`/`false` (case-insensitive) plus the literals `1` and `0`.
    Bool,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int => write!(f, "int"),
            Self::Double => write!(f, "double"),
            Self::Bool => write!(f, "bool"),
        }
    }
}

/// A single named, typed configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Store-assigned identity. Blank until the store has persisted the entry.
    #[serde(default)]
    pub id: EntryId,

    /// Application the entry belongs to.
    pub application: String,

    /// Entry name, unique within the application.
    pub name: String,

    /// Declared kind of the raw value.
    pub kind: ValueKind,

    /// Raw value in its string encoding.
    pub value: String,

    /// Whether the entry is currently served. Inactive entries never appear
    /// in a snapshot.
    pub active: bool,

    /// Last write timestamp, stamped by the store.
    pub updated_at: DateTime<Utc>,
}

impl ConfigEntry {
    /// Create a new active entry with a blank identity.
    ///
    /// The store assigns the identity and restamps `updated_at` when the
    /// entry is created.
    pub fn new(
        application: impl Into<String>,
        name: impl Into<String>,
        kind: ValueKind,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryId::default(),
            application: application.into(),
            name: name.into(),
            kind,
            value: value.into(),
            active: true,
            updated_at: Utc::now(),
        }
    }

    /// Same entry with a different active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Same entry with an explicit timestamp.
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }
}
