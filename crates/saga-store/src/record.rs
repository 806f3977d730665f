use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CorrelationId;

/// Version number for a saga instance, used for optimistic concurrency
/// control.
///
/// Versions start at 1 for the first write and increment by 1 for each
/// subsequent write to the same correlation ID.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0), meaning the instance does not exist.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the first version (1) for a newly created instance.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// A stored saga instance: the serialized state plus the metadata the
/// store needs for conditional writes and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// The correlation ID keying this instance.
    pub correlation_id: CorrelationId,

    /// The version this record is written at.
    pub version: Version,

    /// The serialized saga instance.
    pub payload: serde_json::Value,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl InstanceRecord {
    /// Creates a record for the given instance payload, stamped now.
    pub fn new(
        correlation_id: CorrelationId,
        version: Version,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            correlation_id,
            version,
            payload,
            updated_at: Utc::now(),
        }
    }

    /// Deserializes the payload into a typed saga instance.
    pub fn instance<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
