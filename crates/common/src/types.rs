use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation identifier for one onboarding workflow.
///
/// Every event belonging to the same workflow carries this identifier, and
/// the saga instance is keyed by it. A value is minted exactly once, when
/// the user service starts a workflow, and never reused; everywhere else
/// it arrives on the wire or comes back from storage. There is no
/// `Default`: an identifier out of thin air is always a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Mints a fresh random correlation ID for a new workflow.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps a UUID received on the wire or read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID, e.g. for binding into a query.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
