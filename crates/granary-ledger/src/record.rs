//! Consumption records
//!
//! One record per use of an artifact by the external consumer. Created
//! by that consumer after it successfully uses an artifact, never by
//! the store itself.

use chrono::{DateTime, Utc};
use granary_artifact::ArtifactHandle;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// What an artifact was consumed for
///
/// Training and prediction consumption are tracked independently: a
/// record for one action never affects the other's pending set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumptionAction {
    /// The artifact fed a training run
    Trained,
    /// The artifact fed a prediction run
    Predicted,
}

impl ConsumptionAction {
    /// Stable string identifier as persisted by ledger backends
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trained => "trained",
            Self::Predicted => "predicted",
        }
    }
}

impl Display for ConsumptionAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger entry: a model consumed an artifact for an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    /// Model that consumed the artifact
    pub model_id: u64,
    /// The consumed artifact
    pub artifact: ArtifactHandle,
    /// What it was consumed for
    pub action: ConsumptionAction,
    /// When consumption was reported (UTC)
    pub time: DateTime<Utc>,
}

impl ConsumptionRecord {
    /// Record stamped with the current time
    #[must_use]
    pub fn new(model_id: u64, artifact: ArtifactHandle, action: ConsumptionAction) -> Self {
        Self {
            model_id,
            artifact,
            action,
            time: Utc::now(),
        }
    }

    /// The logical identity of this record
    ///
    /// At most one logical consumption exists per key; extra records
    /// with the same key are harmless and deduplicated on the query side.
    #[inline]
    #[must_use]
    pub fn key(&self) -> (u64, ArtifactHandle, ConsumptionAction) {
        (self.model_id, self.artifact, self.action)
    }
}
