//! Dataset scope: where an artifact belongs
//!
//! A [`DatasetScope`] is a value object, never persisted on its own. It
//! names the model, the owning entity (absent for aggregates), the
//! time-partitioning method, the labelling kind, and whether the data
//! is reserved for held-out evaluation.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Whether a dataset carries the target/outcome value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Labelling {
    /// Carries the outcome value; used to train or to evaluate
    Labelled,
    /// Lacks the outcome value; used to predict
    Unlabelled,
}

impl Labelling {
    /// Stable storage-area identifier
    #[inline]
    #[must_use]
    pub const fn storage_area(self) -> &'static str {
        match self {
            Self::Labelled => "labelled",
            Self::Unlabelled => "unlabelled",
        }
    }
}

impl Display for Labelling {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_area())
    }
}

/// Placement of a dataset artifact
///
/// # Invariants
/// - `model_id` is nonzero
/// - per-entity scopes have a nonzero `entity_id`
/// - aggregate scopes have no `entity_id` and a non-empty
///   `time_splitting` method
///
/// Construct through [`DatasetScope::for_entity`] or
/// [`DatasetScope::aggregate`]; both validate before any I/O happens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetScope {
    model_id: u64,
    entity_id: Option<u64>,
    time_splitting: Option<String>,
    labelling: Labelling,
    evaluation: bool,
}

impl DatasetScope {
    /// Scope for a raw per-entity artifact
    ///
    /// The time-partitioning method may be absent: raw extractions are
    /// produced before a method is chosen.
    ///
    /// # Errors
    /// [`StoreError::InvalidScope`] if `model_id` or `entity_id` is zero,
    /// or an empty method string was supplied.
    pub fn for_entity(
        model_id: u64,
        entity_id: u64,
        time_splitting: Option<impl Into<String>>,
        labelling: Labelling,
        evaluation: bool,
    ) -> Result<Self, StoreError> {
        if entity_id == 0 {
            return Err(StoreError::InvalidScope(
                "per-entity scope requires a nonzero entity id".to_string(),
            ));
        }
        Self::validated(
            model_id,
            Some(entity_id),
            time_splitting.map(Into::into),
            labelling,
            evaluation,
        )
    }

    /// Scope for an aggregate artifact produced by merging
    ///
    /// # Errors
    /// [`StoreError::InvalidScope`] if `model_id` is zero or the
    /// time-partitioning method is empty.
    pub fn aggregate(
        model_id: u64,
        time_splitting: impl Into<String>,
        labelling: Labelling,
        evaluation: bool,
    ) -> Result<Self, StoreError> {
        let method = time_splitting.into();
        if method.is_empty() {
            return Err(StoreError::InvalidScope(
                "aggregate scope requires a time-partitioning method".to_string(),
            ));
        }
        Self::validated(model_id, None, Some(method), labelling, evaluation)
    }

    fn validated(
        model_id: u64,
        entity_id: Option<u64>,
        time_splitting: Option<String>,
        labelling: Labelling,
        evaluation: bool,
    ) -> Result<Self, StoreError> {
        if model_id == 0 {
            return Err(StoreError::InvalidScope(
                "model id must be nonzero".to_string(),
            ));
        }
        if let Some(method) = &time_splitting {
            if method.is_empty() {
                return Err(StoreError::InvalidScope(
                    "time-partitioning method must not be empty".to_string(),
                ));
            }
        }
        Ok(Self {
            model_id,
            entity_id,
            time_splitting,
            labelling,
            evaluation,
        })
    }

    /// Model identifier
    #[inline]
    #[must_use]
    pub fn model_id(&self) -> u64 {
        self.model_id
    }

    /// Owning entity, `None` for aggregates
    #[inline]
    #[must_use]
    pub fn entity_id(&self) -> Option<u64> {
        self.entity_id
    }

    /// Time-partitioning method identifier
    #[inline]
    #[must_use]
    pub fn time_splitting(&self) -> Option<&str> {
        self.time_splitting.as_deref()
    }

    /// Labelling kind
    #[inline]
    #[must_use]
    pub fn labelling(&self) -> Labelling {
        self.labelling
    }

    /// Whether this data is reserved for held-out evaluation
    ///
    /// Evaluation artifacts are never eligible for ordinary training or
    /// prediction consumption.
    #[inline]
    #[must_use]
    pub fn is_evaluation(&self) -> bool {
        self.evaluation
    }

    /// Whether this scope describes an aggregate artifact
    #[inline]
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        self.entity_id.is_none()
    }

    /// Stable string key for named locks and diagnostics
    ///
    /// Not an artifact identity; two sessions for the same scope share
    /// this key even when their content differs.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!(
            "model:{}/entity:{}/method:{}/{}{}",
            self.model_id,
            self.entity_id.unwrap_or(0),
            self.time_splitting.as_deref().unwrap_or("-"),
            self.labelling.storage_area(),
            if self.evaluation { "/evaluation" } else { "" }
        )
    }
}

impl Display for DatasetScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}
