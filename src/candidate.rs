//! candidate.rs — input value objects for one evaluation.
//!
//! A `SubmissionCandidate` is immutable for the duration of evaluation;
//! history entries are a read-only projection supplied by the caller's
//! history capability. Structural validation of required fields happens here,
//! before any scoring runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EvaluatorError;
use crate::geo::GeoPoint;

/// The citizen account submitting the report, as the application sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitterProfile {
    /// Opaque identity; never logged raw.
    pub id: String,
    /// Whether the account passed identity verification.
    #[serde(default)]
    pub verified: bool,
    /// Account creation time, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_created_at: Option<DateTime<Utc>>,
}

/// One incident report at the moment of submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionCandidate {
    pub title: String,
    pub description: String,
    /// Free-text location ("depan warung Bu Sri, gang 3").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
    /// Raw image payload; provenance metadata is extracted from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
    pub submitter: SubmitterProfile,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionCandidate {
    /// Missing required fields are a caller-side validation error, not a
    /// scoring-pipeline failure; reject them before evaluation begins.
    pub fn validate(&self) -> Result<(), EvaluatorError> {
        if self.title.trim().is_empty() {
            return Err(EvaluatorError::InvalidCandidate("title is empty"));
        }
        if self.description.trim().is_empty() {
            return Err(EvaluatorError::InvalidCandidate("description is empty"));
        }
        if self.submitter.id.trim().is_empty() {
            return Err(EvaluatorError::InvalidCandidate("submitter id is empty"));
        }
        Ok(())
    }
}

/// Lifecycle status of a stored report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Verified,
    Resolved,
    Rejected,
}

/// Read-only projection of a prior submission. The evaluator never mutates
/// or persists these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionHistoryEntry {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}
