//! assessment.rs — the evaluator's sole output.
//!
//! A `SubmissionAssessment` is created fresh per submission, returned to the
//! caller and never mutated, cached or shared afterwards. It serializes to a
//! structured JSON document for audit logging by the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::biometric::BiometricResult;
use crate::checks::FraudVerdict;
use crate::geofence::GeofenceResult;
use crate::photo::PhotoResult;

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionAssessment {
    /// Fraud track: fused verdict plus the per-check breakdown.
    pub fraud: FraudVerdict,
    /// Acceptance gates. Geofence always runs (it degrades to a skipped
    /// warning itself); photo and biometric run only when their inputs exist.
    pub geofence: GeofenceResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<PhotoResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biometric: Option<BiometricResult>,
    /// True when any fraud sub-check fell back to its safe default because of
    /// an internal failure or deadline. Fail-open is deliberate; this flag is
    /// how the caller sees it happened.
    pub degraded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded_reasons: Vec<String>,
    pub evaluated_at: DateTime<Utc>,
}
