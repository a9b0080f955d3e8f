//! anomaly.rs — deviation from a submitter's historical pattern.
//!
//! Three independent penalties (frequency spike, location drift, time-of-day
//! drift) summed and capped. With fewer than 3 prior submissions there is no
//! pattern to deviate from and the check reports no anomaly.

use chrono::{Duration, Timelike};
use serde::Serialize;

use crate::candidate::{SubmissionCandidate, SubmissionHistoryEntry};
use crate::config::AnomalyConfig;
use crate::geo::haversine_m;

const MIN_HISTORY: usize = 3;
const FREQUENCY_PENALTY: f64 = 0.3; // > 5 submissions in trailing 24 h
const LOCATION_PENALTY: f64 = 0.3; // mean drift > 1000 m over last 5 geolocated
const TIME_OF_DAY_PENALTY: f64 = 0.2; // > 6 h from the mean hour of last 10

const FREQUENCY_LIMIT: usize = 5;
const LOCATION_SAMPLE: usize = 5;
const DRIFT_LIMIT_M: f64 = 1000.0;
const TIME_SAMPLE: usize = 10;
const HOUR_DRIFT_LIMIT: f64 = 6.0;

#[derive(Debug, Clone, Serialize)]
pub struct AnomalyResult {
    pub is_anomaly: bool,
    pub score: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl AnomalyResult {
    pub fn no_anomaly() -> Self {
        Self {
            is_anomaly: false,
            score: 0.0,
            reasons: Vec::new(),
        }
    }
}

/// Score `candidate` against the submitter's history snapshot (newest first).
pub fn detect(
    cfg: &AnomalyConfig,
    candidate: &SubmissionCandidate,
    history: &[SubmissionHistoryEntry],
) -> AnomalyResult {
    if history.len() < MIN_HISTORY {
        let mut r = AnomalyResult::no_anomaly();
        r.reasons
            .push("insufficient history for anomaly detection".to_string());
        return r;
    }

    let mut score = 0.0f64;
    let mut reasons = Vec::new();

    // (a) Frequency spike in the trailing 24 h.
    let recent = history
        .iter()
        .filter(|e| {
            let age = candidate.submitted_at.signed_duration_since(e.created_at);
            age >= Duration::zero() && age <= Duration::hours(24)
        })
        .count();
    if recent > FREQUENCY_LIMIT {
        score += FREQUENCY_PENALTY;
        reasons.push(format!(
            "{recent} submissions in 24 hours, well above the usual rate"
        ));
    }

    // (b) Location drift against the recent geolocated submissions.
    if let Some(point) = candidate.coordinates {
        let distances: Vec<f64> = history
            .iter()
            .filter_map(|e| e.coordinates)
            .take(LOCATION_SAMPLE)
            .map(|prior| haversine_m(point, prior))
            .collect();
        if !distances.is_empty() {
            let mean = distances.iter().sum::<f64>() / distances.len() as f64;
            if mean > DRIFT_LIMIT_M {
                score += LOCATION_PENALTY;
                reasons.push(format!(
                    "reported {:.0} m (mean) away from recent submission locations",
                    mean
                ));
            }
        }
    }

    // (c) Time-of-day drift against the mean hour of the last submissions.
    let hours: Vec<f64> = history
        .iter()
        .take(TIME_SAMPLE)
        .map(|e| e.created_at.hour() as f64)
        .collect();
    if !hours.is_empty() {
        let mean_hour = hours.iter().sum::<f64>() / hours.len() as f64;
        let drift = (candidate.submitted_at.hour() as f64 - mean_hour).abs();
        if drift > HOUR_DRIFT_LIMIT {
            score += TIME_OF_DAY_PENALTY;
            reasons.push(format!(
                "submitted around {}:00, {:.1} hours off the usual time",
                candidate.submitted_at.hour(),
                drift
            ));
        }
    }

    let score = score.min(1.0);
    AnomalyResult {
        is_anomaly: score > cfg.anomaly_threshold,
        score,
        reasons,
    }
}
