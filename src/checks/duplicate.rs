//! duplicate.rs — duplicate-report detection against a user's recent history.
//!
//! Each recent entry gets a blended score from text similarity, location
//! proximity and time proximity; entries above the similar threshold are
//! retained with human-readable reasons, and the best of them becomes the
//! detector's confidence. Pure over the injected history snapshot.

use chrono::Duration;
use serde::Serialize;

use crate::candidate::{SubmissionCandidate, SubmissionHistoryEntry};
use crate::config::DuplicateConfig;
use crate::geo::distance_or_infinite;
use crate::textsim::similarity;

/// Per-entry blend weights: text dominates, then location, then time.
const W_TEXT: f64 = 0.5;
const W_LOCATION: f64 = 0.3;
const W_TIME: f64 = 0.2;

/// A signal only earns a reason line once it is individually strong.
const REASON_SIGNAL_FLOOR: f64 = 0.7;

/// One retained near-duplicate from the history window.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarEntry {
    pub title: String,
    pub score: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateResult {
    pub is_duplicate: bool,
    /// Best similar-entry score, 0.0 with no history.
    pub confidence: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub similar: Vec<SimilarEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl DuplicateResult {
    pub fn not_duplicate() -> Self {
        Self {
            is_duplicate: false,
            confidence: 0.0,
            similar: Vec::new(),
            reasons: Vec::new(),
        }
    }
}

/// Score `candidate` against up to `cfg.history_limit` most recent entries
/// inside the look-back window. History arrives newest first.
pub fn detect(
    cfg: &DuplicateConfig,
    candidate: &SubmissionCandidate,
    history: &[SubmissionHistoryEntry],
) -> DuplicateResult {
    let lookback = Duration::hours(cfg.lookback_hours);

    let window: Vec<&SubmissionHistoryEntry> = history
        .iter()
        .filter(|e| {
            let age = candidate.submitted_at.signed_duration_since(e.created_at);
            age >= Duration::zero() && age <= lookback
        })
        .take(cfg.history_limit)
        .collect();

    if window.is_empty() {
        return DuplicateResult::not_duplicate();
    }

    let mut similar = Vec::new();
    for entry in window {
        let (score, reasons) = score_entry(candidate, entry);
        if score > cfg.similar_threshold {
            similar.push(SimilarEntry {
                title: entry.title.clone(),
                score,
                reasons,
            });
        }
    }

    let confidence = similar
        .iter()
        .map(|s| s.score)
        .fold(0.0f64, f64::max);
    let is_duplicate = confidence > cfg.duplicate_threshold;

    let mut reasons = Vec::new();
    for s in &similar {
        reasons.push(format!(
            "resembles earlier report \"{}\" (score {:.2})",
            s.title, s.score
        ));
        reasons.extend(s.reasons.iter().cloned());
    }

    DuplicateResult {
        is_duplicate,
        confidence,
        similar,
        reasons,
    }
}

/// Blend of text (0.6 title / 0.4 description), tiered location proximity and
/// tiered time proximity for one history entry.
fn score_entry(
    candidate: &SubmissionCandidate,
    entry: &SubmissionHistoryEntry,
) -> (f64, Vec<String>) {
    let title_sim = similarity(&candidate.title, &entry.title);
    let desc_sim = similarity(&candidate.description, &entry.description);
    let text_score = 0.6 * title_sim + 0.4 * desc_sim;

    let distance_m = distance_or_infinite(candidate.coordinates, entry.coordinates);
    let location_score = if distance_m < 50.0 {
        1.0
    } else if distance_m < 100.0 {
        0.8
    } else if distance_m < 200.0 {
        0.5
    } else {
        0.0
    };

    let age = candidate
        .submitted_at
        .signed_duration_since(entry.created_at)
        .abs();
    let time_score = if age < Duration::hours(1) {
        0.9
    } else if age < Duration::hours(6) {
        0.6
    } else {
        0.3
    };

    let combined = W_TEXT * text_score + W_LOCATION * location_score + W_TIME * time_score;

    let mut reasons = Vec::new();
    if text_score > REASON_SIGNAL_FLOOR {
        reasons.push(format!(
            "near-identical wording (text similarity {:.2})",
            text_score
        ));
    }
    if location_score > REASON_SIGNAL_FLOOR {
        reasons.push(format!("reported {:.0} m from the earlier one", distance_m));
    }
    if time_score > REASON_SIGNAL_FLOOR {
        reasons.push(format!(
            "submitted {} minutes after the earlier one",
            age.num_minutes()
        ));
    }

    (combined, reasons)
}
