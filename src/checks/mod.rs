//! Fraud-track checks and score fusion.
//!
//! Duplicate, spam/quality and anomaly are mutually independent given the
//! same history snapshot; `fuse` merges their outputs with a weighted
//! maximum, so any single strong signal dominates instead of being diluted
//! by a sum.

pub mod anomaly;
pub mod duplicate;
pub mod spam;

use serde::Serialize;

pub use anomaly::AnomalyResult;
pub use duplicate::{DuplicateResult, SimilarEntry};
pub use spam::{KeywordRules, QualityResult, SpamResult};

// Fusion weights per check.
const W_DUPLICATE: f64 = 0.4;
const W_SPAM: f64 = 0.3;
const W_QUALITY: f64 = 0.2;
const W_ANOMALY: f64 = 0.1;

/// Score above which the fused signal alone makes the report fraudulent.
const FRAUD_THRESHOLD: f64 = 0.7;

/// Overall fraud verdict with the full per-check breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct FraudVerdict {
    pub is_fraud: bool,
    /// Weighted-maximum fused score in [0, 1].
    pub score: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    pub duplicate: DuplicateResult,
    pub spam: SpamResult,
    pub quality: QualityResult,
    pub anomaly: AnomalyResult,
}

/// Weighted maximum of the four sub-scores; hard sub-verdicts (duplicate,
/// spam) force the overall verdict regardless of the fused score.
pub fn fuse(
    duplicate: DuplicateResult,
    spam: SpamResult,
    quality: QualityResult,
    anomaly: AnomalyResult,
) -> FraudVerdict {
    let score = [
        W_DUPLICATE * duplicate.confidence,
        W_SPAM * spam.score,
        W_QUALITY * (1.0 - quality.score),
        W_ANOMALY * anomaly.score,
    ]
    .into_iter()
    .fold(0.0f64, f64::max)
    .clamp(0.0, 1.0);

    let is_fraud = score > FRAUD_THRESHOLD || duplicate.is_duplicate || spam.is_spam;

    let mut reasons = Vec::new();
    reasons.extend(duplicate.reasons.iter().cloned());
    reasons.extend(spam.reasons.iter().cloned());
    reasons.extend(quality.reasons.iter().cloned());
    reasons.extend(anomaly.reasons.iter().cloned());

    FraudVerdict {
        is_fraud,
        score,
        reasons,
        duplicate,
        spam,
        quality,
        anomaly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dup(confidence: f64, is_duplicate: bool) -> DuplicateResult {
        DuplicateResult {
            is_duplicate,
            confidence,
            similar: Vec::new(),
            reasons: vec!["dup reason".to_string()],
        }
    }

    fn spam_r(score: f64, is_spam: bool) -> SpamResult {
        SpamResult {
            is_spam,
            score,
            reasons: vec!["spam reason".to_string()],
        }
    }

    fn quality_r(score: f64) -> QualityResult {
        QualityResult {
            is_valid: score >= 0.6,
            score,
            reasons: Vec::new(),
        }
    }

    fn anomaly_r(score: f64) -> AnomalyResult {
        AnomalyResult {
            is_anomaly: score > 0.5,
            score,
            reasons: Vec::new(),
        }
    }

    #[test]
    fn fused_score_is_the_weighted_maximum() {
        let v = fuse(dup(0.9, true), spam_r(0.5, false), quality_r(0.8), anomaly_r(0.4));
        // max(0.36, 0.15, 0.04, 0.04)
        assert!((v.score - 0.36).abs() < 1e-9, "score {}", v.score);
    }

    #[test]
    fn hard_duplicate_verdict_forces_fraud() {
        let v = fuse(dup(0.8, true), spam_r(0.0, false), quality_r(1.0), anomaly_r(0.0));
        assert!(v.is_fraud);
        assert!(v.score <= 0.7);
    }

    #[test]
    fn hard_spam_verdict_forces_fraud() {
        let v = fuse(dup(0.0, false), spam_r(0.7, true), quality_r(1.0), anomaly_r(0.0));
        assert!(v.is_fraud);
    }

    #[test]
    fn clean_checks_are_not_fraud() {
        let v = fuse(dup(0.1, false), spam_r(0.1, false), quality_r(1.0), anomaly_r(0.0));
        assert!(!v.is_fraud);
        assert!(v.score < 0.1);
    }

    #[test]
    fn score_stays_in_unit_interval() {
        let v = fuse(dup(1.0, true), spam_r(1.0, true), quality_r(0.0), anomaly_r(1.0));
        assert!((0.0..=1.0).contains(&v.score));
    }

    #[test]
    fn fraud_implies_positive_score_or_hard_verdict() {
        let v = fuse(dup(0.9, true), spam_r(0.0, false), quality_r(1.0), anomaly_r(0.0));
        assert!(v.is_fraud);
        assert!(v.score > 0.0 || v.duplicate.is_duplicate || v.spam.is_spam);
    }

    #[test]
    fn reasons_are_concatenated_from_all_checks() {
        let v = fuse(dup(0.9, true), spam_r(0.5, false), quality_r(0.8), anomaly_r(0.4));
        assert!(v.reasons.contains(&"dup reason".to_string()));
        assert!(v.reasons.contains(&"spam reason".to_string()));
    }
}
