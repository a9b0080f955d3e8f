//! spam.rs — spam scoring and independent completeness/relevance validation.
//!
//! Spam is an additive score over behavioral and shape heuristics, optionally
//! boosted by the external content classifier. The classifier call is wrapped
//! in a timeout and is strictly non-blocking: on failure or timeout the
//! rule-based path stands alone and the degradation is reported upward.
//! Quality starts from 1.0 and deducts for missing or thin fields.

use chrono::Duration;
use regex::RegexSet;
use serde::Serialize;
use std::time::Duration as StdDuration;
use tracing::debug;

use crate::candidate::SubmissionCandidate;
use crate::capabilities::DynClassifier;
use crate::config::{QualityConfig, SpamConfig};

// Spam score contributions.
const FREQ_HEAVY: f64 = 0.4; // > 10 submissions in 24 h
const FREQ_ELEVATED: f64 = 0.2; // > 5 submissions in 24 h
const CLASSIFIER_MAX: f64 = 0.4;
const KEYWORD_FLAG: f64 = 0.3;
const SHORT_TITLE: f64 = 0.2;
const SHORT_DESCRIPTION: f64 = 0.2;
const REPEATED_CHARS: f64 = 0.3;
const UNVERIFIED_ACCOUNT: f64 = 0.1;
const BRAND_NEW_ACCOUNT: f64 = 0.2;

const MIN_TITLE_CHARS: usize = 5;
const MIN_DESCRIPTION_CHARS: usize = 10;
const MIN_LOCATION_CHARS: usize = 3;
const REPEAT_RUN_LEN: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct SpamResult {
    pub is_spam: bool,
    pub score: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl SpamResult {
    pub fn not_spam() -> Self {
        Self {
            is_spam: false,
            score: 0.0,
            reasons: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityResult {
    pub is_valid: bool,
    pub score: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl QualityResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            score: 1.0,
            reasons: Vec::new(),
        }
    }
}

/// Spam verdict plus whether the configured classifier failed to answer.
#[derive(Debug)]
pub struct SpamOutcome {
    pub result: SpamResult,
    pub classifier_degraded: bool,
}

/// Keyword rules compiled once at evaluator construction.
#[derive(Debug)]
pub struct KeywordRules {
    set: RegexSet,
}

impl KeywordRules {
    pub fn compile(keywords: &[String]) -> anyhow::Result<Self> {
        let patterns: Vec<String> = keywords
            .iter()
            .map(|k| format!("(?i){}", regex::escape(k)))
            .collect();
        Ok(Self {
            set: RegexSet::new(patterns)?,
        })
    }

    fn matches(&self, text: &str) -> bool {
        !self.set.is_empty() && self.set.is_match(text)
    }
}

/// Score one candidate for spam. `recent_count` is the number of submissions
/// by this user in the trailing 24 h snapshot (candidate excluded).
pub async fn analyze_spam(
    cfg: &SpamConfig,
    rules: &KeywordRules,
    candidate: &SubmissionCandidate,
    recent_count: usize,
    classifier: Option<&DynClassifier>,
) -> SpamOutcome {
    let mut score = 0.0f64;
    let mut reasons = Vec::new();
    let mut classifier_degraded = false;

    // Frequency throttling.
    if recent_count > 10 {
        score += FREQ_HEAVY;
        reasons.push(format!("{recent_count} submissions in the last 24 hours"));
    } else if recent_count > 5 {
        score += FREQ_ELEVATED;
        reasons.push(format!(
            "elevated submission rate ({recent_count} in 24 hours)"
        ));
    }

    // Optional external classifier, timeout-wrapped and non-blocking.
    if let Some(classifier) = classifier {
        let timeout = StdDuration::from_millis(cfg.classifier_timeout_ms);
        match tokio::time::timeout(
            timeout,
            classifier.classify(&candidate.title, &candidate.description),
        )
        .await
        {
            Ok(Some(c)) => {
                if c.is_spam {
                    let contribution = c.confidence.clamp(0.0, 1.0) * CLASSIFIER_MAX;
                    score += contribution;
                    let why = c.reason.unwrap_or_else(|| "no reason given".to_string());
                    reasons.push(format!(
                        "content classifier flagged spam (confidence {:.2}): {why}",
                        c.confidence
                    ));
                }
            }
            Ok(None) => {
                classifier_degraded = true;
                debug!(provider = classifier.provider_name(), "classifier had no answer");
            }
            Err(_) => {
                classifier_degraded = true;
                debug!(
                    provider = classifier.provider_name(),
                    timeout_ms = cfg.classifier_timeout_ms,
                    "classifier call timed out"
                );
            }
        }
    }

    // Rule-based keyword flags, as fallback and complement.
    let combined_text = format!("{} {}", candidate.title, candidate.description);
    if rules.matches(&combined_text) {
        score += KEYWORD_FLAG;
        reasons.push("contains flagged keywords".to_string());
    }

    // Shape heuristics.
    if candidate.title.trim().chars().count() < MIN_TITLE_CHARS {
        score += SHORT_TITLE;
        reasons.push("very short title".to_string());
    }
    if candidate.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        score += SHORT_DESCRIPTION;
        reasons.push("very short description".to_string());
    }
    if has_repeated_run(&combined_text, REPEAT_RUN_LEN) {
        score += REPEATED_CHARS;
        reasons.push("repeated-character pattern".to_string());
    }

    // Account signals.
    if !candidate.submitter.verified {
        score += UNVERIFIED_ACCOUNT;
        reasons.push("unverified account".to_string());
    }
    if let Some(created) = candidate.submitter.account_created_at {
        let account_age = candidate.submitted_at.signed_duration_since(created);
        if account_age < Duration::hours(1) {
            score += BRAND_NEW_ACCOUNT;
            reasons.push("account created less than an hour ago".to_string());
        }
    }

    let score = score.min(1.0);
    SpamOutcome {
        result: SpamResult {
            is_spam: score > cfg.spam_threshold,
            score,
            reasons,
        },
        classifier_degraded,
    }
}

/// Completeness/relevance validation, independent of the spam score.
pub fn analyze_quality(cfg: &QualityConfig, candidate: &SubmissionCandidate) -> QualityResult {
    let mut score = 1.0f64;
    let mut reasons = Vec::new();

    if candidate.title.trim().chars().count() < MIN_TITLE_CHARS {
        score -= 0.2;
        reasons.push("title missing or too short".to_string());
    }

    let description = candidate.description.trim();
    let description_present = !description.is_empty();
    if description.chars().count() < MIN_DESCRIPTION_CHARS {
        score -= 0.3;
        reasons.push("description missing or too short".to_string());
    }

    let location_len = candidate
        .location_text
        .as_deref()
        .map(|t| t.trim().chars().count())
        .unwrap_or(0);
    if location_len < MIN_LOCATION_CHARS {
        score -= 0.2;
        reasons.push("location text missing or too short".to_string());
    }

    if candidate.coordinates.is_none() {
        score -= 0.1;
        reasons.push("no coordinates attached".to_string());
    }

    if description_present && !contains_relevance_keyword(description, &cfg.relevance_keywords) {
        score -= 0.1;
        reasons.push("description does not mention any known incident term".to_string());
    }

    let score = score.max(0.0);
    QualityResult {
        is_valid: score >= cfg.quality_threshold,
        score,
        reasons,
    }
}

/// True when `text` contains a run of `run_len` identical consecutive
/// characters (classic keyboard-mash signal).
fn has_repeated_run(text: &str, run_len: usize) -> bool {
    let mut run = 0usize;
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        if Some(ch) == prev {
            run += 1;
            if run >= run_len {
                return true;
            }
        } else {
            run = 1;
            prev = Some(ch);
        }
    }
    false
}

fn contains_relevance_keyword(description: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        // No configured vocabulary: nothing to deduct for.
        return true;
    }
    let lower = description.to_lowercase();
    keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
}
