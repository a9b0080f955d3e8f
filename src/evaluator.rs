//! evaluator.rs — root orchestration: fan-out, fan-in, fusion.
//!
//! Per-submission and stateless: one bounded history snapshot feeds all three
//! fraud checks, which run as parallel tasks under a single deadline. A check
//! that errors, panics or misses the deadline contributes its safe default
//! and marks the assessment as degraded — fail-open for fraud signals, but
//! loudly. The acceptance gates (geofence, photo, biometric) are pure over
//! their inputs and run inline.

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::assessment::SubmissionAssessment;
use crate::biometric::{BiometricMatcher, BiometricResult};
use crate::boundary::BoundaryDefinition;
use crate::candidate::{SubmissionCandidate, SubmissionHistoryEntry};
use crate::capabilities::{DynClassifier, DynHistoryReader, SecretProvider};
use crate::checks::{
    self, anomaly, duplicate, spam, AnomalyResult, DuplicateResult, KeywordRules, SpamResult,
};
use crate::cipher::{DescriptorCipher, EncryptedDescriptor};
use crate::config::EvaluatorConfig;
use crate::error::EvaluatorError;
use crate::geofence;
use crate::photo;
use crate::telemetry::anon_hash;

/// Inputs for the optional identity-verification gate. The threshold is
/// explicit on purpose; see `BiometricConfig` for the documented values.
#[derive(Debug, Clone)]
pub struct IdentityCheck {
    pub stored: EncryptedDescriptor,
    pub probe: Vec<f32>,
    pub threshold: f64,
}

pub struct SubmissionTrustEvaluator {
    config: EvaluatorConfig,
    history: DynHistoryReader,
    classifier: Option<DynClassifier>,
    rules: Arc<KeywordRules>,
    matcher: BiometricMatcher,
}

impl SubmissionTrustEvaluator {
    /// Build the evaluator. Key provisioning is required up front: refusing
    /// to start beats silently scoring with a known default key.
    pub fn new(
        mut config: EvaluatorConfig,
        history: DynHistoryReader,
        classifier: Option<DynClassifier>,
        secrets: &dyn SecretProvider,
    ) -> Result<Self, EvaluatorError> {
        config.sanitize();

        let key = secrets
            .descriptor_key()
            .map_err(EvaluatorError::KeyProvisioning)?;
        let cipher = DescriptorCipher::new(&key)?;

        let rules = KeywordRules::compile(&config.spam.keywords)
            .map_err(EvaluatorError::Config)?;

        Ok(Self {
            config,
            history,
            classifier,
            rules: Arc::new(rules),
            matcher: BiometricMatcher::new(cipher),
        })
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate one submission. Errors only for a structurally invalid
    /// candidate; every internal scoring failure degrades instead.
    pub async fn evaluate(
        &self,
        candidate: &SubmissionCandidate,
        boundary: Option<&BoundaryDefinition>,
        identity: Option<&IdentityCheck>,
    ) -> Result<SubmissionAssessment, EvaluatorError> {
        candidate.validate()?;

        let deadline = Duration::from_millis(self.config.runtime.deadline_ms);
        let deadline_at = tokio::time::Instant::now() + deadline;
        let mut degraded_reasons: Vec<String> = Vec::new();

        // One history snapshot for all fraud checks.
        let history = self
            .fetch_history_snapshot(candidate, deadline, &mut degraded_reasons)
            .await;

        // Spam frequency counts only the trailing 24 h of the snapshot.
        let recent_count = history
            .iter()
            .filter(|e| {
                let age = candidate.submitted_at.signed_duration_since(e.created_at);
                age >= ChronoDuration::zero() && age <= ChronoDuration::hours(24)
            })
            .count();

        // Fan out the fraud track.
        let shared_candidate = Arc::new(candidate.clone());
        let shared_history: Arc<[SubmissionHistoryEntry]> = Arc::from(history);

        let dup_task = {
            let cfg = self.config.duplicate.clone();
            let cand = Arc::clone(&shared_candidate);
            let hist = Arc::clone(&shared_history);
            tokio::spawn(async move { duplicate::detect(&cfg, &cand, &hist) })
        };

        let spam_task = {
            let cfg = self.config.spam.clone();
            let rules = Arc::clone(&self.rules);
            let cand = Arc::clone(&shared_candidate);
            let classifier = self.classifier.clone();
            tokio::spawn(async move {
                spam::analyze_spam(&cfg, &rules, &cand, recent_count, classifier.as_ref()).await
            })
        };

        let anomaly_task = {
            let cfg = self.config.anomaly.clone();
            let cand = Arc::clone(&shared_candidate);
            let hist = Arc::clone(&shared_history);
            tokio::spawn(async move { anomaly::detect(&cfg, &cand, &hist) })
        };

        // Quality is a cheap pure function; no task needed.
        let quality = spam::analyze_quality(&self.config.quality, candidate);

        // Fan in with safe defaults past the deadline.
        let duplicate = join_or_default(
            dup_task,
            deadline_at,
            "duplicate",
            DuplicateResult::not_duplicate,
            &mut degraded_reasons,
        )
        .await;

        let spam_outcome = join_or_default(
            spam_task,
            deadline_at,
            "spam",
            || spam::SpamOutcome {
                result: SpamResult::not_spam(),
                classifier_degraded: false,
            },
            &mut degraded_reasons,
        )
        .await;
        if spam_outcome.classifier_degraded {
            degraded_reasons.push(
                "content classifier unavailable; rule-based spam scoring only".to_string(),
            );
        }

        let anomaly = join_or_default(
            anomaly_task,
            deadline_at,
            "anomaly",
            AnomalyResult::no_anomaly,
            &mut degraded_reasons,
        )
        .await;

        let fraud = checks::fuse(duplicate, spam_outcome.result, quality, anomaly);

        // Acceptance gates: pure over their inputs.
        let geofence = geofence::validate(candidate.coordinates, boundary);
        let photo = candidate.image.as_deref().map(|image| {
            photo::validate(
                &self.config.photo,
                image,
                candidate.coordinates,
                candidate.submitted_at,
            )
        });
        let biometric: Option<BiometricResult> = identity
            .map(|id| self.matcher.match_descriptors(&id.stored, &id.probe, id.threshold));

        let degraded = !degraded_reasons.is_empty();
        info!(
            user = %anon_hash(&candidate.submitter.id),
            fraud_score = fraud.score,
            is_fraud = fraud.is_fraud,
            geofence_valid = geofence.is_valid,
            degraded,
            "submission evaluated"
        );

        Ok(SubmissionAssessment {
            fraud,
            geofence,
            photo,
            biometric,
            degraded,
            degraded_reasons,
            evaluated_at: Utc::now(),
        })
    }

    async fn fetch_history_snapshot(
        &self,
        candidate: &SubmissionCandidate,
        deadline: Duration,
        degraded_reasons: &mut Vec<String>,
    ) -> Vec<SubmissionHistoryEntry> {
        let fetch = self.history.fetch_recent(
            &candidate.submitter.id,
            self.config.runtime.history_window_hours,
            self.config.runtime.history_fetch_limit,
        );
        match tokio::time::timeout(deadline, fetch).await {
            Ok(Ok(entries)) => entries,
            Ok(Err(e)) => {
                warn!(error = %e, "history fetch failed; fraud checks run without history");
                degraded_reasons
                    .push("history fetch failed; fraud checks ran without history".to_string());
                Vec::new()
            }
            Err(_) => {
                warn!("history fetch timed out; fraud checks run without history");
                degraded_reasons
                    .push("history fetch timed out; fraud checks ran without history".to_string());
                Vec::new()
            }
        }
    }
}

/// Await a spawned check until the shared deadline; on timeout or panic the
/// check contributes its safe default and a degradation reason.
async fn join_or_default<T>(
    mut task: JoinHandle<T>,
    deadline_at: tokio::time::Instant,
    name: &str,
    default: impl FnOnce() -> T,
    degraded_reasons: &mut Vec<String>,
) -> T {
    match tokio::time::timeout_at(deadline_at, &mut task).await {
        Ok(Ok(value)) => value,
        Ok(Err(join_err)) => {
            warn!(check = name, error = %join_err, "check task failed; using safe default");
            degraded_reasons.push(format!("{name} check failed; safe default used"));
            default()
        }
        Err(_) => {
            task.abort();
            warn!(check = name, "check missed the deadline; using safe default");
            degraded_reasons.push(format!("{name} check missed the deadline; safe default used"));
            default()
        }
    }
}
