//! capabilities.rs — injected collaborator contracts.
//!
//! The evaluator does not own storage, the content classifier, or key
//! material; it consumes them through these narrow traits. Absence of the
//! classifier is a valid, fully supported configuration (`DisabledClassifier`),
//! not a special case threaded through call sites.

use async_trait::async_trait;
use std::sync::Arc;

use crate::candidate::SubmissionHistoryEntry;

// ------------------------------------------------------------
// History read capability
// ------------------------------------------------------------

/// Bounded, read-only access to a submitter's recent reports. Approximate or
/// eventually-consistent results are acceptable: this feeds advisory scoring,
/// not a ledger.
#[async_trait]
pub trait HistoryReader: Send + Sync {
    /// Most recent entries for `user_id` within the trailing `window_hours`,
    /// newest first, at most `limit` entries.
    async fn fetch_recent(
        &self,
        user_id: &str,
        window_hours: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<SubmissionHistoryEntry>>;
}

pub type DynHistoryReader = Arc<dyn HistoryReader>;

/// Empty history; useful for tests and first-submission flows.
pub struct NoHistory;

#[async_trait]
impl HistoryReader for NoHistory {
    async fn fetch_recent(
        &self,
        _user_id: &str,
        _window_hours: i64,
        _limit: usize,
    ) -> anyhow::Result<Vec<SubmissionHistoryEntry>> {
        Ok(Vec::new())
    }
}

// ------------------------------------------------------------
// Optional content classifier
// ------------------------------------------------------------

/// Result returned by the external content classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub is_spam: bool,
    /// Classifier's spam confidence in [0, 1].
    pub confidence: f64,
    pub reason: Option<String>,
}

/// External spam classifier behind a narrow seam. `None` means "no opinion"
/// (failure, rate limit, disabled) and must never block the evaluation.
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    async fn classify(&self, title: &str, description: &str) -> Option<Classification>;

    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynClassifier = Arc<dyn ContentClassifier>;

/// Returns `None` always; used when no classifier is configured.
pub struct DisabledClassifier;

#[async_trait]
impl ContentClassifier for DisabledClassifier {
    async fn classify(&self, _title: &str, _description: &str) -> Option<Classification> {
        None
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed-answer classifier for tests and local runs.
#[derive(Clone)]
pub struct MockClassifier {
    pub fixed: Classification,
}

#[async_trait]
impl ContentClassifier for MockClassifier {
    async fn classify(&self, _title: &str, _description: &str) -> Option<Classification> {
        Some(self.fixed.clone())
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Secret provisioning
// ------------------------------------------------------------

/// Supplies the process-wide biometric encryption key. Loaded once at
/// evaluator construction and treated as immutable for the process lifetime.
pub trait SecretProvider: Send + Sync {
    fn descriptor_key(&self) -> anyhow::Result<[u8; 32]>;
}

/// Key held directly in memory (tests, or callers that already resolved the
/// secret from their own vault).
pub struct StaticKeyProvider(pub [u8; 32]);

impl SecretProvider for StaticKeyProvider {
    fn descriptor_key(&self) -> anyhow::Result<[u8; 32]> {
        Ok(self.0)
    }
}
