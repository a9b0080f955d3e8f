// src/lib.rs
// Public library surface for the submission trust evaluator.

pub mod assessment;
pub mod biometric;
pub mod boundary;
pub mod candidate;
pub mod capabilities;
pub mod cipher;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod geo;
pub mod geofence;
pub mod photo;
pub mod photo_meta;
pub mod telemetry;
pub mod textsim;

// Fraud-track pipeline (duplicate, spam/quality, anomaly, fusion)
pub mod checks;

// ---- Re-exports for stable public API ----
pub use crate::assessment::SubmissionAssessment;
pub use crate::boundary::BoundaryDefinition;
pub use crate::candidate::{
    ReportStatus, SubmissionCandidate, SubmissionHistoryEntry, SubmitterProfile,
};
pub use crate::capabilities::{
    Classification, ContentClassifier, DisabledClassifier, DynClassifier, DynHistoryReader,
    HistoryReader, MockClassifier, NoHistory, SecretProvider, StaticKeyProvider,
};
pub use crate::cipher::{DescriptorCipher, EncryptedDescriptor, DESCRIPTOR_LEN};
pub use crate::config::EvaluatorConfig;
pub use crate::error::EvaluatorError;
pub use crate::evaluator::{IdentityCheck, SubmissionTrustEvaluator};
pub use crate::geo::GeoPoint;
