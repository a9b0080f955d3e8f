//! error.rs — typed errors the library surfaces to its caller.
//!
//! The evaluator itself never errors for a structurally valid candidate;
//! internal scoring failures degrade to safe defaults instead (see
//! `evaluator`). What remains: boundary validation and construction-time
//! key provisioning.

use thiserror::Error;

use crate::cipher::CipherError;

#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// Caller-side validation failure, rejected before scoring begins.
    #[error("invalid candidate: {0}")]
    InvalidCandidate(&'static str),

    /// The secret-provisioning capability could not supply a usable key.
    #[error("biometric key provisioning failed")]
    KeyProvisioning(#[source] anyhow::Error),

    /// Key material was provided but refused (e.g. all-zero default key).
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// A configured value could not be compiled into a usable form.
    #[error("invalid configuration")]
    Config(#[source] anyhow::Error),
}
