//! telemetry.rs — opt-in tracing setup and log anonymization helpers.

use sha2::{Digest, Sha256};
use tracing_subscriber::{fmt, EnvFilter};

/// Install a compact fmt subscriber honoring `RUST_LOG`. Call once from the
/// embedding application (or a test); returns quietly if a global subscriber
/// is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

/// Short stable digest for log lines. Submitter identifiers are never logged
/// raw; only this hashed id.
pub fn anon_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
