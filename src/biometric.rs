//! biometric.rs — descriptor matching against an encrypted stored template.
//!
//! Decrypt, validate both vectors, Euclidean distance, threshold verdict.
//! This is the one check that gates identity rather than content quality, so
//! every failure path (bad ciphertext, length mismatch, missing input) is a
//! definitive non-match with maximal distance. Never fail open here.

use serde::Serialize;
use tracing::warn;

use crate::cipher::{validate_descriptor, DescriptorCipher, EncryptedDescriptor};

#[derive(Debug, Clone, Serialize)]
pub struct BiometricResult {
    pub is_match: bool,
    pub distance: f64,
    /// Percentage confidence, only meaningful when matched; rounded to two
    /// decimals for stable display.
    pub confidence: f64,
}

impl BiometricResult {
    /// The fail-closed default: definitive non-match, maximal distance.
    pub fn non_match() -> Self {
        Self {
            is_match: false,
            distance: f64::MAX,
            confidence: 0.0,
        }
    }
}

/// Matches freshly captured descriptors against encrypted stored ones.
pub struct BiometricMatcher {
    cipher: DescriptorCipher,
}

impl BiometricMatcher {
    pub fn new(cipher: DescriptorCipher) -> Self {
        Self { cipher }
    }

    /// Compare `probe` against the encrypted `stored` template. The caller
    /// supplies the threshold explicitly (0.7 for verification flows, 0.6 for
    /// identification; see `BiometricConfig`).
    pub fn match_descriptors(
        &self,
        stored: &EncryptedDescriptor,
        probe: &[f32],
        threshold: f64,
    ) -> BiometricResult {
        if threshold <= 0.0 || !threshold.is_finite() {
            warn!(threshold, "rejecting biometric match with unusable threshold");
            return BiometricResult::non_match();
        }

        if let Err(e) = validate_descriptor(probe) {
            warn!(error = %e, "captured descriptor failed validation");
            return BiometricResult::non_match();
        }

        let stored_plain = match self.cipher.decrypt_descriptor(stored) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "stored descriptor could not be decrypted");
                return BiometricResult::non_match();
            }
        };

        let distance = euclidean_distance(&stored_plain, probe);
        let is_match = distance < threshold;
        let confidence = if is_match {
            round2((1.0 - distance / threshold) * 100.0)
        } else {
            0.0
        };

        BiometricResult {
            is_match,
            distance,
            confidence,
        }
    }
}

/// `sqrt(sum((a_i - b_i)^2))`; both slices are already length-validated.
fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
