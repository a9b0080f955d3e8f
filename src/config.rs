//! config.rs — one immutable `EvaluatorConfig` enumerating every tunable.
//!
//! Constructed from defaults or loaded from a TOML file; values are
//! sanitized on load (thresholds clamped into [0,1], non-positive tolerances
//! reset to defaults) rather than rejected, so a sloppy config file degrades
//! to documented behavior instead of refusing to start.

use serde::Deserialize;
use std::path::Path;

/// Duplicate-report detection tunables (spec'd look-back: 10 entries / 24 h).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DuplicateConfig {
    pub lookback_hours: i64,
    pub history_limit: usize,
    /// Per-entry combined score above which an entry counts as "similar".
    pub similar_threshold: f64,
    /// Confidence above which the verdict flips to duplicate.
    pub duplicate_threshold: f64,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            lookback_hours: 24,
            history_limit: 10,
            similar_threshold: 0.5,
            duplicate_threshold: 0.75,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpamConfig {
    /// Capped spam score above which the verdict flips to spam.
    pub spam_threshold: f64,
    /// Rule-based keyword flags (+0.3 when any matches title/description).
    pub keywords: Vec<String>,
    /// Timeout for the optional external classifier call.
    pub classifier_timeout_ms: u64,
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            spam_threshold: 0.6,
            keywords: default_spam_keywords(),
            classifier_timeout_ms: 1500,
        }
    }
}

fn default_spam_keywords() -> Vec<String> {
    [
        "klik di sini",
        "click here",
        "free money",
        "uang gratis",
        "jackpot",
        "judi online",
        "casino",
        "promo gila",
        "bit.ly",
        "wa.me",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Deducted score at or above which the report still counts as valid.
    pub quality_threshold: f64,
    /// A description containing none of these loses a small relevance deduction.
    pub relevance_keywords: Vec<String>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            quality_threshold: 0.6,
            relevance_keywords: default_relevance_keywords(),
        }
    }
}

fn default_relevance_keywords() -> Vec<String> {
    [
        "jalan", "rusak", "lampu", "sampah", "banjir", "pohon", "kabel", "air", "jembatan",
        "got", "lubang", "macet", "road", "broken", "light", "trash", "flood", "tree",
        "water", "bridge", "pothole", "leak",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Summed penalty above which the verdict flips to anomalous.
    pub anomaly_threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhotoConfig {
    /// Max tolerated distance between EXIF GPS and reported coordinates.
    pub max_distance_m: f64,
    /// Max tolerated capture age at submission time.
    pub max_age_minutes: i64,
    /// Under strict mode, a failed provenance check blocks the submission.
    pub strict: bool,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            max_distance_m: 100.0,
            max_age_minutes: 60,
            strict: false,
        }
    }
}

/// Biometric thresholds for the two calling flows. `BiometricMatcher` takes
/// the threshold explicitly; these are the documented values callers pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BiometricConfig {
    pub verification_threshold: f64,
    pub identification_threshold: f64,
}

impl Default for BiometricConfig {
    fn default() -> Self {
        Self {
            verification_threshold: 0.7,
            identification_threshold: 0.6,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Overall deadline for the fraud-track fan-out.
    pub deadline_ms: u64,
    /// Window and limit for the single history snapshot feeding all checks.
    /// Wider than the 24 h fraud windows so the anomaly check can see a
    /// submitter's longer-term pattern.
    pub history_window_hours: i64,
    pub history_fetch_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            deadline_ms: 3000,
            history_window_hours: 168,
            history_fetch_limit: 50,
        }
    }
}

/// Every tunable of the evaluator, immutable after construction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub duplicate: DuplicateConfig,
    pub spam: SpamConfig,
    pub quality: QualityConfig,
    pub anomaly: AnomalyConfig,
    pub photo: PhotoConfig,
    pub biometric: BiometricConfig,
    pub runtime: RuntimeConfig,
}

impl EvaluatorConfig {
    /// Load from a TOML file, then sanitize.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let mut cfg: EvaluatorConfig = toml::from_str(&data)?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Clamp thresholds into [0,1] and reset non-positive tolerances to their
    /// defaults.
    pub fn sanitize(&mut self) {
        fn clamp01_or(value: &mut f64, fallback: f64) {
            if !(0.0..=1.0).contains(value) || !value.is_finite() {
                *value = fallback;
            }
        }

        let d = DuplicateConfig::default();
        clamp01_or(&mut self.duplicate.similar_threshold, d.similar_threshold);
        clamp01_or(&mut self.duplicate.duplicate_threshold, d.duplicate_threshold);
        if self.duplicate.lookback_hours <= 0 {
            self.duplicate.lookback_hours = d.lookback_hours;
        }
        if self.duplicate.history_limit == 0 {
            self.duplicate.history_limit = d.history_limit;
        }

        clamp01_or(&mut self.spam.spam_threshold, SpamConfig::default().spam_threshold);
        if self.spam.classifier_timeout_ms == 0 {
            self.spam.classifier_timeout_ms = SpamConfig::default().classifier_timeout_ms;
        }

        clamp01_or(
            &mut self.quality.quality_threshold,
            QualityConfig::default().quality_threshold,
        );
        clamp01_or(
            &mut self.anomaly.anomaly_threshold,
            AnomalyConfig::default().anomaly_threshold,
        );

        let p = PhotoConfig::default();
        if !self.photo.max_distance_m.is_finite() || self.photo.max_distance_m <= 0.0 {
            self.photo.max_distance_m = p.max_distance_m;
        }
        if self.photo.max_age_minutes <= 0 {
            self.photo.max_age_minutes = p.max_age_minutes;
        }

        let b = BiometricConfig::default();
        clamp01_or(&mut self.biometric.verification_threshold, b.verification_threshold);
        clamp01_or(&mut self.biometric.identification_threshold, b.identification_threshold);

        let r = RuntimeConfig::default();
        if self.runtime.deadline_ms == 0 {
            self.runtime.deadline_ms = r.deadline_ms;
        }
        if self.runtime.history_window_hours <= 0 {
            self.runtime.history_window_hours = r.history_window_hours;
        }
        if self.runtime.history_fetch_limit == 0 {
            self.runtime.history_fetch_limit = r.history_fetch_limit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = EvaluatorConfig::default();
        assert_eq!(cfg.duplicate.duplicate_threshold, 0.75);
        assert_eq!(cfg.spam.spam_threshold, 0.6);
        assert_eq!(cfg.quality.quality_threshold, 0.6);
        assert_eq!(cfg.anomaly.anomaly_threshold, 0.5);
        assert_eq!(cfg.photo.max_distance_m, 100.0);
        assert_eq!(cfg.photo.max_age_minutes, 60);
        assert!(!cfg.photo.strict);
        assert_eq!(cfg.biometric.verification_threshold, 0.7);
        assert_eq!(cfg.biometric.identification_threshold, 0.6);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: EvaluatorConfig = toml::from_str(
            r#"
            [photo]
            strict = true
            max_distance_m = 250.0
            "#,
        )
        .unwrap();
        assert!(cfg.photo.strict);
        assert_eq!(cfg.photo.max_distance_m, 250.0);
        assert_eq!(cfg.photo.max_age_minutes, 60);
        assert_eq!(cfg.spam.spam_threshold, 0.6);
    }

    #[test]
    fn sanitize_resets_out_of_range_values() {
        let mut cfg = EvaluatorConfig::default();
        cfg.spam.spam_threshold = 3.5;
        cfg.photo.max_distance_m = -1.0;
        cfg.duplicate.history_limit = 0;
        cfg.sanitize();
        assert_eq!(cfg.spam.spam_threshold, 0.6);
        assert_eq!(cfg.photo.max_distance_m, 100.0);
        assert_eq!(cfg.duplicate.history_limit, 10);
    }
}
