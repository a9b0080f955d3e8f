//! photo.rs — photo provenance policy over extracted metadata.
//!
//! Cross-checks the photo's embedded GPS against the reported coordinates and
//! its capture timestamp against the submission time. Missing metadata never
//! blocks by itself: it makes the result invalid with a warning, and only
//! strict mode turns an invalid result into a block.

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::config::PhotoConfig;
use crate::geo::{distance_or_infinite, GeoPoint};
use crate::photo_meta::{extract, PhotoMetadata};

#[derive(Debug, Clone, Serialize)]
pub struct PhotoResult {
    pub is_valid: bool,
    pub should_block: bool,
    pub is_location_match: bool,
    pub is_timestamp_valid: bool,
    /// Distance between embedded GPS and reported coordinates, when both exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    /// Capture age at submission time, when a timestamp was embedded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Extract metadata from the raw payload and apply the tolerance policy.
pub fn validate(
    cfg: &PhotoConfig,
    image: &[u8],
    reported: Option<GeoPoint>,
    submitted_at: DateTime<Utc>,
) -> PhotoResult {
    validate_metadata(cfg, &extract(image), reported, submitted_at)
}

/// Policy over already-extracted metadata; the seam unit tests exercise.
pub fn validate_metadata(
    cfg: &PhotoConfig,
    meta: &PhotoMetadata,
    reported: Option<GeoPoint>,
    submitted_at: DateTime<Utc>,
) -> PhotoResult {
    let age_minutes = meta
        .captured_at
        .map(|t| submitted_at.signed_duration_since(t).num_minutes());

    let Some(gps) = meta.gps else {
        return PhotoResult {
            is_valid: false,
            should_block: cfg.strict,
            is_location_match: false,
            is_timestamp_valid: false,
            distance_m: None,
            age_minutes,
            warning: Some(
                "photo has no embedded GPS metadata; provenance cannot be verified".to_string(),
            ),
        };
    };

    let distance_m = distance_or_infinite(Some(gps), reported);
    let is_location_match = distance_m <= cfg.max_distance_m;

    // An absent timestamp is not penalized; a future one can never be fresh.
    let is_timestamp_valid = match age_minutes {
        Some(age) => (0..=cfg.max_age_minutes).contains(&age),
        None => true,
    };

    let is_valid = is_location_match && is_timestamp_valid;

    let mut warnings = Vec::new();
    if !is_location_match {
        if reported.is_none() {
            warnings.push("no reported coordinates to compare the photo GPS against".to_string());
        } else {
            warnings.push(format!(
                "photo was taken {:.0} m from the reported location (allowed {:.0} m)",
                distance_m, cfg.max_distance_m
            ));
        }
    }
    if !is_timestamp_valid {
        match age_minutes {
            Some(age) if age < 0 => {
                warnings.push("photo capture timestamp is in the future".to_string())
            }
            Some(age) => warnings.push(format!(
                "photo was taken {age} minutes before submission (allowed {} minutes)",
                cfg.max_age_minutes
            )),
            None => {}
        }
    }

    PhotoResult {
        is_valid,
        should_block: cfg.strict && !is_valid,
        is_location_match,
        is_timestamp_valid,
        distance_m: distance_m.is_finite().then_some(distance_m),
        age_minutes,
        warning: (!warnings.is_empty()).then(|| warnings.join("; ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const SPOT: GeoPoint = GeoPoint {
        lat: -6.2088,
        lng: 106.8456,
    };

    fn submitted() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 29, 9, 0, 0).unwrap()
    }

    fn meta(gps: Option<GeoPoint>, minutes_before: Option<i64>) -> PhotoMetadata {
        PhotoMetadata {
            gps,
            captured_at: minutes_before
                .map(|m| submitted() - chrono::Duration::minutes(m)),
        }
    }

    #[test]
    fn matching_fresh_photo_is_valid() {
        let r = validate_metadata(
            &PhotoConfig::default(),
            &meta(Some(SPOT), Some(10)),
            Some(SPOT),
            submitted(),
        );
        assert!(r.is_valid);
        assert!(!r.should_block);
        assert_eq!(r.age_minutes, Some(10));
        assert_eq!(r.distance_m, Some(0.0));
        assert!(r.warning.is_none());
    }

    #[test]
    fn missing_gps_is_invalid_but_non_blocking() {
        let r = validate_metadata(
            &PhotoConfig::default(),
            &meta(None, Some(10)),
            Some(SPOT),
            submitted(),
        );
        assert!(!r.is_valid);
        assert!(!r.should_block);
        assert!(r.warning.unwrap().contains("no embedded GPS"));
    }

    #[test]
    fn missing_gps_blocks_under_strict_mode() {
        let cfg = PhotoConfig {
            strict: true,
            ..PhotoConfig::default()
        };
        let r = validate_metadata(&cfg, &meta(None, None), Some(SPOT), submitted());
        assert!(!r.is_valid);
        assert!(r.should_block);
    }

    #[test]
    fn distant_photo_fails_location_match() {
        let far = GeoPoint::new(-6.2188, 106.8456); // ~1.1 km away
        let r = validate_metadata(
            &PhotoConfig::default(),
            &meta(Some(far), Some(5)),
            Some(SPOT),
            submitted(),
        );
        assert!(!r.is_location_match);
        assert!(!r.is_valid);
        assert!(r.warning.unwrap().contains("from the reported location"));
    }

    #[test]
    fn stale_photo_fails_timestamp_check() {
        let r = validate_metadata(
            &PhotoConfig::default(),
            &meta(Some(SPOT), Some(90)),
            Some(SPOT),
            submitted(),
        );
        assert!(r.is_location_match);
        assert!(!r.is_timestamp_valid);
        assert!(!r.is_valid);
        assert!(r.warning.unwrap().contains("90 minutes"));
    }

    #[test]
    fn future_timestamp_is_invalid() {
        let r = validate_metadata(
            &PhotoConfig::default(),
            &meta(Some(SPOT), Some(-15)),
            Some(SPOT),
            submitted(),
        );
        assert!(!r.is_timestamp_valid);
        assert!(r.warning.unwrap().contains("future"));
    }

    #[test]
    fn absent_timestamp_is_not_penalized() {
        let r = validate_metadata(
            &PhotoConfig::default(),
            &meta(Some(SPOT), None),
            Some(SPOT),
            submitted(),
        );
        assert!(r.is_timestamp_valid);
        assert!(r.is_valid);
        assert_eq!(r.age_minutes, None);
    }

    #[test]
    fn missing_reported_coordinates_fail_closed_for_location() {
        let r = validate_metadata(
            &PhotoConfig::default(),
            &meta(Some(SPOT), Some(5)),
            None,
            submitted(),
        );
        assert!(!r.is_location_match);
        assert!(r.distance_m.is_none());
        assert!(!r.is_valid);
    }

    #[test]
    fn raw_bytes_without_exif_go_through_the_no_gps_path() {
        let r = validate(
            &PhotoConfig::default(),
            b"not an image at all",
            Some(SPOT),
            submitted(),
        );
        assert!(!r.is_valid);
        assert!(!r.should_block);
        assert!(r.warning.is_some());
    }
}
