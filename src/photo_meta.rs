//! photo_meta.rs — embedded provenance metadata extraction from image bytes.
//!
//! Reads EXIF GPS coordinates (DMS rationals + hemisphere refs) and the
//! capture timestamp (DateTimeOriginal, falling back to DateTime). Capture
//! timestamps carry no zone in EXIF; they are interpreted as UTC, which is
//! what the mobile capture client writes.
//!
//! Extraction never fails hard: unreadable or EXIF-less payloads degrade to
//! empty metadata, and the provenance policy in `photo` decides what that
//! means for the submission.

use chrono::{DateTime, NaiveDateTime, Utc};
use exif::{Exif, In, Reader, Tag, Value};
use std::io::Cursor;

use crate::geo::GeoPoint;

/// What the image payload claims about where and when it was captured.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoMetadata {
    pub gps: Option<GeoPoint>,
    pub captured_at: Option<DateTime<Utc>>,
}

impl PhotoMetadata {
    pub fn is_empty(&self) -> bool {
        self.gps.is_none() && self.captured_at.is_none()
    }
}

/// Extract GPS + capture timestamp from raw image bytes.
pub fn extract(image: &[u8]) -> PhotoMetadata {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(image)) {
        Ok(exif) => exif,
        Err(_) => return PhotoMetadata::default(),
    };

    PhotoMetadata {
        gps: read_gps(&exif),
        captured_at: read_capture_time(&exif),
    }
}

fn read_gps(exif: &Exif) -> Option<GeoPoint> {
    let lat = read_coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S')?;
    let lng = read_coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W')?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }
    Some(GeoPoint::new(lat, lng))
}

/// One axis: DMS rationals converted to decimal degrees, negated when the
/// hemisphere ref matches `negative_ref`.
fn read_coordinate(
    exif: &Exif,
    value_tag: Tag,
    ref_tag: Tag,
    negative_ref: u8,
) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let dms = match &field.value {
        Value::Rational(parts) if !parts.is_empty() => parts,
        _ => return None,
    };

    let degrees = dms.first().map(|r| r.to_f64())?;
    let minutes = dms.get(1).map(|r| r.to_f64()).unwrap_or(0.0);
    let seconds = dms.get(2).map(|r| r.to_f64()).unwrap_or(0.0);
    let mut decimal = degrees + minutes / 60.0 + seconds / 3600.0;

    if let Some(ref_field) = exif.get_field(ref_tag, In::PRIMARY) {
        if let Value::Ascii(refs) = &ref_field.value {
            let is_negative = refs
                .first()
                .and_then(|r| r.first())
                .map(|b| b.eq_ignore_ascii_case(&negative_ref))
                .unwrap_or(false);
            if is_negative {
                decimal = -decimal;
            }
        }
    }

    decimal.is_finite().then_some(decimal)
}

fn read_capture_time(exif: &Exif) -> Option<DateTime<Utc>> {
    [Tag::DateTimeOriginal, Tag::DateTime]
        .iter()
        .find_map(|tag| {
            let field = exif.get_field(*tag, In::PRIMARY)?;
            let raw = match &field.value {
                Value::Ascii(lines) => lines.first()?,
                _ => return None,
            };
            let text = std::str::from_utf8(raw).ok()?;
            parse_exif_datetime(text.trim())
        })
}

/// EXIF datetime format is `YYYY:MM:DD HH:MM:SS`.
fn parse_exif_datetime(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, "%Y:%m:%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
