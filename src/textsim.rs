//! textsim.rs — lexical similarity between two free-text strings.
//!
//! Normalize case/whitespace, then Jaccard over word-token sets. Identical
//! normalized strings score 1.0; if the shorter string is contained in the
//! longer one the score is floored at 0.8 (catches truncated re-submissions
//! of the same report). Empty input scores 0.

use std::collections::HashSet;

/// Containment floor: a truncation of an existing text is a near-duplicate.
const CONTAINMENT_FLOOR: f64 = 0.8;

/// Similarity of two strings in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    let na = normalize(a);
    let nb = normalize(b);

    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }
    if na == nb {
        return 1.0;
    }

    let set_a: HashSet<&str> = na.split_whitespace().collect();
    let set_b: HashSet<&str> = nb.split_whitespace().collect();

    let intersection = set_a.intersection(&set_b).count() as f64;
    let union = set_a.union(&set_b).count() as f64;
    let jaccard = if union > 0.0 { intersection / union } else { 0.0 };

    let (shorter, longer) = if na.len() <= nb.len() {
        (&na, &nb)
    } else {
        (&nb, &na)
    };
    if longer.contains(shorter.as_str()) {
        return jaccard.max(CONTAINMENT_FLOOR);
    }

    jaccard
}

/// Lower-case and collapse whitespace runs to a single space.
fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = false;
    for ch in s.chars() {
        let lc = ch.to_lowercase().next().unwrap_or(ch);
        if lc.is_whitespace() {
            if !last_was_space && !out.is_empty() {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(lc);
            last_was_space = false;
        }
    }
    out.trim_end().to_string()
}
