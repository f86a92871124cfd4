use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::metadata::{KEY_BITRATE, KEY_BIT_DEPTH, KEY_SAMPLE_RATE, KEY_VOLUME};
use super::model::TrackProperties;

// ---------------------------------------------------------------------------
// Policy table
// ---------------------------------------------------------------------------

/// Which way a numeric property is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    /// Only loudness uses this. A louder (less negative) dBFS still counts as
    /// favourable, the same as `HigherIsBetter`; only the wording differs.
    LowerIsBetter,
}

/// Keys that get better/worse highlighting. Anything else is shown plain.
pub const COMPARISON_POLICY: &[(&str, Direction)] = &[
    (KEY_BITRATE, Direction::HigherIsBetter),
    (KEY_SAMPLE_RATE, Direction::HigherIsBetter),
    (KEY_BIT_DEPTH, Direction::HigherIsBetter),
    (KEY_VOLUME, Direction::LowerIsBetter),
];

pub fn policy_for(key: &str) -> Option<Direction> {
    COMPARISON_POLICY
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, d)| *d)
}

// ---------------------------------------------------------------------------
// Numeric extraction
// ---------------------------------------------------------------------------

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?\d+\.?\d*").expect("numeric token pattern is valid")
});

/// First signed decimal in `value`: `"320 kbps"` → `320.0`, `"N/A"` → `None`.
pub fn extract_numeric(value: &str) -> Option<f64> {
    NUMBER
        .find(value)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Favorable,
    Unfavorable,
}

/// How one property of this track stands against the companion track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    pub verdict: Verdict,
    pub direction: Direction,
    /// Numeric value extracted from the companion track.
    pub other_value: f64,
}

impl Highlight {
    pub fn tooltip(&self) -> String {
        let v = self.other_value;
        match (self.direction, self.verdict) {
            (Direction::HigherIsBetter, Verdict::Favorable) => {
                format!("Higher than other track ({v})")
            }
            (Direction::HigherIsBetter, Verdict::Unfavorable) => {
                format!("Lower than other track ({v})")
            }
            (Direction::LowerIsBetter, Verdict::Favorable) => {
                format!("Better than other track ({v} dB)")
            }
            (Direction::LowerIsBetter, Verdict::Unfavorable) => {
                format!("Worse than other track ({v} dB)")
            }
        }
    }
}

/// Property key → highlight, for keys that received one.
pub type Highlights = BTreeMap<String, Highlight>;

/// Judge every policy key present in both tables, from `own`'s side.
///
/// Keys without a number on either side, or with equal numbers, get no entry.
pub fn compare(own: &TrackProperties, other: &TrackProperties) -> Highlights {
    own.iter()
        .filter_map(|(key, value)| {
            let direction = policy_for(key)?;
            let mine = extract_numeric(value)?;
            let theirs = extract_numeric(other.get(key)?)?;

            let verdict = if mine > theirs {
                Verdict::Favorable
            } else if mine < theirs {
                Verdict::Unfavorable
            } else {
                return None;
            };

            Some((
                key.to_string(),
                Highlight {
                    verdict,
                    direction,
                    other_value: theirs,
                },
            ))
        })
        .collect()
}
