use std::fmt;

// ---------------------------------------------------------------------------
// TrackProperties – the ordered label → display-string table
// ---------------------------------------------------------------------------

/// Human-readable properties of one track, e.g. `"Sample Rate" → "44100 Hz"`.
///
/// Order is extraction order. Inserting an existing key replaces its value
/// in place, so the original position is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackProperties {
    entries: Vec<(String, String)>,
}

impl TrackProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate `(key, value)` pairs in extraction order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TrackProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = TrackProperties::new();
        for (k, v) in iter {
            props.insert(k, v);
        }
        props
    }
}

// ---------------------------------------------------------------------------
// DecodedAudio – whole file in memory
// ---------------------------------------------------------------------------

/// Fully decoded PCM, one `Vec` per channel, normalised to `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
    /// Bytes per sample as reported by the source codec.
    pub sample_width: u16,
}

impl DecodedAudio {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels.iter().map(Vec::len).min().unwrap_or(0)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Overall loudness relative to full scale. Silence yields `-inf`.
    pub fn dbfs(&self) -> f64 {
        let count: usize = self.channels.iter().map(Vec::len).sum();
        if count == 0 {
            return f64::NEG_INFINITY;
        }
        let sum_sq: f64 = self
            .channels
            .iter()
            .flatten()
            .map(|&s| (s as f64) * (s as f64))
            .sum();
        let rms = (sum_sq / count as f64).sqrt();
        if rms == 0.0 {
            return f64::NEG_INFINITY;
        }
        20.0 * rms.log10()
    }
}

// ---------------------------------------------------------------------------
// Spectrum result
// ---------------------------------------------------------------------------

/// Vertical extent of a spectrum curve in dB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DbRange {
    pub min: f64,
    pub max: f64,
}

impl DbRange {
    /// Smallest range covering both.
    pub fn union(self, other: DbRange) -> DbRange {
        DbRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn padded(self, pad: f64) -> DbRange {
        DbRange {
            min: self.min - pad,
            max: self.max + pad,
        }
    }
}

impl fmt::Display for DbRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.1} dB, {:.1} dB]", self.min, self.max)
    }
}

/// Magnitude spectrum of one track, replaced wholesale on every load.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumData {
    pub min_db: f64,
    pub max_db: f64,
    /// Bin centre frequencies in Hz.
    pub freqs: Vec<f64>,
    /// `20*log10(|X|+eps)` per bin, same length as `freqs`.
    pub magnitudes_db: Vec<f64>,
}

impl SpectrumData {
    pub fn range(&self) -> DbRange {
        DbRange {
            min: self.min_db,
            max: self.max_db,
        }
    }
}
