use realfft::RealFftPlanner;

use super::error::SpectrumError;
use super::model::{DbRange, DecodedAudio, SpectrumData};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Analysis window: the first 2 s at 44.1 kHz, regardless of actual rate.
pub const SPECTRUM_WINDOW: usize = 88_200;

/// Added to |X| before taking the log so silent bins stay finite.
pub const DB_EPSILON: f64 = 1e-6;

/// Upper end of the displayed frequency axis.
pub const MAX_DISPLAY_FREQ: u32 = 20_000;

/// Head-room added above and below a shared vertical scale.
pub const SHARED_SCALE_PAD: f64 = 5.0;

const FULL_RANGE_TICKS: [u32; 12] = [
    0, 1000, 2000, 4000, 6000, 8000, 10000, 12000, 14000, 16000, 18000, 20000,
];

// ---------------------------------------------------------------------------
// Signal preparation
// ---------------------------------------------------------------------------

/// Average all channels into one. Mono input is copied through.
pub fn downmix(audio: &DecodedAudio) -> Vec<f64> {
    let n_ch = audio.channel_count();
    let frames = audio.frames();
    match n_ch {
        0 => Vec::new(),
        1 => audio.channels[0].iter().map(|&s| s as f64).collect(),
        _ => (0..frames)
            .map(|i| {
                let sum: f64 = audio.channels.iter().map(|ch| ch[i] as f64).sum();
                sum / n_ch as f64
            })
            .collect(),
    }
}

/// Symmetric Hann window of `len` points (endpoints are zero).
pub fn hann_window(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (len - 1) as f64;
            (0..len)
                .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / denom).cos())
                .collect()
        }
    }
}

/// Bin centre frequencies for a real FFT of `n` points.
pub fn rfft_frequencies(n: usize, sample_rate: u32) -> Vec<f64> {
    let step = sample_rate as f64 / n as f64;
    (0..=n / 2).map(|k| k as f64 * step).collect()
}

// ---------------------------------------------------------------------------
// Spectrum computation
// ---------------------------------------------------------------------------

/// Downmix, truncate, window and transform `audio` into a dB spectrum.
pub fn compute_spectrum(audio: &DecodedAudio) -> Result<SpectrumData, SpectrumError> {
    if audio.sample_rate == 0 {
        return Err(SpectrumError::ZeroSampleRate);
    }

    let mut samples = downmix(audio);
    samples.truncate(SPECTRUM_WINDOW);
    if samples.is_empty() {
        return Err(SpectrumError::Empty);
    }

    let n = samples.len();
    for (s, w) in samples.iter_mut().zip(hann_window(n)) {
        *s *= w;
    }

    let mut planner = RealFftPlanner::<f64>::new();
    let r2c = planner.plan_fft_forward(n);
    let mut spectrum = r2c.make_output_vec();
    r2c.process(&mut samples, &mut spectrum)
        .map_err(|e| SpectrumError::Fft(e.to_string()))?;

    let magnitudes_db: Vec<f64> = spectrum
        .iter()
        .map(|c| 20.0 * (c.norm() + DB_EPSILON).log10())
        .collect();

    let min_db = magnitudes_db.iter().copied().fold(f64::INFINITY, f64::min);
    let max_db = magnitudes_db
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    if !min_db.is_finite() || !max_db.is_finite() {
        return Err(SpectrumError::NonFinite);
    }

    Ok(SpectrumData {
        min_db,
        max_db,
        freqs: rfft_frequencies(n, audio.sample_rate),
        magnitudes_db,
    })
}

// ---------------------------------------------------------------------------
// Axis layout
// ---------------------------------------------------------------------------

/// One labelled mark on the frequency axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

/// Horizontal extent and tick marks of the frequency axis.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyAxis {
    pub max_freq: f64,
    pub ticks: Vec<Tick>,
}

/// `1500` → `"1k"`, `800` → `"800"`.
pub fn tick_label(freq: u32) -> String {
    if freq >= 1000 {
        format!("{}k", freq / 1000)
    } else {
        freq.to_string()
    }
}

/// X axis clipped to `min(20 kHz, Nyquist)`.
///
/// Full-band material gets the fixed 0–20 kHz marks; anything narrower gets
/// eleven evenly spaced marks up to Nyquist.
pub fn frequency_axis(sample_rate: u32) -> FrequencyAxis {
    let max_freq = MAX_DISPLAY_FREQ.min(sample_rate / 2);
    let values: Vec<u32> = if max_freq >= MAX_DISPLAY_FREQ {
        FULL_RANGE_TICKS.to_vec()
    } else {
        let step = max_freq as f64 / 10.0;
        (0..=10)
            .map(|i| if i == 10 { max_freq } else { (i as f64 * step) as u32 })
            .collect()
    };

    FrequencyAxis {
        max_freq: max_freq as f64,
        ticks: values
            .into_iter()
            .map(|v| Tick {
                value: v as f64,
                label: tick_label(v),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Output surface
// ---------------------------------------------------------------------------

/// What a spectrum surface currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceContent {
    Blank,
    Curve {
        /// `[freq, dB]` pairs within the displayed band.
        points: Vec<[f64; 2]>,
        axis: FrequencyAxis,
        own_range: DbRange,
        /// Scale shared with the companion track, if any.
        shared: Option<DbRange>,
    },
    Error(String),
}

/// A drawable spectrum plot, independent of rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumSurface {
    pub title: String,
    pub content: SurfaceContent,
}

impl SpectrumSurface {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: SurfaceContent::Blank,
        }
    }

    pub fn clear(&mut self) {
        self.content = SurfaceContent::Blank;
    }

    /// Pin the vertical axis to `shared`, or return to autoscale with `None`.
    /// No effect unless a curve is shown.
    pub fn set_shared_scale(&mut self, range: Option<DbRange>) {
        if let SurfaceContent::Curve { shared, .. } = &mut self.content {
            *shared = range;
        }
    }

    /// Vertical bounds to draw: shared scale with padding, else the curve's own.
    pub fn y_bounds(&self) -> Option<DbRange> {
        match &self.content {
            SurfaceContent::Curve {
                own_range, shared, ..
            } => Some(match shared {
                Some(range) => range.padded(SHARED_SCALE_PAD),
                None => *own_range,
            }),
            _ => None,
        }
    }
}

/// Compute the spectrum of `audio` and draw it onto `surface`.
///
/// Any failure clears the surface and leaves an inline error message there
/// instead; the caller only sees `None`.
pub fn plot_spectrum(
    audio: &DecodedAudio,
    surface: &mut SpectrumSurface,
    title: &str,
    shared: Option<DbRange>,
) -> Option<SpectrumData> {
    surface.title = title.to_string();
    match compute_spectrum(audio) {
        Ok(data) => {
            let axis = frequency_axis(audio.sample_rate);
            let points = data
                .freqs
                .iter()
                .zip(&data.magnitudes_db)
                .take_while(|(f, _)| **f <= axis.max_freq)
                .map(|(&f, &db)| [f, db])
                .collect();
            surface.content = SurfaceContent::Curve {
                points,
                axis,
                own_range: data.range(),
                shared,
            };
            Some(data)
        }
        Err(e) => {
            log::error!("{title}: spectrum failed: {e}");
            surface.content = SurfaceContent::Error(format!("Error plotting spectrum:\n{e}"));
            None
        }
    }
}
