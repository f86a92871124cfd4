/// Audio layer: decoding, property extraction, spectrum and comparison.
///
/// Architecture:
/// ```text
///  .mp3 / .flac / .wav / .m4a / .ogg / .aac
///        │
///        ▼
///   ┌──────────┐
///   │ decoder  │  symphonia → DecodedAudio (whole file, planar f32)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ metadata │  derived rows + lofty tags → TrackProperties
///   └──────────┘
///        │                         │
///        ▼                         ▼
///   ┌──────────┐             ┌──────────┐
///   │ spectrum │  dB curve   │ compare  │  better/worse vs. other track
///   └──────────┘             └──────────┘
/// ```

pub mod compare;
pub mod decoder;
pub mod error;
pub mod metadata;
pub mod model;
pub mod spectrum;
