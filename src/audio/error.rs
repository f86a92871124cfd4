use thiserror::Error;

/// The file could not be turned into PCM at all. Aborts the load.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("cannot open file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported or unrecognised format: {0}")]
    UnsupportedFormat(String),

    #[error("no decodable audio track")]
    NoTrack,

    #[error("unknown sample rate")]
    UnknownSampleRate,

    #[error("none of the {0} packets could be decoded")]
    NoDecodablePackets(usize),

    #[error("decoder failed: {0}")]
    Codec(String),
}

/// A tag or derived field could not be read. Logged, never fatal.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MetadataWarning {
    #[error("tag probe failed: {0}")]
    Probe(String),

    #[error("tag read failed: {0}")]
    TagRead(String),
}

/// Failure inside the spectrum stage; rendered inline on the plot surface.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SpectrumError {
    #[error("no samples to analyse")]
    Empty,

    #[error("sample rate is zero")]
    ZeroSampleRate,

    #[error("FFT failed: {0}")]
    Fft(String),

    #[error("spectrum contains non-finite values")]
    NonFinite,
}
