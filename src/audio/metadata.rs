use std::path::Path;

use lofty::file::{AudioFile, FileType, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag};

use super::decoder::decode_file;
use super::error::{DecodeError, MetadataWarning};
use super::model::{DecodedAudio, TrackProperties};

// ---------------------------------------------------------------------------
// Property keys
// ---------------------------------------------------------------------------

pub const KEY_FILENAME: &str = "Filename";
pub const KEY_DURATION: &str = "Duration";
pub const KEY_CHANNELS: &str = "Channels";
pub const KEY_SAMPLE_RATE: &str = "Sample Rate";
pub const KEY_BIT_DEPTH: &str = "Bit Depth";
pub const KEY_VOLUME: &str = "Volume (dBFS)";
pub const KEY_BITRATE: &str = "Bitrate";
pub const KEY_FORMAT: &str = "Format";

/// Everything a successful load produces for one track slot.
#[derive(Debug, Clone)]
pub struct TrackAnalysis {
    pub audio: DecodedAudio,
    pub properties: TrackProperties,
    /// Non-fatal problems hit while reading tags; already logged.
    pub warnings: Vec<MetadataWarning>,
}

/// Decode `path` and build its property table.
///
/// Only decoding can fail; tag problems end up in `warnings` and the table
/// simply lacks the affected rows.
pub fn analyze_file(path: &Path) -> Result<TrackAnalysis, DecodeError> {
    let audio = decode_file(path)?;
    Ok(analyze_decoded(path, audio))
}

/// Build the property table for audio already decoded from `path`.
pub fn analyze_decoded(path: &Path, audio: DecodedAudio) -> TrackAnalysis {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut properties = base_properties(&file_name, &audio);
    let mut warnings = Vec::new();

    if let Err(warning) = append_tag_properties(path, &mut properties) {
        log::warn!("Metadata extraction error for {}: {warning}", path.display());
        warnings.push(warning);
    }

    TrackAnalysis {
        audio,
        properties,
        warnings,
    }
}

// ---------------------------------------------------------------------------
// Derived (always present) properties
// ---------------------------------------------------------------------------

/// The six rows every decodable file gets, in display order.
pub fn base_properties(file_name: &str, audio: &DecodedAudio) -> TrackProperties {
    let n_ch = audio.channel_count();
    let mut props = TrackProperties::new();
    props.insert(KEY_FILENAME, file_name);
    props.insert(KEY_DURATION, format_duration(audio.duration_secs()));
    props.insert(KEY_CHANNELS, format!("{n_ch} ({})", channel_label(n_ch)));
    props.insert(KEY_SAMPLE_RATE, format!("{} Hz", audio.sample_rate));
    props.insert(KEY_BIT_DEPTH, format!("{} bit", audio.sample_width as u32 * 8));
    props.insert(KEY_VOLUME, format!("{:.2} dB", round2(audio.dbfs())));
    props
}

/// `m:ss`, seconds truncated and zero-padded.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0);
    let minutes = (total / 60.0).floor() as u64;
    let secs = (total % 60.0).floor() as u64;
    format!("{minutes}:{secs:02}")
}

pub fn channel_label(channels: usize) -> &'static str {
    match channels {
        1 => "Mono",
        2 => "Stereo",
        _ => "Multi",
    }
}

fn round2(v: f64) -> f64 {
    if v.is_finite() {
        (v * 100.0).round() / 100.0
    } else {
        v
    }
}

// ---------------------------------------------------------------------------
// Tag-derived properties
// ---------------------------------------------------------------------------

/// Tag fields shown in the property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Artist,
    Album,
    Title,
    Year,
    Genre,
}

impl TagField {
    pub const ALL: [TagField; 5] = [
        TagField::Artist,
        TagField::Album,
        TagField::Title,
        TagField::Year,
        TagField::Genre,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TagField::Artist => "Artist",
            TagField::Album => "Album",
            TagField::Title => "Title",
            TagField::Year => "Year",
            TagField::Genre => "Genre",
        }
    }

    /// Keys tried in order: generic, then ID3v2 frame, Vorbis comment,
    /// MP4 atom, and a lowercase fallback.
    pub fn candidate_keys(self) -> Vec<ItemKey> {
        let (generic, raw) = match self {
            TagField::Artist => (vec![ItemKey::TrackArtist], ["TPE1", "ARTIST", "©ART", "artist"]),
            TagField::Album => (vec![ItemKey::AlbumTitle], ["TALB", "ALBUM", "©alb", "album"]),
            TagField::Title => (vec![ItemKey::TrackTitle], ["TIT2", "TITLE", "©nam", "title"]),
            TagField::Year => (
                vec![ItemKey::Year, ItemKey::RecordingDate],
                ["TDRC", "DATE", "©day", "year"],
            ),
            TagField::Genre => (vec![ItemKey::Genre], ["TCON", "GENRE", "©gen", "genre"]),
        };
        generic
            .into_iter()
            .chain(raw.into_iter().map(|k| ItemKey::Unknown(k.to_string())))
            .collect()
    }
}

/// First non-empty value among `keys`, trying every tag for a key before
/// moving on to the next key.
pub fn first_tag_value(tags: &[&Tag], keys: &[ItemKey]) -> Option<String> {
    keys.iter().find_map(|key| {
        tags.iter().find_map(|tag| {
            tag.get_string(key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
    })
}

/// Container MIME type for the formats lofty can identify.
pub fn mime_type(file_type: &FileType) -> Option<&'static str> {
    match file_type {
        FileType::Mpeg => Some("audio/mpeg"),
        FileType::Flac => Some("audio/flac"),
        FileType::Wav => Some("audio/wav"),
        FileType::Mp4 => Some("audio/mp4"),
        FileType::Vorbis => Some("audio/vorbis"),
        FileType::Opus => Some("audio/opus"),
        FileType::Aac => Some("audio/aac"),
        FileType::Aiff => Some("audio/aiff"),
        _ => None,
    }
}

/// `"audio/flac"` → `"FLAC"`.
pub fn format_from_mime(mime: &str) -> String {
    mime.rsplit('/').next().unwrap_or(mime).to_ascii_uppercase()
}

/// Read tags, bitrate and container format into `props`.
///
/// Fields read before a failure stay in `props`.
pub fn append_tag_properties(
    path: &Path,
    props: &mut TrackProperties,
) -> Result<(), MetadataWarning> {
    let tagged_file = Probe::open(path)
        .map_err(|e| MetadataWarning::Probe(e.to_string()))?
        .read()
        .map_err(|e| MetadataWarning::TagRead(e.to_string()))?;

    let mut tags: Vec<&Tag> = Vec::new();
    if let Some(primary) = tagged_file.primary_tag() {
        tags.push(primary);
    }
    for tag in tagged_file.tags() {
        if !tags.iter().any(|t| t.tag_type() == tag.tag_type()) {
            tags.push(tag);
        }
    }

    for field in TagField::ALL {
        if let Some(value) = first_tag_value(&tags, &field.candidate_keys()) {
            props.insert(field.label(), value);
        }
    }

    let file_props = tagged_file.properties();
    if let Some(kbps) = file_props.audio_bitrate().or(file_props.overall_bitrate()) {
        props.insert(KEY_BITRATE, format!("{kbps} kbps"));
    }

    if let Some(mime) = mime_type(&tagged_file.file_type()) {
        props.insert(KEY_FORMAT, format_from_mime(mime));
    }

    Ok(())
}
