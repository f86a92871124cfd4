use std::path::Path;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Extensions accepted at the drop boundary (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["mp3", "flac", "wav", "m4a", "ogg", "aac"];

/// How long the success banner stays up after the load finishes.
pub const SUCCESS_RESET: Duration = Duration::from_secs(2);

/// How long an error banner stays up.
pub const ERROR_RESET: Duration = Duration::from_secs(3);

// ---------------------------------------------------------------------------
// Drop boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DropRejected {
    #[error("Invalid file type!")]
    UnsupportedExtension(String),

    #[error("Dropped item is not a local file")]
    NoPath,
}

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Gate applied before anything is decoded.
pub fn accept_path(path: &Path) -> Result<&Path, DropRejected> {
    if is_audio_file(path) {
        Ok(path)
    } else {
        Err(DropRejected::UnsupportedExtension(path.display().to_string()))
    }
}

// ---------------------------------------------------------------------------
// Drop zone status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum DropStatus {
    Idle,
    /// Files are being dragged over this zone.
    Ready,
    Success,
    Error(String),
}

/// Banner state of one track's drop target, with timed reset to idle.
#[derive(Debug, Clone)]
pub struct DropZone {
    zone_name: String,
    pub status: DropStatus,
    reset_at: Option<Instant>,
}

impl DropZone {
    pub fn new(zone_name: impl Into<String>) -> Self {
        Self {
            zone_name: zone_name.into(),
            status: DropStatus::Idle,
            reset_at: None,
        }
    }

    pub fn text(&self) -> String {
        match &self.status {
            DropStatus::Idle => format!(
                "DROP {} HERE\n\nAudio Files: {}",
                self.zone_name,
                SUPPORTED_EXTENSIONS.map(str::to_ascii_uppercase).join(", ")
            ),
            DropStatus::Ready => format!("READY - Drop {} Now!", self.zone_name),
            DropStatus::Success => format!("SUCCESS - {} Loaded!", self.zone_name),
            DropStatus::Error(msg) => format!("ERROR - {msg}"),
        }
    }

    pub fn hover_enter(&mut self) {
        self.status = DropStatus::Ready;
        self.reset_at = None;
    }

    pub fn hover_leave(&mut self) {
        if self.status == DropStatus::Ready {
            self.reset();
        }
    }

    /// Shown as soon as an accepted file is dropped; stays until
    /// [`DropZone::schedule_reset`].
    pub fn show_success(&mut self) {
        self.status = DropStatus::Success;
        self.reset_at = None;
    }

    pub fn show_error(&mut self, message: impl Into<String>, now: Instant) {
        self.status = DropStatus::Error(message.into());
        self.reset_at = Some(now + ERROR_RESET);
    }

    pub fn schedule_reset(&mut self, now: Instant, after: Duration) {
        self.reset_at = Some(now + after);
    }

    pub fn reset(&mut self) {
        self.status = DropStatus::Idle;
        self.reset_at = None;
    }

    /// Apply a due reset. Returns `true` while a reset is still pending.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.reset_at {
            Some(at) if now >= at => {
                self.reset();
                false
            }
            Some(_) => true,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_audio_file(Path::new("/music/a.MP3")));
        assert!(is_audio_file(Path::new("b.Flac")));
        assert!(is_audio_file(Path::new("c.m4a")));
        assert!(!is_audio_file(Path::new("notes.txt")));
        assert!(!is_audio_file(Path::new("no_extension")));
        assert!(!is_audio_file(Path::new("archive.wav.zip")));
    }

    #[test]
    fn accept_path_rejects_unsupported() {
        let path = PathBuf::from("cover.png");
        assert_eq!(
            accept_path(&path),
            Err(DropRejected::UnsupportedExtension("cover.png".into()))
        );
        assert_eq!(accept_path(Path::new("x.ogg")), Ok(Path::new("x.ogg")));
    }

    #[test]
    fn idle_text_lists_formats() {
        let zone = DropZone::new("Track A");
        assert_eq!(
            zone.text(),
            "DROP Track A HERE\n\nAudio Files: MP3, FLAC, WAV, M4A, OGG, AAC"
        );
    }

    #[test]
    fn hover_leave_only_clears_ready() {
        let mut zone = DropZone::new("Track B");
        zone.hover_enter();
        assert_eq!(zone.text(), "READY - Drop Track B Now!");
        zone.hover_leave();
        assert_eq!(zone.status, DropStatus::Idle);

        zone.show_success();
        zone.hover_leave();
        assert_eq!(zone.status, DropStatus::Success);
    }

    #[test]
    fn error_resets_after_delay() {
        let t0 = Instant::now();
        let mut zone = DropZone::new("Track A");
        zone.show_error("Invalid file type!", t0);
        assert_eq!(zone.text(), "ERROR - Invalid file type!");

        assert!(zone.tick(t0 + Duration::from_secs(1)));
        assert!(matches!(zone.status, DropStatus::Error(_)));

        assert!(!zone.tick(t0 + ERROR_RESET));
        assert_eq!(zone.status, DropStatus::Idle);
    }

    #[test]
    fn success_waits_for_scheduled_reset() {
        let t0 = Instant::now();
        let mut zone = DropZone::new("Track A");
        zone.show_success();
        assert!(!zone.tick(t0 + Duration::from_secs(60)));
        assert_eq!(zone.status, DropStatus::Success);

        zone.schedule_reset(t0, SUCCESS_RESET);
        zone.tick(t0 + SUCCESS_RESET);
        assert_eq!(zone.status, DropStatus::Idle);
    }
}
