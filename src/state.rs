use std::path::Path;
use std::time::Instant;

use crate::audio::compare::{compare, Highlights};
use crate::audio::model::{SpectrumData, TrackProperties};
use crate::audio::spectrum::{plot_spectrum, SpectrumSurface};
use crate::ui::drop_zone::{accept_path, DropRejected, DropZone, SUCCESS_RESET};
use crate::worker::{LoadMessage, LoadRequest, LoadSpawner};

// ---------------------------------------------------------------------------
// Track identity
// ---------------------------------------------------------------------------

/// One of the two side-by-side slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackId {
    A,
    B,
}

impl TrackId {
    pub const ALL: [TrackId; 2] = [TrackId::A, TrackId::B];

    /// The companion slot.
    pub fn other(self) -> TrackId {
        match self {
            TrackId::A => TrackId::B,
            TrackId::B => TrackId::A,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TrackId::A => "Track A",
            TrackId::B => "Track B",
        }
    }

    pub fn index(self) -> usize {
        match self {
            TrackId::A => 0,
            TrackId::B => 1,
        }
    }

    pub fn spectrum_title(self) -> String {
        format!("{} Spectrum", self.name())
    }
}

// ---------------------------------------------------------------------------
// Per-slot state
// ---------------------------------------------------------------------------

/// Everything shown in one track panel.
pub struct TrackSlot {
    pub id: TrackId,
    pub drop_zone: DropZone,
    /// A load is in flight.
    pub loading: bool,
    generation: u64,
    pub properties: Option<TrackProperties>,
    /// Better/worse marks against the companion slot.
    pub highlights: Highlights,
    pub spectrum: Option<SpectrumData>,
    pub surface: SpectrumSurface,
}

impl TrackSlot {
    fn new(id: TrackId) -> Self {
        Self {
            id,
            drop_zone: DropZone::new(id.name()),
            loading: false,
            generation: 0,
            properties: None,
            highlights: Highlights::new(),
            spectrum: None,
            surface: SpectrumSurface::new(id.spectrum_title()),
        }
    }

    fn clear_results(&mut self) {
        self.properties = None;
        self.highlights.clear();
        self.spectrum = None;
        self.surface.clear();
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Owns both slots; a slot reaches its companion only through here.
pub struct AppState {
    slots: [TrackSlot; 2],
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            slots: [TrackSlot::new(TrackId::A), TrackSlot::new(TrackId::B)],
        }
    }
}

impl AppState {
    pub fn slot(&self, id: TrackId) -> &TrackSlot {
        &self.slots[id.index()]
    }

    pub fn slot_mut(&mut self, id: TrackId) -> &mut TrackSlot {
        &mut self.slots[id.index()]
    }

    pub fn peer(&self, id: TrackId) -> &TrackSlot {
        self.slot(id.other())
    }

    /// Start loading `path` into `id`.
    ///
    /// Unsupported files are rejected here and never reach the spawner.
    /// Any load already in flight for the slot is superseded.
    pub fn request_load(
        &mut self,
        id: TrackId,
        path: &Path,
        spawner: &dyn LoadSpawner,
        now: Instant,
    ) -> Result<(), DropRejected> {
        let slot = self.slot_mut(id);
        if let Err(rejected) = accept_path(path) {
            log::warn!("{}: rejected {}", id.name(), path.display());
            slot.drop_zone.show_error(rejected.to_string(), now);
            return Err(rejected);
        }

        slot.generation += 1;
        slot.loading = true;
        slot.clear_results();
        slot.drop_zone.show_success();

        spawner.spawn(LoadRequest {
            track: id,
            generation: slot.generation,
            path: path.to_path_buf(),
        });

        // The cleared slot no longer contributes to the companion's view.
        self.refresh_comparisons();
        self.refresh_shared_scale();
        Ok(())
    }

    /// Apply a finished load on the UI thread, then update both panels.
    pub fn apply_load(&mut self, message: LoadMessage, now: Instant) {
        let id = message.track;
        let slot = self.slot_mut(id);
        if message.generation != slot.generation {
            log::debug!(
                "{}: dropping stale result for {} (generation {} < {})",
                id.name(),
                message.path.display(),
                message.generation,
                slot.generation
            );
            return;
        }
        slot.loading = false;

        match message.outcome {
            Ok(analysis) => {
                log::info!(
                    "{}: loaded {} ({} properties, {} warnings)",
                    id.name(),
                    message.path.display(),
                    analysis.properties.len(),
                    analysis.warnings.len()
                );
                let title = id.spectrum_title();
                slot.spectrum = plot_spectrum(&analysis.audio, &mut slot.surface, &title, None);
                slot.properties = Some(analysis.properties);
                slot.drop_zone.schedule_reset(now, SUCCESS_RESET);

                self.refresh_comparisons();
                self.refresh_shared_scale();
            }
            Err(msg) => {
                log::error!("Error loading {}: {msg}", message.path.display());
                slot.drop_zone.show_error(format!("Error: {msg}"), now);
            }
        }
    }

    /// Recompute better/worse marks for both slots against each other.
    pub fn refresh_comparisons(&mut self) {
        for id in TrackId::ALL {
            let highlights = match (&self.slot(id).properties, &self.peer(id).properties) {
                (Some(own), Some(other)) => compare(own, other),
                _ => Highlights::new(),
            };
            self.slot_mut(id).highlights = highlights;
        }
    }

    /// Put both spectra on one vertical scale when both exist, otherwise
    /// let each autoscale.
    pub fn refresh_shared_scale(&mut self) {
        let shared = match (&self.slots[0].spectrum, &self.slots[1].spectrum) {
            (Some(a), Some(b)) => Some(a.range().union(b.range())),
            _ => None,
        };
        if let Some(range) = shared {
            log::debug!("shared spectrum scale {range}");
        }
        for slot in &mut self.slots {
            slot.surface.set_shared_scale(shared);
        }
    }

    /// Advance drop-zone timers. Returns `true` while any timer is pending.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.slots
            .iter_mut()
            .fold(false, |pending, slot| slot.drop_zone.tick(now) | pending)
    }

    pub fn any_loading(&self) -> bool {
        self.slots.iter().any(|s| s.loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::compare::Verdict;
    use crate::audio::metadata::{base_properties, TrackAnalysis};
    use crate::audio::model::{DbRange, DecodedAudio};
    use crate::audio::spectrum::{SurfaceContent, SHARED_SCALE_PAD};
    use crate::ui::drop_zone::DropStatus;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingSpawner {
        requests: RefCell<Vec<LoadRequest>>,
    }

    impl LoadSpawner for RecordingSpawner {
        fn spawn(&self, request: LoadRequest) {
            self.requests.borrow_mut().push(request);
        }
    }

    fn tone(sample_rate: u32, amplitude: f32) -> DecodedAudio {
        let samples = (0..4096)
            .map(|i| {
                amplitude
                    * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate as f32).sin()
            })
            .collect();
        DecodedAudio {
            channels: vec![samples],
            sample_rate,
            sample_width: 2,
        }
    }

    fn loaded(request: &LoadRequest, audio: DecodedAudio, bitrate: &str) -> LoadMessage {
        let mut properties = base_properties("x.mp3", &audio);
        properties.insert("Bitrate", bitrate);
        LoadMessage {
            track: request.track,
            generation: request.generation,
            path: request.path.clone(),
            outcome: Ok(TrackAnalysis {
                audio,
                properties,
                warnings: Vec::new(),
            }),
        }
    }

    #[test]
    fn peer_lookup_goes_through_state() {
        let state = AppState::default();
        assert_eq!(state.peer(TrackId::A).id, TrackId::B);
        assert_eq!(state.peer(TrackId::B).id, TrackId::A);
    }

    #[test]
    fn unsupported_extension_never_reaches_the_decoder() {
        let mut state = AppState::default();
        let spawner = RecordingSpawner::default();

        let result = state.request_load(
            TrackId::A,
            Path::new("/tmp/readme.txt"),
            &spawner,
            Instant::now(),
        );

        assert!(result.is_err());
        assert!(spawner.requests.borrow().is_empty());
        assert!(!state.slot(TrackId::A).loading);
        assert_eq!(
            state.slot(TrackId::A).drop_zone.status,
            DropStatus::Error("Invalid file type!".into())
        );
    }

    #[test]
    fn accepted_drop_spawns_one_request_and_clears_the_slot() {
        let mut state = AppState::default();
        let spawner = RecordingSpawner::default();

        state
            .request_load(TrackId::B, Path::new("/m/song.FLAC"), &spawner, Instant::now())
            .unwrap();

        let requests = spawner.requests.borrow();
        assert_eq!(
            *requests,
            vec![LoadRequest {
                track: TrackId::B,
                generation: 1,
                path: PathBuf::from("/m/song.FLAC"),
            }]
        );
        let slot = state.slot(TrackId::B);
        assert!(slot.loading);
        assert!(slot.properties.is_none());
        assert_eq!(slot.surface.content, SurfaceContent::Blank);
        assert_eq!(slot.drop_zone.status, DropStatus::Success);
    }

    #[test]
    fn load_while_loading_is_dispatched_not_refused() {
        let mut state = AppState::default();
        let spawner = RecordingSpawner::default();
        let now = Instant::now();

        state.request_load(TrackId::B, Path::new("first.flac"), &spawner, now).unwrap();
        assert!(state.slot(TrackId::B).loading);
        state.request_load(TrackId::B, Path::new("second.flac"), &spawner, now).unwrap();

        let reqs = spawner.requests.borrow();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[1].path, PathBuf::from("second.flac"));
        assert!(reqs[1].generation > reqs[0].generation);
        assert!(state.slot(TrackId::B).loading);
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut state = AppState::default();
        let spawner = RecordingSpawner::default();
        let now = Instant::now();

        state.request_load(TrackId::A, Path::new("old.wav"), &spawner, now).unwrap();
        state.request_load(TrackId::A, Path::new("new.wav"), &spawner, now).unwrap();
        let (old, new) = {
            let reqs = spawner.requests.borrow();
            (reqs[0].clone(), reqs[1].clone())
        };

        state.apply_load(loaded(&old, tone(44_100, 0.5), "128 kbps"), now);
        assert!(state.slot(TrackId::A).loading);
        assert!(state.slot(TrackId::A).properties.is_none());

        state.apply_load(loaded(&new, tone(48_000, 0.5), "320 kbps"), now);
        let slot = state.slot(TrackId::A);
        assert!(!slot.loading);
        assert_eq!(
            slot.properties.as_ref().and_then(|p| p.get("Sample Rate")),
            Some("48000 Hz")
        );
    }

    #[test]
    fn loading_both_tracks_highlights_and_shares_scale() {
        let mut state = AppState::default();
        let spawner = RecordingSpawner::default();
        let now = Instant::now();

        state.request_load(TrackId::A, Path::new("a.mp3"), &spawner, now).unwrap();
        let req_a = spawner.requests.borrow()[0].clone();
        state.apply_load(loaded(&req_a, tone(44_100, 0.9), "128 kbps"), now);

        // One track alone: nothing to compare, own autoscale.
        assert!(state.slot(TrackId::A).highlights.is_empty());
        let own_a = state.slot(TrackId::A).spectrum.as_ref().unwrap().range();
        assert_eq!(state.slot(TrackId::A).surface.y_bounds(), Some(own_a));

        state.request_load(TrackId::B, Path::new("b.mp3"), &spawner, now).unwrap();
        let req_b = spawner.requests.borrow()[1].clone();
        state.apply_load(loaded(&req_b, tone(48_000, 0.1), "320 kbps"), now);

        let a = state.slot(TrackId::A);
        let b = state.slot(TrackId::B);
        assert_eq!(a.highlights["Bitrate"].verdict, Verdict::Unfavorable);
        assert_eq!(b.highlights["Bitrate"].verdict, Verdict::Favorable);
        assert_eq!(a.highlights["Sample Rate"].verdict, Verdict::Unfavorable);
        assert_eq!(a.highlights["Volume (dBFS)"].verdict, Verdict::Favorable);
        assert_eq!(b.highlights["Volume (dBFS)"].verdict, Verdict::Unfavorable);

        let shared: DbRange = a
            .spectrum
            .as_ref()
            .unwrap()
            .range()
            .union(b.spectrum.as_ref().unwrap().range())
            .padded(SHARED_SCALE_PAD);
        assert_eq!(a.surface.y_bounds(), Some(shared));
        assert_eq!(b.surface.y_bounds(), Some(shared));
    }

    #[test]
    fn reloading_one_track_clears_companion_highlights() {
        let mut state = AppState::default();
        let spawner = RecordingSpawner::default();
        let now = Instant::now();

        for id in TrackId::ALL {
            state.request_load(id, Path::new("t.wav"), &spawner, now).unwrap();
        }
        let reqs = spawner.requests.borrow().clone();
        state.apply_load(loaded(&reqs[0], tone(44_100, 0.5), "128 kbps"), now);
        state.apply_load(loaded(&reqs[1], tone(44_100, 0.5), "256 kbps"), now);
        assert!(!state.slot(TrackId::B).highlights.is_empty());

        state.request_load(TrackId::A, Path::new("t2.wav"), &spawner, now).unwrap();
        assert!(state.slot(TrackId::B).highlights.is_empty());
        let own_b = state.slot(TrackId::B).spectrum.as_ref().unwrap().range();
        assert_eq!(state.slot(TrackId::B).surface.y_bounds(), Some(own_b));
    }

    #[test]
    fn failed_load_shows_error_and_keeps_slot_empty() {
        let mut state = AppState::default();
        let spawner = RecordingSpawner::default();
        let now = Instant::now();

        state.request_load(TrackId::B, Path::new("bad.aac"), &spawner, now).unwrap();
        let req = spawner.requests.borrow()[0].clone();
        state.apply_load(
            LoadMessage {
                track: req.track,
                generation: req.generation,
                path: req.path,
                outcome: Err("unsupported or unrecognised format".into()),
            },
            now,
        );

        let slot = state.slot(TrackId::B);
        assert!(!slot.loading);
        assert!(slot.properties.is_none());
        assert_eq!(
            slot.drop_zone.status,
            DropStatus::Error("Error: unsupported or unrecognised format".into())
        );
        assert!(state.tick(now));
        assert!(!state.tick(now + crate::ui::drop_zone::ERROR_RESET));
        assert_eq!(state.slot(TrackId::B).drop_zone.status, DropStatus::Idle);
    }
}
