use std::path::PathBuf;
use std::thread;

use anyhow::Context as _;
use crossbeam_channel::{unbounded, Receiver, Sender};
use eframe::egui;

use crate::audio::metadata::{analyze_file, TrackAnalysis};
use crate::state::TrackId;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A decode + extract job for one track slot.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub track: TrackId,
    /// Slot-local load counter; results from older generations are stale.
    pub generation: u64,
    pub path: PathBuf,
}

/// Result of a [`LoadRequest`], handed back to the UI thread.
#[derive(Debug)]
pub struct LoadMessage {
    pub track: TrackId,
    pub generation: u64,
    pub path: PathBuf,
    /// User-facing error text on failure.
    pub outcome: Result<TrackAnalysis, String>,
}

impl LoadMessage {
    fn from_request(request: LoadRequest, outcome: Result<TrackAnalysis, String>) -> Self {
        Self {
            track: request.track,
            generation: request.generation,
            path: request.path,
            outcome,
        }
    }
}

/// Run a load job to completion on the current thread.
pub fn run_load(request: LoadRequest) -> LoadMessage {
    log::info!("Loading file {} for {}", request.path.display(), request.track.name());
    let outcome = analyze_file(&request.path)
        .with_context(|| format!("cannot load {}", request.path.display()))
        .map_err(|e| format!("{e:#}"));
    LoadMessage::from_request(request, outcome)
}

// ---------------------------------------------------------------------------
// Spawning
// ---------------------------------------------------------------------------

/// Starts load jobs off the UI thread.
pub trait LoadSpawner {
    fn spawn(&self, request: LoadRequest);
}

/// One short-lived OS thread per load; results go back over a channel.
pub struct ThreadSpawner {
    tx: Sender<LoadMessage>,
    repaint: Option<egui::Context>,
}

impl ThreadSpawner {
    /// Create the spawner and the receiving end polled by the UI.
    /// `repaint` is woken whenever a result is sent.
    pub fn new(repaint: Option<egui::Context>) -> (Self, Receiver<LoadMessage>) {
        let (tx, rx) = unbounded();
        (Self { tx, repaint }, rx)
    }
}

impl LoadSpawner for ThreadSpawner {
    fn spawn(&self, request: LoadRequest) {
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        let fallback = request.clone();

        let spawned = thread::Builder::new()
            .name(format!("load-{}", request.track.name()))
            .spawn(move || {
                let message = run_load(request);
                if tx.send(message).is_err() {
                    log::debug!("UI gone before load finished");
                }
                if let Some(ctx) = repaint {
                    ctx.request_repaint();
                }
            });

        if let Err(e) = spawned {
            log::error!("Failed to start load thread: {e}");
            let message =
                LoadMessage::from_request(fallback, Err(format!("cannot start loader: {e}")));
            // The receiver lives as long as the app, which owns this spawner.
            let _ = self.tx.send(message);
        }
    }
}
