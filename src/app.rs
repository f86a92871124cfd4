use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use eframe::egui::{self, Pos2, Rect, Ui};

use crate::state::{AppState, TrackId};
use crate::ui::drop_zone::DropRejected;
use crate::ui::panels;
use crate::worker::{LoadMessage, ThreadSpawner};

/// Repaint cadence while a drop-zone banner is waiting to reset.
const TIMER_REPAINT: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Drop routing
// ---------------------------------------------------------------------------

/// Pick the slot a drop at `pos` belongs to.
///
/// Falls back to the first empty slot (then Track A) when the pointer
/// position is unknown or outside both panels.
pub fn route_drop(pos: Option<Pos2>, rects: &[Option<Rect>; 2], loaded: [bool; 2]) -> TrackId {
    if let Some(pos) = pos {
        for id in TrackId::ALL {
            if rects[id.index()].is_some_and(|r| r.contains(pos)) {
                return id;
            }
        }
    }
    TrackId::ALL
        .into_iter()
        .find(|id| !loaded[id.index()])
        .unwrap_or(TrackId::A)
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AudioCompareApp {
    pub state: AppState,
    spawner: ThreadSpawner,
    results: Receiver<LoadMessage>,
    /// Panel areas from the previous frame.
    panel_rects: [Option<Rect>; 2],
}

impl AudioCompareApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        let (spawner, results) = ThreadSpawner::new(Some(cc.egui_ctx.clone()));
        Self {
            state: AppState::default(),
            spawner,
            results,
            panel_rects: [None, None],
        }
    }

    fn load(&mut self, id: TrackId, path: Option<PathBuf>, now: Instant) {
        let result = match path {
            Some(path) => self.state.request_load(id, &path, &self.spawner, now),
            None => {
                self.state
                    .slot_mut(id)
                    .drop_zone
                    .show_error(DropRejected::NoPath.to_string(), now);
                Err(DropRejected::NoPath)
            }
        };
        if let Err(e) = result {
            log::info!("{}: drop rejected: {e}", id.name());
        }
    }

    fn handle_file_drag(&mut self, ctx: &egui::Context, now: Instant) {
        let (hovering, dropped, pos) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.clone(),
                i.pointer.latest_pos(),
            )
        });

        let loaded = TrackId::ALL.map(|id| self.state.slot(id).properties.is_some());

        if hovering {
            let target = route_drop(pos, &self.panel_rects, loaded);
            for id in TrackId::ALL {
                let zone = &mut self.state.slot_mut(id).drop_zone;
                if id == target {
                    zone.hover_enter();
                } else {
                    zone.hover_leave();
                }
            }
        } else {
            for id in TrackId::ALL {
                self.state.slot_mut(id).drop_zone.hover_leave();
            }
        }

        // Only the first file of a multi-file drop is used.
        if let Some(file) = dropped.into_iter().next() {
            let target = route_drop(pos, &self.panel_rects, loaded);
            log::debug!("drop routed to {}: {:?}", target.name(), file.path);
            self.load(target, file.path, now);
        }
    }
}

impl eframe::App for AudioCompareApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // ---- Results from background loads ----
        while let Ok(message) = self.results.try_recv() {
            self.state.apply_load(message, now);
        }

        self.handle_file_drag(ctx, now);

        if self.state.tick(now) {
            ctx.request_repaint_after(TIMER_REPAINT);
        }

        // ---- Central panel: two track columns ----
        let mut picks: Vec<(TrackId, PathBuf)> = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui: &mut Ui| {
            ui.columns(2, |columns: &mut [Ui]| {
                for id in TrackId::ALL {
                    let response = panels::track_panel(&mut columns[id.index()], self.state.slot(id));
                    self.panel_rects[id.index()] = response.rect;
                    if let Some(path) = response.picked {
                        picks.push((id, path));
                    }
                }
            });
        });

        for (id, path) in picks {
            self.load(id, Some(path), now);
        }

        if self.state.any_loading() {
            ctx.request_repaint_after(TIMER_REPAINT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    fn rects() -> [Option<Rect>; 2] {
        [
            Some(Rect::from_min_max(pos2(0.0, 0.0), pos2(600.0, 850.0))),
            Some(Rect::from_min_max(pos2(600.0, 0.0), pos2(1200.0, 850.0))),
        ]
    }

    #[test]
    fn drop_goes_to_panel_under_pointer() {
        assert_eq!(route_drop(Some(pos2(100.0, 400.0)), &rects(), [true, true]), TrackId::A);
        assert_eq!(route_drop(Some(pos2(900.0, 400.0)), &rects(), [false, false]), TrackId::B);
    }

    #[test]
    fn unknown_position_fills_first_empty_slot() {
        assert_eq!(route_drop(None, &rects(), [false, false]), TrackId::A);
        assert_eq!(route_drop(None, &rects(), [true, false]), TrackId::B);
        assert_eq!(route_drop(None, &rects(), [true, true]), TrackId::A);
        assert_eq!(route_drop(Some(pos2(5000.0, 5.0)), &[None, None], [true, false]), TrackId::B);
    }
}
