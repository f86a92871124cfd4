use std::path::PathBuf;

use eframe::egui::{self, Color32, Frame, RichText, Stroke, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::{highlight_fill, HIGHLIGHT_TEXT};
use crate::state::{TrackId, TrackSlot};
use crate::ui::drop_zone::{DropStatus, SUPPORTED_EXTENSIONS};
use crate::ui::plot;

/// What the user did inside a track panel this frame.
#[derive(Debug, Default)]
pub struct PanelResponse {
    /// Screen area of the panel, used to route dropped files.
    pub rect: Option<egui::Rect>,
    /// File picked through the "Open…" dialog.
    pub picked: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Track panel
// ---------------------------------------------------------------------------

/// Render one full track column: header, drop zone, properties, spectrum.
pub fn track_panel(ui: &mut Ui, slot: &TrackSlot) -> PanelResponse {
    let mut response = PanelResponse::default();

    let inner = Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.heading(RichText::new(slot.id.name().to_uppercase()).strong());
        });
        ui.add_space(4.0);

        drop_zone(ui, slot);

        ui.horizontal(|ui: &mut Ui| {
            // A pick while loading supersedes the running load, same as a drop.
            if ui.button("Open…").clicked() {
                response.picked = open_file_dialog(slot.id);
            }
            if slot.loading {
                ui.add(egui::Spinner::new());
                ui.label("Analysing…");
            }
        });
        ui.separator();

        let table_height = (ui.available_height() - plot::PLOT_HEIGHT - 40.0).max(120.0);
        ui.push_id(("properties", slot.id.index()), |ui: &mut Ui| {
            property_table(ui, slot, table_height);
        });
        ui.separator();

        plot::spectrum_plot(ui, slot.id, &slot.surface);
    });

    response.rect = Some(inner.response.rect);
    response
}

// ---------------------------------------------------------------------------
// Drop zone banner
// ---------------------------------------------------------------------------

fn drop_zone(ui: &mut Ui, slot: &TrackSlot) {
    let (fill, stroke) = match &slot.drop_zone.status {
        DropStatus::Idle => (Color32::from_rgb(247, 250, 252), Color32::from_rgb(74, 85, 104)),
        DropStatus::Ready => (Color32::from_rgb(235, 248, 255), Color32::from_rgb(49, 130, 206)),
        DropStatus::Success => (Color32::from_rgb(198, 246, 213), Color32::from_rgb(34, 84, 61)),
        DropStatus::Error(_) => (Color32::from_rgb(254, 215, 215), Color32::from_rgb(116, 42, 42)),
    };

    Frame::new()
        .fill(fill)
        .stroke(Stroke::new(2.0, stroke))
        .corner_radius(8.0)
        .inner_margin(15.0)
        .show(ui, |ui: &mut Ui| {
            ui.set_min_height(70.0);
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label(RichText::new(slot.drop_zone.text()).strong().color(stroke));
            });
        });
}

// ---------------------------------------------------------------------------
// Property table
// ---------------------------------------------------------------------------

fn property_table(ui: &mut Ui, slot: &TrackSlot, max_height: f32) {
    let Some(props) = slot.properties.as_ref().filter(|p| !p.is_empty()) else {
        ui.label(RichText::new("No file loaded.").weak());
        return;
    };

    TableBuilder::new(ui)
        .striped(true)
        .max_scroll_height(max_height)
        .column(Column::exact(160.0))
        .column(Column::remainder())
        .header(28.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("Property");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Value");
            });
        })
        .body(|mut body| {
            for (key, value) in props.iter() {
                body.row(22.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(key);
                    });
                    row.col(|ui: &mut Ui| match slot.highlights.get(key) {
                        Some(h) => {
                            ui.painter()
                                .rect_filled(ui.max_rect(), 2.0, highlight_fill(h.verdict));
                            ui.label(RichText::new(value).color(HIGHLIGHT_TEXT))
                                .on_hover_text(h.tooltip());
                        }
                        None => {
                            ui.label(value);
                        }
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(id: TrackId) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(format!("Open audio for {}", id.name()))
        .add_filter("Audio files", &SUPPORTED_EXTENSIONS)
        .pick_file()
}
