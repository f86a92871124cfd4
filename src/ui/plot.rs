use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{GridMark, Line, Plot, PlotBounds, PlotPoints};

use crate::audio::spectrum::{SpectrumSurface, SurfaceContent, Tick};
use crate::color::track_color;
use crate::state::TrackId;

pub const PLOT_HEIGHT: f32 = 250.0;

// ---------------------------------------------------------------------------
// Spectrum plot (bottom of each track panel)
// ---------------------------------------------------------------------------

/// Render one track's spectrum surface.
pub fn spectrum_plot(ui: &mut Ui, id: TrackId, surface: &SpectrumSurface) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(&surface.title).strong().size(14.0));
    });

    let (points, ticks, max_freq) = match &surface.content {
        SurfaceContent::Blank => {
            placeholder(ui, RichText::new("No spectrum").weak());
            return;
        }
        SurfaceContent::Error(msg) => {
            placeholder(ui, RichText::new(msg).color(Color32::RED));
            return;
        }
        SurfaceContent::Curve { points, axis, .. } => (points, &axis.ticks, axis.max_freq),
    };
    let Some(y) = surface.y_bounds() else {
        return;
    };

    let marks = grid_marks(ticks);
    let labels = ticks.to_vec();

    Plot::new(("spectrum_plot", id.index()))
        .height(PLOT_HEIGHT)
        .x_axis_label("Frequency (Hz)")
        .y_axis_label("Amplitude (dB)")
        .show_grid(true)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_grid_spacer(move |_input| marks.clone())
        .x_axis_formatter(move |mark, _range| {
            labels
                .iter()
                .find(|t| (t.value - mark.value).abs() < 0.5)
                .map(|t| t.label.clone())
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [0.0, y.min],
                [max_freq, y.max],
            ));
            let line = Line::new(PlotPoints::from(points.clone()))
                .name(&surface.title)
                .color(track_color(id))
                .width(0.8);
            plot_ui.line(line);
        });
}

/// Fixed tick positions as grid marks; `step_size` is the gap to the next tick.
fn grid_marks(ticks: &[Tick]) -> Vec<GridMark> {
    ticks
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let step_size = ticks
                .get(i + 1)
                .or_else(|| i.checked_sub(1).and_then(|p| ticks.get(p)))
                .map(|n| (n.value - t.value).abs())
                .filter(|s| *s > 0.0)
                .unwrap_or(1000.0);
            GridMark {
                value: t.value,
                step_size,
            }
        })
        .collect()
}

fn placeholder(ui: &mut Ui, text: RichText) {
    ui.allocate_ui(
        [ui.available_width(), PLOT_HEIGHT].into(),
        |ui: &mut Ui| {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label(text);
            });
        },
    );
}
