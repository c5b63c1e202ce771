use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::{
    mapping::{y_to_frequency, CanvasSize},
    notes::closest_note,
    project::{Point, TrackId},
    settings::{Settings, VISIBLE_MEASURES},
    sketchpad::Sketchpad,
};

const CONTROL_RADIUS: f64 = 5.0;
const LABEL_EVERY: usize = 5;
const EDITED_COLOR: &str = "#ff4444";
const STROKE_COLOR: &str = "#4a90e2";
const PREVIEW_COLOR: &str = "rgba(74, 144, 226, 0.5)";

/// A 2D pixel surface the editor draws on.
pub trait Surface {
    fn clear(&mut self, canvas: CanvasSize);
    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: f64);
    fn stroke_path(&mut self, points: &[Point], color: &str, width: f64);
    fn fill_circle(&mut self, center: (f64, f64), radius: f64, fill: &str, outline: &str);
    fn text(&mut self, text: &str, at: (f64, f64), color: &str, font: &str);
}

pub fn track_color(id: TrackId, track_count: usize) -> String {
    let hue = id as f64 * 360.0 / track_count.max(1) as f64;
    format!("hsl({}, 70%, 50%)", hue)
}

pub fn draw_grid(surface: &mut impl Surface, settings: &Settings, canvas: CanvasSize) {
    let octaves = settings.curve.octave_range;
    let octave_height = canvas.height / octaves as f64;

    for i in 0..=octaves {
        let y = i as f64 * octave_height;
        surface.line((0.0, y), (canvas.width, y), "#f0f0f0", 1.0);
        surface.text(&format!("C{}", 2 + octaves - i), (5.0, y - 5.0), "#999", "12px Arial");
    }

    let time_signature = settings.music.time_signature();
    let measure_width = canvas.width / VISIBLE_MEASURES as f64;
    let beat_width = measure_width / time_signature.numerator as f64;

    for i in 0..=VISIBLE_MEASURES {
        let x = i as f64 * measure_width;
        let width = if i == 0 { 2.0 } else { 1.0 };
        surface.line((x, 0.0), (x, canvas.height), "#666", width);

        if i < VISIBLE_MEASURES {
            let position = (x + 5.0, canvas.height - 5.0);
            surface.text(&(i + 1).to_string(), position, "#999", "12px Arial");
        }
    }

    for measure in 0..VISIBLE_MEASURES {
        for beat in 1..time_signature.numerator {
            let x = measure as f64 * measure_width + beat as f64 * beat_width;
            surface.line((x, 0.0), (x, canvas.height), "#ddd", 0.5);
        }
    }

    let per_beat = (settings.music.grid_divisions() / 4).max(1);
    let subdivision_width = beat_width / per_beat as f64;
    let subdivisions = VISIBLE_MEASURES * time_signature.numerator * per_beat;

    for i in (1..subdivisions).filter(|i| i % per_beat != 0) {
        let x = i as f64 * subdivision_width;
        surface.line((x, 0.0), (x, canvas.height), "#f5f5f5", 0.5);
    }
}

/// Draws a polyline and, with `controls`, its control points and a note
/// label on every fifth point plus both ends.
pub fn draw_curve(
    surface: &mut impl Surface,
    points: &[Point],
    color: &str,
    controls: bool,
    settings: &Settings,
    canvas: CanvasSize,
) {
    if points.len() < 2 {
        return;
    }

    surface.stroke_path(points, color, 2.0);

    if !controls {
        return;
    }

    let last = points.len() - 1;

    for (index, point) in points.iter().enumerate() {
        surface.fill_circle((point.x, point.y), CONTROL_RADIUS, color, "white");

        if index % LABEL_EVERY == 0 || index == last {
            let frequency = y_to_frequency(point.y, settings.curve.octave_range, canvas.height);
            surface.text(
                &closest_note(frequency).to_string(),
                (point.x + 7.0, point.y - 7.0),
                "#666",
                "10px Arial",
            );
        }
    }
}

impl Sketchpad {
    /// Redraws the whole canvas: grid, every curve, the stroke in progress
    /// and the shape preview.
    pub fn render(&self, surface: &mut impl Surface) {
        let settings = self.settings();
        let canvas = self.canvas();
        let tracks = self.project().tracks();

        surface.clear(canvas);
        draw_grid(surface, settings, canvas);

        for track in tracks {
            for (index, curve) in track.curves.iter().enumerate() {
                let edited = self.editing().map_or(false, |session| {
                    session.track_id == track.id && session.curve_index == index
                });

                let color = if edited {
                    EDITED_COLOR.to_string()
                } else {
                    track_color(track.id, tracks.len())
                };

                draw_curve(surface, &curve.points, &color, true, settings, canvas);
            }
        }

        if let Some(stroke) = self.stroke() {
            draw_curve(surface, stroke, STROKE_COLOR, false, settings, canvas);
        }

        if let Some(preview) = self.editing().and_then(|session| session.preview.as_ref()) {
            draw_curve(surface, preview, PREVIEW_COLOR, true, settings, canvas);
        }
    }
}

impl Surface for CanvasRenderingContext2d {
    fn clear(&mut self, canvas: CanvasSize) {
        self.clear_rect(0.0, 0.0, canvas.width, canvas.height);
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: f64) {
        self.begin_path();
        self.set_stroke_style(&JsValue::from_str(color));
        self.set_line_width(width);
        self.move_to(from.0, from.1);
        self.line_to(to.0, to.1);
        self.stroke();
    }

    fn stroke_path(&mut self, points: &[Point], color: &str, width: f64) {
        let (first, rest) = match points.split_first() {
            Some(split) => split,
            None => return,
        };

        self.begin_path();
        self.set_line_cap("round");
        self.set_line_join("round");
        self.set_stroke_style(&JsValue::from_str(color));
        self.set_line_width(width);
        self.move_to(first.x, first.y);

        for point in rest {
            self.line_to(point.x, point.y);
        }

        self.stroke();
    }

    fn fill_circle(&mut self, center: (f64, f64), radius: f64, fill: &str, outline: &str) {
        self.begin_path();
        self.set_fill_style(&JsValue::from_str(fill));
        self.arc(center.0, center.1, radius, 0.0, PI * 2.0).ok();
        self.fill();

        self.begin_path();
        self.set_stroke_style(&JsValue::from_str(outline));
        self.set_line_width(1.0);
        self.arc(center.0, center.1, radius, 0.0, PI * 2.0).ok();
        self.stroke();
    }

    fn text(&mut self, text: &str, at: (f64, f64), color: &str, font: &str) {
        self.set_fill_style(&JsValue::from_str(color));
        self.set_font(font);
        self.fill_text(text, at.0, at.1).ok();
    }
}
