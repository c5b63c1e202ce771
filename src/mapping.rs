use crate::notes::NoteName;

pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 400.0;

/// Pixel dimensions of the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        (x.clamp(0.0, self.width), y.clamp(0.0, self.height))
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

pub fn base_frequency() -> f64 {
    NoteName::C2.frequency()
}

pub fn max_frequency(octave_range: u32) -> f64 {
    base_frequency() * 2f64.powi(octave_range as i32)
}

/// Frequency at canvas row `y`. The top row is the highest pitch.
pub fn y_to_frequency(y: f64, octave_range: u32, height: f64) -> f64 {
    let base = base_frequency();
    let max = max_frequency(octave_range);

    max - (y / height) * (max - base)
}

pub fn frequency_to_y(frequency: f64, octave_range: u32, height: f64) -> f64 {
    let base = base_frequency();
    let max = max_frequency(octave_range);

    height * (1.0 - (frequency - base) / (max - base))
}

pub fn note_to_y(note: NoteName, octave_range: u32, height: f64) -> f64 {
    frequency_to_y(note.frequency(), octave_range, height)
}

pub fn x_to_time(x: f64, width: f64, duration: f64) -> f64 {
    (x / width) * duration
}

pub fn time_to_x(time: f64, width: f64, duration: f64) -> f64 {
    (time / duration) * width
}
