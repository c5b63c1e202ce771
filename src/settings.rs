use crate::notes::{NoteName, HIGHEST};

/// Number of measures visible across the canvas.
pub const VISIBLE_MEASURES: u32 = 4;

/// Upper bound for any point count taken from user input.
pub const MAX_DENSITY: usize = 1000;

/// Octaves the note table holds above the C2 anchor.
pub const MAX_OCTAVE_RANGE: u32 = ((HIGHEST - NoteName::C2.midi()) / 12) as u32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveSettings {
    /// Seconds spanned by the full canvas width.
    pub duration: f64,
    /// Target sample count when a curve is converted or played.
    pub density: usize,
    /// Octaves spanned by the canvas height.
    pub octave_range: u32,
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self {
            duration: 3.0,
            density: 10,
            octave_range: 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MusicSettings {
    bpm: u32,
    time_signature: TimeSignature,
    quantize_unit: u32,
    grid_divisions: u32,
    measure_duration: f64,
}

impl MusicSettings {
    pub fn new(bpm: u32, time_signature: TimeSignature, quantize_unit: u32) -> Self {
        let bpm = bpm.max(1);
        let time_signature = TimeSignature {
            numerator: time_signature.numerator.max(1),
            denominator: time_signature.denominator.max(1),
        };

        Self {
            bpm,
            time_signature,
            quantize_unit: quantize_unit.max(1),
            grid_divisions: 16,
            measure_duration: measure_duration(bpm, time_signature),
        }
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    /// Subdivisions of a whole note used by the quantizer (4 = quarter notes).
    pub fn quantize_unit(&self) -> u32 {
        self.quantize_unit
    }

    pub fn grid_divisions(&self) -> u32 {
        self.grid_divisions
    }

    pub fn measure_duration(&self) -> f64 {
        self.measure_duration
    }

    pub fn beat_duration(&self) -> f64 {
        60.0 / self.bpm as f64
    }

    pub fn quantize_step(&self) -> f64 {
        self.beat_duration() * (4.0 / self.quantize_unit as f64)
    }

    /// A sixteenth note, the shortest duration a converted note may have.
    pub fn min_note_duration(&self) -> f64 {
        60.0 / (self.bpm as f64 * 4.0)
    }

    pub fn with_bpm(self, bpm: u32) -> Self {
        Self::new(bpm, self.time_signature, self.quantize_unit)
    }

    pub fn with_time_signature(self, time_signature: TimeSignature) -> Self {
        Self::new(self.bpm, time_signature, self.quantize_unit)
    }

    pub fn with_quantize_unit(self, quantize_unit: u32) -> Self {
        Self::new(self.bpm, self.time_signature, quantize_unit)
    }
}

impl Default for MusicSettings {
    fn default() -> Self {
        Self::new(120, TimeSignature::default(), 4)
    }
}

fn measure_duration(bpm: u32, time_signature: TimeSignature) -> f64 {
    (240.0 / bpm as f64) * (time_signature.numerator as f64 / time_signature.denominator as f64)
}

/// Process-wide configuration. Never mutated in place: every change goes
/// through one of the `with_*` constructors.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Settings {
    pub curve: CurveSettings,
    pub music: MusicSettings,
}

impl Settings {
    pub fn with_duration(self, duration: f64) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            self.curve.duration
        };

        Self {
            curve: CurveSettings {
                duration,
                ..self.curve
            },
            ..self
        }
    }

    pub fn with_density(self, density: usize) -> Self {
        Self {
            curve: CurveSettings {
                density: density.clamp(1, MAX_DENSITY),
                ..self.curve
            },
            ..self
        }
    }

    pub fn with_octave_range(self, octave_range: u32) -> Self {
        Self {
            curve: CurveSettings {
                octave_range: octave_range.clamp(1, MAX_OCTAVE_RANGE),
                ..self.curve
            },
            ..self
        }
    }

    /// Replaces the music settings. The canvas is resized to show
    /// [`VISIBLE_MEASURES`] measures of the new meter.
    pub fn with_music(self, music: MusicSettings) -> Self {
        Self {
            curve: CurveSettings {
                duration: music.measure_duration() * VISIBLE_MEASURES as f64,
                ..self.curve
            },
            music,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn test_measure_duration_is_derived() {
        let music = MusicSettings::default();
        assert!(approx_eq!(f64, music.measure_duration(), 2.0, epsilon = 1e-12));

        let music = music.with_bpm(60);
        assert!(approx_eq!(f64, music.measure_duration(), 4.0, epsilon = 1e-12));

        let music = music.with_time_signature(TimeSignature {
            numerator: 6,
            denominator: 8,
        });
        assert!(approx_eq!(f64, music.measure_duration(), 3.0, epsilon = 1e-12));
    }

    #[test]
    fn test_quantize_step() {
        let music = MusicSettings::default();
        assert!(approx_eq!(f64, music.quantize_step(), 0.5, epsilon = 1e-12));
        assert!(approx_eq!(
            f64,
            music.with_quantize_unit(16).quantize_step(),
            0.125,
            epsilon = 1e-12
        ));
        assert!(approx_eq!(f64, music.min_note_duration(), 0.125, epsilon = 1e-12));
    }

    #[test]
    fn test_music_change_resizes_canvas_duration() {
        let settings = Settings::default();
        assert!(approx_eq!(f64, settings.curve.duration, 3.0, epsilon = 1e-12));

        let settings = settings.with_music(settings.music.with_bpm(120));
        assert!(approx_eq!(f64, settings.curve.duration, 8.0, epsilon = 1e-12));
    }

    #[test]
    fn test_degenerate_values_are_clamped() {
        let music = MusicSettings::new(0, TimeSignature { numerator: 0, denominator: 0 }, 0);
        assert_eq!(music.bpm(), 1);
        assert!(music.measure_duration().is_finite());

        let settings = Settings::default().with_duration(f64::NAN).with_density(0);
        assert!(approx_eq!(f64, settings.curve.duration, 3.0, epsilon = 1e-12));
        assert_eq!(settings.curve.density, 1);
        assert_eq!(settings.with_density(usize::MAX).curve.density, MAX_DENSITY);
    }

    #[test]
    fn test_octave_range_stays_inside_the_note_table() {
        assert_eq!(MAX_OCTAVE_RANGE, 6);

        let settings = Settings::default();
        assert_eq!(settings.with_octave_range(0).curve.octave_range, 1);
        assert_eq!(settings.with_octave_range(6).curve.octave_range, 6);
        assert_eq!(settings.with_octave_range(10).curve.octave_range, 6);
        assert_eq!(settings.with_octave_range(u32::MAX).curve.octave_range, 6);
    }
}
