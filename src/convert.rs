use std::{f64::consts::PI, fmt, str::FromStr};

use crate::{
    error::{Result, SketchError},
    mapping::{frequency_to_y, note_to_y, time_to_x, x_to_time, y_to_frequency, CanvasSize},
    notes::{closest_note, NoteName},
    project::{Curve, Note, Point, Track},
    settings::{MusicSettings, Settings, MAX_DENSITY},
};

/// Fewest points a generated shape may have: both ends of the canvas.
pub const MIN_SHAPE_DENSITY: usize = 2;

/// Picks `density` points by index stride. Curves that already have
/// `density` points or fewer are returned unchanged.
pub fn sample_points(points: &[Point], density: usize) -> Vec<Point> {
    if points.len() <= density {
        return points.to_vec();
    }

    let step = points.len() as f64 / density as f64;

    (0..density)
        .map(|i| points[(i as f64 * step).floor() as usize])
        .collect()
}

pub fn quantize_time(time: f64, music: &MusicSettings) -> f64 {
    let step = music.quantize_step();
    (time / step).round() * step
}

/// Turns a curve into quantized notes, one per sample. The result is in
/// sample order, which is only time order if the curve runs left to right.
pub fn curve_to_notes(curve: &Curve, settings: &Settings, canvas: CanvasSize) -> Vec<Note> {
    let music = &settings.music;
    let duration = settings.curve.duration;
    let samples = sample_points(&curve.points, settings.curve.density);

    let times: Vec<f64> = samples
        .iter()
        .map(|point| quantize_time(x_to_time(point.x, canvas.width, duration), music).max(0.0))
        .collect();

    let mut notes = Vec::with_capacity(samples.len());

    for (index, point) in samples.iter().enumerate() {
        let frequency = y_to_frequency(point.y, settings.curve.octave_range, canvas.height);

        if !frequency.is_finite() || !times[index].is_finite() {
            log::debug!("skipping sample {} of curve: not a finite pitch", index);
            continue;
        }

        let length = match times.get(index + 1) {
            Some(next) => next - times[index],
            None => music.beat_duration(),
        };

        notes.push(Note {
            pitch: closest_note(frequency),
            time: times[index],
            duration: length.max(music.min_note_duration()),
            instrument: Some(curve.instrument),
        });
    }

    notes
}

/// Staircase outline of `notes`: a horizontal segment per note, in time
/// order.
pub fn notes_to_points(notes: &[Note], settings: &Settings, canvas: CanvasSize) -> Vec<Point> {
    let mut ordered: Vec<&Note> = notes.iter().collect();
    ordered.sort_by(|a, b| a.time.total_cmp(&b.time));

    let duration = settings.curve.duration;
    let octave_range = settings.curve.octave_range;

    ordered
        .into_iter()
        .flat_map(|note| {
            let y = note_to_y(note.pitch, octave_range, canvas.height);

            [
                Point::new(time_to_x(note.time, canvas.width, duration), y),
                Point::new(time_to_x(note.end(), canvas.width, duration), y),
            ]
        })
        .collect()
}

/// Rebuilds the track's first curve from its notes, creating the curve if
/// the track has none. Tracks without notes are left alone.
pub fn notes_to_curve(track: &mut Track, settings: &Settings, canvas: CanvasSize) -> bool {
    if track.notes.is_empty() {
        return false;
    }

    let points = notes_to_points(&track.notes, settings, canvas);

    match track.curves.first_mut() {
        Some(curve) => curve.points = points,
        None => track.curves.push(Curve {
            points,
            track_id: track.id,
            instrument: track.instrument,
        }),
    }

    true
}

/// Converts every curve of the track and merges the result into its notes,
/// sorted by start time. Returns how many notes were added.
pub fn curves_to_track_notes(track: &mut Track, settings: &Settings, canvas: CanvasSize) -> usize {
    let converted: Vec<Note> = track
        .curves
        .iter()
        .flat_map(|curve| curve_to_notes(curve, settings, canvas))
        .collect();

    let added = converted.len();
    track.notes.extend(converted);
    track.sort_notes();

    added
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveShape {
    Linear,
    Sine,
    /// Resamples the points captured when editing started.
    Custom,
}

impl CurveShape {
    pub const ALL: [CurveShape; 3] = [CurveShape::Linear, CurveShape::Sine, CurveShape::Custom];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Sine => "sine",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for CurveShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveShape {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.as_str() == s)
            .ok_or_else(|| format!("unknown curve shape {:?}", s))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeRequest {
    pub shape: CurveShape,
    pub start: NoteName,
    pub end: NoteName,
    pub density: usize,
}

/// `density` points spread over the full canvas width following `shape`.
/// The density is clamped to `MIN_SHAPE_DENSITY..=MAX_DENSITY`. `Custom`
/// needs the `baseline` captured by an edit session.
pub fn generate_curve_shape(
    request: &ShapeRequest,
    baseline: Option<&[Point]>,
    octave_range: u32,
    canvas: CanvasSize,
) -> Result<Vec<Point>> {
    let baseline = match (request.shape, baseline) {
        (CurveShape::Custom, None) => return Err(SketchError::MissingBaseline),
        (CurveShape::Custom, Some(points)) if points.is_empty() => {
            return Err(SketchError::MissingBaseline)
        }
        (_, baseline) => baseline.unwrap_or_default(),
    };

    let start = request.start.frequency();
    let end = request.end.frequency();
    let density = request.density.clamp(MIN_SHAPE_DENSITY, MAX_DENSITY);
    let last = (density - 1) as f64;

    let points = (0..density)
        .map(|i| {
            let t = i as f64 / last;
            let x = t * canvas.width;

            let y = match request.shape {
                CurveShape::Linear => {
                    frequency_to_y(start + (end - start) * t, octave_range, canvas.height)
                }
                CurveShape::Sine => {
                    let frequency = start + (end - start) * ((t * PI).sin() + 1.0) / 2.0;
                    frequency_to_y(frequency, octave_range, canvas.height)
                }
                CurveShape::Custom => {
                    let index = (t * (baseline.len() - 1) as f64).floor() as usize;
                    baseline[index].y
                }
            };

            Point::new(x, y)
        })
        .collect();

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{project::Instrument, settings::TimeSignature};
    use float_cmp::approx_eq;

    fn settings() -> Settings {
        Settings::default().with_music(MusicSettings::new(120, TimeSignature::default(), 4))
    }

    fn curve(points: Vec<Point>) -> Curve {
        Curve {
            points,
            track_id: 1,
            instrument: Instrument::Dizi,
        }
    }

    #[test]
    fn test_sampling_never_upsamples() {
        let points: Vec<Point> = (0..4).map(|i| Point::new(i as f64, 0.0)).collect();
        assert_eq!(sample_points(&points, 10), points);
        assert_eq!(sample_points(&points, 4), points);
    }

    #[test]
    fn test_sampling_uses_index_stride() {
        let points: Vec<Point> = (0..25).map(|i| Point::new(i as f64, 0.0)).collect();
        let sampled: Vec<f64> = sample_points(&points, 10).iter().map(|p| p.x).collect();

        assert_eq!(
            sampled,
            vec![0.0, 2.0, 5.0, 7.0, 10.0, 12.0, 15.0, 17.0, 20.0, 22.0]
        );
    }

    #[test]
    fn test_quantize_time() {
        let music = MusicSettings::default();
        assert!(approx_eq!(f64, quantize_time(0.63, &music), 0.5, epsilon = 1e-12));
        assert!(approx_eq!(f64, quantize_time(0.76, &music), 1.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, quantize_time(0.0, &music), 0.0, epsilon = 1e-12));
    }

    #[test]
    fn test_quantize_time_is_idempotent() {
        for unit in [1, 3, 4, 8, 16] {
            let music = MusicSettings::default().with_bpm(97).with_quantize_unit(unit);
            let mut time = 0.0;

            while time < 10.0 {
                let once = quantize_time(time, &music);
                assert_eq!(quantize_time(once, &music), once);
                time += 0.037;
            }
        }
    }

    #[test]
    fn test_curve_to_notes_durations() {
        let settings = settings();
        let canvas = CanvasSize::new(800.0, 300.0);

        let points: Vec<Point> = (0..40)
            .map(|i| Point::new(i as f64 * 20.0, 150.0 + (i as f64 * 0.3).sin() * 100.0))
            .collect();

        let notes = curve_to_notes(&curve(points), &settings, canvas);
        assert_eq!(notes.len(), settings.curve.density);

        let minimum = settings.music.min_note_duration();
        for note in &notes {
            assert!(note.duration >= minimum);
            assert_eq!(note.instrument, Some(Instrument::Dizi));
        }

        let last = notes.last().unwrap();
        assert!(approx_eq!(f64, last.duration, 0.5, epsilon = 1e-12));
    }

    #[test]
    fn test_curve_to_notes_quantizes_and_pitches() {
        let settings = settings();
        let canvas = CanvasSize::new(800.0, 300.0);
        // Full width is 8 seconds, so x = 63 is 0.63 s.
        let y = note_to_y(NoteName::A4, settings.curve.octave_range, canvas.height);
        let points = vec![Point::new(63.0, y), Point::new(400.0, y)];

        let notes = curve_to_notes(&curve(points), &settings, canvas);
        assert_eq!(notes.len(), 2);
        assert!(approx_eq!(f64, notes[0].time, 0.5, epsilon = 1e-12));
        assert!(approx_eq!(f64, notes[0].duration, 3.5, epsilon = 1e-12));
        assert_eq!(notes[0].pitch, NoteName::A4);
        assert!(approx_eq!(f64, notes[1].time, 4.0, epsilon = 1e-12));
    }

    #[test]
    fn test_backwards_curve_gets_minimum_durations() {
        let settings = settings();
        let canvas = CanvasSize::new(800.0, 300.0);
        let points = vec![Point::new(400.0, 100.0), Point::new(0.0, 100.0)];

        let notes = curve_to_notes(&curve(points), &settings, canvas);
        assert!(approx_eq!(f64, notes[0].duration, 0.125, epsilon = 1e-12));
    }

    #[test]
    fn test_notes_to_curve_builds_staircase() {
        let settings = settings();
        let canvas = CanvasSize::new(800.0, 300.0);

        let mut track = Track {
            id: 1,
            name: "Track 1".to_string(),
            instrument: Instrument::Guzheng,
            notes: vec![
                Note::new(NoteName::A4, 2.0, 1.0).unwrap(),
                Note::new(NoteName::C2, 0.0, 1.0).unwrap(),
            ],
            curves: Vec::new(),
        };

        assert!(notes_to_curve(&mut track, &settings, canvas));
        assert_eq!(track.curves.len(), 1);
        assert_eq!(track.curves[0].instrument, Instrument::Guzheng);

        let points = &track.curves[0].points;
        assert_eq!(points.len(), 4);
        assert!(approx_eq!(f64, points[0].x, 0.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, points[0].y, 300.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, points[1].x, 100.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, points[2].x, 200.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, points[3].x, 300.0, epsilon = 1e-9));
        assert_eq!(points[2].y, points[3].y);

        track.notes.truncate(1);
        assert!(notes_to_curve(&mut track, &settings, canvas));
        assert_eq!(track.curves.len(), 1);
        assert_eq!(track.curves[0].points.len(), 2);

        track.notes.clear();
        assert!(!notes_to_curve(&mut track, &settings, canvas));
        assert_eq!(track.curves[0].points.len(), 2);
    }

    #[test]
    fn test_curves_to_track_notes_sorts() {
        let settings = settings();
        let canvas = CanvasSize::new(800.0, 300.0);

        let mut track = Track {
            id: 1,
            name: "Track 1".to_string(),
            instrument: Instrument::Guzheng,
            notes: vec![Note::new(NoteName::A4, 3.0, 1.0).unwrap()],
            curves: vec![curve(vec![Point::new(0.0, 100.0), Point::new(600.0, 100.0)])],
        };

        assert_eq!(curves_to_track_notes(&mut track, &settings, canvas), 2);
        let times: Vec<f64> = track.notes.iter().map(|note| note.time).collect();
        assert_eq!(times, vec![0.0, 3.0, 6.0]);
    }

    #[test]
    fn test_linear_shape() {
        let canvas = CanvasSize::new(800.0, 300.0);
        let request = ShapeRequest {
            shape: CurveShape::Linear,
            start: NoteName::C2,
            end: "C5".parse().unwrap(),
            density: 5,
        };

        let points = generate_curve_shape(&request, None, 3, canvas).unwrap();
        assert_eq!(points.len(), 5);
        assert!(approx_eq!(f64, points[0].x, 0.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, points[4].x, 800.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, points[0].y, 300.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, points[2].y, 150.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, points[4].y, 0.0, epsilon = 1e-9));
    }

    #[test]
    fn test_sine_shape_starts_halfway() {
        let canvas = CanvasSize::new(800.0, 300.0);
        let request = ShapeRequest {
            shape: CurveShape::Sine,
            start: NoteName::C2,
            end: "C5".parse().unwrap(),
            density: 3,
        };

        let points = generate_curve_shape(&request, None, 3, canvas).unwrap();
        assert!(approx_eq!(f64, points[0].y, 150.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, points[1].y, 0.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, points[2].y, 150.0, epsilon = 1e-6));
    }

    #[test]
    fn test_custom_shape_resamples_baseline() {
        let canvas = CanvasSize::new(800.0, 300.0);
        let baseline: Vec<Point> = (0..5).map(|i| Point::new(i as f64, i as f64 * 10.0)).collect();
        let request = ShapeRequest {
            shape: CurveShape::Custom,
            start: NoteName::C2,
            end: NoteName::A4,
            density: 3,
        };

        let points = generate_curve_shape(&request, Some(baseline.as_slice()), 3, canvas).unwrap();
        let ys: Vec<f64> = points.iter().map(|point| point.y).collect();
        assert_eq!(ys, vec![0.0, 20.0, 40.0]);
    }

    #[test]
    fn test_custom_shape_without_baseline_fails() {
        let request = ShapeRequest {
            shape: CurveShape::Custom,
            start: NoteName::C2,
            end: NoteName::A4,
            density: 3,
        };

        let canvas = CanvasSize::default();
        assert_eq!(
            generate_curve_shape(&request, None, 3, canvas),
            Err(SketchError::MissingBaseline)
        );
        assert_eq!(
            generate_curve_shape(&request, Some(&[][..]), 3, canvas),
            Err(SketchError::MissingBaseline)
        );
    }

    #[test]
    fn test_shape_density_is_clamped() {
        let mut request = ShapeRequest {
            shape: CurveShape::Linear,
            start: NoteName::A4,
            end: NoteName::A4,
            density: 0,
        };

        for density in [0, 1] {
            request.density = density;
            let points = generate_curve_shape(&request, None, 3, CanvasSize::default()).unwrap();
            assert_eq!(points.len(), MIN_SHAPE_DENSITY);
            assert_eq!(points[0].x, 0.0);
            assert_eq!(points[1].x, CanvasSize::default().width);
        }

        request.density = usize::MAX;
        let points = generate_curve_shape(&request, None, 3, CanvasSize::default()).unwrap();
        assert_eq!(points.len(), MAX_DENSITY);
    }
}
