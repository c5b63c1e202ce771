use std::{fmt, str::FromStr};

use crate::{
    error::{Result, SketchError},
    mapping::CanvasSize,
    notes::NoteName,
};

pub type TrackId = u32;

/// Control points closer than this to the pointer can be grabbed.
pub const GRAB_THRESHOLD: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instrument {
    Guzheng,
    Dizi,
}

impl Instrument {
    pub const ALL: [Instrument; 2] = [Instrument::Guzheng, Instrument::Dizi];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guzheng => "guzheng",
            Self::Dizi => "dizi",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Guzheng => "Guzheng",
            Self::Dizi => "Dizi",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Instrument {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|instrument| instrument.as_str() == s)
            .ok_or_else(|| format!("unknown instrument {:?}", s))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Stroke weight, only used for drawing.
    pub width: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, width: None }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    pub points: Vec<Point>,
    pub track_id: TrackId,
    pub instrument: Instrument,
}

impl Curve {
    pub fn is_renderable(&self) -> bool {
        self.points.len() >= 2
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub pitch: NoteName,
    /// Start, in seconds from the beginning of the canvas.
    pub time: f64,
    pub duration: f64,
    pub instrument: Option<Instrument>,
}

impl Note {
    pub fn new(pitch: NoteName, time: f64, duration: f64) -> Result<Self> {
        let note = Self {
            pitch,
            time,
            duration,
            instrument: None,
        };
        note.validate()?;
        Ok(note)
    }

    pub fn end(&self) -> f64 {
        self.time + self.duration
    }

    pub fn validate(&self) -> Result<()> {
        if !self.time.is_finite() || self.time < 0.0 {
            return Err(SketchError::InvalidNote(format!("start time {}", self.time)));
        }

        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(SketchError::InvalidNote(format!("duration {}", self.duration)));
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NoteEdit {
    Pitch(NoteName),
    Time(f64),
    Duration(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub instrument: Instrument,
    pub notes: Vec<Note>,
    pub curves: Vec<Curve>,
}

impl Track {
    fn new(id: TrackId, instrument: Instrument) -> Self {
        Self {
            id,
            name: format!("Track {}", id),
            instrument,
            notes: Vec::new(),
            curves: Vec::new(),
        }
    }

    pub fn curve(&self, index: usize) -> Result<&Curve> {
        self.curves
            .get(index)
            .ok_or(SketchError::UnknownCurve(self.id, index))
    }

    pub fn curve_mut(&mut self, index: usize) -> Result<&mut Curve> {
        let id = self.id;
        self.curves
            .get_mut(index)
            .ok_or(SketchError::UnknownCurve(id, index))
    }

    pub fn note(&self, index: usize) -> Result<&Note> {
        self.notes
            .get(index)
            .ok_or(SketchError::UnknownNote(self.id, index))
    }

    pub fn sort_notes(&mut self) {
        self.notes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    pub fn clear(&mut self) {
        self.notes.clear();
        self.curves.clear();
    }
}

/// A control point located by [`Project::find_nearest_point`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointRef {
    pub track_id: TrackId,
    pub curve_index: usize,
    pub point_index: usize,
}

/// Owns every track. There is always at least one, and the first one can
/// only be cleared.
#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    tracks: Vec<Track>,
    next_id: TrackId,
}

impl Project {
    pub fn new() -> Self {
        Self {
            tracks: vec![Track::new(1, Instrument::Guzheng)],
            next_id: 2,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn first_track_id(&self) -> TrackId {
        self.tracks[0].id
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.tracks.iter().any(|track| track.id == id)
    }

    pub fn track(&self, id: TrackId) -> Result<&Track> {
        self.tracks
            .iter()
            .find(|track| track.id == id)
            .ok_or(SketchError::UnknownTrack(id))
    }

    pub fn track_mut(&mut self, id: TrackId) -> Result<&mut Track> {
        self.tracks
            .iter_mut()
            .find(|track| track.id == id)
            .ok_or(SketchError::UnknownTrack(id))
    }

    pub fn tracks_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.tracks.iter_mut()
    }

    pub fn add_track(&mut self) -> TrackId {
        let id = self.next_id;
        self.next_id += 1;
        self.tracks.push(Track::new(id, Instrument::Dizi));
        id
    }

    pub fn remove_track(&mut self, id: TrackId) -> Result<Track> {
        match self.tracks.iter().position(|track| track.id == id) {
            None => Err(SketchError::UnknownTrack(id)),
            Some(0) => Err(SketchError::FirstTrackLocked),
            Some(index) => Ok(self.tracks.remove(index)),
        }
    }

    pub fn clear_track(&mut self, id: TrackId) -> Result<()> {
        self.track_mut(id)?.clear();
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.tracks.iter_mut().for_each(Track::clear);
    }

    pub fn set_instrument(&mut self, id: TrackId, instrument: Instrument) -> Result<()> {
        self.track_mut(id)?.instrument = instrument;
        Ok(())
    }

    /// The control point closest to `(x, y)` over every curve of every track,
    /// if one lies strictly within `threshold` pixels.
    pub fn find_nearest_point(&self, x: f64, y: f64, threshold: f64) -> Option<PointRef> {
        let target = Point::new(x, y);
        let mut nearest = None;
        let mut min_distance = threshold;

        for track in &self.tracks {
            for (curve_index, curve) in track.curves.iter().enumerate() {
                for (point_index, point) in curve.points.iter().enumerate() {
                    let distance = point.distance(&target);

                    if distance < min_distance {
                        min_distance = distance;
                        nearest = Some(PointRef {
                            track_id: track.id,
                            curve_index,
                            point_index,
                        });
                    }
                }
            }
        }

        nearest
    }

    /// Moves a control point by `(dx, dy)`, keeping it on the canvas.
    pub fn move_point(
        &mut self,
        point: PointRef,
        dx: f64,
        dy: f64,
        canvas: CanvasSize,
    ) -> Result<()> {
        let curve = self.track_mut(point.track_id)?.curve_mut(point.curve_index)?;

        let target = curve
            .points
            .get_mut(point.point_index)
            .ok_or(SketchError::UnknownCurve(point.track_id, point.curve_index))?;

        let (x, y) = canvas.clamp(target.x + dx, target.y + dy);
        target.x = x;
        target.y = y;

        Ok(())
    }

    pub fn append_curve(
        &mut self,
        id: TrackId,
        points: Vec<Point>,
        instrument: Instrument,
    ) -> Result<usize> {
        let track = self.track_mut(id)?;

        track.curves.push(Curve {
            points,
            track_id: id,
            instrument,
        });

        Ok(track.curves.len() - 1)
    }

    pub fn delete_curve(&mut self, id: TrackId, index: usize) -> Result<Curve> {
        let track = self.track_mut(id)?;
        track.curve(index)?;
        Ok(track.curves.remove(index))
    }

    pub fn replace_curve_points(
        &mut self,
        id: TrackId,
        index: usize,
        points: Vec<Point>,
    ) -> Result<()> {
        self.track_mut(id)?.curve_mut(index)?.points = points;
        Ok(())
    }

    pub fn clear_curves(&mut self, id: TrackId) -> Result<()> {
        self.track_mut(id)?.curves.clear();
        Ok(())
    }

    pub fn add_note(&mut self, id: TrackId, note: Note) -> Result<usize> {
        note.validate()?;

        let track = self.track_mut(id)?;
        track.notes.push(note);

        Ok(track.notes.len() - 1)
    }

    /// Applies `edit` to one note. A new start time re-sorts the track.
    pub fn edit_note(&mut self, id: TrackId, index: usize, edit: NoteEdit) -> Result<()> {
        let track = self.track_mut(id)?;
        let mut note = track.note(index)?.clone();

        let resort = matches!(edit, NoteEdit::Time(_));

        match edit {
            NoteEdit::Pitch(pitch) => note.pitch = pitch,
            NoteEdit::Time(time) => note.time = time,
            NoteEdit::Duration(duration) => note.duration = duration,
        }

        note.validate()?;
        track.notes[index] = note;

        if resort {
            track.sort_notes();
        }

        Ok(())
    }

    pub fn delete_note(&mut self, id: TrackId, index: usize) -> Result<Note> {
        let track = self.track_mut(id)?;
        track.note(index)?;
        Ok(track.notes.remove(index))
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}
