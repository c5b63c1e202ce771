use crate::{
    editing::EditSession,
    interaction::Gesture,
    mapping::CanvasSize,
    project::{Instrument, Point, Project, TrackId},
    settings::{MusicSettings, Settings},
};

/// Everything the editor knows: the tracks, the active settings, the canvas
/// geometry and the transient pointer and edit state. Only mutated from the
/// UI thread, through `dispatch`.
pub struct Sketchpad {
    pub(crate) project: Project,
    pub(crate) settings: Settings,
    pub(crate) canvas: CanvasSize,
    pub(crate) current_track: TrackId,
    pub(crate) curve_instrument: Instrument,
    pub(crate) editing: Option<EditSession>,
    pub(crate) gesture: Gesture,
}

impl Sketchpad {
    pub fn new(canvas: CanvasSize) -> Self {
        let project = Project::new();
        let current_track = project.first_track_id();

        Self {
            project,
            // The canvas starts out showing exactly the visible measures.
            settings: Settings::default().with_music(MusicSettings::default()),
            canvas,
            current_track,
            curve_instrument: Instrument::Guzheng,
            editing: None,
            gesture: Gesture::Idle,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Track that receives new strokes and curve-level commands.
    pub fn current_track(&self) -> TrackId {
        self.current_track
    }

    pub fn curve_instrument(&self) -> Instrument {
        self.curve_instrument
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    /// Points of the stroke currently being drawn, if any.
    pub fn stroke(&self) -> Option<&[Point]> {
        match &self.gesture {
            Gesture::Drawing(points) => Some(points.as_slice()),
            _ => None,
        }
    }

    /// Falls back to the first track when the current one went away.
    pub(crate) fn fix_current_track(&mut self) {
        if !self.project.contains(self.current_track) {
            self.current_track = self.project.first_track_id();
        }
    }

    /// Ends the edit session if it points at a curve that no longer exists.
    pub(crate) fn fix_editing(&mut self) {
        let stale = self.editing.as_ref().map_or(false, |session| {
            self.project
                .track(session.track_id)
                .and_then(|track| track.curve(session.curve_index))
                .is_err()
        });

        if stale {
            log::debug!("edited curve is gone, closing the edit session");
            self.editing = None;
        }
    }
}
