use crate::{
    convert::{generate_curve_shape, CurveShape, ShapeRequest},
    error::{Result, SketchError},
    mapping::y_to_frequency,
    notes::{closest_note, NoteName},
    project::{Point, TrackId},
    sketchpad::Sketchpad,
};

/// The curve being reshaped, with the points it had when editing started.
#[derive(Clone, Debug, PartialEq)]
pub struct EditSession {
    pub track_id: TrackId,
    pub curve_index: usize,
    pub original_points: Vec<Point>,
    /// Starting values for the shape controls.
    pub suggestion: ShapeRequest,
    /// Last previewed shape, drawn on top of the canvas.
    pub preview: Option<Vec<Point>>,
}

impl Sketchpad {
    pub fn edit_curve(&mut self, track_id: TrackId, curve_index: usize) -> Result<()> {
        let curve = self.project.track(track_id)?.curve(curve_index)?;

        let octave_range = self.settings.curve.octave_range;
        let height = self.canvas.height;
        let note_at = |point: Option<&Point>| {
            point
                .map(|point| closest_note(y_to_frequency(point.y, octave_range, height)))
                .unwrap_or(NoteName::C2)
        };

        let session = EditSession {
            track_id,
            curve_index,
            original_points: curve.points.clone(),
            suggestion: ShapeRequest {
                shape: CurveShape::Custom,
                start: note_at(curve.points.first()),
                end: note_at(curve.points.last()),
                density: self.settings.curve.density,
            },
            preview: None,
        };

        log::debug!("editing curve {} of track {}", curve_index, track_id);
        self.editing = Some(session);

        Ok(())
    }

    fn shape_points(&self, request: &ShapeRequest) -> Result<Vec<Point>> {
        let session = self.editing.as_ref().ok_or(SketchError::NoEditSession)?;

        generate_curve_shape(
            request,
            Some(session.original_points.as_slice()),
            self.settings.curve.octave_range,
            self.canvas,
        )
    }

    pub fn preview_shape(&mut self, request: &ShapeRequest) -> Result<()> {
        let points = self.shape_points(request)?;

        if let Some(session) = self.editing.as_mut() {
            session.suggestion = *request;
            session.preview = Some(points);
        }

        Ok(())
    }

    /// Replaces the edited curve with the generated shape and closes the
    /// session.
    pub fn apply_shape(&mut self, request: &ShapeRequest) -> Result<()> {
        let points = self.shape_points(request)?;

        if let Some(session) = self.editing.take() {
            self.project
                .replace_curve_points(session.track_id, session.curve_index, points)?;
        }

        Ok(())
    }

    /// Puts the captured points back and closes the session.
    pub fn cancel_edit(&mut self) -> Result<()> {
        let session = self.editing.take().ok_or(SketchError::NoEditSession)?;

        self.project.replace_curve_points(
            session.track_id,
            session.curve_index,
            session.original_points,
        )
    }
}
