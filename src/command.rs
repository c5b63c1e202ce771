use crate::{
    convert::{curves_to_track_notes, notes_to_curve, ShapeRequest},
    error::Result,
    mapping::CanvasSize,
    project::{Instrument, Note, NoteEdit, TrackId},
    playback::PlayRequest,
    settings::TimeSignature,
    simplify::{
        optimize_points, reduce_points, smooth_points, OPTIMIZE_TOLERANCE, REDUCE_TOLERANCE,
    },
    sketchpad::Sketchpad,
};

/// Every operation the view can ask of the editor.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    AddTrack,
    RemoveTrack(TrackId),
    ClearTrack(TrackId),
    ClearAllTracks,
    SelectTrack(TrackId),
    SetTrackInstrument(TrackId, Instrument),
    SetCurveInstrument(Instrument),
    AddNote(TrackId, Note),
    EditNote(TrackId, usize, NoteEdit),
    DeleteNote(TrackId, usize),
    ConvertNotesToCurve(TrackId),
    ConvertCurvesToNotes,
    DeleteCurve(TrackId, usize),
    ClearCurves,
    SmoothCurves,
    CleanupCurves,
    EditCurve(TrackId, usize),
    PreviewShape(ShapeRequest),
    ApplyShape(ShapeRequest),
    CancelCurveEdit,
    SetDuration(f64),
    SetDensity(usize),
    SetOctaveRange(u32),
    SetBpm(u32),
    SetTimeSignature(TimeSignature),
    SetQuantizeUnit(u32),
    ResizeCanvas(CanvasSize),
    PointerDown(f64, f64),
    PointerMove(f64, f64),
    PointerUp,
    Play(PlayRequest),
    StopPlayback,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Unchanged,
    Redraw,
    Play(PlayRequest),
    Stop,
}

impl Sketchpad {
    /// Runs one command. Failures are logged and reported as `Unchanged`;
    /// they never reach the caller.
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        log::trace!("{:?}", command);

        match self.dispatch_impl(command) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("command ignored: {}", err);
                Outcome::Unchanged
            }
        }
    }

    fn dispatch_impl(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::AddTrack => {
                let id = self.project.add_track();
                log::info!("added track {}", id);
            }
            Command::RemoveTrack(id) => {
                self.project.remove_track(id)?;
                self.fix_current_track();
                self.fix_editing();
            }
            Command::ClearTrack(id) => {
                self.project.clear_track(id)?;
                self.fix_editing();
            }
            Command::ClearAllTracks => {
                self.project.clear_all();
                self.editing = None;
            }
            Command::SelectTrack(id) => {
                self.project.track(id)?;
                self.current_track = id;
            }
            Command::SetTrackInstrument(id, instrument) => {
                self.project.set_instrument(id, instrument)?;
            }
            Command::SetCurveInstrument(instrument) => {
                self.curve_instrument = instrument;
                return Ok(Outcome::Unchanged);
            }
            Command::AddNote(id, note) => {
                self.project.add_note(id, note)?;
            }
            Command::EditNote(id, index, edit) => {
                self.project.edit_note(id, index, edit)?;
            }
            Command::DeleteNote(id, index) => {
                self.project.delete_note(id, index)?;
            }
            Command::ConvertNotesToCurve(id) => {
                let (settings, canvas) = (self.settings, self.canvas);

                if !notes_to_curve(self.project.track_mut(id)?, &settings, canvas) {
                    return Ok(Outcome::Unchanged);
                }
            }
            Command::ConvertCurvesToNotes => {
                let (settings, canvas) = (self.settings, self.canvas);
                let track = self.project.track_mut(self.current_track)?;
                let added = curves_to_track_notes(track, &settings, canvas);
                log::info!("converted curves of track {} into {} notes", track.id, added);
            }
            Command::DeleteCurve(id, index) => {
                self.project.delete_curve(id, index)?;
                self.shift_editing_after_delete(id, index);
            }
            Command::ClearCurves => {
                self.project.clear_curves(self.current_track)?;
                self.editing = None;
            }
            Command::SmoothCurves => {
                let canvas = self.canvas;

                for track in self.project.tracks_mut() {
                    for curve in track.curves.iter_mut().filter(|curve| curve.points.len() > 2) {
                        curve.points = smooth_points(&curve.points, canvas);
                    }
                }
            }
            Command::CleanupCurves => {
                for track in self.project.tracks_mut() {
                    track.curves.retain(|curve| curve.is_renderable());

                    for curve in &mut track.curves {
                        let reduced = reduce_points(&curve.points, REDUCE_TOLERANCE);
                        curve.points = optimize_points(&reduced, OPTIMIZE_TOLERANCE);
                    }
                }

                // Pruning shifts curve indexes.
                self.editing = None;
            }
            Command::EditCurve(id, index) => self.edit_curve(id, index)?,
            Command::PreviewShape(request) => self.preview_shape(&request)?,
            Command::ApplyShape(request) => self.apply_shape(&request)?,
            Command::CancelCurveEdit => self.cancel_edit()?,
            Command::SetDuration(duration) => self.settings = self.settings.with_duration(duration),
            Command::SetDensity(density) => self.settings = self.settings.with_density(density),
            Command::SetOctaveRange(range) => {
                self.settings = self.settings.with_octave_range(range)
            }
            Command::SetBpm(bpm) => {
                self.settings = self.settings.with_music(self.settings.music.with_bpm(bpm))
            }
            Command::SetTimeSignature(time_signature) => {
                let music = self.settings.music.with_time_signature(time_signature);
                self.settings = self.settings.with_music(music);
            }
            Command::SetQuantizeUnit(unit) => {
                let music = self.settings.music.with_quantize_unit(unit);
                self.settings = self.settings.with_music(music);
            }
            Command::ResizeCanvas(canvas) => self.canvas = canvas,
            Command::PointerDown(x, y) => return Ok(redraw_if(self.pointer_down(x, y))),
            Command::PointerMove(x, y) => return Ok(redraw_if(self.pointer_move(x, y))),
            Command::PointerUp => return Ok(redraw_if(self.pointer_up())),
            Command::Play(request) => return Ok(Outcome::Play(request)),
            Command::StopPlayback => return Ok(Outcome::Stop),
        }

        Ok(Outcome::Redraw)
    }

    fn shift_editing_after_delete(&mut self, id: TrackId, index: usize) {
        let session = match self.editing.as_mut() {
            Some(session) if session.track_id == id => session,
            _ => return,
        };

        if session.curve_index == index {
            self.editing = None;
        } else if session.curve_index > index {
            session.curve_index -= 1;
        }
    }
}

fn redraw_if(changed: bool) -> Outcome {
    if changed {
        Outcome::Redraw
    } else {
        Outcome::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        convert::CurveShape,
        mapping::y_to_frequency,
        notes::{closest_note, NoteName},
        project::Point,
        settings::MusicSettings,
    };
    use float_cmp::approx_eq;

    fn sketchpad() -> Sketchpad {
        Sketchpad::new(CanvasSize::new(800.0, 300.0))
    }

    fn line(y: f64, count: usize) -> Vec<Point> {
        (0..count).map(|i| Point::new(i as f64 * 30.0, y)).collect()
    }

    #[test]
    fn test_track_lifecycle() {
        let mut sketchpad = sketchpad();

        assert_eq!(sketchpad.dispatch(Command::AddTrack), Outcome::Redraw);
        assert_eq!(sketchpad.dispatch(Command::SelectTrack(2)), Outcome::Redraw);
        assert_eq!(sketchpad.current_track(), 2);

        assert_eq!(sketchpad.dispatch(Command::RemoveTrack(2)), Outcome::Redraw);
        assert_eq!(sketchpad.current_track(), 1);

        assert_eq!(sketchpad.dispatch(Command::RemoveTrack(1)), Outcome::Unchanged);
        assert_eq!(sketchpad.project().tracks().len(), 1);
    }

    #[test]
    fn test_missing_entities_are_no_ops() {
        let mut sketchpad = sketchpad();

        for command in [
            Command::RemoveTrack(5),
            Command::ClearTrack(5),
            Command::SelectTrack(5),
            Command::SetTrackInstrument(5, Instrument::Dizi),
            Command::DeleteCurve(1, 0),
            Command::DeleteNote(1, 0),
            Command::EditNote(1, 0, NoteEdit::Time(1.0)),
            Command::EditCurve(1, 0),
            Command::CancelCurveEdit,
            Command::ConvertNotesToCurve(1),
        ] {
            assert_eq!(sketchpad.dispatch(command), Outcome::Unchanged);
        }

        assert_eq!(sketchpad.project().tracks().len(), 1);
        assert_eq!(sketchpad.current_track(), 1);
    }

    #[test]
    fn test_custom_shape_without_session_leaves_curves_alone() {
        let mut sketchpad = sketchpad();
        sketchpad.project.append_curve(1, line(100.0, 3), Instrument::Guzheng).unwrap();

        let request = ShapeRequest {
            shape: CurveShape::Custom,
            start: NoteName::C2,
            end: NoteName::A4,
            density: 8,
        };

        assert_eq!(sketchpad.dispatch(Command::ApplyShape(request)), Outcome::Unchanged);
        assert_eq!(sketchpad.project().track(1).unwrap().curves[0].points, line(100.0, 3));
    }

    #[test]
    fn test_curves_and_notes_round_trip() {
        let mut sketchpad = sketchpad();
        sketchpad.project.append_curve(1, line(100.0, 20), Instrument::Dizi).unwrap();

        assert_eq!(sketchpad.dispatch(Command::ConvertCurvesToNotes), Outcome::Redraw);
        let notes = &sketchpad.project().track(1).unwrap().notes;
        assert_eq!(notes.len(), 10);
        assert!(notes.windows(2).all(|pair| pair[0].time <= pair[1].time));

        assert_eq!(sketchpad.dispatch(Command::ConvertNotesToCurve(1)), Outcome::Redraw);
        let track = sketchpad.project().track(1).unwrap();
        assert_eq!(track.curves.len(), 1);
        assert_eq!(track.curves[0].points.len(), 20);
    }

    #[test]
    fn test_delete_curve_keeps_edit_session_consistent() {
        let mut sketchpad = sketchpad();
        for y in [50.0, 100.0, 150.0] {
            sketchpad.project.append_curve(1, line(y, 3), Instrument::Dizi).unwrap();
        }

        sketchpad.dispatch(Command::EditCurve(1, 2));
        sketchpad.dispatch(Command::DeleteCurve(1, 0));
        assert_eq!(sketchpad.editing().unwrap().curve_index, 1);

        sketchpad.dispatch(Command::DeleteCurve(1, 1));
        assert!(sketchpad.editing().is_none());
    }

    #[test]
    fn test_smooth_and_cleanup() {
        let mut sketchpad = sketchpad();
        let mut zigzag = line(100.0, 12);
        for (i, point) in zigzag.iter_mut().enumerate() {
            if i % 2 == 1 {
                point.y = 140.0;
            }
        }

        let project = &mut sketchpad.project;
        project.append_curve(1, zigzag.clone(), Instrument::Dizi).unwrap();
        project.append_curve(1, vec![Point::new(1.0, 1.0)], Instrument::Dizi).unwrap();

        sketchpad.dispatch(Command::SmoothCurves);
        let smoothed = &sketchpad.project().track(1).unwrap().curves[0].points;
        assert_eq!(smoothed.len(), zigzag.len());
        assert!(smoothed[5].y > 100.0 && smoothed[5].y < 140.0);

        sketchpad.dispatch(Command::CleanupCurves);
        let curves = &sketchpad.project().track(1).unwrap().curves;
        assert_eq!(curves.len(), 1);
        assert!(curves[0].points.len() <= zigzag.len());
    }

    #[test]
    fn test_initial_duration_spans_the_visible_measures() {
        let settings = *sketchpad().settings();

        // 4 measures of 4/4 at 120 bpm.
        assert!(approx_eq!(f64, settings.curve.duration, 8.0, epsilon = 1e-12));
        assert_eq!(settings.music, MusicSettings::default());
    }

    #[test]
    fn test_settings_commands_produce_new_versions() {
        let mut sketchpad = sketchpad();
        let before = *sketchpad.settings();

        sketchpad.dispatch(Command::SetBpm(60));
        let after = *sketchpad.settings();

        assert_eq!(before.music.bpm(), 120);
        assert_eq!(after.music.bpm(), 60);
        assert!(approx_eq!(f64, after.music.measure_duration(), 4.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, after.curve.duration, 16.0, epsilon = 1e-12));

        sketchpad.dispatch(Command::SetTimeSignature(TimeSignature {
            numerator: 3,
            denominator: 4,
        }));
        let measure = sketchpad.settings().music.measure_duration();
        assert!(approx_eq!(f64, measure, 3.0, epsilon = 1e-12));

        sketchpad.dispatch(Command::SetDuration(5.0));
        sketchpad.dispatch(Command::SetDensity(20));
        sketchpad.dispatch(Command::SetOctaveRange(4));
        let curve = sketchpad.settings().curve;
        assert_eq!((curve.duration, curve.density, curve.octave_range), (5.0, 20, 4));
    }

    #[test]
    fn test_octave_range_never_runs_past_the_note_table() {
        let mut sketchpad = sketchpad();
        sketchpad.dispatch(Command::SetOctaveRange(10));

        let range = sketchpad.settings().curve.octave_range;
        let height = sketchpad.canvas().height;
        assert_eq!(range, 6);

        let top = closest_note(y_to_frequency(0.0, range, height));
        let below = closest_note(y_to_frequency(30.0, range, height));
        assert_eq!(top.to_string(), "C8");
        assert_ne!(below, top);
    }

    #[test]
    fn test_pointer_and_playback_outcomes() {
        let mut sketchpad = sketchpad();

        assert_eq!(sketchpad.dispatch(Command::PointerMove(1.0, 1.0)), Outcome::Unchanged);
        assert_eq!(sketchpad.dispatch(Command::PointerDown(1.0, 1.0)), Outcome::Redraw);
        assert_eq!(sketchpad.dispatch(Command::PointerMove(40.0, 1.0)), Outcome::Redraw);
        assert_eq!(sketchpad.dispatch(Command::PointerUp), Outcome::Redraw);
        assert_eq!(sketchpad.project().track(1).unwrap().curves.len(), 1);

        assert_eq!(
            sketchpad.dispatch(Command::Play(PlayRequest::AllTracks)),
            Outcome::Play(PlayRequest::AllTracks)
        );
        assert_eq!(sketchpad.dispatch(Command::StopPlayback), Outcome::Stop);
    }

    #[test]
    fn test_note_commands() {
        let mut sketchpad = sketchpad();
        let note = Note::new(NoteName::A4, 1.0, 0.5).unwrap();

        sketchpad.dispatch(Command::AddNote(1, note));
        sketchpad.dispatch(Command::EditNote(1, 0, NoteEdit::Pitch(NoteName::C2)));
        assert_eq!(sketchpad.project().track(1).unwrap().notes[0].pitch, NoteName::C2);

        assert_eq!(
            sketchpad.dispatch(Command::EditNote(1, 0, NoteEdit::Duration(-1.0))),
            Outcome::Unchanged
        );

        sketchpad.dispatch(Command::DeleteNote(1, 0));
        assert!(sketchpad.project().track(1).unwrap().notes.is_empty());
    }

    #[test]
    fn test_resize_changes_mapping() {
        let mut sketchpad = sketchpad();
        sketchpad.project.append_curve(1, line(100.0, 3), Instrument::Dizi).unwrap();

        let size = CanvasSize::new(400.0, 300.0);
        assert_eq!(sketchpad.dispatch(Command::ResizeCanvas(size)), Outcome::Redraw);
        assert_eq!(sketchpad.canvas(), size);

        // The curve keeps its pixels; only the time scale changes.
        assert_eq!(sketchpad.project().track(1).unwrap().curves[0].points, line(100.0, 3));
    }
}
