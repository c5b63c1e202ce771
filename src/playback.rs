use crate::{
    convert::sample_points,
    error::Result,
    mapping::{x_to_time, y_to_frequency, CanvasSize},
    notes::{closest_note, NoteName},
    project::{Curve, Instrument, Note, Point, Track, TrackId},
    settings::Settings,
    sketchpad::Sketchpad,
};

/// Gate length of every trigger produced from a curve sample.
pub const CURVE_GATE: f64 = 0.1;
/// Fallback length for a previewed note or pitch.
pub const PREVIEW_GATE: f64 = 0.1;

/// Whatever turns trigger requests into sound. Times are absolute, in the
/// engine's own clock, in seconds.
pub trait SynthEngine {
    fn current_time(&self) -> f64;

    fn trigger_note_at(
        &mut self,
        instrument: Instrument,
        pitch: NoteName,
        duration: f64,
        time: f64,
    ) -> Result<()>;

    /// Drops every trigger that has been scheduled but has not sounded yet.
    fn cancel_pending(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayRequest {
    Track(TrackId),
    AllTracks,
    /// Curves of the current track plus the stroke being drawn.
    CurrentCurves,
    Curve { track: TrackId, index: usize },
    AllCurves,
    Note { track: TrackId, index: usize },
    /// Plays a free-floating frequency, snapped to the note table.
    Pitch { instrument: Instrument, frequency: f64 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScheduleReport {
    pub scheduled: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Engine time at which the last scheduled trigger ends.
    pub last_release: f64,
}

/// Issues the triggers of one playback batch, all relative to a common
/// start time. A failing trigger is logged and the batch carries on.
pub struct Scheduler<'a, E: SynthEngine + ?Sized> {
    engine: &'a mut E,
    settings: &'a Settings,
    canvas: CanvasSize,
    start: f64,
    report: ScheduleReport,
}

impl<'a, E: SynthEngine + ?Sized> Scheduler<'a, E> {
    pub fn new(engine: &'a mut E, settings: &'a Settings, canvas: CanvasSize) -> Self {
        let start = engine.current_time();
        Self::starting_at(engine, settings, canvas, start)
    }

    pub fn starting_at(
        engine: &'a mut E,
        settings: &'a Settings,
        canvas: CanvasSize,
        start: f64,
    ) -> Self {
        Self {
            engine,
            settings,
            canvas,
            start,
            report: ScheduleReport {
                last_release: start,
                ..ScheduleReport::default()
            },
        }
    }

    fn trigger(&mut self, instrument: Instrument, pitch: NoteName, duration: f64, delay: f64) {
        if !duration.is_finite() || duration <= 0.0 || !delay.is_finite() {
            log::debug!("skipping {} at {}: invalid timing", pitch, delay);
            self.report.skipped += 1;
            return;
        }

        let time = self.start + delay;

        match self.engine.trigger_note_at(instrument, pitch, duration, time) {
            Ok(()) => {
                self.report.scheduled += 1;
                self.report.last_release = self.report.last_release.max(time + duration);
            }
            Err(err) => {
                log::error!("failed to trigger {} on {}: {}", pitch, instrument, err);
                self.report.failed += 1;
            }
        }
    }

    fn trigger_frequency(
        &mut self,
        instrument: Instrument,
        frequency: f64,
        duration: f64,
        delay: f64,
    ) {
        if !frequency.is_finite() {
            log::debug!("skipping non-finite frequency at {}", delay);
            self.report.skipped += 1;
            return;
        }

        self.trigger(instrument, closest_note(frequency), duration, delay);
    }

    pub fn note(&mut self, instrument: Instrument, note: &Note) {
        self.trigger(
            note.instrument.unwrap_or(instrument),
            note.pitch,
            note.duration,
            note.time,
        );
    }

    /// One short trigger per sample, placed by the sample's x position.
    pub fn points(&mut self, instrument: Instrument, points: &[Point]) {
        let curve = self.settings.curve;

        for point in sample_points(points, curve.density) {
            let delay = x_to_time(point.x, self.canvas.width, curve.duration);
            let frequency = y_to_frequency(point.y, curve.octave_range, self.canvas.height);
            self.trigger_frequency(instrument, frequency, CURVE_GATE, delay);
        }
    }

    pub fn curve(&mut self, curve: &Curve) {
        self.points(curve.instrument, &curve.points);
    }

    pub fn curves(&mut self, track: &Track) {
        for curve in &track.curves {
            self.curve(curve);
        }
    }

    pub fn track(&mut self, track: &Track) {
        for note in &track.notes {
            self.note(track.instrument, note);
        }

        self.curves(track);
    }

    /// A single note played right away, outside of any timeline.
    pub fn preview(&mut self, instrument: Instrument, pitch: NoteName, duration: f64) {
        let duration = if duration > 0.0 { duration } else { PREVIEW_GATE };
        self.trigger(instrument, pitch, duration, 0.0);
    }

    pub fn preview_frequency(&mut self, instrument: Instrument, frequency: f64) {
        self.trigger_frequency(instrument, frequency, PREVIEW_GATE, 0.0);
    }

    pub fn finish(self) -> ScheduleReport {
        self.report
    }
}

impl Sketchpad {
    /// Schedules `request` on `engine`, starting now.
    pub fn play<E: SynthEngine + ?Sized>(
        &self,
        request: PlayRequest,
        engine: &mut E,
    ) -> Result<ScheduleReport> {
        let project = self.project();
        let mut scheduler = Scheduler::new(engine, self.settings(), self.canvas());

        match request {
            PlayRequest::Track(id) => scheduler.track(project.track(id)?),
            PlayRequest::AllTracks => project
                .tracks()
                .iter()
                .for_each(|track| scheduler.track(track)),
            PlayRequest::CurrentCurves => {
                let track = project.track(self.current_track())?;
                scheduler.curves(track);

                if let Some(stroke) = self.stroke() {
                    scheduler.points(track.instrument, stroke);
                }
            }
            PlayRequest::Curve { track, index } => {
                scheduler.curve(project.track(track)?.curve(index)?)
            }
            PlayRequest::AllCurves => project
                .tracks()
                .iter()
                .for_each(|track| scheduler.curves(track)),
            PlayRequest::Note { track, index } => {
                let track = project.track(track)?;
                let note = track.note(index)?;
                let instrument = note.instrument.unwrap_or(track.instrument);
                scheduler.preview(instrument, note.pitch, note.duration);
            }
            PlayRequest::Pitch {
                instrument,
                frequency,
            } => scheduler.preview_frequency(instrument, frequency),
        }

        let report = scheduler.finish();

        log::info!(
            "{:?}: {} triggers scheduled, {} skipped, {} failed",
            request,
            report.scheduled,
            report.skipped,
            report.failed
        );

        Ok(report)
    }
}

/// One-shot readiness gate in front of the synth engine. Requests made
/// before the engine is ready are kept and handed back once it is.
pub enum AudioGate<E> {
    Idle,
    Pending(Vec<PlayRequest>),
    Ready(E),
}

#[derive(Debug, PartialEq)]
pub enum Admission {
    /// The engine is ready, play right away.
    Play(PlayRequest),
    /// Queued behind an initialization that is already running.
    Queued,
    /// Queued; the caller has to start initializing the engine.
    Initialize,
}

impl<E> AudioGate<E> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        match self {
            Self::Ready(engine) => Some(engine),
            _ => None,
        }
    }

    pub fn submit(&mut self, request: PlayRequest) -> Admission {
        match self {
            Self::Ready(_) => Admission::Play(request),
            Self::Pending(queue) => {
                queue.push(request);
                Admission::Queued
            }
            Self::Idle => {
                *self = Self::Pending(vec![request]);
                Admission::Initialize
            }
        }
    }

    /// Starts initializing without anything to play afterwards.
    pub fn warm_up(&mut self) -> bool {
        match self {
            Self::Idle => {
                *self = Self::Pending(Vec::new());
                true
            }
            _ => false,
        }
    }

    /// Marks the engine ready and returns the queued requests in order.
    pub fn open(&mut self, engine: E) -> Vec<PlayRequest> {
        match std::mem::replace(self, Self::Ready(engine)) {
            Self::Pending(queue) => queue,
            _ => Vec::new(),
        }
    }

    /// Initialization failed: forget the queue so a later request retries.
    pub fn fail(&mut self) {
        if let Self::Pending(queue) = self {
            log::warn!("dropping {} queued playback requests", queue.len());
        }

        *self = Self::Idle;
    }
}

impl<E: SynthEngine> AudioGate<E> {
    /// Silences the engine, or forgets what was queued for it while it is
    /// still starting up.
    pub fn stop(&mut self) {
        match self {
            Self::Ready(engine) => engine.cancel_pending(),
            Self::Pending(queue) => {
                log::debug!("stop dropped {} queued playback requests", queue.len());
                queue.clear();
            }
            Self::Idle => {}
        }
    }
}
