use thiserror::Error;

use crate::project::TrackId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SketchError {
    #[error("no track with id {0}")]
    UnknownTrack(TrackId),
    #[error("track {0} has no curve at index {1}")]
    UnknownCurve(TrackId, usize),
    #[error("track {0} has no note at index {1}")]
    UnknownNote(TrackId, usize),
    #[error("the first track cannot be removed")]
    FirstTrackLocked,
    #[error("no curve is being edited")]
    NoEditSession,
    #[error("custom shape needs the points captured when editing started")]
    MissingBaseline,
    #[error("invalid note: {0}")]
    InvalidNote(String),
    #[error("synth error: {0}")]
    Synth(String),
}

pub type Result<T> = std::result::Result<T, SketchError>;
