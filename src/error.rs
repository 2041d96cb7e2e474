use thiserror::Error;

/// Failures are local to one sound and never fatal to the mixer; bulk
/// operations continue past them.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MixerError {
    #[error("unknown sound: {0}")]
    UnknownTrack(String),

    #[error("sound '{id}' is not loaded: {reason}")]
    LoadFailure { id: String, reason: String },

    #[error("playback failed for '{id}': {reason}")]
    Playback { id: String, reason: String },

    #[error("a play/pause transition is already in flight for '{0}'")]
    OperationInProgress(String),
}
