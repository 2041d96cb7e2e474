use crate::catalog::Preset;
use crate::error::MixerError;
use crate::state::MixerSnapshot;
use tokio::sync::mpsc::Sender;

/// Which leg of a play/pause transition a spawned task is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Start,
    Stop,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Quit,
    ToggleTrack(String),
    TrackVolume(String, u8),
    MasterVolume(u8),
    ApplyPreset(Preset),
    Reset,
    TogglePlayback,
    GetState,
    SavePreset(String),
    GetPresets,
    StartTimer { minutes: u64 },
    CancelTimer,

    // Response-only vocabulary.
    TrackStarted(String),
    TrackStopped(String),
    State(MixerSnapshot),
    PresetSaved(Preset),
    Presets(Vec<Preset>),
    TimerExpired,
}

#[derive(Clone, Debug)]
pub enum Message {
    Channel(Sender<Self>),
    Request(Action),
    Response(Result<Action, MixerError>),

    TransitionFinished {
        id: String,
        transition: Transition,
        result: Result<(), String>,
    },
    TimerFired,
}
