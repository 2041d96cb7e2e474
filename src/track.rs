use crate::audio::AudioSource;
use crate::state::TrackSnapshot;
use crate::volume;
use std::sync::Arc;

/// One catalog sound with its playback state. The audio handle is created
/// once at load time and owned here; `playing` implies `loaded`.
pub struct Track<S> {
    pub id: String,
    pub individual_volume: u8,
    pub playing: bool,
    pub loaded: bool,
    /// A start or stop is in flight on the handle; no second transition may
    /// begin until it resolves.
    pub pending: bool,
    handle: Option<Arc<S>>,
}

impl<S: AudioSource> Track<S> {
    pub fn loaded(id: String, source: S) -> Self {
        Self {
            id,
            individual_volume: 0,
            playing: false,
            loaded: true,
            pending: false,
            handle: Some(Arc::new(source)),
        }
    }

    pub fn unloaded(id: String) -> Self {
        Self {
            id,
            individual_volume: 0,
            playing: false,
            loaded: false,
            pending: false,
            handle: None,
        }
    }

    pub fn handle(&self) -> Option<Arc<S>> {
        self.handle.clone()
    }

    pub fn effective_volume(&self, master: u8) -> u8 {
        volume::effective(self.individual_volume, master)
    }

    /// Push the current effective volume onto the handle. Volume on a
    /// handle is independent of play/pause, so this is safe at any time;
    /// callers only invoke it for audible updates.
    pub fn push_volume(&self, master: u8) {
        if let Some(handle) = &self.handle {
            handle.set_volume(volume::gain(self.effective_volume(master)));
        }
    }

    pub fn snapshot(&self, master: u8) -> TrackSnapshot {
        TrackSnapshot {
            id: self.id.clone(),
            volume: self.individual_volume,
            playing: self.playing,
            loaded: self.loaded,
            effective_volume: self.effective_volume(master),
        }
    }
}
