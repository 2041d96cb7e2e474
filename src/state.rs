use crate::audio::AudioSource;
use crate::catalog::SoundDef;
use crate::track::Track;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// Holds one [`Track`] per catalog entry, in catalog order. The key set is
/// fixed after load; a sound that failed to load stays registered but is
/// never playable.
pub struct TrackRegistry<S> {
    order: Vec<String>,
    tracks: HashMap<String, Track<S>>,
}

impl<S: AudioSource> TrackRegistry<S> {
    pub fn new() -> Self {
        Self {
            order: vec![],
            tracks: HashMap::new(),
        }
    }

    pub fn load<L>(sounds: &[SoundDef], mut loader: L) -> Self
    where
        L: FnMut(&SoundDef) -> Result<S, String>,
    {
        let mut registry = Self::new();
        for def in sounds {
            if registry.register(&def.id, loader(def)) {
                info!("Sound {} loaded from {}", def.name, def.file);
            } else {
                warn!("Could not load sound: {} from file: {}", def.name, def.file);
            }
        }
        registry
    }

    /// Attach the audio resource for `id`. Load failure is a reported
    /// boolean, not an error; one bad sound must not block the others.
    pub fn register(&mut self, id: &str, source: Result<S, String>) -> bool {
        if self.tracks.contains_key(id) {
            warn!("Duplicate sound id ignored: {id}");
            return false;
        }
        let track = match source {
            Ok(source) => Track::loaded(id.to_string(), source),
            Err(reason) => {
                warn!("Audio resource for {id} unavailable: {reason}");
                Track::unloaded(id.to_string())
            }
        };
        let loaded = track.loaded;
        self.order.push(id.to_string());
        self.tracks.insert(id.to_string(), track);
        loaded
    }

    pub fn get(&self, id: &str) -> Option<&Track<S>> {
        self.tracks.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Track<S>> {
        self.tracks.get_mut(id)
    }

    /// Catalog-order iteration, for preset and reset sweeps.
    pub fn all(&self) -> impl Iterator<Item = &Track<S>> {
        self.order.iter().filter_map(|id| self.tracks.get(id))
    }

    pub fn ids(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn snapshot(&self, master: u8) -> Vec<TrackSnapshot> {
        self.all().map(|track| track.snapshot(master)).collect()
    }
}

/// Read-only view of one track, safe to hand to a renderer.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct TrackSnapshot {
    pub id: String,
    pub volume: u8,
    pub playing: bool,
    pub loaded: bool,
    pub effective_volume: u8,
}

/// Read-only view of the whole mixer, the only read surface for a
/// presentation layer.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct MixerSnapshot {
    pub master_volume: u8,
    pub tracks: Vec<TrackSnapshot>,
}

impl MixerSnapshot {
    pub fn track(&self, id: &str) -> Option<&TrackSnapshot> {
        self.tracks.iter().find(|t| t.id == id)
    }
}
