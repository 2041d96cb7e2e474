use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{
    audio::AudioSource,
    catalog::{Catalog, Preset, SoundDef},
    error::MixerError,
    message::{Action, Message, Transition},
    state::{MixerSnapshot, TrackRegistry},
    volume,
};

/// The policy engine. Owns master volume and the track registry, serializes
/// play/pause transitions per track, and executes presets as bulk
/// transitions. Runs as a single task and never awaits the audio primitive
/// inline: transitions are spawned and report back through the engine
/// channel, so a second request for a busy track is rejected instead of
/// racing the first.
pub struct Mixer<S> {
    rx: Receiver<Message>,
    tx: Sender<Message>,
    clients: Vec<Sender<Message>>,
    master_volume: u8,
    registry: TrackRegistry<S>,
    presets: Vec<Preset>,
    resume_set: Vec<String>,
    timer: Option<JoinHandle<()>>,
}

impl<S: AudioSource> Mixer<S> {
    pub fn new<L>(catalog: Catalog, loader: L, rx: Receiver<Message>, tx: Sender<Message>) -> Self
    where
        L: FnMut(&SoundDef) -> Result<S, String>,
    {
        let registry = TrackRegistry::load(&catalog.sounds, loader);
        Self {
            rx,
            tx,
            clients: vec![],
            master_volume: volume::DEFAULT_MASTER_VOLUME,
            registry,
            presets: catalog.presets,
            resume_set: vec![],
            timer: None,
        }
    }

    pub fn snapshot(&self) -> MixerSnapshot {
        MixerSnapshot {
            master_volume: self.master_volume,
            tracks: self.registry.snapshot(self.master_volume),
        }
    }

    async fn notify_clients(&self, action: Result<Action, MixerError>) {
        for client in &self.clients {
            if let Err(e) = client.send(Message::Response(action.clone())).await {
                error!("Error sending response to client: {e}");
            }
        }
    }

    fn spawn_transition(&self, id: String, handle: Arc<S>, transition: Transition) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match transition {
                Transition::Start => handle.start().await,
                Transition::Stop => handle.stop().await,
            };
            let finished = Message::TransitionFinished {
                id,
                transition,
                result,
            };
            if let Err(e) = tx.send(finished).await {
                error!("Error sending transition result: {e}");
            }
        });
    }

    /// State changes only after the handle actually did: `playing` flips
    /// here, not at request time, and a failed leg leaves it untouched.
    async fn finish_transition(
        &mut self,
        id: String,
        transition: Transition,
        result: Result<(), String>,
    ) {
        let master = self.master_volume;
        let outcome = match self.registry.get_mut(&id) {
            None => return,
            Some(track) => {
                track.pending = false;
                match (transition, result) {
                    (Transition::Start, Ok(())) => {
                        track.playing = true;
                        // The volume may have moved while the start was in
                        // flight; the handle gets the current value.
                        track.push_volume(master);
                        Ok(Action::TrackStarted(id))
                    }
                    (Transition::Stop, Ok(())) => {
                        track.playing = false;
                        Ok(Action::TrackStopped(id))
                    }
                    (_, Err(reason)) => {
                        warn!("Playback transition failed for {id}: {reason}");
                        Err(MixerError::Playback { id, reason })
                    }
                }
            }
        };
        self.notify_clients(outcome).await;
    }

    fn toggle_track(&mut self, id: &str) -> Result<(), MixerError> {
        let master = self.master_volume;
        let mut spawn = None;
        match self.registry.get_mut(id) {
            None => return Err(MixerError::UnknownTrack(id.to_string())),
            Some(track) => {
                if !track.loaded {
                    warn!("Ignoring toggle for unloaded sound {id}");
                    return Err(MixerError::LoadFailure {
                        id: id.to_string(),
                        reason: "audio resource unavailable".to_string(),
                    });
                }
                if track.pending {
                    return Err(MixerError::OperationInProgress(id.to_string()));
                }
                let Some(handle) = track.handle() else {
                    return Ok(());
                };
                if track.playing {
                    if handle.is_paused() {
                        warn!("Handle for {id} already reports paused before stop");
                    }
                    track.pending = true;
                    spawn = Some((handle, Transition::Stop));
                } else {
                    // Starting a muted sound must make it audible.
                    if track.individual_volume == 0 {
                        track.individual_volume = volume::DEFAULT_TRACK_VOLUME;
                    }
                    track.push_volume(master);
                    track.pending = true;
                    spawn = Some((handle, Transition::Start));
                }
            }
        }
        if let Some((handle, transition)) = spawn {
            self.spawn_transition(id.to_string(), handle, transition);
        }
        Ok(())
    }

    async fn apply_preset(&mut self, preset: &Preset) {
        let master = self.master_volume;
        let mut failures = vec![];
        for id in preset.sounds.keys() {
            if self.registry.get(id).is_none() {
                warn!("Preset {} names unknown sound {id}", preset.name);
                failures.push(MixerError::UnknownTrack(id.clone()));
            }
        }
        let mut spawns = vec![];
        for id in self.registry.ids() {
            let Some(track) = self.registry.get_mut(&id) else {
                continue;
            };
            match preset.sounds.get(&id).copied() {
                Some(target) if target > 0 => {
                    if !track.loaded {
                        warn!("Preset {} skips unloaded sound {id}", preset.name);
                        failures.push(MixerError::LoadFailure {
                            id,
                            reason: "audio resource unavailable".to_string(),
                        });
                        continue;
                    }
                    if track.pending {
                        warn!("Preset {} skips {id}: transition in flight", preset.name);
                        failures.push(MixerError::OperationInProgress(id));
                        continue;
                    }
                    track.individual_volume = volume::clamp(target);
                    if track.playing {
                        // Already audible: take the new level, no restart.
                        track.push_volume(master);
                    } else if let Some(handle) = track.handle() {
                        track.push_volume(master);
                        track.pending = true;
                        spawns.push((id, handle, Transition::Start));
                    }
                }
                _ => {
                    // Sounds the preset does not name (or names at zero)
                    // are silenced.
                    track.individual_volume = 0;
                    if !track.playing {
                        continue;
                    }
                    if track.pending {
                        warn!("Preset {} skips stop of {id}: transition in flight", preset.name);
                        continue;
                    }
                    if let Some(handle) = track.handle() {
                        track.pending = true;
                        spawns.push((id, handle, Transition::Stop));
                    }
                }
            }
        }
        for (id, handle, transition) in spawns {
            self.spawn_transition(id, handle, transition);
        }
        for failure in failures {
            self.notify_clients(Err(failure)).await;
        }
    }

    fn reset(&mut self) {
        self.master_volume = volume::DEFAULT_MASTER_VOLUME;
        self.resume_set.clear();
        let mut spawns = vec![];
        for id in self.registry.ids() {
            let Some(track) = self.registry.get_mut(&id) else {
                continue;
            };
            track.individual_volume = 0;
            if !track.playing {
                continue;
            }
            if track.pending {
                warn!("Reset skips stop of {id}: transition in flight");
                continue;
            }
            if let Some(handle) = track.handle() {
                track.pending = true;
                spawns.push((id, handle, Transition::Stop));
            }
        }
        for (id, handle, transition) in spawns {
            self.spawn_transition(id, handle, transition);
        }
    }

    /// Stop everything currently audible and remember it for resume.
    fn pause_all(&mut self) {
        let mut spawns = vec![];
        let mut stopped = vec![];
        for id in self.registry.ids() {
            let Some(track) = self.registry.get_mut(&id) else {
                continue;
            };
            if !track.playing || track.pending {
                continue;
            }
            if let Some(handle) = track.handle() {
                track.pending = true;
                stopped.push(id.clone());
                spawns.push((id, handle, Transition::Stop));
            }
        }
        if !stopped.is_empty() {
            self.resume_set = stopped;
        }
        for (id, handle, transition) in spawns {
            self.spawn_transition(id, handle, transition);
        }
    }

    fn resume_all(&mut self) {
        let master = self.master_volume;
        let targets: Vec<String> = if self.resume_set.is_empty() {
            self.registry
                .all()
                .filter(|t| t.loaded && t.individual_volume > 0)
                .map(|t| t.id.clone())
                .collect()
        } else {
            std::mem::take(&mut self.resume_set)
        };
        let mut spawns = vec![];
        for id in targets {
            let Some(track) = self.registry.get_mut(&id) else {
                continue;
            };
            if !track.loaded || track.playing || track.pending || track.individual_volume == 0 {
                continue;
            }
            if let Some(handle) = track.handle() {
                track.push_volume(master);
                track.pending = true;
                spawns.push((id, handle, Transition::Start));
            }
        }
        for (id, handle, transition) in spawns {
            self.spawn_transition(id, handle, transition);
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }

    fn start_timer(&mut self, minutes: u64) {
        self.cancel_timer();
        let tx = self.tx.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(minutes * 60)).await;
            if let Err(e) = tx.send(Message::TimerFired).await {
                error!("Error sending timer expiry: {e}");
            }
        }));
    }

    async fn handle_request(&mut self, a: Action) {
        match a {
            Action::Quit => {}
            Action::ToggleTrack(ref id) => {
                // Acknowledged by TrackStarted/TrackStopped once the
                // transition resolves.
                if let Err(e) = self.toggle_track(id) {
                    self.notify_clients(Err(e)).await;
                }
                return;
            }
            Action::TrackVolume(ref id, level) => {
                let master = self.master_volume;
                let clamped = volume::clamp(level);
                match self.registry.get_mut(id) {
                    None => {
                        self.notify_clients(Err(MixerError::UnknownTrack(id.clone())))
                            .await;
                        return;
                    }
                    Some(track) => {
                        track.individual_volume = clamped;
                        if track.playing {
                            track.push_volume(master);
                        }
                    }
                }
                self.notify_clients(Ok(Action::TrackVolume(id.clone(), clamped)))
                    .await;
                return;
            }
            Action::MasterVolume(level) => {
                self.master_volume = volume::clamp(level);
                // Paused tracks keep their stored volume; it is recomputed
                // at their next start.
                for track in self.registry.all() {
                    if track.playing {
                        track.push_volume(self.master_volume);
                    }
                }
                self.notify_clients(Ok(Action::MasterVolume(self.master_volume)))
                    .await;
                return;
            }
            Action::ApplyPreset(ref preset) => {
                info!("Applying preset {}", preset.name);
                self.apply_preset(preset).await;
            }
            Action::Reset => {
                self.reset();
            }
            Action::TogglePlayback => {
                let any_playing = self.registry.all().any(|t| t.playing && !t.pending);
                if any_playing {
                    self.pause_all();
                } else {
                    self.resume_all();
                }
            }
            Action::GetState => {
                self.notify_clients(Ok(Action::State(self.snapshot()))).await;
                return;
            }
            Action::SavePreset(ref name) => {
                let sounds = self
                    .registry
                    .all()
                    .filter(|t| t.individual_volume > 0)
                    .map(|t| (t.id.clone(), t.individual_volume))
                    .collect();
                let preset = Preset {
                    name: name.clone(),
                    sounds,
                };
                match self.presets.iter_mut().find(|p| &p.name == name) {
                    Some(existing) => *existing = preset.clone(),
                    None => self.presets.push(preset.clone()),
                }
                self.notify_clients(Ok(Action::PresetSaved(preset))).await;
                return;
            }
            Action::GetPresets => {
                self.notify_clients(Ok(Action::Presets(self.presets.clone())))
                    .await;
                return;
            }
            Action::StartTimer { minutes } => {
                self.start_timer(minutes);
            }
            Action::CancelTimer => {
                self.cancel_timer();
            }
            Action::TrackStarted(_)
            | Action::TrackStopped(_)
            | Action::State(_)
            | Action::PresetSaved(_)
            | Action::Presets(_)
            | Action::TimerExpired => return,
        }
        self.notify_clients(Ok(a.clone())).await;
    }

    pub async fn work(&mut self) {
        info!("Mixer started");
        while let Some(message) = self.rx.recv().await {
            match message {
                Message::Channel(s) => {
                    self.clients.push(s);
                }
                Message::Request(Action::Quit) => {
                    self.cancel_timer();
                    self.notify_clients(Ok(Action::Quit)).await;
                    break;
                }
                Message::Request(a) => {
                    self.handle_request(a).await;
                }
                Message::TransitionFinished {
                    id,
                    transition,
                    result,
                } => {
                    self.finish_transition(id, transition, result).await;
                }
                Message::TimerFired => {
                    self.timer = None;
                    self.pause_all();
                    self.notify_clients(Ok(Action::TimerExpired)).await;
                }
                _ => {}
            }
        }
    }
}
