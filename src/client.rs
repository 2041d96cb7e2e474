use crate::catalog::Preset;
use crate::error::MixerError;
use crate::message::{Action, Message};
use crate::state::MixerSnapshot;
use tokio::sync::mpsc::{Receiver, Sender, channel};

/// Async handle to a running mixer. Registers its own response channel and
/// exposes the operation set as methods; responses arrive through [`recv`].
///
/// [`recv`]: Client::recv
pub struct Client {
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl Client {
    pub async fn connect(tx: Sender<Message>) -> Self {
        let (client_tx, client_rx) = channel::<Message>(32);
        if tx.send(Message::Channel(client_tx)).await.is_err() {
            tracing::error!("Mixer is gone; client will receive nothing");
        }
        Self { tx, rx: client_rx }
    }

    pub async fn send(&self, action: Action) {
        let _ = self.tx.send(Message::Request(action)).await;
    }

    pub async fn toggle(&self, id: &str) {
        self.send(Action::ToggleTrack(id.to_string())).await;
    }

    pub async fn set_volume(&self, id: &str, level: u8) {
        self.send(Action::TrackVolume(id.to_string(), level)).await;
    }

    pub async fn set_master_volume(&self, level: u8) {
        self.send(Action::MasterVolume(level)).await;
    }

    pub async fn apply_preset(&self, preset: Preset) {
        self.send(Action::ApplyPreset(preset)).await;
    }

    pub async fn reset(&self) {
        self.send(Action::Reset).await;
    }

    pub async fn toggle_playback(&self) {
        self.send(Action::TogglePlayback).await;
    }

    pub async fn save_preset(&self, name: &str) {
        self.send(Action::SavePreset(name.to_string())).await;
    }

    pub async fn start_timer(&self, minutes: u64) {
        self.send(Action::StartTimer { minutes }).await;
    }

    pub async fn cancel_timer(&self) {
        self.send(Action::CancelTimer).await;
    }

    pub async fn quit(self) {
        self.send(Action::Quit).await;
    }

    /// Next response from the mixer; `None` once the mixer is gone.
    pub async fn recv(&mut self) -> Option<Result<Action, MixerError>> {
        while let Some(message) = self.rx.recv().await {
            if let Message::Response(response) = message {
                return Some(response);
            }
        }
        None
    }

    /// Request a state snapshot and wait for it, skipping unrelated
    /// responses that arrive in between.
    pub async fn snapshot(&mut self) -> Option<MixerSnapshot> {
        self.send(Action::GetState).await;
        while let Some(response) = self.recv().await {
            if let Ok(Action::State(snapshot)) = response {
                return Some(snapshot);
            }
        }
        None
    }

    /// List the mixer's presets, catalog-defined and saved ones alike.
    pub async fn presets(&mut self) -> Option<Vec<Preset>> {
        self.send(Action::GetPresets).await;
        while let Some(response) = self.recv().await {
            if let Ok(Action::Presets(presets)) = response {
                return Some(presets);
            }
        }
        None
    }
}
