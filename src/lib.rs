pub mod audio;
pub mod catalog;
pub mod client;
pub mod error;
pub mod logging;
pub mod message;
mod mixer;
pub mod state;
pub mod track;
pub mod volume;

pub use audio::AudioSource;
pub use catalog::{Catalog, Preset, SoundDef};
pub use client::Client;
pub use error::MixerError;
pub use state::{MixerSnapshot, TrackSnapshot};

use tokio::sync::mpsc::{Sender, channel};
use tokio::task::JoinHandle;

/// Load the catalog through `loader` and spawn the mixer work loop. The
/// returned sender is the write surface; register a response channel with
/// [`message::Message::Channel`] (or use [`Client`]) to observe results.
pub fn init<S, L>(
    catalog: Catalog,
    loader: L,
) -> (Sender<message::Message>, JoinHandle<()>)
where
    S: AudioSource,
    L: FnMut(&SoundDef) -> Result<S, String>,
{
    let (tx, rx) = channel::<message::Message>(32);
    let mut mixer = mixer::Mixer::new(catalog, loader, rx, tx.clone());
    let handle = tokio::spawn(async move {
        mixer.work().await;
    });
    (tx, handle)
}
