use std::future::Future;

/// Per-sound playback primitive, provided by the platform integration.
///
/// `start` and `stop` arbitrate with the underlying device and may take a
/// while to resolve; volume is an independent axis and applies immediately,
/// even while a start or stop is pending.
pub trait AudioSource: Send + Sync + 'static {
    fn start(&self) -> impl Future<Output = Result<(), String>> + Send;
    fn stop(&self) -> impl Future<Output = Result<(), String>> + Send;

    /// Set playback gain in [0.0, 1.0].
    fn set_volume(&self, gain: f32);

    fn is_paused(&self) -> bool;
}
