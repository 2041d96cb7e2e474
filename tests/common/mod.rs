#![allow(dead_code)]

use ambimix::message::Action;
use ambimix::{AudioSource, Catalog, Client, MixerError, MixerSnapshot};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Scriptable stand-in for the platform audio object: counts start/stop
/// calls, records the last gain, and can be gated or made to fail.
pub struct FakeInner {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    paused: AtomicBool,
    gain: Mutex<f32>,
    fail_start: bool,
    fail_stop: bool,
    pub start_gate: Option<Arc<Semaphore>>,
}

impl FakeInner {
    fn new(fail_start: bool, fail_stop: bool, gated: bool) -> Self {
        Self {
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            paused: AtomicBool::new(true),
            gain: Mutex::new(0.0),
            fail_start,
            fail_stop,
            start_gate: gated.then(|| Arc::new(Semaphore::new(0))),
        }
    }

    pub fn gain(&self) -> f32 {
        *self.gain.lock().unwrap()
    }

    pub fn release_start(&self) {
        if let Some(gate) = &self.start_gate {
            gate.add_permits(1);
        }
    }
}

pub struct FakeSource {
    inner: Arc<FakeInner>,
}

impl AudioSource for FakeSource {
    async fn start(&self) -> Result<(), String> {
        self.inner.starts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.inner.start_gate {
            let permit = gate.acquire().await.map_err(|e| e.to_string())?;
            permit.forget();
        }
        if self.inner.fail_start {
            return Err("device rejected start".to_string());
        }
        self.inner.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), String> {
        self.inner.stops.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_stop {
            return Err("device rejected stop".to_string());
        }
        self.inner.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn set_volume(&self, gain: f32) {
        *self.inner.gain.lock().unwrap() = gain;
    }

    fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RigConfig {
    pub load_failures: HashSet<&'static str>,
    pub start_failures: HashSet<&'static str>,
    pub gated_starts: HashSet<&'static str>,
}

pub struct Rig {
    pub client: Client,
    pub fakes: HashMap<String, Arc<FakeInner>>,
    _join: JoinHandle<()>,
}

pub async fn rig() -> Rig {
    rig_with(RigConfig::default()).await
}

pub async fn rig_with(config: RigConfig) -> Rig {
    ambimix::logging::init();
    let mut fakes = HashMap::new();
    let (tx, join) = ambimix::init(Catalog::default(), |def| {
        if config.load_failures.contains(def.id.as_str()) {
            return Err("resource missing".to_string());
        }
        let inner = Arc::new(FakeInner::new(
            config.start_failures.contains(def.id.as_str()),
            false,
            config.gated_starts.contains(def.id.as_str()),
        ));
        fakes.insert(def.id.clone(), inner.clone());
        Ok(FakeSource { inner })
    });
    let client = Client::connect(tx).await;
    Rig {
        client,
        fakes,
        _join: join,
    }
}

impl Rig {
    pub fn fake(&self, id: &str) -> &Arc<FakeInner> {
        &self.fakes[id]
    }

    /// Next response matching `pred`; everything else is discarded.
    pub async fn expect<F>(&mut self, pred: F) -> Result<Action, MixerError>
    where
        F: Fn(&Result<Action, MixerError>) -> bool,
    {
        self.expect_within(Duration::from_secs(5), pred).await
    }

    /// Like [`expect`] with an explicit window, for tests that run on
    /// paused time and have to outwait a virtual sleep.
    ///
    /// [`expect`]: Rig::expect
    pub async fn expect_within<F>(
        &mut self,
        limit: Duration,
        pred: F,
    ) -> Result<Action, MixerError>
    where
        F: Fn(&Result<Action, MixerError>) -> bool,
    {
        tokio::time::timeout(limit, async {
            loop {
                let response = self.client.recv().await.expect("mixer channel closed");
                if pred(&response) {
                    return response;
                }
            }
        })
        .await
        .expect("timed out waiting for mixer response")
    }

    pub async fn expect_started(&mut self, id: &str) {
        self.expect(|r| matches!(r, Ok(Action::TrackStarted(t)) if t == id))
            .await;
    }

    pub async fn expect_stopped(&mut self, id: &str) {
        self.expect(|r| matches!(r, Ok(Action::TrackStopped(t)) if t == id))
            .await;
    }

    pub async fn snapshot(&mut self) -> MixerSnapshot {
        self.client.snapshot().await.expect("mixer channel closed")
    }

    /// Poll the snapshot until `pred` holds.
    pub async fn wait_state<F>(&mut self, pred: F) -> MixerSnapshot
    where
        F: Fn(&MixerSnapshot) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let snapshot = self.snapshot().await;
                if pred(&snapshot) {
                    return snapshot;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for mixer state")
    }

    /// Wait for the fake to record at least `n` start calls.
    pub async fn wait_starts(&self, id: &str, n: usize) {
        let fake = self.fakes[id].clone();
        tokio::time::timeout(Duration::from_secs(5), async move {
            while fake.starts.load(Ordering::SeqCst) < n {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("timed out waiting for start call");
    }
}
