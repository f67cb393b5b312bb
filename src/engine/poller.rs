use super::{Backend, RunEvent, TokenMint};
use crate::model::AssetDescriptor;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Speculatively probes the asset table while a run is in flight.
#[derive(Clone)]
pub struct AssetPoller {
    backend: Arc<dyn Backend>,
    assets: Arc<[AssetDescriptor]>,
    mint: Arc<TokenMint>,
    interval: Duration,
}

impl AssetPoller {
    pub fn new(
        backend: Arc<dyn Backend>,
        assets: Arc<[AssetDescriptor]>,
        mint: Arc<TokenMint>,
        interval: Duration,
    ) -> Self {
        Self {
            backend,
            assets,
            mint,
            interval,
        }
    }

    /// Start ticking. The first tick fires one interval from now.
    pub fn start(&self, event_tx: mpsc::UnboundedSender<RunEvent>) -> PollerHandle {
        let cancel = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicU64::new(0));
        let task = tokio::spawn(tick_loop(
            self.clone(),
            cancel.clone(),
            ticks.clone(),
            event_tx,
        ));
        tracing::debug!(interval_ms = self.interval.as_millis() as u64, "asset poller started");
        PollerHandle {
            cancel,
            ticks,
            task: Some(task),
        }
    }
}

async fn tick_loop(
    poller: AssetPoller,
    cancel: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    event_tx: mpsc::UnboundedSender<RunEvent>,
) {
    let mut timer = tokio::time::interval_at(Instant::now() + poller.interval, poller.interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        timer.tick().await;
        if cancel.load(Ordering::Acquire) {
            break;
        }
        let n = ticks.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::trace!(tick = n, "probing assets");

        for asset in poller.assets.iter() {
            let token = poller.mint.mint();
            let backend = poller.backend.clone();
            let asset = asset.clone();
            let tx = event_tx.clone();
            // Probes are detached: stopping the poller does not abort one already in flight.
            tokio::spawn(async move {
                if backend.probe(&asset, token).await {
                    let _ = tx.send(RunEvent::AssetReady {
                        logical_name: asset.logical_name,
                        token,
                    });
                }
            });
        }
    }
}

/// Owner handle for a running poller. Dropping it stops the poller.
pub struct PollerHandle {
    cancel: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Prevent any further tick. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.cancel.store(true, Ordering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(ticks = self.ticks(), "asset poller stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Number of ticks that have issued probes so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
