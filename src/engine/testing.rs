//! In-memory backend for unit tests.

use super::{Backend, CacheToken};
use crate::error::RunError;
use crate::model::{AlgorithmStats, AssetDescriptor, RunRequest, RunResult};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

pub(crate) struct FakeBackend {
    available: Mutex<HashSet<String>>,
    outcome: Mutex<Result<RunResult, RunError>>,
    gated: bool,
    release: Notify,
    probes: AtomicUsize,
    requests: Mutex<Vec<RunRequest>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            available: Mutex::new(HashSet::new()),
            outcome: Mutex::new(Ok(sample_result())),
            gated: false,
            release: Notify::new(),
            probes: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl FakeBackend {
    /// Compute resolves immediately with `outcome`.
    pub fn with_outcome(outcome: Result<RunResult, RunError>) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            ..Default::default()
        }
    }

    /// Compute blocks until [`FakeBackend::release`] is called.
    pub fn gated(outcome: Result<RunResult, RunError>) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            gated: true,
            ..Default::default()
        }
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn make_available(&self, logical_name: &str) {
        self.available.lock().unwrap().insert(logical_name.to_string());
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RunRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn compute(&self, request: &RunRequest) -> Result<RunResult, RunError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.gated {
            self.release.notified().await;
        }
        self.outcome.lock().unwrap().clone()
    }

    async fn probe(&self, asset: &AssetDescriptor, _token: CacheToken) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.available.lock().unwrap().contains(&asset.logical_name)
    }
}

/// The scenario result used across coordinator tests.
pub(crate) fn sample_result() -> RunResult {
    RunResult {
        success: true,
        error: None,
        route: Some("Taksim Square → Galata Tower".into()),
        dijkstra: AlgorithmStats {
            iterations: "120".into(),
            distance: "45.2".into(),
            time: "3ms".into(),
        },
        astar: AlgorithmStats {
            iterations: "80".into(),
            distance: "45.2".into(),
            time: "2ms".into(),
        },
    }
}
