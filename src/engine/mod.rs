//! Network side of a run: the compute call, asset probes and the poller that drives them.

mod client;
mod poller;
mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use client::HttpBackend;
pub use poller::{AssetPoller, PollerHandle};
pub use token::{CacheToken, TokenMint};

use crate::error::RunError;
use crate::model::{AssetDescriptor, RunRequest, RunResult};
use async_trait::async_trait;

/// Everything the coordinator needs from the route-finding server.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Run both algorithms. Resolves only once the server answers; there is no timeout.
    async fn compute(&self, request: &RunRequest) -> Result<RunResult, RunError>;

    /// Existence check for an asset, decorated with `token`. Failures are reported as `false`.
    async fn probe(&self, asset: &AssetDescriptor, token: CacheToken) -> bool;
}

/// Asynchronous results delivered to the coordinator while a run is active.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A probe found the asset; every element bound to `logical_name` may show it.
    AssetReady {
        logical_name: String,
        token: CacheToken,
    },
    /// The compute request settled.
    ComputeSettled(Result<RunResult, RunError>),
}
