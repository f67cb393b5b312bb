use super::{Backend, CacheToken};
use crate::error::RunError;
use crate::model::{AssetDescriptor, RunConfig, RunRequest, RunResult};
use anyhow::{Context, Result};
use async_trait::async_trait;

/// `reqwest`-backed client for the route-finding server.
#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(cfg: &RunConfig) -> Result<Self> {
        // No request timeout: a slow compute simply keeps the run going.
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn compute_url(&self) -> String {
        format!("{}/compute", self.base_url)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn compute(&self, request: &RunRequest) -> Result<RunResult, RunError> {
        let url = self.compute_url();
        tracing::debug!(%url, origin = %request.origin, destination = %request.destination, "dispatching compute request");

        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| RunError::Transport(format!("{e:#}")))?;

        // Error statuses still carry a `success: false` body; the status is only the fallback.
        let status = resp.status();
        let result = resp.json::<RunResult>().await.map_err(|e| {
            if status.is_success() {
                RunError::Transport(format!("decode response: {e:#}"))
            } else {
                RunError::Transport(format!("http status {status}"))
            }
        })?;

        result.into_outcome()
    }

    async fn probe(&self, asset: &AssetDescriptor, token: CacheToken) -> bool {
        let url = token.decorate(&asset.base_url);
        match self.http.head(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::trace!(asset = %asset.logical_name, error = %e, "probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn compute_url_ignores_trailing_slash() {
        let cfg = RunConfig {
            base_url: "http://127.0.0.1:5000/".into(),
            poll_interval: Duration::from_secs(1),
            user_agent: "test".into(),
        };
        let backend = HttpBackend::new(&cfg).unwrap();
        assert_eq!(backend.compute_url(), "http://127.0.0.1:5000/compute");
    }
}
