use crate::error::RunError;
use crate::locations::LocationId;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    pub user_agent: String,
}

/// Body of `POST /compute`. Built once per submission and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub origin: LocationId,
    pub destination: LocationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_lat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_lon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_lat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_lon: Option<String>,
}

/// Per-algorithm statistics. Values are shown verbatim, never parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmStats {
    #[serde(deserialize_with = "display_string", default)]
    pub iterations: String,
    #[serde(deserialize_with = "display_string", default)]
    pub distance: String,
    #[serde(deserialize_with = "display_string", default)]
    pub time: String,
}

/// Response of `POST /compute`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default)]
    pub dijkstra: AlgorithmStats,
    #[serde(default)]
    pub astar: AlgorithmStats,
}

impl RunResult {
    /// Split a decoded response into the success and failure paths.
    pub fn into_outcome(self) -> Result<RunResult, RunError> {
        if self.success {
            Ok(self)
        } else {
            Err(RunError::Backend(self.error))
        }
    }
}

/// Keep any JSON scalar in its textual form; the backend sends iteration counts as numbers.
fn display_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// A visualization asset the backend writes while a run is in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub logical_name: String,
    /// Absolute URL without any cache-busting query.
    pub base_url: String,
    pub caption: String,
}

/// `(logical name, path on the server, caption)` for every asset the backend produces.
const ASSET_FILES: [(&str, &str, &str); 4] = [
    (
        "dijkstra_exploration",
        "/static/output/dijkstra_exploration.png",
        "Dijkstra exploration",
    ),
    ("dijkstra_path", "/static/output/dijkstra_path.png", "Dijkstra path"),
    (
        "astar_exploration",
        "/static/output/astar_exploration.png",
        "A* exploration",
    ),
    ("astar_path", "/static/output/astar_path.png", "A* path"),
];

/// Build the fixed asset table for a server. Shared read-only for the process lifetime.
pub fn asset_table(server_base: &str) -> Arc<[AssetDescriptor]> {
    let base = server_base.trim_end_matches('/');
    ASSET_FILES
        .iter()
        .map(|(name, path, caption)| AssetDescriptor {
            logical_name: (*name).to_string(),
            base_url: format!("{base}{path}"),
            caption: (*caption).to_string(),
        })
        .collect()
}
