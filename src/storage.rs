//! JSON export of completed runs.

use crate::model::{RunRequest, RunResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What gets written to disk for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp_utc: String,
    pub base_url: String,
    pub request: RunRequest,
    pub result: RunResult,
}

impl RunRecord {
    pub fn new(base_url: &str, request: RunRequest, result: RunResult) -> Self {
        Self {
            timestamp_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
            base_url: base_url.to_string(),
            request,
            result,
        }
    }

    /// `pathviz-<timestamp>-<origin>-<destination>.json`
    pub fn default_file_name(&self) -> String {
        format!(
            "pathviz-{}-{}-{}.json",
            self.timestamp_utc.replace(':', "-").replace('T', "_"),
            self.request.origin,
            self.request.destination
        )
    }
}

pub fn export_json(path: &Path, record: &RunRecord) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(record).context("serialize run record")?;
    std::fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Write to `path`, or to a timestamped file in the current directory.
/// Returns the absolute path written.
pub fn save_record(path: Option<&Path>, record: &RunRecord) -> Result<PathBuf> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()
            .context("get current directory")?
            .join(record.default_file_name()),
    };
    export_json(&target, record)?;
    Ok(std::fs::canonicalize(&target).unwrap_or(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::LocationId;

    fn record() -> RunRecord {
        RunRecord {
            timestamp_utc: "2026-10-19T08:30:00Z".into(),
            base_url: "http://127.0.0.1:5000".into(),
            request: RunRequest {
                origin: LocationId::Preset(1),
                destination: LocationId::Random,
                origin_lat: None,
                origin_lon: None,
                dest_lat: None,
                dest_lon: None,
            },
            result: RunResult {
                success: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn default_file_name_is_filesystem_safe() {
        assert_eq!(
            record().default_file_name(),
            "pathviz-2026-10-19_08-30-00Z-1-R.json"
        );
    }

    #[test]
    fn export_writes_readable_json() {
        let dir = std::env::temp_dir().join(format!("pathviz-test-{}", std::process::id()));
        let path = dir.join("nested").join("run.json");
        export_json(&path, &record()).unwrap();

        let back: RunRecord =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.request.destination, LocationId::Random);
        assert!(back.result.success);

        std::fs::remove_dir_all(dir).ok();
    }
}
