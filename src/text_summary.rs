//! Text summary builder for CLI output.

use crate::model::AlgorithmStats;
use crate::presentation::Presentation;
use crate::storage::RunRecord;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

fn stats_row(name: &str, s: &AlgorithmStats) -> String {
    format!(
        "{:<10} {:>12} {:>12} {:>12}",
        name, s.iterations, s.distance, s.time
    )
}

/// Build a text summary from a completed run and the rendered view.
pub(crate) fn build_text_summary(record: &RunRecord, view: &Presentation) -> TextSummary {
    let mut lines = Vec::new();

    let route = record.result.route.clone().unwrap_or_else(|| {
        format!(
            "{} → {}",
            record.request.origin.label(),
            record.request.destination.label()
        )
    });
    lines.push(format!("Route: {route}"));
    lines.push(String::new());
    lines.push(format!(
        "{:<10} {:>12} {:>12} {:>12}",
        "Algorithm", "Iterations", "Distance", "Time"
    ));
    lines.push(stats_row("Dijkstra", &view.stats.dijkstra));
    lines.push(stats_row("A*", &view.stats.astar));

    if !view.assets.is_empty() {
        lines.push(String::new());
        lines.push("Visualizations:".into());
        for el in &view.assets {
            lines.push(format!("  {:<22} {}", el.caption, el.src));
        }
    }

    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::sample_result;
    use crate::engine::TokenMint;
    use crate::locations::LocationId;
    use crate::model::{asset_table, RunRequest};

    #[test]
    fn summary_lists_stats_and_assets() {
        let mint = TokenMint::new();
        let mut view = Presentation::new(&asset_table("http://h"));
        let result = sample_result();
        view.stats.dijkstra = result.dijkstra.clone();
        view.stats.astar = result.astar.clone();
        view.refresh_all_assets(mint.mint());

        let record = RunRecord::new(
            "http://h",
            RunRequest {
                origin: LocationId::Preset(1),
                destination: LocationId::Preset(3),
                origin_lat: None,
                origin_lon: None,
                dest_lat: None,
                dest_lon: None,
            },
            result,
        );
        let summary = build_text_summary(&record, &view);

        assert_eq!(summary.lines[0], "Route: Taksim Square → Galata Tower");
        let dijkstra = summary.lines.iter().find(|l| l.starts_with("Dijkstra")).unwrap();
        assert!(dijkstra.contains("120") && dijkstra.contains("45.2") && dijkstra.contains("3ms"));
        assert_eq!(summary.lines.iter().filter(|l| l.contains("?t=")).count(), 4);
    }
}
