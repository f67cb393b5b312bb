use crate::engine::{Backend, HttpBackend};
use crate::locations::LocationId;
use crate::logging::{self, LogTarget};
use crate::model::{asset_table, RunConfig};
use crate::orchestrator::{Coordinator, RunState, UiCommand};
use crate::storage::{self, RunRecord};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "pathviz",
    version,
    about = "Race Dijkstra and A* on a route-finding server and watch the visualizations appear"
)]
pub struct Cli {
    /// Base URL of the route-finding server
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub base_url: String,

    /// Origin location id (1-20, R for random, C for custom)
    #[arg(long)]
    pub origin: Option<LocationId>,

    /// Destination location id (1-20, R for random, C for custom)
    #[arg(long)]
    pub destination: Option<LocationId>,

    /// Latitude used when either endpoint is C
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<String>,

    /// Longitude used when either endpoint is C
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<String>,

    /// How often to probe for visualization assets while a run is in flight
    #[arg(long, default_value = "1s", value_parser = parse_poll_interval)]
    pub poll_interval: humantime::Duration,

    /// Print the run as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print a text summary and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Write the completed run to this JSON file
    #[arg(long)]
    pub export_json: Option<std::path::PathBuf>,

    /// Print the selectable locations and exit
    #[arg(long)]
    pub list_locations: bool,

    /// Log level filter (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Append logs to this file (the TUI logs nowhere otherwise)
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,
}

/// Humantime duration that must be non-zero.
fn parse_poll_interval(s: &str) -> Result<humantime::Duration, String> {
    let d: humantime::Duration = s.parse().map_err(|e| format!("{e}"))?;
    if Duration::from(d).is_zero() {
        return Err("poll interval must be greater than zero".into());
    }
    Ok(d)
}

impl Cli {
    fn is_headless(&self) -> bool {
        self.json || self.text || cfg!(not(feature = "tui"))
    }
}

pub async fn run(args: Cli) -> Result<()> {
    if args.list_locations {
        for id in LocationId::all() {
            println!("{id:>2}  {}", id.label());
        }
        return Ok(());
    }

    if args.json && args.text {
        return Err(anyhow::anyhow!("--json and --text are mutually exclusive"));
    }

    let target = match (&args.log_file, args.is_headless()) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, true) => LogTarget::Stderr,
        (None, false) => LogTarget::Off,
    };
    logging::init(&args.log_level, target)?;

    if !args.is_headless() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
    }

    run_headless(args).await
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    RunConfig {
        base_url: args.base_url.trim_end_matches('/').to_string(),
        poll_interval: Duration::from(args.poll_interval),
        user_agent: format!("pathviz-cli/{}", env!("CARGO_PKG_VERSION")),
    }
}

/// Selection commands implied by the CLI flags, in the order a user would make them.
pub(crate) fn selection_commands(args: &Cli) -> Vec<UiCommand> {
    let mut cmds = Vec::new();
    if let Some(lat) = &args.lat {
        cmds.push(UiCommand::SetCustomLat(lat.clone()));
    }
    if let Some(lon) = &args.lon {
        cmds.push(UiCommand::SetCustomLon(lon.clone()));
    }
    if args.origin.is_some() {
        cmds.push(UiCommand::SetOrigin(args.origin));
    }
    if args.destination.is_some() {
        cmds.push(UiCommand::SetDestination(args.destination));
    }
    cmds
}

/// Drive one run without a terminal UI, reporting progress on stderr.
async fn run_headless(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&cfg)?);
    let assets = asset_table(&cfg.base_url);
    let (mut coordinator, mut run_rx) = Coordinator::new(backend, assets, cfg.poll_interval);
    let (out_tx, out_handle) = spawn_output_writer();

    let mut seen_notices = 0;
    let mut report = |c: &Coordinator, announced: &mut Vec<bool>| {
        let view = c.view();
        for notice in &view.notices[seen_notices..] {
            let _ = out_tx.send(OutputLine::Stderr(notice.clone()));
        }
        seen_notices = view.notices.len();
        for (el, done) in view.assets.iter().zip(announced.iter_mut()) {
            if c.state().is_busy() && !el.pending && !*done {
                *done = true;
                let _ = out_tx.send(OutputLine::Stderr(format!("Visualization ready: {}", el.caption)));
            }
        }
    };
    let mut announced = vec![false; coordinator.view().assets.len()];

    for cmd in selection_commands(&args) {
        coordinator.handle_command(cmd);
    }
    coordinator.handle_command(UiCommand::Start);
    report(&coordinator, &mut announced);

    let outcome = if coordinator.state().is_busy() {
        let _ = out_tx.send(OutputLine::Stderr("Computing routes…".into()));
        loop {
            tokio::select! {
                ev = run_rx.recv() => {
                    let Some(ev) = ev else { break Err(anyhow::anyhow!("run channel closed")) };
                    coordinator.handle_run_event(ev);
                    report(&coordinator, &mut announced);
                    if coordinator.state().is_settled() {
                        break Ok(());
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    break Err(anyhow::anyhow!("interrupted"));
                }
            }
        }
    } else {
        Err(anyhow::anyhow!(
            "run refused: {}",
            coordinator.view().last_notice().unwrap_or("selection incomplete")
        ))
    };
    coordinator.shutdown();

    let res = outcome.and_then(|()| finish_headless(&args, &cfg, &coordinator, &out_tx));

    drop(report);
    drop(out_tx);
    let _ = out_handle.await;
    res
}

fn finish_headless(
    args: &Cli,
    cfg: &RunConfig,
    coordinator: &Coordinator,
    out_tx: &mpsc::UnboundedSender<OutputLine>,
) -> Result<()> {
    let snap = coordinator.snapshot();
    if snap.state == RunState::Failed {
        return Err(anyhow::anyhow!(
            "{}",
            snap.view.last_notice().unwrap_or("run failed")
        ));
    }

    let request = snap.last_request.context("completed run without a request")?;
    let result = snap.last_result.context("completed run without a result")?;
    let record = RunRecord::new(&cfg.base_url, request, result);

    if let Some(path) = args.export_json.as_deref() {
        storage::export_json(path, &record)?;
        let _ = out_tx.send(OutputLine::Stderr(format!("Exported JSON: {}", path.display())));
    }

    if args.json {
        let _ = out_tx.send(OutputLine::Stdout(serde_json::to_string_pretty(&record)?));
    } else {
        let summary = crate::text_summary::build_text_summary(&record, &snap.view);
        for line in summary.lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }
    Ok(())
}
