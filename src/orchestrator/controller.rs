//! Run lifecycle controller.
//!
//! Owns the selection validator, the presentation tree, the poller and the
//! compute task. UI layers send [`UiCommand`]s and observe [`ViewSnapshot`]s.

use super::machine::{transition, CoordinatorEvent, Effect, RunState};
use super::renderer;
use crate::engine::{AssetPoller, Backend, PollerHandle, RunEvent, TokenMint};
use crate::locations::LocationId;
use crate::model::{AssetDescriptor, RunRequest, RunResult};
use crate::presentation::Presentation;
use crate::selection::{Readiness, Selection, SelectionValidator};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    SetOrigin(Option<LocationId>),
    SetDestination(Option<LocationId>),
    SetCustomLat(String),
    SetCustomLon(String),
    Start,
    Reset,
    Quit,
}

/// Everything a presentation layer needs to draw one frame.
#[derive(Debug, Clone, Default)]
pub(crate) struct ViewSnapshot {
    pub state: RunState,
    pub selection: Selection,
    pub readiness: Readiness,
    pub view: Presentation,
    pub poller_active: bool,
    pub poll_ticks: u64,
    pub last_request: Option<RunRequest>,
    pub last_result: Option<RunResult>,
}

pub(crate) struct Coordinator {
    state: RunState,
    selection: SelectionValidator,
    view: Presentation,
    backend: Arc<dyn Backend>,
    poller: AssetPoller,
    active_poller: Option<PollerHandle>,
    compute: Option<JoinHandle<()>>,
    mint: Arc<TokenMint>,
    run_tx: UnboundedSender<RunEvent>,
    last_request: Option<RunRequest>,
    last_result: Option<RunResult>,
}

impl Coordinator {
    /// Build a coordinator plus the receiver its background work reports into.
    pub fn new(
        backend: Arc<dyn Backend>,
        assets: Arc<[AssetDescriptor]>,
        poll_interval: Duration,
    ) -> (Self, UnboundedReceiver<RunEvent>) {
        let (run_tx, run_rx) = mpsc::unbounded_channel();
        let mint = Arc::new(TokenMint::new());
        let view = Presentation::new(&assets);
        let poller = AssetPoller::new(backend.clone(), assets, mint.clone(), poll_interval);
        let coordinator = Self {
            state: RunState::Idle,
            selection: SelectionValidator::new(),
            view,
            backend,
            poller,
            active_poller: None,
            compute: None,
            mint,
            run_tx,
            last_request: None,
            last_result: None,
        };
        (coordinator, run_rx)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn view(&self) -> &Presentation {
        &self.view
    }

    pub fn poller_ticks(&self) -> Option<u64> {
        self.active_poller.as_ref().map(PollerHandle::ticks)
    }

    pub fn handle_command(&mut self, cmd: UiCommand) {
        match cmd {
            UiCommand::SetOrigin(id) => {
                let update = self.selection.set_origin(id);
                self.dispatch(CoordinatorEvent::SelectionChanged(update));
            }
            UiCommand::SetDestination(id) => {
                let update = self.selection.set_destination(id);
                self.dispatch(CoordinatorEvent::SelectionChanged(update));
            }
            // Coordinates only matter at submission; they never change readiness.
            UiCommand::SetCustomLat(v) => {
                self.selection.set_custom_lat(v);
            }
            UiCommand::SetCustomLon(v) => {
                self.selection.set_custom_lon(v);
            }
            UiCommand::Start => {
                let submission = self.selection.submission();
                self.dispatch(CoordinatorEvent::StartRequested(submission));
                if self.state == RunState::Submitting {
                    self.dispatch(CoordinatorEvent::Dispatched);
                }
            }
            UiCommand::Reset => self.dispatch(CoordinatorEvent::ResetRequested),
            UiCommand::Quit => self.shutdown(),
        }
    }

    pub fn handle_run_event(&mut self, ev: RunEvent) {
        match ev {
            RunEvent::AssetReady {
                logical_name,
                token,
            } => {
                let n = self.view.apply_asset_ready(&logical_name, token);
                tracing::debug!(asset = %logical_name, %token, elements = n, "asset available");
            }
            RunEvent::ComputeSettled(outcome) => {
                self.compute = None;
                match &outcome {
                    Ok(r) => tracing::info!(route = r.route.as_deref().unwrap_or("-"), "run completed"),
                    Err(e) => tracing::warn!(error = %e, "run failed"),
                }
                self.dispatch(CoordinatorEvent::ComputeSettled(outcome));
            }
        }
    }

    fn dispatch(&mut self, event: CoordinatorEvent) {
        let from = self.state;
        let (next, effects) = transition(from, event);
        if next != from {
            tracing::debug!(?from, to = ?next, "run state transition");
        }
        self.state = next;
        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::SetVisible(panel, visible) => self.view.set_visible(panel, visible),
            Effect::ScrollTo(target) => self.view.scroll = target,
            Effect::Notify(msg) => {
                tracing::info!(notice = %msg, "user notice");
                self.view.notify(msg);
            }
            Effect::Status(msg) => self.view.status = msg,
            Effect::MarkAssetsPending => self.view.mark_assets_pending(),
            Effect::StartPoller => {
                // At most one poller, ever.
                self.stop_poller();
                self.active_poller = Some(self.poller.start(self.run_tx.clone()));
            }
            Effect::StopPoller => self.stop_poller(),
            Effect::Dispatch(request) => {
                let backend = self.backend.clone();
                let tx = self.run_tx.clone();
                let req = request.clone();
                self.compute = Some(tokio::spawn(async move {
                    let outcome = backend.compute(&req).await;
                    let _ = tx.send(RunEvent::ComputeSettled(outcome));
                }));
                self.last_request = Some(request);
                self.last_result = None;
            }
            Effect::Render(result) => {
                let token = renderer::render(&mut self.view, &result, &self.mint);
                tracing::debug!(%token, "final render applied");
                self.last_result = Some(*result);
            }
            Effect::ClearSelection => self.selection.reset(),
        }
    }

    fn stop_poller(&mut self) {
        if let Some(mut handle) = self.active_poller.take() {
            handle.stop();
        }
    }

    /// Stop background work. The compute request is abandoned, not awaited.
    pub fn shutdown(&mut self) {
        self.stop_poller();
        if let Some(task) = self.compute.take() {
            task.abort();
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            state: self.state,
            selection: self.selection.selection().clone(),
            readiness: self.selection.readiness(),
            view: self.view.clone(),
            poller_active: self.active_poller.as_ref().is_some_and(PollerHandle::is_active),
            poll_ticks: self.poller_ticks().unwrap_or(0),
            last_request: self.last_request.clone(),
            last_result: self.last_result.clone(),
        }
    }
}

/// Drive a coordinator from UI commands and background events until `Quit`
/// or until every command sender is gone.
pub(crate) async fn run_controller(
    backend: Arc<dyn Backend>,
    assets: Arc<[AssetDescriptor]>,
    poll_interval: Duration,
    view_tx: watch::Sender<ViewSnapshot>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let (mut coordinator, mut run_rx) = Coordinator::new(backend, assets, poll_interval);
    view_tx.send_replace(coordinator.snapshot());

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Quit) | None => break,
                    Some(cmd) => coordinator.handle_command(cmd),
                }
            }
            // Probe results and the compute outcome share this FIFO, so every probe
            // result that arrived before completion is applied before the final render.
            Some(ev) = run_rx.recv() => coordinator.handle_run_event(ev),
        }
        view_tx.send_replace(coordinator.snapshot());
    }

    coordinator.shutdown();
    view_tx.send_replace(coordinator.snapshot());
    Ok(())
}
