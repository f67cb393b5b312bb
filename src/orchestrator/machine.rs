//! Run lifecycle as a pure transition function.
//!
//! `transition` never touches the presentation tree or spawns anything; it
//! returns the effects the coordinator must apply, in order.

use crate::error::{RunError, ValidationError};
use crate::model::{RunRequest, RunResult};
use crate::presentation::{Panel, ScrollTarget};
use crate::selection::SelectionUpdate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    AwaitingInput,
    /// Request built and effects applied; the compute call is being spawned.
    Submitting,
    Running,
    Completed,
    Failed,
}

impl RunState {
    pub fn is_busy(self) -> bool {
        matches!(self, RunState::Submitting | RunState::Running)
    }

    pub fn is_settled(self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }
}

#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    SelectionChanged(SelectionUpdate),
    StartRequested(Result<RunRequest, ValidationError>),
    /// The compute request has been handed to the runtime.
    Dispatched,
    ComputeSettled(Result<RunResult, RunError>),
    ResetRequested,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SetVisible(Panel, bool),
    ScrollTo(ScrollTarget),
    /// Alert the user.
    Notify(String),
    /// Non-modal status line.
    Status(String),
    MarkAssetsPending,
    StartPoller,
    StopPoller,
    Dispatch(RunRequest),
    Render(Box<RunResult>),
    ClearSelection,
}

pub fn transition(state: RunState, event: CoordinatorEvent) -> (RunState, Vec<Effect>) {
    use CoordinatorEvent as E;
    use Effect::*;

    match (state, event) {
        (s, E::SelectionChanged(update)) if s.is_busy() => {
            let mut fx = vec![SetVisible(Panel::CustomCoords, update.readiness.custom_visible)];
            if let Some(err) = update.rejected {
                fx.insert(0, Notify(err.to_string()));
            }
            (s, fx)
        }
        (_, E::SelectionChanged(update)) => {
            let mut fx = Vec::new();
            if let Some(err) = update.rejected {
                fx.push(Notify(err.to_string()));
            }
            fx.push(SetVisible(Panel::CustomCoords, update.readiness.custom_visible));
            fx.push(SetVisible(Panel::Guidance, update.readiness.ready));
            if update.became_ready {
                fx.push(ScrollTo(ScrollTarget::Guidance));
            }
            (RunState::AwaitingInput, fx)
        }

        (s, E::StartRequested(_)) if s.is_busy() => {
            (s, vec![Status("A run is already in progress".into())])
        }
        (s, E::StartRequested(Err(err))) => (s, vec![Notify(err.to_string())]),
        (_, E::StartRequested(Ok(request))) => (
            RunState::Submitting,
            vec![
                SetVisible(Panel::Guidance, false),
                SetVisible(Panel::Loading, true),
                ScrollTo(ScrollTarget::Loading),
                SetVisible(Panel::Results, true),
                MarkAssetsPending,
                Status("Computing routes…".into()),
                StartPoller,
                Dispatch(request),
            ],
        ),

        (RunState::Submitting, E::Dispatched) => (RunState::Running, Vec::new()),
        (s, E::Dispatched) => (s, Vec::new()),

        (RunState::Running, E::ComputeSettled(Ok(result))) => (
            RunState::Completed,
            vec![
                StopPoller,
                Render(Box::new(result)),
                SetVisible(Panel::Results, true),
                Status("Routes computed".into()),
            ],
        ),
        (RunState::Running, E::ComputeSettled(Err(err))) => (
            RunState::Failed,
            vec![
                StopPoller,
                Notify(err.user_message()),
                SetVisible(Panel::Loading, false),
                SetVisible(Panel::Results, false),
                SetVisible(Panel::Guidance, true),
                Status(err.to_string()),
            ],
        ),
        // A settle outside `Running` has no run to apply to.
        (s, E::ComputeSettled(_)) => (s, Vec::new()),

        (s, E::ResetRequested) if s.is_busy() => (
            s,
            vec![Status("Reset is unavailable while a run is in progress".into())],
        ),
        (_, E::ResetRequested) => (
            RunState::Idle,
            vec![
                ClearSelection,
                SetVisible(Panel::Results, false),
                SetVisible(Panel::CustomCoords, false),
                SetVisible(Panel::Guidance, false),
                SetVisible(Panel::Loading, false),
                ScrollTo(ScrollTarget::Top),
                Status(String::new()),
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::LocationId;
    use crate::selection::Readiness;

    fn request() -> RunRequest {
        RunRequest {
            origin: LocationId::Preset(1),
            destination: LocationId::Preset(2),
            origin_lat: None,
            origin_lon: None,
            dest_lat: None,
            dest_lon: None,
        }
    }

    fn update(ready: bool, became_ready: bool) -> SelectionUpdate {
        SelectionUpdate {
            readiness: Readiness {
                custom_visible: false,
                ready,
            },
            became_ready,
            rejected: None,
        }
    }

    fn position(fx: &[Effect], wanted: &Effect) -> usize {
        fx.iter().position(|e| e == wanted).expect("effect missing")
    }

    #[test]
    fn becoming_ready_reveals_and_focuses_guidance() {
        let (state, fx) = transition(RunState::Idle, CoordinatorEvent::SelectionChanged(update(true, true)));
        assert_eq!(state, RunState::AwaitingInput);
        assert!(fx.contains(&Effect::SetVisible(Panel::Guidance, true)));
        assert!(fx.contains(&Effect::ScrollTo(ScrollTarget::Guidance)));
    }

    #[test]
    fn not_ready_hides_guidance() {
        let (state, fx) =
            transition(RunState::AwaitingInput, CoordinatorEvent::SelectionChanged(update(false, false)));
        assert_eq!(state, RunState::AwaitingInput);
        assert!(fx.contains(&Effect::SetVisible(Panel::Guidance, false)));
        assert!(!fx.iter().any(|e| matches!(e, Effect::ScrollTo(_))));
    }

    #[test]
    fn rejected_selection_notifies_first() {
        let mut u = update(false, false);
        u.rejected = Some(ValidationError::DuplicateSelection);
        let (_, fx) = transition(RunState::AwaitingInput, CoordinatorEvent::SelectionChanged(u));
        assert_eq!(fx[0], Effect::Notify("Pick different locations".into()));
    }

    #[test]
    fn start_orders_visibility_before_dispatch() {
        let (state, fx) = transition(
            RunState::AwaitingInput,
            CoordinatorEvent::StartRequested(Ok(request())),
        );
        assert_eq!(state, RunState::Submitting);

        let guidance = position(&fx, &Effect::SetVisible(Panel::Guidance, false));
        let loading = position(&fx, &Effect::SetVisible(Panel::Loading, true));
        let pending = position(&fx, &Effect::MarkAssetsPending);
        let poller = position(&fx, &Effect::StartPoller);
        let dispatch = position(&fx, &Effect::Dispatch(request()));
        assert!(guidance < loading && loading < pending && pending < poller && poller < dispatch);

        let (state, fx) = transition(state, CoordinatorEvent::Dispatched);
        assert_eq!(state, RunState::Running);
        assert!(fx.is_empty());
    }

    #[test]
    fn refused_start_keeps_state() {
        let (state, fx) = transition(
            RunState::AwaitingInput,
            CoordinatorEvent::StartRequested(Err(ValidationError::MissingCoordinates)),
        );
        assert_eq!(state, RunState::AwaitingInput);
        assert_eq!(fx, vec![Effect::Notify("Enter coordinates".into())]);
    }

    #[test]
    fn start_while_running_is_ignored() {
        let (state, fx) = transition(RunState::Running, CoordinatorEvent::StartRequested(Ok(request())));
        assert_eq!(state, RunState::Running);
        assert!(!fx.iter().any(|e| matches!(e, Effect::Dispatch(_) | Effect::StartPoller)));
    }

    #[test]
    fn completion_stops_poller_before_render() {
        let result = RunResult {
            success: true,
            ..Default::default()
        };
        let (state, fx) = transition(RunState::Running, CoordinatorEvent::ComputeSettled(Ok(result.clone())));
        assert_eq!(state, RunState::Completed);
        let stop = position(&fx, &Effect::StopPoller);
        let render = position(&fx, &Effect::Render(Box::new(result)));
        assert!(stop < render);
    }

    #[test]
    fn failure_restores_guidance() {
        let (state, fx) = transition(
            RunState::Running,
            CoordinatorEvent::ComputeSettled(Err(RunError::Backend(Some("no path".into())))),
        );
        assert_eq!(state, RunState::Failed);
        assert_eq!(fx[0], Effect::StopPoller);
        assert!(fx.contains(&Effect::Notify("Error: no path".into())));
        assert!(fx.contains(&Effect::SetVisible(Panel::Loading, false)));
        assert!(fx.contains(&Effect::SetVisible(Panel::Results, false)));
        assert!(fx.contains(&Effect::SetVisible(Panel::Guidance, true)));
        assert!(!fx.contains(&Effect::ClearSelection));
    }

    #[test]
    fn failed_run_can_be_retried() {
        let (state, fx) = transition(RunState::Failed, CoordinatorEvent::StartRequested(Ok(request())));
        assert_eq!(state, RunState::Submitting);
        assert!(fx.contains(&Effect::StartPoller));
    }

    #[test]
    fn reset_returns_to_idle_and_top() {
        let (state, fx) = transition(RunState::Completed, CoordinatorEvent::ResetRequested);
        assert_eq!(state, RunState::Idle);
        assert_eq!(fx[0], Effect::ClearSelection);
        assert!(fx.contains(&Effect::SetVisible(Panel::Results, false)));
        assert!(fx.contains(&Effect::ScrollTo(ScrollTarget::Top)));
    }

    #[test]
    fn reset_while_running_is_ignored() {
        let (state, fx) = transition(RunState::Running, CoordinatorEvent::ResetRequested);
        assert_eq!(state, RunState::Running);
        assert!(!fx.contains(&Effect::ClearSelection));
    }

    #[test]
    fn late_settle_is_dropped() {
        let (state, fx) = transition(
            RunState::Idle,
            CoordinatorEvent::ComputeSettled(Err(RunError::Transport("x".into()))),
        );
        assert_eq!(state, RunState::Idle);
        assert!(fx.is_empty());
    }
}
