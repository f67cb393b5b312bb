//! Authoritative write of a completed run into the presentation tree.

use crate::engine::{CacheToken, TokenMint};
use crate::model::RunResult;
use crate::presentation::{Panel, Presentation, ScrollTarget};

/// Apply `result` and refresh every asset with one freshly minted token.
///
/// Callers stop the poller first, so this is the last write to every asset
/// element except for a probe that was already in flight.
pub(crate) fn render(view: &mut Presentation, result: &RunResult, mint: &TokenMint) -> CacheToken {
    view.stats.dijkstra = result.dijkstra.clone();
    view.stats.astar = result.astar.clone();
    view.route = result.route.clone();

    let token = mint.mint();
    view.refresh_all_assets(token);

    view.set_visible(Panel::Loading, false);
    view.scroll = ScrollTarget::Results;
    token
}
