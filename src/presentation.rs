//! Presentation tree shared by the coordinator, the poller writes and the renderer.
//!
//! Visibility flags are only touched through coordinator effects; asset
//! elements are written by both poll results and the final render.

use crate::engine::CacheToken;
use crate::model::{AlgorithmStats, AssetDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    CustomCoords,
    Guidance,
    Loading,
    Results,
}

/// Section the view should bring into focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollTarget {
    #[default]
    Top,
    Guidance,
    Loading,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetElement {
    pub logical_name: String,
    pub src: String,
    /// Dimmed while the asset may still be stale.
    pub pending: bool,
    pub caption: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatFields {
    pub dijkstra: AlgorithmStats,
    pub astar: AlgorithmStats,
}

#[derive(Debug, Clone, Default)]
pub struct Presentation {
    pub custom_visible: bool,
    pub guidance_visible: bool,
    pub loading_visible: bool,
    pub results_visible: bool,
    pub assets: Vec<AssetElement>,
    pub stats: StatFields,
    pub route: Option<String>,
    pub scroll: ScrollTarget,
    /// User-facing alerts, oldest first.
    pub notices: Vec<String>,
    pub status: String,
}

impl Presentation {
    /// One element per descriptor, showing the undecorated URL.
    pub fn new(assets: &[AssetDescriptor]) -> Self {
        Self {
            assets: assets
                .iter()
                .map(|a| AssetElement {
                    logical_name: a.logical_name.clone(),
                    src: a.base_url.clone(),
                    pending: false,
                    caption: a.caption.clone(),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn set_visible(&mut self, panel: Panel, visible: bool) {
        match panel {
            Panel::CustomCoords => self.custom_visible = visible,
            Panel::Guidance => self.guidance_visible = visible,
            Panel::Loading => self.loading_visible = visible,
            Panel::Results => self.results_visible = visible,
        }
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        match panel {
            Panel::CustomCoords => self.custom_visible,
            Panel::Guidance => self.guidance_visible,
            Panel::Loading => self.loading_visible,
            Panel::Results => self.results_visible,
        }
    }

    pub fn mark_assets_pending(&mut self) {
        for el in &mut self.assets {
            el.pending = true;
        }
    }

    /// Point every element bound to `logical_name` at the freshly tokened URL.
    /// Returns how many elements were rewritten.
    pub fn apply_asset_ready(&mut self, logical_name: &str, token: CacheToken) -> usize {
        let mut n = 0;
        for el in self.assets.iter_mut().filter(|el| el.logical_name == logical_name) {
            el.src = token.decorate(&el.src);
            el.pending = false;
            n += 1;
        }
        n
    }

    /// Rewrite every element with `token`, regardless of earlier writes.
    pub fn refresh_all_assets(&mut self, token: CacheToken) {
        for el in &mut self.assets {
            el.src = token.decorate(&el.src);
            el.pending = false;
        }
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notices.push(message.into());
    }

    pub fn last_notice(&self) -> Option<&str> {
        self.notices.last().map(String::as_str)
    }
}
