use crate::locations::LocationId;
use crate::modal::ModalViewer;
use crate::orchestrator::{UiCommand, ViewSnapshot};
use crate::presentation::ScrollTarget;
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Origin,
    Destination,
    Latitude,
    Longitude,
    Assets,
}

/// Screen regions from the last frame, for mouse hit testing.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    pub modal: Option<Rect>,
    pub asset_rows: Vec<Rect>,
}

pub struct UiState {
    /// `None` placeholder first, then every location id.
    pub choices: Vec<Option<LocationId>>,
    pub focus: Focus,
    pub origin_cursor: usize,
    pub destination_cursor: usize,
    pub lat_input: String,
    pub lon_input: String,
    pub asset_cursor: usize,
    pub show_help: bool,
    pub modal: ModalViewer,
    /// Latest unacknowledged notice; any key dismisses it.
    pub alert: Option<String>,
    pub info: String,
    pub snapshot: ViewSnapshot,
    pub hits: HitMap,
    seen_notices: usize,
}

impl Default for UiState {
    fn default() -> Self {
        let mut choices = vec![None];
        choices.extend(LocationId::all().into_iter().map(Some));
        Self {
            choices,
            focus: Focus::Origin,
            origin_cursor: 0,
            destination_cursor: 0,
            lat_input: String::new(),
            lon_input: String::new(),
            asset_cursor: 0,
            show_help: false,
            modal: ModalViewer::new(),
            alert: None,
            info: String::new(),
            snapshot: ViewSnapshot::default(),
            hits: HitMap::default(),
            seen_notices: 0,
        }
    }
}

impl UiState {
    fn index_of(&self, id: Option<LocationId>) -> usize {
        self.choices.iter().position(|c| *c == id).unwrap_or(0)
    }

    /// Seed cursors and inputs from values passed on the command line.
    pub fn preselect(
        &mut self,
        origin: Option<LocationId>,
        destination: Option<LocationId>,
        lat: Option<&str>,
        lon: Option<&str>,
    ) {
        self.origin_cursor = self.index_of(origin);
        self.destination_cursor = self.index_of(destination);
        self.lat_input = lat.unwrap_or_default().to_string();
        self.lon_input = lon.unwrap_or_default().to_string();
    }

    pub fn apply_snapshot(&mut self, snap: ViewSnapshot) {
        let notices = snap.view.notices.len();
        if notices > self.seen_notices {
            self.alert = snap.view.last_notice().map(str::to_string);
            // A notice may come with the validator clearing a slot.
            self.origin_cursor = self.index_of(snap.selection.origin);
            self.destination_cursor = self.index_of(snap.selection.destination);
        }
        self.seen_notices = notices;

        if snap.view.scroll != self.snapshot.view.scroll {
            match snap.view.scroll {
                ScrollTarget::Top => self.focus = Focus::Origin,
                ScrollTarget::Results => self.focus = Focus::Assets,
                ScrollTarget::Guidance | ScrollTarget::Loading => {}
            }
        }

        if !snap.view.results_visible && self.focus == Focus::Assets {
            self.focus = Focus::Origin;
        }
        if !snap.view.custom_visible && matches!(self.focus, Focus::Latitude | Focus::Longitude) {
            self.focus = Focus::Destination;
        }
        self.asset_cursor = self
            .asset_cursor
            .min(snap.view.assets.len().saturating_sub(1));
        self.snapshot = snap;
    }

    fn focus_order(&self) -> Vec<Focus> {
        let mut order = vec![Focus::Origin, Focus::Destination];
        if self.snapshot.view.custom_visible {
            order.extend([Focus::Latitude, Focus::Longitude]);
        }
        if self.snapshot.view.results_visible {
            order.push(Focus::Assets);
        }
        order
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let i = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let n = order.len();
        let next = if forward { (i + 1) % n } else { (i + n - 1) % n };
        self.focus = order[next];
    }

    /// Move the focused cursor. Location lists only browse; see [`UiState::commit_cursor`].
    pub fn move_cursor(&mut self, delta: isize) {
        let n = self.choices.len() as isize;
        let step = |c: usize| ((c as isize + delta).rem_euclid(n)) as usize;
        match self.focus {
            Focus::Origin => self.origin_cursor = step(self.origin_cursor),
            Focus::Destination => self.destination_cursor = step(self.destination_cursor),
            Focus::Assets => {
                let len = self.snapshot.view.assets.len();
                if len > 0 {
                    self.asset_cursor =
                        ((self.asset_cursor as isize + delta).rem_euclid(len as isize)) as usize;
                }
            }
            Focus::Latitude | Focus::Longitude => {}
        }
    }

    /// Selection command for the highlighted entry of the focused list, when it
    /// differs from what the coordinator already holds.
    pub fn commit_cursor(&mut self) -> Option<UiCommand> {
        let selection = &self.snapshot.selection;
        match self.focus {
            Focus::Origin => {
                let id = self.choices[self.origin_cursor];
                (id != selection.origin).then_some(UiCommand::SetOrigin(id))
            }
            Focus::Destination => {
                let id = self.choices[self.destination_cursor];
                (id != selection.destination).then_some(UiCommand::SetDestination(id))
            }
            _ => None,
        }
    }

    pub fn is_editing_text(&self) -> bool {
        matches!(self.focus, Focus::Latitude | Focus::Longitude)
    }

    /// Append or delete in the focused coordinate field.
    pub fn edit_text(&mut self, ch: Option<char>) -> Option<UiCommand> {
        let buf = match self.focus {
            Focus::Latitude => &mut self.lat_input,
            Focus::Longitude => &mut self.lon_input,
            _ => return None,
        };
        match ch {
            Some(c) if c.is_ascii_digit() || c == '.' || c == '-' => buf.push(c),
            Some(_) => return None,
            None => {
                buf.pop();
            }
        }
        let value = buf.clone();
        Some(match self.focus {
            Focus::Latitude => UiCommand::SetCustomLat(value),
            _ => UiCommand::SetCustomLon(value),
        })
    }

    /// Local mirror of a reset; the coordinator clears its own selection.
    pub fn clear_inputs(&mut self) {
        self.origin_cursor = 0;
        self.destination_cursor = 0;
        self.lat_input.clear();
        self.lon_input.clear();
        self.asset_cursor = 0;
        self.focus = Focus::Origin;
    }
}
