mod help;
mod state;

use crate::cli::{build_config, selection_commands, Cli};
use crate::engine::{Backend, HttpBackend};
use crate::locations::LocationId;
use crate::modal::{CloseReason, ModalEvent};
use crate::model::{asset_table, AlgorithmStats};
use crate::orchestrator::{self, RunState, UiCommand, ViewSnapshot};
use crate::presentation::{Panel, ScrollTarget};
use crate::storage::{self, RunRecord};
use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
    Terminal,
};
use state::{Focus, HitMap, UiState};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, OnceLock};
use std::{io, time::Duration, time::Instant};
use tokio::sync::{mpsc, watch};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&cfg)?);
    let assets = asset_table(&cfg.base_url);

    let (view_tx, view_rx) = watch::channel(ViewSnapshot::default());
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // Flags act as if the user had picked those entries first.
    for cmd in selection_commands(&args) {
        let _ = cmd_tx.send(cmd);
    }

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_args = args.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_args, view_rx, cmd_tx));

    let res =
        orchestrator::run_controller(backend, assets, cfg.poll_interval, view_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    args: Cli,
    mut view_rx: watch::Receiver<ViewSnapshot>,
    cmd_tx: mpsc::UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; the coordinator is reached through commands.
    let mut state = UiState::default();
    state.preselect(
        args.origin,
        args.destination,
        args.lat.as_deref(),
        args.lon.as_deref(),
    );

    let started = Instant::now();
    let tick_rate = Duration::from_millis(100);
    let mut last_tick: Option<Instant> = None;

    let res = loop {
        match view_rx.has_changed() {
            Ok(true) => {
                let snap = view_rx.borrow_and_update().clone();
                let was_completed = state.snapshot.state == RunState::Completed;
                state.apply_snapshot(snap);
                if !was_completed
                    && state.snapshot.state == RunState::Completed
                    && args.export_json.is_some()
                {
                    save_last_result(&args, &mut state);
                }
            }
            Ok(false) => {}
            // Controller is gone; nothing left to show.
            Err(_) => break Ok(()),
        }

        if last_tick.map_or(true, |t| t.elapsed() >= tick_rate) {
            let mut hits = HitMap::default();
            terminal
                .draw(|f| hits = draw(f.area(), f, &state, started.elapsed()))
                .ok();
            state.hits = hits;
            last_tick = Some(Instant::now());
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(k)) if k.kind == KeyEventKind::Press => {
                    if handle_key(&args, &mut state, &cmd_tx, k.modifiers, k.code) == Flow::Quit {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                }
                Ok(Event::Mouse(m)) => {
                    if m.kind == MouseEventKind::Down(MouseButton::Left) {
                        handle_click(&mut state, m.column, m.row);
                    }
                }
                _ => {}
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, DisableMouseCapture, LeaveAlternateScreen).ok();
    res
}

fn handle_key(
    args: &Cli,
    state: &mut UiState,
    cmd_tx: &mpsc::UnboundedSender<UiCommand>,
    modifiers: KeyModifiers,
    code: KeyCode,
) -> Flow {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Flow::Quit;
    }

    // Alerts block input until acknowledged.
    if state.alert.take().is_some() {
        return Flow::Continue;
    }

    if state.modal.is_open() {
        match code {
            KeyCode::Esc => {
                state.modal.handle(ModalEvent::CloseRequested(CloseReason::Escape));
            }
            KeyCode::Char('x') => {
                state
                    .modal
                    .handle(ModalEvent::CloseRequested(CloseReason::CloseControl));
            }
            KeyCode::Char('y') => {
                if let Some(content) = state.modal.content() {
                    state.info = match copy_to_clipboard(&content.src) {
                        Ok(()) => "✓ Copied image URL to clipboard".into(),
                        Err(e) => format!("Clipboard copy failed: {e:#}"),
                    };
                }
            }
            _ => {}
        }
        return Flow::Continue;
    }

    if state.show_help {
        if matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            state.show_help = false;
        }
        return Flow::Continue;
    }

    if state.is_editing_text() {
        match code {
            KeyCode::Char(c) => {
                if let Some(cmd) = state.edit_text(Some(c)) {
                    let _ = cmd_tx.send(cmd);
                }
                return Flow::Continue;
            }
            KeyCode::Backspace => {
                if let Some(cmd) = state.edit_text(None) {
                    let _ = cmd_tx.send(cmd);
                }
                return Flow::Continue;
            }
            _ => {}
        }
    }

    match code {
        KeyCode::Char('q') => return Flow::Quit,
        KeyCode::Char('?') => state.show_help = true,
        KeyCode::Tab => state.cycle_focus(true),
        KeyCode::BackTab => state.cycle_focus(false),
        KeyCode::Up | KeyCode::Char('k') => state.move_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => state.move_cursor(1),
        KeyCode::Char(' ') => {
            if let Some(cmd) = state.commit_cursor() {
                let _ = cmd_tx.send(cmd);
            }
        }
        // Enter picks the highlighted location first; on an unchanged pick it starts the run.
        KeyCode::Enter => {
            if let Some(cmd) = state.commit_cursor() {
                let _ = cmd_tx.send(cmd);
            } else if state.focus == Focus::Assets {
                open_selected_asset(state);
            } else {
                let _ = cmd_tx.send(UiCommand::Start);
            }
        }
        // Closing an already closed viewer is harmless.
        KeyCode::Esc => {
            state.modal.handle(ModalEvent::CloseRequested(CloseReason::Escape));
        }
        KeyCode::Char('r') => {
            if state.snapshot.state.is_busy() {
                state.info = "Reset is unavailable while a run is in progress".into();
            } else {
                state.clear_inputs();
                let _ = cmd_tx.send(UiCommand::Reset);
            }
        }
        KeyCode::Char('s') => save_last_result(args, state),
        _ => {}
    }
    Flow::Continue
}

fn handle_click(state: &mut UiState, x: u16, y: u16) {
    if state.modal.is_open() {
        if let Some(area) = state.hits.modal {
            if !contains(area, x, y) {
                state
                    .modal
                    .handle(ModalEvent::CloseRequested(CloseReason::Backdrop));
            }
        }
        return;
    }
    if state.alert.is_some() || state.show_help {
        return;
    }
    if let Some(i) = state.hits.asset_rows.iter().position(|r| contains(*r, x, y)) {
        state.asset_cursor = i;
        state.focus = Focus::Assets;
        open_selected_asset(state);
    }
}

fn open_selected_asset(state: &mut UiState) {
    if let Some(el) = state.snapshot.view.assets.get(state.asset_cursor).cloned() {
        state.modal.handle(ModalEvent::AssetActivated(el));
    }
}

fn save_last_result(args: &Cli, state: &mut UiState) {
    let snap = &state.snapshot;
    let (Some(request), Some(result)) = (snap.last_request.clone(), snap.last_result.clone())
    else {
        state.info = "No completed run to save yet.".into();
        return;
    };
    let record = RunRecord::new(&build_config(args).base_url, request, result);
    state.info = match storage::save_record(args.export_json.as_deref(), &record) {
        Ok(path) => format!("Saved: {}", path.display()),
        Err(e) => format!("Save failed: {e:#}"),
    };
}

fn contains(r: Rect, x: u16, y: u16) -> bool {
    x >= r.x && x < r.x.saturating_add(r.width) && y >= r.y && y < r.y.saturating_add(r.height)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

fn state_label(s: RunState) -> &'static str {
    match s {
        RunState::Idle => "idle",
        RunState::AwaitingInput => "selecting",
        RunState::Submitting => "submitting",
        RunState::Running => "running",
        RunState::Completed => "completed",
        RunState::Failed => "failed",
    }
}

fn section_block(title: String, highlighted: bool) -> Block<'static> {
    let color = if highlighted { Color::Yellow } else { Color::Gray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState, elapsed: Duration) -> HitMap {
    let view = &state.snapshot.view;
    let mut hits = HitMap::default();

    let guidance = view.is_visible(Panel::Guidance);
    let loading = view.is_visible(Panel::Loading);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(12),
            Constraint::Length(if guidance { 3 } else { 0 }),
            Constraint::Length(if loading { 3 } else { 0 }),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("pathviz", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
            Span::raw("  Dijkstra vs A*"),
        ])),
        chunks[0],
    );

    draw_selection(chunks[1], f, state);
    if guidance {
        draw_guidance(chunks[2], f, state);
    }
    if loading {
        draw_loading(chunks[3], f, state, elapsed);
    }
    if view.is_visible(Panel::Results) {
        hits.asset_rows = draw_results(chunks[4], f, state);
    }
    draw_status(chunks[5], f, state);

    if state.show_help {
        help::draw_help(centered(area, 64, 20), f);
    }
    if let Some(content) = state.modal.content() {
        let rect = centered(area, area.width.saturating_mul(7) / 10, 9);
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Image: ", Style::default().fg(Color::Gray)),
                Span::raw(content.src.clone()),
            ]),
            Line::from(""),
        ];
        if content.pending {
            lines.push(Line::styled(
                "Not generated yet; showing the last known image.",
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::styled(
            "esc / x close   y copy URL",
            Style::default().fg(Color::Magenta),
        ));
        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(section_block(content.caption.clone(), true)),
            rect,
        );
        hits.modal = Some(rect);
    }
    if let Some(alert) = state.alert.as_deref() {
        let rect = centered(area, 48, 5);
        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(vec![
                Line::from(alert.to_string()),
                Line::styled("press any key", Style::default().fg(Color::DarkGray)),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title("Notice"),
            ),
            rect,
        );
    }

    hits
}

/// `picked` marks the entry the coordinator currently holds.
fn location_item(choice: Option<LocationId>, picked: bool) -> ListItem<'static> {
    let mark = if picked { "●" } else { " " };
    match choice {
        Some(id) => ListItem::new(format!("{mark} {id:>2}  {}", id.label())),
        None => ListItem::new(Line::styled(
            format!("{mark} -- choose --"),
            Style::default().fg(Color::DarkGray),
        )),
    }
}

fn draw_location_list(
    area: Rect,
    f: &mut ratatui::Frame,
    state: &UiState,
    title: &str,
    (cursor, picked): (usize, Option<LocationId>),
    focused: bool,
) {
    let items: Vec<ListItem> = state
        .choices
        .iter()
        .map(|c| location_item(*c, *c == picked))
        .collect();
    let highlight = if focused {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let list = List::new(items)
        .block(section_block(title.to_string(), focused))
        .highlight_style(highlight);
    let mut list_state = ListState::default().with_selected(Some(cursor));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_selection(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let custom = state.snapshot.view.is_visible(Panel::CustomCoords);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(if custom { 35 } else { 50 }),
            Constraint::Percentage(if custom { 35 } else { 50 }),
            Constraint::Percentage(if custom { 30 } else { 0 }),
        ])
        .split(area);

    let selection = &state.snapshot.selection;
    draw_location_list(
        cols[0],
        f,
        state,
        "Origin",
        (state.origin_cursor, selection.origin),
        state.focus == Focus::Origin,
    );
    draw_location_list(
        cols[1],
        f,
        state,
        "Destination",
        (state.destination_cursor, selection.destination),
        state.focus == Focus::Destination,
    );

    if custom {
        let field = |label: &'static str, value: &str, focused: bool| {
            let style = if focused {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            let cursor = if focused { "▏" } else { "" };
            Line::from(vec![
                Span::styled(label, Style::default().fg(Color::Gray)),
                Span::styled(format!("{value}{cursor}"), style),
            ])
        };
        let editing = matches!(state.focus, Focus::Latitude | Focus::Longitude);
        let p = Paragraph::new(vec![
            field("Latitude:  ", &state.lat_input, state.focus == Focus::Latitude),
            field("Longitude: ", &state.lon_input, state.focus == Focus::Longitude),
            Line::from(""),
            Line::styled(
                "Used for every custom endpoint.",
                Style::default().fg(Color::DarkGray),
            ),
        ])
        .wrap(Wrap { trim: true })
        .block(section_block("Custom coordinates".into(), editing));
        f.render_widget(p, cols[2]);
    }
}

fn draw_guidance(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let sel = &state.snapshot.selection;
    let label = |id: Option<LocationId>| id.map(LocationId::label).unwrap_or_default();
    let p = Paragraph::new(Line::from(vec![
        Span::raw(format!("{} → {}   ", label(sel.origin), label(sel.destination))),
        Span::styled("Press enter to compute both routes", Style::default().fg(Color::Green)),
    ]))
    .block(section_block(
        "Ready".into(),
        state.snapshot.view.scroll == ScrollTarget::Guidance,
    ));
    f.render_widget(p, area);
}

fn draw_loading(area: Rect, f: &mut ratatui::Frame, state: &UiState, elapsed: Duration) {
    let snap = &state.snapshot;
    let frame = SPINNER[(elapsed.as_millis() / 100) as usize % SPINNER.len()];
    let ready = snap.view.assets.iter().filter(|el| !el.pending).count();
    let p = Paragraph::new(Line::from(vec![
        Span::styled(frame, Style::default().fg(Color::Yellow)),
        Span::raw(format!(
            " Computing routes…  {ready}/{} visualizations ready, {} probe rounds",
            snap.view.assets.len(),
            snap.poll_ticks
        )),
    ]))
    .block(section_block(
        "Running".into(),
        snap.view.scroll == ScrollTarget::Loading,
    ));
    f.render_widget(p, area);
}

fn stats_rows(d: &AlgorithmStats, a: &AlgorithmStats) -> Vec<Row<'static>> {
    vec![
        Row::new(vec!["Iterations".to_string(), d.iterations.clone(), a.iterations.clone()]),
        Row::new(vec!["Distance".to_string(), d.distance.clone(), a.distance.clone()]),
        Row::new(vec!["Time".to_string(), d.time.clone(), a.time.clone()]),
    ]
}

/// Returns the screen row of every asset element, in element order.
fn draw_results(area: Rect, f: &mut ratatui::Frame, state: &UiState) -> Vec<Rect> {
    let view = &state.snapshot.view;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let title = match view.route.as_deref() {
        Some(route) => format!("Results: {route}"),
        None => "Results".to_string(),
    };
    let table = Table::new(
        stats_rows(&view.stats.dijkstra, &view.stats.astar),
        [Constraint::Length(12), Constraint::Min(8), Constraint::Min(8)],
    )
    .header(
        Row::new(vec!["", "Dijkstra", "A*"])
            .style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
    )
    .block(section_block(title, view.scroll == ScrollTarget::Results));
    f.render_widget(table, cols[0]);

    let block = section_block(
        "Visualizations (enter or click to enlarge, r to reset)".into(),
        state.focus == Focus::Assets,
    );
    let inner = block.inner(cols[1]);
    f.render_widget(block, cols[1]);

    let mut rows = Vec::with_capacity(view.assets.len());
    for (i, el) in view.assets.iter().enumerate() {
        if i as u16 >= inner.height {
            break;
        }
        let row = Rect {
            x: inner.x,
            y: inner.y + i as u16,
            width: inner.width,
            height: 1,
        };
        let (marker, status_style) = if el.pending {
            ("…", Style::default().fg(Color::DarkGray))
        } else {
            ("✓", Style::default().fg(Color::Green))
        };
        let mut line = Line::from(vec![
            Span::styled(format!("{marker} "), status_style),
            Span::styled(format!("{:<22}", el.caption), status_style),
            Span::styled(el.src.clone(), Style::default().fg(Color::Gray)),
        ]);
        if state.focus == Focus::Assets && i == state.asset_cursor {
            line = line.style(Style::default().add_modifier(Modifier::REVERSED));
        }
        f.render_widget(Paragraph::new(line), row);
        rows.push(row);
    }
    rows
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let snap = &state.snapshot;
    let message = if state.info.is_empty() {
        snap.view.status.as_str()
    } else {
        state.info.as_str()
    };
    let p = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("[{}] ", state_label(snap.state)),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(message.to_string()),
        Span::styled("   ? help  q quit", Style::default().fg(Color::DarkGray)),
    ]));
    f.render_widget(p, area);
}

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Initialize the clipboard manager thread if not already initialized.
/// The thread keeps each clipboard instance alive long enough for clipboard
/// managers on Linux to read it.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                if let Ok(mut clipboard) = Clipboard::new() {
                    if clipboard.set_text(&text).is_ok() {
                        std::thread::sleep(Duration::from_secs(2));
                    }
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue `text` for the clipboard without blocking the UI thread.
fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}
