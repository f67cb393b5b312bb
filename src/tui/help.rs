use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        key_line("q / Ctrl-C", 3, "Quit"),
        key_line("tab", 10, "Next field (shift-tab: previous)"),
        key_line("↑/↓ or k/j", 3, "Browse locations / visualizations"),
        key_line("space", 8, "Pick the highlighted location"),
        key_line("enter", 8, "Pick location, else start run (on a visualization: enlarge it)"),
        key_line("r", 12, "Reset selection"),
        key_line("s", 12, "Save last result as JSON"),
        key_line("?", 12, "Toggle this help"),
        Line::from(""),
        Line::from("Coordinate fields (custom location):"),
        key_line("0-9 . -", 6, "Type"),
        key_line("backspace", 4, "Delete"),
        Line::from(""),
        Line::from("Viewer:"),
        key_line("esc / x", 6, "Close (clicking outside also closes)"),
        key_line("y", 12, "Copy image URL to clipboard"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
