use crate::app::{App, ControlFocus};
use crate::ui::widgets::chord::render_chord;
use crate::ui::widgets::flows::render_flows;
use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use chord_core::PlaybackMode;
use chord_flows_tui::search::rank_entities;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, LineGauge, Paragraph, Wrap};
use ratatui::Frame;

const SEARCH_RESULTS: usize = 12;

pub fn render_main(app: &App, f: &mut Frame<'_>) {
    let area = f.area();
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Controls
            Constraint::Length(3), // Period slider
            Constraint::Min(8),    // Chart and flows
            Constraint::Length(3), // Status
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(area.inner(Margin::new(1, 0)));

    render_controls(app, f, main_layout[0]);
    render_slider(app, f, main_layout[1]);
    render_content(app, f, main_layout[2]);
    render_status_section(app, f, main_layout[3]);
    render_shortcuts(f, main_layout[4]);

    if app.show_help {
        render_help_popup(f, area);
    } else if app.search.is_some() {
        render_search_popup(app, f, area);
    }
}

fn render_controls(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Cross-border flows ")
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let selection = app.controls.selection();
    let entity = app
        .controls
        .entity_options()
        .get(app.controls.entity_option_index())
        .map_or_else(|| selection.focal_entity.to_string(), |o| o.label.clone());
    let play_label = app.playback_mode().toggle_label();

    let mut spans = Vec::new();
    for focus in ControlFocus::ALL {
        let value = match focus {
            ControlFocus::Mode => selection.mode.clone(),
            ControlFocus::Entity => entity.clone(),
            ControlFocus::Period => app.period_labels().current,
            ControlFocus::Play => format!("[{play_label}]"),
        };
        spans.push(Span::styled(
            format!("{}: ", focus.label()),
            Style::default().fg(Color::Gray),
        ));
        let mut style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        if app.focus == focus {
            style = style.fg(Color::Black).bg(Color::Cyan);
        }
        spans.push(Span::styled(value, style));
        spans.push(Span::raw("   "));
    }

    let paragraph = Paragraph::new(TextLine::from(spans)).block(block);
    f.render_widget(paragraph, area);
}

fn render_slider(app: &App, f: &mut Frame<'_>, area: Rect) {
    let labels = app.period_labels();
    let bounds = app.controls.bounds();
    let index = app.controls.selection().period_index;
    let ratio = if bounds.max == 0 {
        1.0
    } else {
        index as f64 / bounds.max as f64
    };

    let border = if app.focus == ControlFocus::Period {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(format!(" {} ", labels.start))
        .title_top(TextLine::from(format!(" {} ", labels.end)).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let gauge = LineGauge::default()
        .block(block)
        .filled_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .unfilled_style(Style::default().fg(Color::DarkGray))
        .label(format!("{:>8}", labels.current))
        .ratio(ratio.clamp(0.0, 1.0));
    f.render_widget(gauge, area);
}

fn render_content(app: &App, f: &mut Frame<'_>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    render_chord(app.scene.as_ref(), f, chunks[0]);
    let caption = app.dataset.measure_caption();
    render_flows(
        app.scene.as_ref(),
        caption.as_deref(),
        app.flow_offset,
        f,
        chunks[1],
    );
}

fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let status_block = Block::default()
        .title(" Status ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let status_text = if app.status_message.is_empty() {
        let hint = match app.playback_mode() {
            PlaybackMode::Running => "Playing",
            PlaybackMode::Stopped => "",
        };
        Text::from(Span::styled(hint, Style::default().fg(Color::Gray)))
    } else {
        let style = if app.status_message.starts_with("Error") {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };

        Text::from(Span::styled(&app.status_message, style))
    };

    let status_paragraph = Paragraph::new(status_text)
        .block(status_block)
        .wrap(Wrap { trim: true });
    f.render_widget(status_paragraph, area);
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let text = Style::default().fg(Color::Gray);

    let pairs = [
        ("?", "Help"),
        ("Tab", "Focus"),
        ("←/→", "Change"),
        ("Space", "Play"),
        ("/", "Search"),
        ("q", "Quit"),
    ];
    let mut spans = Vec::new();
    for (i, (k, label)) in pairs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", text));
        }
        spans.push(Span::styled(*k, key));
        spans.push(Span::styled(format!(": {label}"), text));
    }

    let shortcuts_paragraph = Paragraph::new(TextLine::from(spans)).alignment(Alignment::Center);
    f.render_widget(shortcuts_paragraph, area);
}

fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(70, 80, area);
    f.render_widget(ClearWidget, popup_area);

    let help_block = Block::default()
        .title(" Help & Keyboard Shortcuts ")
        .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let help_paragraph = Paragraph::new(Text::from(build_help_lines()))
        .block(help_block)
        .wrap(Wrap { trim: true });
    f.render_widget(help_paragraph, popup_area);
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let bindings = [
        ("Tab / Shift-Tab", "Move focus between controls"),
        ("← / →", "Change the focused control"),
        ("m / M", "Next / previous mode"),
        ("e / E", "Next / previous entity"),
        ("a", "Show all entities"),
        ("/", "Search entities"),
        ("[ / ]", "Previous / next period"),
        ("Home / End", "First / latest period"),
        ("Space / p", "Play or pause"),
        ("↑ / ↓ / PgUp / PgDn", "Scroll flows"),
        ("? / h", "Toggle this help"),
        ("q / Esc", "Quit"),
    ];

    let mut lines = vec![
        TextLine::from(Span::styled(
            "Cross-border flows",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        TextLine::from(
            "Each arc is an entity; ribbons run from the lender to the borrower, colored by the lender.",
        ),
        TextLine::from(""),
    ];
    lines.extend(bindings.iter().map(|(keys, action)| {
        TextLine::from(vec![
            Span::styled(format!("  {keys:<22}"), key),
            Span::raw(*action),
        ])
    }));
    lines.push(TextLine::from(""));
    lines.push(TextLine::from(Span::styled(
        "Press ? or Esc to close",
        Style::default().fg(Color::Gray),
    )));
    lines
}

fn render_search_popup(app: &App, f: &mut Frame<'_>, area: Rect) {
    let Some(search) = app.search.as_ref() else {
        return;
    };
    let popup_area = centered_rect(50, 60, area);
    f.render_widget(ClearWidget, popup_area);

    let block = Block::default()
        .title(" Find entity ")
        .title_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let matches = rank_entities(app.controls.entity_options(), &search.query);
    let mut lines = vec![
        TextLine::from(vec![
            Span::styled("/ ", Style::default().fg(Color::Magenta)),
            Span::styled(search.query.clone(), Style::default().fg(Color::White)),
            Span::styled("█", Style::default().fg(Color::Magenta)),
        ]),
        TextLine::from(""),
    ];

    if matches.is_empty() {
        lines.push(TextLine::from(Span::styled(
            "No matches",
            Style::default().fg(Color::Gray),
        )));
    }

    // Keep the highlighted match inside the visible window.
    let skip = search.selected.saturating_sub(SEARCH_RESULTS - 1);
    for (i, option) in matches.iter().enumerate().skip(skip).take(SEARCH_RESULTS) {
        let style = if i == search.selected {
            Style::default().fg(Color::Black).bg(Color::Magenta)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(TextLine::from(Span::styled(option.label.clone(), style)));
    }

    let paragraph = Paragraph::new(Text::from(lines)).block(block);
    f.render_widget(paragraph, popup_area);
}
