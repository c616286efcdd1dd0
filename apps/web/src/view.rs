use chord_core::geometry::{arc_points, ribbon_strands, strand_count};
use chord_core::layout::{polar, TextAnchor};
use chord_core::palette::Rgb;
use chord_core::tooltip::format_amount;
use chord_core::ChartScene;
use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line as TextLine, Span, Text},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points},
        Block, Borders, Cell, Clear, LineGauge, Paragraph, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table, Wrap,
    },
    Frame,
};

use crate::state::{Dashboard, LoadState, WebState};

const BACKGROUND: Rgb = Rgb::new(0, 0, 0);
const BOUND: f64 = 1.35;
const RIBBON_RADIUS: f64 = 0.82;
const ARC_RADII: [f64; 3] = [0.84, 0.87, 0.9];
const LABEL_RADIUS: f64 = 0.96;

fn color(rgb: Rgb, opacity: f64) -> Color {
    let faded = rgb.fade(opacity, BACKGROUND);
    Color::Rgb(faded.r, faded.g, faded.b)
}

pub fn render(state: &WebState, f: &mut Frame<'_>) {
    let area = f.area();
    let block = Block::default()
        .title("Cross-border flows")
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area).inner(Margin::new(1, 0));
    f.render_widget(block, area);

    match &state.load {
        LoadState::Loading => {
            let paragraph = Paragraph::new(Text::from(TextLine::from("Loading chord data...")))
                .alignment(Alignment::Center);
            f.render_widget(paragraph, inner);
        }
        LoadState::Failed(message) => render_error(message, f, inner),
        LoadState::Ready(dashboard) => render_dashboard(state, dashboard, f, inner),
    }

    if state.show_help {
        render_help(f, area);
    }
}

fn render_error(message: &str, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title("Chord data unavailable")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let paragraph = Paragraph::new(Text::from(vec![
        TextLine::from(Span::styled(
            "The chart could not be drawn.",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        TextLine::from(message.to_string()),
    ]))
    .block(block)
    .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_dashboard(state: &WebState, dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(state, dashboard, f, layout[0]);
    render_slider(dashboard, f, layout[1]);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(layout[2]);
    render_chord(dashboard.scene.as_ref(), f, content[0]);
    render_flows(dashboard, state.flow_offset, f, content[1]);

    let footer = if dashboard.status.is_empty() {
        TextLine::from(Span::styled(
            "m/M mode  e/E entity  a all  ←/→ period  Space play  ↑/↓ flows  ? help",
            Style::default().fg(Color::Gray),
        ))
    } else {
        TextLine::from(Span::styled(
            dashboard.status.clone(),
            Style::default().fg(Color::Red),
        ))
    };
    f.render_widget(Paragraph::new(footer).alignment(Alignment::Center), layout[3]);
}

fn render_header(state: &WebState, dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let controls = &dashboard.controls;
    let entity = controls
        .entity_options()
        .get(controls.entity_option_index())
        .map_or_else(String::new, |option| option.label.clone());
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let label = Style::default().fg(Color::Gray);

    let mut spans = vec![
        Span::styled("Mode: ", label),
        Span::styled(controls.mode().to_string(), value),
        Span::raw("   "),
        Span::styled("Entity: ", label),
        Span::styled(entity, value),
        Span::raw("   "),
        Span::styled(
            format!("[{}]", state.playback_mode().toggle_label()),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
    ];
    if let Some(caption) = dashboard.dataset.measure_caption() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(caption, label));
    }

    let block = Block::default()
        .title("Controls")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(TextLine::from(spans)).block(block), area);
}

fn render_slider(dashboard: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let labels = dashboard.controls.period_labels(&dashboard.dataset);
    let max = dashboard.controls.bounds().max;
    let index = dashboard.controls.selection().period_index;
    let ratio = if max == 0 { 1.0 } else { index as f64 / max as f64 };

    let block = Block::default()
        .title(labels.start.clone())
        .title_top(TextLine::from(labels.end.clone()).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let gauge = LineGauge::default()
        .block(block)
        .filled_style(Style::default().fg(Color::Cyan))
        .unfilled_style(Style::default().fg(Color::DarkGray))
        .label(format!("{:>8}", labels.current))
        .ratio(ratio.clamp(0.0, 1.0));
    f.render_widget(gauge, area);
}

fn render_chord(scene: Option<&ChartScene>, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(scene.map_or_else(String::new, |scene| scene.period_label.clone()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(scene) = scene.filter(|scene| !scene.arcs.is_empty()) else {
        let paragraph = Paragraph::new("No flows to draw")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, inner);
        return;
    };
    if inner.width < 8 || inner.height < 4 {
        return;
    }

    let width = inner.width.min(inner.height.saturating_mul(2));
    let height = (width / 2).max(1).min(inner.height);
    let square = Rect {
        x: inner.x + (inner.width - width) / 2,
        y: inner.y + (inner.height - height) / 2,
        width,
        height,
    };
    let column = 2.0 * BOUND / f64::from(square.width);

    f.render_widget(
        Canvas::default()
            .marker(Marker::Braille)
            .paint(|ctx| {
                let mut ribbons: Vec<_> = scene.ribbons.iter().collect();
                ribbons.sort_by(|a, b| a.opacity.total_cmp(&b.opacity));
                for ribbon in ribbons {
                    let stroke = color(ribbon.fill, ribbon.opacity);
                    let strands = strand_count(&ribbon.source, 24.0);
                    for strand in
                        ribbon_strands(&ribbon.source, &ribbon.target, RIBBON_RADIUS, strands, 24)
                    {
                        polyline(ctx, &strand, stroke);
                    }
                }

                ctx.layer();
                for arc in &scene.arcs {
                    let fill = color(arc.fill, arc.opacity);
                    for radius in ARC_RADII {
                        let points = arc_points(arc.start_angle, arc.end_angle, radius, 96);
                        ctx.draw(&Points {
                            coords: &points,
                            color: fill,
                        });
                    }

                    let (x, y) = polar(arc.label.angle, LABEL_RADIUS);
                    let x = match arc.label.anchor {
                        TextAnchor::Start => x,
                        TextAnchor::End => x - arc.name.chars().count() as f64 * column,
                    };
                    ctx.print(
                        x,
                        y,
                        TextLine::from(Span::styled(arc.name.clone(), Style::default().fg(fill))),
                    );
                }
            })
            .x_bounds([-BOUND, BOUND])
            .y_bounds([-BOUND, BOUND]),
        square,
    );
}

fn polyline(ctx: &mut Context<'_>, points: &[(f64, f64)], color: Color) {
    for pair in points.windows(2) {
        ctx.draw(&CanvasLine {
            x1: pair[0].0,
            y1: pair[0].1,
            x2: pair[1].0,
            y2: pair[1].1,
            color,
        });
    }
}

fn render_flows(dashboard: &Dashboard, row_offset: usize, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title("Flows")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let ribbons = dashboard
        .scene
        .as_ref()
        .map(ChartScene::ranked_ribbons)
        .unwrap_or_default();
    if ribbons.is_empty() {
        let paragraph = Paragraph::new("No flows in this period")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, inner);
        return;
    }

    let max_rows = inner.height.saturating_sub(1) as usize;
    let header = Row::new(vec![Cell::from("Flow"), Cell::from("Value")]).style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::Gray)
            .add_modifier(Modifier::BOLD),
    );
    let rows = ribbons.iter().skip(row_offset).take(max_rows).map(|ribbon| {
        Row::new(vec![
            Cell::from(format!("{} → {}", ribbon.from, ribbon.to))
                .style(Style::default().fg(color(ribbon.fill, 1.0))),
            Cell::from(format_amount(ribbon.value)),
        ])
    });
    let table = Table::new(rows, [Constraint::Percentage(65), Constraint::Percentage(35)])
        .header(header)
        .column_spacing(1);
    f.render_widget(table, inner);

    let mut scrollbar_state = ScrollbarState::new(ribbons.len())
        .position(row_offset)
        .viewport_content_length(max_rows);
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .thumb_style(Style::default().fg(Color::Green));
    let scroll_area = Rect {
        x: inner.x,
        y: inner.y.saturating_add(1),
        width: inner.width,
        height: inner.height.saturating_sub(1),
    };
    f.render_stateful_widget(scrollbar, scroll_area, &mut scrollbar_state);

    if let Some(top) = ribbons.get(row_offset) {
        let tooltip = Rect {
            x: inner.x,
            y: inner.y + inner.height.saturating_sub(1),
            width: inner.width,
            height: 1,
        };
        f.render_widget(
            Paragraph::new(Span::styled(top.tooltip.clone(), Style::default().fg(Color::Yellow))),
            tooltip,
        );
    }
}

fn render_help(f: &mut Frame<'_>, area: Rect) {
    let popup = Rect {
        x: area.width.saturating_sub(56) / 2,
        y: area.height.saturating_sub(14) / 2,
        width: 56.min(area.width),
        height: 14.min(area.height),
    };
    f.render_widget(Clear, popup);

    let lines = [
        ("m / M", "next / previous mode"),
        ("e / E", "next / previous entity"),
        ("a", "all entities"),
        ("← / →", "previous / next period"),
        ("Home / End", "first / latest period"),
        ("Space", "play or pause"),
        ("↑ / ↓", "scroll flows"),
        ("?", "close help"),
    ]
    .iter()
    .map(|(keys, action)| {
        TextLine::from(vec![
            Span::styled(
                format!("{keys:<12}"),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(*action),
        ])
    })
    .collect::<Vec<_>>();

    let block = Block::default()
        .title("Keys")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    f.render_widget(Paragraph::new(Text::from(lines)).block(block), popup);
}
