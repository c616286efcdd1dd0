use chord_core::tooltip::{format_amount, share_percent};
use chord_core::ChartScene;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table,
};
use ratatui::Frame;

use super::chord::terminal_color;

/// Ranked flow table next to the chart; scrolls from `row_offset`.
pub fn render_flows(
    scene: Option<&ChartScene>,
    caption: Option<&str>,
    row_offset: usize,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let title = caption.map_or_else(
        || " Flows ".to_string(),
        |caption| format!(" Flows ({caption}) "),
    );
    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(Color::Green))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let ribbons = scene.map(ChartScene::ranked_ribbons).unwrap_or_default();
    if ribbons.is_empty() {
        let paragraph = Paragraph::new("No flows in this period")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, inner);
        return;
    }

    let max_rows = inner.height.saturating_sub(1) as usize;
    let row_offset = row_offset.min(ribbons.len().saturating_sub(1));

    let header = Row::new(vec![
        Cell::from("From"),
        Cell::from("To"),
        Cell::from("Value"),
        Cell::from("Share"),
    ])
    .style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::Gray)
            .add_modifier(Modifier::BOLD),
    );

    let rows = ribbons
        .iter()
        .skip(row_offset)
        .take(max_rows)
        .map(|ribbon| {
            let total = scene
                .and_then(|scene| scene.row_totals.get(ribbon.source.index))
                .copied()
                .unwrap_or(0.0);
            Row::new(vec![
                Cell::from(ribbon.from.clone())
                    .style(Style::default().fg(terminal_color(ribbon.fill, 1.0))),
                Cell::from(ribbon.to.clone()),
                Cell::from(format_amount(ribbon.value)),
                Cell::from(format!("{:.1}%", share_percent(ribbon.value, total))),
            ])
            .style(Style::default().fg(Color::White))
        });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(24),
            Constraint::Percentage(16),
        ],
    )
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
}
