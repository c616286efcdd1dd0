use chord_core::geometry::{arc_points, ribbon_strands, strand_count};
use chord_core::layout::{polar, TextAnchor};
use chord_core::palette::Rgb;
use chord_core::ChartScene;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Terminal background the opacities blend against.
const BACKGROUND: Rgb = Rgb::new(0, 0, 0);

const BOUND: f64 = 1.35;
const RIBBON_RADIUS: f64 = 0.82;
const ARC_RADII: [f64; 3] = [0.84, 0.87, 0.9];
const LABEL_RADIUS: f64 = 0.96;
const STRANDS_PER_RADIAN: f64 = 24.0;
const CURVE_STEPS: usize = 24;

pub fn terminal_color(rgb: Rgb, opacity: f64) -> Color {
    let faded = rgb.fade(opacity, BACKGROUND);
    Color::Rgb(faded.r, faded.g, faded.b)
}

pub fn render_chord(scene: Option<&ChartScene>, f: &mut Frame<'_>, area: Rect) {
    let title = scene.map_or_else(
        || " Chord ".to_string(),
        |scene| format!(" Chord · {} ", scene.period_label),
    );
    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
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

    // Braille cells are twice as tall as wide; keep the circle round.
    let width = inner.width.min(inner.height.saturating_mul(2));
    let height = (width / 2).max(1).min(inner.height);
    let square = Rect {
        x: inner.x + (inner.width - width) / 2,
        y: inner.y + (inner.height - height) / 2,
        width,
        height,
    };
    let units_per_column = 2.0 * BOUND / f64::from(square.width);

    f.render_widget(
        Canvas::default()
            .marker(Marker::Braille)
            .paint(|ctx| {
                draw_ribbons(ctx, scene);
                ctx.layer();
                draw_arcs(ctx, scene);
                draw_labels(ctx, scene, units_per_column);
            })
            .x_bounds([-BOUND, BOUND])
            .y_bounds([-BOUND, BOUND]),
        square,
    );
}

fn draw_ribbons(ctx: &mut Context<'_>, scene: &ChartScene) {
    // Faint ribbons first so the highlighted ones stay on top.
    let mut ribbons: Vec<_> = scene.ribbons.iter().collect();
    ribbons.sort_by(|a, b| a.opacity.total_cmp(&b.opacity));

    for ribbon in ribbons {
        let color = terminal_color(ribbon.fill, ribbon.opacity);
        let strands = strand_count(&ribbon.source, STRANDS_PER_RADIAN);
        for strand in ribbon_strands(
            &ribbon.source,
            &ribbon.target,
            RIBBON_RADIUS,
            strands,
            CURVE_STEPS,
        ) {
            draw_polyline(ctx, &strand, color);
        }
    }
}

fn draw_arcs(ctx: &mut Context<'_>, scene: &ChartScene) {
    for arc in &scene.arcs {
        let color = terminal_color(arc.fill, arc.opacity);
        let span = arc.end_angle - arc.start_angle;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = ((span * 80.0).ceil() as usize).max(2);

        for radius in ARC_RADII {
            let points = arc_points(arc.start_angle, arc.end_angle, radius, steps);
            ctx.draw(&Points {
                coords: &points,
                color,
            });
        }
        let edge = arc_points(arc.start_angle, arc.end_angle, ARC_RADII[2], steps);
        draw_polyline(ctx, &edge, terminal_color(arc.stroke, arc.opacity));
    }
}

fn draw_labels(ctx: &mut Context<'_>, scene: &ChartScene, units_per_column: f64) {
    for arc in &scene.arcs {
        let (x, y) = polar(arc.label.angle, LABEL_RADIUS);
        let text_width = arc.name.chars().count() as f64 * units_per_column;
        let x = match arc.label.anchor {
            TextAnchor::Start => x,
            TextAnchor::End => x - text_width,
        };

        let mut style = Style::default().fg(terminal_color(arc.fill, arc.opacity));
        if scene.focus == Some(arc.index) {
            style = style.add_modifier(Modifier::BOLD);
        }
        ctx.print(x, y, TextLine::from(Span::styled(arc.name.clone(), style)));
    }
}

fn draw_polyline(ctx: &mut Context<'_>, points: &[(f64, f64)], color: Color) {
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
