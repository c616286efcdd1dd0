use chord_core::{ChartScene, Dataset, FocalEntity};
use color_eyre::Result;
use serde::Serialize;

use crate::app::App;

#[derive(Debug, Serialize)]
struct EntityTotal {
    name: String,
    outbound: f64,
}

#[derive(Debug, Serialize)]
struct FlowRow {
    from: String,
    to: String,
    value: f64,
    share: f64,
    tooltip: String,
}

#[derive(Debug, Serialize)]
struct HeadlessReport {
    mode: String,
    period: String,
    period_label: String,
    focal_entity: FocalEntity,
    units: Option<String>,
    position: Option<String>,
    entities: Vec<EntityTotal>,
    flows: Vec<FlowRow>,
}

/// Prints the current chart and exits; used when stdout is not a terminal.
pub fn run_headless(app: &App, json: bool) -> Result<()> {
    let Some(scene) = app.scene.as_ref() else {
        return Err(color_eyre::eyre::eyre!(
            "no chart for mode {}: {}",
            app.controls.mode(),
            app.status_message
        ));
    };

    let report = build_report(app, scene);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&app.dataset, &report));
    }
    Ok(())
}

fn build_report(app: &App, scene: &ChartScene) -> HeadlessReport {
    let entities = scene
        .arcs
        .iter()
        .map(|arc| EntityTotal {
            name: arc.name.clone(),
            outbound: scene.row_totals.get(arc.index).copied().unwrap_or(0.0),
        })
        .collect();

    let flows = scene
        .ranked_ribbons()
        .into_iter()
        .map(|ribbon| {
            let total = scene
                .row_totals
                .get(ribbon.source.index)
                .copied()
                .unwrap_or(0.0);
            FlowRow {
                from: ribbon.from.clone(),
                to: ribbon.to.clone(),
                value: ribbon.value,
                share: chord_core::tooltip::share_percent(ribbon.value, total),
                tooltip: ribbon.tooltip.clone(),
            }
        })
        .collect();

    HeadlessReport {
        mode: scene.mode.clone(),
        period: scene.period.clone(),
        period_label: scene.period_label.clone(),
        focal_entity: app.controls.selection().focal_entity.clone(),
        units: app.dataset.units().map(ToString::to_string),
        position: app.dataset.position().map(ToString::to_string),
        entities,
        flows,
    }
}

fn render_text(dataset: &Dataset, report: &HeadlessReport) -> String {
    let mut out = String::new();
    out.push_str("\nCross-border flows\n");
    out.push_str("==================\n");
    out.push_str(&format!("Mode: {}\n", report.mode));
    out.push_str(&format!("Period: {} ({})\n", report.period_label, report.period));
    out.push_str(&format!("Focus: {}\n", report.focal_entity));
    if let Some(units) = dataset.units() {
        out.push_str(&format!("Units: {units}\n"));
    }
    if let Some(position) = dataset.position() {
        out.push_str(&format!("Position: {position}\n"));
    }

    out.push_str("\nOutbound totals:\n");
    for entity in &report.entities {
        out.push_str(&format!(
            "- {}: {}\n",
            entity.name,
            chord_core::tooltip::format_amount(entity.outbound)
        ));
    }

    out.push_str(&format!("\nFlows ({}):\n", report.flows.len()));
    for flow in &report.flows {
        out.push_str(&format!("- {}\n", flow.tooltip));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chord_core::{DatasetMeta, ModeData};
    use chord_flows_tui::{AppConfig, PlaybackTimer};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> Result<App> {
        let mode = ModeData {
            nodes: vec!["A".to_string(), "B".to_string()],
            dates: vec!["2021-02".to_string()],
            matrices: HashMap::from([(
                "2021-02".to_string(),
                vec![vec![0.0, 1500.0], vec![500.0, 0.0]],
            )]),
        };
        let dataset = Dataset {
            meta: Some(DatasetMeta {
                units: Some("USD bn".to_string()),
                position: Some("Claims".to_string()),
            }),
            modes: BTreeMap::from([("region_region".to_string(), mode)]),
        };
        let (timer, _ticks) = PlaybackTimer::new(Duration::from_millis(1200));
        App::new(Arc::new(dataset), &AppConfig::default(), timer)
    }

    #[tokio::test]
    async fn report_lists_flows_largest_first() -> Result<()> {
        let app = app()?;
        let scene = app.scene.as_ref().ok_or_else(|| color_eyre::eyre::eyre!("no scene"))?;
        let report = build_report(&app, scene);

        assert_eq!(report.period_label, "2021-Q1");
        assert_eq!(report.units.as_deref(), Some("USD bn"));
        let tooltips: Vec<&str> = report.flows.iter().map(|f| f.tooltip.as_str()).collect();
        assert_eq!(tooltips, vec!["A → B: 1,500.00 (100.0%)", "B → A: 500.00 (100.0%)"]);
        Ok(())
    }

    #[tokio::test]
    async fn json_report_names_the_focus() -> Result<()> {
        let mut app = app()?;
        app.select_entity(FocalEntity::parse("B"));
        let scene = app.scene.as_ref().ok_or_else(|| color_eyre::eyre::eyre!("no scene"))?;
        let value = serde_json::to_value(build_report(&app, scene))?;

        assert_eq!(value["focal_entity"], "B");
        assert_eq!(value["position"], "Claims");
        assert_eq!(value["entities"][0]["outbound"], 1500.0);
        assert_eq!(value["flows"].as_array().map(Vec::len), Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn text_report_has_header_and_totals() -> Result<()> {
        let app = app()?;
        let scene = app.scene.as_ref().ok_or_else(|| color_eyre::eyre::eyre!("no scene"))?;
        let text = render_text(&app.dataset, &build_report(&app, scene));

        assert!(text.contains("Period: 2021-Q1 (2021-02)"));
        assert!(text.contains("Focus: all"));
        assert!(text.contains("Units: USD bn"));
        assert!(text.contains("Position: Claims"));
        assert!(text.contains("- A: 1,500.00"));
        Ok(())
    }
}
