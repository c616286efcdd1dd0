//! Everything a surface needs to draw one chord chart: arcs, labels, ribbons,
//! colors, opacities and tooltips. Built from scratch on every render, so the
//! same selection over the same data always yields the same scene.

use serde::Serialize;
use thiserror::Error;

use crate::dataset::{Dataset, ModeData};
use crate::layout::{Chord, ChordEnd, DirectedChord, LabelPlacement};
use crate::palette::Rgb;
use crate::period::period_label;
use crate::selection::Selection;
use crate::tooltip::{row_totals, tooltip_text};

pub const FULL_OPACITY: f64 = 1.0;
/// Arcs of entities other than the focused one.
pub const DIMMED_ARC_OPACITY: f64 = 0.45;
/// Ribbons that do not touch the focused entity.
pub const DIMMED_RIBBON_OPACITY: f64 = 0.12;
/// Every ribbon when nothing is focused.
pub const UNFOCUSED_RIBBON_OPACITY: f64 = 0.9;

const ARC_STROKE_DARKEN: f64 = 0.5;
const RIBBON_STROKE_DARKEN: f64 = 0.6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("mode not found in chord data: {0}")]
    UnknownMode(String),

    #[error("mode {0} has no periods")]
    NoPeriods(String),

    #[error("mode {mode} has no matrix for period {period}")]
    MissingMatrix { mode: String, period: String },

    #[error("mode {mode}, period {period}: matrix does not match the node list")]
    MatrixShape { mode: String, period: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcShape {
    pub index: usize,
    pub name: String,
    pub start_angle: f64,
    pub end_angle: f64,
    pub value: f64,
    pub fill: Rgb,
    pub stroke: Rgb,
    pub opacity: f64,
    pub label: LabelPlacement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RibbonShape {
    pub source: ChordEnd,
    pub target: ChordEnd,
    pub from: String,
    pub to: String,
    pub value: f64,
    pub fill: Rgb,
    pub stroke: Rgb,
    pub opacity: f64,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartScene {
    pub mode: String,
    pub period: String,
    pub period_label: String,
    pub focus: Option<usize>,
    pub row_totals: Vec<f64>,
    pub arcs: Vec<ArcShape>,
    pub ribbons: Vec<RibbonShape>,
}

impl ChartScene {
    /// Looks the selection's mode up in `dataset` and builds its scene.
    pub fn from_dataset(selection: &Selection, dataset: &Dataset) -> Result<Self, RenderError> {
        let mode_data = dataset
            .mode(&selection.mode)
            .ok_or_else(|| RenderError::UnknownMode(selection.mode.clone()))?;
        Self::build(selection, mode_data)
    }

    pub fn build(selection: &Selection, mode_data: &ModeData) -> Result<Self, RenderError> {
        let period = mode_data
            .resolve_period(selection.period_index)
            .ok_or_else(|| RenderError::NoPeriods(selection.mode.clone()))?;
        let matrix = mode_data
            .matrix(period)
            .ok_or_else(|| RenderError::MissingMatrix {
                mode: selection.mode.clone(),
                period: period.to_string(),
            })?;

        let nodes = &mode_data.nodes;
        if matrix.len() != nodes.len() {
            return Err(RenderError::MatrixShape {
                mode: selection.mode.clone(),
                period: period.to_string(),
            });
        }

        let totals = row_totals(matrix);
        let layout = DirectedChord::default().layout(matrix);
        let focus = selection.focal_entity.index_in(nodes);

        let arcs = layout
            .groups
            .iter()
            .map(|group| {
                let fill = Rgb::for_index(group.index);
                ArcShape {
                    index: group.index,
                    name: nodes[group.index].clone(),
                    start_angle: group.start_angle,
                    end_angle: group.end_angle,
                    value: group.value,
                    fill,
                    stroke: fill.darker(ARC_STROKE_DARKEN),
                    opacity: arc_opacity(focus, group.index),
                    label: LabelPlacement::at(group.mid_angle()),
                }
            })
            .collect();

        let ribbons = layout
            .chords
            .iter()
            .map(|chord| {
                let from = &nodes[chord.source.index];
                let to = &nodes[chord.target.index];
                let value = chord.source.value;
                let total = totals.get(chord.source.index).copied().unwrap_or(0.0);
                let fill = Rgb::for_index(chord.source.index);

                RibbonShape {
                    source: chord.source,
                    target: chord.target,
                    from: from.clone(),
                    to: to.clone(),
                    value,
                    fill,
                    stroke: fill.darker(RIBBON_STROKE_DARKEN),
                    opacity: ribbon_opacity(focus, chord),
                    tooltip: tooltip_text(from, to, value, total),
                }
            })
            .collect();

        Ok(Self {
            mode: selection.mode.clone(),
            period: period.to_string(),
            period_label: period_label(period),
            focus,
            row_totals: totals,
            arcs,
            ribbons,
        })
    }

    /// Ribbons sorted by value, largest first; only those touching the focus when set.
    pub fn ranked_ribbons(&self) -> Vec<&RibbonShape> {
        let mut ribbons: Vec<&RibbonShape> = self
            .ribbons
            .iter()
            .filter(|ribbon| {
                self.focus.map_or(true, |index| {
                    ribbon.source.index == index || ribbon.target.index == index
                })
            })
            .collect();
        ribbons.sort_by(|a, b| b.value.total_cmp(&a.value));
        ribbons
    }

    pub fn ribbon(&self, from: &str, to: &str) -> Option<&RibbonShape> {
        self.ribbons.iter().find(|r| r.from == from && r.to == to)
    }

    pub fn arc(&self, name: &str) -> Option<&ArcShape> {
        self.arcs.iter().find(|arc| arc.name == name)
    }
}

pub fn arc_opacity(focus: Option<usize>, index: usize) -> f64 {
    match focus {
        Some(focused) if focused != index => DIMMED_ARC_OPACITY,
        _ => FULL_OPACITY,
    }
}

pub const fn ribbon_opacity(focus: Option<usize>, chord: &Chord) -> f64 {
    match focus {
        None => UNFOCUSED_RIBBON_OPACITY,
        Some(index) if chord.touches(index) => FULL_OPACITY,
        Some(_) => DIMMED_RIBBON_OPACITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::sample_mode;
    use crate::selection::FocalEntity;
    use std::collections::BTreeMap;

    fn selection(entity: &str, period_index: usize) -> Selection {
        Selection {
            mode: "region_region".to_string(),
            focal_entity: FocalEntity::parse(entity),
            period_index,
        }
    }

    #[test]
    fn tooltips_use_source_row_totals() -> Result<(), RenderError> {
        let scene = ChartScene::build(&selection("all", 0), &sample_mode())?;
        assert_eq!(scene.row_totals, vec![8.0, 3.0, 4.0]);
        assert_eq!(scene.period_label, "2020-Q1");

        let ab = scene.ribbon("A", "B").map(|r| r.tooltip.as_str());
        assert_eq!(ab, Some("A → B: 5.00 (62.5%)"));
        assert!(scene.ribbon("B", "C").is_some());
        assert!(scene.ribbon("C", "B").is_none());
        Ok(())
    }

    #[test]
    fn focus_dims_unrelated_arcs_and_ribbons() -> Result<(), RenderError> {
        let scene = ChartScene::build(&selection("B", 0), &sample_mode())?;
        assert_eq!(scene.focus, Some(1));

        let opacity = |from: &str, to: &str| scene.ribbon(from, to).map(|r| r.opacity);
        assert_eq!(opacity("A", "B"), Some(FULL_OPACITY));
        assert_eq!(opacity("B", "A"), Some(FULL_OPACITY));
        assert_eq!(opacity("A", "C"), Some(DIMMED_RIBBON_OPACITY));

        let arc = |name: &str| scene.arc(name).map(|a| a.opacity);
        assert_eq!(arc("A"), Some(DIMMED_ARC_OPACITY));
        assert_eq!(arc("B"), Some(FULL_OPACITY));
        assert_eq!(arc("C"), Some(DIMMED_ARC_OPACITY));
        Ok(())
    }

    #[test]
    fn no_focus_keeps_everything_visible() -> Result<(), RenderError> {
        for entity in ["all", "Nowhere"] {
            let scene = ChartScene::build(&selection(entity, 0), &sample_mode())?;
            assert_eq!(scene.focus, None);
            assert!(scene.arcs.iter().all(|a| a.opacity == FULL_OPACITY));
            assert!(scene
                .ribbons
                .iter()
                .all(|r| r.opacity == UNFOCUSED_RIBBON_OPACITY));
        }
        Ok(())
    }

    #[test]
    fn colors_follow_entity_index() -> Result<(), RenderError> {
        let scene = ChartScene::build(&selection("all", 0), &sample_mode())?;
        let ba = scene.ribbon("B", "A").map(|r| r.fill);
        assert_eq!(ba, Some(Rgb::for_index(1)));
        assert_eq!(scene.arcs[2].stroke, Rgb::for_index(2).darker(0.5));
        Ok(())
    }

    #[test]
    fn rebuilding_is_idempotent() -> Result<(), RenderError> {
        let mode = sample_mode();
        let first = ChartScene::build(&selection("C", 1), &mode)?;
        let second = ChartScene::build(&selection("C", 1), &mode)?;
        assert_eq!(first, second);
        assert_eq!(first.period, "2020-04");
        Ok(())
    }

    #[test]
    fn out_of_range_period_uses_first() -> Result<(), RenderError> {
        let scene = ChartScene::build(&selection("all", 42), &sample_mode())?;
        assert_eq!(scene.period, "2020-01");
        Ok(())
    }

    #[test]
    fn ranked_ribbons_follow_focus() -> Result<(), RenderError> {
        let scene = ChartScene::build(&selection("C", 0), &sample_mode())?;
        let ranked: Vec<&str> = scene.ranked_ribbons().iter().map(|r| r.tooltip.as_str()).collect();
        assert_eq!(
            ranked,
            vec!["C → A: 4.00 (100.0%)", "A → C: 3.00 (37.5%)", "B → C: 1.00 (33.3%)"]
        );
        Ok(())
    }

    #[test]
    fn missing_mode_and_matrix_are_errors() {
        let dataset = Dataset {
            meta: None,
            modes: BTreeMap::from([("m".to_string(), ModeData {
                dates: vec!["2020-01".to_string()],
                ..ModeData::default()
            })]),
        };

        let unknown = ChartScene::from_dataset(&selection("all", 0), &dataset);
        assert_eq!(unknown, Err(RenderError::UnknownMode("region_region".to_string())));

        let mut in_m = selection("all", 0);
        in_m.mode = "m".to_string();
        let missing = ChartScene::from_dataset(&in_m, &dataset);
        assert_eq!(
            missing,
            Err(RenderError::MissingMatrix {
                mode: "m".to_string(),
                period: "2020-01".to_string()
            })
        );

        let empty = ChartScene::build(&in_m, &ModeData::default());
        assert_eq!(empty, Err(RenderError::NoPeriods("m".to_string())));
    }
}
