//! Directed chord layout.
//!
//! Each entity gets one group on the circle whose span is proportional to its
//! outbound plus inbound flow. Inside a group, outbound subgroups and inbound
//! subgroups are laid out by decreasing magnitude (inbound values count as
//! negative when sorting, so outbound flows come first). The sort is stable
//! over inbound sources listed last to first, then outbound targets first to
//! last, which fixes the order of equal flows. Every nonzero cell
//! `matrix[i][j]` becomes one ribbon from group `i` to group `j`.
//!
//! With no flow at all the groups are empty and sit one pad angle apart,
//! unless the padding alone would overrun the circle.
//!
//! Angles are in radians, measured clockwise from twelve o'clock.

use serde::Serialize;
use std::cmp::Ordering;
use std::f64::consts::TAU;

/// Gap left between neighbouring groups.
pub const DEFAULT_PAD_ANGLE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChordGroup {
    pub index: usize,
    pub start_angle: f64,
    pub end_angle: f64,
    pub value: f64,
}

impl ChordGroup {
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

/// One end of a ribbon: the slice of a group it attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChordEnd {
    pub index: usize,
    pub start_angle: f64,
    pub end_angle: f64,
    pub value: f64,
}

impl ChordEnd {
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Chord {
    pub source: ChordEnd,
    pub target: ChordEnd,
}

impl Chord {
    pub const fn touches(&self, index: usize) -> bool {
        self.source.index == index || self.target.index == index
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChordLayout {
    pub groups: Vec<ChordGroup>,
    pub chords: Vec<Chord>,
}

#[derive(Debug, Clone, Copy)]
pub struct DirectedChord {
    pad_angle: f64,
}

impl Default for DirectedChord {
    fn default() -> Self {
        Self {
            pad_angle: DEFAULT_PAD_ANGLE,
        }
    }
}

/// Subgroup reference inside a group: an outbound flow to `j` or an inbound flow from `j`.
#[derive(Debug, Clone, Copy)]
enum Subgroup {
    Out(usize),
    In(usize),
}

impl DirectedChord {
    pub const fn pad_angle(mut self, pad_angle: f64) -> Self {
        self.pad_angle = pad_angle;
        self
    }

    /// Lays out a square matrix. Rows shorter than the matrix read as zero.
    pub fn layout(&self, matrix: &[Vec<f64>]) -> ChordLayout {
        let n = matrix.len();
        if n == 0 {
            return ChordLayout::default();
        }

        let cell = |i: usize, j: usize| matrix[i].get(j).copied().unwrap_or(0.0).max(0.0);

        let group_sums: Vec<f64> = (0..n)
            .map(|i| (0..n).map(|j| cell(i, j) + cell(j, i)).sum())
            .collect();
        let total: f64 = group_sums.iter().sum();

        let n_f = n as f64;
        let room = self.pad_angle.mul_add(-n_f, TAU).max(0.0);
        let k = if total > 0.0 { room / total } else { 0.0 };
        let dx = if k > 0.0 || (total <= 0.0 && room > 0.0) {
            self.pad_angle
        } else {
            TAU / n_f
        };

        let mut sources: Vec<Option<ChordEnd>> = vec![None; n * n];
        let mut targets: Vec<Option<ChordEnd>> = vec![None; n * n];
        let mut groups = Vec::with_capacity(n);

        let mut x = 0.0;
        for i in 0..n {
            let x0 = x;

            let mut subgroups: Vec<Subgroup> = (0..n)
                .rev()
                .filter(|&j| cell(j, i) > 0.0)
                .map(Subgroup::In)
                .chain((0..n).filter(|&j| cell(i, j) > 0.0).map(Subgroup::Out))
                .collect();
            let signed = |sub: &Subgroup| match *sub {
                Subgroup::Out(j) => cell(i, j),
                Subgroup::In(j) => -cell(j, i),
            };
            subgroups.sort_by(|a, b| signed(b).partial_cmp(&signed(a)).unwrap_or(Ordering::Equal));

            for sub in subgroups {
                match sub {
                    Subgroup::Out(j) => {
                        let value = cell(i, j);
                        let start = x;
                        x += value * k;
                        sources[i * n + j] = Some(ChordEnd {
                            index: i,
                            start_angle: start,
                            end_angle: x,
                            value,
                        });
                    }
                    Subgroup::In(j) => {
                        let value = cell(j, i);
                        let start = x;
                        x += value * k;
                        targets[j * n + i] = Some(ChordEnd {
                            index: i,
                            start_angle: start,
                            end_angle: x,
                            value,
                        });
                    }
                }
            }

            groups.push(ChordGroup {
                index: i,
                start_angle: x0,
                end_angle: x,
                value: group_sums[i],
            });
            x += dx;
        }

        let chords = sources
            .into_iter()
            .zip(targets)
            .filter_map(|(source, target)| Some(Chord {
                source: source?,
                target: target?,
            }))
            .collect();

        ChordLayout { groups, chords }
    }
}

/// Point on a circle of `radius` at `angle`, with y growing upwards.
pub fn polar(angle: f64, radius: f64) -> (f64, f64) {
    (radius * angle.sin(), radius * angle.cos())
}

/// Side of the label relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    End,
}

/// Outward facing label: rotated along the radius, flipped on the left half.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelPlacement {
    pub angle: f64,
    pub rotation_degrees: f64,
    pub flipped: bool,
    pub anchor: TextAnchor,
}

impl LabelPlacement {
    pub fn at(angle: f64) -> Self {
        let flipped = angle > std::f64::consts::PI;
        Self {
            angle,
            rotation_degrees: angle.to_degrees() - 90.0,
            flipped,
            anchor: if flipped {
                TextAnchor::End
            } else {
                TextAnchor::Start
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(diff < 1e-9, "expected {expected}, got {actual}, diff {diff}");
    }

    fn sample() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 5.0, 3.0],
            vec![2.0, 0.0, 1.0],
            vec![4.0, 0.0, 0.0],
        ]
    }

    #[test]
    fn one_chord_per_nonzero_cell() {
        let layout = DirectedChord::default().layout(&sample());
        assert_eq!(layout.groups.len(), 3);
        assert_eq!(layout.chords.len(), 5);

        let ab = layout
            .chords
            .iter()
            .find(|c| c.source.index == 0 && c.target.index == 1)
            .copied();
        let ab = ab.map(|c| (c.source.value, c.target.value));
        assert_eq!(ab, Some((5.0, 5.0)));
    }

    #[test]
    fn group_values_count_both_directions() {
        let layout = DirectedChord::default().layout(&sample());
        let values: Vec<f64> = layout.groups.iter().map(|g| g.value).collect();
        assert_eq!(values, vec![14.0, 8.0, 8.0]);
    }

    #[test]
    fn groups_and_padding_fill_the_circle() {
        let layout = DirectedChord::default().layout(&sample());
        let spans: f64 = layout
            .groups
            .iter()
            .map(|g| g.end_angle - g.start_angle)
            .sum();
        assert_close(spans + DEFAULT_PAD_ANGLE * 3.0, TAU);
        assert_close(layout.groups[0].start_angle, 0.0);
    }

    #[test]
    fn outbound_subgroups_come_first_in_descending_order() {
        let layout = DirectedChord::default().layout(&sample());
        let a_to_b = layout
            .chords
            .iter()
            .find(|c| c.source.index == 0 && c.target.index == 1)
            .map(|c| c.source);
        let a_to_c = layout
            .chords
            .iter()
            .find(|c| c.source.index == 0 && c.target.index == 2)
            .map(|c| c.source);

        let (Some(a_to_b), Some(a_to_c)) = (a_to_b, a_to_c) else {
            panic!("missing chords from A");
        };
        assert_close(a_to_b.start_angle, 0.0);
        assert_close(a_to_c.start_angle, a_to_b.end_angle);
    }

    #[test]
    fn equal_inbound_flows_list_later_sources_first() {
        let matrix = vec![
            vec![0.0, 0.0, 2.0],
            vec![0.0, 0.0, 2.0],
            vec![0.0, 0.0, 0.0],
        ];
        let layout = DirectedChord::default().layout(&matrix);
        let into_c = |source: usize| {
            layout
                .chords
                .iter()
                .find(|c| c.source.index == source && c.target.index == 2)
                .map(|c| c.target)
        };

        let (Some(from_a), Some(from_b)) = (into_c(0), into_c(1)) else {
            panic!("missing chords into C");
        };
        assert_close(from_b.start_angle, layout.groups[2].start_angle);
        assert_close(from_a.start_angle, from_b.end_angle);
    }

    #[test]
    fn zero_matrix_spaces_groups_by_padding() {
        let layout = DirectedChord::default().layout(&[vec![0.0, 0.0], vec![0.0, 0.0]]);
        assert!(layout.chords.is_empty());
        assert_close(layout.groups[1].start_angle, DEFAULT_PAD_ANGLE);
        assert_close(layout.groups[1].end_angle, DEFAULT_PAD_ANGLE);

        let crowded = DirectedChord::default()
            .pad_angle(TAU)
            .layout(&[vec![0.0, 0.0], vec![0.0, 0.0]]);
        assert_close(crowded.groups[1].start_angle, std::f64::consts::PI);
    }

    #[test]
    fn empty_matrix_yields_empty_layout() {
        assert_eq!(DirectedChord::default().layout(&[]), ChordLayout::default());
    }

    #[test]
    fn labels_flip_on_the_left_half() {
        let right = LabelPlacement::at(1.0);
        assert!(!right.flipped);
        assert_eq!(right.anchor, TextAnchor::Start);

        let left = LabelPlacement::at(4.0);
        assert!(left.flipped);
        assert_eq!(left.anchor, TextAnchor::End);
        assert_close(left.rotation_degrees, 4.0_f64.to_degrees() - 90.0);
    }

    #[test]
    fn polar_starts_at_twelve_o_clock() {
        let (x, y) = polar(0.0, 2.0);
        assert_close(x, 0.0);
        assert_close(y, 2.0);
        let (x, y) = polar(std::f64::consts::FRAC_PI_2, 2.0);
        assert_close(x, 2.0);
        assert_close(y, 0.0);
    }

    proptest! {
        #[test]
        fn chord_count_matches_nonzero_cells(
            cells in proptest::collection::vec(0.0_f64..100.0, 16)
        ) {
            let matrix: Vec<Vec<f64>> = cells
                .chunks(4)
                .map(|row| row.iter().map(|v| if *v < 40.0 { 0.0 } else { *v }).collect())
                .collect();
            let nonzero = matrix.iter().flatten().filter(|v| **v > 0.0).count();
            let layout = DirectedChord::default().layout(&matrix);

            prop_assert_eq!(layout.chords.len(), nonzero);
            for group in &layout.groups {
                prop_assert!(group.end_angle >= group.start_angle);
                prop_assert!(group.end_angle <= TAU + 1e-9);
            }
        }
    }
}
