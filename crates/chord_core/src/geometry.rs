//! Sampled outlines for surfaces that draw with points and line segments
//! (terminal canvases) instead of SVG paths.

use crate::layout::{polar, ChordEnd};

/// Points along the circle of `radius` from `start_angle` to `end_angle`.
pub fn arc_points(start_angle: f64, end_angle: f64, radius: f64, steps: usize) -> Vec<(f64, f64)> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|step| {
            let t = step as f64 / steps as f64;
            polar(start_angle + (end_angle - start_angle) * t, radius)
        })
        .collect()
}

/// Quadratic curve from `from` to `to` pulled through the circle's center.
pub fn bezier_through_center(from: (f64, f64), to: (f64, f64), steps: usize) -> Vec<(f64, f64)> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|step| {
            let t = step as f64 / steps as f64;
            let (a, c) = ((1.0 - t) * (1.0 - t), t * t);
            (a * from.0 + c * to.0, a * from.1 + c * to.1)
        })
        .collect()
}

/// Curves filling a ribbon between two group slices.
///
/// Strand `k` leaves the source slice at its `k`-th fraction and lands on the
/// target slice at the mirrored fraction, so the outer strands trace the
/// ribbon's two edges and the inner ones shade it.
pub fn ribbon_strands(
    source: &ChordEnd,
    target: &ChordEnd,
    radius: f64,
    strands: usize,
    steps: usize,
) -> Vec<Vec<(f64, f64)>> {
    let strands = strands.max(1);
    (0..strands)
        .map(|k| {
            let t = if strands == 1 {
                0.5
            } else {
                k as f64 / (strands - 1) as f64
            };
            let from = source.start_angle + (source.end_angle - source.start_angle) * t;
            let to = target.end_angle - (target.end_angle - target.start_angle) * t;
            bezier_through_center(polar(from, radius), polar(to, radius), steps)
        })
        .collect()
}

/// Strand count that keeps thin ribbons visible and wide ones shaded.
pub fn strand_count(end: &ChordEnd, per_radian: f64) -> usize {
    let span = (end.end_angle - end.start_angle).abs();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = (span * per_radian).ceil() as usize;
    count.clamp(2, 48)
}
