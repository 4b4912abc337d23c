//! Alignment and distribution math over selected objects.
//!
//! Object extents are world-space bounds (`position + size x scale`). Align
//! needs at least 2 objects and distribute at least 3; below the threshold
//! both are silent no-ops.

use crate::object::NodeId;
use crate::surface::Surface;

/// Alignment edge or center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
    Top,
    Bottom,
    /// Horizontal centers to the mean center x.
    CenterH,
    /// Vertical middles to the mean center y.
    MiddleV,
}

/// Distribution axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Align the given objects. No-op with fewer than 2 resolvable objects.
pub fn align_objects(surface: &mut Surface, nodes: &[NodeId], alignment: Alignment) {
    let extents: Vec<(NodeId, kurbo::Rect)> = nodes
        .iter()
        .filter_map(|&n| surface.get(n).map(|o| (n, o.bounds())))
        .collect();
    if extents.len() < 2 {
        return;
    }

    match alignment {
        Alignment::Left => {
            let target = extents.iter().map(|(_, r)| r.x0).fold(f64::INFINITY, f64::min);
            for (node, rect) in &extents {
                shift(surface, *node, target - rect.x0, 0.0);
            }
        }
        Alignment::Right => {
            let target = extents
                .iter()
                .map(|(_, r)| r.x1)
                .fold(f64::NEG_INFINITY, f64::max);
            for (node, rect) in &extents {
                shift(surface, *node, target - rect.x1, 0.0);
            }
        }
        Alignment::Top => {
            let target = extents.iter().map(|(_, r)| r.y0).fold(f64::INFINITY, f64::min);
            for (node, rect) in &extents {
                shift(surface, *node, 0.0, target - rect.y0);
            }
        }
        Alignment::Bottom => {
            let target = extents
                .iter()
                .map(|(_, r)| r.y1)
                .fold(f64::NEG_INFINITY, f64::max);
            for (node, rect) in &extents {
                shift(surface, *node, 0.0, target - rect.y1);
            }
        }
        Alignment::CenterH => {
            let mean =
                extents.iter().map(|(_, r)| r.center().x).sum::<f64>() / extents.len() as f64;
            for (node, rect) in &extents {
                shift(surface, *node, mean - rect.center().x, 0.0);
            }
        }
        Alignment::MiddleV => {
            let mean =
                extents.iter().map(|(_, r)| r.center().y).sum::<f64>() / extents.len() as f64;
            for (node, rect) in &extents {
                shift(surface, *node, 0.0, mean - rect.center().y);
            }
        }
    }
}

/// Distribute objects with a uniform gap along an axis. No-op with fewer
/// than 3 resolvable objects.
pub fn distribute_objects(surface: &mut Surface, nodes: &[NodeId], axis: Axis) {
    let mut extents: Vec<(NodeId, kurbo::Rect)> = nodes
        .iter()
        .filter_map(|&n| surface.get(n).map(|o| (n, o.bounds())))
        .collect();
    if extents.len() < 3 {
        return;
    }

    match axis {
        Axis::Horizontal => {
            extents.sort_by(|a, b| a.1.x0.total_cmp(&b.1.x0));
            let span = extents[extents.len() - 1].1.x1 - extents[0].1.x0;
            let total: f64 = extents.iter().map(|(_, r)| r.width()).sum();
            let gap = (span - total) / (extents.len() - 1) as f64;

            let mut cursor = extents[0].1.x0;
            for (node, rect) in &extents {
                shift(surface, *node, cursor - rect.x0, 0.0);
                cursor += rect.width() + gap;
            }
        }
        Axis::Vertical => {
            extents.sort_by(|a, b| a.1.y0.total_cmp(&b.1.y0));
            let span = extents[extents.len() - 1].1.y1 - extents[0].1.y0;
            let total: f64 = extents.iter().map(|(_, r)| r.height()).sum();
            let gap = (span - total) / (extents.len() - 1) as f64;

            let mut cursor = extents[0].1.y0;
            for (node, rect) in &extents {
                shift(surface, *node, 0.0, cursor - rect.y0);
                cursor += rect.height() + gap;
            }
        }
    }
}

fn shift(surface: &mut Surface, node: NodeId, dx: f64, dy: f64) {
    if let Some(obj) = surface.get_mut(node) {
        obj.translate(dx, dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectShape, SceneObject};

    fn setup(lefts: &[f64], width: f64) -> (Surface, Vec<NodeId>) {
        let mut surface = Surface::new();
        let nodes = lefts
            .iter()
            .map(|&left| {
                surface.insert(SceneObject::new(
                    ObjectShape::Rect {
                        width,
                        height: 10.0,
                    },
                    left,
                    left, // top mirrors left for vertical tests
                ))
            })
            .collect();
        (surface, nodes)
    }

    fn lefts(surface: &Surface, nodes: &[NodeId]) -> Vec<f64> {
        nodes.iter().map(|&n| surface.get(n).unwrap().left).collect()
    }

    #[test]
    fn test_align_left_to_minimum() {
        let (mut surface, nodes) = setup(&[0.0, 10.0, 30.0], 10.0);
        align_objects(&mut surface, &nodes, Alignment::Left);
        assert_eq!(lefts(&surface, &nodes), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_align_right_to_maximum() {
        let (mut surface, nodes) = setup(&[0.0, 10.0, 30.0], 10.0);
        align_objects(&mut surface, &nodes, Alignment::Right);
        // Trailing edges all at 40, so lefts all at 30.
        assert_eq!(lefts(&surface, &nodes), vec![30.0, 30.0, 30.0]);
    }

    #[test]
    fn test_align_center_to_mean() {
        let (mut surface, nodes) = setup(&[0.0, 10.0, 30.0], 10.0);
        // Centers: 5, 15, 35 -> mean 55/3.
        align_objects(&mut surface, &nodes, Alignment::CenterH);
        let expected = 55.0 / 3.0 - 5.0;
        for left in lefts(&surface, &nodes) {
            assert!((left - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distribute_uniform_gap() {
        // Widths 10 each, span from 0 to 100 -> gap = (100 - 30) / 2 = 35.
        let (mut surface, nodes) = setup(&[0.0, 20.0, 90.0], 10.0);
        distribute_objects(&mut surface, &nodes, Axis::Horizontal);
        assert_eq!(lefts(&surface, &nodes), vec![0.0, 45.0, 90.0]);
    }

    #[test]
    fn test_distribute_contiguous_when_gap_fits_exactly() {
        // span = 70, widths sum 30, gap = 20
        let (mut surface, nodes) = setup(&[0.0, 30.0, 60.0], 10.0);
        distribute_objects(&mut surface, &nodes, Axis::Horizontal);
        assert_eq!(lefts(&surface, &nodes), vec![0.0, 30.0, 60.0]);
    }

    #[test]
    fn test_distribute_threshold_noop() {
        let (mut surface, nodes) = setup(&[0.0, 17.0], 10.0);
        distribute_objects(&mut surface, &nodes, Axis::Horizontal);
        assert_eq!(lefts(&surface, &nodes), vec![0.0, 17.0]);
    }

    #[test]
    fn test_align_threshold_noop() {
        let (mut surface, nodes) = setup(&[13.0], 10.0);
        align_objects(&mut surface, &nodes, Alignment::Left);
        assert_eq!(lefts(&surface, &nodes), vec![13.0]);
    }

    #[test]
    fn test_align_respects_scale() {
        let mut surface = Surface::new();
        let a = surface.insert(SceneObject::new(
            ObjectShape::Rect {
                width: 10.0,
                height: 10.0,
            },
            0.0,
            0.0,
        ));
        let mut wide = SceneObject::new(
            ObjectShape::Rect {
                width: 10.0,
                height: 10.0,
            },
            50.0,
            0.0,
        );
        wide.scale_x = 3.0; // displayed width 30, trailing edge 80
        let b = surface.insert(wide);

        align_objects(&mut surface, &[a, b], Alignment::Right);
        assert!((surface.get(a).unwrap().left - 70.0).abs() < 1e-9);
        assert!((surface.get(b).unwrap().left - 50.0).abs() < 1e-9);
    }
}
