//! Bounding rectangle calculation.
//!
//! Computes the axis-aligned bounding box of a vertex source. Used by the
//! ink-bounds measurement on flattened glyph outlines.

use crate::basics::{is_stop, is_vertex, RectD, VertexSource};

/// Bounding box of every vertex in `vs`, or `None` if it has no vertices.
///
/// Control points count as vertices here; wrap curved sources in
/// [`ConvCurve`](crate::curves::ConvCurve) first to get the ink box.
pub fn bounding_rect(vs: &mut dyn VertexSource) -> Option<RectD> {
    let (mut x, mut y) = (0.0, 0.0);
    let mut rect: Option<RectD> = None;

    vs.rewind();
    loop {
        let cmd = vs.vertex(&mut x, &mut y);
        if is_stop(cmd) {
            break;
        }
        if is_vertex(cmd) {
            match rect.as_mut() {
                Some(r) => r.include(x, y),
                None => rect = Some(RectD::new(x, y, x, y)),
            }
        }
    }
    rect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::ConvCurve;
    use crate::path_storage::PathStorage;

    #[test]
    fn test_empty_source() {
        let mut ps = PathStorage::new();
        assert!(bounding_rect(&mut ps).is_none());
    }

    #[test]
    fn test_rect_bounds() {
        let mut ps = PathStorage::new();
        ps.rect(3.0, -2.0, 7.0, 5.0);
        ps.rect(-1.0, 0.0, 0.0, 1.0);
        assert_eq!(bounding_rect(&mut ps), Some(RectD::new(-1.0, -2.0, 7.0, 5.0)));
    }

    #[test]
    fn test_flattened_curve_is_tighter_than_control_box() {
        let mut ps = PathStorage::new();
        ps.move_to(0.0, 0.0);
        ps.curve3(50.0, 100.0, 100.0, 0.0);
        ps.close_polygon();

        let control = bounding_rect(&mut ps).unwrap();
        assert_eq!(control.y2, 100.0);

        let mut conv = ConvCurve::new(ps);
        let ink = bounding_rect(&mut conv).unwrap();
        assert!(ink.y2 <= 50.0 + 1e-9);
        assert!(ink.y2 > 49.0);
    }
}
