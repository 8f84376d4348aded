//! Elliptical arc vertex generator and arc bands.
//!
//! Angles are in radians in screen coordinates (y grows downward), so an
//! increasing angle sweeps clockwise on screen: `0` points right, `PI / 2`
//! points down. The geometric glyph fallback describes its bands this way.

use crate::basics::{
    deg2rad, VertexSource, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP, PI,
};
use crate::path_storage::PathStorage;

/// Generates vertices along an elliptical arc from `start` to `end`.
///
/// The step angle is derived from the mean radius and the approximation
/// scale so that the chord error stays around an eighth of a pixel.
#[derive(Debug, Clone)]
pub struct Arc {
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    start: f64,
    end: f64,
    da: f64,
    scale: f64,
    angle: f64,
    path_cmd: u32,
}

impl Arc {
    /// Arc sweeping from `a1` to `a2`. When `increasing` is set the sweep
    /// runs toward larger angles (clockwise on screen), otherwise toward
    /// smaller ones; `a2` is wrapped by whole turns to lie on that side.
    pub fn new(cx: f64, cy: f64, rx: f64, ry: f64, a1: f64, a2: f64, increasing: bool) -> Self {
        let mut arc = Self {
            cx,
            cy,
            rx: rx.abs(),
            ry: ry.abs(),
            start: a1,
            end: a2,
            da: 0.0,
            scale: 1.0,
            angle: a1,
            path_cmd: PATH_CMD_STOP,
        };
        arc.normalize(a1, a2, increasing);
        arc
    }

    /// Set approximation scale (affects step size).
    pub fn set_approximation_scale(&mut self, s: f64) {
        self.scale = s;
        let increasing = self.da >= 0.0;
        self.normalize(self.start, self.end, increasing);
    }

    pub fn approximation_scale(&self) -> f64 {
        self.scale
    }

    fn normalize(&mut self, a1: f64, a2: f64, increasing: bool) {
        let ra = (self.rx + self.ry) / 2.0;
        let da = (ra / (ra + 0.125 / self.scale)).acos() * 2.0;
        // Degenerate radii give acos(0) * 2 = PI, still a finite step.
        let da = if da.is_finite() && da > 0.0 { da } else { PI / 2.0 };

        let mut a2 = a2;
        if increasing {
            while a2 < a1 {
                a2 += PI * 2.0;
            }
            self.da = da;
        } else {
            while a2 > a1 {
                a2 -= PI * 2.0;
            }
            self.da = -da;
        }
        self.start = a1;
        self.end = a2;
    }

    #[inline]
    fn point(&self, a: f64) -> (f64, f64) {
        (self.cx + a.cos() * self.rx, self.cy + a.sin() * self.ry)
    }

    fn finished(&self) -> bool {
        if self.da > 0.0 {
            self.angle >= self.end - self.da / 4.0
        } else {
            self.angle <= self.end - self.da / 4.0
        }
    }
}

impl VertexSource for Arc {
    fn rewind(&mut self) {
        self.path_cmd = PATH_CMD_MOVE_TO;
        self.angle = self.start;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.path_cmd == PATH_CMD_STOP {
            return PATH_CMD_STOP;
        }

        let cmd = self.path_cmd;
        if self.finished() {
            (*x, *y) = self.point(self.end);
            self.path_cmd = PATH_CMD_STOP;
            return cmd;
        }

        (*x, *y) = self.point(self.angle);
        self.angle += self.da;
        self.path_cmd = PATH_CMD_LINE_TO;
        cmd
    }
}

/// Closed band of `thickness` pixels following an elliptical arc inward from
/// the ellipse inscribed in `(x1, y1)-(x2, y2)`.
///
/// Angles are in degrees and sweep clockwise on screen from `start_deg` to
/// `end_deg`, the way the fallback glyph describes its bands.
pub fn arc_band(
    (x1, y1, x2, y2): (f64, f64, f64, f64),
    start_deg: f64,
    end_deg: f64,
    thickness: f64,
) -> PathStorage {
    let cx = (x1 + x2) / 2.0;
    let cy = (y1 + y2) / 2.0;
    let rx = (x2 - x1).abs() / 2.0;
    let ry = (y2 - y1).abs() / 2.0;
    let t = thickness.max(0.0);
    let (a1, a2) = (deg2rad(start_deg), deg2rad(end_deg));

    let mut path = PathStorage::new();
    let mut outer = Arc::new(cx, cy, rx, ry, a1, a2, true);
    path.concat_path(&mut outer);

    // Inner edge runs back the other way; radii collapse to the centre when
    // the band is thicker than the ellipse.
    let inner_end = outer.end;
    let mut inner = Arc::new(cx, cy, (rx - t).max(0.0), (ry - t).max(0.0), inner_end, a1, false);
    let (mut x, mut y) = (0.0, 0.0);
    inner.rewind();
    loop {
        let cmd = inner.vertex(&mut x, &mut y);
        if cmd == PATH_CMD_STOP {
            break;
        }
        path.line_to(x, y);
    }
    path.close_polygon();
    path
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::is_vertex;

    fn collect(vs: &mut dyn VertexSource) -> Vec<(f64, f64, u32)> {
        let mut out = Vec::new();
        let (mut x, mut y) = (0.0, 0.0);
        vs.rewind();
        loop {
            let cmd = vs.vertex(&mut x, &mut y);
            if cmd == PATH_CMD_STOP {
                break;
            }
            out.push((x, y, cmd));
        }
        out
    }

    #[test]
    fn test_quarter_arc_clockwise_on_screen() {
        // From pointing right to pointing down.
        let mut arc = Arc::new(0.0, 0.0, 10.0, 10.0, 0.0, PI / 2.0, true);
        let v = collect(&mut arc);
        assert_eq!(v[0].2, PATH_CMD_MOVE_TO);
        assert!((v[0].0 - 10.0).abs() < 1e-9 && v[0].1.abs() < 1e-9);
        let last = v.last().unwrap();
        assert!(last.0.abs() < 1e-9);
        assert!((last.1 - 10.0).abs() < 1e-9);
        assert!(v[1..].iter().all(|p| p.2 == PATH_CMD_LINE_TO));
        // All points on the circle.
        for p in &v {
            assert!(((p.0 * p.0 + p.1 * p.1).sqrt() - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_wraps_end_angle() {
        // 270 -> 90 degrees increasing passes through 0 (the right side).
        let mut arc = Arc::new(0.0, 0.0, 10.0, 10.0, deg2rad(270.0), deg2rad(90.0), true);
        let v = collect(&mut arc);
        assert!(v.iter().any(|p| p.0 > 9.9));
        assert!(v.iter().all(|p| p.0 > -1e-9));
    }

    #[test]
    fn test_decreasing_sweep() {
        let mut arc = Arc::new(0.0, 0.0, 10.0, 10.0, PI / 2.0, 0.0, false);
        let v = collect(&mut arc);
        assert!((v[0].1 - 10.0).abs() < 1e-9);
        let last = v.last().unwrap();
        assert!((last.0 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_approximation_scale_adds_vertices() {
        let mut arc = Arc::new(0.0, 0.0, 100.0, 100.0, 0.0, PI * 2.0, true);
        let coarse = collect(&mut arc).len();
        arc.set_approximation_scale(4.0);
        assert_eq!(arc.approximation_scale(), 4.0);
        let fine = collect(&mut arc).len();
        assert!(fine > coarse);
    }

    #[test]
    fn test_zero_radius_terminates() {
        let mut arc = Arc::new(5.0, 5.0, 0.0, 0.0, 0.0, PI, true);
        let v = collect(&mut arc);
        assert!(!v.is_empty());
        assert!(v.iter().all(|p| p.0 == 5.0 && p.1 == 5.0));
    }

    #[test]
    fn test_arc_band_is_closed_and_bounded() {
        let mut band = arc_band((0.0, 0.0, 40.0, 20.0), 90.0, 270.0, 4.0);
        assert!(band.is_closed());
        let v = collect(&mut band);
        for p in v.iter().filter(|p| is_vertex(p.2)) {
            // Left half of the ellipse only.
            assert!(p.0 <= 20.0 + 1e-9);
            assert!(p.0 >= -1e-9 && p.1 >= -1e-9 && p.1 <= 20.0 + 1e-9);
        }
    }
}
