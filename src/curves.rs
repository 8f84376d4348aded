//! Bezier curve flattening.
//!
//! Quadratic and cubic curves are flattened by recursive de Casteljau
//! subdivision until the control points lie within a distance tolerance of
//! the chord. [`ConvCurve`] applies this to any vertex source so downstream
//! stages only ever see `move_to`, `line_to`, and `end_poly`.

use crate::basics::{
    is_stop, VertexSource, PATH_CMD_CURVE3, PATH_CMD_CURVE4, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO,
    PATH_CMD_STOP,
};

const CURVE_RECURSION_LIMIT: u32 = 32;
const CURVE_COLLINEARITY_EPSILON: f64 = 1e-30;

/// Squared distance tolerance for a given approximation scale.
#[inline]
fn tolerance_square(approximation_scale: f64) -> f64 {
    let t = 0.5 / approximation_scale.max(1e-6);
    t * t
}

/// Flatten a quadratic Bezier. Pushes every point after `(x1, y1)`,
/// ending exactly at `(x3, y3)`.
pub fn flatten_curve3(
    points: &mut Vec<(f64, f64)>,
    (x1, y1): (f64, f64),
    (x2, y2): (f64, f64),
    (x3, y3): (f64, f64),
    approximation_scale: f64,
) {
    let tol = tolerance_square(approximation_scale);
    recursive_curve3(points, x1, y1, x2, y2, x3, y3, tol, 0);
    points.push((x3, y3));
}

#[allow(clippy::too_many_arguments)]
fn recursive_curve3(
    points: &mut Vec<(f64, f64)>,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    x3: f64,
    y3: f64,
    tol: f64,
    level: u32,
) {
    if level > CURVE_RECURSION_LIMIT {
        return;
    }

    let x12 = (x1 + x2) / 2.0;
    let y12 = (y1 + y2) / 2.0;
    let x23 = (x2 + x3) / 2.0;
    let y23 = (y2 + y3) / 2.0;
    let x123 = (x12 + x23) / 2.0;
    let y123 = (y12 + y23) / 2.0;

    let dx = x3 - x1;
    let dy = y3 - y1;
    let d = ((x2 - x3) * dy - (y2 - y3) * dx).abs();
    let chord = dx * dx + dy * dy;

    if d > CURVE_COLLINEARITY_EPSILON {
        if d * d <= tol * chord {
            points.push((x123, y123));
            return;
        }
    } else {
        // Collinear: nothing to add unless the control point overshoots.
        if chord == 0.0 {
            return;
        }
        let t = ((x2 - x1) * dx + (y2 - y1) * dy) / chord;
        if t > 0.0 && t < 1.0 {
            return;
        }
    }

    recursive_curve3(points, x1, y1, x12, y12, x123, y123, tol, level + 1);
    recursive_curve3(points, x123, y123, x23, y23, x3, y3, tol, level + 1);
}

/// Flatten a cubic Bezier. Pushes every point after `(x1, y1)`,
/// ending exactly at `(x4, y4)`.
pub fn flatten_curve4(
    points: &mut Vec<(f64, f64)>,
    (x1, y1): (f64, f64),
    (x2, y2): (f64, f64),
    (x3, y3): (f64, f64),
    (x4, y4): (f64, f64),
    approximation_scale: f64,
) {
    let tol = tolerance_square(approximation_scale);
    recursive_curve4(points, [x1, y1, x2, y2, x3, y3, x4, y4], tol, 0);
    points.push((x4, y4));
}

fn recursive_curve4(points: &mut Vec<(f64, f64)>, c: [f64; 8], tol: f64, level: u32) {
    if level > CURVE_RECURSION_LIMIT {
        return;
    }
    let [x1, y1, x2, y2, x3, y3, x4, y4] = c;

    let x12 = (x1 + x2) / 2.0;
    let y12 = (y1 + y2) / 2.0;
    let x23 = (x2 + x3) / 2.0;
    let y23 = (y2 + y3) / 2.0;
    let x34 = (x3 + x4) / 2.0;
    let y34 = (y3 + y4) / 2.0;
    let x123 = (x12 + x23) / 2.0;
    let y123 = (y12 + y23) / 2.0;
    let x234 = (x23 + x34) / 2.0;
    let y234 = (y23 + y34) / 2.0;
    let x1234 = (x123 + x234) / 2.0;
    let y1234 = (y123 + y234) / 2.0;

    let dx = x4 - x1;
    let dy = y4 - y1;
    let d2 = ((x2 - x4) * dy - (y2 - y4) * dx).abs();
    let d3 = ((x3 - x4) * dy - (y3 - y4) * dx).abs();
    let chord = dx * dx + dy * dy;

    if d2 + d3 > CURVE_COLLINEARITY_EPSILON {
        if (d2 + d3) * (d2 + d3) <= tol * chord {
            points.push((x1234, y1234));
            return;
        }
    } else if chord == 0.0 {
        return;
    } else {
        points.push((x1234, y1234));
        return;
    }

    recursive_curve4(points, [x1, y1, x12, y12, x123, y123, x1234, y1234], tol, level + 1);
    recursive_curve4(points, [x1234, y1234, x234, y234, x34, y34, x4, y4], tol, level + 1);
}

// ============================================================================
// ConvCurve: curve-flattening converter
// ============================================================================

/// Wraps a vertex source and replaces curve commands with line segments.
pub struct ConvCurve<VS: VertexSource> {
    source: VS,
    approximation_scale: f64,
    last: (f64, f64),
    pending: Vec<(f64, f64)>,
    pending_pos: usize,
}

impl<VS: VertexSource> ConvCurve<VS> {
    pub fn new(source: VS) -> Self {
        Self {
            source,
            approximation_scale: 1.0,
            last: (0.0, 0.0),
            pending: Vec::new(),
            pending_pos: 0,
        }
    }

    /// Higher scale means finer flattening.
    pub fn set_approximation_scale(&mut self, s: f64) {
        self.approximation_scale = s;
    }

    pub fn approximation_scale(&self) -> f64 {
        self.approximation_scale
    }

    pub fn source_mut(&mut self) -> &mut VS {
        &mut self.source
    }
}

impl<VS: VertexSource> VertexSource for ConvCurve<VS> {
    fn rewind(&mut self) {
        self.source.rewind();
        self.last = (0.0, 0.0);
        self.pending.clear();
        self.pending_pos = 0;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.pending_pos < self.pending.len() {
            let (px, py) = self.pending[self.pending_pos];
            self.pending_pos += 1;
            *x = px;
            *y = py;
            self.last = (px, py);
            return PATH_CMD_LINE_TO;
        }

        let (mut cx, mut cy) = (0.0, 0.0);
        let cmd = self.source.vertex(&mut cx, &mut cy);
        match cmd {
            PATH_CMD_CURVE3 => {
                let (mut ex, mut ey) = (0.0, 0.0);
                let end_cmd = self.source.vertex(&mut ex, &mut ey);
                if is_stop(end_cmd) {
                    return PATH_CMD_STOP;
                }
                self.pending.clear();
                self.pending_pos = 0;
                flatten_curve3(
                    &mut self.pending,
                    self.last,
                    (cx, cy),
                    (ex, ey),
                    self.approximation_scale,
                );
                self.vertex(x, y)
            }
            PATH_CMD_CURVE4 => {
                let (mut c2x, mut c2y) = (0.0, 0.0);
                let (mut ex, mut ey) = (0.0, 0.0);
                if is_stop(self.source.vertex(&mut c2x, &mut c2y))
                    || is_stop(self.source.vertex(&mut ex, &mut ey))
                {
                    return PATH_CMD_STOP;
                }
                self.pending.clear();
                self.pending_pos = 0;
                flatten_curve4(
                    &mut self.pending,
                    self.last,
                    (cx, cy),
                    (c2x, c2y),
                    (ex, ey),
                    self.approximation_scale,
                );
                self.vertex(x, y)
            }
            PATH_CMD_MOVE_TO | PATH_CMD_LINE_TO => {
                self.last = (cx, cy);
                *x = cx;
                *y = cy;
                cmd
            }
            _ => {
                *x = cx;
                *y = cy;
                cmd
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
