//! Anti-aliased polygon rasterizer producing per-pixel coverage.
//!
//! Accepts polygon contours (move_to/line_to/close or any vertex source),
//! splits every edge into per-cell fragments and accumulates two values per
//! pixel cell:
//!
//! - `cover`: net winding contribution (sum of signed dy across the cell)
//! - `area`: sum of `(fx1 + fx2) * dy`, where `fx1`/`fx2` are the fragment's
//!   horizontal offsets inside the cell
//!
//! A left-to-right sweep of each row turns these into coverage:
//! `acc + cover - area / 2`, with `acc` the running sum of `cover` of the
//! cells to the left. Coverage is folded by the filling rule and quantized
//! to 8-bit levels.
//!
//! Cells live in a dense `width * height` grid since every target is a
//! whole intensity field.

use crate::basics::{is_close, is_move_to, is_stop, is_vertex, FillingRule, VertexSource};
use crate::curves::ConvCurve;
use crate::field::IntensityField;

/// Number of coverage levels between empty and full.
pub const COVER_FULL: f64 = 255.0;

/// Accumulated edge data of one pixel cell.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellAa {
    pub cover: f64,
    pub area: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Initial,
    MoveTo,
    LineTo,
}

/// Polygon rasterizer over a fixed `width × height` pixel grid.
///
/// Usage:
/// 1. Optionally set the filling rule.
/// 2. Define contours with `move_to_d()` / `line_to_d()` or `add_path()`.
/// 3. Read coverage with `sweep_row()` or composite into a field with
///    `render_ink()`.
pub struct RasterizerScanlineAa {
    width: usize,
    height: usize,
    cells: Vec<CellAa>,
    filling_rule: FillingRule,
    approximation_scale: f64,
    start: (f64, f64),
    current: (f64, f64),
    status: Status,
}

impl RasterizerScanlineAa {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![CellAa::default(); width * height],
            filling_rule: FillingRule::NonZero,
            approximation_scale: 1.0,
            start: (0.0, 0.0),
            current: (0.0, 0.0),
            status: Status::Initial,
        }
    }

    /// Discard all polygon data.
    pub fn reset(&mut self) {
        self.cells.fill(CellAa::default());
        self.status = Status::Initial;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Set the filling rule (non-zero winding or even-odd).
    pub fn filling_rule(&mut self, rule: FillingRule) {
        self.filling_rule = rule;
    }

    /// Curve flattening precision used by `add_path()`.
    pub fn set_approximation_scale(&mut self, s: f64) {
        self.approximation_scale = s;
    }

    /// Start a new contour, closing the previous one.
    pub fn move_to_d(&mut self, x: f64, y: f64) {
        self.close_polygon();
        self.start = (x, y);
        self.current = (x, y);
        self.status = Status::MoveTo;
    }

    pub fn line_to_d(&mut self, x: f64, y: f64) {
        if self.status == Status::Initial {
            self.move_to_d(x, y);
            return;
        }
        let (x0, y0) = self.current;
        self.line(x0, y0, x, y);
        self.current = (x, y);
        self.status = Status::LineTo;
    }

    /// Close the current contour back to its start point.
    pub fn close_polygon(&mut self) {
        if self.status == Status::LineTo {
            let (x0, y0) = self.current;
            let (x1, y1) = self.start;
            self.line(x0, y0, x1, y1);
            self.current = self.start;
        }
        self.status = Status::Initial;
    }

    /// Add every contour of a vertex source, flattening curves on the way.
    pub fn add_path<VS: VertexSource>(&mut self, vs: VS) {
        let mut conv = ConvCurve::new(vs);
        conv.set_approximation_scale(self.approximation_scale);
        let (mut x, mut y) = (0.0, 0.0);
        conv.rewind();
        loop {
            let cmd = conv.vertex(&mut x, &mut y);
            if is_stop(cmd) {
                break;
            }
            if is_move_to(cmd) {
                self.move_to_d(x, y);
            } else if is_vertex(cmd) {
                self.line_to_d(x, y);
            } else if is_close(cmd) {
                self.close_polygon();
            }
        }
        self.close_polygon();
    }

    // ========================================================================
    // Edge to cell conversion
    // ========================================================================

    /// Split an edge into rows and hand each row fragment to `row_segment`.
    fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return;
        }
        if y0 == y1 {
            return;
        }
        let (ymin, ymax) = (y0.min(y1), y0.max(y1));
        if ymax <= 0.0 || ymin >= self.height as f64 {
            return;
        }

        let dxdy = (x1 - x0) / (y1 - y0);
        let first_row = ymin.floor().max(0.0) as usize;
        let last_row = (ymax.ceil() as usize).min(self.height);
        for row in first_row..last_row {
            let top = row as f64;
            let bottom = top + 1.0;
            let ya = y0.clamp(top, bottom);
            let yb = y1.clamp(top, bottom);
            if ya == yb {
                continue;
            }
            let xa = x0 + (ya - y0) * dxdy;
            let xb = x0 + (yb - y0) * dxdy;
            self.row_segment(row, xa, ya, xb, yb);
        }
    }

    /// Clip a fragment inside one row against `x = 0` and `x = width`.
    ///
    /// Anything left of the canvas collapses onto its left edge (it still
    /// changes the winding of every pixel to the right); anything right of
    /// it is dropped.
    fn row_segment(&mut self, row: usize, xa: f64, ya: f64, xb: f64, yb: f64) {
        let w = self.width as f64;
        let dx = xb - xa;

        let mut cuts = [0.0, 1.0, 1.0, 1.0];
        let mut n = 1;
        if dx != 0.0 {
            for bx in [0.0, w] {
                let t = (bx - xa) / dx;
                if t > 0.0 && t < 1.0 {
                    cuts[n] = t;
                    n += 1;
                }
            }
        }
        cuts[n] = 1.0;
        cuts[1..n].sort_by(|a, b| a.total_cmp(b));

        for i in 0..n {
            let (t0, t1) = (cuts[i], cuts[i + 1]);
            let px0 = xa + dx * t0;
            let py0 = ya + (yb - ya) * t0;
            let px1 = xa + dx * t1;
            let py1 = ya + (yb - ya) * t1;
            let mid = (px0 + px1) / 2.0;
            if mid <= 0.0 {
                self.add_fragment(row, 0.0, 0.0, 0.0, py1 - py0);
            } else if mid < w {
                self.walk_cells(row, px0.clamp(0.0, w), py0, px1.clamp(0.0, w), py1);
            }
        }
    }

    /// Walk a fragment across the cells of one row.
    fn walk_cells(&mut self, row: usize, x0: f64, y0: f64, x1: f64, y1: f64) {
        let dx = x1 - x0;
        if dx == 0.0 {
            let cell = x0.floor();
            self.add_fragment(row, cell, x0, x1, y1 - y0);
            return;
        }

        let slope = (y1 - y0) / dx;
        let (mut cx, mut cy) = (x0, y0);
        loop {
            let (cell, boundary) = if dx > 0.0 {
                let c = cx.floor();
                (c, c + 1.0)
            } else {
                let c = cx.ceil() - 1.0;
                (c, c)
            };
            let reached = if dx > 0.0 { x1 <= boundary } else { x1 >= boundary };
            if reached {
                self.add_fragment(row, cell, cx, x1, y1 - cy);
                return;
            }
            let ny = y0 + (boundary - x0) * slope;
            self.add_fragment(row, cell, cx, boundary, ny - cy);
            cx = boundary;
            cy = ny;
        }
    }

    #[inline]
    fn add_fragment(&mut self, row: usize, cell: f64, xa: f64, xb: f64, dy: f64) {
        if self.width == 0 || dy == 0.0 {
            return;
        }
        let ci = (cell.max(0.0) as usize).min(self.width - 1);
        let left = ci as f64;
        let fx1 = (xa - left).clamp(0.0, 1.0);
        let fx2 = (xb - left).clamp(0.0, 1.0);
        let c = &mut self.cells[row * self.width + ci];
        c.cover += dy;
        c.area += (fx1 + fx2) * dy;
    }

    // ========================================================================
    // Sweep
    // ========================================================================

    /// Fold raw signed coverage by the filling rule and quantize it.
    pub fn calculate_alpha(&self, raw: f64) -> f64 {
        let mut cover = raw.abs();
        if self.filling_rule == FillingRule::EvenOdd {
            cover %= 2.0;
            if cover > 1.0 {
                cover = 2.0 - cover;
            }
        }
        (cover.min(1.0) * COVER_FULL).round() / COVER_FULL
    }

    /// Coverage of every pixel of `row` in `[0, 1]`. `out` must be `width` long.
    pub fn sweep_row(&self, row: usize, out: &mut [f64]) {
        let cells = &self.cells[row * self.width..(row + 1) * self.width];
        let mut acc = 0.0;
        for (o, c) in out.iter_mut().zip(cells) {
            *o = self.calculate_alpha(acc + c.cover - c.area / 2.0);
            acc += c.cover;
        }
    }

    /// Composite ink (value `0.0`) over `field` with the accumulated coverage:
    /// `v * (1 - coverage)`. Returns the number of pixels touched.
    ///
    /// The field must have the rasterizer's dimensions; rows or columns
    /// beyond either extent are ignored.
    pub fn render_ink(&self, field: &mut IntensityField) -> usize {
        let rows = self.height.min(field.height());
        let cols = self.width.min(field.width());
        let mut coverage = vec![0.0; self.width];
        let mut touched = 0;
        for row in 0..rows {
            self.sweep_row(row, &mut coverage);
            let dst = field.row_mut(row);
            for (d, &a) in dst[..cols].iter_mut().zip(&coverage[..cols]) {
                if a > 0.0 {
                    *d *= 1.0 - a;
                    touched += 1;
                }
            }
        }
        touched
    }
}

// ============================================================================
// Tests
// ============================================================================
