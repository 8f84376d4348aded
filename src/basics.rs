//! Foundation types, constants, and path command utilities.
//!
//! Everything the rasterization pipeline shares: path command encoding,
//! the [`VertexSource`] interface, the floating-point rectangle used for
//! glyph extents, and the integer helpers used for centering.

// ============================================================================
// Rounding and division helpers
// ============================================================================

/// Floor division for signed integers (rounds toward negative infinity).
///
/// Centering offsets go negative when a glyph is wider than the field, and
/// plain `/` would round those toward zero.
#[inline]
pub fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

/// Truncate a non-negative proportion of an integer extent, like `int(w * f)`.
#[inline]
pub fn scaled_extent(extent: usize, factor: f64) -> usize {
    let v = extent as f64 * factor;
    if v.is_finite() && v > 0.0 {
        v as usize
    } else {
        0
    }
}

// ============================================================================
// Filling rule
// ============================================================================

/// Filling rule for polygon rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillingRule {
    #[default]
    NonZero,
    EvenOdd,
}

// ============================================================================
// Mathematical constants
// ============================================================================

pub const PI: f64 = std::f64::consts::PI;

/// Convert degrees to radians.
#[inline]
pub fn deg2rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

// ============================================================================
// RectD
// ============================================================================

/// Axis-aligned rectangle with `f64` corners, `x1 <= x2`, `y1 <= y2` when valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectD {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl RectD {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Grow this rectangle to include the point `(x, y)`.
    pub fn include(&mut self, x: f64, y: f64) {
        self.x1 = self.x1.min(x);
        self.y1 = self.y1.min(y);
        self.x2 = self.x2.max(x);
        self.y2 = self.y2.max(y);
    }
}

// ============================================================================
// Path commands
// ============================================================================

pub const PATH_CMD_STOP: u32 = 0;
pub const PATH_CMD_MOVE_TO: u32 = 1;
pub const PATH_CMD_LINE_TO: u32 = 2;
pub const PATH_CMD_CURVE3: u32 = 3;
pub const PATH_CMD_CURVE4: u32 = 4;
pub const PATH_CMD_END_POLY: u32 = 0x0F;
pub const PATH_CMD_MASK: u32 = 0x0F;

pub const PATH_FLAGS_CLOSE: u32 = 0x40;

/// Returns `true` if `c` is a vertex command (move_to through curve4).
#[inline]
pub fn is_vertex(c: u32) -> bool {
    (PATH_CMD_MOVE_TO..PATH_CMD_END_POLY).contains(&c)
}

/// Returns `true` if `c` is the stop command.
#[inline]
pub fn is_stop(c: u32) -> bool {
    c == PATH_CMD_STOP
}

#[inline]
pub fn is_move_to(c: u32) -> bool {
    c == PATH_CMD_MOVE_TO
}

/// Returns `true` if `c` is an end_poly command (with any flags).
#[inline]
pub fn is_end_poly(c: u32) -> bool {
    (c & PATH_CMD_MASK) == PATH_CMD_END_POLY
}

/// Returns `true` if `c` closes the current polygon.
#[inline]
pub fn is_close(c: u32) -> bool {
    c == (PATH_CMD_END_POLY | PATH_FLAGS_CLOSE)
}

// ============================================================================
// VertexSource trait
// ============================================================================

/// A stream of vertices with path commands.
///
/// Path storage, the arc generator, and glyph outlines all implement this so
/// the rasterizer and the bounds measurement can consume any of them.
pub trait VertexSource {
    /// Reset to the beginning of the path.
    fn rewind(&mut self);

    /// Return the next vertex. Writes coordinates to `x` and `y`, returns a
    /// path command. Returns `PATH_CMD_STOP` when iteration is complete.
    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32;
}

impl<T: VertexSource> VertexSource for &mut T {
    fn rewind(&mut self) {
        (*self).rewind();
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        (*self).vertex(x, y)
    }
}

// ============================================================================
// Tests
// ============================================================================
