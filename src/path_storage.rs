//! Path storage: the vertex container every shape is built in.
//!
//! Stores vertices with path commands in a flat `Vec`. Glyph outlines, the
//! block font's cell rectangles, and the geometric fallback shape all end up
//! here before rasterization.

use crate::basics::{
    is_end_poly, is_vertex, VertexSource, PATH_CMD_CURVE3, PATH_CMD_CURVE4, PATH_CMD_END_POLY,
    PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO, PATH_CMD_STOP, PATH_FLAGS_CLOSE,
};

/// A vertex with coordinates and a path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub cmd: u32,
}

impl Vertex {
    pub fn new(x: f64, y: f64, cmd: u32) -> Self {
        Self { x, y, cmd }
    }
}

/// Ordered sequence of vertices, possibly several closed sub-paths.
#[derive(Debug, Clone, Default)]
pub struct PathStorage {
    vertices: Vec<Vertex>,
    iterator: usize,
}

impl PathStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.vertices.push(Vertex::new(x, y, PATH_CMD_MOVE_TO));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.vertices.push(Vertex::new(x, y, PATH_CMD_LINE_TO));
    }

    /// Quadratic Bezier from the current point through `(x_ctrl, y_ctrl)`.
    pub fn curve3(&mut self, x_ctrl: f64, y_ctrl: f64, x_to: f64, y_to: f64) {
        self.vertices.push(Vertex::new(x_ctrl, y_ctrl, PATH_CMD_CURVE3));
        self.vertices.push(Vertex::new(x_to, y_to, PATH_CMD_CURVE3));
    }

    /// Cubic Bezier from the current point.
    #[allow(clippy::too_many_arguments)]
    pub fn curve4(
        &mut self,
        x_ctrl1: f64,
        y_ctrl1: f64,
        x_ctrl2: f64,
        y_ctrl2: f64,
        x_to: f64,
        y_to: f64,
    ) {
        self.vertices.push(Vertex::new(x_ctrl1, y_ctrl1, PATH_CMD_CURVE4));
        self.vertices.push(Vertex::new(x_ctrl2, y_ctrl2, PATH_CMD_CURVE4));
        self.vertices.push(Vertex::new(x_to, y_to, PATH_CMD_CURVE4));
    }

    /// Close the current polygon. Does nothing if it is already closed or
    /// the path is empty.
    pub fn close_polygon(&mut self) {
        if let Some(last) = self.vertices.last() {
            if is_vertex(last.cmd) {
                self.vertices
                    .push(Vertex::new(0.0, 0.0, PATH_CMD_END_POLY | PATH_FLAGS_CLOSE));
            }
        }
    }

    /// Append a closed axis-aligned rectangle.
    pub fn rect(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.move_to(x1, y1);
        self.line_to(x2, y1);
        self.line_to(x2, y2);
        self.line_to(x1, y2);
        self.close_polygon();
    }

    /// Append every vertex of another source.
    pub fn concat_path(&mut self, vs: &mut dyn VertexSource) {
        let (mut x, mut y) = (0.0, 0.0);
        vs.rewind();
        loop {
            let cmd = vs.vertex(&mut x, &mut y);
            if cmd == PATH_CMD_STOP {
                break;
            }
            self.vertices.push(Vertex::new(x, y, cmd));
        }
    }

    /// Offset every vertex by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for v in self.vertices.iter_mut().filter(|v| is_vertex(v.cmd)) {
            v.x += dx;
            v.y += dy;
        }
    }

    /// Scale every vertex about the origin.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        for v in self.vertices.iter_mut().filter(|v| is_vertex(v.cmd)) {
            v.x *= sx;
            v.y *= sy;
        }
    }

    pub fn total_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of closed or open sub-paths.
    pub fn total_paths(&self) -> usize {
        self.vertices.iter().filter(|v| v.cmd == PATH_CMD_MOVE_TO).count()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Command of the last vertex, or `PATH_CMD_STOP` when empty.
    pub fn last_command(&self) -> u32 {
        self.vertices.last().map_or(PATH_CMD_STOP, |v| v.cmd)
    }

    /// Returns `true` if the last sub-path has been closed.
    pub fn is_closed(&self) -> bool {
        is_end_poly(self.last_command())
    }
}

impl VertexSource for PathStorage {
    fn rewind(&mut self) {
        self.iterator = 0;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> u32 {
        if self.iterator >= self.vertices.len() {
            return PATH_CMD_STOP;
        }
        let v = &self.vertices[self.iterator];
        *x = v.x;
        *y = v.y;
        self.iterator += 1;
        v.cmd
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(ps: &mut PathStorage) -> Vec<(f64, f64, u32)> {
        let mut out = Vec::new();
        let (mut x, mut y) = (0.0, 0.0);
        ps.rewind();
        loop {
            let cmd = ps.vertex(&mut x, &mut y);
            if cmd == PATH_CMD_STOP {
                break;
            }
            out.push((x, y, cmd));
        }
        out
    }

    #[test]
    fn test_rect_is_closed_polygon() {
        let mut ps = PathStorage::new();
        ps.rect(1.0, 2.0, 3.0, 4.0);
        let v = drain(&mut ps);
        assert_eq!(v.len(), 5);
        assert_eq!(v[0], (1.0, 2.0, PATH_CMD_MOVE_TO));
        assert_eq!(v[2], (3.0, 4.0, PATH_CMD_LINE_TO));
        assert_eq!(v[4].2, PATH_CMD_END_POLY | PATH_FLAGS_CLOSE);
        assert!(ps.is_closed());
        assert_eq!(ps.total_paths(), 1);
    }

    #[test]
    fn test_close_polygon_is_idempotent() {
        let mut ps = PathStorage::new();
        ps.close_polygon();
        assert!(ps.is_empty());
        ps.move_to(0.0, 0.0);
        ps.line_to(1.0, 0.0);
        ps.close_polygon();
        ps.close_polygon();
        assert_eq!(ps.total_vertices(), 3);
    }

    #[test]
    fn test_translate_skips_end_poly() {
        let mut ps = PathStorage::new();
        ps.rect(0.0, 0.0, 1.0, 1.0);
        ps.translate(10.0, -5.0);
        let v = drain(&mut ps);
        assert_eq!(v[0], (10.0, -5.0, PATH_CMD_MOVE_TO));
        assert_eq!(v[4].0, 0.0);
        assert_eq!(v[4].1, 0.0);
    }

    #[test]
    fn test_scale_and_curves() {
        let mut ps = PathStorage::new();
        ps.move_to(1.0, 1.0);
        ps.curve3(2.0, 2.0, 3.0, 1.0);
        ps.curve4(4.0, 0.0, 5.0, 0.0, 6.0, 1.0);
        ps.scale(2.0, 3.0);
        let v = drain(&mut ps);
        assert_eq!(v.len(), 6);
        assert_eq!(v[1], (4.0, 6.0, PATH_CMD_CURVE3));
        assert_eq!(v[5], (12.0, 3.0, PATH_CMD_CURVE4));
    }

    #[test]
    fn test_concat_path() {
        let mut a = PathStorage::new();
        a.rect(0.0, 0.0, 1.0, 1.0);
        let mut b = PathStorage::new();
        b.rect(2.0, 2.0, 3.0, 3.0);
        a.concat_path(&mut b);
        assert_eq!(a.total_vertices(), 10);
        assert_eq!(a.total_paths(), 2);
    }
}
