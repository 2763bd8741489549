//! 4x4 transform matrices for the tilting card canvas.
//!
//! Transforms are listed outermost first and post-multiplied, so the last
//! entry in a list is the first one applied to a point.

use serde::{Deserialize, Serialize};

/// Row-major 4x4 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4(pub [[f32; 4]; 4]);

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    pub const IDENTITY: Matrix4 = Matrix4([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub fn translate(x: f32, y: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.0[0][3] = x;
        m.0[1][3] = y;
        m
    }

    pub fn perspective(distance: f32) -> Self {
        let mut m = Self::IDENTITY;
        if distance != 0.0 {
            m.0[3][2] = -1.0 / distance;
        }
        m
    }

    pub fn rotate_x(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Matrix4([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotate_y(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Matrix4([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// `self * rhs`
    pub fn then(&self, rhs: &Matrix4) -> Matrix4 {
        let mut out = [[0.0f32; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.0[r][k] * rhs.0[k][c]).sum();
            }
        }
        Matrix4(out)
    }

    /// Map a point on the z = 0 plane, applying the perspective divide.
    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        let m = &self.0;
        let px = m[0][0] * x + m[0][1] * y + m[0][3];
        let py = m[1][0] * x + m[1][1] * y + m[1][3];
        let w = m[3][0] * x + m[3][1] * y + m[3][3];
        if w.abs() < f32::EPSILON {
            return (px, py);
        }
        (px / w, py / w)
    }
}

/// Fold a list of transforms, outermost first.
fn compose(transforms: &[Matrix4]) -> Matrix4 {
    transforms
        .iter()
        .fold(Matrix4::IDENTITY, |acc, m| acc.then(m))
}

/// Matrix for a card rotating about its center.
///
/// Order: move the pivot to the origin's place, add perspective, rotate
/// around X then Y, move back, then shift down by `y_offset` (the canvas is
/// taller than the card).
pub fn card_matrix(
    pivot: (f32, f32),
    perspective: f32,
    rotate_x: f32,
    rotate_y: f32,
    y_offset: f32,
) -> Matrix4 {
    compose(&[
        Matrix4::translate(pivot.0, pivot.1),
        Matrix4::perspective(perspective),
        Matrix4::rotate_x(rotate_x),
        Matrix4::rotate_y(rotate_y),
        Matrix4::translate(-pivot.0, -pivot.1),
        Matrix4::translate(0.0, y_offset),
    ])
}
