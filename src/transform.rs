//! 4x4 homogeneous transforms and model matrix construction.
//!
//! Every constructor in this module is written out row by row, the way the
//! matrix reads on paper, and stored in glam's column-major [`Mat4`]. The
//! resulting matrices act on column vectors (`m * v`), so translation lives in
//! the last column.
//!
//! # Example
//!
//! ```
//! use hello_triangle::{Transform, Vec3};
//!
//! let transform = Transform::new()
//!     .position(Vec3::new(0.0, 0.5, 0.0))
//!     .rotation(Vec3::new(0.0, 0.0, 90.0))
//!     .uniform_scale(0.5);
//!
//! let model = transform.model_matrix();
//! ```

use glam::{Mat4, Vec3};

/// Builds a matrix from its four rows.
fn from_rows(rows: [[f32; 4]; 4]) -> Mat4 {
    Mat4::from_cols_array_2d(&rows).transpose()
}

/// The identity matrix.
pub fn identity() -> Mat4 {
    from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Scale on the x, y and z axes.
pub fn scale(s: Vec3) -> Mat4 {
    from_rows([
        [s.x, 0.0, 0.0, 0.0],
        [0.0, s.y, 0.0, 0.0],
        [0.0, 0.0, s.z, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Rotation around the X axis (pitch), in radians.
pub fn rotate_x(rad: f32) -> Mat4 {
    let (sin, cos) = rad.sin_cos();
    from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, cos, -sin, 0.0],
        [0.0, sin, cos, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Rotation around the Y axis (yaw), in radians.
pub fn rotate_y(rad: f32) -> Mat4 {
    let (sin, cos) = rad.sin_cos();
    from_rows([
        [cos, 0.0, sin, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [-sin, 0.0, cos, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Rotation around the Z axis (roll), in radians.
pub fn rotate_z(rad: f32) -> Mat4 {
    let (sin, cos) = rad.sin_cos();
    from_rows([
        [cos, -sin, 0.0, 0.0],
        [sin, cos, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Translation by `t`.
pub fn translate(t: Vec3) -> Mat4 {
    from_rows([
        [1.0, 0.0, 0.0, t.x],
        [0.0, 1.0, 0.0, t.y],
        [0.0, 0.0, 1.0, t.z],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Position, Euler rotation and scale of an object.
///
/// Rotation is stored as Euler angles in **degrees**; [`model_matrix`]
/// converts them to radians. The model matrix is always composed as
///
/// ```text
/// scale(s) * rotate_z(r.z) * rotate_x(r.x) * rotate_y(r.y) * translate(p)
/// ```
///
/// The order is fixed.
///
/// [`model_matrix`]: Transform::model_matrix
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Translation.
    pub position: Vec3,
    /// Euler angles in degrees, one per axis.
    pub rotation: Vec3,
    /// Scale factors for each axis.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Creates an identity transform (origin, no rotation, unit scale).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transform placed at `position` with no rotation or scaling.
    ///
    /// ```
    /// use hello_triangle::{Transform, Vec3};
    ///
    /// let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
    /// assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
    /// ```
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Sets the position component.
    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the Euler rotation, in degrees.
    pub fn rotation(mut self, degrees: Vec3) -> Self {
        self.rotation = degrees;
        self
    }

    /// Sets per-axis scale factors.
    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the same scale factor on all axes.
    pub fn uniform_scale(mut self, s: f32) -> Self {
        self.scale = Vec3::splat(s);
        self
    }

    /// Composes the model matrix for this transform.
    pub fn model_matrix(&self) -> Mat4 {
        let radians = Vec3::new(
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        );

        identity()
            * scale(self.scale)
            * rotate_z(radians.z)
            * rotate_x(radians.x)
            * rotate_y(radians.y)
            * translate(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    const EPS: f32 = 1e-5;

    fn angles() -> impl Iterator<Item = f32> {
        (-16..=16).map(|i| i as f32 * (TAU / 16.0)).chain([0.1234, 1.0e-3, 100.0])
    }

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        assert!(a.abs_diff_eq(b, EPS), "expected\n{b}\ngot\n{a}");
    }

    #[test]
    fn rotations_are_orthonormal() {
        for theta in angles() {
            for m in [rotate_x(theta), rotate_y(theta), rotate_z(theta)] {
                assert_mat_eq(m.transpose() * m, Mat4::IDENTITY);
                assert!((m.determinant() - 1.0).abs() < EPS, "det at {theta}");
            }
        }
    }

    #[test]
    fn identity_is_multiplicative_identity() {
        let m = scale(Vec3::new(2.0, 3.0, 4.0)) * rotate_y(0.7) * translate(Vec3::new(1.0, -2.0, 5.0));
        assert_eq!(identity(), Mat4::IDENTITY);
        assert_mat_eq(identity() * m, m);
        assert_mat_eq(m * identity(), m);
    }

    #[test]
    fn default_transform_is_identity() {
        assert_eq!(Transform::default().model_matrix(), identity());
        assert_eq!(Transform::new(), Transform::default());
    }

    #[test]
    fn translations_compose_additively() {
        let a = Vec3::new(1.0, -2.0, 0.5);
        let b = Vec3::new(-4.0, 3.5, 10.0);
        assert_mat_eq(translate(a) * translate(b), translate(a + b));
    }

    #[test]
    fn constructors_match_glam() {
        for theta in angles() {
            assert_mat_eq(rotate_x(theta), Mat4::from_rotation_x(theta));
            assert_mat_eq(rotate_y(theta), Mat4::from_rotation_y(theta));
            assert_mat_eq(rotate_z(theta), Mat4::from_rotation_z(theta));
        }
        let v = Vec3::new(2.0, -1.0, 0.25);
        assert_mat_eq(scale(v), Mat4::from_scale(v));
        assert_mat_eq(translate(v), Mat4::from_translation(v));
    }

    #[test]
    fn translation_lives_in_last_column() {
        let m = translate(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn rotate_z_quarter_turn_maps_x_to_y() {
        let p = rotate_z(FRAC_PI_2).transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::Y, EPS), "{p}");
    }

    #[test]
    fn model_matrix_uses_fixed_order_and_degrees() {
        let t = Transform::new()
            .position(Vec3::new(0.5, -1.0, 2.0))
            .rotation(Vec3::new(30.0, 45.0, 60.0))
            .scale(Vec3::new(2.0, 1.0, 0.5));

        let expected = scale(t.scale)
            * rotate_z(60f32.to_radians())
            * rotate_x(30f32.to_radians())
            * rotate_y(45f32.to_radians())
            * translate(t.position);
        assert_mat_eq(t.model_matrix(), expected);

        let swapped = scale(t.scale)
            * rotate_y(45f32.to_radians())
            * rotate_x(30f32.to_radians())
            * rotate_z(60f32.to_radians())
            * translate(t.position);
        assert!(!t.model_matrix().abs_diff_eq(swapped, EPS));
    }

    #[test]
    fn translation_is_applied_before_scale() {
        // Points are translated first, then scaled, because translate is the rightmost factor.
        let t = Transform::from_position(Vec3::new(1.0, 0.0, 0.0)).uniform_scale(2.0);
        let p = t.model_matrix().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), EPS), "{p}");
    }

    #[test]
    fn half_turn_about_y_flips_x_and_z() {
        let t = Transform::new().rotation(Vec3::new(0.0, 180.0, 0.0));
        let p = t.model_matrix().transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert!(p.abs_diff_eq(Vec3::new(-1.0, 2.0, -3.0), 1e-4), "{p}");
        assert!((180f32.to_radians() - PI).abs() < EPS);
    }
}
