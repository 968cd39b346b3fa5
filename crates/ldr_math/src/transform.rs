// Transform utilities for Mat4
//
// LDraw stores a sub-file placement as a translation followed by a row-major
// 3x3 linear map. glam matrices are column-major, so the rows are transposed
// into columns here.

use glam::{Mat4, Vec3, Vec4};
use crate::Aabb;

/// Build the homogeneous matrix of an LDraw type 1 line.
///
/// The twelve values appear in the file as `x y z a b c d e f g h i` and
/// describe the matrix
///
/// ```text
/// | a b c x |
/// | d e f y |
/// | g h i z |
/// | 0 0 0 1 |
/// ```
pub fn ldraw_matrix(values: [f32; 12]) -> Mat4 {
    let [x, y, z, a, b, c, d, e, f, g, h, i] = values;
    Mat4::from_cols(
        Vec4::new(a, d, g, 0.0),
        Vec4::new(b, e, h, 0.0),
        Vec4::new(c, f, i, 0.0),
        Vec4::new(x, y, z, 1.0),
    )
}

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// The point the matrix maps the local origin to.
    fn origin(&self) -> Vec3;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn origin(&self) -> Vec3 {
        self.w_axis.truncate()
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::empty();
        }

        Aabb::enclosing(aabb.corners().map(|corner| self.transform_point3(corner)))
    }
}
