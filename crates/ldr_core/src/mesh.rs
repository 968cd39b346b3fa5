//! Mesh geometry representation for parsed LDraw parts.
//!
//! A mesh keeps LDraw's native polygons (triangles and quads) together with
//! the color code of each face and the type 2 edge lines. Points are stored
//! per element, exactly as they were read: there is no vertex welding here.
//! Welding, normal generation and other cleanup belong to the consumer.

use ldr_math::{Aabb, Mat4, Vec3};

use crate::color::ColorCode;

/// Vertex indices of a single face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polygon {
    Triangle([u32; 3]),
    Quad([u32; 4]),
}

impl Polygon {
    /// The indices in emission order.
    pub fn indices(&self) -> &[u32] {
        match self {
            Polygon::Triangle(i) => i,
            Polygon::Quad(i) => i,
        }
    }

    fn offset(&self, by: u32) -> Polygon {
        match *self {
            Polygon::Triangle([a, b, c]) => Polygon::Triangle([a + by, b + by, c + by]),
            Polygon::Quad([a, b, c, d]) => Polygon::Quad([a + by, b + by, c + by, d + by]),
        }
    }
}

/// A face and the color code it was declared with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    pub polygon: Polygon,
    pub color: ColorCode,
}

/// Points, faces and edge lines of one part.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    /// Vertex positions in the part's local frame
    pub points: Vec<Vec3>,

    /// Triangles and quads indexing into `points`
    pub faces: Vec<Face>,

    /// Type 2 lines as index pairs into `points`
    pub lines: Vec<[u32; 2]>,

    /// Axis-aligned bounding box of `points`
    pub bounds: Aabb,
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point and return its index.
    pub fn push_point(&mut self, p: Vec3) -> u32 {
        let index = self.points.len() as u32;
        self.points.push(p);
        self.bounds = self.bounds.including(p);
        index
    }

    /// Append a triangle.
    pub fn push_triangle(&mut self, v: [Vec3; 3], color: ColorCode) {
        let base = self.push_points(&v);
        self.faces.push(Face {
            polygon: Polygon::Triangle([base, base + 1, base + 2]),
            color,
        });
    }

    /// Append a quad. Points are stored in file order; `order` gives the
    /// emission order of the four corners.
    pub fn push_quad(&mut self, v: [Vec3; 4], order: [u32; 4], color: ColorCode) {
        let base = self.push_points(&v);
        self.faces.push(Face {
            polygon: Polygon::Quad(order.map(|i| base + i)),
            color,
        });
    }

    /// Append a type 2 line.
    pub fn push_line(&mut self, v: [Vec3; 2]) {
        let base = self.push_points(&v);
        self.lines.push([base, base + 1]);
    }

    fn push_points(&mut self, v: &[Vec3]) -> u32 {
        let base = self.points.len() as u32;
        for p in v {
            self.push_point(*p);
        }
        base
    }

    /// Merge `other` into this mesh.
    ///
    /// Points are mapped through `transform`. Faces declared with an
    /// inherit-like code take `color`, which itself may still be inherit-like
    /// when the reference was.
    pub fn append_transformed(&mut self, other: &Mesh, transform: Mat4, color: ColorCode) {
        let base = self.points.len() as u32;
        for p in &other.points {
            self.push_point(transform.transform_point3(*p));
        }

        for face in &other.faces {
            self.faces.push(Face {
                polygon: face.polygon.offset(base),
                color: face.color.resolve(color),
            });
        }

        for [a, b] in &other.lines {
            self.lines.push([a + base, b + base]);
        }
    }

    /// True when the mesh has neither faces nor lines.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.lines.is_empty()
    }

    /// Fan-triangulate every face into a flat index list.
    ///
    /// For a quad (0,1,2,3) this produces (0,1,2), (0,2,3).
    pub fn triangulate(&self) -> Vec<u32> {
        let mut indices = Vec::with_capacity(self.triangle_count() * 3);
        for face in &self.faces {
            let idx = face.polygon.indices();
            for i in 1..(idx.len() - 1) {
                indices.push(idx[0]);
                indices.push(idx[i]);
                indices.push(idx[i + 1]);
            }
        }
        indices
    }

    /// Number of triangles after triangulation.
    pub fn triangle_count(&self) -> usize {
        self.faces
            .iter()
            .map(|f| f.polygon.indices().len() - 2)
            .sum()
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Check that every face and line index is in range.
    pub fn indices_valid(&self) -> bool {
        let n = self.points.len() as u32;
        self.faces
            .iter()
            .flat_map(|f| f.polygon.indices().iter())
            .chain(self.lines.iter().flatten())
            .all(|&i| i < n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> [Vec3; 4] {
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_push_triangle() {
        let mut mesh = Mesh::new();
        mesh.push_triangle([Vec3::ZERO, Vec3::X, Vec3::Y], ColorCode::Palette(4));

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.faces[0].polygon, Polygon::Triangle([0, 1, 2]));
        assert!(mesh.indices_valid());
    }

    #[test]
    fn test_triangulate_quad() {
        let mut mesh = Mesh::new();
        mesh.push_quad(unit_quad(), [0, 1, 2, 3], ColorCode::Inherit);

        // Quad (0,1,2,3) -> triangles (0,1,2) and (0,2,3)
        assert_eq!(mesh.triangulate(), vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_quad_order_is_offset() {
        let mut mesh = Mesh::new();
        mesh.push_line([Vec3::ZERO, Vec3::X]);
        mesh.push_quad(unit_quad(), [0, 1, 3, 2], ColorCode::Inherit);

        assert_eq!(mesh.faces[0].polygon, Polygon::Quad([2, 3, 5, 4]));
        assert_eq!(mesh.lines, vec![[0, 1]]);
    }

    #[test]
    fn test_bounds_computation() {
        let mut mesh = Mesh::new();
        mesh.push_triangle(
            [
                Vec3::new(-1.0, -2.0, -3.0),
                Vec3::new(4.0, 5.0, 6.0),
                Vec3::new(0.0, 0.0, 0.0),
            ],
            ColorCode::Inherit,
        );

        assert_eq!(mesh.bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh.bounds.max, Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_append_transformed() {
        let mut primitive = Mesh::new();
        primitive.push_triangle([Vec3::ZERO, Vec3::X, Vec3::Y], ColorCode::Inherit);
        primitive.push_triangle([Vec3::ZERO, Vec3::X, Vec3::Y], ColorCode::Palette(0));

        let mut part = Mesh::new();
        part.push_line([Vec3::ZERO, Vec3::Z]);
        let offset = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        part.append_transformed(&primitive, offset, ColorCode::Palette(4));

        assert_eq!(part.vertex_count(), 8);
        assert_eq!(part.points[2], Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(part.faces[0].polygon, Polygon::Triangle([2, 3, 4]));
        assert_eq!(part.faces[0].color, ColorCode::Palette(4));
        assert_eq!(part.faces[1].color, ColorCode::Palette(0));
        assert!(part.indices_valid());
    }
}
