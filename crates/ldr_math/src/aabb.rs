use crate::Vec3;

/// Axis-aligned bounding box.
///
/// The empty box has `min = +inf` and `max = -inf` so that including any
/// point produces a degenerate box around that point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// Create an empty AABB (contains nothing).
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing every point of the iterator.
    pub fn enclosing<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        points
            .into_iter()
            .fold(Self::empty(), |acc, p| acc.including(p))
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// This box grown to contain `p`.
    pub fn including(&self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The eight corners, min corner first.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let b = Aabb::empty();
        assert!(b.is_empty());
        assert_eq!(b.size(), Vec3::ZERO);
    }

    #[test]
    fn test_enclosing() {
        let b = Aabb::enclosing([
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::ZERO,
        ]);
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(b.max, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(b.centroid(), Vec3::new(1.5, 1.5, 1.5));
    }

    #[test]
    fn test_surrounding() {
        let a = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_points(Vec3::splat(2.0), Vec3::splat(3.0));
        let c = Aabb::surrounding(&a, &b);
        assert_eq!(c.min, Vec3::ZERO);
        assert_eq!(c.max, Vec3::splat(3.0));
    }

    #[test]
    fn test_surrounding_empty_is_identity() {
        let a = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        assert_eq!(Aabb::surrounding(&a, &Aabb::empty()), a);
    }
}
