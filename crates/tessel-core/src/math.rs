//! Math types used throughout Tessel.
//!
//! Everything is re-exported from [`glam`], so vertex data can be uploaded with
//! `bytemuck` without conversion.
//!
//! ```
//! use tessel_core::math::{Mat4, Vec3};
//!
//! let model = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
//! assert_eq!(model.transform_point3(Vec3::ZERO), Vec3::new(0.0, 0.0, -5.0));
//! ```
//!
//! [`glam`]: https://docs.rs/glam

pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self { min: first, max: first }, |aabb, p| Self {
            min: aabb.min.min(*p),
            max: aabb.max.max(*p),
        }))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_points() {
        let points = [
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-3.0, 4.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
        ];
        let aabb = Aabb::from_points(&points).unwrap();
        assert_eq!(aabb.min, Vec3::new(-3.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 2.0));
        assert_eq!(aabb.size(), Vec3::new(4.0, 6.0, 2.0));
    }

    #[test]
    fn test_aabb_empty() {
        assert!(Aabb::from_points(&[] as &[Vec3]).is_none());
    }
}
