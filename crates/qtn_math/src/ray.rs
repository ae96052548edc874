use crate::DVec3;

/// A half-infinite ray in 3D space.
///
/// The direction is not required to be normalized; camera rays use a unit
/// forward component and tangent offsets on the other two axes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self { origin, direction }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }

    /// Clip the ray to the finite segment `[origin, at(t_max)]`.
    pub fn segment(&self, t_max: f64) -> Segment {
        Segment::new(self.origin, self.at(t_max))
    }
}

/// A finite line segment between two points.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Segment {
    pub start: DVec3,
    pub end: DVec3,
}

impl Segment {
    pub fn new(start: DVec3, end: DVec3) -> Self {
        Self { start, end }
    }

    /// Vector from start to end.
    #[inline]
    pub fn delta(&self) -> DVec3 {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.delta().length()
    }

    /// Point at parameter t, where 0 is `start` and 1 is `end`.
    #[inline]
    pub fn at(&self, t: f64) -> DVec3 {
        self.start + self.delta() * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(DVec3::ZERO, DVec3::X);

        assert_eq!(ray.at(0.0), DVec3::ZERO);
        assert_eq!(ray.at(1.0), DVec3::X);
        assert_eq!(ray.at(2.0), DVec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), DVec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_segment() {
        let ray = Ray::new(DVec3::new(1.0, 0.0, 0.0), DVec3::new(0.5, 1.0, 0.0));
        let segment = ray.segment(4.0);

        assert_eq!(segment.start, ray.origin);
        assert_eq!(segment.end, DVec3::new(3.0, 4.0, 0.0));
    }

    #[test]
    fn test_segment_at_and_length() {
        let segment = Segment::new(DVec3::ZERO, DVec3::new(0.0, 3.0, 4.0));

        assert_eq!(segment.length(), 5.0);
        assert_eq!(segment.at(0.0), segment.start);
        assert_eq!(segment.at(1.0), segment.end);
        assert_eq!(segment.at(0.5), DVec3::new(0.0, 1.5, 2.0));
    }

    #[test]
    fn test_ray_copy() {
        let ray1 = Ray::new(DVec3::ZERO, DVec3::Y);
        let ray2 = ray1; // Copy, not move

        assert_eq!(ray1.origin, ray2.origin);
        assert_eq!(ray1.at(1.0), ray2.at(1.0));
    }
}
