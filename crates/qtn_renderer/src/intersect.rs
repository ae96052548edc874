//! Segment-triangle intersection via signed tetrahedron volumes.
//!
//! A segment crosses a triangle when its endpoints lie on opposite sides of
//! the triangle's plane and the segment passes inside all three edges. Both
//! conditions are orientation tests, so no normal orientation is assumed.

use qtn_core::Triangle;
use qtn_math::{DVec3, Segment};

/// Relative threshold below which a segment counts as parallel to a plane.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Signed volume of the tetrahedron `(a, b, c, d)`.
///
/// Positive when `d` lies on the side of plane `(a, b, c)` that its normal
/// `(b - a) x (c - a)` points to.
#[inline]
pub fn signed_volume(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> f64 {
    (b - a).cross(c - a).dot(d - a) / 6.0
}

#[inline]
fn positive(volume: f64) -> bool {
    volume > 0.0
}

/// Test whether the segment `q1 -> q2` crosses `tri`.
///
/// Zero volumes count as non-positive, so a segment lying in the
/// triangle's plane never intersects, and touching exactly at an edge or
/// endpoint may go either way.
pub fn intersects(q1: DVec3, q2: DVec3, tri: &Triangle) -> bool {
    let (p1, p2, p3) = (tri.p1, tri.p2, tri.p3);

    let start_side = positive(signed_volume(q1, p1, p2, p3));
    let end_side = positive(signed_volume(q2, p1, p2, p3));
    if start_side == end_side {
        return false;
    }

    let e1 = positive(signed_volume(q1, q2, p1, p2));
    let e2 = positive(signed_volume(q1, q2, p2, p3));
    let e3 = positive(signed_volume(q1, q2, p3, p1));
    e1 == e2 && e2 == e3
}

/// Point where the line through `q1` and `q2` meets the plane of `tri`.
///
/// Uses the normal stored on the triangle, computing it from the vertices
/// only when it has not been populated. Returns `None` when the line is
/// parallel to the plane (or the triangle is degenerate). This does not
/// check that the point lies inside the triangle; pair it with
/// [`intersects`].
pub fn intersection_point(q1: DVec3, q2: DVec3, tri: &Triangle) -> Option<DVec3> {
    let normal = if tri.normal == DVec3::ZERO {
        tri.face_normal()
    } else {
        tri.normal
    };
    let direction = q2 - q1;

    let denom = direction.dot(normal);
    if denom.abs() <= PARALLEL_EPSILON * normal.length() * direction.length() {
        return None;
    }

    let t = -(q1 - tri.p1).dot(normal) / denom;
    Some(q1 + direction * t)
}

/// Intersection point of a segment with a triangle, if they cross.
pub fn intersect_segment(segment: &Segment, tri: &Triangle) -> Option<DVec3> {
    if intersects(segment.start, segment.end, tri) {
        intersection_point(segment.start, segment.end, tri)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Triangle in the plane y = 3, covering the origin of the xz plane.
    fn wall() -> Triangle {
        Triangle::new(
            DVec3::new(-1.0, 3.0, -1.0),
            DVec3::new(1.0, 3.0, -1.0),
            DVec3::new(0.0, 3.0, 1.0),
        )
    }

    #[test]
    fn test_signed_volume_unit_tetrahedron() {
        let v = signed_volume(DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z);
        assert!((v - 1.0 / 6.0).abs() < 1e-15);

        // Swapping two vertices flips the sign
        let w = signed_volume(DVec3::ZERO, DVec3::Y, DVec3::X, DVec3::Z);
        assert!((w + 1.0 / 6.0).abs() < 1e-15);
    }

    #[test]
    fn test_segment_through_interior() {
        let tri = wall();
        let q1 = DVec3::ZERO;
        let q2 = DVec3::new(0.0, 10.0, 0.0);

        assert!(intersects(q1, q2, &tri));
        // Direction of travel does not matter
        assert!(intersects(q2, q1, &tri));

        let point = intersection_point(q1, q2, &tri).unwrap();
        assert!((point - DVec3::new(0.0, 3.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_winding_does_not_matter() {
        let tri = wall();
        let reversed = Triangle::new(tri.p3, tri.p2, tri.p1);
        let q1 = DVec3::new(0.2, -1.0, 0.1);
        let q2 = DVec3::new(0.2, 8.0, 0.1);

        assert!(intersects(q1, q2, &tri));
        assert!(intersects(q1, q2, &reversed));
    }

    #[test]
    fn test_oblique_segment() {
        let tri = Triangle::new(
            DVec3::new(-2.0, 0.0, -2.0),
            DVec3::new(-2.0, 0.0, 2.0),
            DVec3::new(2.0, 0.0, 0.0),
        );
        let q1 = DVec3::new(0.0, -10.0, 0.0);
        let q2 = DVec3::new(0.0, 10.0, 1.9);

        assert!(intersects(q1, q2, &tri));
        let point = intersection_point(q1, q2, &tri).unwrap();
        assert!((point - DVec3::new(0.0, 0.0, 0.95)).length() < 1e-12);
    }

    #[test]
    fn test_stored_normal_is_used() {
        let q1 = DVec3::new(0.3, -2.0, 0.2);
        let q2 = DVec3::new(0.1, 9.0, -0.1);

        let mut tri = wall();
        let computed = intersection_point(q1, q2, &tri).unwrap();

        tri.compute_normal();
        let stored = intersection_point(q1, q2, &tri).unwrap();
        assert!((stored - computed).length() < 1e-12);
        assert!((stored.y - 3.0).abs() < 1e-12);

        // A stored normal parallel to the segment wins over the vertices
        tri.normal = DVec3::X;
        assert_eq!(intersection_point(DVec3::ZERO, DVec3::Y, &tri), None);
    }

    #[test]
    fn test_crossing_plane_outside_footprint() {
        let tri = wall();
        assert!(!intersects(
            DVec3::new(5.0, 0.0, 0.0),
            DVec3::new(5.0, 10.0, 0.0),
            &tri
        ));
    }

    #[test]
    fn test_parallel_segment_offset() {
        let tri = wall();
        let q1 = DVec3::new(-5.0, 1.0, 0.0);
        let q2 = DVec3::new(5.0, 1.0, 0.0);

        assert!(!intersects(q1, q2, &tri));
        assert_eq!(intersection_point(q1, q2, &tri), None);
    }

    #[test]
    fn test_coplanar_segment_is_not_an_intersection() {
        let tri = wall();
        let q1 = DVec3::new(-5.0, 3.0, 0.0);
        let q2 = DVec3::new(5.0, 3.0, 0.0);

        assert!(!intersects(q1, q2, &tri));
        assert!(!intersects(
            DVec3::new(0.0, 3.0, 0.0),
            DVec3::new(0.1, 3.0, 0.1),
            &tri
        ));
    }

    #[test]
    fn test_segment_stopping_short() {
        let tri = wall();
        assert!(!intersects(DVec3::ZERO, DVec3::new(0.0, 2.0, 0.0), &tri));
    }

    #[test]
    fn test_degenerate_triangle_has_no_point() {
        let tri = Triangle::new(DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0));
        let q1 = DVec3::new(0.5, -1.0, 0.0);
        let q2 = DVec3::new(0.5, 1.0, 0.0);
        assert_eq!(intersection_point(q1, q2, &tri), None);
    }

    #[test]
    fn test_intersect_segment() {
        let tri = wall();
        let hit = Segment::new(DVec3::ZERO, DVec3::new(0.0, 6.0, 0.0));
        let miss = Segment::new(DVec3::new(3.0, 0.0, 0.0), DVec3::new(3.0, 6.0, 0.0));

        let point = intersect_segment(&hit, &tri).unwrap();
        assert!((point - hit.at(0.5)).length() < 1e-12);
        assert_eq!(intersect_segment(&miss, &tri), None);
    }
}
