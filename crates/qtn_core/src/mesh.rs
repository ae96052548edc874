//! Triangle mesh representation for Quaternion scenes.
//!
//! Meshes are authored in local space with a per-mesh scale and location.
//! Baking applies that transform to every vertex and computes face normals,
//! leaving the transform at identity.

use qtn_math::DVec3;

/// 8-bit RGB color.
pub type Rgb = [u8; 3];

/// A single triangle face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub p1: DVec3,
    pub p2: DVec3,
    pub p3: DVec3,

    /// Face normal, `(p2 - p1) x (p3 - p1)`, unnormalized.
    ///
    /// Only meaningful after baking. Its direction follows the winding
    /// order, so it may face toward or away from the camera.
    pub normal: DVec3,
}

impl Triangle {
    /// Create a triangle with a zero normal.
    pub fn new(p1: DVec3, p2: DVec3, p3: DVec3) -> Self {
        Self {
            p1,
            p2,
            p3,
            normal: DVec3::ZERO,
        }
    }

    /// Cross product of the two edges leaving `p1`.
    #[inline]
    pub fn face_normal(&self) -> DVec3 {
        (self.p2 - self.p1).cross(self.p3 - self.p1)
    }

    /// Recompute `normal` from the current vertices.
    pub fn compute_normal(&mut self) {
        self.normal = self.face_normal();
    }

    pub fn vertices(&self) -> [DVec3; 3] {
        [self.p1, self.p2, self.p3]
    }

    /// True if the vertices are collinear (zero area).
    pub fn is_degenerate(&self) -> bool {
        self.face_normal().length_squared() == 0.0
    }
}

/// An ordered list of triangles with a local transform and display color.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub faces: Vec<Triangle>,

    /// Component-wise scale applied before translation
    pub scale: DVec3,

    /// Translation applied after scaling
    pub location: DVec3,

    pub color: Rgb,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            faces: Vec::new(),
            scale: DVec3::ONE,
            location: DVec3::ZERO,
            color: [255, 255, 255],
        }
    }
}

impl Mesh {
    /// Create a mesh from faces with an identity transform.
    pub fn new(faces: Vec<Triangle>) -> Self {
        Self {
            faces,
            ..Default::default()
        }
    }

    /// Create a mesh from vertex triplets.
    pub fn from_triangles(triangles: impl IntoIterator<Item = [DVec3; 3]>) -> Self {
        Self::new(
            triangles
                .into_iter()
                .map(|[a, b, c]| Triangle::new(a, b, c))
                .collect(),
        )
    }

    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_location(mut self, location: DVec3) -> Self {
        self.location = location;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// True if the transform is already identity.
    pub fn is_identity(&self) -> bool {
        self.scale == DVec3::ONE && self.location == DVec3::ZERO
    }

    /// Bake the transform into the vertices in place.
    ///
    /// Every vertex becomes `v * scale + location`, every face normal is
    /// recomputed, and the transform is reset to identity. Baking twice is a
    /// geometric no-op.
    pub fn bake(&mut self) {
        let scale = self.scale;
        let location = self.location;
        for face in &mut self.faces {
            face.p1 = face.p1 * scale + location;
            face.p2 = face.p2 * scale + location;
            face.p3 = face.p3 * scale + location;
            face.compute_normal();
        }
        self.scale = DVec3::ONE;
        self.location = DVec3::ZERO;
    }

    /// World-space copy of this mesh; `self` is left untouched.
    pub fn to_world(&self) -> Mesh {
        let mut world = self.clone();
        world.bake();
        world
    }

    /// Count faces whose vertices are collinear.
    pub fn degenerate_count(&self) -> usize {
        self.faces.iter().filter(|face| face.is_degenerate()).count()
    }
}

/// Build an axis-aligned cube of edge length `size` centered at the origin.
///
/// Each of the six sides is split into two triangles.
pub fn primitive_cube(size: f64) -> Mesh {
    let half = size / 2.0;

    let v1 = DVec3::new(-half, -half, half);
    let v2 = DVec3::new(-half, half, half);
    let v3 = DVec3::new(half, half, half);
    let v4 = DVec3::new(half, -half, half);
    let v5 = DVec3::new(-half, -half, -half);
    let v6 = DVec3::new(-half, half, -half);
    let v7 = DVec3::new(half, half, -half);
    let v8 = DVec3::new(half, -half, -half);

    Mesh::from_triangles([
        // top (+z)
        [v1, v2, v4],
        [v3, v2, v4],
        // bottom (-z)
        [v5, v6, v8],
        [v7, v6, v8],
        // front (-y)
        [v1, v4, v5],
        [v8, v4, v5],
        // back (+y)
        [v2, v3, v6],
        [v7, v3, v6],
        // left (-x)
        [v1, v2, v5],
        [v6, v2, v5],
        // right (+x)
        [v4, v3, v7],
        [v4, v8, v7],
    ])
}
