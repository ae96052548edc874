//! Scene description types consumed by the renderer.
//!
//! World space is right-handed with `+Y` forward and `+Z` up, as seen from a
//! camera with no rotation.

use qtn_math::DVec3;

use crate::mesh::{Mesh, Rgb};

/// A pinhole camera looking down `+Y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// World-space position
    pub location: DVec3,

    /// Horizontal field of view in radians
    pub fov: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            location: DVec3::ZERO,
            fov: 1.28,
        }
    }
}

impl Camera {
    pub fn new(location: DVec3, fov: f64) -> Self {
        Self { location, fov }
    }

    /// Vertical field of view for an image of the given size, assuming square
    /// pixels.
    pub fn vertical_fov(&self, width: u32, height: u32) -> f64 {
        2.0 * ((self.fov / 2.0).tan() * height as f64 / width as f64).atan()
    }
}

/// A point light. Power is carried for a future shading stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub location: DVec3,
    pub power: f64,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            location: DVec3::ZERO,
            power: 1.0,
        }
    }
}

impl Light {
    pub fn new(location: DVec3, power: f64) -> Self {
        Self { location, power }
    }

    /// Light of unit power at `location`.
    pub fn at(location: DVec3) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }
}

/// Everything needed to render one image.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// Near clip distance
    pub clip_start: f64,

    /// Far clip distance; intersections beyond it are ignored
    pub clip_end: f64,

    pub meshes: Vec<Mesh>,
    pub lights: Vec<Light>,
    pub camera: Camera,

    /// Color the image is cleared to before rendering
    pub background: Rgb,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            clip_start: 0.01,
            clip_end: 1000.0,
            meshes: Vec::new(),
            lights: Vec::new(),
            camera: Camera::default(),
            background: [60, 60, 60],
        }
    }
}

impl Scene {
    /// Create an empty scene with the given resolution.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_clip(mut self, clip_start: f64, clip_end: f64) -> Self {
        self.clip_start = clip_start;
        self.clip_end = clip_end;
        self
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }

    /// Add a mesh to the scene and return its index.
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Total triangle count across all meshes.
    pub fn total_triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitive_cube;

    #[test]
    fn test_scene_defaults() {
        let scene = Scene::default();
        assert_eq!((scene.width, scene.height), (1920, 1080));
        assert_eq!(scene.clip_start, 0.01);
        assert_eq!(scene.clip_end, 1000.0);
        assert_eq!(scene.background, [60, 60, 60]);
        assert_eq!(scene.camera.fov, 1.28);
    }

    #[test]
    fn test_scene_counts() {
        let mut scene = Scene::new(4, 3);
        assert_eq!(scene.add_mesh(primitive_cube(2.0)), 0);
        assert_eq!(scene.add_mesh(primitive_cube(1.0)), 1);
        scene.add_light(Light::at(DVec3::new(3.0, -2.0, 4.0)));

        assert_eq!(scene.total_triangle_count(), 24);
        assert_eq!(scene.pixel_count(), 12);
        assert_eq!(scene.lights[0].power, 1.0);
    }

    #[test]
    fn test_vertical_fov_square_image() {
        let camera = Camera::new(DVec3::ZERO, 1.0);
        assert!((camera.vertical_fov(100, 100) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_fov_wide_image() {
        let camera = Camera::new(DVec3::ZERO, std::f64::consts::FRAC_PI_2);
        let fovy = camera.vertical_fov(200, 100);

        // tan(fovy/2) = tan(fovx/2) * h / w = 0.5
        assert!(((fovy / 2.0).tan() - 0.5).abs() < 1e-12);
        assert!(fovy < camera.fov);
    }
}
