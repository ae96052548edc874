//! Quaternion Renderer - CPU ray caster
//!
//! Casts jittered rays from a pinhole camera through every pixel, finds the
//! nearest triangle with a signed-volume segment test, and shades by
//! distance. There is no acceleration structure: each ray is tested against
//! every triangle in the scene.
//!
//! ```ignore
//! use qtn_core::{primitive_cube, Image, Scene};
//! use qtn_renderer::{render, RenderSettings};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut scene = Scene::new(320, 180);
//! scene.add_mesh(primitive_cube(2.0));
//! let mut image = Image::new(scene.width, scene.height);
//! image.fill(scene.background);
//!
//! let settings = RenderSettings::default();
//! render(&scene, &mut image, &settings, &mut StdRng::seed_from_u64(settings.seed))?;
//! ```

mod camera;
mod intersect;
mod preprocess;
mod renderer;

pub use camera::{camera_ray, edge_angle, ray_direction, AngleBounds, AngleMap};
pub use intersect::{intersect_segment, intersection_point, intersects, signed_volume};
pub use preprocess::{preprocess, FaceRef, PreparedScene};
pub use renderer::{
    brightness, nearest_hit, render, render_prepared, render_with_cancel, sample_pixel,
    CancelToken, Hit, RenderError, RenderResult, RenderSettings, RenderStats,
};

/// Re-export common math types from qtn_math
pub use qtn_math::{DVec3, Interval, Ray, Segment};
