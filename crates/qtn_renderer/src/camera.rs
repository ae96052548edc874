//! Per-pixel angular bounds for camera ray generation.
//!
//! The camera looks down `+Y` with `+Z` up. Each pixel covers a small range
//! of horizontal and vertical angles measured from the forward axis; the
//! sampler draws ray angles inside that range.

use qtn_core::{Camera, Scene};
use qtn_math::{DVec3, Interval, Ray};

/// Angular extent of one pixel, in radians from the forward axis.
///
/// Vertical angles are negated so that rows further down the image map to
/// rays pointing further down in world space; `y_start` is therefore
/// greater than `y_end`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngleBounds {
    pub x_start: f64,
    pub x_end: f64,
    pub y_start: f64,
    pub y_end: f64,
}

impl AngleBounds {
    pub fn new(x_start: f64, x_end: f64, y_start: f64, y_end: f64) -> Self {
        Self {
            x_start,
            x_end,
            y_start,
            y_end,
        }
    }

    pub fn horizontal(&self) -> Interval {
        Interval::new(self.x_start, self.x_end)
    }

    pub fn vertical(&self) -> Interval {
        Interval::new(self.y_start, self.y_end)
    }
}

/// Angle subtended at pixel edge `edge` along an axis of `resolution`
/// pixels, projected through a clip plane at distance `clip`.
///
/// Edge 0 maps to `-fov / 2` and edge `resolution` to `+fov / 2`.
pub fn edge_angle(clip: f64, fov: f64, edge: u32, resolution: u32) -> f64 {
    let shutter = 2.0 * clip * (fov / 2.0).tan();
    let position = shutter * edge as f64 / resolution as f64 - shutter / 2.0;
    (position / clip).atan()
}

/// Unnormalized ray direction for a pair of angles.
///
/// The forward component is always 1; the other two are the tangents.
#[inline]
pub fn ray_direction(x_angle: f64, y_angle: f64) -> DVec3 {
    DVec3::new(x_angle.tan(), 1.0, y_angle.tan())
}

/// Camera ray through the given angles.
pub fn camera_ray(camera: &Camera, x_angle: f64, y_angle: f64) -> Ray {
    Ray::new(camera.location, ray_direction(x_angle, y_angle))
}

/// Row-major table of [`AngleBounds`], one entry per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleMap {
    width: u32,
    height: u32,
    bounds: Vec<AngleBounds>,
}

impl AngleMap {
    /// Compute the angle table for a camera and resolution.
    ///
    /// The vertical field of view is derived from the horizontal one and the
    /// aspect ratio, assuming square pixels.
    pub fn new(camera: &Camera, width: u32, height: u32, clip: f64) -> Self {
        let fov_x = camera.fov;
        let fov_y = camera.vertical_fov(width, height);

        // Edge angles are shared between neighbouring pixels
        let x_edges: Vec<f64> = (0..=width)
            .map(|edge| edge_angle(clip, fov_x, edge, width))
            .collect();
        let y_edges: Vec<f64> = (0..=height)
            .map(|edge| -edge_angle(clip, fov_y, edge, height))
            .collect();

        let mut bounds = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as usize {
            for x in 0..width as usize {
                bounds.push(AngleBounds::new(
                    x_edges[x],
                    x_edges[x + 1],
                    y_edges[y],
                    y_edges[y + 1],
                ));
            }
        }

        Self {
            width,
            height,
            bounds,
        }
    }

    /// Angle table for a scene's camera, resolution and near clip.
    pub fn for_scene(scene: &Scene) -> Self {
        Self::new(&scene.camera, scene.width, scene.height, scene.clip_start)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> &AngleBounds {
        &self.bounds[self.index(x, y)]
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn as_slice(&self) -> &[AngleBounds] {
        &self.bounds
    }
}
