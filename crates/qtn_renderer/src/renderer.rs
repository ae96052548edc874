//! Distance-shaded ray casting renderer.
//!
//! Each pixel is sampled with rays jittered inside its angular bounds. The
//! nearest triangle along each ray is found by brute force, and the pixel
//! brightness is inversely proportional to the mean hit distance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use qtn_core::{Image, Scene};
use qtn_math::{DVec3, Interval, Segment};
use rand::{Rng, RngCore};
use thiserror::Error;

use crate::camera::{camera_ray, AngleBounds};
use crate::intersect::intersect_segment;
use crate::preprocess::{preprocess, FaceRef, PreparedScene};

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Rays cast per pixel
    pub samples: u32,
    /// Maximum bounce depth (reserved; the caster is single-bounce)
    pub max_bounces: u32,
    /// Seed for callers that build their RNG from the settings
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            samples: 8,
            max_bounces: 4,
            seed: 0,
        }
    }
}

impl RenderSettings {
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> RenderResult<()> {
        if self.samples == 0 {
            return Err(RenderError::InvalidSettings(
                "samples per pixel must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Errors that abort a render.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Image {image_width}x{image_height} does not match scene {scene_width}x{scene_height}")]
    DimensionMismatch {
        image_width: u32,
        image_height: u32,
        scene_width: u32,
        scene_height: u32,
    },

    #[error("Invalid render settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid clip range: near {clip_start}, far {clip_end}")]
    InvalidClip { clip_start: f64, clip_end: f64 },

    #[error("Render cancelled")]
    Cancelled,
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Cooperative cancellation flag, checked once per pixel.
///
/// Clones share the same flag, so one can be handed to another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Nearest intersection along a camera segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub face: FaceRef,
    pub point: DVec3,
    pub distance: f64,
}

/// Summary of a finished render.
#[derive(Debug, Clone, Default)]
pub struct RenderStats {
    pub pixels: usize,
    pub pixels_hit: usize,
    pub samples: u64,
    pub elapsed: Duration,
}

/// Uniform float in [0, 1).
#[inline]
fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Find the closest triangle crossed by `segment`, measured from its start.
///
/// Hits farther than `max_distance` are ignored.
pub fn nearest_hit(
    prepared: &PreparedScene,
    segment: &Segment,
    max_distance: f64,
) -> Option<Hit> {
    let range = Interval::new(0.0, max_distance);
    let mut closest: Option<Hit> = None;

    for (face, tri) in prepared.triangles() {
        let Some(point) = intersect_segment(segment, tri) else {
            continue;
        };
        let distance = (point - segment.start).length();
        if !range.contains(distance) {
            continue;
        }
        if closest.map_or(true, |hit| distance < hit.distance) {
            closest = Some(Hit {
                face,
                point,
                distance,
            });
        }
    }

    closest
}

/// Cast `samples` jittered rays through one pixel.
///
/// Returns the summed hit distance divided by the total sample count, or
/// `None` if no sample hit anything. Samples that miss contribute zero
/// distance but still count toward the divisor.
pub fn sample_pixel(
    prepared: &PreparedScene,
    bounds: &AngleBounds,
    samples: u32,
    rng: &mut dyn RngCore,
) -> Option<f64> {
    let horizontal = bounds.horizontal();
    let vertical = bounds.vertical();
    let far = prepared.clip_end;

    let mut any_hit = false;
    let mut total_distance = 0.0;

    for _ in 0..samples {
        let x_angle = horizontal.lerp(gen_f64(rng));
        let y_angle = vertical.lerp(gen_f64(rng));

        // Finite stand-in for an infinite ray
        let segment = camera_ray(&prepared.camera, x_angle, y_angle).segment(2.0 * far);

        if let Some(hit) = nearest_hit(prepared, &segment, far) {
            any_hit = true;
            total_distance += hit.distance;
        }
    }

    any_hit.then(|| total_distance / samples as f64)
}

/// Map a mean distance to a gray level: `255 / distance`, saturated.
#[inline]
pub fn brightness(mean_distance: f64) -> u8 {
    (255.0 / mean_distance).clamp(0.0, 255.0) as u8
}

/// Near clip must be positive and below a finite far clip.
fn check_clip(clip_start: f64, clip_end: f64) -> RenderResult<()> {
    let valid = clip_start.is_finite()
        && clip_end.is_finite()
        && clip_start > 0.0
        && clip_end > clip_start;
    if !valid {
        return Err(RenderError::InvalidClip {
            clip_start,
            clip_end,
        });
    }
    Ok(())
}

fn check_dimensions(image: &Image, width: u32, height: u32) -> RenderResult<()> {
    if image.width() != width || image.height() != height {
        return Err(RenderError::DimensionMismatch {
            image_width: image.width(),
            image_height: image.height(),
            scene_width: width,
            scene_height: height,
        });
    }
    Ok(())
}

/// Render `scene` into `image`.
///
/// The image must already have the scene's resolution and should be filled
/// with the background color; pixels no ray hits are left unchanged.
pub fn render(
    scene: &Scene,
    image: &mut Image,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> RenderResult<RenderStats> {
    render_with_cancel(scene, image, settings, rng, &CancelToken::new())
}

/// Like [`render`], stopping early once `cancel` is set.
///
/// Pixels written before cancellation keep their new values.
pub fn render_with_cancel(
    scene: &Scene,
    image: &mut Image,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
    cancel: &CancelToken,
) -> RenderResult<RenderStats> {
    check_dimensions(image, scene.width, scene.height)?;
    check_clip(scene.clip_start, scene.clip_end)?;
    settings.validate()?;

    let prepared = preprocess(scene);
    render_prepared(&prepared, image, settings, rng, cancel)
}

/// Render an already preprocessed scene.
pub fn render_prepared(
    prepared: &PreparedScene,
    image: &mut Image,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
    cancel: &CancelToken,
) -> RenderResult<RenderStats> {
    check_dimensions(image, prepared.width(), prepared.height())?;
    check_clip(prepared.clip_start, prepared.clip_end)?;
    settings.validate()?;

    let start = Instant::now();
    let mut stats = RenderStats::default();

    for y in 0..prepared.height() {
        for x in 0..prepared.width() {
            if cancel.is_cancelled() {
                log::info!("Render cancelled after {} pixels", stats.pixels);
                return Err(RenderError::Cancelled);
            }

            let bounds = prepared.angles.get(x, y);
            if let Some(mean) = sample_pixel(prepared, bounds, settings.samples, rng) {
                let value = brightness(mean);
                image.set_pixel(x, y, [value; 3]);
                stats.pixels_hit += 1;
            }

            stats.pixels += 1;
            stats.samples += settings.samples as u64;
        }
    }

    stats.elapsed = start.elapsed();
    log::info!(
        "Rendered {}x{} @ {} spp against {} triangles in {:?} ({} pixels hit)",
        prepared.width(),
        prepared.height(),
        settings.samples,
        prepared.triangle_count(),
        stats.elapsed,
        stats.pixels_hit
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtn_core::{primitive_cube, Camera, Mesh};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BACKGROUND: [u8; 3] = [60, 60, 60];

    /// 9x9 scene looking at a single triangle in the plane y = `distance`.
    fn wall_scene(distance: f64, half_extent: f64) -> Scene {
        let mut scene = Scene::new(9, 9).with_camera(Camera::new(DVec3::ZERO, 1.28));
        scene.add_mesh(Mesh::from_triangles([[
            DVec3::new(-2.0 * half_extent, distance, -half_extent),
            DVec3::new(2.0 * half_extent, distance, -half_extent),
            DVec3::new(0.0, distance, 3.0 * half_extent),
        ]]));
        scene
    }

    fn background_image(scene: &Scene) -> Image {
        let mut image = Image::new(scene.width, scene.height);
        image.fill(scene.background);
        image
    }

    #[test]
    fn test_brightness() {
        assert_eq!(brightness(1.0), 255);
        assert_eq!(brightness(0.5), 255);
        assert_eq!(brightness(0.0), 255);
        assert_eq!(brightness(10.0), 25);
        assert_eq!(brightness(20.0), 12);
        assert_eq!(brightness(1e9), 0);
    }

    #[test]
    fn test_large_wall_fills_image() {
        let _ = env_logger::builder().is_test(true).try_init();
        let scene = wall_scene(10.0, 50.0);
        let mut image = background_image(&scene);
        let mut rng = StdRng::seed_from_u64(42);

        let settings = RenderSettings::default().with_samples(1);
        let stats = render(&scene, &mut image, &settings, &mut rng).unwrap();

        assert_eq!(stats.pixels, 81);
        assert_eq!(stats.pixels_hit, 81);
        assert_eq!(stats.samples, 81);

        // Straight ahead the wall is ~10 units away
        assert_eq!(image.get_pixel(4, 4), [25, 25, 25]);

        // Corner rays travel farther, so they are darker
        let corner = image.get_pixel(0, 0)[0];
        assert!(corner > 0 && corner < 25, "corner brightness {}", corner);
    }

    #[test]
    fn test_brightness_inverse_to_distance() {
        let settings = RenderSettings::default().with_samples(1);

        let near = wall_scene(10.0, 50.0);
        let mut near_image = background_image(&near);
        render(&near, &mut near_image, &settings, &mut StdRng::seed_from_u64(1)).unwrap();

        let far = wall_scene(20.0, 100.0);
        let mut far_image = background_image(&far);
        render(&far, &mut far_image, &settings, &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(near_image.get_pixel(4, 4)[0], 25);
        assert_eq!(far_image.get_pixel(4, 4)[0], 12);
    }

    #[test]
    fn test_missed_pixels_keep_background() {
        // Covers the center pixel but none of the corners
        let scene = wall_scene(10.0, 4.0);
        let mut image = background_image(&scene);
        let mut rng = StdRng::seed_from_u64(7);

        let settings = RenderSettings::default().with_samples(1);
        let stats = render(&scene, &mut image, &settings, &mut rng).unwrap();

        assert!(stats.pixels_hit < stats.pixels);
        assert_eq!(image.get_pixel(4, 4), [25, 25, 25]);
        for (x, y) in [(0, 0), (8, 0), (0, 8), (8, 8)] {
            assert_eq!(image.get_pixel(x, y), BACKGROUND, "pixel ({}, {})", x, y);
        }
    }

    #[test]
    fn test_cube_in_front_of_camera() {
        let camera = Camera::new(DVec3::new(0.0, -5.0, 0.0), 1.28);
        let mut scene = Scene::new(9, 9).with_camera(camera);
        scene.add_mesh(primitive_cube(2.0));
        let mut image = background_image(&scene);
        let mut rng = StdRng::seed_from_u64(3);

        render(&scene, &mut image, &RenderSettings::default().with_samples(4), &mut rng).unwrap();

        // Front face at y = -1 is 4 units away
        assert_eq!(image.get_pixel(4, 4), [63, 63, 63]);
        assert_eq!(image.get_pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn test_far_clip_excludes_distant_geometry() {
        let scene = wall_scene(10.0, 50.0).with_clip(0.01, 8.0);
        let mut image = background_image(&scene);
        let mut rng = StdRng::seed_from_u64(0);

        let stats = render(&scene, &mut image, &RenderSettings::default(), &mut rng).unwrap();

        assert_eq!(stats.pixels_hit, 0);
        assert!(image.as_bytes().chunks(3).all(|p| p == BACKGROUND));
    }

    #[test]
    fn test_nearest_hit_picks_closest_triangle() {
        let mut scene = wall_scene(10.0, 50.0);
        scene.add_mesh(Mesh::from_triangles([[
            DVec3::new(-10.0, 6.0, -10.0),
            DVec3::new(10.0, 6.0, -10.0),
            DVec3::new(0.0, 6.0, 10.0),
        ]]));
        let prepared = preprocess(&scene);

        let segment = Segment::new(DVec3::ZERO, DVec3::new(0.0, 100.0, 0.0));
        let hit = nearest_hit(&prepared, &segment, 1000.0).unwrap();

        assert_eq!(hit.face, FaceRef::new(1, 0));
        assert!((hit.distance - 6.0).abs() < 1e-9);
        assert!((hit.point - DVec3::new(0.0, 6.0, 0.0)).length() < 1e-9);

        // Capping the distance skips both walls
        assert_eq!(nearest_hit(&prepared, &segment, 5.0), None);
    }

    #[test]
    fn test_dimension_mismatch_leaves_image_untouched() {
        let scene = wall_scene(10.0, 50.0);
        let mut image = Image::new(4, 5);
        image.fill(BACKGROUND);
        let before = image.clone();

        let mut rng = StdRng::seed_from_u64(0);
        let result = render(&scene, &mut image, &RenderSettings::default(), &mut rng);

        assert_eq!(
            result.unwrap_err(),
            RenderError::DimensionMismatch {
                image_width: 4,
                image_height: 5,
                scene_width: 9,
                scene_height: 9,
            }
        );
        assert_eq!(image, before);
    }

    #[test]
    fn test_zero_samples_rejected() {
        let scene = wall_scene(10.0, 50.0);
        let mut image = background_image(&scene);

        let settings = RenderSettings::default().with_samples(0);
        let result = render(&scene, &mut image, &settings, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(RenderError::InvalidSettings(_))));
    }

    #[test]
    fn test_zero_near_clip_rejected() {
        let scene = wall_scene(10.0, 50.0).with_clip(0.0, 1000.0);
        let mut image = background_image(&scene);
        let before = image.clone();

        let settings = RenderSettings::default().with_samples(1);
        let result = render(&scene, &mut image, &settings, &mut StdRng::seed_from_u64(0));

        assert_eq!(
            result.unwrap_err(),
            RenderError::InvalidClip {
                clip_start: 0.0,
                clip_end: 1000.0,
            }
        );
        assert_eq!(image, before);

        // Preprocessing succeeds but rendering the result is still refused
        let prepared = preprocess(&scene);
        let mut rng = StdRng::seed_from_u64(0);
        let cancel = CancelToken::new();
        let result = render_prepared(&prepared, &mut image, &settings, &mut rng, &cancel);
        assert!(matches!(result, Err(RenderError::InvalidClip { .. })));
    }

    #[test]
    fn test_inverted_or_infinite_clip_rejected() {
        let settings = RenderSettings::default().with_samples(1);

        for (near, far) in [(5.0, 1.0), (0.01, f64::INFINITY), (f64::NAN, 10.0)] {
            let scene = wall_scene(10.0, 50.0).with_clip(near, far);
            let mut image = background_image(&scene);
            let result = render(&scene, &mut image, &settings, &mut StdRng::seed_from_u64(0));
            assert!(
                matches!(result, Err(RenderError::InvalidClip { .. })),
                "clip ({}, {})",
                near,
                far
            );
        }
    }

    #[test]
    fn test_cancelled_before_start() {
        let scene = wall_scene(10.0, 50.0);
        let mut image = background_image(&scene);
        let before = image.clone();

        let cancel = CancelToken::new();
        cancel.clone().cancel();
        assert!(cancel.is_cancelled());

        let settings = RenderSettings::default();
        let mut rng = StdRng::seed_from_u64(0);
        let result = render_with_cancel(&scene, &mut image, &settings, &mut rng, &cancel);

        assert_eq!(result.unwrap_err(), RenderError::Cancelled);
        assert_eq!(image, before);
    }

    #[test]
    fn test_same_seed_same_image() {
        let camera = Camera::new(DVec3::new(1.5, -5.0, 1.5), 1.28);
        let mut scene = Scene::new(12, 8).with_camera(camera);
        scene.add_mesh(primitive_cube(2.0));
        let settings = RenderSettings::default().with_samples(3).with_seed(99);

        let mut a = background_image(&scene);
        let mut b = background_image(&scene);
        render(&scene, &mut a, &settings, &mut StdRng::seed_from_u64(settings.seed)).unwrap();
        render(&scene, &mut b, &settings, &mut StdRng::seed_from_u64(settings.seed)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_render_prepared_reuses_preprocessing() {
        let scene = wall_scene(10.0, 50.0);
        let prepared = preprocess(&scene);
        let settings = RenderSettings::default().with_samples(1);

        for seed in 0..2 {
            let mut image = background_image(&scene);
            let mut rng = StdRng::seed_from_u64(seed);
            let stats =
                render_prepared(&prepared, &mut image, &settings, &mut rng, &CancelToken::new())
                    .unwrap();
            assert_eq!(stats.pixels_hit, 81);
        }
    }

    #[test]
    fn test_partially_covered_pixel_counts_misses() {
        // Wall covering x < 0 only, so the pixel's left half hits and its right half misses
        let mut scene = Scene::new(9, 9);
        scene.add_mesh(Mesh::from_triangles([[
            DVec3::new(-100.0, 10.0, -100.0),
            DVec3::new(0.0, 10.0, -100.0),
            DVec3::new(0.0, 10.0, 100.0),
        ]]));
        let prepared = preprocess(&scene);
        let bounds = AngleBounds::new(-0.1, 0.1, 0.1, -0.1);
        let samples = 64;

        let rng = StdRng::seed_from_u64(11);

        // Replay the same draws to total the hits independently
        let mut replay = rng.clone();
        let mut hits = 0;
        let mut hit_distance = 0.0;
        for _ in 0..samples {
            let x_angle = bounds.horizontal().lerp(replay.gen::<f64>());
            let y_angle = bounds.vertical().lerp(replay.gen::<f64>());
            let segment = camera_ray(&prepared.camera, x_angle, y_angle).segment(2.0 * 1000.0);
            if let Some(hit) = nearest_hit(&prepared, &segment, 1000.0) {
                hits += 1;
                hit_distance += hit.distance;
            }
        }
        assert!(hits > 0 && hits < samples, "{} of {} samples hit", hits, samples);

        let mut rng = rng;
        let mean = sample_pixel(&prepared, &bounds, samples, &mut rng).unwrap();
        assert!((mean - hit_distance / samples as f64).abs() < 1e-9);

        // Dividing by every sample makes the pixel brighter than the hit-only mean
        assert!(brightness(mean) > brightness(hit_distance / hits as f64));
    }
}
