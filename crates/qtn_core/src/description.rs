//! Serializable scene description.
//!
//! Every field is optional and falls back to the [`Scene`] defaults:
//!
//! ```json
//! {
//!   "width": 640,
//!   "height": 360,
//!   "camera": { "location": [1.5, -5.0, 1.5], "fov": 1.28 },
//!   "lights": [ { "location": [3.0, -2.0, 4.0] } ],
//!   "meshes": [
//!     { "type": "cube", "size": 2.0, "color": [200, 80, 80] },
//!     { "type": "obj", "path": "teapot.obj", "scale": [0.5, 0.5, 0.5] },
//!     { "type": "triangles", "triangles": [[[-2, 0, -2], [-2, 0, 2], [2, 0, 0]]] }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use qtn_math::DVec3;
use serde::{Deserialize, Serialize};

use crate::loader::{load_obj, LoadError, LoadResult};
use crate::mesh::{primitive_cube, Mesh, Rgb};
use crate::scene::{Camera, Light, Scene};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDescription {
    pub location: [f64; 3],
    pub fov: f64,
}

impl Default for CameraDescription {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            location: camera.location.to_array(),
            fov: camera.fov,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightDescription {
    pub location: [f64; 3],
    pub power: f64,
}

impl Default for LightDescription {
    fn default() -> Self {
        let light = Light::default();
        Self {
            location: light.location.to_array(),
            power: light.power,
        }
    }
}

/// Where a mesh's triangles come from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeshSource {
    /// Axis-aligned cube centered at the origin
    Cube {
        #[serde(default = "default_cube_size")]
        size: f64,
    },
    /// Inline vertex triplets
    Triangles { triangles: Vec<[[f64; 3]; 3]> },
    /// Wavefront OBJ file; every model becomes its own mesh
    Obj { path: PathBuf },
}

fn default_cube_size() -> f64 {
    2.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshDescription {
    #[serde(flatten)]
    pub source: MeshSource,

    #[serde(default = "default_scale")]
    pub scale: [f64; 3],

    #[serde(default)]
    pub location: [f64; 3],

    #[serde(default = "default_color")]
    pub color: Rgb,
}

fn default_scale() -> [f64; 3] {
    [1.0; 3]
}

fn default_color() -> Rgb {
    Mesh::default().color
}

impl MeshDescription {
    /// Build the meshes this entry describes.
    fn build(&self, base_dir: &Path) -> LoadResult<Vec<Mesh>> {
        let meshes = match &self.source {
            MeshSource::Cube { size } => vec![primitive_cube(*size)],
            MeshSource::Triangles { triangles } => {
                if triangles.is_empty() {
                    return Err(LoadError::InvalidMesh(
                        "triangle list is empty".to_string(),
                    ));
                }
                vec![Mesh::from_triangles(triangles.iter().map(|[a, b, c]| {
                    [DVec3::from(*a), DVec3::from(*b), DVec3::from(*c)]
                }))]
            }
            MeshSource::Obj { path } => load_obj(base_dir.join(path))?,
        };

        Ok(meshes
            .into_iter()
            .map(|mesh| {
                mesh.with_scale(DVec3::from(self.scale))
                    .with_location(DVec3::from(self.location))
                    .with_color(self.color)
            })
            .collect())
    }
}

/// Top-level JSON scene document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub width: u32,
    pub height: u32,
    pub clip_start: f64,
    pub clip_end: f64,
    pub background: Rgb,
    pub camera: CameraDescription,
    pub lights: Vec<LightDescription>,
    pub meshes: Vec<MeshDescription>,
}

impl Default for SceneDescription {
    fn default() -> Self {
        let scene = Scene::default();
        Self {
            width: scene.width,
            height: scene.height,
            clip_start: scene.clip_start,
            clip_end: scene.clip_end,
            background: scene.background,
            camera: CameraDescription::default(),
            lights: Vec::new(),
            meshes: Vec::new(),
        }
    }
}

impl SceneDescription {
    /// Resolve the description into a [`Scene`], loading any referenced files.
    pub fn into_scene(self, base_dir: &Path) -> LoadResult<Scene> {
        let mut scene = Scene::new(self.width, self.height)
            .with_clip(self.clip_start, self.clip_end)
            .with_background(self.background)
            .with_camera(Camera::new(
                DVec3::from(self.camera.location),
                self.camera.fov,
            ));

        for light in &self.lights {
            scene.add_light(Light::new(DVec3::from(light.location), light.power));
        }

        for description in &self.meshes {
            for mesh in description.build(base_dir)? {
                scene.add_mesh(mesh);
            }
        }

        if scene.meshes.is_empty() {
            log::warn!("Scene has no meshes; render will only show the background");
        }

        Ok(scene)
    }
}
