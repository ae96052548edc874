//! Scene and mesh loading from disk.
//!
//! Scenes are JSON documents (see [`SceneDescription`]); meshes can be
//! pulled in from Wavefront OBJ files.

use std::path::Path;

use qtn_math::DVec3;
use thiserror::Error;

use crate::description::SceneDescription;
use crate::mesh::Mesh;
use crate::scene::Scene;

/// Errors that can occur while loading scenes or meshes.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene description error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("No geometry found in {0}")]
    NoGeometry(String),

    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load a JSON scene file.
///
/// Relative OBJ paths inside the scene are resolved against the directory
/// containing the scene file.
pub fn load_scene(path: impl AsRef<Path>) -> LoadResult<Scene> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let scene = load_scene_from_string(&json, base_dir)?;
    log::info!(
        "Loaded scene {}: {} meshes, {} triangles, {} lights",
        path.display(),
        scene.meshes.len(),
        scene.total_triangle_count(),
        scene.lights.len()
    );
    Ok(scene)
}

/// Parse a JSON scene from a string.
pub fn load_scene_from_string(json: &str, base_dir: &Path) -> LoadResult<Scene> {
    let description: SceneDescription = serde_json::from_str(json)?;
    description.into_scene(base_dir)
}

/// Load every model in an OBJ file as a separate mesh.
///
/// Faces are triangulated on load. Meshes come back with an identity
/// transform and default color.
pub fn load_obj(path: impl AsRef<Path>) -> LoadResult<Vec<Mesh>> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )?;

    let mut meshes = Vec::with_capacity(models.len());
    for model in &models {
        let positions: Vec<DVec3> = model
            .mesh
            .positions
            .chunks_exact(3)
            .map(|p| DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64))
            .collect();

        let mut triangles = Vec::with_capacity(model.mesh.indices.len() / 3);
        for face in model.mesh.indices.chunks_exact(3) {
            let [a, b, c] = [face[0] as usize, face[1] as usize, face[2] as usize];
            match (positions.get(a), positions.get(b), positions.get(c)) {
                (Some(&p1), Some(&p2), Some(&p3)) => triangles.push([p1, p2, p3]),
                _ => {
                    return Err(LoadError::InvalidMesh(format!(
                        "model '{}' references vertex [{}, {}, {}] of {}",
                        model.name,
                        a,
                        b,
                        c,
                        positions.len()
                    )))
                }
            }
        }

        if triangles.is_empty() {
            log::warn!("Skipping OBJ model '{}' with no faces", model.name);
            continue;
        }

        log::debug!("OBJ model '{}': {} triangles", model.name, triangles.len());
        meshes.push(Mesh::from_triangles(triangles));
    }

    if meshes.is_empty() {
        return Err(LoadError::NoGeometry(path.display().to_string()));
    }

    Ok(meshes)
}
