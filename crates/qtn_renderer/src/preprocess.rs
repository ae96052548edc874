//! Scene preprocessing.
//!
//! Turns an authored [`Scene`] into a [`PreparedScene`]: meshes baked into
//! world space with face normals, a flat list of face references across all
//! meshes, and the per-pixel angle table. The input scene is not modified.

use qtn_core::{Camera, Mesh, Scene, Triangle};

use crate::camera::AngleMap;

/// Index of one triangle inside a [`PreparedScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceRef {
    pub mesh: usize,
    pub face: usize,
}

impl FaceRef {
    pub fn new(mesh: usize, face: usize) -> Self {
        Self { mesh, face }
    }
}

/// Read-only render input derived from a [`Scene`].
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedScene {
    /// World-space meshes with identity transforms and populated normals
    pub meshes: Vec<Mesh>,

    /// Every triangle, in mesh order then face order
    pub faces: Vec<FaceRef>,

    pub angles: AngleMap,
    pub camera: Camera,
    pub clip_start: f64,
    pub clip_end: f64,
}

impl PreparedScene {
    pub fn width(&self) -> u32 {
        self.angles.width()
    }

    pub fn height(&self) -> u32 {
        self.angles.height()
    }

    /// Look up a triangle by reference.
    #[inline]
    pub fn triangle(&self, face: FaceRef) -> &Triangle {
        &self.meshes[face.mesh].faces[face.face]
    }

    /// Iterate over every triangle in face-list order.
    pub fn triangles(&self) -> impl Iterator<Item = (FaceRef, &Triangle)> + '_ {
        self.faces.iter().map(move |&face| (face, self.triangle(face)))
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }
}

/// Bake meshes, build the face list and compute the angle table.
///
/// Running this again on the same scene yields an identical result.
pub fn preprocess(scene: &Scene) -> PreparedScene {
    let meshes: Vec<Mesh> = scene.meshes.iter().map(Mesh::to_world).collect();

    let mut faces = Vec::with_capacity(scene.total_triangle_count());
    for (mesh_index, mesh) in meshes.iter().enumerate() {
        let degenerate = mesh.degenerate_count();
        if degenerate > 0 {
            log::warn!(
                "Mesh {} has {} degenerate triangles; they will never be hit",
                mesh_index,
                degenerate
            );
        }
        faces.extend((0..mesh.faces.len()).map(|face| FaceRef::new(mesh_index, face)));
    }

    let angles = AngleMap::for_scene(scene);

    log::debug!(
        "Preprocessed {} meshes, {} triangles, {}x{} angle table",
        meshes.len(),
        faces.len(),
        angles.width(),
        angles.height()
    );

    PreparedScene {
        meshes,
        faces,
        angles,
        camera: scene.camera,
        clip_start: scene.clip_start,
        clip_end: scene.clip_end,
    }
}
