//! Quaternion Core - scene types, image buffer and file formats.
//!
//! This crate provides:
//!
//! - **Scene types**: `Scene`, `Mesh`, `Triangle`, `Camera`, `Light`
//! - **Image output**: `Image` with the `.qif` binary dump and PNG export
//! - **Loading**: JSON scene descriptions and Wavefront OBJ meshes
//!
//! # Example
//!
//! ```ignore
//! use qtn_core::{load_scene, Image};
//!
//! let scene = load_scene("scenes/cube.json")?;
//! let mut image = Image::new(scene.width, scene.height);
//! image.fill(scene.background);
//! image.save_qif("out.qif")?;
//! ```

pub mod description;
pub mod framebuffer;
pub mod loader;
pub mod mesh;
pub mod scene;

// Re-export commonly used types
pub use description::{MeshDescription, MeshSource, SceneDescription};
pub use framebuffer::{Image, ImageError, ImageResult, QifByteOrder};
pub use loader::{load_obj, load_scene, load_scene_from_string, LoadError, LoadResult};
pub use mesh::{primitive_cube, Mesh, Rgb, Triangle};
pub use scene::{Camera, Light, Scene};
