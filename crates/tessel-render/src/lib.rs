//! Tessel Render
//!
//! Draw-call batching for scenes with many small, similar objects:
//!
//! - [`Mesh`] and [`MeshSignature`]: per-vertex channel data and its layout
//! - [`Mesh::append`] / [`Mesh::can_append`]: concatenation with index remapping
//! - [`batch`] / [`batch_with`]: merge compatible objects into one
//! - [`Batcher`]: incremental partition of live objects into merged batches
//! - [`Canvas`]: the sink drawn objects go to
//!
//! # Example
//!
//! ```
//! use tessel_render::*;
//! use tessel_core::math::Vec3;
//!
//! let mesh = Mesh::new().with_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
//! let a = ObjectRef::new(Object::new().with_mesh(mesh.clone()));
//! let b = ObjectRef::new(Object::new().with_mesh(mesh));
//!
//! let batcher = Batcher::from_objects(&[a.clone(), b]);
//! let canvas = NullCanvas::new();
//! batcher.draw_to(&canvas, canvas.bounds(), Some(&Camera::default()));
//!
//! a.write().transform.set_position(Vec3::Z);
//! batcher.update(&[a]);
//! ```

pub mod batcher;
pub mod camera;
pub mod canvas;
pub mod color;
pub mod error;
pub mod merge;
pub mod mesh;
pub mod object;
pub mod resource;
pub mod signature;
pub mod state;
pub mod transform;

pub use batcher::{Batcher, BatcherConfig, BatcherStats};
pub use camera::{Camera, ProjectionMode};
pub use canvas::{Canvas, NullCanvas};
pub use color::Color;
pub use error::{MergeError, MergeResult, MeshError};
pub use merge::{MergeOptions, batch, batch_with};
pub use mesh::{Mesh, MeshRef, VertexAttrib};
pub use object::{Object, ObjectId, ObjectRef, WeakObjectRef};
pub use resource::{Shader, ShaderRef, Texture, TextureFilter, TextureFormat, TextureRef};
pub use signature::{AttribKind, Channel, MeshSignature};
pub use state::State;
pub use transform::Transform;

// Batchers are shared across threads.
static_assertions::assert_impl_all!(Batcher: Send, Sync);
static_assertions::assert_impl_all!(ObjectRef: Send, Sync);
