//! Tessel - draw-call batching
//!
//! Tessel groups drawable objects that share render state, shader, textures
//! and mesh layout, and merges each group into a single drawable so a frame
//! costs one draw call per group instead of one per object.
//!
//! - **Core**: collections, generational arenas, math, logging and profiling
//! - **Render**: meshes, mesh merging and the incremental [`Batcher`](render::Batcher)
//!
//! # Quick Start
//!
//! ```
//! use tessel::prelude::*;
//!
//! Config::default().apply();
//!
//! let tri = Mesh::new().with_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
//! let objects: Vec<ObjectRef> = (0..100)
//!     .map(|i| {
//!         let transform = Transform::from_translation(Vec3::new(i as f32, 0.0, 0.0));
//!         ObjectRef::new(Object::new().with_mesh(tri.clone()).with_transform(transform))
//!     })
//!     .collect();
//!
//! let batcher = Batcher::from_objects(&objects);
//! let canvas = NullCanvas::new();
//! batcher.draw_to(&canvas, canvas.bounds(), None);
//! assert_eq!(batcher.stats().draw_calls, 1);
//! ```

// Re-export core types
pub use tessel_core as core;
pub use tessel_core::config::{Config, ProfilingMode};
pub use tessel_core::math;

#[cfg(feature = "render")]
pub use tessel_render as render;

/// Prelude module for convenient imports
pub mod prelude {
    pub use tessel_core::config::{Config, ProfilingMode};
    pub use tessel_core::geometry::Rect;
    pub use tessel_core::math::{Mat4, Quat, Vec2, Vec3, Vec4};

    #[cfg(feature = "render")]
    pub use tessel_render::{
        Batcher, BatcherConfig, BatcherStats, Camera, Canvas, Color, MergeError, MergeOptions, Mesh, MeshRef,
        NullCanvas, Object, ObjectRef, Shader, ShaderRef, State, Texture, TextureRef, Transform, batch,
        batch_with,
    };
}
