//! Test utilities for Tessel.
//!
//! - `RecordingCanvas` - a [`Canvas`](tessel_render::Canvas) that records calls (requires `mock` feature)
//! - [`fixtures`] - seeded random objects and small meshes
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use tessel_test_utils::{RecordingCanvas, fixtures};
//! use tessel_render::{Batcher, Canvas};
//!
//! let objects = fixtures::n_rand_objects(100, fixtures::DEFAULT_SEED);
//! let batcher = Batcher::from_objects(&objects);
//!
//! let canvas = RecordingCanvas::new();
//! batcher.draw_to(&canvas, canvas.bounds(), None);
//! assert_eq!(canvas.count_draws(), 2);
//! # }
//! ```

pub mod fixtures;
#[cfg(feature = "mock")]
pub mod mock_canvas;

#[cfg(feature = "mock")]
pub use mock_canvas::*;
