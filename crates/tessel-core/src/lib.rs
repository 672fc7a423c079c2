//! Tessel Core
//!
//! This crate contains the shared foundations of the Tessel draw batcher:
//! collections, generational arenas, math re-exports, logging and profiling.

pub mod alloc;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;
