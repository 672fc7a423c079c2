//! Batch Scene Example
//!
//! Builds 1000 random objects in two profiles, batches them, and draws a few
//! frames to a null canvas while nudging objects around.
//!
//! Run with:
//! ```sh
//! RUST_LOG=tessel_render=debug cargo run -p tessel --example batch_scene
//! ```

use tessel::core::profiling;
use tessel::prelude::*;
use tessel_test_utils::fixtures;

const OBJECTS: usize = 1000;
const FRAMES: usize = 30;

fn main() {
    Config::default().with_profiling(ProfilingMode::On).apply();

    let objects = fixtures::n_rand_objects(OBJECTS, fixtures::DEFAULT_SEED);
    let batcher = Batcher::from_objects(&objects);
    tracing::info!(
        "Batched {} objects into {} batches",
        batcher.len(),
        batcher.batch_count()
    );

    let canvas = NullCanvas::new();
    let camera = Camera::perspective(60.0, 4.0 / 3.0, 0.1, 100.0);

    for frame in 0..FRAMES {
        profiling::new_frame();
        let rect = canvas.bounds();
        canvas.clear(rect, Color::BLACK);

        // Move one object per frame; only its batch is rebuilt.
        let moved = &objects[frame % objects.len()];
        moved
            .write()
            .transform
            .set_position(Vec3::new(frame as f32, 0.0, 0.0));
        batcher.update(std::slice::from_ref(moved));

        batcher.draw_to(&canvas, rect, Some(&camera));
        canvas.render();

        let stats = batcher.stats();
        tracing::debug!(
            "Frame {}: {} draw calls, {} rebuilds",
            frame,
            stats.draw_calls,
            stats.rebuilds
        );
    }

    let stats = batcher.stats();
    tracing::info!(
        "Drew {} objects with {} draw calls per frame ({} batches, {} unmergeable)",
        stats.objects,
        stats.draw_calls,
        stats.batches,
        stats.mixed_batches
    );
}
