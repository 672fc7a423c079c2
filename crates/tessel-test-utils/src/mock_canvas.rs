//! Recording implementation of [`Canvas`] for testing.

use parking_lot::Mutex;
use tessel_core::geometry::Rect;
use tessel_render::{Camera, Canvas, Color, Object};

/// A canvas call, recorded for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Draw {
        region: Rect<i32>,
        /// Number of meshes on the drawn object.
        meshes: usize,
        /// Total vertices across those meshes.
        vertices: usize,
        with_camera: bool,
        /// Every mesh passed [`Mesh::validate`](tessel_render::Mesh::validate).
        valid: bool,
    },
    Clear {
        region: Rect<i32>,
        color: Color,
    },
    Render,
}

/// Canvas that records every call instead of drawing.
///
/// Methods take `&self`, as [`Canvas`] requires, so the log sits behind a
/// `Mutex`.
///
/// # Example
///
/// ```rust
/// use tessel_test_utils::RecordingCanvas;
/// use tessel_render::{Batcher, Canvas, Mesh, Object, ObjectRef};
/// use tessel_core::math::Vec3;
///
/// let canvas = RecordingCanvas::new();
/// let mesh = Mesh::new().with_positions(vec![Vec3::ZERO; 3]);
/// let objects = [
///     ObjectRef::new(Object::new().with_mesh(mesh.clone())),
///     ObjectRef::new(Object::new().with_mesh(mesh)),
/// ];
///
/// Batcher::from_objects(&objects).draw_to(&canvas, canvas.bounds(), None);
///
/// assert_eq!(canvas.count_draws(), 1);
/// assert_eq!(canvas.vertices_drawn(), 6);
/// ```
pub struct RecordingCanvas {
    calls: Mutex<Vec<RenderCall>>,
    bounds: Rect<i32>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::with_bounds(Rect::new(0, 0, 640, 480))
    }

    pub fn with_bounds(bounds: Rect<i32>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            bounds,
        }
    }

    /// Get a copy of all recorded calls.
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().clone()
    }

    pub fn count_draws(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RenderCall::Draw { .. }))
            .count()
    }

    pub fn count_clears(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RenderCall::Clear { .. }))
            .count()
    }

    /// Number of presented frames.
    pub fn count_renders(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RenderCall::Render))
            .count()
    }

    /// Sum of vertices over all recorded draws.
    pub fn vertices_drawn(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .map(|call| match call {
                RenderCall::Draw { vertices, .. } => *vertices,
                _ => 0,
            })
            .sum()
    }

    /// Draws whose object held a mesh failing validation.
    pub fn invalid_draws(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RenderCall::Draw { valid: false, .. }))
            .count()
    }

    /// Clear recorded calls (useful between frames).
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas for RecordingCanvas {
    fn draw(&self, region: Rect<i32>, object: &Object, camera: Option<&Camera>) {
        let call = RenderCall::Draw {
            region,
            meshes: object.meshes.len(),
            vertices: object.vertex_count(),
            with_camera: camera.is_some(),
            valid: object.meshes.iter().all(|m| m.read().validate().is_ok()),
        };
        self.calls.lock().push(call);
    }

    fn clear(&self, region: Rect<i32>, color: Color) {
        self.calls.lock().push(RenderCall::Clear { region, color });
    }

    fn render(&self) {
        self.calls.lock().push(RenderCall::Render);
    }

    fn bounds(&self) -> Rect<i32> {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let canvas = RecordingCanvas::new();
        let rect = canvas.bounds();
        canvas.clear(rect, Color::WHITE);
        canvas.draw(rect, &Object::new(), Some(&Camera::default()));
        canvas.render();

        assert_eq!(
            canvas.calls(),
            vec![
                RenderCall::Clear {
                    region: rect,
                    color: Color::WHITE
                },
                RenderCall::Draw {
                    region: rect,
                    meshes: 0,
                    vertices: 0,
                    with_camera: true,
                    valid: true
                },
                RenderCall::Render,
            ]
        );

        canvas.clear_calls();
        assert_eq!(canvas.call_count(), 0);
    }
}
