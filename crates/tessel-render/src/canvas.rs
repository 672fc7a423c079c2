//! The sink the batcher draws into.

use tessel_core::geometry::Rect;

use crate::camera::Camera;
use crate::color::Color;
use crate::object::Object;

/// A render target that can draw objects.
///
/// Backends issue GPU work here; the batcher only calls [`draw`](Canvas::draw),
/// once per merged batch or once per unmergeable member. Implementations must
/// not call back into the [`Batcher`](crate::Batcher) that is drawing into them.
pub trait Canvas: Send + Sync {
    /// Draw one object into `region`, as seen by `camera`.
    fn draw(&self, region: Rect<i32>, object: &Object, camera: Option<&Camera>);

    fn clear(&self, region: Rect<i32>, color: Color);

    /// Present the frame.
    fn render(&self);

    /// Drawable extent.
    fn bounds(&self) -> Rect<i32>;
}

/// A canvas that discards everything. Useful for headless runs and benchmarks.
#[derive(Debug, Clone, Copy)]
pub struct NullCanvas {
    bounds: Rect<i32>,
}

impl NullCanvas {
    pub const DEFAULT_BOUNDS: Rect<i32> = Rect::new(0, 0, 640, 480);

    pub fn new() -> Self {
        Self::with_bounds(Self::DEFAULT_BOUNDS)
    }

    pub fn with_bounds(bounds: Rect<i32>) -> Self {
        Self { bounds }
    }
}

impl Default for NullCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas for NullCanvas {
    fn draw(&self, _region: Rect<i32>, _object: &Object, _camera: Option<&Camera>) {}

    fn clear(&self, _region: Rect<i32>, _color: Color) {}

    fn render(&self) {}

    fn bounds(&self) -> Rect<i32> {
        self.bounds
    }
}
