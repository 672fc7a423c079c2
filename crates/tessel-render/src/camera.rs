//! Camera handed through the batcher to the canvas.
//!
//! The batcher never reads the camera itself; it is forwarded untouched to
//! every [`Canvas::draw`](crate::Canvas::draw) call.
//!
//! ```
//! use tessel_render::Camera;
//! use tessel_core::math::Vec3;
//!
//! let mut camera = Camera::perspective(60.0, 16.0 / 9.0, 0.1, 100.0);
//! camera.look_at(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO, Vec3::Y);
//! let _vp = camera.view_projection_matrix();
//! ```

use tessel_core::math::{Mat4, Vec3};

/// Projection mode for a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
    Perspective {
        fov_y_radians: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    },
}

/// A camera with view and projection matrices computed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    projection: ProjectionMode,
}

impl Default for Camera {
    /// A unit orthographic camera looking down -Z.
    fn default() -> Self {
        Self::orthographic(2.0, 2.0, 0.1, 100.0)
    }
}

impl Camera {
    /// Create an orthographic camera centred on the origin.
    ///
    /// # Arguments
    ///
    /// * `width` - Viewport width
    /// * `height` - Viewport height
    /// * `near` - Near clip plane
    /// * `far` - Far clip plane
    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        let half_width = width / 2.0;
        let half_height = height / 2.0;

        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: ProjectionMode::Orthographic {
                left: -half_width,
                right: half_width,
                bottom: -half_height,
                top: half_height,
                near,
                far,
            },
        }
    }

    /// Create a perspective camera.
    ///
    /// `fov_y_degrees` is the vertical field of view.
    pub fn perspective(fov_y_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: ProjectionMode::Perspective {
                fov_y_radians: fov_y_degrees.to_radians(),
                aspect_ratio,
                near,
                far,
            },
        }
    }

    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.position = eye;
        self.target = target;
        self.up = up;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn projection(&self) -> ProjectionMode {
        self.projection
    }

    pub fn set_projection(&mut self, projection: ProjectionMode) {
        self.projection = projection;
    }

    /// Update the aspect ratio of a perspective camera. No-op for orthographic cameras.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if let ProjectionMode::Perspective { aspect_ratio, .. } = &mut self.projection {
            *aspect_ratio = aspect;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            ProjectionMode::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh(left, right, bottom, top, near, far),
            ProjectionMode::Perspective {
                fov_y_radians,
                aspect_ratio,
                near,
                far,
            } => Mat4::perspective_rh(fov_y_radians, aspect_ratio, near, far),
        }
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orthographic_maps_origin_to_center() {
        let camera = Camera::orthographic(800.0, 600.0, 0.1, 100.0);
        let clip = camera.view_projection_matrix().project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-6);
        assert!(clip.y.abs() < 1e-6);
    }

    #[test]
    fn test_set_aspect_ratio_ignores_orthographic() {
        let mut camera = Camera::default();
        let before = camera.projection();
        camera.set_aspect_ratio(3.0);
        assert_eq!(camera.projection(), before);

        let mut camera = Camera::perspective(60.0, 1.0, 0.1, 10.0);
        camera.set_aspect_ratio(2.0);
        match camera.projection() {
            ProjectionMode::Perspective { aspect_ratio, .. } => assert_eq!(aspect_ratio, 2.0),
            _ => unreachable!(),
        }
    }
}
