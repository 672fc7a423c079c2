//! Shader and texture handles.
//!
//! The batcher never looks inside these. It only needs to know whether two
//! objects use the *same* shader and textures, which is pointer identity on
//! the shared handle.

use std::fmt;
use std::sync::Arc;

use tessel_core::geometry::Size;

/// GLSL-style shader sources, identified by name in logs.
#[derive(Debug, Clone, Default)]
pub struct Shader {
    pub name: String,
    pub vertex: Vec<u8>,
    pub fragment: Vec<u8>,
}

impl Shader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    #[default]
    Rgba8,
    Rgb8,
    R8,
    Depth24Stencil8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Default)]
pub struct Texture {
    pub size: Size<u32>,
    pub format: TextureFormat,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    /// Keep the pixel data after upload.
    pub keep_data_on_load: bool,
}

impl Texture {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            ..Default::default()
        }
    }
}

macro_rules! shared_handle {
    ($(#[$meta:meta])* $name:ident, $inner:ty) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name(Arc<$inner>);

        impl $name {
            pub fn new(inner: $inner) -> Self {
                Self(Arc::new(inner))
            }
        }

        impl std::ops::Deref for $name {
            type Target = $inner;

            fn deref(&self) -> &$inner {
                &self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0)
            }
        }

        impl Eq for $name {}

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:p})", stringify!($name), Arc::as_ptr(&self.0))
            }
        }
    };
}

shared_handle!(
    /// Shared shader. Equality is identity.
    ShaderRef,
    Shader
);

shared_handle!(
    /// Shared texture. Equality is identity.
    TextureRef,
    Texture
);
