//! CPU-side mesh data and mesh concatenation.
//!
//! A [`Mesh`] stores one array per vertex channel. Positions define the vertex
//! count; every other channel is either empty (absent) or has exactly one
//! element per vertex.
//!
//! # Example
//!
//! ```
//! use tessel_render::Mesh;
//! use tessel_core::math::Vec3;
//!
//! let mut a = Mesh::new()
//!     .with_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
//!     .with_indices(vec![0, 1, 2]);
//! let b = Mesh::new().with_positions(vec![Vec3::Z, Vec3::ONE, Vec3::NEG_X]);
//!
//! a.can_append(&b).unwrap();
//! a.append(&b);
//! assert_eq!(a.indices, vec![0, 1, 2, 3, 4, 5]);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tessel_core::math::{Aabb, Mat4, Vec2, Vec3, Vec4};
use tessel_core::profiling::profile_function;

use crate::color::Color;
use crate::error::MeshError;
use crate::signature::{AttribKind, Channel, MeshSignature};
use crate::transform::Transform;

/// A named, user-defined vertex attribute array.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexAttrib {
    F32(Vec<f32>),
    Vec2(Vec<Vec2>),
    Vec3(Vec<Vec3>),
    Vec4(Vec<Vec4>),
    Mat4(Vec<Mat4>),
}

impl VertexAttrib {
    pub fn kind(&self) -> AttribKind {
        match self {
            VertexAttrib::F32(_) => AttribKind::F32,
            VertexAttrib::Vec2(_) => AttribKind::Vec2,
            VertexAttrib::Vec3(_) => AttribKind::Vec3,
            VertexAttrib::Vec4(_) => AttribKind::Vec4,
            VertexAttrib::Mat4(_) => AttribKind::Mat4,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VertexAttrib::F32(v) => v.len(),
            VertexAttrib::Vec2(v) => v.len(),
            VertexAttrib::Vec3(v) => v.len(),
            VertexAttrib::Vec4(v) => v.len(),
            VertexAttrib::Mat4(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `other`'s elements, optionally gathered through `indices`.
    /// Returns `false` (and leaves `self` untouched) when the kinds differ.
    fn extend_from(&mut self, other: &VertexAttrib, indices: Option<&[u32]>) -> bool {
        match (self, other) {
            (VertexAttrib::F32(dst), VertexAttrib::F32(src)) => gather(dst, src, indices),
            (VertexAttrib::Vec2(dst), VertexAttrib::Vec2(src)) => gather(dst, src, indices),
            (VertexAttrib::Vec3(dst), VertexAttrib::Vec3(src)) => gather(dst, src, indices),
            (VertexAttrib::Vec4(dst), VertexAttrib::Vec4(src)) => gather(dst, src, indices),
            (VertexAttrib::Mat4(dst), VertexAttrib::Mat4(src)) => gather(dst, src, indices),
            _ => return false,
        }
        true
    }
}

/// Extend `dst` with `src`, or with `src` read through `indices` when given.
fn gather<T: Copy>(dst: &mut Vec<T>, src: &[T], indices: Option<&[u32]>) {
    match indices {
        Some(indices) => dst.extend(indices.iter().map(|&i| src[i as usize])),
        None => dst.extend_from_slice(src),
    }
}

/// Geometry owned by an [`Object`](crate::Object).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Color>,
    pub barycentric: Vec<Vec3>,
    /// Texture coordinate sets. An empty set is absent.
    pub tex_coords: Vec<Vec<Vec2>>,
    /// Custom attributes by name.
    pub attribs: BTreeMap<String, VertexAttrib>,
    /// Triangle indices. Empty means the mesh is not indexed.
    pub indices: Vec<u32>,

    /// Keep CPU-side data after the backend uploads the mesh.
    pub keep_data_on_load: bool,
    /// Hint that the mesh is rewritten often.
    pub dynamic: bool,

    bounds: Option<Aabb>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_positions(mut self, positions: Vec<Vec3>) -> Self {
        self.positions = positions;
        self.bounds = None;
        self
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_barycentric(mut self, barycentric: Vec<Vec3>) -> Self {
        self.barycentric = barycentric;
        self
    }

    /// Add the next texture coordinate set.
    pub fn with_tex_coords(mut self, set: Vec<Vec2>) -> Self {
        self.tex_coords.push(set);
        self
    }

    pub fn with_attrib(mut self, name: impl Into<String>, attrib: VertexAttrib) -> Self {
        self.attribs.insert(name.into(), attrib);
        self
    }

    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = indices;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    pub fn signature(&self) -> MeshSignature {
        MeshSignature::of(self)
    }

    /// Cached bounding box, if computed since the last geometry change.
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Recompute and cache the bounding box of the positions.
    pub fn update_bounds(&mut self) -> Option<Aabb> {
        self.bounds = Aabb::from_points(&self.positions);
        self.bounds
    }

    pub fn invalidate_bounds(&mut self) {
        self.bounds = None;
    }

    /// Check that every populated channel has one element per vertex and
    /// that all indices are in range.
    pub fn validate(&self) -> Result<(), MeshError> {
        let expected = self.vertex_count();
        let check = |channel: Channel, found: usize| {
            if found == 0 || found == expected {
                Ok(())
            } else {
                Err(MeshError::LengthMismatch {
                    channel,
                    expected,
                    found,
                })
            }
        };

        check(Channel::Normals, self.normals.len())?;
        check(Channel::Colors, self.colors.len())?;
        check(Channel::Barycentric, self.barycentric.len())?;
        for (set, coords) in self.tex_coords.iter().enumerate() {
            check(Channel::TexCoords(set), coords.len())?;
        }
        for (name, attrib) in &self.attribs {
            check(Channel::Attrib(name.clone()), attrib.len())?;
        }

        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= expected) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: expected,
            });
        }
        Ok(())
    }

    /// Whether `source` can be appended to `self`.
    ///
    /// The populated channel sets must match exactly; index presence may differ.
    /// The error names the first mismatching channel.
    pub fn can_append(&self, source: &Mesh) -> Result<(), MeshError> {
        match self.signature().append_mismatch(&source.signature()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Append `source`'s vertices (and indices) to `self`.
    ///
    /// Callers must ensure [`can_append`](Self::can_append) holds. Index handling:
    ///
    /// | target    | source    | result                                                        |
    /// |-----------|-----------|---------------------------------------------------------------|
    /// | indexed   | indexed   | source indices offset by the target's old vertex count       |
    /// | indexed   | plain     | sequential indices synthesized for the source vertices        |
    /// | plain     | indexed   | source vertices expanded through its indices, stays plain     |
    /// | plain     | plain     | vertex arrays concatenated                                    |
    ///
    /// The cached bounds are invalidated.
    ///
    /// # Panics
    ///
    /// Panics if `source` is indexed, `self` is not, and `source` holds an
    /// out-of-range index. [`validate`](Self::validate) catches this beforehand.
    pub fn append(&mut self, source: &Mesh) {
        profile_function!();
        debug_assert!(self.can_append(source).is_ok());

        let base = self.vertex_count() as u32;
        let expand = (!self.is_indexed() && source.is_indexed()).then_some(source.indices.as_slice());

        gather(&mut self.positions, &source.positions, expand);
        if !self.normals.is_empty() {
            gather(&mut self.normals, &source.normals, expand);
        }
        if !self.colors.is_empty() {
            gather(&mut self.colors, &source.colors, expand);
        }
        if !self.barycentric.is_empty() {
            gather(&mut self.barycentric, &source.barycentric, expand);
        }
        for (dst, src) in self.tex_coords.iter_mut().zip(&source.tex_coords) {
            if !dst.is_empty() {
                gather(dst, src, expand);
            }
        }
        for (name, dst) in self.attribs.iter_mut() {
            if let Some(src) = source.attribs.get(name)
                && !dst.is_empty()
            {
                dst.extend_from(src, expand);
            }
        }

        if self.is_indexed() {
            if source.is_indexed() {
                self.indices.extend(source.indices.iter().map(|&i| i + base));
            } else {
                let count = source.vertex_count() as u32;
                self.indices.extend(base..base + count);
            }
        }

        self.bounds = None;
    }

    /// Transform positions and normals in place.
    pub fn apply_transform(&mut self, transform: &Transform) {
        let matrix = transform.matrix();
        for p in &mut self.positions {
            *p = matrix.transform_point3(*p);
        }
        if !self.normals.is_empty() {
            let normal_matrix = transform.normal_matrix();
            for n in &mut self.normals {
                *n = (normal_matrix * *n).normalize_or_zero();
            }
        }
        self.bounds = None;
    }
}

/// Shared, lockable handle to a [`Mesh`].
///
/// Cloning the handle shares the mesh. Readers take [`read`](Self::read);
/// client code takes [`write`](Self::write) to edit it.
#[derive(Debug, Clone, Default)]
pub struct MeshRef(Arc<RwLock<Mesh>>);

impl MeshRef {
    pub fn new(mesh: Mesh) -> Self {
        Self(Arc::new(RwLock::new(mesh)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Mesh> {
        self.0.read()
    }

    /// Read lock that may be taken while this thread already holds one.
    pub(crate) fn read_recursive(&self) -> RwLockReadGuard<'_, Mesh> {
        self.0.read_recursive()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Mesh> {
        self.0.write()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Mesh> for MeshRef {
    fn from(mesh: Mesh) -> Self {
        Self::new(mesh)
    }
}
