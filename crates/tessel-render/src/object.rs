//! Drawable objects and the shared handles the batcher tracks them by.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::mesh::{Mesh, MeshRef};
use crate::resource::{ShaderRef, TextureRef};
use crate::state::State;
use crate::transform::Transform;

/// A drawable: render state, shader, textures, meshes and a transform.
#[derive(Debug, Clone, Default)]
pub struct Object {
    pub state: State,
    pub shader: Option<ShaderRef>,
    /// Texture slots in binding order. Compared positionally.
    pub textures: Vec<Option<TextureRef>>,
    pub meshes: Vec<MeshRef>,
    pub transform: Transform,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    pub fn with_shader(mut self, shader: ShaderRef) -> Self {
        self.shader = Some(shader);
        self
    }

    pub fn with_textures(mut self, textures: Vec<Option<TextureRef>>) -> Self {
        self.textures = textures;
        self
    }

    pub fn with_mesh(mut self, mesh: impl Into<MeshRef>) -> Self {
        self.meshes.push(mesh.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Same state, shader and texture list: the part of the batch key that
    /// does not depend on mesh layout.
    pub fn shares_material(&self, other: &Object) -> bool {
        self.state == other.state && self.shader == other.shader && self.textures == other.textures
    }

    /// Total vertices across all meshes. Takes each mesh's read lock.
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.read().vertex_count()).sum()
    }

    /// Deep copy with fresh mesh handles, so edits do not reach `self`.
    pub fn deep_clone(&self) -> Object {
        Object {
            meshes: self
                .meshes
                .iter()
                .map(|m| MeshRef::new(Mesh::clone(&m.read())))
                .collect(),
            ..self.clone()
        }
    }
}

/// Process-unique identity of an [`ObjectRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shared, lockable handle to a client-owned [`Object`].
///
/// Clones share the object and its [`ObjectId`]. Readers (the batcher) take
/// [`read`](Self::read); client code edits through [`write`](Self::write) and
/// then tells the batcher with [`Batcher::update`](crate::Batcher::update).
#[derive(Clone)]
pub struct ObjectRef {
    id: ObjectId,
    inner: Arc<RwLock<Object>>,
}

impl ObjectRef {
    pub fn new(object: Object) -> Self {
        Self {
            id: ObjectId::next(),
            inner: Arc::new(RwLock::new(object)),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Object> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Object> {
        self.inner.write()
    }

    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef {
            id: self.id,
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl From<Object> for ObjectRef {
    fn from(object: Object) -> Self {
        Self::new(object)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef").field("id", &self.id).finish()
    }
}

/// Non-owning form of [`ObjectRef`].
#[derive(Clone)]
pub struct WeakObjectRef {
    id: ObjectId,
    inner: Weak<RwLock<Object>>,
}

impl WeakObjectRef {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.inner.upgrade().map(|inner| ObjectRef { id: self.id, inner })
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakObjectRef")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Shader;
    use tessel_core::math::Vec3;

    #[test]
    fn test_ids_are_unique_and_shared_by_clones() {
        let a = ObjectRef::new(Object::new());
        let b = ObjectRef::new(Object::new());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_weak_ref_dies_with_last_strong() {
        let a = ObjectRef::new(Object::new());
        let weak = a.downgrade();
        assert!(weak.upgrade().is_some());
        drop(a);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_shares_material() {
        let shader = ShaderRef::new(Shader::new("s"));
        let a = Object::new().with_shader(shader.clone());
        let b = Object::new().with_shader(shader);
        let c = Object::new().with_shader(ShaderRef::new(Shader::new("s")));
        assert!(a.shares_material(&b));
        assert!(!a.shares_material(&c));
        assert!(!a.shares_material(&b.clone().with_textures(vec![None])));
    }

    #[test]
    fn test_deep_clone_detaches_meshes() {
        let obj = Object::new().with_mesh(Mesh::new().with_positions(vec![Vec3::ZERO]));
        let copy = obj.deep_clone();
        copy.meshes[0].write().positions.push(Vec3::ONE);
        assert_eq!(obj.vertex_count(), 1);
        assert_eq!(copy.vertex_count(), 2);
    }
}
