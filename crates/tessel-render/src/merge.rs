//! Merging several objects into one drawable.
//!
//! [`batch`] is the checked entry point for callers. The [`Batcher`](crate::Batcher)
//! drives the same [`Merger`] without material checks, because it only merges
//! objects it has already classified as compatible. Mesh channel sets are
//! compared on every path.

use std::borrow::Cow;
use std::ops::Deref;

use parking_lot::RwLockReadGuard;
use tessel_core::profiling::profile_function;

use crate::error::{MergeError, MergeResult};
use crate::mesh::{Mesh, MeshRef};
use crate::object::{Object, ObjectRef};
use crate::transform::Transform;

/// How [`batch_with`] merges.
///
/// Direct merges always verify shared state, shader and textures, and
/// validate every mesh. Only the [`Batcher`](crate::Batcher), which merges
/// objects it has already classified, turns those checks off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    pub(crate) check_types: bool,
    /// Apply each object's transform to its geometry so the merged
    /// object can be drawn with the identity transform.
    pub bake_transforms: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            check_types: true,
            bake_transforms: true,
        }
    }
}

impl MergeOptions {
    /// Skip material checks and mesh validation. Mesh channel sets are
    /// still compared before anything is appended.
    pub(crate) fn unchecked() -> Self {
        Self {
            check_types: false,
            ..Self::default()
        }
    }

    pub fn with_bake_transforms(mut self, bake: bool) -> Self {
        self.bake_transforms = bake;
        self
    }
}

/// Merge `objects` into one object with a single mesh, using default options.
///
/// All objects must share state, shader and texture list, and all meshes must
/// carry the same channels. Meshes are folded in order: objects in slice order,
/// then each object's meshes in order.
///
/// # Example
///
/// ```
/// use tessel_render::{batch, Mesh, Object, ObjectRef};
/// use tessel_core::math::Vec3;
///
/// let a = ObjectRef::new(Object::new().with_mesh(Mesh::new().with_positions(vec![Vec3::ZERO; 3])));
/// let b = ObjectRef::new(Object::new().with_mesh(Mesh::new().with_positions(vec![Vec3::ONE; 3])));
/// let merged = batch(&[a, b]).unwrap();
/// assert_eq!(merged.meshes.len(), 1);
/// assert_eq!(merged.vertex_count(), 6);
/// ```
pub fn batch(objects: &[ObjectRef]) -> MergeResult<Object> {
    batch_with(objects, MergeOptions::default())
}

/// [`batch`] with explicit options.
///
/// Each object and its meshes are read-locked only while it is folded in.
pub fn batch_with(objects: &[ObjectRef], options: MergeOptions) -> MergeResult<Object> {
    profile_function!();
    let mut merger = Merger::new(options);
    for (i, object) in objects.iter().enumerate() {
        let object = object.read();
        let meshes = lock_meshes(&object);
        merger.push(i, &object, &meshes)?;
    }
    merger.finish()
}

/// Read-lock every mesh of `object`, in order.
///
/// The guards are held together so that classification and merging see the
/// same data. An object may list one mesh twice, so the locks are recursive.
pub(crate) fn lock_meshes(object: &Object) -> Vec<RwLockReadGuard<'_, Mesh>> {
    object.meshes.iter().map(MeshRef::read_recursive).collect()
}

/// Incremental object merger.
///
/// The first pushed object supplies state, shader and textures. Its first
/// mesh is deep-copied into the accumulator, so client meshes are never
/// modified.
pub(crate) struct Merger {
    options: MergeOptions,
    template: Option<Object>,
    acc: Option<Mesh>,
    contributors: usize,
}

impl Merger {
    pub(crate) fn new(options: MergeOptions) -> Self {
        Self {
            options,
            template: None,
            acc: None,
            contributors: 0,
        }
    }

    /// Number of objects folded in so far.
    pub(crate) fn contributors(&self) -> usize {
        self.contributors
    }

    /// Fold `object` in, reading its geometry from `meshes`, which must be
    /// the locked meshes of `object` in order. `index` only labels errors.
    ///
    /// Every mesh is checked before any is appended, so a failed push leaves
    /// the merger as it was.
    pub(crate) fn push<M>(&mut self, index: usize, object: &Object, meshes: &[M]) -> MergeResult<()>
    where
        M: Deref<Target = Mesh>,
    {
        if let Some(first) = &self.template
            && self.options.check_types
        {
            if first.state != object.state {
                return Err(MergeError::StateMismatch { object: index });
            }
            if first.shader != object.shader {
                return Err(MergeError::ShaderMismatch { object: index });
            }
            if first.textures != object.textures {
                return Err(MergeError::TexturesMismatch { object: index });
            }
        }

        let incompatible = |mesh, source| MergeError::IncompatibleMesh {
            object: index,
            mesh,
            source,
        };
        let target = match &self.acc {
            Some(acc) => Some(acc.signature()),
            None => meshes.first().map(|m| m.signature()),
        };
        for (m, mesh) in meshes.iter().enumerate() {
            if self.options.check_types {
                mesh.validate().map_err(|err| incompatible(m, err))?;
            }
            if let Some(err) = target.as_ref().and_then(|t| t.append_mismatch(&mesh.signature())) {
                return Err(incompatible(m, err));
            }
        }

        if self.template.is_none() {
            self.template = Some(Object {
                state: object.state,
                shader: object.shader.clone(),
                textures: object.textures.clone(),
                meshes: Vec::new(),
                transform: object.transform,
            });
        }

        let bake = self.options.bake_transforms && !object.transform.is_identity();
        for mesh in meshes {
            let mesh: Cow<'_, Mesh> = if bake {
                let mut baked = Mesh::clone(&**mesh);
                baked.apply_transform(&object.transform);
                Cow::Owned(baked)
            } else {
                Cow::Borrowed(&**mesh)
            };

            match &mut self.acc {
                None => {
                    let mut acc = mesh.into_owned();
                    acc.keep_data_on_load = false;
                    acc.dynamic = false;
                    acc.invalidate_bounds();
                    self.acc = Some(acc);
                }
                Some(acc) => acc.append(&mesh),
            }
        }

        self.contributors += 1;
        Ok(())
    }

    /// The merged object. Objects without meshes yield one empty mesh.
    pub(crate) fn finish(self) -> MergeResult<Object> {
        let mut merged = self.template.ok_or(MergeError::NoObjects)?;
        merged.meshes = vec![MeshRef::new(self.acc.unwrap_or_default())];
        if self.options.bake_transforms {
            merged.transform = Transform::IDENTITY;
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::error::MeshError;
    use crate::resource::{Shader, ShaderRef};
    use crate::signature::Channel;
    use crate::state::State;
    use tessel_core::math::Vec3;

    fn tri(offset: f32) -> Mesh {
        Mesh::new().with_positions(vec![
            Vec3::splat(offset),
            Vec3::splat(offset + 1.0),
            Vec3::splat(offset + 2.0),
        ])
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(batch(&[]).unwrap_err(), MergeError::NoObjects);
    }

    #[test]
    fn test_merge_folds_objects_then_meshes() {
        let a = ObjectRef::new(Object::new().with_mesh(tri(0.0)).with_mesh(tri(10.0)));
        let b = ObjectRef::new(Object::new().with_mesh(tri(20.0)));
        let merged = batch(&[a, b]).unwrap();

        let mesh = merged.meshes[0].read();
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.positions[3], Vec3::splat(10.0));
        assert_eq!(mesh.positions[6], Vec3::splat(20.0));
    }

    #[test]
    fn test_merge_does_not_touch_client_meshes() {
        let mut first = tri(0.0);
        first.dynamic = true;
        first.keep_data_on_load = true;
        let a = ObjectRef::new(Object::new().with_mesh(first));
        let b = ObjectRef::new(Object::new().with_mesh(tri(5.0)));

        let merged = batch(&[a.clone(), b]).unwrap();
        assert_eq!(a.read().meshes[0].read().vertex_count(), 3);

        let mesh = merged.meshes[0].read();
        assert!(!mesh.dynamic);
        assert!(!mesh.keep_data_on_load);
        assert!(mesh.bounds().is_none());
    }

    #[test]
    fn test_state_shader_texture_mismatch() {
        let shader = ShaderRef::new(Shader::new("s"));
        let base = Object::new().with_shader(shader.clone()).with_mesh(tri(0.0));

        let other_state = Object {
            state: State {
                dithering: false,
                ..State::default()
            },
            ..base.deep_clone()
        };
        let other_shader = base.deep_clone().with_shader(ShaderRef::new(Shader::new("s")));
        let other_textures = base.deep_clone().with_textures(vec![None]);

        let first = ObjectRef::new(base);
        let cases = [
            (other_state, MergeError::StateMismatch { object: 1 }),
            (other_shader, MergeError::ShaderMismatch { object: 1 }),
            (other_textures, MergeError::TexturesMismatch { object: 1 }),
        ];
        for (object, want) in cases {
            let err = batch(&[first.clone(), ObjectRef::new(object)]).unwrap_err();
            assert_eq!(err, want);
        }
    }

    #[test]
    fn test_incompatible_mesh_is_reported() {
        let a = ObjectRef::new(Object::new().with_mesh(tri(0.0)));
        let b = ObjectRef::new(
            Object::new()
                .with_mesh(tri(1.0))
                .with_mesh(tri(2.0).with_colors(vec![Color::RED; 3])),
        );
        let err = batch(&[a, b]).unwrap_err();
        assert_eq!(
            err,
            MergeError::IncompatibleMesh {
                object: 1,
                mesh: 1,
                source: MeshError::ChannelMismatch {
                    channel: Channel::Colors,
                    present_in_target: false,
                },
            }
        );
    }

    #[test]
    fn test_unchecked_merge_still_compares_channels() {
        let a = ObjectRef::new(Object::new().with_mesh(tri(0.0).with_normals(vec![Vec3::Z; 3])));
        let b = ObjectRef::new(Object::new().with_mesh(tri(1.0)));
        let err = batch_with(&[a, b], MergeOptions::unchecked()).unwrap_err();
        assert_eq!(
            err,
            MergeError::IncompatibleMesh {
                object: 1,
                mesh: 0,
                source: MeshError::ChannelMismatch {
                    channel: Channel::Normals,
                    present_in_target: true,
                },
            }
        );
    }

    #[test]
    fn test_failed_push_leaves_merger_unchanged() {
        let mut merger = Merger::new(MergeOptions::unchecked());
        let first = Object::new().with_mesh(tri(0.0));
        merger.push(0, &first, &lock_meshes(&first)).unwrap();

        let bad = Object::new()
            .with_mesh(tri(3.0))
            .with_mesh(tri(6.0).with_colors(vec![Color::RED; 3]));
        assert!(merger.push(1, &bad, &lock_meshes(&bad)).is_err());
        assert_eq!(merger.contributors(), 1);
        assert_eq!(merger.finish().unwrap().vertex_count(), 3);
    }

    #[test]
    fn test_bake_transforms() {
        let moved = Object::new()
            .with_mesh(tri(0.0))
            .with_transform(Transform::from_translation(Vec3::X));
        let a = ObjectRef::new(moved);

        let baked = batch(&[a.clone()]).unwrap();
        assert!(baked.transform.is_identity());
        assert_eq!(baked.meshes[0].read().positions[0], Vec3::X);

        let kept = batch_with(&[a], MergeOptions::default().with_bake_transforms(false)).unwrap();
        assert_eq!(kept.transform.translation, Vec3::X);
        assert_eq!(kept.meshes[0].read().positions[0], Vec3::ZERO);
    }

    #[test]
    fn test_objects_without_meshes() {
        let merged = batch(&[ObjectRef::new(Object::new())]).unwrap();
        assert_eq!(merged.meshes.len(), 1);
        assert_eq!(merged.vertex_count(), 0);
    }

    #[test]
    fn test_associative_under_order() {
        let objs: Vec<ObjectRef> = (0..3)
            .map(|i| ObjectRef::new(Object::new().with_mesh(tri(i as f32 * 3.0).with_indices(vec![2, 1, 0]))))
            .collect();
        let all = batch(&objs).unwrap();

        let mut pairwise = objs[0].read().meshes[0].read().clone();
        for obj in &objs[1..] {
            pairwise.append(&obj.read().meshes[0].read());
        }
        assert_eq!(all.meshes[0].read().positions, pairwise.positions);
        assert_eq!(all.meshes[0].read().indices, pairwise.indices);
    }
}
