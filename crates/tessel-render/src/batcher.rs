//! Incremental draw-call batching.
//!
//! A [`Batcher`] partitions a live set of objects into batches of objects that
//! share render state, shader, texture list and mesh layout. Each batch keeps a
//! cached merged object that is rebuilt lazily, on the first draw after its
//! membership or one of its members changed.
//!
//! # Locking
//!
//! All batcher state sits behind one mutex held for the whole of each call.
//! Object and mesh read locks are only ever taken while that mutex is held and
//! are released before the call returns. Client code must not hold an object's
//! write lock while calling into the batcher with that same object.
//!
//! # Example
//!
//! ```
//! use tessel_render::{Batcher, Mesh, NullCanvas, Object, ObjectRef, Canvas};
//! use tessel_core::math::Vec3;
//!
//! let objects: Vec<ObjectRef> = (0..10)
//!     .map(|_| ObjectRef::new(Object::new().with_mesh(Mesh::new().with_positions(vec![Vec3::ZERO; 3]))))
//!     .collect();
//!
//! let batcher = Batcher::from_objects(&objects);
//! assert_eq!(batcher.batch_count(), 1);
//!
//! let canvas = NullCanvas::new();
//! batcher.draw_to(&canvas, canvas.bounds(), None);
//! assert_eq!(batcher.stats().draw_calls, 1);
//! ```

use std::ops::Deref;

use parking_lot::Mutex;
use tessel_core::alloc::HashMap;
use tessel_core::alloc::sparse_set::{IndexSlot, SparseSet};
use tessel_core::geometry::Rect;
use tessel_core::profiling::{profile_function, profile_scope};

use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::merge::{MergeOptions, Merger, lock_meshes};
use crate::mesh::Mesh;
use crate::object::{Object, ObjectId, ObjectRef, WeakObjectRef};
use crate::resource::{ShaderRef, TextureRef};
use crate::signature::MeshSignature;
use crate::state::State;

/// Batcher settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatcherConfig {
    /// Bake member transforms into merged geometry.
    pub bake_transforms: bool,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            bake_transforms: true,
        }
    }
}

/// Counters describing the batcher after the last [`Batcher::draw_to`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatcherStats {
    /// Tracked objects.
    pub objects: usize,
    pub batches: usize,
    /// Batches drawn member by member.
    pub mixed_batches: usize,
    /// Merged objects rebuilt during the last draw.
    pub rebuilds: usize,
    /// Canvas draw calls issued during the last draw.
    pub draw_calls: usize,
}

/// Mesh layout part of a batch key.
#[derive(Debug, Clone, PartialEq)]
enum Layout {
    /// Every mesh has this signature.
    Uniform(MeshSignature),
    /// The object's meshes disagree.
    Mixed,
    /// The object has no meshes.
    Undefined,
}

impl Layout {
    /// Layout of an object's locked meshes.
    fn of<M: Deref<Target = Mesh>>(meshes: &[M]) -> Self {
        let Some((first, rest)) = meshes.split_first() else {
            return Layout::Undefined;
        };
        let signature = first.signature();
        if rest.iter().all(|m| m.signature() == signature) {
            Layout::Uniform(signature)
        } else {
            Layout::Mixed
        }
    }

    fn is_mergeable(&self) -> bool {
        matches!(self, Layout::Uniform(_))
    }

    /// Whether an object with layout `object` may join a batch keyed by `self`.
    ///
    /// Objects without meshes fit anywhere. Mixed objects only join batches
    /// that draw member by member, and mergeable objects only join a batch
    /// with their exact signature. Mixed and mesh-less batches therefore turn
    /// away mergeable objects even though they never compare signatures, so
    /// a mergeable object always lands in a batch that can merge it.
    fn accepts(&self, object: &Layout) -> bool {
        match (self, object) {
            (_, Layout::Undefined) => true,
            (Layout::Uniform(batch), Layout::Uniform(obj)) => batch == obj,
            (Layout::Uniform(_), Layout::Mixed) => false,
            (Layout::Mixed | Layout::Undefined, Layout::Mixed) => true,
            (Layout::Mixed | Layout::Undefined, Layout::Uniform(_)) => false,
        }
    }
}

#[derive(Debug, Clone)]
struct BatchKey {
    state: State,
    shader: Option<ShaderRef>,
    textures: Vec<Option<TextureRef>>,
    layout: Layout,
}

impl BatchKey {
    fn of(object: &Object, layout: Layout) -> Self {
        Self {
            state: object.state,
            shader: object.shader.clone(),
            textures: object.textures.clone(),
            layout,
        }
    }

    fn matches(&self, object: &Object, layout: &Layout) -> bool {
        self.shader == object.shader
            && self.textures == object.textures
            && self.state == object.state
            && self.layout.accepts(layout)
    }
}

#[derive(Debug)]
struct Batch {
    key: BatchKey,
    /// Tracked slots in insertion order; this is the merge order.
    members: Vec<IndexSlot>,
    /// Cached merge of `members`. `None` while dirty.
    merged: Option<Object>,
    /// Members left out of `merged` because they no longer fit the key.
    strays: Vec<IndexSlot>,
}

impl Batch {
    fn mark_dirty(&mut self) {
        self.merged = None;
    }
}

#[derive(Debug)]
struct Tracked {
    object: WeakObjectRef,
    batch: IndexSlot,
}

#[derive(Debug, Default)]
struct BatcherState {
    objects: SparseSet<Tracked>,
    index: HashMap<ObjectId, IndexSlot>,
    batches: SparseSet<Batch>,
    /// Batch slots in creation order; drives search and draw order.
    order: Vec<IndexSlot>,
    stats: BatcherStats,
}

impl BatcherState {
    fn add(&mut self, object: &ObjectRef) {
        let id = object.id();
        if let Some(&slot) = self.index.get(&id) {
            let batch = self.objects.get(slot).batch;
            self.batches.get_mut(batch).mark_dirty();
            return;
        }

        let batch = {
            let guard = object.read();
            let layout = Layout::of(&lock_meshes(&guard));
            match self.find_batch(&guard, &layout) {
                Some(batch) => batch,
                None => self.create_batch(BatchKey::of(&guard, layout), id),
            }
        };

        let slot = self.objects.push(Tracked {
            object: object.downgrade(),
            batch,
        });
        self.index.insert(id, slot);

        let batch = self.batches.get_mut(batch);
        batch.members.push(slot);
        batch.mark_dirty();
    }

    /// First batch, in creation order, whose key accepts `object`.
    fn find_batch(&self, object: &Object, layout: &Layout) -> Option<IndexSlot> {
        self.order
            .iter()
            .copied()
            .find(|&slot| self.batches.get(slot).key.matches(object, layout))
    }

    fn create_batch(&mut self, key: BatchKey, seed: ObjectId) -> IndexSlot {
        match &key.layout {
            Layout::Uniform(_) => tracing::debug!("New batch for object {}", seed),
            Layout::Mixed => tracing::debug!("New mixed-layout batch for object {}", seed),
            Layout::Undefined => tracing::debug!("New mesh-less batch for object {}", seed),
        }
        let slot = self.batches.push(Batch {
            key,
            members: Vec::new(),
            merged: None,
            strays: Vec::new(),
        });
        self.order.push(slot);
        slot
    }

    fn remove(&mut self, id: ObjectId) {
        let Some(slot) = self.index.remove(&id) else {
            return;
        };
        let tracked = self.objects.remove(slot);

        let batch = self.batches.get_mut(tracked.batch);
        batch.members.retain(|&m| m != slot);
        if batch.members.is_empty() {
            self.batches.remove(tracked.batch);
            self.order.retain(|&b| b != tracked.batch);
            tracing::debug!("Deleted empty batch after removing object {}", id);
        } else {
            batch.mark_dirty();
        }
    }

    fn update(&mut self, object: &ObjectRef) {
        let Some(&slot) = self.index.get(&object.id()) else {
            self.add(object);
            return;
        };
        let batch = self.objects.get(slot).batch;

        let still_fits = {
            let guard = object.read();
            let layout = Layout::of(&lock_meshes(&guard));
            // Mesh-less objects fit every batch of their material, so only a
            // fresh search puts them where a remove and re-add would.
            layout != Layout::Undefined && self.batches.get(batch).key.matches(&guard, &layout)
        };

        if still_fits {
            self.batches.get_mut(batch).mark_dirty();
        } else {
            self.remove(object.id());
            self.add(object);
        }
    }

    /// Drop every tracked object whose client handle is gone.
    fn prune(&mut self) -> usize {
        let dead: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|t| !t.object.is_alive())
            .map(|t| t.object.id())
            .collect();
        for &id in &dead {
            self.remove(id);
        }
        dead.len()
    }

    fn clear(&mut self) {
        self.objects.clear();
        self.index.clear();
        self.batches.clear();
        self.order.clear();
        self.stats = BatcherStats::default();
    }

    fn upgrade(&self, slot: IndexSlot) -> Option<ObjectRef> {
        let tracked = self.objects.get(slot);
        let object = tracked.object.upgrade();
        if object.is_none() {
            tracing::warn!("Skipping dropped object {} still tracked by batcher", tracked.object.id());
        }
        object
    }

    /// Merge the live members of `batch` that still fit its key.
    ///
    /// Each member's meshes stay read-locked from the fit check until they
    /// are folded in, so a concurrent mesh write lands wholly before or after.
    fn rebuild(&mut self, batch: IndexSlot, options: MergeOptions) {
        profile_scope!("rebuild_batch");
        let mut merger = Merger::new(options);
        let mut strays = Vec::new();

        for (i, &slot) in self.batches.get(batch).members.iter().enumerate() {
            let Some(object) = self.upgrade(slot) else {
                continue;
            };
            let guard = object.read();
            let meshes = lock_meshes(&guard);
            let key = &self.batches.get(batch).key;
            if !key.matches(&guard, &Layout::of(&meshes)) {
                tracing::warn!(
                    "Object {} changed without Batcher::update, drawing it unmerged",
                    object.id()
                );
                strays.push(slot);
                continue;
            }
            if let Err(err) = merger.push(i, &guard, &meshes) {
                tracing::warn!("Skipping object {} in batch rebuild: {}", object.id(), err);
            }
        }

        let merged = match merger.contributors() {
            0 => None,
            _ => merger.finish().ok(),
        };
        tracing::trace!(
            "Rebuilt batch with {} members ({} merged, {} strays)",
            self.batches.get(batch).members.len(),
            merged.as_ref().map_or(0, |m| m.vertex_count()),
            strays.len()
        );

        let entry = self.batches.get_mut(batch);
        // An empty merge stays cached as an empty object so the batch is clean.
        entry.merged = Some(merged.unwrap_or_default());
        entry.strays = strays;
    }

    fn draw_members<C: Canvas + ?Sized>(
        &self,
        members: &[IndexSlot],
        canvas: &C,
        region: Rect<i32>,
        camera: Option<&Camera>,
    ) -> usize {
        let mut calls = 0;
        for &slot in members {
            if let Some(object) = self.upgrade(slot) {
                canvas.draw(region, &object.read(), camera);
                calls += 1;
            }
        }
        calls
    }

    fn draw_to<C: Canvas + ?Sized>(
        &mut self,
        canvas: &C,
        region: Rect<i32>,
        camera: Option<&Camera>,
        options: MergeOptions,
    ) {
        let mut stats = BatcherStats {
            objects: self.objects.len(),
            batches: self.order.len(),
            ..Default::default()
        };

        for i in 0..self.order.len() {
            let slot = self.order[i];

            if !self.batches.get(slot).key.layout.is_mergeable() {
                stats.mixed_batches += 1;
                let batch = self.batches.get(slot);
                stats.draw_calls += self.draw_members(&batch.members, canvas, region, camera);
                continue;
            }

            if self.batches.get(slot).merged.is_none() {
                self.rebuild(slot, options);
                stats.rebuilds += 1;
            }

            let batch = self.batches.get(slot);
            if let Some(merged) = &batch.merged
                && !merged.meshes.is_empty()
            {
                canvas.draw(region, merged, camera);
                stats.draw_calls += 1;
            }
            stats.draw_calls += self.draw_members(&batch.strays, canvas, region, camera);
        }

        self.stats = stats;
    }
}

/// Groups objects into as few draw calls as possible.
///
/// All methods take `&self`; a `Batcher` can be shared between threads. Calls
/// are serialized by an internal lock, so the merge order of concurrently
/// added objects is the order in which their calls acquire it.
#[derive(Debug, Default)]
pub struct Batcher {
    state: Mutex<BatcherState>,
    config: BatcherConfig,
}

impl Batcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BatcherConfig) -> Self {
        Self {
            state: Mutex::default(),
            config,
        }
    }

    /// A batcher already tracking `objects`.
    ///
    /// Like [`add`](Self::add), this keeps only weak handles; callers must keep
    /// their [`ObjectRef`]s alive for the objects to be drawn.
    pub fn from_objects(objects: &[ObjectRef]) -> Self {
        let batcher = Self::new();
        batcher.add(objects);
        batcher
    }

    pub fn config(&self) -> BatcherConfig {
        self.config
    }

    /// Start tracking `objects`.
    ///
    /// Each object joins the first existing batch that matches it, or a new
    /// batch of its own. Adding an object that is already tracked only marks
    /// its batch for rebuild.
    ///
    /// The batcher holds weak handles only. An object whose last
    /// [`ObjectRef`] is dropped is skipped at draw and removed by
    /// [`prune`](Self::prune).
    pub fn add(&self, objects: &[ObjectRef]) {
        profile_function!();
        let mut state = self.state.lock();
        for object in objects {
            state.add(object);
        }
    }

    /// Stop tracking `objects`. Untracked objects are ignored.
    pub fn remove(&self, objects: &[ObjectRef]) {
        profile_function!();
        let mut state = self.state.lock();
        for object in objects {
            state.remove(object.id());
        }
    }

    /// Tell the batcher that `objects` changed.
    ///
    /// Equivalent to [`remove`](Self::remove) followed by [`add`](Self::add),
    /// but an object that still matches its batch stays in place and only
    /// marks the batch for rebuild.
    ///
    /// Each object is classified from a snapshot taken under its read lock.
    /// A write that lands after that snapshot is picked up by the next
    /// `update`, or at the next rebuild, where members that no longer fit
    /// are drawn on their own.
    pub fn update(&self, objects: &[ObjectRef]) {
        profile_function!();
        let mut state = self.state.lock();
        for object in objects {
            state.update(object);
        }
    }

    /// Draw every batch to `canvas`.
    ///
    /// Dirty batches are merged first. Batches whose objects cannot be merged
    /// draw each member separately. Membership is never changed here.
    pub fn draw_to<C: Canvas + ?Sized>(&self, canvas: &C, region: Rect<i32>, camera: Option<&Camera>) {
        profile_function!();
        let options = MergeOptions::unchecked().with_bake_transforms(self.config.bake_transforms);
        self.state.lock().draw_to(canvas, region, camera, options);
    }

    /// Stop tracking objects whose last [`ObjectRef`] was dropped.
    /// Returns how many were removed.
    pub fn prune(&self) -> usize {
        let pruned = self.state.lock().prune();
        if pruned > 0 {
            tracing::debug!("Pruned {} dropped objects", pruned);
        }
        pruned
    }

    pub fn clear(&self) {
        self.state.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.state.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn batch_count(&self) -> usize {
        self.state.lock().order.len()
    }

    pub fn contains(&self, object: &ObjectRef) -> bool {
        self.state.lock().index.contains_key(&object.id())
    }

    /// Member ids of every batch, batches in creation order and members in
    /// merge order.
    pub fn partition(&self) -> Vec<Vec<ObjectId>> {
        let state = self.state.lock();
        state
            .order
            .iter()
            .map(|&batch| {
                state
                    .batches
                    .get(batch)
                    .members
                    .iter()
                    .map(|&slot| state.objects.get(slot).object.id())
                    .collect()
            })
            .collect()
    }

    pub fn stats(&self) -> BatcherStats {
        self.state.lock().stats
    }
}
