//! Deterministic object and mesh fixtures.
//!
//! Random objects come in two structurally distinct profiles, so a batcher
//! fed any number of them ends up with exactly two batches.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tessel_core::math::Vec3;
use tessel_render::{Color, Mesh, Object, ObjectRef, State, Transform};

/// Seed used by [`n_rand_objects`] when the caller does not care.
pub const DEFAULT_SEED: u64 = 0x7e55e1;

pub fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// A plain, non-indexed triangle.
pub fn triangle() -> Mesh {
    Mesh::new().with_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
}

/// An indexed unit quad with per-vertex colors.
pub fn colored_quad() -> Mesh {
    Mesh::new()
        .with_positions(vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y])
        .with_colors(vec![Color::RED, Color::GREEN, Color::BLUE, Color::WHITE])
        .with_indices(vec![0, 1, 2, 0, 2, 3])
}

/// The state of "dissimilar" random objects.
pub fn dissimilar_state() -> State {
    State {
        dithering: false,
        ..State::default()
    }
}

/// An object with a single triangle mesh in one of two profiles.
///
/// "Similar" objects use the default state and no textures. The others turn
/// dithering off, bind two empty texture slots and sit at a random position.
pub fn rand_object(rng: &mut impl Rng) -> ObjectRef {
    let object = Object::new().with_mesh(triangle());
    let object = if rng.gen_bool(0.5) {
        object
    } else {
        let pos = Vec3::new(rng.r#gen(), rng.r#gen(), rng.r#gen());
        object
            .with_state(dissimilar_state())
            .with_textures(vec![None, None])
            .with_transform(Transform::from_translation(pos))
    };
    ObjectRef::new(object)
}

/// `n` objects from [`rand_object`], seeded for reproducibility.
pub fn n_rand_objects(n: usize, seed: u64) -> Vec<ObjectRef> {
    let mut rng = seeded_rng(seed);
    (0..n).map(|_| rand_object(&mut rng)).collect()
}

/// Whether `object` has the "similar" profile of [`rand_object`].
pub fn is_similar(object: &ObjectRef) -> bool {
    object.read().textures.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_profiles() {
        let a: Vec<bool> = n_rand_objects(64, 7).iter().map(is_similar).collect();
        let b: Vec<bool> = n_rand_objects(64, 7).iter().map(is_similar).collect();
        assert_eq!(a, b);
        assert!(a.contains(&true) && a.contains(&false));
    }

    #[test]
    fn test_fixture_meshes_are_valid() {
        assert!(triangle().validate().is_ok());
        assert!(colored_quad().validate().is_ok());
    }
}
