//! Direct merging through `batch` and `batch_with`.

use std::error::Error;

use tessel_core::math::{Vec2, Vec3};
use tessel_render::{
    Batcher, Channel, MergeError, MergeOptions, Mesh, MeshError, Object, ObjectRef, Shader, ShaderRef, Texture,
    TextureRef, VertexAttrib, batch, batch_with,
};
use tessel_test_utils::fixtures;

fn textured(shader: &ShaderRef, texture: &TextureRef, mesh: Mesh) -> ObjectRef {
    ObjectRef::new(
        Object::new()
            .with_shader(shader.clone())
            .with_textures(vec![Some(texture.clone())])
            .with_mesh(mesh),
    )
}

#[test]
fn test_merge_keeps_material_and_remaps_indices() {
    let shader = ShaderRef::new(Shader::new("sprite"));
    let texture = TextureRef::new(Texture::new(16, 16));
    let objects: Vec<ObjectRef> = (0..3)
        .map(|_| textured(&shader, &texture, fixtures::colored_quad()))
        .collect();

    let merged = batch(&objects).unwrap();
    assert_eq!(merged.shader.as_ref(), Some(&shader));
    assert_eq!(merged.textures, vec![Some(texture)]);

    let mesh = merged.meshes[0].read();
    assert_eq!(mesh.vertex_count(), 12);
    assert_eq!(mesh.colors.len(), 12);
    assert_eq!(&mesh.indices[6..12], &[4, 5, 6, 4, 6, 7]);
    assert_eq!(&mesh.indices[12..], &[8, 9, 10, 8, 10, 11]);
    assert!(mesh.validate().is_ok());
}

#[test]
fn test_custom_attributes_and_tex_coords_merge() {
    let mesh = || {
        Mesh::new()
            .with_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
            .with_tex_coords(vec![Vec2::ZERO, Vec2::X, Vec2::Y])
            .with_attrib("sway", VertexAttrib::F32(vec![0.0, 0.5, 1.0]))
    };
    let objects = [
        ObjectRef::new(Object::new().with_mesh(mesh())),
        ObjectRef::new(Object::new().with_mesh(mesh())),
    ];

    let merged = batch(&objects).unwrap();
    let merged = merged.meshes[0].read();
    assert_eq!(merged.tex_coords[0].len(), 6);
    assert_eq!(merged.attribs["sway"].len(), 6);
}

#[test]
fn test_incompatible_direct_merge_reports_channel() {
    let plain = ObjectRef::new(Object::new().with_mesh(fixtures::triangle()));
    let colored = ObjectRef::new(Object::new().with_mesh(fixtures::colored_quad()));

    let err = batch(&[plain, colored]).unwrap_err();
    match &err {
        MergeError::IncompatibleMesh { object, mesh, source } => {
            assert_eq!((*object, *mesh), (1, 0));
            assert_eq!(
                *source,
                MeshError::ChannelMismatch {
                    channel: Channel::Colors,
                    present_in_target: false,
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.source().is_some());
    assert!(err.to_string().contains("colors"));
}

#[test]
fn test_invalid_mesh_rejected_when_checked() {
    let broken = Mesh::new()
        .with_positions(vec![Vec3::ZERO; 3])
        .with_indices(vec![0, 1, 9]);
    let objects = [ObjectRef::new(Object::new().with_mesh(broken))];

    let err = batch(&objects).unwrap_err();
    assert!(matches!(
        err,
        MergeError::IncompatibleMesh {
            source: MeshError::IndexOutOfRange { index: 9, .. },
            ..
        }
    ));
}

#[test]
fn test_channel_mismatch_is_an_error_without_baking() {
    let options = MergeOptions::default().with_bake_transforms(false);
    let a = ObjectRef::new(Object::new().with_mesh(fixtures::triangle().with_normals(vec![Vec3::Z; 3])));
    let b = ObjectRef::new(Object::new().with_mesh(fixtures::triangle()));

    let err = batch_with(&[a.clone(), b], options).unwrap_err();
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

    let merged = batch_with(&[a.clone(), a], options).unwrap();
    assert!(merged.meshes[0].read().validate().is_ok());
}

#[test]
fn test_failed_merge_leaves_batcher_untouched() {
    let objects = fixtures::n_rand_objects(50, 5);
    let batcher = Batcher::from_objects(&objects);
    let before = batcher.partition();

    // The two profiles never merge directly.
    let similar = objects.iter().find(|o| fixtures::is_similar(o)).cloned();
    let other = objects.iter().find(|o| !fixtures::is_similar(o)).cloned();
    if let (Some(a), Some(b)) = (similar, other) {
        assert!(batch(&[a, b]).is_err());
    }

    assert_eq!(batcher.partition(), before);
}
