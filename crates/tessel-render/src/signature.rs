//! Structural mesh descriptors.
//!
//! A [`MeshSignature`] records which optional vertex channels a mesh populates
//! and whether it is indexed. Two meshes with equal signatures can always be
//! concatenated; the batcher uses signatures as part of its batch key.

use std::fmt;

use bitflags::bitflags;

use crate::error::MeshError;
use crate::mesh::Mesh;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct ChannelFlags: u8 {
        const NORMALS = 1 << 0;
        const COLORS = 1 << 1;
        const BARYCENTRIC = 1 << 2;
        const INDEXED = 1 << 3;
    }
}

/// A per-vertex channel of a [`Mesh`], used to name incompatibilities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Normals,
    Colors,
    Barycentric,
    /// Texture coordinate set by index.
    TexCoords(usize),
    /// Named custom attribute.
    Attrib(String),
    Indices,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Normals => write!(f, "normals"),
            Channel::Colors => write!(f, "colors"),
            Channel::Barycentric => write!(f, "barycentric"),
            Channel::TexCoords(set) => write!(f, "tex coord set {}", set),
            Channel::Attrib(name) => write!(f, "attribute '{}'", name),
            Channel::Indices => write!(f, "indices"),
        }
    }
}

/// Element type of a custom vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttribKind {
    F32,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

/// Which channels of a mesh are populated, and whether it is indexed.
///
/// A channel counts as present when its array is non-empty. Positions are
/// implied and not tracked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeshSignature {
    flags: ChannelFlags,
    /// Indices of populated texture coordinate sets, ascending.
    tex_coords: Vec<usize>,
    /// Populated custom attributes, sorted by name.
    attribs: Vec<(String, AttribKind)>,
}

impl MeshSignature {
    pub fn of(mesh: &Mesh) -> Self {
        let mut flags = ChannelFlags::empty();
        flags.set(ChannelFlags::NORMALS, !mesh.normals.is_empty());
        flags.set(ChannelFlags::COLORS, !mesh.colors.is_empty());
        flags.set(ChannelFlags::BARYCENTRIC, !mesh.barycentric.is_empty());
        flags.set(ChannelFlags::INDEXED, mesh.is_indexed());

        let tex_coords = mesh
            .tex_coords
            .iter()
            .enumerate()
            .filter(|(_, set)| !set.is_empty())
            .map(|(i, _)| i)
            .collect();

        // BTreeMap iteration keeps this sorted.
        let attribs = mesh
            .attribs
            .iter()
            .filter(|(_, attrib)| !attrib.is_empty())
            .map(|(name, attrib)| (name.clone(), attrib.kind()))
            .collect();

        Self {
            flags,
            tex_coords,
            attribs,
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.flags.contains(ChannelFlags::INDEXED)
    }

    pub fn has(&self, channel: &Channel) -> bool {
        match channel {
            Channel::Normals => self.flags.contains(ChannelFlags::NORMALS),
            Channel::Colors => self.flags.contains(ChannelFlags::COLORS),
            Channel::Barycentric => self.flags.contains(ChannelFlags::BARYCENTRIC),
            Channel::TexCoords(set) => self.tex_coords.binary_search(set).is_ok(),
            Channel::Attrib(name) => self.attrib(name).is_some(),
            Channel::Indices => self.is_indexed(),
        }
    }

    fn attrib(&self, name: &str) -> Option<AttribKind> {
        self.attribs
            .binary_search_by(|(n, _)| n.as_str().cmp(name))
            .ok()
            .map(|i| self.attribs[i].1)
    }

    /// First difference between `self` and `other`, indices included.
    ///
    /// Returns `None` exactly when the signatures are equal.
    pub fn mismatch(&self, other: &Self) -> Option<MeshError> {
        self.first_difference(other, true)
    }

    /// First difference that prevents appending a mesh shaped like `source`
    /// to one shaped like `self`. Index presence may differ.
    pub fn append_mismatch(&self, source: &Self) -> Option<MeshError> {
        self.first_difference(source, false)
    }

    fn first_difference(&self, other: &Self, include_indices: bool) -> Option<MeshError> {
        let mismatch = |channel: Channel, present_in_target: bool| MeshError::ChannelMismatch {
            channel,
            present_in_target,
        };

        let fixed = [
            (ChannelFlags::NORMALS, Channel::Normals),
            (ChannelFlags::COLORS, Channel::Colors),
            (ChannelFlags::BARYCENTRIC, Channel::Barycentric),
        ];
        for (flag, channel) in fixed {
            let ours = self.flags.contains(flag);
            if ours != other.flags.contains(flag) {
                return Some(mismatch(channel, ours));
            }
        }

        let tex_diff = self
            .tex_coords
            .iter()
            .chain(&other.tex_coords)
            .copied()
            .filter(|set| {
                self.tex_coords.binary_search(set).is_ok()
                    != other.tex_coords.binary_search(set).is_ok()
            })
            .min();
        if let Some(set) = tex_diff {
            let ours = self.tex_coords.binary_search(&set).is_ok();
            return Some(mismatch(Channel::TexCoords(set), ours));
        }

        for (name, kind) in &self.attribs {
            match other.attrib(name) {
                None => return Some(mismatch(Channel::Attrib(name.clone()), true)),
                Some(found) if found != *kind => {
                    return Some(MeshError::AttribKindMismatch {
                        name: name.clone(),
                        expected: *kind,
                        found,
                    });
                }
                Some(_) => {}
            }
        }
        if let Some((name, _)) = other.attribs.iter().find(|(n, _)| self.attrib(n).is_none()) {
            return Some(mismatch(Channel::Attrib(name.clone()), false));
        }

        if include_indices && self.is_indexed() != other.is_indexed() {
            return Some(mismatch(Channel::Indices, self.is_indexed()));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::mesh::VertexAttrib;
    use tessel_core::math::{Vec2, Vec3};

    fn tri() -> Mesh {
        Mesh::new().with_positions(vec![Vec3::ZERO; 3])
    }

    #[test]
    fn test_color_channel_breaks_equality() {
        let a = tri();
        let b = tri().with_colors(vec![Color::WHITE; 3]);

        let at = MeshSignature::of(&a);
        let bt = MeshSignature::of(&b);
        assert_ne!(at, bt);
        assert_eq!(
            at.mismatch(&bt),
            Some(MeshError::ChannelMismatch {
                channel: Channel::Colors,
                present_in_target: false,
            })
        );
    }

    #[test]
    fn test_equality_is_reflexive_and_symmetric() {
        let meshes = [
            tri(),
            tri().with_normals(vec![Vec3::Z; 3]),
            tri().with_indices(vec![0, 1, 2]),
            tri().with_tex_coords(vec![Vec2::ZERO; 3]),
            tri().with_attrib("weight", VertexAttrib::F32(vec![1.0; 3])),
        ];
        for a in &meshes {
            let sa = MeshSignature::of(a);
            assert_eq!(sa, sa.clone());
            assert!(sa.mismatch(&sa).is_none());
            for b in &meshes {
                let sb = MeshSignature::of(b);
                assert_eq!(sa == sb, sb == sa);
                assert_eq!(sa.mismatch(&sb).is_none(), sa == sb);
            }
        }
    }

    #[test]
    fn test_indices_only_matter_for_equality() {
        let plain = MeshSignature::of(&tri());
        let indexed = MeshSignature::of(&tri().with_indices(vec![0, 1, 2]));
        assert_ne!(plain, indexed);
        assert!(plain.append_mismatch(&indexed).is_none());
        assert!(matches!(
            plain.mismatch(&indexed),
            Some(MeshError::ChannelMismatch {
                channel: Channel::Indices,
                present_in_target: false
            })
        ));
    }

    #[test]
    fn test_empty_channels_are_absent() {
        let mut mesh = tri();
        mesh.tex_coords.push(Vec::new());
        mesh.attribs.insert("unused".into(), VertexAttrib::Vec4(Vec::new()));
        assert_eq!(MeshSignature::of(&mesh), MeshSignature::of(&tri()));
    }

    #[test]
    fn test_attrib_kind_mismatch() {
        let a = tri().with_attrib("w", VertexAttrib::F32(vec![0.0; 3]));
        let b = tri().with_attrib("w", VertexAttrib::Vec2(vec![Vec2::ZERO; 3]));
        let err = MeshSignature::of(&a).append_mismatch(&MeshSignature::of(&b));
        assert_eq!(
            err,
            Some(MeshError::AttribKindMismatch {
                name: "w".into(),
                expected: AttribKind::F32,
                found: AttribKind::Vec2,
            })
        );
    }

    #[test]
    fn test_tex_coord_set_named() {
        let a = tri()
            .with_tex_coords(vec![Vec2::ZERO; 3])
            .with_tex_coords(vec![Vec2::ONE; 3]);
        let b = tri().with_tex_coords(vec![Vec2::ZERO; 3]);
        let err = MeshSignature::of(&a).append_mismatch(&MeshSignature::of(&b));
        assert_eq!(
            err,
            Some(MeshError::ChannelMismatch {
                channel: Channel::TexCoords(1),
                present_in_target: true,
            })
        );
        assert!(MeshSignature::of(&a).has(&Channel::TexCoords(1)));
    }
}
