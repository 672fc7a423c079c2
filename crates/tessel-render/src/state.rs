//! Fixed-function render state carried by every [`Object`](crate::Object).
//!
//! Objects only share a batch when their states compare equal.

use bitflags::bitflags;

use crate::color::Color;

bitflags! {
    /// Color channels written to the framebuffer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorMask: u8 {
        const RED = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE = 1 << 2;
        const ALPHA = 1 << 3;
        const ALL = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits() | Self::ALPHA.bits();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AlphaMode {
    #[default]
    NoAlpha,
    AlphaBlend,
    BinaryAlpha,
    AlphaToCoverage,
}

/// Comparison used by depth and stencil tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Cmp {
    Always,
    Never,
    #[default]
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FaceCulling {
    #[default]
    Back,
    Front,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    SrcAlphaSaturated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlendOp {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendState {
    /// Constant blend color.
    pub color: Color,
    pub src_rgb: BlendFactor,
    pub dst_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
    pub rgb_op: BlendOp,
    pub alpha_op: BlendOp,
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            color: Color::TRANSPARENT,
            src_rgb: BlendFactor::SrcAlpha,
            dst_rgb: BlendFactor::OneMinusSrcAlpha,
            src_alpha: BlendFactor::SrcAlpha,
            dst_alpha: BlendFactor::OneMinusSrcAlpha,
            rgb_op: BlendOp::Add,
            alpha_op: BlendOp::Add,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StencilOp {
    #[default]
    Keep,
    Zero,
    Replace,
    Incr,
    IncrWrap,
    Decr,
    DecrWrap,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilState {
    pub write_mask: u32,
    pub read_mask: u32,
    pub reference: u32,
    pub fail: StencilOp,
    pub depth_fail: StencilOp,
    pub depth_pass: StencilOp,
    pub cmp: Cmp,
}

impl Default for StencilState {
    fn default() -> Self {
        Self {
            write_mask: 0xFFFF,
            read_mask: 0xFFFF,
            reference: 0,
            fail: StencilOp::Keep,
            depth_fail: StencilOp::Keep,
            depth_pass: StencilOp::Keep,
            cmp: Cmp::Always,
        }
    }
}

/// Render state of one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub alpha_mode: AlphaMode,
    pub blend: BlendState,
    pub write_mask: ColorMask,
    pub dithering: bool,
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_cmp: Cmp,
    pub stencil_test: bool,
    pub face_culling: FaceCulling,
    pub stencil_front: StencilState,
    pub stencil_back: StencilState,
}

impl Default for State {
    fn default() -> Self {
        Self {
            alpha_mode: AlphaMode::NoAlpha,
            blend: BlendState::default(),
            write_mask: ColorMask::ALL,
            dithering: true,
            depth_test: true,
            depth_write: true,
            depth_cmp: Cmp::Less,
            stencil_test: false,
            face_culling: FaceCulling::Back,
            stencil_front: StencilState::default(),
            stencil_back: StencilState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_field_breaks_equality() {
        let base = State::default();
        assert_eq!(base, State::default());

        let dithered = State {
            dithering: false,
            ..base
        };
        assert_ne!(base, dithered);

        let masked = State {
            write_mask: ColorMask::ALL - ColorMask::ALPHA,
            ..base
        };
        assert_ne!(base, masked);
    }
}
