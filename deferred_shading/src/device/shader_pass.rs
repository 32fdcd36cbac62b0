//! Shader pass selector handed to the backend with every draw.
//!
//! The accumulation shader exposes four passes. Their numeric indices are
//! part of the shader contract:
//!
//! | index | pass             | geometry          | blending |
//! |-------|------------------|-------------------|----------|
//! | 0     | `ScreenNormal`   | full-screen quad  | additive |
//! | 1     | `ScreenFlipped`  | full-screen quad  | additive |
//! | 2     | `Volumetric`     | light volume mesh | additive |
//! | 3     | `FinalComposite` | full-screen quad  | replace  |

/// Accumulation shader pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderPass {
    /// Full-screen directional lighting, UVs used as emitted
    ScreenNormal,
    /// Full-screen directional lighting, V coordinate inverted in the shader
    ScreenFlipped,
    /// Point light volume, clip-space position from the mesh
    Volumetric,
    /// Result buffer to display
    FinalComposite,
}

/// Color blending applied by a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// dst = dst + src
    Additive,
    /// dst = src
    Replace,
}

impl ShaderPass {
    /// Numeric pass index in the accumulation shader
    pub fn index(self) -> u32 {
        match self {
            ShaderPass::ScreenNormal => 0,
            ShaderPass::ScreenFlipped => 1,
            ShaderPass::Volumetric => 2,
            ShaderPass::FinalComposite => 3,
        }
    }

    /// Pass for a numeric shader index
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(ShaderPass::ScreenNormal),
            1 => Some(ShaderPass::ScreenFlipped),
            2 => Some(ShaderPass::Volumetric),
            3 => Some(ShaderPass::FinalComposite),
            _ => None,
        }
    }

    /// True when the pass inverts the V texture coordinate
    pub fn is_flipped(self) -> bool {
        self == ShaderPass::ScreenFlipped
    }

    /// True when the pass is drawn with the full-screen quad
    pub fn is_screen_space(self) -> bool {
        self != ShaderPass::Volumetric
    }

    /// Blending the backend must configure for this pass
    pub fn blend_mode(self) -> BlendMode {
        match self {
            ShaderPass::FinalComposite => BlendMode::Replace,
            _ => BlendMode::Additive,
        }
    }
}
