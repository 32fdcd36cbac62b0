/// G-buffer channel layout.
///
/// The geometry pass (external) and the accumulation shaders must agree on
/// this encoding exactly; a mismatch is not detectable at runtime.

use crate::lighting::MaterialTexture;

/// One color slot of the G-buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GBufferChannel {
    /// RGB = diffuse color, A = shininess
    DiffuseShininess,
    /// RGB = surface normal
    Normal,
    /// RGB = world position
    Position,
}

impl GBufferChannel {
    /// Number of G-buffer color slots
    pub const COUNT: usize = 3;

    /// All channels in slot order
    pub const ALL: [GBufferChannel; Self::COUNT] = [
        GBufferChannel::DiffuseShininess,
        GBufferChannel::Normal,
        GBufferChannel::Position,
    ];

    /// Color slot index in the G-buffer set
    pub fn slot(self) -> usize {
        match self {
            GBufferChannel::DiffuseShininess => 0,
            GBufferChannel::Normal => 1,
            GBufferChannel::Position => 2,
        }
    }

    /// Channel stored in a slot
    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::ALL.get(slot).copied()
    }

    /// Accumulation shader texture slot reading this channel
    pub fn material_texture(self) -> MaterialTexture {
        match self {
            GBufferChannel::DiffuseShininess => MaterialTexture::DiffuseBuffer,
            GBufferChannel::Normal => MaterialTexture::NormalBuffer,
            GBufferChannel::Position => MaterialTexture::PositionBuffer,
        }
    }

    /// Short name for debug output
    pub fn name(self) -> &'static str {
        match self {
            GBufferChannel::DiffuseShininess => "diffuse",
            GBufferChannel::Normal => "normal",
            GBufferChannel::Position => "position",
        }
    }
}
