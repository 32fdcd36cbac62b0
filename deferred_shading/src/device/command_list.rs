/// CommandList trait - for recording deferred shading draw commands

use std::sync::Arc;
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use crate::error::Result;
use crate::device::{Texture, Mesh, ShaderPass};
use crate::lighting::AccumulationMaterial;

bitflags! {
    /// Attachments affected by a clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
    }
}

impl ClearFlags {
    /// Build flags from the two booleans used by buffer set clears
    pub fn from_bools(clear_color: bool, clear_depth: bool) -> Self {
        let mut flags = ClearFlags::empty();
        flags.set(ClearFlags::COLOR, clear_color);
        flags.set(ClearFlags::DEPTH, clear_depth);
        flags
    }
}

/// Vertex of the full-screen quad
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// Normalized device coordinates (z = 0)
    pub position: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
}

/// Full-screen quadrilateral in normalized device coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenQuad {
    pub vertices: [QuadVertex; 4],
}

impl ScreenQuad {
    /// Quad covering NDC (-1,-1)..(1,1) with UV (0,0)..(1,1).
    ///
    /// The vertex order never changes; UV flipping is a shader pass choice.
    pub const FULLSCREEN: ScreenQuad = ScreenQuad {
        vertices: [
            QuadVertex { position: [-1.0, -1.0, 0.0], uv: [0.0, 0.0] },
            QuadVertex { position: [-1.0, 1.0, 0.0], uv: [0.0, 1.0] },
            QuadVertex { position: [1.0, 1.0, 0.0], uv: [1.0, 1.0] },
            QuadVertex { position: [1.0, -1.0, 0.0], uv: [1.0, 0.0] },
        ],
    };

    /// Index list splitting the quad into two triangles (0-1-2, 0-2-3)
    pub const INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

    /// Raw vertex bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Command list for recording deferred shading commands
///
/// Submission is fire-and-forget: a backend may execute commands as they
/// are recorded or defer them until `GraphicsDevice::submit()`.
pub trait CommandList: Send + Sync {
    /// Bind color attachments (one per slot) and an optional depth
    /// attachment as the simultaneous outputs of subsequent draws
    ///
    /// # Arguments
    ///
    /// * `colors` - Color attachments, slot order
    /// * `depth` - Depth attachment shared by all slots
    fn set_render_targets(
        &mut self,
        colors: &[Arc<dyn Texture>],
        depth: Option<&Arc<dyn Texture>>,
    ) -> Result<()>;

    /// Bind the display (swapchain / back buffer) as the output
    fn set_display_target(&mut self) -> Result<()>;

    /// Clear the currently bound outputs
    fn clear(&mut self, flags: ClearFlags, color: [f32; 4], depth: f32) -> Result<()>;

    /// Draw the full-screen quad with the given accumulation pass
    fn draw_quad(
        &mut self,
        material: &AccumulationMaterial,
        pass: ShaderPass,
        quad: &ScreenQuad,
    ) -> Result<()>;

    /// Draw a light volume mesh with the given accumulation pass
    ///
    /// # Arguments
    ///
    /// * `transform` - Object to world transform of the volume
    fn draw_mesh(
        &mut self,
        material: &AccumulationMaterial,
        pass: ShaderPass,
        mesh: &Arc<dyn Mesh>,
        transform: &Mat4,
    ) -> Result<()>;
}
