/// Compositor - final presentation of the accumulated result

use crate::error::Result;
use crate::device::{CommandList, ShaderPass};
use crate::lighting::AccumulationMaterial;
use crate::target::MultiTargetBufferSet;
use crate::pipeline::{QuadPass, ScreenQuadEmitter};

/// Draws the result buffer onto the display
///
/// The composite pass samples the result buffer plus the three G-buffer
/// channels, all of which must already be bound on the material.
#[derive(Debug, Default, Clone, Copy)]
pub struct Compositor;

impl Compositor {
    pub fn new() -> Self {
        Self
    }

    /// Return output to the display, clear it, and draw the final quad
    pub fn composite(
        &self,
        cmd: &mut dyn CommandList,
        material: &AccumulationMaterial,
        emitter: &ScreenQuadEmitter,
    ) -> Result<ShaderPass> {
        MultiTargetBufferSet::reset_active(cmd)?;
        emitter.draw_screen_quad(cmd, material, QuadPass::Composite, true, true)
    }
}
