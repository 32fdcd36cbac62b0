/// Full-screen quad emission.
///
/// Render-to-texture on backends whose texture origin is the top-left
/// texel comes out vertically mirrored when sampled with the quad's
/// bottom-up UVs. The quad geometry never changes: the correction is a
/// different shader pass that inverts V. The final draw to the display
/// goes through the presentation path and is never corrected.

use crate::error::Result;
use crate::device::{ClearFlags, CommandList, DeviceCapabilities, ScreenQuad, ShaderPass};
use crate::lighting::AccumulationMaterial;
use crate::{ds_state_err, ds_trace};

/// Color written by `clear_first`
pub const QUAD_CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Depth written by `clear_first`
pub const QUAD_CLEAR_DEPTH: f32 = 1.0;

/// Base pass family of a quad draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadPass {
    /// Directional light accumulation (`ScreenNormal` / `ScreenFlipped`)
    Lighting,
    /// Result to display (`FinalComposite`)
    Composite,
}

/// Draws the full-screen quad with the pass matching the backend convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenQuadEmitter {
    origin_is_bottom_left: bool,
}

impl ScreenQuadEmitter {
    /// Resolve the texture-origin convention from backend capabilities
    pub fn new(capabilities: &DeviceCapabilities) -> Self {
        Self {
            origin_is_bottom_left: capabilities.origin_is_bottom_left,
        }
    }

    pub fn origin_is_bottom_left(&self) -> bool {
        self.origin_is_bottom_left
    }

    /// Shader pass used for a quad draw
    ///
    /// The UV-preserving pass is used when the backend origin is bottom-left
    /// or when drawing the final screen pass; otherwise the flipped variant.
    ///
    /// # Errors
    ///
    /// `InvalidState` for a composite draw that is not the final screen pass:
    /// the composite shader has no flipped variant.
    pub fn select_pass(&self, base: QuadPass, is_final_screen_pass: bool) -> Result<ShaderPass> {
        let keep_uv = self.origin_is_bottom_left || is_final_screen_pass;
        match (base, keep_uv) {
            (QuadPass::Lighting, true) => Ok(ShaderPass::ScreenNormal),
            (QuadPass::Lighting, false) => Ok(ShaderPass::ScreenFlipped),
            (QuadPass::Composite, _) if is_final_screen_pass => Ok(ShaderPass::FinalComposite),
            (QuadPass::Composite, _) => Err(ds_state_err!("deferred::ScreenQuad",
                "composite pass must be drawn as the final screen pass")),
        }
    }

    /// Draw the full-screen quad into the active target
    ///
    /// # Arguments
    ///
    /// * `base` - Pass family
    /// * `is_final_screen_pass` - True for the draw onto the display
    /// * `clear_first` - Clear color and depth of the active target to black first
    ///
    /// # Returns
    ///
    /// The shader pass actually used
    pub fn draw_screen_quad(
        &self,
        cmd: &mut dyn CommandList,
        material: &AccumulationMaterial,
        base: QuadPass,
        is_final_screen_pass: bool,
        clear_first: bool,
    ) -> Result<ShaderPass> {
        let pass = self.select_pass(base, is_final_screen_pass)?;
        if clear_first {
            cmd.clear(ClearFlags::COLOR | ClearFlags::DEPTH, QUAD_CLEAR_COLOR, QUAD_CLEAR_DEPTH)?;
        }
        cmd.draw_quad(material, pass, &ScreenQuad::FULLSCREEN)?;
        ds_trace!("deferred::ScreenQuad", "quad drawn with pass {} ({:?})", pass.index(), pass);
        Ok(pass)
    }
}

#[cfg(test)]
#[path = "screen_quad_tests.rs"]
mod tests;
