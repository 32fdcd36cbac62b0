/// Pipeline configuration
///
/// Fixed at construction. The only runtime change a pipeline goes through
/// is the per-frame resize of its buffer sets.

use crate::device::{FilterMode, TextureFormat};

/// Which depth buffer the geometry pass renders against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthSharing {
    /// The G-buffer owns no depth and uses the result set's slot 0 depth
    SharedWithResult,
    /// The G-buffer owns its own depth on slot 0
    Separate,
}

/// Clear applied to the result buffer before light accumulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearConfig {
    pub color: [f32; 4],
    pub depth: f32,
    pub clear_color: bool,
    pub clear_depth: bool,
}

impl Default for ClearConfig {
    fn default() -> Self {
        Self {
            color: [0.0, 0.0, 0.0, 1.0],
            depth: 1.0,
            clear_color: true,
            clear_depth: true,
        }
    }
}

/// Deferred pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Format of the three G-buffer channels
    pub gbuffer_format: TextureFormat,
    /// Format of the light accumulation buffer
    pub result_format: TextureFormat,
    /// Format of every owned depth buffer
    pub depth_format: TextureFormat,
    /// Sampling filter of all buffers
    pub filter: FilterMode,
    pub depth_sharing: DepthSharing,
    pub clear: ClearConfig,
    /// Expose G-buffer tiles through `DebugOverlay`
    pub debug_overlay: bool,
    /// Subdivision level of the default point light volume
    pub point_light_mesh_subdivisions: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gbuffer_format: TextureFormat::R16G16B16A16_SFLOAT,
            result_format: TextureFormat::R8G8B8A8_UNORM,
            depth_format: TextureFormat::D24_UNORM_S8_UINT,
            filter: FilterMode::Point,
            depth_sharing: DepthSharing::SharedWithResult,
            clear: ClearConfig::default(),
            debug_overlay: false,
            point_light_mesh_subdivisions: 1,
        }
    }
}

impl PipelineConfig {
    pub fn with_debug_overlay(mut self, enabled: bool) -> Self {
        self.debug_overlay = enabled;
        self
    }

    pub fn with_depth_sharing(mut self, depth_sharing: DepthSharing) -> Self {
        self.depth_sharing = depth_sharing;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
