/// Deferred pipeline - G-buffer lifecycle and per-frame lighting protocol
///
/// One explicit context object owned by the host. Per frame:
///
/// 1. `begin_frame()` resizes both buffer sets to the display and binds the
///    G-buffer colors with the shared depth; the host then runs its
///    geometry pass
/// 2. `render_lighting()` clears the result buffer, accumulates every
///    directional then every point light, and composites onto the display
/// 3. `end_frame()` returns to idle and reports the frame statistics
///
/// ```text
/// Idle -> GBufferBound -> ResultActive -> DirectionalAccum -> PointAccum
///      -> CompositeDrawn -> Idle
/// ```

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::device::{
    CommandList, DeviceCapabilities, DisplaySurface, GraphicsDevice, Mesh, TextureFormat,
};
use crate::lighting::{
    AccumulationMaterial, AccumulationPassDriver, LightSource, LightVolumeMesh,
};
use crate::target::{BufferSetDesc, DepthSlotMask, GBufferChannel, MultiTargetBufferSet};
use crate::pipeline::{Compositor, DepthSharing, PipelineConfig, ScreenQuadEmitter};
use crate::{ds_error, ds_info, ds_state_err, ds_trace};

/// Label prefix of the G-buffer textures
pub const GBUFFER_LABEL: &str = "gbuffer";
/// Label prefix of the result textures
pub const RESULT_LABEL: &str = "result";
/// Label of the default point light volume mesh
pub const POINT_LIGHT_MESH_LABEL: &str = "point_light_volume";

// ===== FRAME STATE =====

/// Position of the pipeline in the per-frame protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Between frames
    Idle,
    /// G-buffer bound for the host geometry pass
    GBufferBound,
    /// Result buffer active and cleared
    ResultActive,
    /// Directional lights being accumulated
    DirectionalAccum,
    /// Point lights being accumulated
    PointAccum,
    /// Display active, final composite drawn
    CompositeDrawn,
    /// Resources released; terminal
    Destroyed,
}

/// What one frame did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub directional_draws: u32,
    pub point_draws: u32,
    pub skipped_lights: u32,
    /// True when the buffer sets were reallocated at the start of the frame
    pub resized: bool,
}

// ===== PIPELINE =====

pub struct DeferredPipeline {
    config: PipelineConfig,
    capabilities: DeviceCapabilities,
    gbuffer: MultiTargetBufferSet,
    result: MultiTargetBufferSet,
    material: AccumulationMaterial,
    driver: AccumulationPassDriver,
    compositor: Compositor,
    point_light_mesh: Arc<dyn Mesh>,
    state: FrameState,
    frame_index: u64,
    current_stats: FrameStats,
    last_frame_stats: Option<FrameStats>,
}

impl DeferredPipeline {
    /// Create the pipeline at the current display size
    ///
    /// Backend capabilities are queried here once and never again.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFormat` if the backend cannot render to a configured format;
    ///   the pipeline does not start
    /// - `InitializationFailed` for a zero-area surface
    pub fn new(
        device: &mut dyn GraphicsDevice,
        surface: &dyn DisplaySurface,
        config: PipelineConfig,
    ) -> Result<Self> {
        let capabilities = device.capabilities().clone();

        for format in [config.gbuffer_format, config.result_format, config.depth_format] {
            check_format(device, &capabilities, format)?;
        }

        let size = surface.physical_size();
        if size.width == 0 || size.height == 0 {
            ds_error!("deferred::Pipeline", "display surface has zero size {}x{}", size.width, size.height);
            return Err(Error::InitializationFailed(format!(
                "deferred pipeline needs a non-empty display, got {}x{}",
                size.width, size.height
            )));
        }

        let gbuffer_depth = match config.depth_sharing {
            DepthSharing::SharedWithResult => DepthSlotMask::NONE,
            DepthSharing::Separate => DepthSlotMask::FIRST,
        };
        let gbuffer = MultiTargetBufferSet::create(
            device,
            BufferSetDesc::new(
                GBUFFER_LABEL,
                GBufferChannel::COUNT,
                size.width,
                size.height,
                config.gbuffer_format,
                config.filter,
            )
            .with_depth(gbuffer_depth, config.depth_format),
        )?;
        let result = MultiTargetBufferSet::create(
            device,
            BufferSetDesc::new(
                RESULT_LABEL,
                1,
                size.width,
                size.height,
                config.result_format,
                config.filter,
            )
            .with_depth(DepthSlotMask::FIRST, config.depth_format),
        )?;

        let volume = LightVolumeMesh::icosphere(config.point_light_mesh_subdivisions);
        let point_light_mesh = device.create_mesh(&volume.desc(POINT_LIGHT_MESH_LABEL))?;

        let emitter = ScreenQuadEmitter::new(&capabilities);

        ds_info!("deferred::Pipeline",
            "started on '{}' at {}x{} (origin {}, depth {:?})",
            capabilities.backend_name,
            size.width,
            size.height,
            if capabilities.origin_is_bottom_left { "bottom-left" } else { "top-left" },
            config.depth_sharing);

        Ok(Self {
            config,
            capabilities,
            gbuffer,
            result,
            material: AccumulationMaterial::new(),
            driver: AccumulationPassDriver::new(emitter),
            compositor: Compositor::new(),
            point_light_mesh,
            state: FrameState::Idle,
            frame_index: 0,
            current_stats: FrameStats::default(),
            last_frame_stats: None,
        })
    }

    /// Replace the point light volume
    ///
    /// The mesh must enclose a sphere of diameter 1 centered on its origin.
    pub fn set_point_light_mesh(&mut self, mesh: Arc<dyn Mesh>) -> Result<()> {
        self.ensure_alive("set_point_light_mesh")?;
        self.point_light_mesh = mesh;
        Ok(())
    }

    // ===== FRAME PROTOCOL =====

    /// Resize to the display and bind the G-buffer for the geometry pass
    ///
    /// # Errors
    ///
    /// `InvalidState` when not idle, after destroy, or for a zero-area
    /// surface; any backend allocation error from the resize. The state is
    /// unchanged on error and the next call retries the resize.
    pub fn begin_frame(
        &mut self,
        device: &mut dyn GraphicsDevice,
        surface: &dyn DisplaySurface,
        cmd: &mut dyn CommandList,
    ) -> Result<()> {
        self.expect_state(FrameState::Idle, "begin_frame")?;

        let size = surface.physical_size();
        if size.width == 0 || size.height == 0 {
            return Err(ds_state_err!("deferred::Pipeline",
                "begin_frame with zero-size display {}x{}", size.width, size.height));
        }

        // Drop references to released buffers as soon as a set is reallocated;
        // they are rebound in render_lighting
        let gbuffer_resized = self.gbuffer.resize(device, size.width, size.height)?;
        if gbuffer_resized {
            self.material.clear_textures();
        }
        let result_resized = self.result.resize(device, size.width, size.height)?;
        if result_resized {
            self.material.clear_textures();
        }

        let depth_source = match self.config.depth_sharing {
            DepthSharing::SharedWithResult => &self.result,
            DepthSharing::Separate => &self.gbuffer,
        };
        MultiTargetBufferSet::bind_as_render_targets(cmd, &self.gbuffer, depth_source, 0)?;

        self.current_stats = FrameStats {
            resized: gbuffer_resized || result_resized,
            ..FrameStats::default()
        };
        self.state = FrameState::GBufferBound;
        Ok(())
    }

    /// Accumulate every light into the result buffer and composite it
    ///
    /// `lights` is queried exactly once. On error the frame is abandoned and
    /// the pipeline returns to `Idle`.
    pub fn render_lighting(
        &mut self,
        cmd: &mut dyn CommandList,
        lights: &dyn LightSource,
    ) -> Result<()> {
        self.expect_state(FrameState::GBufferBound, "render_lighting")?;

        let outcome = self.run_lighting(cmd, lights);
        if outcome.is_err() {
            self.state = FrameState::Idle;
        }
        outcome
    }

    /// Close the frame
    pub fn end_frame(&mut self) -> Result<FrameStats> {
        self.expect_state(FrameState::CompositeDrawn, "end_frame")?;

        let stats = self.current_stats;
        ds_trace!("deferred::Pipeline",
            "frame {}: {} directional, {} point, {} skipped",
            self.frame_index, stats.directional_draws, stats.point_draws, stats.skipped_lights);

        self.last_frame_stats = Some(stats);
        self.frame_index += 1;
        self.state = FrameState::Idle;
        Ok(stats)
    }

    /// Release both buffer sets and every texture reference
    ///
    /// Idempotent. Every later frame call fails with `InvalidState`.
    pub fn destroy(&mut self) {
        if self.state == FrameState::Destroyed {
            return;
        }
        self.material.clear_textures();
        self.gbuffer.destroy();
        self.result.destroy();
        self.state = FrameState::Destroyed;
        ds_info!("deferred::Pipeline", "destroyed after {} frames", self.frame_index);
    }

    // ===== ACCESSORS =====

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == FrameState::Destroyed
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Capabilities captured at construction
    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    pub fn gbuffer(&self) -> &MultiTargetBufferSet {
        &self.gbuffer
    }

    pub fn result(&self) -> &MultiTargetBufferSet {
        &self.result
    }

    pub fn material(&self) -> &AccumulationMaterial {
        &self.material
    }

    pub fn point_light_mesh(&self) -> &Arc<dyn Mesh> {
        &self.point_light_mesh
    }

    /// Number of completed frames
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn last_frame_stats(&self) -> Option<FrameStats> {
        self.last_frame_stats
    }

    // ===== INTERNAL =====

    fn run_lighting(&mut self, cmd: &mut dyn CommandList, lights: &dyn LightSource) -> Result<()> {
        let snapshot = lights.collect_lights();

        self.result.set_active(cmd, 0)?;
        let clear = self.config.clear;
        MultiTargetBufferSet::clear_active(cmd, clear.clear_color, clear.clear_depth, clear.color, clear.depth)?;
        self.state = FrameState::ResultActive;

        self.driver.bind_frame_textures(&mut self.material, &self.gbuffer, &self.result)?;

        self.state = FrameState::DirectionalAccum;
        let directional = self.driver.accumulate_directional(
            cmd,
            &mut self.material,
            snapshot.directional(),
        )?;

        self.state = FrameState::PointAccum;
        let point = self.driver.accumulate_point(
            cmd,
            &mut self.material,
            &self.point_light_mesh,
            snapshot.point(),
        )?;

        self.compositor.composite(cmd, &self.material, self.driver.emitter())?;
        self.state = FrameState::CompositeDrawn;

        let stats = directional.merge(point);
        self.current_stats.directional_draws = stats.directional_draws;
        self.current_stats.point_draws = stats.point_draws;
        self.current_stats.skipped_lights = stats.skipped_lights;
        Ok(())
    }

    fn ensure_alive(&self, operation: &str) -> Result<()> {
        if self.state == FrameState::Destroyed {
            return Err(ds_state_err!("deferred::Pipeline", "{} called after destroy", operation));
        }
        Ok(())
    }

    fn expect_state(&self, expected: FrameState, operation: &str) -> Result<()> {
        self.ensure_alive(operation)?;
        if self.state != expected {
            return Err(ds_state_err!("deferred::Pipeline",
                "{} requires state {:?}, pipeline is in {:?}", operation, expected, self.state));
        }
        Ok(())
    }
}

fn check_format(
    device: &dyn GraphicsDevice,
    capabilities: &DeviceCapabilities,
    format: TextureFormat,
) -> Result<()> {
    if device.supports_format(format) {
        return Ok(());
    }
    ds_error!("deferred::Pipeline",
        "backend '{}' cannot render to {:?}, pipeline not started", capabilities.backend_name, format);
    Err(Error::UnsupportedFormat(format))
}

#[cfg(test)]
#[path = "deferred_pipeline_tests.rs"]
mod tests;
