//! Deferred pipeline module
//!
//! Frame protocol, configuration, full-screen quad emission, final
//! composite, and the G-buffer debug view.

mod config;
mod screen_quad;
mod compositor;
mod deferred_pipeline;
mod debug_overlay;

pub use config::{ClearConfig, DepthSharing, PipelineConfig};
pub use screen_quad::{QuadPass, ScreenQuadEmitter, QUAD_CLEAR_COLOR, QUAD_CLEAR_DEPTH};
pub use compositor::Compositor;
pub use deferred_pipeline::{
    DeferredPipeline, FrameState, FrameStats, GBUFFER_LABEL, POINT_LIGHT_MESH_LABEL, RESULT_LABEL,
};
pub use debug_overlay::{DebugOverlay, OverlayTile, Rect2D, TILE_SCALE};
