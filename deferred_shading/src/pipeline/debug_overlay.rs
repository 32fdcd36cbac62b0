/// G-buffer debug view layout
///
/// Produces one tile per G-buffer channel for an external UI to draw:
/// quarter-size rectangles stacked downward from the top-left corner.
/// Read-only: tiles hold texture handles, never the buffer sets.

use std::sync::Arc;
use winit::dpi::PhysicalSize;
use crate::device::Texture;
use crate::pipeline::DeferredPipeline;
use crate::target::GBufferChannel;

/// Fraction of the surface size covered by one tile
pub const TILE_SCALE: f32 = 0.25;

/// Screen rectangle in pixels, origin top-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect2D {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One channel to draw
#[derive(Clone)]
pub struct OverlayTile {
    pub channel: GBufferChannel,
    pub rect: Rect2D,
    pub texture: Arc<dyn Texture>,
}

pub struct DebugOverlay;

impl DebugOverlay {
    /// Tiles for the current G-buffer
    ///
    /// Empty when the overlay is disabled in the configuration or the
    /// pipeline is destroyed.
    pub fn tiles(pipeline: &DeferredPipeline, surface_size: PhysicalSize<u32>) -> Vec<OverlayTile> {
        if !pipeline.config().debug_overlay || pipeline.is_destroyed() {
            return Vec::new();
        }

        Self::layout(surface_size)
            .into_iter()
            .filter_map(|(channel, rect)| {
                pipeline.gbuffer().texture(channel.slot()).map(|texture| OverlayTile {
                    channel,
                    rect,
                    texture: Arc::clone(texture),
                })
            })
            .collect()
    }

    /// Tile rectangles in channel order, truncated to whole pixels
    pub fn layout(surface_size: PhysicalSize<u32>) -> Vec<(GBufferChannel, Rect2D)> {
        let width = (surface_size.width as f32 * TILE_SCALE).floor();
        let height = (surface_size.height as f32 * TILE_SCALE).floor();

        let mut y = 0.0;
        GBufferChannel::ALL
            .iter()
            .map(|channel| {
                let rect = Rect2D { x: 0.0, y, width, height };
                y += height;
                (*channel, rect)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "debug_overlay_tests.rs"]
mod tests;
