//! Render target groups
//!
//! Multi-target buffer sets and the G-buffer channel layout.

mod buffer_set;
mod gbuffer;

pub use buffer_set::{BufferSetDesc, DepthSlotMask, MultiTargetBufferSet};
pub use gbuffer::GBufferChannel;
