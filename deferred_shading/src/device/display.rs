/// Display surface size query

use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Surface the final composite is presented on
///
/// Only its size matters to the pipeline: it is queried once per frame to
/// decide whether the buffer sets must be reallocated.
pub trait DisplaySurface {
    /// Current size in physical pixels
    fn physical_size(&self) -> PhysicalSize<u32>;
}

impl DisplaySurface for Window {
    fn physical_size(&self) -> PhysicalSize<u32> {
        self.inner_size()
    }
}

/// A bare size acts as a surface (off-screen hosts, tests)
impl DisplaySurface for PhysicalSize<u32> {
    fn physical_size(&self) -> PhysicalSize<u32> {
        *self
    }
}
