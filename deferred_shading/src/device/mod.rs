/// Graphics device module - backend abstraction used by the pipeline

// Module declarations
pub mod graphics_device;
pub mod texture;
pub mod mesh;
pub mod shader_pass;
pub mod command_list;
pub mod display;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use texture::*;
pub use mesh::*;
pub use shader_pass::*;
pub use command_list::*;
pub use display::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
