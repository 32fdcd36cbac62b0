/// GraphicsDevice trait - backend factory and capability queries

use std::sync::Arc;
use crate::error::Result;
use crate::device::{
    CommandList, Mesh, MeshDesc, Texture, TextureDesc, TextureFormat,
};

/// Capabilities of the active backend, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Human readable backend name ("vulkan", "opengl", ...)
    pub backend_name: String,
    /// True when texture coordinate (0,0) is the bottom-left texel
    /// (OpenGL-like backends)
    pub origin_is_bottom_left: bool,
    /// Maximum number of simultaneously bound color attachments
    pub max_color_attachments: u32,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            backend_name: "unknown".to_string(),
            origin_is_bottom_left: false,
            max_color_attachments: 8,
        }
    }
}

/// Graphics backend trait
///
/// Central factory interface of a rendering backend. Implemented by
/// backend-specific devices; the deferred pipeline only talks to the GPU
/// through this trait and `CommandList`.
pub trait GraphicsDevice: Send + Sync {
    /// Backend capabilities
    fn capabilities(&self) -> &DeviceCapabilities;

    /// Whether textures of this format can be created and rendered to
    fn supports_format(&self, format: TextureFormat) -> bool;

    /// Create a texture
    ///
    /// # Returns
    ///
    /// A shared pointer to the created texture
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Upload a mesh
    fn create_mesh(&mut self, desc: &MeshDesc) -> Result<Arc<dyn Mesh>>;

    /// Create a command list for recording draws
    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Submit recorded command lists
    fn submit(&self, commands: &[&dyn CommandList]) -> Result<()>;
}
