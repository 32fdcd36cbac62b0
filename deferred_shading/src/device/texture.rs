//! Texture trait, texture descriptor, and texture info

slotmap::new_key_type! {
    /// Backend handle of a texture.
    ///
    /// Allocated by the backend from its own slot map. A destroyed and
    /// recreated texture never reuses the handle of its predecessor.
    pub struct TextureId;
}

/// Texture pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    // 8-bit normalized color formats
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,

    // Floating point color formats
    R16G16B16A16_SFLOAT,
    R32G32B32A32_SFLOAT,

    // Depth formats
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
}

impl TextureFormat {
    /// Returns true for depth (and depth/stencil) formats
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM | TextureFormat::D32_FLOAT | TextureFormat::D24_UNORM_S8_UINT
        )
    }

    /// Returns true for color formats
    pub fn is_color(&self) -> bool {
        !self.is_depth()
    }

    /// Returns true for formats whose stored values are clamped to [0, 1]
    pub fn is_normalized(&self) -> bool {
        matches!(
            self,
            TextureFormat::R8G8B8A8_UNORM
                | TextureFormat::R8G8B8A8_SRGB
                | TextureFormat::B8G8R8A8_UNORM
                | TextureFormat::B8G8R8A8_SRGB
                | TextureFormat::D16_UNORM
                | TextureFormat::D24_UNORM_S8_UINT
        )
    }

    /// Size in bytes of one pixel
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::R8G8B8A8_SRGB
            | TextureFormat::B8G8R8A8_UNORM
            | TextureFormat::B8G8R8A8_SRGB => 4,
            TextureFormat::R16G16B16A16_SFLOAT => 8,
            TextureFormat::R32G32B32A32_SFLOAT => 16,
            TextureFormat::D16_UNORM => 2,
            TextureFormat::D32_FLOAT | TextureFormat::D24_UNORM_S8_UINT => 4,
        }
    }
}

/// Sampling filter applied when a buffer is read by a later pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Nearest texel, no interpolation
    Point,
    /// Linear interpolation within the base level
    Bilinear,
    /// Linear interpolation across mip levels
    Trilinear,
}

/// Texture usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    /// Texture can be sampled in shaders
    Sampled,
    /// Texture can be used as render target
    RenderTarget,
    /// Texture can be used for both
    SampledAndRenderTarget,
    /// Texture can be used as depth/stencil attachment
    DepthStencil,
}

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Debug label (e.g. "gbuffer.1")
    pub label: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage
    pub usage: TextureUsage,
    /// Sampling filter
    pub filter: FilterMode,
}

/// Read-only properties of a created texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    pub filter: FilterMode,
}

impl From<&TextureDesc> for TextureInfo {
    fn from(desc: &TextureDesc) -> Self {
        Self {
            label: desc.label.clone(),
            width: desc.width,
            height: desc.height,
            format: desc.format,
            usage: desc.usage,
            filter: desc.filter,
        }
    }
}

/// Texture resource trait
///
/// Implemented by backend-specific texture types.
/// The GPU resource is released when the last handle is dropped.
pub trait Texture: Send + Sync {
    /// Backend handle of this texture
    fn id(&self) -> TextureId;

    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}
