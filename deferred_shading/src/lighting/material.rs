/// Shared accumulation material.
///
/// One parameter bundle is reused for every light and for the final
/// composite. Values are overwritten in place and never reset between
/// draws: a pass sees whatever was last written, so every parameter a pass
/// reads must be set before its draw.
///
/// Layout:
/// - Texture slots: the three G-buffer channels and the result buffer
/// - Parameters: 4-component values, one per light uniform

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use rustc_hash::FxHashMap;
use crate::device::Texture;

// ===== SLOT / PARAMETER NAMES =====

/// Texture slots of the accumulation shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialTexture {
    DiffuseBuffer,
    NormalBuffer,
    PositionBuffer,
    ResultBuffer,
}

impl MaterialTexture {
    pub const ALL: [MaterialTexture; 4] = [
        MaterialTexture::DiffuseBuffer,
        MaterialTexture::NormalBuffer,
        MaterialTexture::PositionBuffer,
        MaterialTexture::ResultBuffer,
    ];

    /// Binding name in the accumulation shader
    pub fn binding_name(self) -> &'static str {
        match self {
            MaterialTexture::DiffuseBuffer => "diffuse_buffer",
            MaterialTexture::NormalBuffer => "normal_buffer",
            MaterialTexture::PositionBuffer => "position_buffer",
            MaterialTexture::ResultBuffer => "result_buffer",
        }
    }
}

/// Uniform parameters of the accumulation shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialParam {
    /// xyz = direction toward the light, w = intensity
    DirLightDir,
    /// rgba
    DirLightColor,
    /// xyz = world position, w = 0
    PointLightPos,
    /// rgba
    PointLightColor,
    /// x = 1 / range, y = intensity
    PointLightRange,
}

impl MaterialParam {
    /// Binding name in the accumulation shader
    pub fn binding_name(self) -> &'static str {
        match self {
            MaterialParam::DirLightDir => "dir_light_dir",
            MaterialParam::DirLightColor => "dir_light_color",
            MaterialParam::PointLightPos => "point_light_pos",
            MaterialParam::PointLightColor => "point_light_color",
            MaterialParam::PointLightRange => "point_light_range",
        }
    }
}

// ===== UNIFORM BLOCK =====

/// GPU layout of the light parameters (std140 compatible, 80 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct LightUniforms {
    pub dir_light_dir: [f32; 4],
    pub dir_light_color: [f32; 4],
    pub point_light_pos: [f32; 4],
    pub point_light_color: [f32; 4],
    pub point_light_range: [f32; 4],
}

impl LightUniforms {
    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

// ===== MATERIAL =====

/// Parameter bundle shared by all accumulation and composite draws
#[derive(Default)]
pub struct AccumulationMaterial {
    textures: FxHashMap<MaterialTexture, Arc<dyn Texture>>,
    params: FxHashMap<MaterialParam, Vec4>,
}

impl AccumulationMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== TEXTURES =====

    /// Bind a texture to a slot, replacing the previous one
    pub fn set_texture(&mut self, slot: MaterialTexture, texture: Arc<dyn Texture>) {
        self.textures.insert(slot, texture);
    }

    /// Texture currently bound to a slot
    pub fn texture(&self, slot: MaterialTexture) -> Option<&Arc<dyn Texture>> {
        self.textures.get(&slot)
    }

    /// Number of bound texture slots
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Drop every texture reference (teardown)
    pub fn clear_textures(&mut self) {
        self.textures.clear();
    }

    // ===== PARAMETERS =====

    /// Set a parameter value, replacing the previous one
    pub fn set_param(&mut self, param: MaterialParam, value: Vec4) {
        self.params.insert(param, value);
    }

    /// Last value written to a parameter
    pub fn param(&self, param: MaterialParam) -> Option<Vec4> {
        self.params.get(&param).copied()
    }

    /// Number of parameters written so far
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Current parameters packed for upload; unset parameters are zero
    pub fn uniforms(&self) -> LightUniforms {
        let get = |param| self.param(param).unwrap_or(Vec4::ZERO).to_array();
        LightUniforms {
            dir_light_dir: get(MaterialParam::DirLightDir),
            dir_light_color: get(MaterialParam::DirLightColor),
            point_light_pos: get(MaterialParam::PointLightPos),
            point_light_color: get(MaterialParam::PointLightColor),
            point_light_range: get(MaterialParam::PointLightRange),
        }
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
