/// Accumulation pass driver
///
/// Issues one additive draw per light into the active result buffer.
/// Directional lights cover the whole screen with the full-screen quad;
/// point lights draw the volume mesh around their sphere of influence.
/// Every parameter a pass reads is written to the shared material right
/// before its draw.

use std::sync::Arc;
use glam::Vec4;
use crate::error::{Error, Result};
use crate::device::{CommandList, Mesh, ShaderPass};
use crate::lighting::{
    AccumulationMaterial, DirectionalLight, MaterialParam, MaterialTexture, PointLight,
};
use crate::pipeline::{QuadPass, ScreenQuadEmitter};
use crate::target::{GBufferChannel, MultiTargetBufferSet};
use crate::{ds_error, ds_trace};

/// Draw counts of one accumulation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccumulationStats {
    pub directional_draws: u32,
    pub point_draws: u32,
    /// Absent entries and point lights without a volume
    pub skipped_lights: u32,
}

impl AccumulationStats {
    pub fn total_draws(&self) -> u32 {
        self.directional_draws + self.point_draws
    }

    /// Sum of two runs
    pub fn merge(self, other: AccumulationStats) -> AccumulationStats {
        AccumulationStats {
            directional_draws: self.directional_draws + other.directional_draws,
            point_draws: self.point_draws + other.point_draws,
            skipped_lights: self.skipped_lights + other.skipped_lights,
        }
    }
}

/// Per-light draw protocol
#[derive(Debug, Clone, Copy)]
pub struct AccumulationPassDriver {
    emitter: ScreenQuadEmitter,
}

impl AccumulationPassDriver {
    pub fn new(emitter: ScreenQuadEmitter) -> Self {
        Self { emitter }
    }

    pub fn emitter(&self) -> &ScreenQuadEmitter {
        &self.emitter
    }

    /// Bind the three G-buffer channels and the result buffer on the material
    ///
    /// # Errors
    ///
    /// `InvalidResource` if either set is missing a slot (destroyed or too small)
    pub fn bind_frame_textures(
        &self,
        material: &mut AccumulationMaterial,
        gbuffer: &MultiTargetBufferSet,
        result: &MultiTargetBufferSet,
    ) -> Result<()> {
        for channel in GBufferChannel::ALL {
            let texture = gbuffer.texture(channel.slot()).ok_or_else(|| {
                ds_error!("deferred::Accumulation",
                    "'{}' has no {} channel on slot {}", gbuffer.label(), channel.name(), channel.slot());
                Error::InvalidResource(format!(
                    "G-buffer '{}' has no slot {}", gbuffer.label(), channel.slot()
                ))
            })?;
            material.set_texture(channel.material_texture(), Arc::clone(texture));
        }

        let texture = result.texture(0).ok_or_else(|| {
            ds_error!("deferred::Accumulation", "'{}' has no slot 0", result.label());
            Error::InvalidResource(format!("result set '{}' has no slot 0", result.label()))
        })?;
        material.set_texture(MaterialTexture::ResultBuffer, Arc::clone(texture));
        Ok(())
    }

    /// One full-screen additive draw per present directional light
    pub fn accumulate_directional(
        &self,
        cmd: &mut dyn CommandList,
        material: &mut AccumulationMaterial,
        lights: &[Option<DirectionalLight>],
    ) -> Result<AccumulationStats> {
        let mut stats = AccumulationStats::default();
        for (index, entry) in lights.iter().enumerate() {
            let Some(light) = entry else {
                ds_trace!("deferred::Accumulation", "directional light {} absent, skipped", index);
                stats.skipped_lights += 1;
                continue;
            };

            material.set_param(MaterialParam::DirLightDir, light.packed_direction());
            material.set_param(MaterialParam::DirLightColor, light.color);
            self.emitter.draw_screen_quad(cmd, material, QuadPass::Lighting, false, false)?;
            stats.directional_draws += 1;
        }
        Ok(stats)
    }

    /// One volume draw per present point light
    ///
    /// # Arguments
    ///
    /// * `mesh` - Volume enclosing a sphere of diameter 1 around the origin
    pub fn accumulate_point(
        &self,
        cmd: &mut dyn CommandList,
        material: &mut AccumulationMaterial,
        mesh: &Arc<dyn Mesh>,
        lights: &[Option<PointLight>],
    ) -> Result<AccumulationStats> {
        let mut stats = AccumulationStats::default();
        for (index, entry) in lights.iter().enumerate() {
            let Some(light) = entry else {
                ds_trace!("deferred::Accumulation", "point light {} absent, skipped", index);
                stats.skipped_lights += 1;
                continue;
            };
            if !light.has_volume() {
                ds_trace!("deferred::Accumulation",
                    "point light {} has range {}, skipped", index, light.range);
                stats.skipped_lights += 1;
                continue;
            }

            let position: Vec4 = light.position.extend(0.0);
            material.set_param(MaterialParam::PointLightPos, position);
            material.set_param(MaterialParam::PointLightColor, light.color);
            material.set_param(MaterialParam::PointLightRange, light.packed_range());
            cmd.draw_mesh(material, ShaderPass::Volumetric, mesh, &light.volume_transform())?;
            stats.point_draws += 1;
        }
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "accumulation_tests.rs"]
mod tests;
