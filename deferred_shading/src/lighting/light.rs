/// Light descriptors and the per-frame light snapshot.
///
/// Lights are discovered by the host (scene graph, ECS, editor...). The
/// pipeline only consumes a snapshot of them, once per frame, and keeps
/// nothing across frames.

use glam::{Mat4, Quat, Vec3, Vec4};

/// Directional light (sun-like, no position)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Unit vector the light travels along
    pub direction: Vec3,
    /// Linear RGBA color
    pub color: Vec4,
    pub intensity: f32,
}

impl DirectionalLight {
    /// Create a directional light, normalizing `direction`
    pub fn new(direction: Vec3, color: Vec4, intensity: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            color,
            intensity,
        }
    }

    /// Unit vector pointing from the surface toward the light
    pub fn to_light(&self) -> Vec3 {
        -self.direction
    }

    /// `(to_light.xyz, intensity)`, the layout the accumulation shader reads
    pub fn packed_direction(&self) -> Vec4 {
        self.to_light().extend(self.intensity)
    }
}

/// Point light with a finite range of influence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// World-space position
    pub position: Vec3,
    /// Linear RGBA color
    pub color: Vec4,
    pub intensity: f32,
    /// Radius of influence in world units
    pub range: f32,
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec4, intensity: f32, range: f32) -> Self {
        Self { position, color, intensity, range }
    }

    /// A light with a non-positive or non-finite range covers no pixel
    pub fn has_volume(&self) -> bool {
        self.range.is_finite() && self.range > 0.0
    }

    /// `(1 / range, intensity, 0, 0)`
    pub fn packed_range(&self) -> Vec4 {
        Vec4::new(1.0 / self.range, self.intensity, 0.0, 0.0)
    }

    /// Transform of the unit-diameter volume mesh: scaled by `range * 2`
    /// and moved to the light position
    pub fn volume_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.range * 2.0),
            Quat::IDENTITY,
            self.position,
        )
    }
}

/// A light of either supported type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightDescriptor {
    Directional(DirectionalLight),
    Point(PointLight),
}

impl From<DirectionalLight> for LightDescriptor {
    fn from(light: DirectionalLight) -> Self {
        LightDescriptor::Directional(light)
    }
}

impl From<PointLight> for LightDescriptor {
    fn from(light: PointLight) -> Self {
        LightDescriptor::Point(light)
    }
}

/// Lights active for one frame, split by type.
///
/// Entries are `Option`s: a light that disappeared between enumeration
/// and rendering stays in the list as `None` and is skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightSnapshot {
    directional: Vec<Option<DirectionalLight>>,
    point: Vec<Option<PointLight>>,
}

impl LightSnapshot {
    /// Empty snapshot (no lights)
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot from two typed lists, order preserved
    pub fn from_lists(
        directional: Vec<Option<DirectionalLight>>,
        point: Vec<Option<PointLight>>,
    ) -> Self {
        Self { directional, point }
    }

    /// Snapshot from a mixed list, keeping the relative order within each type
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = LightDescriptor>,
    {
        let mut snapshot = Self::new();
        for descriptor in descriptors {
            match descriptor {
                LightDescriptor::Directional(light) => snapshot.directional.push(Some(light)),
                LightDescriptor::Point(light) => snapshot.point.push(Some(light)),
            }
        }
        snapshot
    }

    pub fn push_directional(&mut self, light: Option<DirectionalLight>) {
        self.directional.push(light);
    }

    pub fn push_point(&mut self, light: Option<PointLight>) {
        self.point.push(light);
    }

    /// Directional entries in snapshot order
    pub fn directional(&self) -> &[Option<DirectionalLight>] {
        &self.directional
    }

    /// Point entries in snapshot order
    pub fn point(&self) -> &[Option<PointLight>] {
        &self.point
    }

    /// Total number of entries, absent ones included
    pub fn len(&self) -> usize {
        self.directional.len() + self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Light enumeration collaborator
///
/// Queried exactly once per `DeferredPipeline::render_lighting()` call.
pub trait LightSource {
    /// Collect the lights active for the current frame
    fn collect_lights(&self) -> LightSnapshot;
}

impl LightSource for LightSnapshot {
    fn collect_lights(&self) -> LightSnapshot {
        self.clone()
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
