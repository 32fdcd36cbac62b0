//! Lighting module
//!
//! Light descriptors, the shared accumulation material, the point light
//! volume mesh, and the per-light draw protocol.

mod light;
mod material;
mod volume_mesh;
mod accumulation;

pub use light::{DirectionalLight, LightDescriptor, LightSnapshot, LightSource, PointLight};
pub use material::{AccumulationMaterial, LightUniforms, MaterialParam, MaterialTexture};
pub use volume_mesh::{LightVolumeMesh, MAX_SUBDIVISIONS};
pub use accumulation::{AccumulationPassDriver, AccumulationStats};
