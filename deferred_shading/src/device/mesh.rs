//! Mesh trait and mesh descriptor
//!
//! Meshes are only used for light volumes: the core never draws scene
//! geometry itself.

slotmap::new_key_type! {
    /// Backend handle of a mesh
    pub struct MeshId;
}

/// Descriptor for uploading a mesh
#[derive(Debug, Clone, Copy)]
pub struct MeshDesc<'a> {
    /// Debug label
    pub label: &'a str,
    /// Object-space vertex positions
    pub positions: &'a [[f32; 3]],
    /// Triangle list indices
    pub indices: &'a [u32],
}

impl MeshDesc<'_> {
    /// Largest distance of any vertex from the object-space origin
    pub fn bounding_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| glam::Vec3::from_array(*p).length())
            .fold(0.0, f32::max)
    }
}

/// Mesh resource trait
pub trait Mesh: Send + Sync {
    /// Backend handle of this mesh
    fn id(&self) -> MeshId;

    /// Number of vertices
    fn vertex_count(&self) -> u32;

    /// Number of indices (3 per triangle)
    fn index_count(&self) -> u32;

    /// Object-space bounding radius around the origin
    fn bounding_radius(&self) -> f32;
}
