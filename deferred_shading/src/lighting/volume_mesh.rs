/// Point light volume mesh.
///
/// A subdivided icosahedron sized so that every face lies at least 0.5
/// units from the center. Scaled by `range * 2` it encloses the whole
/// sphere of influence of a point light: the polygonal approximation never
/// cuts off lit pixels near the boundary.

use glam::Vec3;
use rustc_hash::FxHashMap;
use crate::device::MeshDesc;

/// Subdivision levels above this produce no visible benefit for light volumes
pub const MAX_SUBDIVISIONS: u32 = 5;

/// CPU-side light volume geometry (triangle list)
#[derive(Debug, Clone)]
pub struct LightVolumeMesh {
    positions: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl LightVolumeMesh {
    /// Build an icosphere circumscribing a sphere of radius 0.5
    ///
    /// # Arguments
    ///
    /// * `subdivisions` - Number of 4-way triangle splits (clamped to `MAX_SUBDIVISIONS`)
    pub fn icosphere(subdivisions: u32) -> Self {
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let mut vertices: Vec<Vec3> = [
            [-1.0, t, 0.0], [1.0, t, 0.0], [-1.0, -t, 0.0], [1.0, -t, 0.0],
            [0.0, -1.0, t], [0.0, 1.0, t], [0.0, -1.0, -t], [0.0, 1.0, -t],
            [t, 0.0, -1.0], [t, 0.0, 1.0], [-t, 0.0, -1.0], [-t, 0.0, 1.0],
        ]
        .iter()
        .map(|p| Vec3::from_array(*p).normalize())
        .collect();

        // Counter-clockwise seen from outside
        let mut triangles: Vec<[u32; 3]> = vec![
            [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
            [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
            [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
            [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
        ];

        for _ in 0..subdivisions.min(MAX_SUBDIVISIONS) {
            let mut midpoints: FxHashMap<(u32, u32), u32> = FxHashMap::default();
            let mut next = Vec::with_capacity(triangles.len() * 4);
            for [a, b, c] in triangles {
                let ab = midpoint(&mut vertices, &mut midpoints, a, b);
                let bc = midpoint(&mut vertices, &mut midpoints, b, c);
                let ca = midpoint(&mut vertices, &mut midpoints, c, a);
                next.push([a, ab, ca]);
                next.push([b, bc, ab]);
                next.push([c, ca, bc]);
                next.push([ab, bc, ca]);
            }
            triangles = next;
        }

        // Push the faces out so the inscribed sphere has radius 0.5
        let inner = triangles
            .iter()
            .map(|tri| face_distance(&vertices, tri))
            .fold(f32::INFINITY, f32::min);
        let scale = 0.5 / inner;

        Self {
            positions: vertices.iter().map(|v| (*v * scale).to_array()).collect(),
            indices: triangles.into_iter().flatten().collect(),
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Smallest distance from the center to any face plane
    pub fn inner_radius(&self) -> f32 {
        let vertices: Vec<Vec3> = self.positions.iter().map(|p| Vec3::from_array(*p)).collect();
        self.indices
            .chunks_exact(3)
            .map(|tri| face_distance(&vertices, &[tri[0], tri[1], tri[2]]))
            .fold(f32::INFINITY, f32::min)
    }

    /// Descriptor for `GraphicsDevice::create_mesh()`
    pub fn desc<'a>(&'a self, label: &'a str) -> MeshDesc<'a> {
        MeshDesc {
            label,
            positions: &self.positions,
            indices: &self.indices,
        }
    }
}

fn midpoint(
    vertices: &mut Vec<Vec3>,
    cache: &mut FxHashMap<(u32, u32), u32>,
    a: u32,
    b: u32,
) -> u32 {
    let key = if a < b { (a, b) } else { (b, a) };
    if let Some(&index) = cache.get(&key) {
        return index;
    }
    let mid = ((vertices[a as usize] + vertices[b as usize]) * 0.5).normalize();
    let index = vertices.len() as u32;
    vertices.push(mid);
    cache.insert(key, index);
    index
}

fn face_distance(vertices: &[Vec3], tri: &[u32; 3]) -> f32 {
    let a = vertices[tri[0] as usize];
    let b = vertices[tri[1] as usize];
    let c = vertices[tri[2] as usize];
    let normal = (b - a).cross(c - a).normalize();
    normal.dot(a).abs()
}

#[cfg(test)]
#[path = "volume_mesh_tests.rs"]
mod tests;
