//! Indexed mesh geometry and its flattening into world-space triangles.
//!
//! Scene builders describe objects as indexed meshes in local space with a
//! model matrix. [`Mesh::to_triangles`] bakes the matrix in, producing the
//! world-space triangles the tracer works on.

use lume_math::{Mat3, Mat4, Vec2, Vec3};

use crate::triangle::Triangle;

/// A mesh consisting of vertex positions, optional normals and UVs, and
/// triangle indices.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional - see `ensure_normals`)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (optional - one per vertex)
    pub uvs: Option<Vec<Vec2>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            ..Default::default()
        }
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Faces are counter-clockwise: `(p1 - p0) x (p2 - p0)` points out.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for face in self.faces() {
            let [i0, i1, i2] = face;
            let p0 = self.positions[i0];
            let face_normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            *normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }

        self.normals = Some(normals);
    }

    /// Ensure the mesh has one normal per vertex, computing them if necessary.
    pub fn ensure_normals(&mut self) {
        let should_compute = match &self.normals {
            None => true,
            Some(normals) => normals.len() != self.positions.len(),
        };

        if should_compute {
            if let Some(normals) = &self.normals {
                log::debug!(
                    "Normals array length ({}) doesn't match vertex count ({}), computing smooth normals",
                    normals.len(),
                    self.positions.len()
                );
            }
            self.compute_normals();
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Valid index triplets; out-of-range faces are skipped with a warning.
    fn faces(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let vertex_count = self.positions.len();
        self.indices.chunks_exact(3).filter_map(move |chunk| {
            let face = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];
            if face.iter().any(|&i| i >= vertex_count) {
                log::warn!(
                    "Invalid triangle indices: {:?}, vertex count: {}",
                    face,
                    vertex_count
                );
                return None;
            }
            Some(face)
        })
    }

    /// World-space triangles for this mesh placed by `matrix`.
    ///
    /// Points are transformed with w = 1, normals with the inverse transpose
    /// of the upper 3x3. With `smooth` set, triangles interpolate the vertex
    /// normals (computed if missing).
    pub fn to_triangles(&self, matrix: Mat4, material: usize, smooth: bool) -> Vec<Triangle> {
        let world: Vec<Vec3> = self.positions.iter().map(|&p| matrix.transform_point3(p)).collect();

        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();
        let world_normals: Option<Vec<Vec3>> = if smooth {
            let mut mesh = self.clone();
            mesh.ensure_normals();
            mesh.normals
                .map(|normals| normals.iter().map(|&n| (normal_matrix * n).normalize_or_zero()).collect())
        } else {
            None
        };

        self.faces()
            .map(|[i0, i1, i2]| {
                let mut triangle = Triangle::new([world[i0], world[i1], world[i2]], material);
                if let Some(normals) = &world_normals {
                    triangle = triangle.with_normals([normals[i0], normals[i1], normals[i2]]);
                }
                if let Some(uvs) = &self.uvs {
                    if let (Some(a), Some(b), Some(c)) = (uvs.get(i0), uvs.get(i1), uvs.get(i2)) {
                        triangle = triangle.with_tex_coords([*a, *b, *c]);
                    }
                }
                triangle
            })
            .collect()
    }
}
