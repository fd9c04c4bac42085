//! Triangle primitive.
//!
//! Triangles reach the tracer already in world space. Ray intersection uses
//! the Möller-Trumbore algorithm and is two sided.

use lume_math::{barycentric, same_side, Aabb, Interval, Ray, Vec2, Vec3};

use crate::light::Photon;

/// A world-space triangle with shading data.
#[derive(Clone, Debug)]
pub struct Triangle {
    /// Scene-unique id, assigned when the owning object joins a scene.
    /// Used to recognise a shadow ray striking the triangle it was aimed at.
    pub id: usize,

    pub vertices: [Vec3; 3],
    pub normals: [Vec3; 3],
    pub tex_coords: [Vec2; 3],

    /// Index into the scene's material table
    pub material: usize,

    /// Caustic photons that landed on this triangle
    pub photons: Vec<Photon>,

    /// Interpolate vertex normals instead of using the face normal
    pub smooth: bool,
}

/// Raw result of a ray/triangle test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Distance along the ray
    pub t: f32,
    /// Weight of the second vertex
    pub u: f32,
    /// Weight of the third vertex
    pub v: f32,
}

impl TriangleHit {
    /// Barycentric weights of the three vertices; they sum to one.
    pub fn weights(&self) -> Vec3 {
        Vec3::new(1.0 - self.u - self.v, self.u, self.v)
    }
}

impl Triangle {
    /// Flat triangle; all vertex normals are the face normal.
    pub fn new(vertices: [Vec3; 3], material: usize) -> Self {
        let normal = face_normal(&vertices);
        Self {
            id: 0,
            vertices,
            normals: [normal; 3],
            tex_coords: [Vec2::ZERO; 3],
            material,
            photons: Vec::new(),
            smooth: false,
        }
    }

    /// Use per-vertex normals for smooth shading.
    pub fn with_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.normals = normals.map(|n| n.normalize_or_zero());
        self.smooth = true;
        self
    }

    pub fn with_tex_coords(mut self, tex_coords: [Vec2; 3]) -> Self {
        self.tex_coords = tex_coords;
        self
    }

    /// Möller-Trumbore ray-triangle intersection algorithm.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<TriangleHit> {
        let [v0, v1, v2] = self.vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(TriangleHit { t, u, v })
    }

    /// Unit normal following the vertex winding order.
    pub fn face_normal(&self) -> Vec3 {
        face_normal(&self.vertices)
    }

    /// Shading normal for the given barycentric weights.
    ///
    /// Smooth triangles interpolate their vertex normals, after flipping
    /// them onto the face normal's side if the first one disagrees.
    pub fn normal_at(&self, weights: Vec3) -> Vec3 {
        let face = self.face_normal();
        if !self.smooth {
            return face;
        }

        let flip = if same_side(self.normals[0], face, 0.0) { 1.0 } else { -1.0 };
        let normal = (self.normals[0] * weights.x
            + self.normals[1] * weights.y
            + self.normals[2] * weights.z)
            * flip;

        let normal = normal.normalize_or_zero();
        if normal == Vec3::ZERO {
            face
        } else {
            normal
        }
    }

    /// Interpolated texture coordinates at a point on the triangle.
    pub fn tex_coords_at(&self, point: Vec3) -> Vec2 {
        let [a, b, c] = self.vertices;
        match barycentric(a, b, c, point) {
            Some(w) => self.tex_coords[0] * w.x + self.tex_coords[1] * w.y + self.tex_coords[2] * w.z,
            None => self.tex_coords[0],
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_triangle(&self.vertices)
    }

    pub fn centroid(&self) -> Vec3 {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }

    /// `count` evenly spread points inside the triangle.
    ///
    /// Stratified over a square grid warped onto the triangle, so the result
    /// is deterministic.
    pub fn sample_points(&self, count: usize) -> Vec<Vec3> {
        if count == 0 {
            return Vec::new();
        }

        let side = (count as f32).sqrt().ceil() as usize;
        let total = side * side;
        let [v0, v1, v2] = self.vertices;

        (0..count)
            .map(|k| {
                let cell = k * total / count;
                let s = ((cell / side) as f32 + 0.5) / side as f32;
                let t = ((cell % side) as f32 + 0.5) / side as f32;
                let a = s.sqrt();
                v0 * (1.0 - a) + v1 * (a * (1.0 - t)) + v2 * (a * t)
            })
            .collect()
    }
}

fn face_normal(vertices: &[Vec3; 3]) -> Vec3 {
    let edge1 = vertices[1] - vertices[0];
    let edge2 = vertices[2] - vertices[0];
    edge1.cross(edge2).normalize_or_zero()
}
