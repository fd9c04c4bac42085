//! Scene objects: a named set of world-space triangles plus their index.

use lume_math::{Aabb, Interval, Ray};

use crate::kdtree::KdTree;
use crate::triangle::{Triangle, TriangleHit};

/// A flattened object, ready for intersection queries.
#[derive(Debug, Clone)]
pub struct Object {
    pub name: String,
    pub triangles: Vec<Triangle>,
    tree: KdTree,
}

impl Object {
    /// Create an object and build its spatial index.
    pub fn new(name: impl Into<String>, triangles: Vec<Triangle>) -> Self {
        let name = name.into();
        log::debug!("Build KDTree for object {} ({} triangles)", name, triangles.len());
        let tree = KdTree::new(&triangles);
        Self { name, triangles, tree }
    }

    /// Nearest triangle along the ray: `(index into triangles, hit)`.
    pub fn nearest(&self, ray: &Ray, ray_t: Interval) -> Option<(usize, TriangleHit)> {
        self.tree.nearest(&self.triangles, ray, ray_t)
    }

    pub fn bounding_box(&self) -> Aabb {
        self.tree.bounding_box()
    }
}
