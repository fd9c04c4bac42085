//! Per-object spatial index over triangles.
//!
//! Nodes live in a flat arena and address their children by index, so a
//! built tree is plain data: cheap to traverse and safe to share between any
//! number of concurrent queries. Construction splits the triangle set at the
//! median centroid along the longest axis.

use lume_math::{Aabb, Interval, Ray};

use crate::triangle::{Triangle, TriangleHit};

/// Maximum triangles per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

#[derive(Debug, Clone)]
enum KdNode {
    /// Internal node with two children (indices into the arena).
    Branch { bbox: Aabb, left: u32, right: u32 },
    /// Leaf referencing `count` entries of the index list starting at `start`.
    Leaf { bbox: Aabb, start: u32, count: u32 },
}

impl KdNode {
    fn bbox(&self) -> &Aabb {
        match self {
            KdNode::Branch { bbox, .. } | KdNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// Spatial index for the triangles of one object.
#[derive(Debug, Clone, Default)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    /// Triangle indices, grouped so that every leaf owns a contiguous range
    indices: Vec<u32>,
    depth: usize,
}

impl KdTree {
    /// Build the tree for `triangles`. The slice must be the same one later
    /// passed to [`KdTree::nearest`].
    pub fn new(triangles: &[Triangle]) -> Self {
        let mut tree = KdTree::default();
        if triangles.is_empty() {
            return tree;
        }

        let mut indices: Vec<u32> = (0..triangles.len() as u32).collect();
        tree.build(triangles, &mut indices, 0, 1);
        tree.indices = indices;

        log::debug!(
            "Built {} nodes with {} max depth over {} triangles",
            tree.nodes.len(),
            tree.depth,
            triangles.len()
        );
        tree
    }

    fn build(&mut self, triangles: &[Triangle], indices: &mut [u32], offset: usize, depth: usize) -> u32 {
        self.depth = self.depth.max(depth);

        let bbox = indices.iter().fold(Aabb::EMPTY, |acc, &i| {
            Aabb::surrounding(&acc, &triangles[i as usize].bounding_box())
        });

        let node = self.nodes.len() as u32;
        if indices.len() <= LEAF_MAX_SIZE {
            self.nodes.push(KdNode::Leaf {
                bbox,
                start: offset as u32,
                count: indices.len() as u32,
            });
            return node;
        }

        // Reserve the slot; children are pushed after it
        self.nodes.push(KdNode::Leaf { bbox, start: 0, count: 0 });

        let centroid_bounds = indices.iter().fold(Aabb::EMPTY, |mut acc, &i| {
            acc.extend(triangles[i as usize].centroid());
            acc
        });
        let axis = centroid_bounds.longest_axis();

        indices.sort_unstable_by(|&a, &b| {
            let a_val = triangles[a as usize].centroid()[axis];
            let b_val = triangles[b as usize].centroid()[axis];
            a_val.partial_cmp(&b_val).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = indices.len() / 2;
        let (left_indices, right_indices) = indices.split_at_mut(mid);
        let left = self.build(triangles, left_indices, offset, depth + 1);
        let right = self.build(triangles, right_indices, offset + mid, depth + 1);

        self.nodes[node as usize] = KdNode::Branch { bbox, left, right };
        node
    }

    /// Nearest triangle hit along `ray` within `ray_t`.
    ///
    /// Returns the triangle's index in the slice the tree was built from.
    /// Children are visited near-to-far and any subtree whose entry distance
    /// lies beyond the best hit so far is skipped.
    pub fn nearest(&self, triangles: &[Triangle], ray: &Ray, ray_t: Interval) -> Option<(usize, TriangleHit)> {
        let root = self.nodes.first()?;
        let entry = root.bbox().hit_range(ray, ray_t)?;

        let mut best = None;
        let mut closest = ray_t.max;
        let mut stack: Vec<(u32, f32)> = Vec::with_capacity(self.depth + 1);
        stack.push((0, entry.min));

        while let Some((index, t_enter)) = stack.pop() {
            if t_enter > closest {
                continue;
            }

            match &self.nodes[index as usize] {
                KdNode::Leaf { start, count, .. } => {
                    let range = *start as usize..(*start + *count) as usize;
                    for &tri in &self.indices[range] {
                        if let Some(hit) = triangles[tri as usize].intersect(ray, ray_t.with_max(closest)) {
                            closest = hit.t;
                            best = Some((tri as usize, hit));
                        }
                    }
                }
                KdNode::Branch { left, right, .. } => {
                    let limit = ray_t.with_max(closest);
                    let enter = |child: u32| {
                        self.nodes[child as usize]
                            .bbox()
                            .hit_range(ray, limit)
                            .map(|range| (child, range.min))
                    };

                    match (enter(*left), enter(*right)) {
                        (Some(a), Some(b)) => {
                            let (near, far) = if a.1 <= b.1 { (a, b) } else { (b, a) };
                            // Near child is popped first
                            stack.push(far);
                            stack.push(near);
                        }
                        (Some(only), None) | (None, Some(only)) => stack.push(only),
                        (None, None) => {}
                    }
                }
            }
        }

        best
    }

    /// Bounding box of everything in the tree.
    pub fn bounding_box(&self) -> Aabb {
        self.nodes.first().map(|n| *n.bbox()).unwrap_or(Aabb::EMPTY)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
