use crate::neighbor::{squared_distance, Neighbor, NearestNeighbor, SpatialError};
use colorize_core::{Aabb, PointCloud};

/// Maximum number of points stored in a leaf bucket.
const LEAF_SIZE: usize = 16;

#[derive(Debug, Clone, Copy)]
enum Node {
    /// Points `start..end` of the tree-ordered point array.
    Leaf { start: u32, end: u32 },
    /// Points on the `left` side have `coord <= value` on `axis`, points on the
    /// `right` side have `coord >= value`.
    Split {
        axis: u8,
        value: f64,
        left: u32,
        right: u32,
    },
}

/// A balanced k-d tree over the points of a cloud, for 1-nearest-neighbor
/// queries.
///
/// Built once by recursive median split along the axis of widest spread, with
/// up to 16 points per leaf. Points are stored in tree order so each leaf scan
/// touches contiguous memory; `indices` maps them back to the source cloud.
/// The tree is immutable after [`KdTree::build`] and can be shared across
/// threads.
///
/// Non-finite points are left out of the tree.
#[derive(Debug, Clone)]
pub struct KdTree {
    nodes: Vec<Node>,
    points: Vec<[f64; 3]>,
    indices: Vec<u32>,
}

impl KdTree {
    /// Build a KdTree from a PointCloud.
    ///
    /// O(n log n). Fails only if the cloud has more points than a `u32` can
    /// index.
    pub fn build(cloud: &PointCloud) -> Result<Self, SpatialError> {
        let n = cloud.len();
        if u32::try_from(n).is_err() {
            return Err(SpatialError::TooManyPoints(n));
        }

        let mut order: Vec<u32> = (0..n)
            .filter(|&i| cloud.point(i).iter().all(|v| v.is_finite()))
            .map(|i| i as u32)
            .collect();
        if order.len() < n {
            log::debug!("kd-tree: ignoring {} non-finite points", n - order.len());
        }

        let mut nodes = Vec::with_capacity(2 * order.len() / LEAF_SIZE + 1);
        if !order.is_empty() {
            build_node(&mut nodes, cloud, &mut order, 0);
        }

        let points = order.iter().map(|&i| cloud.point(i as usize)).collect();

        Ok(Self {
            nodes,
            points,
            indices: order,
        })
    }

    /// Depth of the deepest leaf, 0 for an empty tree.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: u32) -> usize {
            match nodes[id as usize] {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    fn search(&self, id: u32, query: &[f64; 3], best: &mut (usize, f64)) {
        match self.nodes[id as usize] {
            Node::Leaf { start, end } => {
                for slot in start as usize..end as usize {
                    let d = squared_distance(&self.points[slot], query);
                    // A distance can overflow to infinity; the first point
                    // still counts.
                    if d < best.1 || best.0 == usize::MAX {
                        *best = (slot, d);
                    }
                }
            }
            Node::Split {
                axis,
                value,
                left,
                right,
            } => {
                let diff = query[axis as usize] - value;
                let (near, far) = if diff <= 0.0 {
                    (left, right)
                } else {
                    (right, left)
                };

                self.search(near, query, best);
                // Every point behind the splitting plane is at least `diff`
                // away along `axis`.
                if diff * diff < best.1 {
                    self.search(far, query, best);
                }
            }
        }
    }
}

/// Builds the subtree over `order` (which starts at `offset` in the final
/// point array) and returns its node id. Nodes are laid out in pre-order, so
/// the root is node 0.
fn build_node(nodes: &mut Vec<Node>, cloud: &PointCloud, order: &mut [u32], offset: usize) -> u32 {
    let id = nodes.len() as u32;

    if order.len() <= LEAF_SIZE {
        nodes.push(Node::Leaf {
            start: offset as u32,
            end: (offset + order.len()) as u32,
        });
        return id;
    }

    let bounds = Aabb::from_points(order.iter().map(|&i| cloud.point(i as usize)));
    let axis = bounds.longest_axis();
    let coord = |i: u32| cloud.point(i as usize)[axis];

    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| coord(a).total_cmp(&coord(b)));
    let value = coord(order[mid]);

    // Placeholder until both children have ids.
    nodes.push(Node::Leaf { start: 0, end: 0 });
    let (lo, hi) = order.split_at_mut(mid);
    let left = build_node(nodes, cloud, lo, offset);
    let right = build_node(nodes, cloud, hi, offset + mid);
    nodes[id as usize] = Node::Split {
        axis: axis as u8,
        value,
        left,
        right,
    };
    id
}

impl NearestNeighbor for KdTree {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn nearest(&self, query: &[f64; 3]) -> Option<Neighbor> {
        if self.nodes.is_empty() || !query.iter().all(|v| v.is_finite()) {
            return None;
        }

        let mut best = (usize::MAX, f64::INFINITY);
        self.search(0, query, &mut best);

        let (slot, squared_distance) = best;
        let index = *self.indices.get(slot)? as usize;
        Some(Neighbor {
            index,
            squared_distance,
        })
    }
}
