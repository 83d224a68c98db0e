use crate::neighbor::{squared_distance, Neighbor, NearestNeighbor};
use colorize_core::PointCloud;

/// Linear-scan nearest-neighbor search.
///
/// O(n) per query. Serves as the reference the [`KdTree`](crate::KdTree) is
/// checked against; not meant for production-sized clouds.
#[derive(Debug, Clone)]
pub struct BruteForce {
    points: Vec<[f64; 3]>,
}

impl BruteForce {
    pub fn build(cloud: &PointCloud) -> Self {
        Self {
            points: cloud.iter_points().collect(),
        }
    }
}

impl NearestNeighbor for BruteForce {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn nearest(&self, query: &[f64; 3]) -> Option<Neighbor> {
        if !query.iter().all(|v| v.is_finite()) {
            return None;
        }

        let mut best: Option<Neighbor> = None;
        for (index, p) in self.points.iter().enumerate() {
            if !p.iter().all(|v| v.is_finite()) {
                continue;
            }
            let d = squared_distance(p, query);
            if best.map_or(true, |b| d < b.squared_distance) {
                best = Some(Neighbor {
                    index,
                    squared_distance: d,
                });
            }
        }
        best
    }
}
