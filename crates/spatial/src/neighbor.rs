/// Result of a nearest-neighbor query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the neighbor in the cloud the index was built from.
    pub index: usize,
    pub squared_distance: f64,
}

/// A static index answering single nearest-neighbor queries.
///
/// Implementations are immutable after construction and may be queried from
/// any number of threads at once.
pub trait NearestNeighbor: Send + Sync {
    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The closest indexed point to `query`.
    ///
    /// Returns `None` when the index holds no points or the query has a
    /// non-finite coordinate. When several points are equally close, any one
    /// of them may be returned.
    fn nearest(&self, query: &[f64; 3]) -> Option<Neighbor>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SpatialError {
    #[error("cloud has {0} points, an index holds at most {max}", max = u32::MAX)]
    TooManyPoints(usize),
}

#[inline]
pub(crate) fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}
