use crate::params::ColorizeParams;
use colorize_core::{OutputRecord, PointCloud};
use colorize_spatial::{KdTree, NearestNeighbor, SpatialError};
use rayon::prelude::*;

/// Error type for the colorization pass.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ColorizeError {
    /// The worker pool could not be started.
    #[error("failed to start {threads} worker threads")]
    ThreadPool {
        threads: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    #[error("invalid maximum squared distance {0}")]
    InvalidThreshold(f64),

    #[error("colored cloud has {0} points but no colors")]
    MissingColors(usize),

    /// The index was not built from the colored cloud it is used with.
    #[error("index holds {index} points but the colored cloud only {cloud}")]
    IndexMismatch { index: usize, cloud: usize },

    /// A query returned an index outside the colored cloud.
    #[error("neighbor index {index} out of range for colored cloud of {len} points")]
    NeighborOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

/// Match counts of a colorization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorizeSummary {
    pub matched: usize,
    /// Points whose nearest neighbor lies beyond the threshold.
    pub beyond_threshold: usize,
    /// Points for which the index had no neighbor at all.
    pub no_neighbor: usize,
}

impl ColorizeSummary {
    pub fn total(&self) -> usize {
        self.matched + self.beyond_threshold + self.no_neighbor
    }

    fn count(records: &[OutputRecord]) -> Self {
        let mut summary = Self::default();
        for r in records {
            match (r.matched, r.squared_distance) {
                (true, _) => summary.matched += 1,
                (false, Some(_)) => summary.beyond_threshold += 1,
                (false, None) => summary.no_neighbor += 1,
            }
        }
        summary
    }
}

/// Output of a completed pass: one record per target point, in target order.
#[derive(Debug, Clone, PartialEq)]
pub struct Colorized {
    pub records: Vec<OutputRecord>,
    pub summary: ColorizeSummary,
}

/// Runs the nearest-neighbor color transfer on a dedicated worker pool.
///
/// The pool size is fixed at construction from [`ColorizeParams::jobs`].
/// Every target point is handled independently; results are collected into
/// an order-indexed buffer, so the output order never depends on the number
/// of workers.
pub struct Colorizer {
    params: ColorizeParams,
    pool: rayon::ThreadPool,
}

impl Colorizer {
    pub fn new(params: ColorizeParams) -> Result<Self, ColorizeError> {
        if params.max_squared_distance.is_nan() || params.max_squared_distance < 0.0 {
            return Err(ColorizeError::InvalidThreshold(params.max_squared_distance));
        }

        let threads = params.jobs.resolve();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("colorize-{i}"))
            .build()
            .map_err(|source| ColorizeError::ThreadPool { threads, source })?;

        Ok(Self { params, pool })
    }

    pub fn params(&self) -> &ColorizeParams {
        &self.params
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Colorize every point of `target` from its nearest neighbor in
    /// `colored`, which `index` must have been built from.
    ///
    /// Either every point is processed or an error is returned; a failing
    /// worker aborts the whole pass.
    pub fn colorize<I>(
        &self,
        target: &PointCloud,
        colored: &PointCloud,
        index: &I,
    ) -> Result<Colorized, ColorizeError>
    where
        I: NearestNeighbor + ?Sized,
    {
        if !colored.is_empty() && !colored.has_colors() {
            return Err(ColorizeError::MissingColors(colored.len()));
        }
        if index.len() > colored.len() {
            return Err(ColorizeError::IndexMismatch {
                index: index.len(),
                cloud: colored.len(),
            });
        }

        log::info!(
            "colorizing {} points from {} colored points on {} threads",
            target.len(),
            colored.len(),
            self.threads()
        );

        let params = self.params;
        let records = self.pool.install(|| {
            (0..target.len())
                .into_par_iter()
                .map(|i| colorize_point(target.point(i), colored, index, &params))
                .collect::<Result<Vec<_>, _>>()
        })?;

        let summary = ColorizeSummary::count(&records);
        Ok(Colorized { records, summary })
    }
}

fn colorize_point<I>(
    point: [f64; 3],
    colored: &PointCloud,
    index: &I,
    params: &ColorizeParams,
) -> Result<OutputRecord, ColorizeError>
where
    I: NearestNeighbor + ?Sized,
{
    let Some(neighbor) = index.nearest(&point) else {
        return Ok(OutputRecord::unmatched(point, None, params.default_color));
    };

    let d = neighbor.squared_distance;
    if d > params.max_squared_distance {
        return Ok(OutputRecord::unmatched(point, Some(d), params.default_color));
    }

    let color = colored
        .color(neighbor.index)
        .ok_or(ColorizeError::NeighborOutOfRange {
            index: neighbor.index,
            len: colored.len(),
        })?;
    Ok(OutputRecord::matched(point, d, color))
}

/// Build a [`KdTree`] over `colored` and colorize `target` with it.
pub fn colorize_clouds(
    target: &PointCloud,
    colored: &PointCloud,
    params: ColorizeParams,
) -> Result<Colorized, ColorizeError> {
    let colorizer = Colorizer::new(params)?;
    let tree = KdTree::build(colored)?;
    colorizer.colorize(target, colored, &tree)
}
