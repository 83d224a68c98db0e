use colorize_core::Rgb;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

/// Number of worker threads used for the colorization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jobs {
    /// One worker per available processing unit.
    #[default]
    Auto,
    Fixed(NonZeroUsize),
}

impl Jobs {
    /// The concrete worker count. `Auto` falls back to a single worker when
    /// the platform cannot report its parallelism.
    pub fn resolve(self) -> usize {
        match self {
            Jobs::Auto => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            Jobs::Fixed(n) => n.get(),
        }
    }
}

impl fmt::Display for Jobs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Jobs::Auto => f.write_str("auto"),
            Jobs::Fixed(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid job count {0:?}: expected a non-negative integer or \"auto\"")]
pub struct ParseJobsError(String);

/// Parses `auto` (any case) or an integer; `0` also means `auto`.
impl FromStr for Jobs {
    type Err = ParseJobsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Jobs::Auto);
        }
        let n: usize = s.parse().map_err(|_| ParseJobsError(s.to_string()))?;
        Ok(NonZeroUsize::new(n).map_or(Jobs::Auto, Jobs::Fixed))
    }
}

/// Settings of a colorization run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorizeParams {
    /// Neighbors farther than this (squared) distance do not match. The
    /// boundary itself matches.
    pub max_squared_distance: f64,
    /// Color given to target points without a match.
    pub default_color: Rgb,
    pub jobs: Jobs,
}

impl Default for ColorizeParams {
    fn default() -> Self {
        Self {
            max_squared_distance: f64::INFINITY,
            default_color: Rgb::BLACK,
            jobs: Jobs::Auto,
        }
    }
}

impl ColorizeParams {
    /// Set the threshold from a plain (not squared) distance.
    pub fn with_max_distance(mut self, distance: f64) -> Self {
        self.max_squared_distance = distance * distance;
        self
    }

    pub fn with_max_squared_distance(mut self, squared: f64) -> Self {
        self.max_squared_distance = squared;
        self
    }

    pub fn with_default_color(mut self, color: Rgb) -> Self {
        self.default_color = color;
        self
    }

    pub fn with_jobs(mut self, jobs: Jobs) -> Self {
        self.jobs = jobs;
        self
    }
}
