#![forbid(unsafe_code)]

pub mod colorizer;
pub mod params;

pub use colorizer::{colorize_clouds, ColorizeError, ColorizeSummary, Colorized, Colorizer};
pub use params::{ColorizeParams, Jobs, ParseJobsError};
