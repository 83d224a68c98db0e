#![forbid(unsafe_code)]

pub mod colorized;
pub mod pts;

pub use colorized::{format_record, write_colorized, write_colorized_to, RecordStyle, WriteError};
pub use pts::{read_pts, read_pts_from, read_pts_into, LoadStats, PtsError, PtsLayout, LOAD_CHUNK};
