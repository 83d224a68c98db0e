#![forbid(unsafe_code)]

pub mod bbox;
pub mod cloud;
pub mod color;
pub mod record;

pub use bbox::Aabb;
pub use cloud::{ColorMismatch, Colors, PointCloud};
pub use color::{ParseRgbError, Rgb};
pub use record::OutputRecord;
