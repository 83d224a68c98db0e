use crate::Rgb;

/// Colorization result for one target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputRecord {
    pub point: [f64; 3],
    /// Squared distance to the nearest colored point, `None` when no colored
    /// point exists.
    pub squared_distance: Option<f64>,
    /// Whether the nearest colored point lies within the distance threshold.
    pub matched: bool,
    /// The neighbor's color when matched, the fallback color otherwise.
    pub color: Rgb,
}

impl OutputRecord {
    pub fn matched(point: [f64; 3], squared_distance: f64, color: Rgb) -> Self {
        Self {
            point,
            squared_distance: Some(squared_distance),
            matched: true,
            color,
        }
    }

    pub fn unmatched(point: [f64; 3], squared_distance: Option<f64>, fallback: Rgb) -> Self {
        Self {
            point,
            squared_distance,
            matched: false,
            color: fallback,
        }
    }
}
