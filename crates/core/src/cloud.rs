use crate::{Aabb, Rgb};

/// An ordered point cloud stored as a struct of arrays.
///
/// A cloud either carries a color for every point (`colors` is `Some`) or for
/// none of them. Insertion order is preserved by every operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub colors: Option<Colors>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Colors {
    pub r: Vec<u8>,
    pub g: Vec<u8>,
    pub b: Vec<u8>,
}

impl Colors {
    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<Rgb> {
        Some(Rgb::new(*self.r.get(i)?, *self.g.get(i)?, *self.b.get(i)?))
    }

    fn push(&mut self, color: Rgb) {
        self.r.push(color.r);
        self.g.push(color.g);
        self.b.push(color.b);
    }
}

/// Error returned when two clouds with different color capabilities are
/// combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("color capability mismatch: destination has colors = {destination}, incoming has colors = {incoming}")]
pub struct ColorMismatch {
    pub destination: bool,
    pub incoming: bool,
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            colors: None,
        }
    }

    /// An empty cloud that carries colors.
    pub fn new_colored() -> Self {
        Self {
            colors: Some(Colors::default()),
            ..Self::new()
        }
    }

    pub fn from_xyz(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        Self {
            x,
            y,
            z,
            colors: None,
        }
    }

    pub fn from_xyz_rgb(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>, colors: Colors) -> Self {
        assert_eq!(x.len(), colors.r.len(), "x and r must have same length");
        assert_eq!(x.len(), colors.g.len(), "x and g must have same length");
        assert_eq!(x.len(), colors.b.len(), "x and b must have same length");

        Self {
            colors: Some(colors),
            ..Self::from_xyz(x, y, z)
        }
    }

    /// Build a colored cloud from `(point, color)` pairs.
    pub fn from_colored_points(points: &[([f64; 3], Rgb)]) -> Self {
        let mut cloud = Self::new_colored();
        cloud.reserve_exact(points.len());
        for &(p, c) in points {
            cloud.push_rgb(p, c);
        }
        cloud
    }

    pub fn from_points(points: &[[f64; 3]]) -> Self {
        let mut cloud = Self::new();
        cloud.reserve_exact(points.len());
        for &p in points {
            cloud.push(p);
        }
        cloud
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    pub fn point(&self, i: usize) -> [f64; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Color of point `i`, or `None` for uncolored clouds and out-of-range
    /// indices.
    pub fn color(&self, i: usize) -> Option<Rgb> {
        self.colors.as_ref()?.get(i)
    }

    pub fn iter_points(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(self.iter_points())
    }

    /// Append an uncolored point.
    ///
    /// # Panics
    ///
    /// Panics if the cloud carries colors.
    pub fn push(&mut self, point: [f64; 3]) {
        assert!(!self.has_colors(), "push on a colored cloud");
        self.push_xyz(point);
    }

    /// Append a colored point.
    ///
    /// # Panics
    ///
    /// Panics if the cloud does not carry colors.
    pub fn push_rgb(&mut self, point: [f64; 3], color: Rgb) {
        assert!(self.has_colors(), "push_rgb on an uncolored cloud");
        if let Some(colors) = self.colors.as_mut() {
            colors.push(color);
        }
        self.push_xyz(point);
    }

    fn push_xyz(&mut self, point: [f64; 3]) {
        self.x.push(point[0]);
        self.y.push(point[1]);
        self.z.push(point[2]);
    }

    /// Number of points the cloud can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.x.capacity()
    }

    /// Reserve room for at least `additional` more points. Growth is
    /// amortized, as for `Vec::reserve`.
    pub fn reserve(&mut self, additional: usize) {
        self.x.reserve(additional);
        self.y.reserve(additional);
        self.z.reserve(additional);
        if let Some(c) = self.colors.as_mut() {
            c.r.reserve(additional);
            c.g.reserve(additional);
            c.b.reserve(additional);
        }
    }

    pub fn reserve_exact(&mut self, additional: usize) {
        self.x.reserve_exact(additional);
        self.y.reserve_exact(additional);
        self.z.reserve_exact(additional);
        if let Some(c) = self.colors.as_mut() {
            c.r.reserve_exact(additional);
            c.g.reserve_exact(additional);
            c.b.reserve_exact(additional);
        }
    }

    pub fn shrink_to_fit(&mut self) {
        self.x.shrink_to_fit();
        self.y.shrink_to_fit();
        self.z.shrink_to_fit();
        if let Some(c) = self.colors.as_mut() {
            c.r.shrink_to_fit();
            c.g.shrink_to_fit();
            c.b.shrink_to_fit();
        }
    }

    /// Switch an empty cloud to the given color capability.
    ///
    /// Returns an error if the cloud already holds points of the other kind.
    pub fn set_color_capability(&mut self, has_colors: bool) -> Result<(), ColorMismatch> {
        if self.has_colors() == has_colors {
            return Ok(());
        }
        if !self.is_empty() {
            return Err(ColorMismatch {
                destination: self.has_colors(),
                incoming: has_colors,
            });
        }
        self.colors = has_colors.then(Colors::default);
        Ok(())
    }

    /// Append all points of `other`, preserving their order.
    ///
    /// An empty cloud adopts the color capability of `other`.
    pub fn extend_from_cloud(&mut self, other: &PointCloud) -> Result<(), ColorMismatch> {
        if other.is_empty() {
            return Ok(());
        }
        self.set_color_capability(other.has_colors())?;

        self.x.extend_from_slice(&other.x);
        self.y.extend_from_slice(&other.y);
        self.z.extend_from_slice(&other.z);
        if let (Some(dst), Some(src)) = (self.colors.as_mut(), other.colors.as_ref()) {
            dst.r.extend_from_slice(&src.r);
            dst.g.extend_from_slice(&src.g);
            dst.b.extend_from_slice(&src.b);
        }
        Ok(())
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}
