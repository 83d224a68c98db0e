use colorize_core::{ColorMismatch, PointCloud, Rgb};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Minimum number of points the destination cloud grows by whenever it fills
/// up. Larger clouds at least double.
pub const LOAD_CHUNK: usize = 100_000;

/// Error types for the `.pts` reader.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PtsError {
    /// The source could not be opened.
    #[error("could not open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from an open source failed.
    #[error("failed to read point records")]
    Io(#[from] io::Error),

    /// A source's color layout differs from the cloud it is appended to.
    #[error("{}: {source}", path.display())]
    ColorLayoutMismatch {
        path: PathBuf,
        #[source]
        source: ColorMismatch,
    },
}

/// Column layout of a `.pts` source, inferred from its first record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtsLayout {
    pub has_color: bool,
    /// Unused columns between the coordinates and the (optional) color.
    pub dummy_count: usize,
}

impl PtsLayout {
    /// Infer the layout from the number of whitespace separated tokens in the
    /// first record.
    pub fn infer(token_count: usize) -> Option<Self> {
        if token_count < 3 {
            return None;
        }
        let has_color = token_count >= 6;
        let dummy_count = token_count - if has_color { 6 } else { 3 };
        Some(Self {
            has_color,
            dummy_count,
        })
    }

    /// Number of tokens a well-formed record must carry.
    pub fn width(&self) -> usize {
        3 + self.dummy_count + if self.has_color { 3 } else { 0 }
    }

    /// Parse one record. Returns `None` for short or malformed records.
    pub fn parse_record(&self, line: &str) -> Option<([f64; 3], Option<Rgb>)> {
        let mut tokens = line.split_ascii_whitespace();

        let mut xyz = [0.0f64; 3];
        for v in &mut xyz {
            *v = tokens.next()?.parse().ok()?;
            if !v.is_finite() {
                return None;
            }
        }

        if self.dummy_count > 0 {
            tokens.nth(self.dummy_count - 1)?;
        }

        if !self.has_color {
            return Some((xyz, None));
        }

        let mut rgb = [0u8; 3];
        for c in &mut rgb {
            *c = tokens.next()?.parse().ok()?;
        }
        Some((xyz, Some(Rgb::from(rgb))))
    }
}

/// Outcome of loading one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadStats {
    /// `None` when the source held no records at all.
    pub layout: Option<PtsLayout>,
    pub loaded: usize,
    /// Blank lines are not counted.
    pub skipped: usize,
    /// Times the destination cloud had to grow while loading.
    pub grow_steps: usize,
}

/// Reads a `.pts` file into a new cloud.
pub fn read_pts(path: impl AsRef<Path>) -> Result<PointCloud, PtsError> {
    let mut cloud = PointCloud::new();
    read_pts_into(path, &mut cloud)?;
    Ok(cloud)
}

/// Appends the records of a `.pts` file to `cloud`.
///
/// Several sources can be loaded into the same cloud; each keeps its own
/// record order. An empty cloud adopts the color layout of the first source
/// that has records, later sources must match it.
pub fn read_pts_into(path: impl AsRef<Path>, cloud: &mut PointCloud) -> Result<LoadStats, PtsError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PtsError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let stats = read_records(BufReader::new(file), cloud, path)?;

    log::info!(
        "{}: {} points loaded ({})",
        path.display(),
        stats.loaded,
        match stats.layout {
            Some(PtsLayout { has_color: true, .. }) => "with color",
            Some(PtsLayout { has_color: false, .. }) => "without color",
            None => "empty",
        }
    );
    if stats.skipped > 0 {
        log::warn!(
            "{}: skipped {} malformed records",
            path.display(),
            stats.skipped
        );
    }
    Ok(stats)
}

/// Appends the records read from `reader` to `cloud`.
///
/// The layout is fixed by the first record with at least three columns;
/// shorter leading lines, such as a point count, are skipped. Records that are too
/// short, hold non-numeric or non-finite coordinates, or carry a color
/// channel outside `0..=255` are skipped.
pub fn read_pts_from<R: BufRead>(reader: R, cloud: &mut PointCloud) -> Result<LoadStats, PtsError> {
    read_records(reader, cloud, Path::new("<reader>"))
}

fn read_records<R: BufRead>(
    mut reader: R,
    cloud: &mut PointCloud,
    origin: &Path,
) -> Result<LoadStats, PtsError> {
    let mut stats = LoadStats::default();
    // Raw bytes so that a corrupt line is skipped instead of failing the load.
    let mut buf = Vec::new();

    let layout = loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(stats);
        }
        let tokens = String::from_utf8_lossy(&buf).split_ascii_whitespace().count();
        if tokens == 0 {
            continue;
        }
        match PtsLayout::infer(tokens) {
            Some(layout) => break layout,
            None => stats.skipped += 1,
        }
    };
    stats.layout = Some(layout);

    cloud
        .set_color_capability(layout.has_color)
        .map_err(|source| PtsError::ColorLayoutMismatch {
            path: origin.to_path_buf(),
            source,
        })?;

    loop {
        let line = String::from_utf8_lossy(&buf);
        if !line.trim().is_empty() {
            match layout.parse_record(&line) {
                Some((xyz, color)) => {
                    if cloud.len() == cloud.capacity() {
                        if cloud.len() > 0 {
                            log::debug!("{} records read", stats.loaded);
                        }
                        cloud.reserve(LOAD_CHUNK);
                        stats.grow_steps += 1;
                    }
                    match color {
                        Some(c) => cloud.push_rgb(xyz, c),
                        None => cloud.push(xyz),
                    }
                    stats.loaded += 1;
                }
                None => stats.skipped += 1,
            }
        }

        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
    }

    cloud.shrink_to_fit();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn load(text: &str) -> (PointCloud, LoadStats) {
        let mut cloud = PointCloud::new();
        let stats = read_pts_from(Cursor::new(text), &mut cloud).unwrap();
        (cloud, stats)
    }

    #[test]
    fn three_columns_have_no_color() {
        let (cloud, stats) = load("1 2 3\n4 5 6\n");
        assert_eq!(cloud.len(), 2);
        assert!(!cloud.has_colors());
        assert_eq!(cloud.point(1), [4.0, 5.0, 6.0]);
        assert_eq!(
            stats.layout,
            Some(PtsLayout {
                has_color: false,
                dummy_count: 0
            })
        );
    }

    #[test]
    fn six_columns_carry_color() {
        let (cloud, _) = load("0 0 0.5 10 20 30\n1.5 -2 3e2 255 0 1\n");
        assert!(cloud.has_colors());
        assert_eq!(cloud.point(0), [0.0, 0.0, 0.5]);
        assert_eq!(cloud.color(0), Some(Rgb::new(10, 20, 30)));
        assert_eq!(cloud.point(1), [1.5, -2.0, 300.0]);
        assert_eq!(cloud.color(1), Some(Rgb::new(255, 0, 1)));
    }

    #[test]
    fn dummy_columns_are_skipped() {
        // x y z remission amplitude r g b
        let (cloud, stats) = load("1 2 3 0.7 99 10 20 30\n4 5 6 0.1 98 40 50 60\n");
        assert_eq!(stats.layout.unwrap().dummy_count, 2);
        assert_eq!(cloud.point(1), [4.0, 5.0, 6.0]);
        assert_eq!(cloud.color(1), Some(Rgb::new(40, 50, 60)));

        let (plain, stats) = load("1 2 3 0.7\n4 5 6 0.2\n");
        assert_eq!(
            stats.layout,
            Some(PtsLayout {
                has_color: false,
                dummy_count: 1
            })
        );
        assert_eq!(plain.x, vec![1.0, 4.0]);
    }

    #[test]
    fn dummy_columns_are_not_parsed() {
        let (cloud, stats) = load("1 2 3 n/a 10 20 30\n4 5 6 - 40 50 60\n");
        assert_eq!(stats.skipped, 0);
        assert_eq!(cloud.len(), 2);
    }

    #[test]
    fn malformed_and_truncated_records_are_skipped() {
        let text = "1 2 3 10 20 30\n\
                    4 5\n\
                    x 5 6 10 20 30\n\
                    7 8 9 10 20 300\n\
                    nan 8 9 10 20 30\n\
                    \n\
                    10 11 12 1 2 3\n\
                    13 14";
        let (cloud, stats) = load(text);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.x, vec![1.0, 10.0]);
        assert_eq!(stats.loaded, 2);
        assert_eq!(stats.skipped, 5);
    }

    #[test]
    fn tabs_crlf_and_leading_blank_lines() {
        let (cloud, stats) = load("\n\r\n1\t2\t3\t4\t5\t6\r\n7 8  9 10 11 12\r\n");
        assert_eq!(stats.skipped, 0);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.color(1), Some(Rgb::new(10, 11, 12)));
    }

    #[test]
    fn invalid_utf8_record_is_skipped() {
        let mut bytes = b"1 2 3\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b' ', b'1', b' ', b'2', b'\n']);
        bytes.extend_from_slice(b"4 5 6\n");
        let mut cloud = PointCloud::new();
        let stats = read_pts_from(Cursor::new(bytes), &mut cloud).unwrap();
        assert_eq!(stats.loaded, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(cloud.x, vec![1.0, 4.0]);
    }

    #[test]
    fn extra_trailing_tokens_are_ignored() {
        let (cloud, stats) = load("1 2 3\n4 5 6 7 8\n");
        assert_eq!(stats.skipped, 0);
        assert_eq!(cloud.point(1), [4.0, 5.0, 6.0]);
    }

    #[test]
    fn empty_source_leaves_cloud_untouched() {
        let (cloud, stats) = load("");
        assert!(cloud.is_empty());
        assert_eq!(stats, LoadStats::default());

        let (cloud, stats) = load("\n  \n");
        assert!(cloud.is_empty());
        assert!(stats.layout.is_none());
    }

    #[test]
    fn leading_point_count_is_skipped() {
        let (cloud, stats) = load("12345\n1 2 3 4 5 6\n");
        assert_eq!(cloud.len(), 1);
        assert!(cloud.has_colors());
        assert_eq!(cloud.color(0), Some(Rgb::new(4, 5, 6)));
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.layout.unwrap().dummy_count, 0);
    }

    #[test]
    fn only_short_records_leave_layout_unset() {
        let (cloud, stats) = load("7\n1 2\n");
        assert!(cloud.is_empty());
        assert!(stats.layout.is_none());
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn grows_in_chunks_and_shrinks_to_fit() {
        let n = LOAD_CHUNK + 17;
        let mut text = String::with_capacity(n * 16);
        for i in 0..n {
            text.push_str(&format!("{} 0 0 1 2 3\n", i));
        }
        let (cloud, stats) = load(&text);
        assert_eq!(stats.loaded, n);
        assert_eq!(cloud.len(), n);
        assert!(cloud.capacity() < 2 * LOAD_CHUNK);
        assert_eq!(cloud.x[n - 1], (n - 1) as f64);
    }

    #[test]
    fn growth_steps_are_logarithmic() {
        // Fixed-size steps would need nine reallocations here.
        let n = 8 * LOAD_CHUNK + 1;
        let mut text = String::with_capacity(n * 8);
        for i in 0..n {
            text.push_str(&format!("{} 0 0\n", i % 1000));
        }
        let (cloud, stats) = load(&text);
        assert_eq!(stats.loaded, n);
        assert_eq!(stats.grow_steps, 5);
        assert!(cloud.capacity() < n + LOAD_CHUNK);
    }

    #[test]
    fn appending_sources_concatenates() {
        let mut cloud = PointCloud::new();
        read_pts_from(Cursor::new("0 0 0 1 1 1\n1 0 0 2 2 2\n"), &mut cloud).unwrap();
        read_pts_from(Cursor::new("5 5 5 0.3 9 9 9\n"), &mut cloud).unwrap();
        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud.x, vec![0.0, 1.0, 5.0]);
        assert_eq!(cloud.color(2), Some(Rgb::new(9, 9, 9)));
    }

    #[test]
    fn appending_mismatched_layout_is_an_error() {
        let mut cloud = PointCloud::new();
        read_pts_from(Cursor::new("0 0 0 1 1 1\n"), &mut cloud).unwrap();
        let err = read_pts_from(Cursor::new("1 2 3\n"), &mut cloud).unwrap_err();
        assert!(matches!(err, PtsError::ColorLayoutMismatch { .. }));
        assert_eq!(cloud.len(), 1);
    }

    #[test]
    fn read_from_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "1 2 3 4 5 6").unwrap();
        writeln!(tmp, "7 8 9 10 11 12").unwrap();
        tmp.flush().unwrap();

        let cloud = read_pts(tmp.path()).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.color(0), Some(Rgb::new(4, 5, 6)));
    }

    #[test]
    fn mismatch_error_names_the_file() {
        let mut colored = NamedTempFile::new().unwrap();
        writeln!(colored, "1 2 3 4 5 6").unwrap();
        let mut plain = NamedTempFile::new().unwrap();
        writeln!(plain, "1 2 3").unwrap();

        let mut cloud = PointCloud::new();
        read_pts_into(colored.path(), &mut cloud).unwrap();
        let err = read_pts_into(plain.path(), &mut cloud).unwrap_err();
        match err {
            PtsError::ColorLayoutMismatch { path, .. } => assert_eq!(path, plain.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_nonexistent_is_open_error() {
        let err = read_pts("/tmp/nonexistent_file_that_does_not_exist_12345.pts").unwrap_err();
        assert!(matches!(err, PtsError::Open { .. }));
        assert!(err.to_string().contains("nonexistent_file_that_does_not_exist_12345"));
    }

    proptest! {
        #[test]
        fn layout_width_matches_first_record(tokens in 3usize..20) {
            let layout = PtsLayout::infer(tokens).unwrap();
            prop_assert_eq!(layout.width(), tokens);
            prop_assert_eq!(layout.has_color, tokens >= 6);
        }

        #[test]
        fn dummy_values_never_leak_into_points(
            pts in prop::collection::vec(
                (-1e6f64..1e6, -1e6f64..1e6, -1e6f64..1e6, any::<f32>(), any::<u8>(), any::<u8>(), any::<u8>()),
                1..50
            )
        ) {
            let mut text = String::new();
            for (x, y, z, d, r, g, b) in &pts {
                text.push_str(&format!("{x} {y} {z} {d} {r} {g} {b}\n"));
            }
            let (cloud, stats) = load(&text);
            prop_assert_eq!(stats.skipped, 0);
            prop_assert_eq!(cloud.len(), pts.len());
            for (i, (x, y, z, _, r, g, b)) in pts.iter().enumerate() {
                prop_assert_eq!(cloud.point(i), [*x, *y, *z]);
                prop_assert_eq!(cloud.color(i), Some(Rgb::new(*r, *g, *b)));
            }
        }
    }
}
