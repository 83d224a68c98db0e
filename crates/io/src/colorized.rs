use colorize_core::OutputRecord;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Written in place of the squared distance when a point had no neighbor.
pub const NO_NEIGHBOR_SENTINEL: f64 = -1.0;

/// Error types for the colorized record writer.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WriteError {
    /// The destination could not be created.
    #[error("could not create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing to an open destination failed.
    #[error("failed to write colorized records")]
    Io(#[from] io::Error),
}

/// Text layout of one output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordStyle {
    /// Space separated, shortest round-trip number formatting:
    /// `0 0 0 0.25 1 10 20 30`.
    #[default]
    Compact,
    /// Fixed-width columns with six decimals, for tools that expect the
    /// classic `% 11f % 11f % 11f % 14f flag % 3d % 3d % 3d` layout.
    Aligned,
}

/// Writes one line per record, in slice order, to a new file at `path`.
pub fn write_colorized(
    path: impl AsRef<Path>,
    records: &[OutputRecord],
    style: RecordStyle,
) -> Result<(), WriteError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| WriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_colorized_to(file, records, style)?;
    log::info!("{}: {} records written", path.display(), records.len());
    Ok(())
}

/// Writes one line per record, in slice order, to `writer`.
pub fn write_colorized_to<W: Write>(
    writer: W,
    records: &[OutputRecord],
    style: RecordStyle,
) -> io::Result<()> {
    let mut out = BufWriter::new(writer);
    for record in records {
        write_record(&mut out, record, style)?;
    }
    out.flush()
}

/// Formats a single record without the trailing newline.
pub fn format_record(record: &OutputRecord, style: RecordStyle) -> String {
    let mut buf = Vec::with_capacity(64);
    // Writing into a Vec cannot fail.
    let _ = write_record(&mut buf, record, style);
    buf.pop();
    String::from_utf8_lossy(&buf).into_owned()
}

fn write_record<W: Write>(out: &mut W, record: &OutputRecord, style: RecordStyle) -> io::Result<()> {
    let [x, y, z] = record.point;
    let d = record.squared_distance.unwrap_or(NO_NEIGHBOR_SENTINEL);
    let flag = u8::from(record.matched);
    let c = record.color;

    match style {
        RecordStyle::Compact => writeln!(
            out,
            "{} {} {} {} {} {} {} {}",
            x, y, z, d, flag, c.r, c.g, c.b
        ),
        RecordStyle::Aligned => {
            write_aligned_float(out, x, 11)?;
            out.write_all(b" ")?;
            write_aligned_float(out, y, 11)?;
            out.write_all(b" ")?;
            write_aligned_float(out, z, 11)?;
            out.write_all(b" ")?;
            write_aligned_float(out, d, 14)?;
            write!(out, " {} ", flag)?;
            for (i, channel) in [c.r, c.g, c.b].into_iter().enumerate() {
                if i > 0 {
                    out.write_all(b" ")?;
                }
                write!(out, " {:>2}", channel)?;
            }
            out.write_all(b"\n")
        }
    }
}

/// Right-aligned in `width` columns with six decimals; non-negative values
/// get a leading space where the minus sign would go.
fn write_aligned_float<W: Write>(out: &mut W, v: f64, width: usize) -> io::Result<()> {
    if v.is_sign_negative() {
        write!(out, "{:>width$.6}", v)
    } else {
        write!(out, " {:>w$.6}", v, w = width - 1)
    }
}
