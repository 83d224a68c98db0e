use argh::FromArgs;
use colorize_core::Rgb;
use colorize_io::RecordStyle;
use colorize_transfer::{ColorizeParams, Jobs};
use std::path::PathBuf;

#[derive(FromArgs, Debug)]
/// Transfer colors from one or more colored point clouds onto the nearest
/// points of an uncolored cloud.
pub struct Args {
    /// maximum neighbor distance; farther points get the default color
    #[argh(option, short = 'd')]
    pub max_distance: Option<f64>,

    /// number of worker threads, a positive integer or "auto" (default)
    #[argh(option, short = 'j', default = "Jobs::Auto")]
    pub jobs: Jobs,

    /// color of points without a neighbor, as hex RRGGBB (default 000000)
    #[argh(option, short = 'c', default = "Rgb::BLACK")]
    pub color: Rgb,

    /// write fixed-width columns instead of compact records
    #[argh(switch, short = 'a')]
    pub aligned: bool,

    /// show this help and exit
    #[argh(switch, short = 'h')]
    pub usage: bool,

    /// the uncolored cloud, one or more colored clouds, and the output file
    #[argh(positional)]
    pub paths: Vec<PathBuf>,
}

/// Input and output locations of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub target: PathBuf,
    pub colored: Vec<PathBuf>,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UsageError {
    #[error("expected <target> <colored>... <output>, got {0} paths")]
    MissingPaths(usize),

    #[error("maximum distance must be a finite non-negative number, got {0}")]
    InvalidDistance(f64),
}

impl Args {
    pub fn run_paths(&self) -> Result<RunPaths, UsageError> {
        match self.paths.as_slice() {
            [target, colored @ .., output] if !colored.is_empty() => Ok(RunPaths {
                target: target.clone(),
                colored: colored.to_vec(),
                output: output.clone(),
            }),
            other => Err(UsageError::MissingPaths(other.len())),
        }
    }

    /// The distance given on the command line is squared here; the core only
    /// deals in squared distances.
    pub fn params(&self) -> Result<ColorizeParams, UsageError> {
        let mut params = ColorizeParams::default()
            .with_default_color(self.color)
            .with_jobs(self.jobs);
        if let Some(d) = self.max_distance {
            if !d.is_finite() || d < 0.0 {
                return Err(UsageError::InvalidDistance(d));
            }
            params = params.with_max_distance(d);
        }
        Ok(params)
    }

    pub fn style(&self) -> RecordStyle {
        if self.aligned {
            RecordStyle::Aligned
        } else {
            RecordStyle::Compact
        }
    }
}

/// The usage text argh generates for [`Args`].
pub fn help_text(command: &str) -> String {
    match Args::from_args(&[command], &["--help"]) {
        Err(early) => early.output,
        Ok(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["colorize"], args).unwrap()
    }

    #[test]
    fn splits_positional_paths() {
        let args = parse(&["laser.pts", "kinect1.pts", "kinect2.pts", "out.txt"]);
        let paths = args.run_paths().unwrap();
        assert_eq!(paths.target, PathBuf::from("laser.pts"));
        assert_eq!(
            paths.colored,
            vec![PathBuf::from("kinect1.pts"), PathBuf::from("kinect2.pts")]
        );
        assert_eq!(paths.output, PathBuf::from("out.txt"));
    }

    #[test]
    fn too_few_paths() {
        let args = parse(&["laser.pts", "out.txt"]);
        assert_eq!(args.run_paths(), Err(UsageError::MissingPaths(2)));
    }

    #[test]
    fn options_fill_params() {
        let args = parse(&["-d", "0.5", "-j", "3", "-c", "ff8000", "a", "b", "c"]);
        let params = args.params().unwrap();
        assert_eq!(params.max_squared_distance, 0.25);
        assert_eq!(params.jobs, Jobs::Fixed(NonZeroUsize::new(3).unwrap()));
        assert_eq!(params.default_color, Rgb::new(255, 128, 0));
        assert_eq!(args.style(), RecordStyle::Compact);
    }

    #[test]
    fn defaults_without_options() {
        let args = parse(&["a", "b", "c"]);
        let params = args.params().unwrap();
        assert_eq!(params, ColorizeParams::default());
        assert!(!args.usage);
    }

    #[test]
    fn auto_jobs_and_aligned_switch() {
        let args = parse(&["-j", "auto", "-a", "a", "b", "c"]);
        assert_eq!(args.jobs, Jobs::Auto);
        assert_eq!(args.style(), RecordStyle::Aligned);
    }

    #[test]
    fn rejects_bad_option_values() {
        assert!(Args::from_args(&["colorize"], &["-c", "purple", "a", "b", "c"]).is_err());
        assert!(Args::from_args(&["colorize"], &["-j", "many", "a", "b", "c"]).is_err());
        assert!(Args::from_args(&["colorize"], &["-d", "far", "a", "b", "c"]).is_err());

        let mut args = parse(&["a", "b", "c"]);
        args.max_distance = Some(-1.0);
        assert_eq!(args.params(), Err(UsageError::InvalidDistance(-1.0)));
        args.max_distance = Some(f64::INFINITY);
        assert!(args.params().is_err());
    }

    #[test]
    fn help_mentions_options() {
        let help = help_text("colorize");
        for flag in ["--max-distance", "--jobs", "--color", "--aligned"] {
            assert!(help.contains(flag), "missing {flag} in:\n{help}");
        }
    }
}
