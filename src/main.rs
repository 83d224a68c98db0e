mod cli;

use cli::{Args, RunPaths};
use colorize_core::PointCloud;
use colorize_io::{read_pts, read_pts_into, write_colorized, RecordStyle};
use colorize_spatial::KdTree;
use colorize_transfer::{ColorizeParams, Colorizer};
use std::error::Error;
use std::process::ExitCode;
use std::time::Instant;

const COMMAND: &str = "colorize";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    if args.usage {
        print!("{}", cli::help_text(COMMAND));
        return ExitCode::SUCCESS;
    }

    let setup = args
        .run_paths()
        .and_then(|paths| Ok((paths, args.params()?)));
    let (paths, params) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("error: {e}\n");
            eprint!("{}", cli::help_text(COMMAND));
            return ExitCode::from(2);
        }
    };

    match run(&paths, params, args.style()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            let mut source = e.source();
            while let Some(cause) = source {
                log::error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(paths: &RunPaths, params: ColorizeParams, style: RecordStyle) -> Result<(), Box<dyn Error>> {
    // The worker count is resolved once, before any work starts.
    let colorizer = Colorizer::new(params)?;
    log::info!(
        "max squared distance {}, default color {}, {} workers",
        params.max_squared_distance,
        params.default_color,
        colorizer.threads()
    );

    log::info!("loading target cloud");
    let target = read_pts(&paths.target)?;

    log::info!("loading {} colored clouds", paths.colored.len());
    let mut colored = PointCloud::new();
    for path in &paths.colored {
        let stats = read_pts_into(path, &mut colored)?;
        if stats.layout.is_some_and(|l| !l.has_color) {
            return Err(format!("{}: no color columns found", path.display()).into());
        }
    }

    let start = Instant::now();
    let tree = KdTree::build(&colored)?;
    log::info!(
        "indexed {} colored points in {:.2?}",
        colored.len(),
        start.elapsed()
    );

    let start = Instant::now();
    let result = colorizer.colorize(&target, &colored, &tree)?;
    let summary = result.summary;
    log::info!(
        "colorized {} points in {:.2?}: {} matched, {} beyond threshold, {} without neighbor",
        summary.total(),
        start.elapsed(),
        summary.matched,
        summary.beyond_threshold,
        summary.no_neighbor
    );

    write_colorized(&paths.output, &result.records, style)?;
    Ok(())
}
