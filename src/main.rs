use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{self, BufReader};

use landmark_tracker::config::Config;
use landmark_tracker::pipeline::{FramePipeline, LandmarkSource};
use landmark_tracker::replay::{JsonLinesSink, JsonLinesSource};

const CONFIG_PATH: &str = "config.toml";

const USAGE: &str = "usage: landmark-tracker [--config PATH] [INPUT]

Reads one JSON frame per line from INPUT (default: stdin) and writes
smoothed, track-tagged frames to stdout.";

struct Args {
    config: Option<String>,
    input: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        input: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = iter.next().context("--config requires a path")?;
                args.config = Some(path);
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other if other.starts_with('-') && other != "-" => bail!("unknown option {}\n\n{}", other, USAGE),
            other => {
                if args.input.is_some() {
                    bail!("more than one INPUT given\n\n{}", USAGE);
                }
                args.input = Some(other.to_string());
            }
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(CONFIG_PATH),
    };

    log::info!("landmark-tracker {}", env!("GIT_VERSION"));
    log::info!("Mode: {:?}", config.app.mode);
    log::info!(
        "Tracking: threshold={} x frame, interval={} ms, stale after {} frames",
        config.tracking.match_threshold,
        config.tracking.frame_interval_ms,
        config.tracking.stale_frames
    );
    log::info!(
        "Filter: min_cutoff={}, beta={}, d_cutoff={}",
        config.filter.min_cutoff,
        config.filter.beta,
        config.filter.d_cutoff
    );

    let mut source: Box<dyn LandmarkSource> = match args.input.as_deref() {
        None | Some("-") => Box::new(JsonLinesSource::new(io::stdin().lock())),
        Some(path) => {
            let file = File::open(path).with_context(|| format!("failed to open {}", path))?;
            Box::new(JsonLinesSource::new(BufReader::new(file)))
        }
    };
    let mut sink = JsonLinesSink::new(io::stdout().lock());

    let mut pipeline = FramePipeline::from_config(&config);
    let stats = pipeline.run(source.as_mut(), &mut sink)?;

    log::info!(
        "Done: {} frames, {} presented, {} rejected, {} tracks live",
        stats.frames,
        stats.presented,
        stats.rejected,
        pipeline.assigner().len()
    );
    Ok(())
}
