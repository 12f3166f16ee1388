use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use uniqline::{init_tracing_once, Driver, PipelineConfig};

struct Args {
    input_path: PathBuf,
    shard_dir: PathBuf,
    worker_count: usize,
    max_size_gb: u64,
    progress: bool,
}

fn parse_args() -> Result<Args> {
    let mut input_path = None;
    let mut shard_dir = None;
    let mut worker_count = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(8);
    let mut max_size_gb = 1u64;
    let mut progress = true;

    let mut raw = std::env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--shard-dir" => {
                shard_dir = Some(PathBuf::from(raw.next().context("--shard-dir needs a value")?));
            }
            "--workers" => {
                worker_count = raw
                    .next()
                    .context("--workers needs a value")?
                    .parse()
                    .context("--workers must be a positive integer")?;
            }
            "--max-size-gb" => {
                max_size_gb = raw
                    .next()
                    .context("--max-size-gb needs a value")?
                    .parse()
                    .context("--max-size-gb must be a positive integer")?;
            }
            "--no-progress" => progress = false,
            other if input_path.is_none() => input_path = Some(PathBuf::from(other)),
            other => bail!("unrecognized argument: {other}"),
        }
    }

    let input_path = input_path.context("usage: uniqline <input-path> [--shard-dir DIR] [--workers N] [--max-size-gb N] [--no-progress]")?;
    let shard_dir = shard_dir.unwrap_or_else(|| PathBuf::from("./uniqline_shards"));

    Ok(Args { input_path, shard_dir, worker_count, max_size_gb, progress })
}

fn main() -> ExitCode {
    init_tracing_once();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let config = PipelineConfig::new(&args.input_path, &args.shard_dir)
        .with_worker_count(args.worker_count)
        .with_max_size_gb(args.max_size_gb)
        .with_progress(args.progress);

    let result = match Driver::new(&config).run() {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match result.answer {
        Some(record) => println!("{}\t{}", String::from_utf8_lossy(&record.text), record.pos),
        None => println!("(no line occurs exactly once)"),
    }

    tracing::info!(
        rounds = result.map_outcome.rounds_run,
        completed = result.map_outcome.completed,
        "pipeline finished"
    );

    ExitCode::SUCCESS
}
