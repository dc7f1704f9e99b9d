use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use threadfeat::{init_tracing_once, read_table, write_table, DurationFormat, EngineOptions, ThreadEngine};

/// Add reply-tree features (root_id, depth, sibling_count, time_since_root) to comments.
#[derive(Parser, Debug)]
#[command(name = "threadfeat", version, about)]
struct Args {
    /// Comment table: .csv, .json, .jsonl/.ndjson (optionally .zst), or a directory of them
    input: PathBuf,
    /// Destination file; format follows the extension
    output: PathBuf,
    /// Write only id + feature columns instead of the joined table
    #[arg(long)]
    features_only: bool,
    /// Rendering of time_since_root
    #[arg(long, value_enum, default_value_t = DurationArg::Seconds)]
    duration_format: DurationArg,
    /// Worker threads (default: all cores)
    #[arg(long, short = 'j')]
    jobs: Option<usize>,
    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
    /// Fail when a comment id appears in more than one post
    #[arg(long)]
    strict_ids: bool,
    /// Also write the run summary as JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DurationArg {
    Seconds,
    Human,
}

impl From<DurationArg> for DurationFormat {
    fn from(d: DurationArg) -> Self {
        match d {
            DurationArg::Seconds => DurationFormat::Seconds,
            DurationArg::Human => DurationFormat::Human,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing_once();

    tracing::info!("Loading comments from {}", args.input.display());
    let table = read_table(&args.input)?;

    let mut opts = EngineOptions::default()
        .with_progress(!args.no_progress)
        .with_strict_ids(args.strict_ids);
    if let Some(n) = args.jobs {
        opts = opts.with_parallelism(n);
    }
    let engine = ThreadEngine::with_options(opts);

    let features = engine.compute(&table).context("computing thread features")?;
    let fmt = DurationFormat::from(args.duration_format);
    let out = if args.features_only {
        features.to_table(fmt)
    } else {
        features.join_onto(&table, fmt)
    };
    write_table(&out, &args.output)?;

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&features.summary)?;
        fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}
