//! exif-engine - batch EXIF/TIFF metadata extractor.
//!
//! Parses every file given on the command line concurrently and prints the
//! reports in input order.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exif_engine::{encode_jpeg, Cli, Engine, IoError, OutputFormat, ParseResult, ReaderSource};

/// Outcome for one input file.
struct FileReport {
    path: PathBuf,
    result: Result<ParseResult, IoError>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = cli.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let engine = Arc::new(Engine::with_options(cli.engine_options()));
    let fetch_thumbnail = cli.fetch_thumbnail();

    // Each task owns its own source; the engine is shared read-only
    let mut tasks = JoinSet::new();
    for (index, path) in cli.paths.iter().cloned().enumerate() {
        let engine = Arc::clone(&engine);
        tasks.spawn_blocking(move || {
            let result = parse_file(&engine, &path, fetch_thumbnail);
            (index, FileReport { path, result })
        });
    }

    let mut reports: Vec<Option<FileReport>> = cli.paths.iter().map(|_| None).collect();
    let mut ok = true;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, report)) => reports[index] = Some(report),
            Err(e) => {
                error!("Parse task failed: {}", e);
                ok = false;
            }
        }
    }

    for report in reports.into_iter().flatten() {
        match &report.result {
            Ok(result) => {
                print_report(&cli, &report.path, result);
                if let Err(e) = write_thumbnail(&cli, &report.path, result) {
                    error!(path = %report.path.display(), "Failed to write thumbnail: {}", e);
                    ok = false;
                }
            }
            Err(e) => {
                error!(path = %report.path.display(), "Failed to open: {}", e);
                ok = false;
            }
        }
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn parse_file(engine: &Engine, path: &Path, fetch_thumbnail: bool) -> Result<ParseResult, IoError> {
    let source = ReaderSource::open(path)?;
    Ok(engine.parse(source, fetch_thumbnail))
}

// =============================================================================
// Output
// =============================================================================

fn print_report(cli: &Cli, path: &Path, result: &ParseResult) {
    match cli.format {
        OutputFormat::Json => match serde_json::to_string_pretty(result) {
            Ok(json) => println!("{}", json),
            Err(e) => error!(path = %path.display(), "Failed to serialize report: {}", e),
        },
        OutputFormat::Text => print_text(cli, path, result),
    }
}

fn print_text(cli: &Cli, path: &Path, result: &ParseResult) {
    println!("== {} ==", path.display());

    if let Some(ref e) = result.error {
        println!("  error: {}", e);
        return;
    }

    for entry in &result.flat_tag_list {
        println!("{}: {}", entry.name.unwrap_or("?"), entry.display);
    }

    if cli.all_directories {
        for directory in &result.directories {
            println!();
            println!(
                "[{}] offset {}, {} entries",
                directory.name,
                directory.offset,
                directory.len()
            );
            for entry in &directory.entries {
                println!(
                    "  0x{:04X} {:<32} {:?}[{}]{} = {}",
                    entry.tag,
                    entry.name.unwrap_or("?"),
                    entry.field_type,
                    entry.count,
                    if entry.is_external { " ext" } else { "" },
                    entry.display
                );
                println!("         record {}  raw {}", entry.record_hex(), entry.raw_hex());
            }
        }
    }

    match result.thumbnail {
        Some(ref thumbnail) => println!("thumbnail: {}x{}", thumbnail.width(), thumbnail.height()),
        None if cli.fetch_thumbnail() => println!("thumbnail: none"),
        None => {}
    }
    println!("elapsed: {:.3} ms", result.elapsed.as_secs_f64() * 1000.0);
}

/// Write the thumbnail as `<stem>.thumb.jpg` when a thumbnail directory is set.
fn write_thumbnail(cli: &Cli, path: &Path, result: &ParseResult) -> Result<(), String> {
    let (Some(dir), Some(thumbnail)) = (cli.thumbnail_dir.as_ref(), result.thumbnail.as_ref())
    else {
        return Ok(());
    };

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "thumbnail".to_string());
    let target = dir.join(format!("{}.thumb.jpg", stem));

    let jpeg = encode_jpeg(thumbnail, cli.jpeg_quality).map_err(|e| e.to_string())?;
    std::fs::write(&target, &jpeg).map_err(|e| e.to_string())?;

    info!(path = %target.display(), bytes = jpeg.len(), "Wrote thumbnail");
    Ok(())
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "exif_engine=debug"
    } else {
        "exif_engine=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
