//! Command-line shell over the textmill engine.
//!
//! Extraction always runs on a dedicated worker thread, mirroring the
//! engine's single-background-worker model; the main thread only collects
//! the report. Exit code is non-zero when any file failed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use textmill::{
    diagnose, process_batch, save_blocks, Capabilities, DocumentEngine, EngineConfig, OutputKind,
};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "textmill", version, about = "Multi-strategy document text extraction")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process every supported file under the given folders.
    Run {
        folders: Vec<PathBuf>,

        /// Write accumulated text here (.docx selects a Word document,
        /// anything else plain text).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract text from a single file and print it.
    Extract { file: PathBuf },
    /// Explain why files likely fail extraction.
    Diagnose {
        files: Vec<PathBuf>,

        /// Emit machine-readable JSON instead of a report.
        #[arg(long)]
        json: bool,
    },
    /// Drop all cached extraction results.
    ClearCache,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Run { folders, output } => run_batch(config, &folders, output.as_deref()),
        Command::Extract { file } => extract_one(config, &file),
        Command::Diagnose { files, json } => diagnose_files(&files, json),
        Command::ClearCache => clear_cache(config),
    }
}

fn run_batch(config: EngineConfig, folders: &[PathBuf], output: Option<&Path>) -> Result<()> {
    anyhow::ensure!(!folders.is_empty(), "no folders given");

    let base_dir = folders[0].clone();
    let files = collect_supported_files(folders);
    anyhow::ensure!(!files.is_empty(), "no supported files found");
    tracing::info!(files = files.len(), "starting batch");

    let engine = DocumentEngine::new(config, Capabilities::detect())?;

    // Dedicated worker; the engine and its cache live there for the whole
    // batch, the report comes back over the join.
    let worker = std::thread::spawn(move || {
        let mut engine = engine;
        let report = process_batch(&mut engine, &files, &base_dir);
        let save_result = engine.save_cache();
        (engine, report, save_result)
    });
    let (engine, report, save_result) = worker
        .join()
        .map_err(|_| anyhow::anyhow!("extraction worker panicked"))?;
    save_result?;

    println!(
        "processed {} files: {} succeeded, {} failed, {} unsupported",
        report.processed(),
        report.succeeded.len(),
        report.failed.len(),
        report.unsupported.len()
    );
    for (ext, stat) in &report.stats {
        println!("  .{ext}: {} files, {} chars", stat.count, stat.total_chars);
    }
    if !report.failed.is_empty() {
        println!("failed files (see {}):", engine.error_log_path().display());
        for path in &report.failed {
            println!("  {}", path.display());
        }
    }

    if let Some(path) = output {
        save_blocks(&report.blocks, path, OutputKind::for_path(path))?;
        println!("results written to {}", path.display());
    }

    anyhow::ensure!(report.failed.is_empty(), "{} files failed", report.failed.len());
    Ok(())
}

fn extract_one(config: EngineConfig, file: &Path) -> Result<()> {
    let mut engine = DocumentEngine::new(config, Capabilities::detect())?;
    let result = engine.extract_text(file);
    engine.save_cache()?;
    if result.success {
        println!("{}", result.text);
        Ok(())
    } else {
        anyhow::bail!("extraction failed: {}", result.text)
    }
}

fn diagnose_files(files: &[PathBuf], json: bool) -> Result<()> {
    anyhow::ensure!(!files.is_empty(), "no files given");
    let caps = Capabilities::detect();

    for file in files {
        let diagnosis = diagnose(file, &caps);
        if json {
            println!("{}", serde_json::to_string_pretty(&diagnosis)?);
            continue;
        }
        println!("{}", "=".repeat(60));
        println!("FILE: {}", diagnosis.path.display());
        println!("exists: {}, size: {} bytes", diagnosis.exists, diagnosis.size);
        if diagnosis.problems.is_empty() {
            println!("no problems found");
        }
        for problem in &diagnosis.problems {
            println!("problem: {problem}");
        }
        for suggestion in &diagnosis.suggestions {
            println!("suggestion: {suggestion}");
        }
    }
    Ok(())
}

fn clear_cache(config: EngineConfig) -> Result<()> {
    let mut engine = DocumentEngine::new(config, Capabilities::none())?;
    let before = engine.cache_len();
    engine.clear_cache()?;
    println!("cleared {before} cached results");
    Ok(())
}

/// Recursively collect supported files under each folder, in walk order.
fn collect_supported_files(folders: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for folder in folders {
        for entry in WalkDir::new(folder)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if entry.file_type().is_file() && textmill::is_supported(path) {
                files.push(path.to_path_buf());
            }
        }
    }
    files
}
