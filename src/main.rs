use clap::{Parser, Subcommand};
use image_ingest::config::{self, IngestConfig};
use image_ingest::descriptor::UploadResponse;
use image_ingest::imaging::{ImageCodec, RustCodec, SourceFormat, format::UNKNOWN_MIME};
use image_ingest::ingest::{IngestPipeline, UploadRequest};
use image_ingest::output;
use image_ingest::storage::StorageLayout;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "image-ingest")]
#[command(about = "Validate uploaded images and store WebP derivatives")]
#[command(long_about = "\
Validate uploaded images and store WebP derivatives

Every accepted upload is stored three times under one opaque identity:

  uploads/
  ├── .htaccess                    # Written once; blocks scripts and listings
  ├── original/img_<id>.webp       # Full resolution, quality 95
  ├── large/img_<id>.webp          # At most 1600px wide, quality 90
  └── thumb/img_<id>.webp          # 300x300 center crop, quality 85

Validation (first failure wins):
  presence → transfer → size → extension → declared type → sniffed type → decode

Run 'image-ingest gen-config' to generate a documented ingest.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Override the configured storage root
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest local files as if they had been uploaded
    Ingest {
        /// Files or directories (walked recursively)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print one JSON response per file instead of a tree
        #[arg(long)]
        json: bool,

        /// Declared content type for every file (default: derived from extension)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Validate config, storage root and codec without ingesting anything
    Check,
    /// Print a stock ingest.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let mut ingest_config = config::load_config(&cli.config)?;
    if let Some(root) = cli.root {
        ingest_config.storage_root = root;
    }

    match cli.command {
        Command::Ingest {
            paths,
            json,
            content_type,
        } => {
            init_thread_pool(&ingest_config.processing);
            let files = collect_files(&paths);
            let pipeline = IngestPipeline::new(ingest_config);

            let results: Vec<_> = files
                .par_iter()
                .map(|path| {
                    let result = read_upload(path, content_type.as_deref())
                        .map(|request| pipeline.ingest(&request));
                    (path, result)
                })
                .collect();

            let mut stored = 0;
            let mut rejected = 0;
            for (index, (path, result)) in results.into_iter().enumerate() {
                let result = match result {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::error!(path = %path.display(), error = %e, "cannot read file");
                        rejected += 1;
                        continue;
                    }
                };
                if result.is_ok() {
                    stored += 1;
                } else {
                    rejected += 1;
                }
                if json {
                    println!("{}", serde_json::to_string(&UploadResponse::from(result))?);
                } else {
                    output::print_ingest_result(index + 1, path, &result);
                }
            }
            if !json {
                println!();
                println!("{}", output::format_ingest_summary(stored, rejected));
            }
            if rejected > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Check => {
            let storage = check_storage(&ingest_config);
            let codec = RustCodec::new().check_available();
            output::print_check_output(&ingest_config, &storage, &codec);
            if storage.is_err() || codec.is_err() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::GenConfig => {}
    }

    Ok(ExitCode::SUCCESS)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Expand directories into the files beneath them, in a stable order.
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files
}

/// Build the request a browser would have sent for this file.
fn read_upload(path: &Path, content_type: Option<&str>) -> std::io::Result<UploadRequest> {
    let payload = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = match content_type {
        Some(ct) => ct.to_string(),
        None => path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(SourceFormat::from_extension)
            .map_or(UNKNOWN_MIME, SourceFormat::mime)
            .to_string(),
    };
    Ok(UploadRequest::new(payload, filename, content_type))
}

fn check_storage(config: &IngestConfig) -> std::io::Result<()> {
    StorageLayout::new(&config.storage_root, config.target_format).check_writable()
}
