//! oidlabel: Open Images bounding boxes to YOLO labels.
//!
//! Downloads the Open Images boxable annotation CSVs, imports them into
//! SQLite, and extracts per-image label files and previews for
//! object-detection training.
//!
//! # Modules
//!
//! - [`config`]: partitions, tables, artifact URLs and local paths
//! - [`store`]: SQLite schema, CSV import and the annotation query builder
//! - [`geom`]: box forms and rotation correction
//! - [`export`]: label file writer and parser
//! - [`fetch`]: HTTP downloads
//! - [`preview`]: box outlines drawn on images
//! - [`jobs`]: the batch jobs behind each subcommand
//! - [`logging`]: the log sink passed to every job
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod geom;
pub mod jobs;
pub mod logging;
pub mod preview;
pub mod store;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use config::{DatasetLayout, Partition};
pub use error::OidError;
use fetch::Fetcher;
use logging::{LogLevel, LogSink};
use store::Store;

/// The oidlabel CLI application.
#[derive(Parser)]
#[command(name = "oidlabel")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level.
    #[arg(
        short = 'l',
        long = "loglevel",
        value_enum,
        ignore_case = true,
        default_value = "info",
        global = true
    )]
    loglevel: LogLevel,

    /// Working directory holding dataset/, images/, labels/, previews/ and
    /// dataset.sqlite.
    #[arg(long, env = "OIDLABEL_HOME", default_value = ".", global = true)]
    base_dir: PathBuf,

    /// HTTP timeout in seconds for each request. Unset means no timeout.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Download the annotation CSVs.
    DownloadDataset,
    /// Rebuild dataset.sqlite from the downloaded CSVs.
    Import,
    /// Download images and write labels and previews for a partition.
    DownloadImages(DownloadImagesArgs),
    /// Render one image with its boxes.
    Preview(PreviewArgs),
    /// Copy images and labels of selected class indices out of a YOLO set.
    ExtractClasses(ExtractClassesArgs),
    /// Check that image files decode.
    VerifyImages(VerifyImagesArgs),
}

#[derive(clap::Args)]
struct DownloadImagesArgs {
    /// Set of data (train, validation or test).
    #[arg(long = "set", value_enum, default_value = "train")]
    set: Partition,

    /// Classes to download (e.g. Person "Human eye").
    #[arg(long, num_args = 1..)]
    classes: Vec<String>,

    /// Overwrite existing images, labels and previews.
    #[arg(long)]
    overwrite: bool,

    /// Skip drawing previews.
    #[arg(long)]
    without_preview: bool,

    /// Maximum number of images.
    #[arg(long)]
    limit: Option<u64>,

    /// Images to skip before the first download (used with --limit).
    #[arg(long, default_value_t = 0)]
    offset: u64,
}

#[derive(clap::Args)]
struct PreviewArgs {
    /// Image id to preview.
    image_id: String,

    /// Set of data (train, validation or test).
    #[arg(long = "set", value_enum, default_value = "train")]
    set: Partition,

    /// Classes to draw.
    #[arg(long, num_args = 1..)]
    classes: Vec<String>,

    /// Output image path.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ExtractClassesArgs {
    /// File listing one image path per line.
    images_list: PathBuf,

    /// Output directory.
    output_dir: PathBuf,

    /// Class indices to keep, in their new order.
    #[arg(long = "extract-class-nos", alias = "extract_class_nos", num_args = 1.., required = true)]
    extract_class_nos: Vec<usize>,
}

#[derive(clap::Args)]
struct VerifyImagesArgs {
    /// Image files or directories.
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

/// Run the oidlabel CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), OidError> {
    let cli = Cli::parse();

    logging::init(cli.loglevel);
    let log = LogSink::new(cli.loglevel.to_filter());
    let layout = DatasetLayout::new(&cli.base_dir);
    let fetcher = match cli.timeout {
        Some(secs) => Fetcher::with_timeout(Duration::from_secs(secs)),
        None => Fetcher::new(),
    };

    match cli.command {
        Commands::DownloadDataset => {
            jobs::download_dataset(&layout, &fetcher, &log)?;
            Ok(())
        }
        Commands::Import => {
            for (table, rows) in jobs::import_dataset(&layout, &log)? {
                println!("{table}: {rows} row(s)");
            }
            Ok(())
        }
        Commands::DownloadImages(args) => run_download_images(&layout, &fetcher, args, &log),
        Commands::Preview(args) => run_preview(&layout, &fetcher, args, &log),
        Commands::ExtractClasses(args) => run_extract_classes(args, &log),
        Commands::VerifyImages(args) => run_verify_images(args, &log),
    }
}

fn run_download_images(
    layout: &DatasetLayout,
    fetcher: &Fetcher,
    args: DownloadImagesArgs,
    log: &LogSink,
) -> Result<(), OidError> {
    let store = Store::open(&layout.database_path())?;
    let opts = jobs::HarvestOptions {
        partition: args.set,
        classes: args.classes,
        overwrite: args.overwrite,
        without_preview: args.without_preview,
        limit: args.limit,
        offset: args.offset,
    };
    let report = jobs::download_images(layout, &store, fetcher, &opts, log)?;
    println!("{report}");
    Ok(())
}

fn run_preview(
    layout: &DatasetLayout,
    fetcher: &Fetcher,
    args: PreviewArgs,
    log: &LogSink,
) -> Result<(), OidError> {
    let store = Store::open(&layout.database_path())?;
    let opts = jobs::PreviewOptions {
        partition: args.set,
        image_id: args.image_id,
        classes: args.classes,
        output: args.output,
    };
    if let Some(path) = jobs::preview_image(layout, &store, fetcher, &opts, log)? {
        println!("{}", path.display());
    }
    Ok(())
}

fn run_extract_classes(args: ExtractClassesArgs, log: &LogSink) -> Result<(), OidError> {
    let opts = jobs::ExtractOptions {
        images_list: args.images_list,
        output_dir: args.output_dir,
        class_nos: args.extract_class_nos,
    };
    let summary = jobs::extract_classes(&opts, log)?;
    println!(
        "Copied {} of {} image(s), {} label(s) kept",
        summary.images_copied, summary.images_scanned, summary.labels_kept
    );
    Ok(())
}

fn run_verify_images(args: VerifyImagesArgs, log: &LogSink) -> Result<(), OidError> {
    let report = jobs::verify_images(&args.images, log)?;
    for path in &report.checked {
        println!("{}", path.display());
    }
    if report.is_ok() {
        Ok(())
    } else {
        Err(OidError::VerifyFailed {
            bad_count: report.bad.len(),
            total: report.checked.len(),
        })
    }
}
