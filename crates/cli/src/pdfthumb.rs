//! pdfthumb - render PDF pages to JPEG thumbnails
//!
//! Subcommands:
//! - `generate`: one page, prints `{"uri","width","height"}`
//! - `generate-all`: every page, prints a JSON array
//! - `page-count`: prints the number of pages
//! - `clean`: deletes the output folder
//!
//! Failures print `{"code","message"}` to stderr and exit with status 1.

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use pdfthumb_core::{OpenError, PDFDocument, RenderError, RenderOptions, RenderedPage};
use rand::Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Folder under the user cache directory that receives thumbnails.
const OUTPUT_SUBDIR: &str = "imagesSign";

/// Render PDF pages to JPEG thumbnails.
#[derive(Parser, Debug)]
#[command(name = "pdfthumb")]
#[command(author, version, about = "Render PDF pages to JPEG thumbnails", long_about = None)]
struct Args {
    /// Use debug logging level
    #[arg(short = 'd', long, global = true, action = ArgAction::SetTrue)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one page
    Generate {
        /// Path (or file:// URI) of the PDF
        file: String,

        /// Zero-based page number
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        page: i64,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Render every page
    GenerateAll {
        /// Path (or file:// URI) of the PDF
        file: String,

        #[command(flatten)]
        render: RenderArgs,

        /// Render pages on all cores
        #[arg(long, action = ArgAction::SetTrue)]
        parallel: bool,
    },

    /// Print the number of pages
    PageCount {
        /// Path (or file:// URI) of the PDF
        file: String,
    },

    /// Delete the generated thumbnails folder
    Clean {
        /// Output directory (defaults to the user cache directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// JPEG quality (1-100)
    #[arg(short, long, default_value_t = 80)]
    quality: u8,

    /// Pixels per PDF point
    #[arg(short, long, default_value_t = 2.0)]
    scale: f64,

    /// Output directory (defaults to the user cache directory)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

#[derive(Serialize, Debug)]
struct Thumbnail {
    uri: String,
    width: u32,
    height: u32,
}

#[derive(Serialize, Debug)]
struct PageFailure {
    page: usize,
    error: String,
}

/// A failure reported to the caller with a stable code.
#[derive(Debug)]
enum Failure {
    FileNotFound(String),
    InvalidPage { page: i64, page_count: usize },
    Internal(anyhow::Error),
}

impl Failure {
    const fn code(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::InvalidPage { .. } => "INVALID_PAGE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::FileNotFound(file) => format!("File {file} not found"),
            Self::InvalidPage { page, page_count } => {
                format!("Page number {page} is invalid, file has {page_count} pages")
            }
            Self::Internal(err) => format!("{err:#}"),
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<RenderError> for Failure {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::InvalidPageIndex { index, page_count } => Self::InvalidPage { page: index, page_count },
            other => Self::Internal(other.into()),
        }
    }
}

/// Accepts plain paths and `file://` URIs.
fn local_path(file: &str) -> PathBuf {
    PathBuf::from(file.strip_prefix("file://").unwrap_or(file))
}

fn open_document(file: &str) -> Result<PDFDocument, Failure> {
    let path = local_path(file);
    if !path.is_file() {
        return Err(Failure::FileNotFound(file.to_string()));
    }
    match pdfthumb_core::open_path(&path) {
        Ok(doc) => Ok(doc),
        Err(OpenError::NotFound(_)) => Err(Failure::FileNotFound(file.to_string())),
        Err(err) => Err(Failure::Internal(
            anyhow::Error::new(err).context(format!("failed to open {}", path.display())),
        )),
    }
}

fn output_dir(out_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    match out_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => dirs::cache_dir()
            .map(|cache| cache.join("pdfthumb").join(OUTPUT_SUBDIR))
            .context("no user cache directory"),
    }
}

/// `<basename with '.' replaced by '-'>-thumbnail-<page>-<random>.jpg`
fn output_file_name(file: &str, page: usize) -> String {
    let basename = file.rsplit('/').next().unwrap_or(file);
    let prefix = basename.replace('.', "-");
    let random: u32 = rand::thread_rng().gen_range(0..i32::MAX as u32);
    format!("{prefix}-thumbnail-{page}-{random}.jpg")
}

fn write_thumbnail(file: &str, page: usize, rendered: &RenderedPage, dir: &Path) -> anyhow::Result<Thumbnail> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(output_file_name(file, page));
    std::fs::write(&path, &rendered.data).with_context(|| format!("failed to write {}", path.display()))?;
    let absolute = std::path::absolute(&path).unwrap_or(path);
    Ok(Thumbnail {
        uri: format!("file://{}", absolute.display()),
        width: rendered.width,
        height: rendered.height,
    })
}

fn render_options(args: &RenderArgs) -> RenderOptions {
    RenderOptions::new().scale(args.scale).quality(args.quality)
}

fn generate(file: &str, page: i64, args: &RenderArgs) -> Result<serde_json::Value, Failure> {
    let doc = open_document(file)?;
    let page_count = doc.page_count();
    let index = usize::try_from(page)
        .ok()
        .filter(|p| *p < page_count)
        .ok_or(Failure::InvalidPage { page, page_count })?;
    let rendered = pdfthumb_core::render_page_with_options(&doc, page, &render_options(args))?;
    let dir = output_dir(args.out_dir.as_deref())?;
    let thumb = write_thumbnail(file, index, &rendered, &dir)?;
    Ok(serde_json::to_value(thumb).context("serializing result")?)
}

/// Returns the JSON array and whether every page succeeded.
fn generate_all(file: &str, args: &RenderArgs, parallel: bool) -> Result<(serde_json::Value, bool), Failure> {
    let doc = open_document(file)?;
    let dir = output_dir(args.out_dir.as_deref())?;
    let results: Vec<(usize, Result<RenderedPage, RenderError>)> = if parallel {
        pdfthumb_core::render_all_parallel(&doc, args.scale, args.quality)
    } else {
        pdfthumb_core::render_all(&doc, args.scale, args.quality).collect()
    };

    let mut all_ok = true;
    let mut items = Vec::with_capacity(results.len());
    for (page, result) in results {
        let item = match result.map_err(anyhow::Error::from).and_then(|r| write_thumbnail(file, page, &r, &dir)) {
            Ok(thumb) => serde_json::to_value(thumb),
            Err(err) => {
                tracing::warn!(page, error = %err, "page failed");
                all_ok = false;
                serde_json::to_value(PageFailure {
                    page,
                    error: format!("{err:#}"),
                })
            }
        };
        items.push(item.context("serializing result")?);
    }
    Ok((serde_json::Value::Array(items), all_ok))
}

fn clean(out_dir: Option<&Path>) -> Result<serde_json::Value, Failure> {
    let dir = output_dir(out_dir)?;
    if dir.exists() {
        std::fs::remove_dir_all(&dir).with_context(|| format!("failed to remove {}", dir.display()))?;
    }
    Ok(serde_json::Value::Bool(true))
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    let outcome = match &args.command {
        Command::Generate { file, page, render } => generate(file, *page, render).map(|v| (v, true)),
        Command::GenerateAll {
            file,
            render,
            parallel,
        } => generate_all(file, render, *parallel),
        Command::PageCount { file } => open_document(file).map(|doc| (serde_json::Value::from(doc.page_count()), true)),
        Command::Clean { out_dir } => clean(out_dir.as_deref()).map(|v| (v, true)),
    };

    match outcome {
        Ok((value, ok)) => {
            println!("{value}");
            if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }
        Err(failure) => {
            let report = serde_json::json!({
                "code": failure.code(),
                "message": failure.message(),
            });
            eprintln!("{report}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_follows_the_thumbnail_pattern() {
        let name = output_file_name("/tmp/docs/report.v2.pdf", 3);
        assert!(name.starts_with("report-v2-pdf-thumbnail-3-"), "{name}");
        assert!(name.ends_with(".jpg"));
        let random = &name["report-v2-pdf-thumbnail-3-".len()..name.len() - 4];
        assert!(random.parse::<u32>().is_ok());
    }

    #[test]
    fn file_uris_are_accepted() {
        assert_eq!(local_path("file:///a/b.pdf"), PathBuf::from("/a/b.pdf"));
        assert_eq!(local_path("/a/b.pdf"), PathBuf::from("/a/b.pdf"));
    }

    #[test]
    fn invalid_page_message() {
        let failure = Failure::InvalidPage { page: 5, page_count: 2 };
        assert_eq!(failure.code(), "INVALID_PAGE");
        assert_eq!(failure.message(), "Page number 5 is invalid, file has 2 pages");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = open_document("/definitely/not/here.pdf").unwrap_err();
        assert_eq!(err.code(), "FILE_NOT_FOUND");
    }
}
