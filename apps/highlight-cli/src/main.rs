//! PDF Highlighter command line
//!
//! Applies a saved highlight set to a PDF outside the browser and inspects
//! documents the way the viewer sees them.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use highlight_core::{
    export_file_name, export_highlights, DocumentHandle, ExportOptions, HighlightStore,
    HighlighterConfig, PdfDocument,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pdf-highlight")]
#[command(version, about = "Apply and inspect PDF text highlights")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write highlights into a copy of a PDF as annotations
    Export {
        /// Source PDF
        #[arg(short, long)]
        input: PathBuf,

        /// Highlight set as exported by the viewer (JSON array)
        #[arg(long)]
        highlights: PathBuf,

        /// Output path (default: highlighted_<input> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML configuration for palette, opacity and author
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the text of one page
    Text {
        #[arg(short, long)]
        input: PathBuf,

        /// 1-based page number
        #[arg(short, long)]
        page: u32,
    },

    /// Print document information as JSON
    Info {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries command output; logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Export {
            input,
            highlights,
            output,
            config,
        } => {
            let written = run_export(&input, &highlights, output.as_deref(), config.as_deref())?;
            println!("{}", written.display());
        }
        Command::Text { input, page } => {
            println!("{}", run_text(&input, page)?);
        }
        Command::Info { input } => {
            println!("{}", run_info(&input)?);
        }
    }

    Ok(())
}

fn load_document(path: &Path) -> Result<PdfDocument> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    PdfDocument::load(&name, &bytes).with_context(|| format!("Failed to open {}", path.display()))
}

fn run_export(
    input: &Path,
    highlights: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
) -> Result<PathBuf> {
    let config = match config {
        Some(path) => HighlighterConfig::from_file(path)?,
        None => HighlighterConfig::default(),
    };
    let document = load_document(input)?;

    let json = fs::read_to_string(highlights)
        .with_context(|| format!("Failed to read {}", highlights.display()))?;
    let store = HighlightStore::from_json(&json)
        .with_context(|| format!("Invalid highlight set in {}", highlights.display()))?;
    tracing::info!(
        highlights = store.count(),
        pages = ?store.pages(),
        "loaded highlight set"
    );

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => input.with_file_name(export_file_name(document.name())),
    };
    let suggested = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| export_file_name(document.name()));

    let artifact = export_highlights(
        &document,
        store.records(),
        &suggested,
        &ExportOptions::from_config(&config),
    )?;

    let output = output.with_file_name(&artifact.file_name);
    fs::write(&output, &artifact.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!(
        path = %output.display(),
        annotations = artifact.annotation_count,
        "wrote highlighted PDF"
    );
    Ok(output)
}

fn run_text(input: &Path, page: u32) -> Result<String> {
    let document = load_document(input)?;
    if page == 0 || page > document.page_count() {
        bail!(
            "Page {} is out of range (1-{})",
            page,
            document.page_count()
        );
    }
    Ok(document.page_text(page))
}

fn run_info(input: &Path) -> Result<String> {
    let document = load_document(input)?;
    Ok(serde_json::to_string_pretty(document.info())?)
}
