//! letterseg - letter segmentation for OCR word annotations
//!
//! Loads a page image and its Textract word annotations, splits every word
//! into letter boxes with tesseract as the single-character oracle, and
//! writes the results as JSON, a debug overlay and glyph crops.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use letterseg::config::{self, AppConfig};
use letterseg::document::{load_document, PageImage};
use letterseg::export;
use letterseg::vision::{TesseractClassifier, TesseractConfig};
use letterseg::{segment_page, CancelToken};

/// letterseg - classifier-guided letter segmentation
#[derive(Parser, Debug)]
#[command(name = "letterseg")]
#[command(about = "Split OCR word regions into per-letter boxes")]
struct Args {
    /// Page image the annotations refer to
    #[arg(short, long, required_unless_present = "write_default_config")]
    image: Option<PathBuf>,

    /// Textract AnalyzeDocument JSON response
    #[arg(short, long, required_unless_present = "write_default_config")]
    annotations: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Candidate window growth step in pixels
    #[arg(long)]
    increment: Option<u32>,

    /// Worker threads for processing words
    #[arg(long)]
    workers: Option<usize>,

    /// Save the page with letter boxes drawn on it
    #[arg(long)]
    debug_image: Option<PathBuf>,

    /// Export each letter as a PNG into this directory
    #[arg(long)]
    glyph_dir: Option<PathBuf>,

    /// Write the default configuration file and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.write_default_config {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => config::default_config_path()?,
        };
        config::save_config(&AppConfig::default(), &path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let mut config = load_or_default_config(args.config.as_deref())?;
    if let Some(increment) = args.increment {
        config.segmentation.increment_px = increment;
    }
    if let Some(workers) = args.workers {
        config.segmentation.workers = workers;
    }

    // Both are required by clap unless --write-default-config was given
    let image_path = args.image.context("--image is required")?;
    let annotations_path = args.annotations.context("--annotations is required")?;

    let page = PageImage::open(&image_path)
        .with_context(|| format!("Failed to load page image {:?}", image_path))?;
    let words = load_document(&annotations_path)?;
    let (width, height) = page.dimensions();
    info!("Loaded {}x{} page and {} words", width, height, words.len());

    let classifier = TesseractClassifier::new(TesseractConfig::from(&config.classifier));
    match classifier.version() {
        Ok(version) => info!("Using {}", version),
        Err(e) => warn!("Could not query tesseract version: {}", e),
    }

    let result = segment_page(
        &page.image,
        &words,
        &classifier,
        &config.segmentation.scan_config(),
        config.segmentation.workers,
        &CancelToken::new(),
    );

    match &args.output {
        Some(path) => export::write_json(&result, path, config.output.pretty_json)?,
        None => {
            let json = if config.output.pretty_json {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{}", json);
        }
    }

    if let Some(path) = &args.debug_image {
        export::write_overlay(&page.image, &result, path)?;
    }

    if let Some(dir) = &args.glyph_dir {
        export::export_glyphs(
            &page.image,
            &result,
            dir,
            config.output.export_fallback_glyphs,
        )?;
    }

    Ok(())
}

/// Load configuration from an explicit path, the default location, or defaults
fn load_or_default_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        let config = config::load_config(path)?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }

    if let Ok(path) = config::default_config_path() {
        if path.exists() {
            let config = config::load_config(&path)?;
            info!("Loaded configuration from {:?}", path);
            return Ok(config);
        }
    }

    info!("Using default configuration");
    Ok(AppConfig::default())
}
