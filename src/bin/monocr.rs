//! Command-line front end for Mon text recognition.
//!
//! # Usage
//!
//! ```bash
//! monocr [OPTIONS] <INPUTS>...
//! ```
//!
//! Images are read page by page; PDFs are rasterized with `pdftoppm` first.
//! Without `--model` / `--charset` the published model is downloaded into the
//! cache directory on first use.
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=info monocr -f json -o out.json scan.pdf page.png
//! ```

use clap::{Parser, ValueEnum};
use monocr::core::config::{OrtExecutionProvider, OrtSessionConfig};
use monocr::pipeline::{BatchResult, ConfigLoader, MonOCRBuilder, MonOCRConfig, PageResult};
use monocr::utils::init_tracing;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Recognize Mon text in images and PDFs
#[derive(Parser)]
#[command(name = "monocr", version)]
#[command(about = "Recognize Mon text in images and PDFs")]
struct Args {
    /// Image or PDF files to read
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Path to the ONNX recognition model
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Path to the charset file
    #[arg(short, long)]
    charset: Option<PathBuf>,

    /// Directory for downloaded model files
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// TOML or JSON configuration file; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference text file; prints the accuracy of each input against it
    #[arg(long)]
    ground_truth: Option<PathBuf>,

    /// Device to use for inference (e.g., 'cpu', 'cuda', 'cuda:0')
    #[arg(long, default_value = "cpu")]
    device: String,

    /// Print pipeline statistics to stderr when done
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct DocumentOutput<'a> {
    input: &'a Path,
    pages: Vec<PageOutput>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum PageOutput {
    Page(PageResult),
    Failed { error: String },
}

/// Parse device string and create the matching ONNX execution providers.
fn parse_device(device: &str) -> Result<Vec<OrtExecutionProvider>, Box<dyn std::error::Error>> {
    let device = device.to_lowercase();
    let device_id = if device == "cpu" {
        return Ok(vec![OrtExecutionProvider::CPU]);
    } else if device == "cuda" {
        0
    } else if let Some(id) = device.strip_prefix("cuda:") {
        id.parse::<i32>()
            .map_err(|_| format!("Invalid CUDA device ID: {id}"))?
    } else {
        return Err(format!(
            "Unsupported device: {device}. Supported devices: cpu, cuda, cuda:N"
        )
        .into());
    };

    if cfg!(not(feature = "cuda")) {
        warn!("CUDA support not compiled in. Falling back to CPU.");
        return Ok(vec![OrtExecutionProvider::CPU]);
    }
    Ok(vec![
        OrtExecutionProvider::CUDA {
            device_id: Some(device_id),
        },
        OrtExecutionProvider::CPU,
    ])
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn page_outputs(results: BatchResult) -> Vec<PageOutput> {
    results
        .into_iter()
        .map(|result| match result {
            Ok(page) => PageOutput::Page(page),
            Err(err) => PageOutput::Failed {
                error: err.to_string(),
            },
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => MonOCRConfig::default(),
    };
    let mut builder = MonOCRBuilder::from_config(config);
    if let Some(model) = &args.model {
        builder = builder.model_path(model);
    }
    if let Some(charset) = &args.charset {
        builder = builder.charset_path(charset);
    }
    if let Some(dir) = &args.cache_dir {
        builder = builder.cache_dir(dir);
    }
    let mut ort = builder.config().model.ort_session.clone().unwrap_or_default();
    ort.execution_providers = Some(parse_device(&args.device)?);
    let builder = builder.ort_session(ort);

    let ocr = builder.build()?;
    info!(inputs = args.inputs.len(), "recognizer ready");

    let ground_truth = args
        .ground_truth
        .as_deref()
        .map(std::fs::read_to_string)
        .transpose()?;

    let mut documents = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let pages = if is_pdf(input) {
            match ocr.read_pdf(input) {
                Ok(results) => page_outputs(results),
                Err(err) => vec![PageOutput::Failed {
                    error: err.to_string(),
                }],
            }
        } else {
            page_outputs(ocr.predict_batch(std::slice::from_ref(input)))
        };
        documents.push(DocumentOutput { input, pages });
    }

    let mut failures = 0usize;
    let mut rendered = String::new();
    match args.format {
        OutputFormat::Json => {
            rendered = serde_json::to_string_pretty(&documents)?;
            rendered.push('\n');
        }
        OutputFormat::Text => {
            for doc in &documents {
                if args.inputs.len() > 1 {
                    rendered.push_str(&format!("==> {} <==\n", doc.input.display()));
                }
                for page in &doc.pages {
                    if let PageOutput::Page(page) = page {
                        rendered.push_str(&page.text());
                        rendered.push('\n');
                    }
                }
            }
        }
    }

    for doc in &documents {
        for page in &doc.pages {
            if let PageOutput::Failed { error: message } = page {
                failures += 1;
                error!(input = %doc.input.display(), "{message}");
            }
        }
        if let Some(truth) = &ground_truth {
            let text = doc
                .pages
                .iter()
                .filter_map(|page| match page {
                    PageOutput::Page(page) => Some(page.text()),
                    PageOutput::Failed { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n");
            let accuracy = monocr::utils::calculate_accuracy(text.trim(), truth.trim());
            eprintln!("{}: accuracy {:.2}%", doc.input.display(), accuracy);
        }
    }

    match &args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => std::io::stdout().lock().write_all(rendered.as_bytes())?,
    }

    if args.verbose {
        eprint!("{}", ocr.stats());
    }

    if failures > 0 {
        return Err(format!("{failures} page(s) could not be read").into());
    }
    Ok(())
}
