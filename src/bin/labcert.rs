// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use labcert::error::{Context as _, Error};
use labcert::{CertificateBundle, CertificateData, CertificateMapper, Leniency};

#[derive(Parser, Debug)]
#[command(name = "labcert")]
#[command(about = "Compute, preview and export laboratory test certificates", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the certificate HTML
    Preview {
        /// Certificate bundle (JSON)
        #[arg(value_name = "BUNDLE")]
        bundle: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Fail on missing specimen readings instead of treating them as zero
        #[arg(long)]
        strict: bool,
    },
    /// Export the certificate as an A4 PDF
    Pdf {
        #[arg(value_name = "BUNDLE")]
        bundle: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Renderer configuration (JSON); LABCERT_* variables override it
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        strict: bool,
    },
    /// Print page count and page sizes of a PDF
    Inspect {
        #[arg(value_name = "FILE")]
        pdf: PathBuf,
    },
    /// Print the resolved template fields as JSON
    Fields {
        #[arg(value_name = "BUNDLE")]
        bundle: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,labcert={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Command) -> Result<(), Error> {
    match command {
        Command::Preview {
            bundle,
            output,
            strict,
        } => {
            let data = load_certificate(&bundle, strict)?;
            let html = labcert::export::preview(&data)?;
            match output {
                Some(path) => std::fs::write(&path, html)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => std::io::stdout()
                    .write_all(html.as_bytes())
                    .context("Failed to write to stdout")?,
            }
        }
        Command::Pdf {
            bundle,
            output,
            config,
            strict,
        } => {
            let data = load_certificate(&bundle, strict)?;
            let pdf = render_pdf(&data, config.as_deref())?;
            std::fs::write(&output, &pdf)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {} ({} bytes)", output.display(), pdf.len());
        }
        Command::Inspect { pdf } => {
            let bytes = std::fs::read(&pdf)
                .with_context(|| format!("Failed to read {}", pdf.display()))?;
            let summary = labcert::inspect::summarize(&bytes)?;
            println!("PDF version: {}", summary.version);
            if let Some(producer) = &summary.producer {
                println!("Producer: {}", producer);
            }
            println!("Pages: {}", summary.page_count());
            for (i, page) in summary.pages.iter().enumerate() {
                println!("  Page {}: {:.2} x {:.2} pt", i + 1, page.width, page.height);
            }
        }
        Command::Fields { bundle } => {
            let data = load_certificate(&bundle, false)?;
            let fields: serde_json::Map<String, serde_json::Value> = data
                .fields()
                .iter()
                .map(|(name, value)| (name.to_string(), value.as_str().into()))
                .collect();
            let json = serde_json::to_string_pretty(&fields)
                .context("Failed to serialize fields")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn load_certificate(path: &Path, strict: bool) -> Result<CertificateData, Error> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read bundle {}", path.display()))?;
    let bundle: CertificateBundle = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid bundle {}", path.display()))?;
    let leniency = if strict {
        Leniency::Strict
    } else {
        Leniency::Lenient
    };
    CertificateMapper::new()
        .with_leniency(leniency)
        .map(bundle.sources())
}

#[cfg(feature = "pdf")]
fn render_pdf(data: &CertificateData, config: Option<&Path>) -> Result<Vec<u8>, Error> {
    let mut cfg = match config {
        Some(path) => labcert::RendererConfig::from_file(path)?,
        None => labcert::RendererConfig::default(),
    };
    cfg.apply_env(|key| std::env::var(key).ok())?;
    let renderer = labcert::PdfRenderer::chrome(cfg)?;
    let pdf = renderer.render_pdf(data);
    renderer.close()?;
    pdf
}

#[cfg(not(feature = "pdf"))]
fn render_pdf(_data: &CertificateData, _config: Option<&Path>) -> Result<Vec<u8>, Error> {
    Err(Error::new(
        "labcert was built without the `pdf` feature",
        labcert::ErrorKind::Internal,
    ))
}
