// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PrivyQR command line — scan QR codes out of image and PDF files, entirely
// on-device, and print a JSON report.
//
// Entry point. Initialises logging, then processes inputs strictly in
// order: one file fully resolved before the next begins.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;

use privyqr_core::config::{DocumentScanConfig, ScanConfig};
use privyqr_core::error::Result;
use privyqr_core::types::{InputKind, PageScanResult, ScanResult};
use privyqr_scan::{ImageScanner, scan_pdf_file};

#[derive(Debug, Parser)]
#[command(name = "privyqr", version, about = "Private, on-device QR scanning for images and PDFs")]
struct Cli {
    /// Image (JPEG/PNG/GIF/BMP/WebP) or PDF files to scan.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,

    /// Upscaling factor applied when rasterising PDF pages.
    #[arg(long, default_value_t = 2.0)]
    render_scale: f32,
}

/// One report entry per input file.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum FileReport {
    Image {
        file: String,
        results: Vec<ScanResult>,
    },
    Document {
        file: String,
        pages: Vec<PageScanResult>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ScanConfig::default();

    // One scanner per batch; files are processed strictly sequentially so
    // only one raster is live at a time.
    let mut scanner = ImageScanner::new(&config);
    let mut reports = Vec::with_capacity(cli.inputs.len());

    for path in &cli.inputs {
        let file = path.display().to_string();
        tracing::info!(file, "scanning");

        if input_kind(path) == Some(InputKind::Pdf) {
            let doc_config = DocumentScanConfig {
                render_scale: cli.render_scale,
                ..config.document.clone()
            };
            let pages = match scan_pdf_file(path.clone(), doc_config, |progress| {
                tracing::debug!(
                    page = progress.page,
                    total = progress.total,
                    "page scanned"
                );
            })
            .await
            {
                Ok(pages) => pages,
                Err(err) => {
                    tracing::error!(file, error = %err, "document scan failed");
                    Vec::new()
                }
            };
            reports.push(FileReport::Document { file, pages });
        } else {
            // Unsupported and unreadable files surface as zero results, so
            // one bad file never aborts the batch.
            let results = scanner.scan_file(path).await.into_iter().collect();
            reports.push(FileReport::Image { file, results });
        }
    }

    tracing::debug!(telemetry = ?scanner.telemetry(), "batch complete");

    let json = if cli.pretty {
        serde_json::to_string_pretty(&reports)?
    } else {
        serde_json::to_string(&reports)?
    };
    println!("{json}");

    Ok(())
}

fn input_kind(path: &Path) -> Option<InputKind> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(InputKind::from_extension)
}
