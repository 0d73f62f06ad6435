// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document scan orchestrator — scans every page of a multi-page document,
// returning only the pages where at least one code was found.
//
// Per page: rasterise at an upscaling factor, attempt one full-page decode,
// and only if that misses, retry over an overlapping tile grid with
// text-equality dedup (overlapping tiles commonly see the same code twice).

pub mod render;
pub mod tiles;

use std::path::PathBuf;

use image::DynamicImage;
use privyqr_core::config::DocumentScanConfig;
use privyqr_core::error::{PrivyQrError, Result};
use privyqr_core::types::{PageScanResult, ScanProgress, ScanResult, SessionInfo};
use privyqr_decode::backend::DecoderStack;
use privyqr_decode::parse_scan_result;
use tracing::{debug, info, instrument, warn};

pub use render::{PageRenderer, PdfiumRenderer, bind_pdfium};
pub use tiles::{TileRect, tile_grid};

/// Scans multi-page documents page by page.
///
/// Uses the raw-pixel QR backend only — pages are decoded repeatedly (full
/// page plus up to a grid of tiles), so the low-latency path matters more
/// than multi-symbology coverage here.
pub struct DocumentScanner {
    session: SessionInfo,
    config: DocumentScanConfig,
    stack: DecoderStack,
}

impl DocumentScanner {
    pub fn new(config: DocumentScanConfig) -> Self {
        Self::with_stack(config, DecoderStack::qr_only())
    }

    /// Build a scanner with an explicit decode chain.
    pub fn with_stack(config: DocumentScanConfig, stack: DecoderStack) -> Self {
        Self {
            session: SessionInfo::start(),
            config,
            stack,
        }
    }

    /// Scan every page of the document.
    ///
    /// `on_progress` is invoked after each page with the advisory completion
    /// fraction; it never affects control flow. A page that fails to render
    /// is logged and treated as zero codes — one bad page never aborts the
    /// document.
    #[instrument(skip_all, fields(session = %self.session.id))]
    pub fn scan<R: PageRenderer + ?Sized>(
        &mut self,
        renderer: &R,
        mut on_progress: impl FnMut(ScanProgress),
    ) -> Vec<PageScanResult> {
        let total = renderer.page_count();
        info!(total, scale = self.config.render_scale, "document scan started");

        let mut pages = Vec::new();
        for page_number in 1..=total {
            match renderer.render_page(page_number, self.config.render_scale) {
                Ok(page) => {
                    let results = self.scan_page(&page);
                    if !results.is_empty() {
                        pages.push(PageScanResult {
                            page_number,
                            results,
                        });
                    }
                }
                Err(err) => {
                    warn!(page_number, error = %err, "page render failed; skipping page");
                }
            }
            on_progress(ScanProgress {
                page: page_number,
                total,
            });
        }

        info!(
            pages_with_codes = pages.len(),
            telemetry = ?self.stack.telemetry(),
            "document scan complete"
        );
        pages
    }

    /// Scan one rendered page: full-page decode first, tile retry on miss.
    fn scan_page(&mut self, page: &DynamicImage) -> Vec<ScanResult> {
        let mut results: Vec<ScanResult> = Vec::new();

        if let Some(text) = self.stack.decode(page) {
            // Full-page hit: record it and skip tiling entirely.
            results.push(parse_scan_result(text));
            return results;
        }

        let grid = tile_grid(page.width(), page.height(), &self.config.tile);
        debug!(tiles = grid.len(), "full-page miss; retrying over tiles");
        for tile in grid {
            let region = page.crop_imm(tile.x, tile.y, tile.width, tile.height);
            if let Some(text) = self.stack.decode(&region) {
                // Overlapping tiles see the same code more than once;
                // dedup by exact payload text.
                if !results.iter().any(|existing| existing.text == text) {
                    results.push(parse_scan_result(text));
                }
            }
        }
        results
    }
}

/// Scan a PDF file from disk, end to end.
///
/// Binds pdfium, loads the document, and runs the scan on the blocking
/// thread pool (pdfium is not async-safe). An unloadable document is an
/// error; everything past loading degrades per-page.
pub async fn scan_pdf_file<F>(
    path: impl Into<PathBuf>,
    config: DocumentScanConfig,
    on_progress: F,
) -> Result<Vec<PageScanResult>>
where
    F: FnMut(ScanProgress) + Send + 'static,
{
    let path = path.into();
    tokio::task::spawn_blocking(move || -> Result<Vec<PageScanResult>> {
        let pdfium = bind_pdfium()?;
        let renderer = PdfiumRenderer::load(&pdfium, &path)?;
        let mut scanner = DocumentScanner::new(config);
        Ok(scanner.scan(&renderer, on_progress))
    })
    .await
    .map_err(|err| PrivyQrError::Task(format!("document scan task: {err}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{GrayImage, Luma};
    use privyqr_core::config::TileConfig;
    use privyqr_decode::backend::DecodeBackend;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Synthetic pages carry their payload as a marker block in the top-left
    // corner; the scripted backend below "decodes" any raster whose top-left
    // pixel is non-zero. Marker 0 = blank page. The 150px block spans
    // several overlapping tiles, mimicking a code that multiple tiles see.
    fn page_with_marker(marker: u8, width: u32, height: u32) -> DynamicImage {
        let mut image = GrayImage::from_pixel(width, height, Luma([0u8]));
        if marker != 0 {
            for y in 0..height.min(150) {
                for x in 0..width.min(150) {
                    image.put_pixel(x, y, Luma([marker]));
                }
            }
        }
        DynamicImage::ImageLuma8(image)
    }

    /// Decodes the top-left marker pixel, optionally refusing full-size
    /// pages (to force the tile retry path).
    struct MarkerBackend {
        calls: Arc<AtomicUsize>,
        refuse_full_page: Option<(u32, u32)>,
    }

    impl DecodeBackend for MarkerBackend {
        fn name(&self) -> &'static str {
            "marker"
        }

        fn decode(
            &mut self,
            image: &DynamicImage,
        ) -> std::result::Result<Option<String>, PrivyQrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.refuse_full_page == Some((image.width(), image.height())) {
                return Ok(None);
            }
            let marker = image.to_luma8().get_pixel(0, 0).0[0];
            Ok((marker != 0).then(|| format!("marker-{marker}")))
        }
    }

    fn scanner_with_backend(
        refuse_full_page: Option<(u32, u32)>,
    ) -> (DocumentScanner, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = MarkerBackend {
            calls: Arc::clone(&calls),
            refuse_full_page,
        };
        let scanner = DocumentScanner::with_stack(
            DocumentScanConfig::default(),
            DecoderStack::with_backends(vec![Box::new(backend)]),
        );
        (scanner, calls)
    }

    /// Renderer over a fixed set of synthetic pages; entries of `None`
    /// simulate corrupt pages that fail to render.
    struct FakeRenderer {
        pages: Vec<Option<DynamicImage>>,
    }

    impl PageRenderer for FakeRenderer {
        fn page_count(&self) -> u32 {
            self.pages.len() as u32
        }

        fn render_page(&self, page_number: u32, _scale: f32) -> Result<DynamicImage> {
            match self.pages.get((page_number - 1) as usize) {
                Some(Some(image)) => Ok(image.clone()),
                _ => Err(PrivyQrError::PdfRender(format!(
                    "synthetic render failure on page {page_number}"
                ))),
            }
        }
    }

    #[test]
    fn full_page_hit_skips_tiling() {
        let (mut scanner, calls) = scanner_with_backend(None);
        let renderer = FakeRenderer {
            pages: vec![Some(page_with_marker(7, 400, 400))],
        };

        let pages = scanner.scan(&renderer, |_| {});
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].results.len(), 1);
        assert_eq!(pages[0].results[0].text, "marker-7");
        // Exactly one decode call: the full page. No tile was ever decoded.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn full_page_miss_finds_code_in_tiles_and_dedups() {
        // Refuse the 400x400 full page so only tiles can hit. The marker
        // block spans four overlapping tiles, each decoding the same text —
        // the page must still report it exactly once.
        let (mut scanner, calls) = scanner_with_backend(Some((400, 400)));
        let renderer = FakeRenderer {
            pages: vec![Some(page_with_marker(9, 400, 400))],
        };

        let pages = scanner.scan(&renderer, |_| {});
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].results.len(), 1, "duplicate tile hits must dedup");
        assert_eq!(pages[0].results[0].text, "marker-9");
        // Full page plus every tile was attempted.
        assert!(calls.load(Ordering::SeqCst) > 1);
    }

    #[test]
    fn pages_without_codes_are_omitted_entirely() {
        let (mut scanner, _) = scanner_with_backend(None);
        let renderer = FakeRenderer {
            pages: vec![
                Some(page_with_marker(0, 400, 400)), // blank
                Some(page_with_marker(3, 400, 400)),
                Some(page_with_marker(0, 400, 400)), // blank
            ],
        };

        let pages = scanner.scan(&renderer, |_| {});
        // Absence of an entry, not an empty entry, signals "no codes".
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 2);
    }

    #[test]
    fn render_failure_is_isolated_to_its_page() {
        let (mut scanner, _) = scanner_with_backend(None);
        let renderer = FakeRenderer {
            pages: vec![
                Some(page_with_marker(1, 400, 400)),
                None, // corrupt page
                Some(page_with_marker(2, 400, 400)),
            ],
        };

        let pages = scanner.scan(&renderer, |_| {});
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[1].page_number, 3);
    }

    #[test]
    fn progress_is_reported_after_every_page() {
        let (mut scanner, _) = scanner_with_backend(None);
        let renderer = FakeRenderer {
            pages: vec![
                Some(page_with_marker(0, 400, 400)),
                None,
                Some(page_with_marker(5, 400, 400)),
            ],
        };

        let mut seen = Vec::new();
        scanner.scan(&renderer, |progress| seen.push(progress));
        assert_eq!(
            seen,
            vec![
                ScanProgress { page: 1, total: 3 },
                ScanProgress { page: 2, total: 3 },
                ScanProgress { page: 3, total: 3 },
            ]
        );
        assert!((seen[2].fraction() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_document_yields_no_pages_and_no_progress() {
        let (mut scanner, calls) = scanner_with_backend(None);
        let renderer = FakeRenderer { pages: Vec::new() };

        let mut progress_calls = 0;
        let pages = scanner.scan(&renderer, |_| progress_calls += 1);
        assert!(pages.is_empty());
        assert_eq!(progress_calls, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn tile_config_flows_through_to_the_grid() {
        // A page smaller than one tile stride generates no tiles at all, so
        // a full-page miss stays a miss.
        let (mut scanner_small, _) = scanner_with_backend(Some((30, 30)));
        scanner_small.config.tile = TileConfig {
            size_divisor: 1,
            stride_divisor: 1,
        };
        let renderer = FakeRenderer {
            pages: vec![Some(page_with_marker(4, 30, 30))],
        };
        let pages = scanner_small.scan(&renderer, |_| {});
        assert!(pages.is_empty());
    }
}
