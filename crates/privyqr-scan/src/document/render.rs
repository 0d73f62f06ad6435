// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterization seam. The document scanner only depends on the
// `PageRenderer` trait, so the rendering backend can be swapped (and tests
// can use synthetic pages) without touching the scan logic. Production
// rendering goes through pdfium via the `pdfium-render` bindings.

use std::path::Path;

use image::DynamicImage;
use pdfium_render::prelude::*;
use privyqr_core::error::{PrivyQrError, Result};
use tracing::{debug, info, instrument};

/// Renders document pages to raster images.
pub trait PageRenderer {
    /// Total number of pages in the document.
    fn page_count(&self) -> u32;

    /// Render one page (1-based) at the given upscaling factor.
    fn render_page(&self, page_number: u32, scale: f32) -> Result<DynamicImage>;
}

/// Bind the pdfium library: prefer a bundled copy next to the executable,
/// fall back to the system library.
pub fn bind_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|err| {
            PrivyQrError::PdfRender(format!("failed to bind pdfium library: {err}"))
        })?;
    Ok(Pdfium::new(bindings))
}

/// [`PageRenderer`] backed by a loaded pdfium document.
pub struct PdfiumRenderer<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumRenderer<'a> {
    /// Load a PDF from disk.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(pdfium: &'a Pdfium, path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = pdfium.load_pdf_from_file(path_ref, None).map_err(|err| {
            PrivyQrError::PdfRender(format!(
                "failed to open {}: {}",
                path_ref.display(),
                err
            ))
        })?;
        info!(pages = document.pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    /// Wrap an already-loaded pdfium document.
    pub fn from_document(document: PdfDocument<'a>) -> Self {
        Self { document }
    }
}

impl PageRenderer for PdfiumRenderer<'_> {
    fn page_count(&self) -> u32 {
        self.document.pages().len() as u32
    }

    fn render_page(&self, page_number: u32, scale: f32) -> Result<DynamicImage> {
        if page_number == 0 || page_number > self.page_count() {
            return Err(PrivyQrError::PdfRender(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                self.page_count()
            )));
        }

        let page = self
            .document
            .pages()
            .get((page_number - 1) as u16)
            .map_err(|err| {
                PrivyQrError::PdfRender(format!("cannot open page {page_number}: {err}"))
            })?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page.render_with_config(&config).map_err(|err| {
            PrivyQrError::PdfRender(format!("failed to render page {page_number}: {err}"))
        })?;

        let image = bitmap.as_image();
        debug!(
            page_number,
            width = image.width(),
            height = image.height(),
            "page rendered"
        );
        Ok(image)
    }
}
