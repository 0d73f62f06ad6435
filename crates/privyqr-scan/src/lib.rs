// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// privyqr-scan — Scan orchestration for the PrivyQR engine.
//
// Drives the decode backend chain over single images (files, pasted rasters,
// camera frames), multi-page documents (full-page decode with an
// overlapping-tile retry), and live camera sessions (repeating frame loop
// with cancellation).

pub mod document;
pub mod image;
pub mod live;

pub use self::document::{DocumentScanner, PageRenderer, PdfiumRenderer, scan_pdf_file};
pub use self::image::ImageScanner;
pub use self::live::{CancelHandle, FrameSource, LiveScanSession};
