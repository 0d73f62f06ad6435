// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// privyqr-decode — Barcode decoding for the PrivyQR engine.
//
// Provides the decode backend chain (a general multi-format reader with a
// raw-pixel QR reader as fallback), content classification, and per-category
// payload extraction.

pub mod backend;
pub mod classify;
pub mod metadata;

pub use backend::{DecodeBackend, DecoderStack, TelemetrySnapshot};
pub use backend::multi_format::MultiFormatBackend;
pub use backend::qr_pixel::QrPixelBackend;
pub use classify::classify;
pub use metadata::extract;

use privyqr_core::types::{FORMAT_QR_CODE, ScanResult};

/// Assemble a [`ScanResult`] from raw decoded text: classify the content,
/// extract the typed payload, and attach the symbology label.
///
/// Extraction is best-effort — a result with an empty payload is still valid.
pub fn parse_scan_result(text: impl Into<String>) -> ScanResult {
    let text = text.into();
    let kind = classify::classify(&text);
    let payload = metadata::extract(&text, kind);
    ScanResult {
        text,
        format: FORMAT_QR_CODE.to_owned(),
        payload,
    }
}
