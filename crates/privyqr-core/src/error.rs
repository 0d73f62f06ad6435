// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for PrivyQR.
//
// A missing QR code is never an error — orchestrators surface that as an
// empty result. This enum covers the genuinely exceptional conditions:
// unreadable containers, rendering failures, and backend faults.

use thiserror::Error;

/// Top-level error type for all PrivyQR operations.
#[derive(Debug, Error)]
pub enum PrivyQrError {
    // -- Input errors --
    #[error("unsupported input type: {0}")]
    UnsupportedInput(String),

    #[error("image decoding failed: {0}")]
    ImageDecode(String),

    // -- Document errors --
    #[error("PDF rendering failed: {0}")]
    PdfRender(String),

    // -- Decoder errors --
    #[error("decode backend failure: {0}")]
    Decoder(String),

    // -- Runtime / I/O --
    #[error("background task failed: {0}")]
    Task(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrivyQrError>;
