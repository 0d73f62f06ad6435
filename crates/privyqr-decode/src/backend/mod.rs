// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decode backend chain. Backends expose a uniform "one raster in, maybe one
// payload out" contract, and the stack tries them in strict order so that
// additional backends slot in without touching any classification logic.

pub mod multi_format;
pub mod qr_pixel;

use image::DynamicImage;
use privyqr_core::config::DecodeConfig;
use privyqr_core::error::PrivyQrError;
use serde::Serialize;
use tracing::{debug, warn};

pub use multi_format::MultiFormatBackend;
pub use qr_pixel::QrPixelBackend;

/// One decode attempt strategy.
///
/// `Ok(Some(text))` is a successful decode, `Ok(None)` a definitive
/// "no code found". `Err` is reserved for unexpected backend failures —
/// callers treat it like a miss for control flow, but it is counted
/// separately so a permanently broken backend stays visible.
pub trait DecodeBackend: Send {
    fn name(&self) -> &'static str;

    fn decode(&mut self, image: &DynamicImage) -> Result<Option<String>, PrivyQrError>;

    /// Release any reusable reader state. Default no-op for stateless
    /// backends.
    fn reset(&mut self) {}
}

/// Decode outcome counters for one stack.
///
/// "No code present" and "a backend threw" collapse to the same caller-visible
/// empty result, so these counters are the only place the difference survives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TelemetrySnapshot {
    /// Images where some backend produced a payload.
    pub decoded: u64,
    /// Images where every backend reported a definitive miss.
    pub not_found: u64,
    /// Individual backend failures (not per-image; one image may count
    /// several if multiple backends fail).
    pub backend_errors: u64,
}

impl TelemetrySnapshot {
    /// Combine counters from two stacks (e.g. the file path and the live
    /// frame path of one session).
    pub fn merged(self, other: TelemetrySnapshot) -> TelemetrySnapshot {
        TelemetrySnapshot {
            decoded: self.decoded + other.decoded,
            not_found: self.not_found + other.not_found,
            backend_errors: self.backend_errors + other.backend_errors,
        }
    }
}

/// An ordered chain of decode backends with fallback.
///
/// The stack itself never fails: a backend error is logged, counted, and
/// treated as a miss so the next backend gets its turn.
pub struct DecoderStack {
    backends: Vec<Box<dyn DecodeBackend>>,
    telemetry: TelemetrySnapshot,
}

impl DecoderStack {
    /// The full chain used for file scans: the multi-format reader first,
    /// then the raw-pixel QR reader as fallback.
    pub fn full(config: &DecodeConfig) -> Self {
        Self::with_backends(vec![
            Box::new(MultiFormatBackend::new(config)),
            Box::new(QrPixelBackend::new()),
        ])
    }

    /// The low-latency chain used for camera frames and document pages:
    /// the raw-pixel QR reader only.
    pub fn qr_only() -> Self {
        Self::with_backends(vec![Box::new(QrPixelBackend::new())])
    }

    /// Build a stack from an explicit backend list. The list order is the
    /// fallback order.
    pub fn with_backends(backends: Vec<Box<dyn DecodeBackend>>) -> Self {
        Self {
            backends,
            telemetry: TelemetrySnapshot::default(),
        }
    }

    /// Try each backend in order; return the first decoded payload.
    pub fn decode(&mut self, image: &DynamicImage) -> Option<String> {
        for backend in &mut self.backends {
            match backend.decode(image) {
                Ok(Some(text)) => {
                    debug!(backend = backend.name(), len = text.len(), "decode hit");
                    self.telemetry.decoded += 1;
                    return Some(text);
                }
                Ok(None) => {
                    debug!(backend = backend.name(), "decode miss");
                }
                Err(err) => {
                    // Unexpected failure — fall through to the next backend.
                    warn!(backend = backend.name(), error = %err, "decode backend failed");
                    self.telemetry.backend_errors += 1;
                }
            }
        }
        self.telemetry.not_found += 1;
        None
    }

    /// Current outcome counters.
    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry
    }

    /// Reset all reusable backend reader state.
    pub fn reset(&mut self) {
        for backend in &mut self.backends {
            backend.reset();
        }
    }
}

impl std::fmt::Debug for DecoderStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderStack")
            .field(
                "backends",
                &self
                    .backends
                    .iter()
                    .map(|backend| backend.name())
                    .collect::<Vec<_>>(),
            )
            .field("telemetry", &self.telemetry)
            .finish()
    }
}
