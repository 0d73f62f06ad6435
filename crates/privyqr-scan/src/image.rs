// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image scan orchestrator — single files, pasted rasters, and camera frames.

use std::path::Path;

use image::DynamicImage;
use privyqr_core::config::ScanConfig;
use privyqr_core::types::{InputKind, ScanResult, SessionInfo};
use privyqr_decode::backend::{DecoderStack, TelemetrySnapshot};
use privyqr_decode::parse_scan_result;
use tracing::{debug, info, instrument, warn};

/// Scans single raster inputs for one session (one file batch or one live
/// camera view).
///
/// Two decode paths exist: files and pasted images go through the full
/// backend chain (multi-format reader, then raw-pixel QR fallback), while
/// camera frames use the raw-pixel reader alone for lower per-frame latency.
///
/// Never fails past its boundary: unreadable bytes, unsupported inputs, and
/// images without a code all resolve to `None`. Batch callers process files
/// strictly sequentially with a single scanner, which bounds peak memory to
/// one raster at a time and keeps the reusable reader single-owner.
pub struct ImageScanner {
    session: SessionInfo,
    stack: DecoderStack,
    frame_stack: DecoderStack,
}

impl ImageScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_stacks(DecoderStack::full(&config.decode), DecoderStack::qr_only())
    }

    /// Build a scanner with explicit backend chains: `stack` serves file
    /// scans, `frame_stack` serves camera frames.
    pub fn with_stacks(stack: DecoderStack, frame_stack: DecoderStack) -> Self {
        let session = SessionInfo::start();
        debug!(session = %session.id, "image scan session started");
        Self {
            session,
            stack,
            frame_stack,
        }
    }

    /// Scan an image file from disk.
    ///
    /// Returns `None` for unsupported extensions, unreadable files, and
    /// files without a decodable code — batch mode skips malformed files
    /// rather than aborting.
    pub async fn scan_file(&mut self, path: impl AsRef<Path>) -> Option<ScanResult> {
        let path = path.as_ref();

        let kind = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(InputKind::from_extension);
        match kind {
            Some(kind) if kind.is_image() => {}
            Some(_) => {
                warn!(path = %path.display(), "paged document given to the image scanner");
                return None;
            }
            None => {
                warn!(path = %path.display(), "unsupported input extension");
                return None;
            }
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read input file");
                return None;
            }
        };

        self.scan_bytes(&bytes)
    }

    /// Scan encoded image bytes (JPEG, PNG, GIF, BMP, WebP).
    #[instrument(skip_all, fields(session = %self.session.id, data_len = bytes.len()))]
    pub fn scan_bytes(&mut self, bytes: &[u8]) -> Option<ScanResult> {
        let image = match image::load_from_memory(bytes) {
            Ok(image) => image,
            Err(err) => {
                warn!(error = %err, "undecodable image bytes; treating as no result");
                return None;
            }
        };
        self.scan_image(&image)
    }

    /// Scan an already-decoded raster through the full backend chain.
    pub fn scan_image(&mut self, image: &DynamicImage) -> Option<ScanResult> {
        let result = self.stack.decode(image).map(parse_scan_result);
        if let Some(result) = &result {
            info!(kind = %result.kind(), "code decoded");
        }
        result
    }

    /// Scan a single camera frame — raw-pixel backend only. Callers invoke
    /// this once per presented frame until a result appears or the view
    /// closes.
    pub fn scan_frame(&mut self, frame: &DynamicImage) -> Option<ScanResult> {
        self.frame_stack.decode(frame).map(parse_scan_result)
    }

    /// Combined decode outcome counters for both paths.
    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.stack.telemetry().merged(self.frame_stack.telemetry())
    }

    /// Release reusable backend reader state, keeping the scanner usable for
    /// another batch.
    pub fn reset(&mut self) {
        self.stack.reset();
        self.frame_stack.reset();
    }
}

impl Drop for ImageScanner {
    fn drop(&mut self) {
        self.reset();
        debug!(
            session = %self.session.id,
            telemetry = ?self.telemetry(),
            "image scan session closed"
        );
    }
}
