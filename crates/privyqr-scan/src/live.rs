// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Live camera scanning — a repeating capture-decode loop keyed to the frame
// source's cadence. Each iteration takes one frame and attempts one decode;
// the loop ends on the first hit, on cancellation, or when the source runs
// dry. A decode that resolves after cancellation is discarded, never
// delivered.

use image::DynamicImage;
use privyqr_core::types::{ScanResult, SessionInfo};
use privyqr_decode::backend::{DecoderStack, TelemetrySnapshot};
use privyqr_decode::parse_scan_result;
use tokio::sync::watch;
use tracing::{debug, info};

/// Source of camera frames. The capture device itself is an external
/// collaborator; dropping the source is expected to stop the capture.
pub trait FrameSource: Send {
    /// Yield the next presented frame, or `None` when the stream ends.
    fn next_frame(&mut self) -> impl Future<Output = Option<DynamicImage>> + Send;
}

/// Cancels a running [`LiveScanSession`].
///
/// Dropping the handle also cancels the session — closing the scanner view
/// must never leave a capture loop running.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// One live scanning session over a frame source.
///
/// Decodes with the raw-pixel QR backend only — per-frame latency matters
/// more than multi-symbology coverage, and the caller retries on the next
/// frame anyway.
pub struct LiveScanSession {
    session: SessionInfo,
    stack: DecoderStack,
    cancel_rx: watch::Receiver<bool>,
}

impl LiveScanSession {
    pub fn new() -> (Self, CancelHandle) {
        Self::with_stack(DecoderStack::qr_only())
    }

    /// Build a session with an explicit decode chain.
    pub fn with_stack(stack: DecoderStack) -> (Self, CancelHandle) {
        let (tx, cancel_rx) = watch::channel(false);
        let session = Self {
            session: SessionInfo::start(),
            stack,
            cancel_rx,
        };
        (session, CancelHandle { tx })
    }

    /// Run the capture-decode loop to completion.
    ///
    /// Returns the first decoded result, or `None` on cancellation or
    /// stream end. Consumes the session and the source; dropping the source
    /// on return stops the capture device.
    pub async fn run<S: FrameSource>(mut self, mut source: S) -> Option<ScanResult> {
        info!(session = %self.session.id, "live scan session started");

        loop {
            if *self.cancel_rx.borrow() {
                debug!(session = %self.session.id, "session cancelled before capture");
                return None;
            }

            let frame = tokio::select! {
                // Any change — or the handle being dropped — is cancellation.
                _ = self.cancel_rx.changed() => {
                    debug!(session = %self.session.id, "session cancelled while awaiting frame");
                    return None;
                }
                frame = source.next_frame() => frame?,
            };

            let decoded = self.stack.decode(&frame);

            if *self.cancel_rx.borrow() {
                // Cancellation raced the decode; the result must not reach
                // the caller.
                debug!(session = %self.session.id, "discarding decode completed after cancellation");
                return None;
            }

            if let Some(text) = decoded {
                info!(session = %self.session.id, "live scan hit");
                return Some(parse_scan_result(text));
            }

            // Miss: yield and pick up the next presented frame.
            tokio::task::yield_now().await;
        }
    }

    /// Decode outcome counters so far.
    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.stack.telemetry()
    }
}

impl Drop for LiveScanSession {
    fn drop(&mut self) {
        self.stack.reset();
        debug!(
            session = %self.session.id,
            telemetry = ?self.telemetry(),
            "live scan session closed"
        );
    }
}
