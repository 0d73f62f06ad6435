// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Multi-format decode backend built on `rxing`, the Rust port of the ZXing
// barcode reader family. Tried first in the fallback chain because it can
// decode many symbologies beyond QR.

use std::collections::HashMap;

use image::DynamicImage;
use privyqr_core::config::DecodeConfig;
use privyqr_core::error::PrivyQrError;
use rxing::common::HybridBinarizer;
use rxing::{
    BinaryBitmap, DecodeHintType, DecodeHintValue, DecodingHintDictionary, Exceptions,
    Luma8LuminanceSource, MultiFormatReader, Reader,
};
use tracing::trace;

use super::DecodeBackend;

/// General-purpose multi-format reader, first in the fallback chain.
///
/// The underlying reader is mutable state reused across calls; it is reset
/// via [`DecodeBackend::reset`] when the owning session ends.
pub struct MultiFormatBackend {
    reader: MultiFormatReader,
    hints: DecodingHintDictionary,
}

impl MultiFormatBackend {
    pub fn new(config: &DecodeConfig) -> Self {
        let mut hints: DecodingHintDictionary = HashMap::new();
        if config.try_harder {
            hints.insert(
                DecodeHintType::TRY_HARDER,
                DecodeHintValue::TryHarder(true),
            );
        }
        Self {
            reader: MultiFormatReader::default(),
            hints,
        }
    }
}

impl DecodeBackend for MultiFormatBackend {
    fn name(&self) -> &'static str {
        "multi-format"
    }

    fn decode(&mut self, image: &DynamicImage) -> Result<Option<String>, PrivyQrError> {
        let luma = image.to_luma8();
        let (width, height) = luma.dimensions();
        trace!(width, height, "multi-format decode attempt");

        let source = Luma8LuminanceSource::new(luma.into_raw(), width, height);
        let mut bitmap = BinaryBitmap::new(HybridBinarizer::new(source));

        match self.reader.decode_with_hints(&mut bitmap, &self.hints) {
            Ok(result) => Ok(Some(result.getText().to_owned())),
            // A miss is the expected fallback trigger, not a failure.
            Err(Exceptions::NotFoundException(_)) => Ok(None),
            Err(err) => Err(PrivyQrError::Decoder(format!(
                "multi-format reader: {err}"
            ))),
        }
    }

    fn reset(&mut self) {
        self.reader = MultiFormatReader::default();
    }
}
