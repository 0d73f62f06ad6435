// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw-pixel QR decode backend built on `rqrr`. Stateless and cheap to call,
// which makes it the backend of choice for per-frame camera decoding and
// document tile retries.

use image::{DynamicImage, GrayImage};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use privyqr_core::error::PrivyQrError;
use tracing::trace;

use super::DecodeBackend;

// A version 1 QR symbol is 21 modules on a side; anything smaller cannot
// contain a code.
const MIN_DIMENSION: u32 = 21;

/// QR-only reader operating directly on greyscale pixel data.
pub struct QrPixelBackend;

impl QrPixelBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for QrPixelBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeBackend for QrPixelBackend {
    fn name(&self) -> &'static str {
        "qr-pixel"
    }

    fn decode(&mut self, image: &DynamicImage) -> Result<Option<String>, PrivyQrError> {
        if image.width() < MIN_DIMENSION || image.height() < MIN_DIMENSION {
            return Ok(None);
        }

        let gray = image.to_luma8();
        if let Some(text) = decode_greyscale(&gray) {
            return Ok(Some(text));
        }

        // Retry once on an Otsu-binarized copy; rescues low-contrast sources
        // such as faint print renders and washed-out camera frames.
        let level = otsu_level(&gray);
        let binary = threshold(&gray, level, ThresholdType::Binary);
        trace!(level, "retrying on binarized image");
        Ok(decode_greyscale(&binary))
    }
}

/// Run the rqrr grid detector over a greyscale buffer and decode the first
/// detected grid. Decode errors on a detected grid count as a miss.
fn decode_greyscale(gray: &GrayImage) -> Option<String> {
    let (width, height) = gray.dimensions();
    let (width, height) = (width as usize, height as usize);
    let buffer = gray.as_raw();

    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| buffer[y * width + x]);
    let grids = prepared.detect_grids();
    grids
        .first()
        .and_then(|grid| grid.decode().ok())
        .map(|(_, content)| content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use qrcode::QrCode;

    fn render_qr(payload: &str) -> DynamicImage {
        let code = QrCode::new(payload.as_bytes()).expect("payload encodes");
        let image = code
            .render::<Luma<u8>>()
            .min_dimensions(240, 240)
            .build();
        DynamicImage::ImageLuma8(image)
    }

    #[test]
    fn decodes_synthetic_qr() {
        let mut backend = QrPixelBackend::new();
        let decoded = backend
            .decode(&render_qr("WIFI:T:WPA;S:CoffeeShop;P:brew1234;H:false;;"))
            .expect("backend healthy");
        assert_eq!(
            decoded.as_deref(),
            Some("WIFI:T:WPA;S:CoffeeShop;P:brew1234;H:false;;")
        );
    }

    #[test]
    fn blank_image_is_a_miss() {
        let mut backend = QrPixelBackend::new();
        let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([255u8])));
        assert_eq!(backend.decode(&blank).expect("miss is not an error"), None);
    }

    #[test]
    fn tiny_image_is_rejected_without_panicking() {
        let mut backend = QrPixelBackend::new();
        let tiny = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([0u8])));
        assert_eq!(backend.decode(&tiny).expect("miss is not an error"), None);
    }

    #[test]
    fn decodes_low_contrast_render_via_binarize_retry() {
        // Compress the dynamic range to grey-on-grey; the Otsu retry should
        // still separate modules from background.
        let crisp = render_qr("geo:37.7749,-122.4194").to_luma8();
        let faint = GrayImage::from_fn(crisp.width(), crisp.height(), |x, y| {
            let Luma([v]) = *crisp.get_pixel(x, y);
            Luma([if v < 128 { 100 } else { 160 }])
        });

        let mut backend = QrPixelBackend::new();
        let decoded = backend
            .decode(&DynamicImage::ImageLuma8(faint))
            .expect("backend healthy");
        assert_eq!(decoded.as_deref(), Some("geo:37.7749,-122.4194"));
    }
}
