// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration for a scanning session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    pub decode: DecodeConfig,
    pub document: DocumentScanConfig,
}

/// Settings for the decode backend chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Ask the multi-format reader to spend extra effort per image.
    pub try_harder: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self { try_harder: true }
    }
}

/// Settings for multi-page document scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentScanConfig {
    /// Upscaling factor applied when rasterising a page. Print-resolution
    /// QR codes are frequently too fine-grained to decode at native scale,
    /// so pages render at 2x by default.
    pub render_scale: f32,
    pub tile: TileConfig,
}

impl Default for DocumentScanConfig {
    fn default() -> Self {
        Self {
            render_scale: 2.0,
            tile: TileConfig::default(),
        }
    }
}

/// Parameters for the overlapping-tile retry pass.
///
/// Tile edge length is `min(page_width, page_height) / size_divisor`, and
/// tiles advance by `edge / stride_divisor` in both axes. The defaults
/// (half the smaller page dimension, 50% overlap) guarantee that any code
/// occupying up to roughly one quadrant of the page lands fully inside at
/// least one tile. These are tunable defaults, not load-bearing constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileConfig {
    pub size_divisor: u32,
    pub stride_divisor: u32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            size_divisor: 2,
            stride_divisor: 2,
        }
    }
}
