// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlapping tile grid for the per-page decode retry.
//
// A code split across a naive non-overlapping grid would never decode, so
// tiles advance by half their edge length in both axes. With the default
// edge of half the smaller page dimension, any code occupying up to roughly
// one quadrant of the page is fully contained in at least one tile.

use privyqr_core::config::TileConfig;

/// One rectangular sub-region of a rendered page, clamped to page bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    /// Whether the rectangle `(x, y, width, height)` lies fully inside this
    /// tile.
    pub fn contains(&self, x: u32, y: u32, width: u32, height: u32) -> bool {
        x >= self.x
            && y >= self.y
            && x + width <= self.x + self.width
            && y + height <= self.y + self.height
    }
}

/// Generate the overlapping tile grid for a page of the given dimensions.
///
/// Tile edge length is `min(width, height) / size_divisor`; tiles advance by
/// `edge / stride_divisor` in both axes, and the final tile in each axis is
/// clamped to the page bounds. Returns an empty grid for degenerate pages.
pub fn tile_grid(width: u32, height: u32, config: &TileConfig) -> Vec<TileRect> {
    let edge = width.min(height) / config.size_divisor.max(1);
    if edge == 0 {
        return Vec::new();
    }
    let stride = (edge / config.stride_divisor.max(1)).max(1);

    let mut tiles = Vec::new();
    let mut y = 0;
    while y + stride < height {
        let mut x = 0;
        while x + stride < width {
            tiles.push(TileRect {
                x,
                y,
                width: edge.min(width - x),
                height: edge.min(height - y),
            });
            x += stride;
        }
        y += stride;
    }
    tiles
}
