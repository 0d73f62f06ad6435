// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the PrivyQR scanning engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Symbology label carried on every successful decode.
///
/// Only QR codes are decoded today, but the label is data (not a hardcoded
/// assumption) so other 1D/2D symbologies can be added without changing the
/// result shape.
pub const FORMAT_QR_CODE: &str = "QR_CODE";

/// Unique identifier for a scanning session (one file batch, one document
/// scan, or one live camera session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of semantic content categories a decoded payload can fall
/// into. Classification always succeeds; `Text` is the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrKind {
    Url,
    Wifi,
    Vcard,
    Email,
    Sms,
    Geo,
    Text,
}

impl QrKind {
    /// Human-readable category label for presentation layers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Url => "Website",
            Self::Wifi => "Wi-Fi Network",
            Self::Vcard => "Contact Card",
            Self::Email => "Email",
            Self::Sms => "SMS",
            Self::Geo => "Location",
            Self::Text => "Text",
        }
    }
}

impl std::fmt::Display for QrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Url => "url",
            Self::Wifi => "wifi",
            Self::Vcard => "vcard",
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Geo => "geo",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

/// Typed payload extracted from the raw decoded text.
///
/// Every field is optional: extraction is best-effort and a payload with all
/// fields absent is still a valid result. The variant always agrees with the
/// classified category by construction — a WiFi result can never carry
/// contact-card fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QrPayload {
    Url {
        domain: Option<String>,
        protocol: Option<String>,
    },
    Wifi {
        ssid: Option<String>,
        password: Option<String>,
        encryption: Option<String>,
        hidden: Option<bool>,
    },
    Vcard {
        name: Option<String>,
        phone: Option<String>,
        email: Option<String>,
        organization: Option<String>,
    },
    Email {
        recipient: Option<String>,
        subject: Option<String>,
        body: Option<String>,
    },
    Sms {
        recipient: Option<String>,
        body: Option<String>,
    },
    Geo {
        latitude: Option<f64>,
        longitude: Option<f64>,
    },
    Text,
}

impl QrPayload {
    /// The category this payload belongs to.
    pub fn kind(&self) -> QrKind {
        match self {
            Self::Url { .. } => QrKind::Url,
            Self::Wifi { .. } => QrKind::Wifi,
            Self::Vcard { .. } => QrKind::Vcard,
            Self::Email { .. } => QrKind::Email,
            Self::Sms { .. } => QrKind::Sms,
            Self::Geo { .. } => QrKind::Geo,
            Self::Text => QrKind::Text,
        }
    }
}

/// One decoded barcode: the verbatim payload text, the symbology label, and
/// the typed interpretation of the content.
///
/// Immutable value — produced once per decode, owned entirely by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Verbatim decoded content. Never empty on a successful decode.
    pub text: String,
    /// Symbology label, e.g. [`FORMAT_QR_CODE`].
    pub format: String,
    /// Typed interpretation of `text`.
    pub payload: QrPayload,
}

impl ScanResult {
    /// Shorthand for the payload's category.
    pub fn kind(&self) -> QrKind {
        self.payload.kind()
    }

    /// Augment the format label with the page the code was found on.
    ///
    /// Used when flattening document results into a single display list,
    /// e.g. `"PDF Page 3 - QR_CODE"`.
    pub fn with_page_label(mut self, page_number: u32) -> Self {
        self.format = format!("PDF Page {} - {}", page_number, self.format);
        self
    }
}

/// All codes found on one document page.
///
/// Only pages with at least one result are ever emitted, so `results` is
/// non-empty by construction. Order is discovery order: the full-page result
/// first, then tile results in tile-scan order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageScanResult {
    /// 1-based page index into the source document.
    pub page_number: u32,
    pub results: Vec<ScanResult>,
}

/// Advisory progress report emitted after each document page is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    /// The page that just finished (1-based).
    pub page: u32,
    pub total: u32,
}

impl ScanProgress {
    /// Fractional completion in `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.page as f32 / self.total as f32
        }
    }
}

/// Supported scan input containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Jpeg,
    Png,
    Gif,
    Bmp,
    WebP,
    Pdf,
}

impl InputKind {
    /// MIME type string for presentation layers and input dispatch.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::WebP => "image/webp",
            Self::Pdf => "application/pdf",
        }
    }

    /// Infer input kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::WebP),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Whether this input is a raster image (as opposed to a paged document).
    pub fn is_image(&self) -> bool {
        !matches!(self, Self::Pdf)
    }
}

/// Metadata describing one scanning session, for logs and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub started_at: DateTime<Utc>,
}

impl SessionInfo {
    pub fn start() -> Self {
        Self {
            id: SessionId::new(),
            started_at: Utc::now(),
        }
    }
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self::start()
    }
}
