// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content classification — maps raw decoded text to a semantic category by
// prefix matching.

use privyqr_core::types::QrKind;

/// Case-insensitive ASCII prefix test. Returns `false` when the prefix
/// length does not fall on a character boundary of `text`.
fn has_prefix(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Classify raw decoded text into one of the semantic categories.
///
/// Evaluation order matters: more specific prefixes are tested before looser
/// ones so that, for example, a `MATMSG:` payload is never swallowed by the
/// plain-text fallback. Matching is case-insensitive throughout, and the
/// function is pure — reclassifying the same text always yields the same
/// category.
pub fn classify(text: &str) -> QrKind {
    if has_prefix(text, "http://") || has_prefix(text, "https://") || has_prefix(text, "www.") {
        QrKind::Url
    } else if has_prefix(text, "WIFI:") {
        QrKind::Wifi
    } else if has_prefix(text, "BEGIN:VCARD") {
        QrKind::Vcard
    } else if has_prefix(text, "mailto:") || has_prefix(text, "MATMSG:") {
        QrKind::Email
    } else if has_prefix(text, "sms:") || has_prefix(text, "SMSTO:") {
        QrKind::Sms
    } else if has_prefix(text, "geo:") {
        QrKind::Geo
    } else {
        QrKind::Text
    }
}
