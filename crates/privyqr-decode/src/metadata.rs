// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload extraction — per-category structured fields pulled out of the raw
// decoded text. Extraction is best-effort: a pattern that fails to match
// leaves its fields unset and never fails the scan.

use std::borrow::Cow;
use std::sync::LazyLock;

use privyqr_core::types::{QrKind, QrPayload};
use regex::Regex;
use url::Url;

// The WiFi credential grammar: WIFI:T:<enc>;S:<ssid>;P:<password>;H:<hidden>;;
// Field values may be empty; the H field is optional.
static WIFI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)WIFI:T:([^;]*);S:([^;]*);P:([^;]*);H:([^;]*)?;?").expect("static pattern")
});

static VCARD_FN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"FN:([^\r\n]+)").expect("static pattern"));
static VCARD_TEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TEL[^:]*:([^\r\n]+)").expect("static pattern"));
static VCARD_EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"EMAIL[^:]*:([^\r\n]+)").expect("static pattern"));
static VCARD_ORG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ORG:([^\r\n]+)").expect("static pattern"));

static GEO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)geo:([^,]+),([^,?]+)").expect("static pattern"));

static MATMSG_TO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TO:([^;]+)").expect("static pattern"));
static MATMSG_SUB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SUB:([^;]+)").expect("static pattern"));
static MATMSG_BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BODY:([^;]+)").expect("static pattern"));

// Recipient runs to the first ':' or '?'; anything after the delimiter is the
// message body.
static SMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:sms|SMSTO):([^:?]+)(?:[?:](.*))?").expect("static pattern"));

/// Extract the typed payload for an already-classified text.
///
/// The returned variant always matches `kind`.
pub fn extract(text: &str, kind: QrKind) -> QrPayload {
    match kind {
        QrKind::Url => extract_url(text),
        QrKind::Wifi => extract_wifi(text),
        QrKind::Vcard => extract_vcard(text),
        QrKind::Email => extract_email(text),
        QrKind::Sms => extract_sms(text),
        QrKind::Geo => extract_geo(text),
        QrKind::Text => QrPayload::Text,
    }
}

/// Case-insensitive ASCII prefix strip.
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

// -- URL ----------------------------------------------------------------------

fn extract_url(text: &str) -> QrPayload {
    // Bare "www." payloads get a scheme so the parser accepts them.
    let candidate: Cow<'_, str> = if strip_prefix_ignore_case(text, "http://").is_some()
        || strip_prefix_ignore_case(text, "https://").is_some()
    {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("http://{text}"))
    };

    match Url::parse(&candidate) {
        Ok(url) => QrPayload::Url {
            domain: url.host_str().map(str::to_owned),
            protocol: Some(url.scheme().to_owned()),
        },
        // Malformed URL — classification stands, fields stay unset.
        Err(_) => QrPayload::Url {
            domain: None,
            protocol: None,
        },
    }
}

// -- WiFi ---------------------------------------------------------------------

fn extract_wifi(text: &str) -> QrPayload {
    match WIFI_RE.captures(text) {
        Some(caps) => {
            let encryption = match &caps[1] {
                "" => "WPA".to_owned(),
                enc => enc.to_owned(),
            };
            QrPayload::Wifi {
                ssid: Some(caps[2].to_owned()),
                password: Some(caps[3].to_owned()),
                encryption: Some(encryption),
                // Hidden only when the H field is the exact literal "true".
                hidden: Some(caps.get(4).is_some_and(|h| h.as_str() == "true")),
            }
        }
        None => QrPayload::Wifi {
            ssid: None,
            password: None,
            encryption: None,
            hidden: None,
        },
    }
}

// -- vCard --------------------------------------------------------------------

fn extract_vcard(text: &str) -> QrPayload {
    let capture = |re: &Regex| re.captures(text).map(|caps| caps[1].to_owned());
    QrPayload::Vcard {
        name: capture(&VCARD_FN_RE),
        phone: capture(&VCARD_TEL_RE),
        email: capture(&VCARD_EMAIL_RE),
        organization: capture(&VCARD_ORG_RE),
    }
}

// -- Email --------------------------------------------------------------------

fn extract_email(text: &str) -> QrPayload {
    if let Some(rest) = strip_prefix_ignore_case(text, "mailto:") {
        let (recipient, query) = match rest.split_once('?') {
            Some((recipient, query)) => (recipient, Some(query)),
            None => (rest, None),
        };

        let mut subject = None;
        let mut body = None;
        if let Some(query) = query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                match key.as_ref() {
                    "subject" if !value.is_empty() => subject = Some(value.into_owned()),
                    "body" if !value.is_empty() => body = Some(value.into_owned()),
                    _ => {}
                }
            }
        }

        QrPayload::Email {
            recipient: non_empty(recipient),
            subject,
            body,
        }
    } else {
        // MATMSG:TO:<addr>;SUB:<subject>;BODY:<body>;;
        let capture = |re: &Regex| re.captures(text).map(|caps| caps[1].to_owned());
        QrPayload::Email {
            recipient: capture(&MATMSG_TO_RE),
            subject: capture(&MATMSG_SUB_RE),
            body: capture(&MATMSG_BODY_RE),
        }
    }
}

// -- SMS ----------------------------------------------------------------------

fn extract_sms(text: &str) -> QrPayload {
    match SMS_RE.captures(text) {
        Some(caps) => QrPayload::Sms {
            recipient: Some(caps[1].to_owned()),
            body: caps.get(2).and_then(|body| non_empty(body.as_str())),
        },
        None => QrPayload::Sms {
            recipient: None,
            body: None,
        },
    }
}

// -- Geo ----------------------------------------------------------------------

fn extract_geo(text: &str) -> QrPayload {
    let coords = GEO_RE.captures(text).and_then(|caps| {
        let latitude = caps[1].parse::<f64>().ok()?;
        let longitude = caps[2].parse::<f64>().ok()?;
        Some((latitude, longitude))
    });

    match coords {
        Some((latitude, longitude)) => QrPayload::Geo {
            latitude: Some(latitude),
            longitude: Some(longitude),
        },
        // Both coordinates parse or neither is reported.
        None => QrPayload::Geo {
            latitude: None,
            longitude: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_auto(text: &str) -> QrPayload {
        extract(text, crate::classify::classify(text))
    }

    // -- WiFi --

    #[test]
    fn wifi_all_fields() {
        assert_eq!(
            extract_auto("WIFI:T:WPA2;S:HomeNet;P:s3cret;H:true;;"),
            QrPayload::Wifi {
                ssid: Some("HomeNet".into()),
                password: Some("s3cret".into()),
                encryption: Some("WPA2".into()),
                hidden: Some(true),
            }
        );
    }

    #[test]
    fn wifi_empty_encryption_defaults_to_wpa() {
        let QrPayload::Wifi { encryption, .. } = extract_auto("WIFI:T:;S:Net;P:pw;H:false;;")
        else {
            panic!("expected wifi payload");
        };
        assert_eq!(encryption.as_deref(), Some("WPA"));
    }

    #[test]
    fn wifi_hidden_requires_exact_literal() {
        let hidden = |text: &str| match extract_auto(text) {
            QrPayload::Wifi { hidden, .. } => hidden,
            _ => panic!("expected wifi payload"),
        };
        assert_eq!(hidden("WIFI:T:WPA;S:a;P:b;H:true;;"), Some(true));
        assert_eq!(hidden("WIFI:T:WPA;S:a;P:b;H:TRUE;;"), Some(false));
        assert_eq!(hidden("WIFI:T:WPA;S:a;P:b;H:false;;"), Some(false));
        assert_eq!(hidden("WIFI:T:WPA;S:a;P:b;H:;;"), Some(false));
    }

    #[test]
    fn wifi_malformed_leaves_fields_unset() {
        assert_eq!(
            extract_auto("WIFI:garbage-without-delimiters"),
            QrPayload::Wifi {
                ssid: None,
                password: None,
                encryption: None,
                hidden: None,
            }
        );
    }

    // -- URL --

    #[test]
    fn url_domain_and_protocol() {
        assert_eq!(
            extract_auto("https://blog.example.com/post?id=1"),
            QrPayload::Url {
                domain: Some("blog.example.com".into()),
                protocol: Some("https".into()),
            }
        );
    }

    #[test]
    fn url_www_gets_default_scheme() {
        assert_eq!(
            extract_auto("www.example.com/path"),
            QrPayload::Url {
                domain: Some("www.example.com".into()),
                protocol: Some("http".into()),
            }
        );
    }

    #[test]
    fn url_malformed_leaves_fields_unset() {
        // "http://" alone has no host and fails to parse.
        assert_eq!(
            extract_auto("http://"),
            QrPayload::Url {
                domain: None,
                protocol: None,
            }
        );
    }

    // -- vCard --

    #[test]
    fn vcard_full_card() {
        let text = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Ada Lovelace\r\nORG:Analytical Engines\r\nTEL;TYPE=CELL:+44 20 1234\r\nEMAIL;TYPE=WORK:ada@engines.example\r\nEND:VCARD";
        assert_eq!(
            extract_auto(text),
            QrPayload::Vcard {
                name: Some("Ada Lovelace".into()),
                phone: Some("+44 20 1234".into()),
                email: Some("ada@engines.example".into()),
                organization: Some("Analytical Engines".into()),
            }
        );
    }

    #[test]
    fn vcard_fields_independently_optional() {
        let text = "BEGIN:VCARD\nFN:Grace Hopper\nEND:VCARD";
        assert_eq!(
            extract_auto(text),
            QrPayload::Vcard {
                name: Some("Grace Hopper".into()),
                phone: None,
                email: None,
                organization: None,
            }
        );
    }

    // -- Geo --

    #[test]
    fn geo_coordinates() {
        assert_eq!(
            extract_auto("geo:37.7749,-122.4194"),
            QrPayload::Geo {
                latitude: Some(37.7749),
                longitude: Some(-122.4194),
            }
        );
    }

    #[test]
    fn geo_ignores_query_suffix() {
        assert_eq!(
            extract_auto("geo:48.2082,16.3738?z=12"),
            QrPayload::Geo {
                latitude: Some(48.2082),
                longitude: Some(16.3738),
            }
        );
    }

    #[test]
    fn geo_unparseable_leaves_both_unset() {
        assert_eq!(
            extract_auto("geo:north,south"),
            QrPayload::Geo {
                latitude: None,
                longitude: None,
            }
        );
    }

    // -- Email --

    #[test]
    fn mailto_with_query() {
        assert_eq!(
            extract_auto("mailto:a@b.com?subject=Hi&body=Hello"),
            QrPayload::Email {
                recipient: Some("a@b.com".into()),
                subject: Some("Hi".into()),
                body: Some("Hello".into()),
            }
        );
    }

    #[test]
    fn mailto_percent_decoding() {
        assert_eq!(
            extract_auto("mailto:a@b.com?subject=Hello%20World&body=line+one"),
            QrPayload::Email {
                recipient: Some("a@b.com".into()),
                subject: Some("Hello World".into()),
                body: Some("line one".into()),
            }
        );
    }

    #[test]
    fn mailto_bare_recipient() {
        assert_eq!(
            extract_auto("mailto:a@b.com"),
            QrPayload::Email {
                recipient: Some("a@b.com".into()),
                subject: None,
                body: None,
            }
        );
    }

    #[test]
    fn matmsg_fields() {
        assert_eq!(
            extract_auto("MATMSG:TO:a@b.com;SUB:Meeting;BODY:See you at 10;;"),
            QrPayload::Email {
                recipient: Some("a@b.com".into()),
                subject: Some("Meeting".into()),
                body: Some("See you at 10".into()),
            }
        );
    }

    // -- SMS --

    #[test]
    fn sms_with_colon_body() {
        assert_eq!(
            extract_auto("SMSTO:+15551234:Call me back"),
            QrPayload::Sms {
                recipient: Some("+15551234".into()),
                body: Some("Call me back".into()),
            }
        );
    }

    #[test]
    fn sms_with_query_body() {
        assert_eq!(
            extract_auto("sms:+15551234?body text"),
            QrPayload::Sms {
                recipient: Some("+15551234".into()),
                body: Some("body text".into()),
            }
        );
    }

    #[test]
    fn sms_without_body() {
        assert_eq!(
            extract_auto("sms:+15551234"),
            QrPayload::Sms {
                recipient: Some("+15551234".into()),
                body: None,
            }
        );
    }

    // -- Text --

    #[test]
    fn text_has_no_fields() {
        assert_eq!(extract_auto("Just some plain text"), QrPayload::Text);
    }

    #[test]
    fn payload_variant_always_matches_kind() {
        for text in [
            "https://example.com",
            "WIFI:T:WPA;S:a;P:b;H:;;",
            "BEGIN:VCARD\nEND:VCARD",
            "mailto:a@b.c",
            "MATMSG:TO:a;;",
            "sms:1",
            "geo:0,0",
            "plain",
        ] {
            let kind = crate::classify::classify(text);
            assert_eq!(extract(text, kind).kind(), kind, "mismatch for {text:?}");
        }
    }
}
