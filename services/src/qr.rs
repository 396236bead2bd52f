//! QR payload codec.
//!
//! The payload is the one wire format with compatibility weight: printed or
//! displayed QR codes embed `<base>/scan?token=<opaque>&session=<uuid>`, so
//! both query-parameter names are fixed.

use url::Url;
use uuid::Uuid;

/// Builds the scan URL embedded in a QR code. Pure; no state, no network.
pub fn encode_payload(base_url: &str, token: &str, session_id: Uuid) -> String {
    let base = base_url.trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/scan")).expect("frontend_url must be a valid URL");
    url.query_pairs_mut()
        .append_pair("token", token)
        .append_pair("session", &session_id.to_string());
    url.into()
}

/// Extracts `(token, session)` from a decoded QR payload.
///
/// Returns `None` for anything that is not a URL carrying both parameters.
/// A camera sees plenty of unrelated QR codes, so this is a skip, not an
/// error.
pub fn decode_payload(raw: &str) -> Option<(String, Uuid)> {
    let url = Url::parse(raw.trim()).ok()?;
    let mut token = None;
    let mut session = None;
    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            "token" => token = Some(v.into_owned()),
            "session" => session = Uuid::parse_str(&v).ok(),
            _ => {}
        }
    }
    let token = token.filter(|t| !t.is_empty())?;
    Some((token, session?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_the_wire_contract() {
        let sid = Uuid::new_v4();
        let payload = encode_payload("https://app.example.com/", "abc123", sid);
        assert_eq!(
            payload,
            format!("https://app.example.com/scan?token=abc123&session={sid}")
        );
        assert_eq!(decode_payload(&payload), Some(("abc123".into(), sid)));
    }

    #[test]
    fn malformed_payloads_are_skipped() {
        assert_eq!(decode_payload("not a url"), None);
        assert_eq!(decode_payload("https://example.com/scan"), None);
        assert_eq!(
            decode_payload("https://example.com/scan?token=abc&session=not-a-uuid"),
            None
        );
        assert_eq!(
            decode_payload(&format!(
                "https://example.com/scan?session={}",
                Uuid::new_v4()
            )),
            None
        );
        // a foreign QR code pointing somewhere else entirely
        assert_eq!(decode_payload("https://example.com/menu?table=4"), None);
    }

    #[test]
    fn tolerates_extra_query_parameters() {
        let sid = Uuid::new_v4();
        let raw = format!("https://x.test/scan?utm_source=poster&token=t1&session={sid}");
        assert_eq!(decode_payload(&raw), Some(("t1".into(), sid)));
    }
}
