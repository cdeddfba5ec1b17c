use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use regex::Regex;

use super::DocumentError;

/// MIME type assumed when the data URL header does not name one.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

static MIME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":(.*?);").expect("valid regex"));

/// Bytes and MIME type decoded from a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDocument {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Decode a `data:<mime>;base64,<payload>` URL.
///
/// The header is everything before the first comma. A header without a
/// `:<mime>;` segment decodes as [`DEFAULT_MIME_TYPE`].
///
/// # Errors
///
/// Returns [`DocumentError::MissingSeparator`] when there is no comma, or
/// [`DocumentError::InvalidBase64`] when the payload is not standard base64.
pub fn decode_data_url(data_url: &str) -> Result<DecodedDocument, DocumentError> {
    let (header, payload) = data_url
        .split_once(',')
        .ok_or(DocumentError::MissingSeparator)?;

    let mime_type = MIME_RE
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string();

    // Payloads copied out of JSON exports sometimes carry line breaks.
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64_STANDARD.decode(compact)?;

    Ok(DecodedDocument { mime_type, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG.
    const PNG_BASE64: &str =
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn decodes_png_data_url() {
        let decoded = decode_data_url(&format!("data:image/png;base64,{PNG_BASE64}")).unwrap();
        assert_eq!(decoded.mime_type, "image/png");
        assert_eq!(&decoded.bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(BASE64_STANDARD.encode(&decoded.bytes), PNG_BASE64);
    }

    #[test]
    fn header_without_mime_defaults_to_jpeg() {
        let decoded = decode_data_url("data:base64,AAEC").unwrap();
        assert_eq!(decoded.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(decoded.bytes, vec![0, 1, 2]);
    }

    #[test]
    fn splits_on_first_comma_only() {
        let err = decode_data_url("data:application/pdf;base64,AA,BB").unwrap_err();
        assert!(matches!(err, DocumentError::InvalidBase64(_)));
    }

    #[test]
    fn missing_comma_is_rejected() {
        let err = decode_data_url("data:image/png;base64").unwrap_err();
        assert!(matches!(err, DocumentError::MissingSeparator));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let err = decode_data_url("data:image/png;base64,@@not-base64@@").unwrap_err();
        assert!(matches!(err, DocumentError::InvalidBase64(_)));
    }

    #[test]
    fn tolerates_line_breaks_in_payload() {
        let decoded = decode_data_url("data:text/plain;base64,aGVs\nbG8=").unwrap();
        assert_eq!(decoded.bytes, b"hello");
        assert_eq!(decoded.mime_type, "text/plain");
    }
}
