use std::sync::LazyLock;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;
use regex::Regex;

use crate::{download::Blob, error::ExportAsError};

static DATA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(?<mime>[^;,]*);base64,(?<body>.*)$").expect("data URL pattern is valid")
});

static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:[^;,]*;base64,").expect("data URL prefix pattern is valid"));

/// Encode raw bytes as a self-describing `data:<mime>;base64,<content>`
/// string. Text content goes through as UTF-8 bytes, so non-ASCII survives
/// the round trip.
pub fn to_data_url(mime: &str, data: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(data))
}

/// Prepend a `data:<mime>;base64,` prefix to bare base64 content.
pub fn add_file_type_to_base64(content: &str, mime: &str) -> String {
    format!("data:{mime};base64,{content}")
}

/// Strip a leading `data:<mime>;base64,` prefix. Input without the prefix is
/// returned unchanged.
pub fn remove_file_type_from_base64(content: &str) -> &str {
    match PREFIX_RE.find(content) {
        Some(m) => &content[m.end()..],
        None => content,
    }
}

/// Decode a data URL into a `Blob` carrying the declared mime type and the
/// decoded bytes. Input that does not match the data-URL shape is rejected,
/// not repaired; base64 decode failures propagate verbatim.
pub fn content_to_blob(content: &str) -> Result<Blob, ExportAsError> {
    let caps = DATA_URL_RE
        .captures(content)
        .ok_or_else(|| ExportAsError::MalformedDataUrl(preview(content)))?;

    let data = STANDARD.decode(&caps["body"])?;
    Ok(Blob {
        mime: caps["mime"].to_string(),
        data: Bytes::from(data),
    })
}

fn preview(content: &str) -> String {
    if content.len() > 48 {
        let cut = content
            .char_indices()
            .take_while(|(i, _)| *i <= 48)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &content[..cut])
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_prefix_strip_and_add() {
        let original = to_data_url("text/csv", b"\"a\",\"b\"");
        let stripped = remove_file_type_from_base64(&original);
        assert!(!stripped.starts_with("data:"));
        assert_eq!(add_file_type_to_base64(stripped, "text/csv"), original);
    }

    #[test]
    fn strip_leaves_unprefixed_input_unchanged() {
        assert_eq!(remove_file_type_from_base64("aGVsbG8="), "aGVsbG8=");
        assert_eq!(remove_file_type_from_base64(""), "");
    }

    #[test]
    fn blob_conversion_extracts_mime_and_bytes() {
        let url = to_data_url("text/xml", "<Root>ü</Root>".as_bytes());
        let blob = content_to_blob(&url).unwrap();
        assert_eq!(blob.mime, "text/xml");
        assert_eq!(blob.data.as_ref(), "<Root>ü</Root>".as_bytes());
    }

    #[test]
    fn blob_conversion_rejects_malformed_input() {
        let err = content_to_blob("not a data url").unwrap_err();
        assert!(matches!(err, ExportAsError::MalformedDataUrl(_)));
    }

    #[test]
    fn blob_conversion_propagates_decode_errors() {
        let err = content_to_blob("data:text/plain;base64,!!!").unwrap_err();
        assert!(matches!(err, ExportAsError::Base64(_)));
    }
}
