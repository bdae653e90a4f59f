//! Destination URL templating.

use creogen_core::models::export::URL_TITLE_PLACEHOLDER;

/// Percent-encode every byte outside the RFC 3986 unreserved set
/// (`A-Z a-z 0-9 - _ . ~`). `/`, `?`, `&` and the rest are escaped too.
pub fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

/// Replace the title placeholder in `url` with the encoded `title`.
///
/// Without a chosen title, or without a placeholder, the URL is returned
/// unchanged.
pub fn destination_url(url: &str, title: Option<&str>) -> String {
    match title {
        Some(title) if url.contains(URL_TITLE_PLACEHOLDER) => {
            url.replace(URL_TITLE_PLACEHOLDER, &percent_encode(title))
        }
        _ => url.to_string(),
    }
}
