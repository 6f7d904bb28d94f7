use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BASE64_BODY: Regex = Regex::new(r"^[A-Za-z0-9+/=_-]+$").unwrap();
}

/// Payloads shorter than this are never treated as Base64.
const MIN_BASE64_LEN: usize = 20;
/// How many leading characters [`is_binary`] inspects.
const BINARY_SCAN_LEN: usize = 100;

/// A way of reading a subscription payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    Json,
    Yaml,
    Base64,
    PlainText,
}

/// Orders the parse strategies worth trying for this content.
///
/// The list never contains duplicates and always ends with
/// [`ParseStrategy::PlainText`].
///
/// # Examples
/// ```
/// use sublinks::parser::{sniff, ParseStrategy};
///
/// assert_eq!(sniff("{\"outbounds\": []}"), vec![ParseStrategy::Json, ParseStrategy::PlainText]);
/// assert_eq!(sniff("ss://abc@host:1"), vec![ParseStrategy::PlainText]);
/// ```
pub fn sniff(content: &str) -> Vec<ParseStrategy> {
    let trimmed = content.trim();
    let mut strategies = Vec::with_capacity(4);

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        strategies.push(ParseStrategy::Json);
    }
    if trimmed.contains("proxies:")
        || trimmed.contains("nodes:")
        || trimmed.contains("outbounds:")
        || trimmed.starts_with("---")
    {
        strategies.push(ParseStrategy::Yaml);
    }
    if looks_like_base64(trimmed) {
        strategies.push(ParseStrategy::Base64);
    }
    strategies.push(ParseStrategy::PlainText);
    strategies
}

/// Whether the content, ignoring whitespace, is a plausible Base64 body.
pub fn looks_like_base64(content: &str) -> bool {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() > MIN_BASE64_LEN && BASE64_BODY.is_match(&compact)
}

/// Whether the leading characters contain control bytes other than tab,
/// CR and LF.
pub fn is_binary(content: &str) -> bool {
    content.chars().take(BINARY_SCAN_LEN).any(|c| {
        let code = c as u32;
        (code < 0x20 && c != '\t' && c != '\r' && c != '\n') || code == 0x7f
    })
}
