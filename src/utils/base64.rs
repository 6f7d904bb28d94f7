use base64::{engine::general_purpose, DecodeError, Engine as _};

/// Encodes a UTF-8 string to standard Base64.
pub fn base64_encode(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Encodes a UTF-8 string to URL-safe Base64 without padding.
pub fn url_safe_base64_encode(input: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(input)
}

/// Reverses a URL-safe Base64 string to standard Base64 format.
pub fn url_safe_base64_reverse(input: &str) -> String {
    input.replace('-', "+").replace('_', "/")
}

/// Appends `=` until the length is a multiple of four.
pub fn add_base64_padding(input: &str) -> String {
    let mut padded = input.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    padded
}

/// Decodes standard or URL-safe Base64, with or without padding.
///
/// Whitespace (line-wrapped payloads) is removed first. Invalid UTF-8 in the
/// decoded bytes is replaced rather than rejected so binary payloads can be
/// detected by the caller.
pub fn try_base64_decode(input: &str) -> Result<String, DecodeError> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let standard = url_safe_base64_reverse(cleaned.trim_end_matches('='));
    let bytes = general_purpose::STANDARD.decode(add_base64_padding(&standard))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decodes a Base64 string to its original form.
///
/// # Returns
/// The decoded string, or an empty string if the input is invalid.
pub fn base64_decode(input: &str) -> String {
    try_base64_decode(input).unwrap_or_default()
}
