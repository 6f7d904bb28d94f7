use log::warn;
use regex::{Regex, RegexBuilder};

/// Joins patterns into one case-insensitive alternation.
///
/// When the combined pattern does not compile, every part is escaped and
/// matched literally instead.
pub fn build_alternation(parts: &[String]) -> Option<Regex> {
    if parts.is_empty() {
        return None;
    }

    let joined = parts.join("|");
    match RegexBuilder::new(&joined).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(err) => {
            warn!("Invalid name filter '{}', matching literally: {}", joined, err);
            let escaped = parts
                .iter()
                .map(|p| regex::escape(p))
                .collect::<Vec<_>>()
                .join("|");
            RegexBuilder::new(&escaped)
                .case_insensitive(true)
                .build()
                .ok()
        }
    }
}

/// Strips an ASCII prefix ignoring case.
pub fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

/// Splits `ss, VMess ,trojan` into lower-cased protocol tags.
pub fn split_protocol_list(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .map(|p| p.trim().to_ascii_lowercase())
        .filter(|p| !p.is_empty())
}
