//! Structured-config adapter
//!
//! Reads Clash (`proxies:`/`nodes:`, or a bare list) and Sing-box
//! (`outbounds:`) documents into [`ProxyConfig`]s. Malformed entries are
//! skipped one at a time.

mod clash;
mod de;
mod singbox;

pub use clash::ClashProxy;
pub use singbox::SingboxOutbound;

use log::debug;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::collections::BTreeMap;

use crate::models::ProxyConfig;

use super::error::ParseError;

/// Parse a YAML document (Clash `proxies:`/`nodes:`, Sing-box `outbounds:`
/// or a bare proxy list)
pub fn proxies_from_yaml(content: &str) -> Result<Vec<ProxyConfig>, ParseError> {
    let doc: Value = serde_yaml::from_str(content)?;
    proxies_from_document(&doc, true)
}

/// Parse a JSON document (Sing-box `outbounds`, Clash `proxies` or a bare
/// proxy array)
pub fn proxies_from_json(content: &str) -> Result<Vec<ProxyConfig>, ParseError> {
    let json: serde_json::Value = serde_json::from_str(content)?;
    let doc = serde_yaml::to_value(json)?;
    proxies_from_document(&doc, false)
}

fn proxies_from_document(doc: &Value, accept_nodes: bool) -> Result<Vec<ProxyConfig>, ParseError> {
    if let Some(list) = doc.get("proxies").and_then(Value::as_sequence) {
        return Ok(collect::<ClashProxy, _>(list, ClashProxy::into_proxy));
    }
    if accept_nodes {
        if let Some(list) = doc.get("nodes").and_then(Value::as_sequence) {
            return Ok(collect::<ClashProxy, _>(list, ClashProxy::into_proxy));
        }
    }
    if let Some(list) = doc.get("outbounds").and_then(Value::as_sequence) {
        return Ok(collect::<SingboxOutbound, _>(list, SingboxOutbound::into_proxy));
    }
    if let Some(list) = doc.as_sequence() {
        return Ok(collect::<ClashProxy, _>(list, ClashProxy::into_proxy));
    }
    Err(ParseError::UnsupportedDocument)
}

fn collect<T, F>(elements: &[Value], map: F) -> Vec<ProxyConfig>
where
    T: DeserializeOwned,
    F: Fn(T) -> Option<ProxyConfig>,
{
    let mut proxies = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        let record = match serde_yaml::from_value::<T>(element.clone()) {
            Ok(record) => record,
            Err(err) => {
                debug!("Skipping malformed proxy entry #{}: {}", index, err);
                continue;
            }
        };
        match map(record) {
            Some(proxy) => proxies.push(proxy),
            None => debug!(
                "Skipping proxy entry #{}: unknown type or missing server/port",
                index
            ),
        }
    }
    proxies
}

/// First value that is present and not blank.
pub(crate) fn first<const N: usize>(values: [Option<String>; N]) -> Option<String> {
    values
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
}

/// Text of a scalar YAML value.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Flattens unknown fields into strings; nested values become compact JSON.
pub(crate) fn stringify_extra(extra: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    extra
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match scalar_text(&value) {
                Some(text) => text,
                None if value.is_null() => return None,
                None => serde_json::to_string(&value).ok()?,
            };
            Some((key, text))
        })
        .collect()
}
