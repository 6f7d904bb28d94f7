use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{non_empty, ProxyConfig};
use crate::utils::url::{is_percent_encoded, url_encode};

use super::{append_fragment, join_alpn, QueryParams};

lazy_static! {
    static ref EARLY_DATA: Regex = Regex::new(r"(?i)(?:\?|%3F|&|%26)ed(?:=|%3D)(\d+)").unwrap();
}

/// Splits an `ed=N` early-data marker out of a WebSocket path.
///
/// Recognizes the raw and percent-encoded spellings of `?ed=N` and `&ed=N`.
/// A residual path that is empty or `%2F` becomes `/`.
///
/// # Examples
/// ```
/// use sublinks::generator::links::split_early_data;
///
/// assert_eq!(split_early_data("/ws?ed=2048"), ("/ws".to_string(), Some("2048".to_string())));
/// assert_eq!(split_early_data("%2F%3Fed%3D2560"), ("/".to_string(), Some("2560".to_string())));
/// assert_eq!(split_early_data("/plain"), ("/plain".to_string(), None));
/// ```
pub fn split_early_data(path: &str) -> (String, Option<String>) {
    let caps = match EARLY_DATA.captures(path) {
        Some(caps) => caps,
        None => return (path.to_string(), None),
    };
    let (whole, ed) = match (caps.get(0), caps.get(1)) {
        (Some(whole), Some(ed)) => (whole, ed.as_str().to_string()),
        _ => return (path.to_string(), None),
    };

    let mut residual = String::with_capacity(path.len());
    residual.push_str(&path[..whole.start()]);
    residual.push_str(&path[whole.end()..]);
    if residual.is_empty() || residual.eq_ignore_ascii_case("%2F") {
        residual = "/".to_string();
    }
    (residual, Some(ed))
}

fn encode_path(path: &str) -> String {
    if is_percent_encoded(path) {
        path.to_string()
    } else {
        url_encode(path)
    }
}

/// Format: `vless://uuid@server:port?params#name`
pub fn vless_to_uri(proxy: &ProxyConfig) -> Option<String> {
    let uuid = non_empty(&proxy.uuid)?;
    let mut uri = format!("vless://{}@{}", url_encode(uuid), proxy.authority());

    let net = non_empty(&proxy.network).unwrap_or("tcp").to_ascii_lowercase();
    let mut params = QueryParams::new();
    params.push_raw("encryption", "none");
    if net != "tcp" {
        params.push("type", &net);
    }

    match net.as_str() {
        "ws" => {
            let raw_path = non_empty(&proxy.path).unwrap_or("/");
            let (path, embedded_ed) = split_early_data(raw_path);
            params.push_raw("path", &encode_path(&path));
            params.push_opt("host", proxy.host.as_deref());
            let ed = non_empty(&proxy.early_data)
                .map(str::to_string)
                .or(embedded_ed);
            params.push_opt("ed", ed.as_deref());
        }
        "grpc" => {
            params.push_opt("serviceName", proxy.service_name.as_deref());
            params.push_opt("mode", proxy.grpc_mode.as_deref());
        }
        "h2" | "http" | "httpupgrade" | "splithttp" => {
            if let Some(path) = non_empty(&proxy.path) {
                params.push_raw("path", &encode_path(path));
            }
            params.push_opt("host", proxy.host.as_deref());
        }
        _ => {}
    }

    let security = if proxy.reality.is_some() {
        "reality"
    } else if proxy.tls {
        "tls"
    } else {
        "none"
    };
    params.push_raw("security", security);

    if security != "none" {
        params.push_opt("sni", proxy.sni.as_deref());
        params.push_opt("fp", proxy.fingerprint.as_deref());
        params.push_opt("alpn", join_alpn(&proxy.alpn).as_deref());
    }
    if let Some(reality) = &proxy.reality {
        params.push_opt("pbk", reality.public_key.as_deref());
        params.push_opt("sid", reality.short_id.as_deref());
        params.push_opt("spx", reality.spider_x.as_deref());
    }

    params.push_opt("flow", proxy.flow.as_deref());
    params.push_flag("allowInsecure", proxy.insecure());
    params.append_to(&mut uri);

    append_fragment(&mut uri, &proxy.name);
    Some(uri)
}
