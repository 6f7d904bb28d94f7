use crate::models::{non_empty, PluginOption, ProxyConfig};
use crate::utils::base64::base64_encode;
use crate::utils::url::url_encode;

use super::append_fragment;

/// Format: `ss://BASE64(method:password)@server:port[/?plugin=...][#name]`
pub fn ss_to_uri(proxy: &ProxyConfig) -> Option<String> {
    let cipher = non_empty(&proxy.cipher)?;
    let password = proxy.password.as_deref()?;

    let user_info = base64_encode(&format!("{}:{}", cipher, password));
    let mut uri = format!("ss://{}@{}", user_info, proxy.authority());

    if let Some(plugin) = build_plugin_string(proxy) {
        uri.push_str("/?plugin=");
        uri.push_str(&url_encode(&plugin));
    }

    append_fragment(&mut uri, &proxy.name);
    Some(uri)
}

/// Builds the SIP003 `name;arg;arg` plugin string.
///
/// `obfs` is renamed to `obfs-local`. The known plugins translate their
/// Clash option names; any other plugin serializes all options in order.
pub fn build_plugin_string(proxy: &ProxyConfig) -> Option<String> {
    let mut name = non_empty(&proxy.plugin)?.to_string();
    if name == "obfs" {
        name = "obfs-local".to_string();
    }

    let opts = &proxy.plugin_opts;
    let text = |key: &str| opts.get(key).and_then(PluginOption::as_text);
    let flag = |key: &str| opts.get(key) == Some(&PluginOption::Flag(true));

    let mut args: Vec<String> = Vec::new();
    match name.as_str() {
        "obfs-local" | "simple-obfs" => {
            if let Some(mode) = text("mode") {
                args.push(format!("obfs={}", mode));
            }
            if let Some(host) = text("host") {
                args.push(format!("obfs-host={}", host));
            }
            if let Some(uri) = text("uri") {
                args.push(format!("obfs-uri={}", uri));
            }
        }
        "v2ray-plugin" => {
            for key in ["mode", "host", "path"] {
                if let Some(value) = text(key) {
                    args.push(format!("{}={}", key, value));
                }
            }
            if flag("tls") {
                args.push("tls".to_string());
            }
            if flag("mux") {
                args.push("mux".to_string());
            }
        }
        "shadow-tls" => {
            for key in ["host", "password"] {
                if let Some(value) = text(key) {
                    args.push(format!("{}={}", key, value));
                }
            }
        }
        _ => {
            for (key, value) in opts.iter() {
                match value {
                    PluginOption::Flag(true) => args.push(key.clone()),
                    PluginOption::Flag(false) => {}
                    PluginOption::Text(v) => args.push(format!("{}={}", key, v)),
                }
            }
        }
    }

    if args.is_empty() {
        Some(name)
    } else {
        Some(format!("{};{}", name, args.join(";")))
    }
}
