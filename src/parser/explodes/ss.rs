use linked_hash_map::LinkedHashMap;

use crate::models::{PluginOption, ProxyConfig};
use crate::utils::base64::{base64_decode, try_base64_decode};
use crate::utils::url::url_decode;

use super::common::split_host_port;

/// Parse a Shadowsocks link into a ProxyConfig
///
/// Accepts SIP002 links with Base64 or plain `method:password` userinfo and
/// the legacy `ss://BASE64(method:password@host:port)` form.
pub fn explode_ss(ss: &str, node: &mut ProxyConfig) -> bool {
    let Some((_, body)) = ss.split_once("://") else {
        return false;
    };
    let mut content = body.to_string();

    if let Some(hash_pos) = content.find('#') {
        node.name = url_decode(&content[hash_pos + 1..]);
        content.truncate(hash_pos);
    }

    content = content.replace("/?", "?");
    if let Some(query_pos) = content.find('?') {
        let addition = content[query_pos + 1..].to_string();
        content.truncate(query_pos);

        for (key, value) in url::form_urlencoded::parse(addition.as_bytes()) {
            if key == "plugin" && !value.is_empty() {
                let (plugin, opts) = parse_plugin_string(&value);
                node.plugin = Some(plugin);
                node.plugin_opts = opts;
            }
        }
    }
    let content = content.trim_end_matches('/');

    let (secret, authority) = match content.rsplit_once('@') {
        Some((user_info, authority)) => {
            let user_info = url_decode(user_info);
            let secret = match try_base64_decode(&user_info) {
                Ok(decoded) if decoded.contains(':') => decoded,
                _ => user_info,
            };
            (secret, authority.to_string())
        }
        None => {
            // Legacy format
            let decoded = base64_decode(content);
            match decoded.rsplit_once('@') {
                Some((secret, authority)) => (secret.to_string(), authority.to_string()),
                None => return false,
            }
        }
    };

    let Some((method, password)) = secret.split_once(':') else {
        return false;
    };
    let Some((server, port)) = split_host_port(&authority) else {
        return false;
    };

    node.cipher = Some(method.to_string());
    node.password = Some(password.to_string());
    node.server = server;
    node.port = port;
    true
}

/// Parses a SIP003 `name;key=value;flag` plugin string.
///
/// `obfs-local`/`simple-obfs` are folded back into the `obfs` plugin with
/// `mode`/`host`/`uri` option names.
pub fn parse_plugin_string(plugin: &str) -> (String, LinkedHashMap<String, PluginOption>) {
    let mut parts = plugin.split(';');
    let mut name = parts.next().unwrap_or("").trim().to_string();
    let obfs = name == "obfs-local" || name == "simple-obfs" || name == "obfs";
    if obfs {
        name = "obfs".to_string();
    }

    let mut opts = LinkedHashMap::new();
    for arg in parts.map(str::trim).filter(|a| !a.is_empty()) {
        let (key, value) = match arg.split_once('=') {
            Some((k, v)) => (k.trim(), PluginOption::Text(v.to_string())),
            None => (arg, PluginOption::Flag(true)),
        };
        let key = match (obfs, key) {
            (true, "obfs") => "mode",
            (true, "obfs-host") => "host",
            (true, "obfs-uri") => "uri",
            _ => key,
        };
        opts.insert(key.to_string(), value);
    }
    (name, opts)
}
