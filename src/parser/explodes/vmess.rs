use serde_json::Value;

use crate::models::ProxyConfig;
use crate::utils::base64::try_base64_decode;
use crate::utils::url::url_decode;

use super::common::{is_truthy, split_list};

/// Reads a JSON field that may be a string or a number.
fn text(json: &Value, key: &str) -> Option<String> {
    match json.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn flag(json: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| match json.get(*key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => Some(is_truthy(s)),
        Value::Number(n) => Some(n.as_u64() == Some(1)),
        _ => None,
    })
}

/// Parse a VMess link into a ProxyConfig
///
/// Format: `vmess://BASE64(JSON)[#name]`. The name comes from `ps`, or the
/// fragment when `ps` is missing.
pub fn explode_vmess(vmess: &str, node: &mut ProxyConfig) -> bool {
    let Some((_, body)) = vmess.split_once("://") else {
        return false;
    };
    let (encoded, fragment) = match body.split_once('#') {
        Some((encoded, fragment)) => (encoded, url_decode(fragment)),
        None => (body, String::new()),
    };

    let decoded = match try_base64_decode(encoded) {
        Ok(decoded) => decoded,
        Err(_) => return false,
    };
    let json: Value = match serde_json::from_str(&decoded) {
        Ok(json) => json,
        Err(_) => return false,
    };
    if !json.is_object() {
        return false;
    }

    node.name = text(&json, "ps").unwrap_or(fragment);
    node.server = text(&json, "add").unwrap_or_default();
    node.port = text(&json, "port")
        .and_then(|p| p.trim().parse::<u16>().ok())
        .unwrap_or(0);
    node.uuid = text(&json, "id");
    node.alter_id = text(&json, "aid")
        .and_then(|a| a.trim().parse::<u32>().ok())
        .unwrap_or(0);
    node.cipher = text(&json, "scy").or_else(|| Some("auto".to_string()));

    let net = text(&json, "net")
        .unwrap_or_else(|| "tcp".to_string())
        .to_ascii_lowercase();
    let header_type = text(&json, "type").unwrap_or_default();
    let host = text(&json, "host");
    let path = text(&json, "path");

    match net.as_str() {
        "ws" | "httpupgrade" => {
            node.ws_declared = net == "ws";
            node.path = path;
            node.host = host;
        }
        "h2" | "http" => {
            node.path = path;
            node.host = host;
        }
        "grpc" => {
            node.service_name = path;
            node.host = host;
        }
        "quic" => {
            node.quic_security = host;
            node.quic_key = path;
        }
        "tcp" if header_type == "http" => {
            node.http_header = true;
            node.path = path;
            node.host = host;
        }
        _ => node.host = host,
    }
    if !header_type.is_empty() && header_type != "none" && header_type != "http" {
        node.header_type = Some(header_type);
    }
    node.network = Some(if net == "http" { "h2".to_string() } else { net });

    node.tls = text(&json, "tls").is_some_and(|t| t.eq_ignore_ascii_case("tls"));
    node.sni = text(&json, "sni");
    node.fingerprint = text(&json, "fp");
    node.alpn = text(&json, "alpn").map(|a| split_list(&a)).unwrap_or_default();
    node.udp = flag(&json, &["udp"]);
    node.skip_cert_verify = flag(&json, &["skip-cert-verify", "allowInsecure", "insecure"]);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProtocolKind;
    use crate::utils::base64::base64_encode;

    fn explode(json: &str) -> ProxyConfig {
        let mut node = ProxyConfig::new(ProtocolKind::VMess);
        assert!(explode_vmess(&format!("vmess://{}", base64_encode(json)), &mut node));
        node
    }

    #[test]
    fn test_ws_tls() {
        let node = explode(
            r#"{"v":"2","ps":"香港 01","add":"hk.example.com","port":"443","id":"abc","aid":"0",
                "net":"ws","type":"none","host":"cdn.example.com","path":"/ray","tls":"tls",
                "sni":"hk.example.com","alpn":"h2,http/1.1","allowInsecure":true}"#,
        );
        assert_eq!(node.name, "香港 01");
        assert_eq!(node.server, "hk.example.com");
        assert_eq!(node.port, 443);
        assert_eq!(node.uuid.as_deref(), Some("abc"));
        assert_eq!(node.network.as_deref(), Some("ws"));
        assert!(node.ws_declared);
        assert_eq!(node.path.as_deref(), Some("/ray"));
        assert_eq!(node.host.as_deref(), Some("cdn.example.com"));
        assert!(node.tls);
        assert_eq!(node.alpn, vec!["h2", "http/1.1"]);
        assert_eq!(node.skip_cert_verify, Some(true));
        assert_eq!(node.header_type, None);
    }

    #[test]
    fn test_numeric_port_and_grpc() {
        let node = explode(
            r#"{"ps":"g","add":"1.2.3.4","port":8443,"id":"abc","aid":2,"net":"grpc","path":"gun"}"#,
        );
        assert_eq!(node.port, 8443);
        assert_eq!(node.alter_id, 2);
        assert_eq!(node.service_name.as_deref(), Some("gun"));
        assert_eq!(node.path, None);
        assert_eq!(node.cipher.as_deref(), Some("auto"));
    }

    #[test]
    fn test_tcp_http_header() {
        let node = explode(
            r#"{"add":"1.2.3.4","port":80,"id":"abc","net":"tcp","type":"http","path":"/","host":"a.com"}"#,
        );
        assert!(node.http_header);
        assert_eq!(node.path.as_deref(), Some("/"));
        assert_eq!(node.header_type, None);
    }

    #[test]
    fn test_name_from_fragment() {
        let link = format!(
            "vmess://{}#Frag%20Name",
            base64_encode(r#"{"add":"1.2.3.4","port":80,"id":"abc"}"#)
        );
        let mut node = ProxyConfig::new(ProtocolKind::VMess);
        assert!(explode_vmess(&link, &mut node));
        assert_eq!(node.name, "Frag Name");
    }

    #[test]
    fn test_rejects_non_json() {
        let mut node = ProxyConfig::new(ProtocolKind::VMess);
        assert!(!explode_vmess(
            &format!("vmess://{}", base64_encode("not json")),
            &mut node
        ));
        assert!(!explode_vmess("vmess://%%%", &mut node));
    }
}
