use serde::Serialize;

use crate::models::{non_empty, ProxyConfig};
use crate::utils::base64::base64_encode;

use super::join_alpn;

/// VMess share-link body. Field order is part of the link format.
#[derive(Debug, Serialize)]
struct VmessShare<'a> {
    v: &'a str,
    ps: &'a str,
    add: &'a str,
    port: u16,
    id: &'a str,
    aid: u32,
    scy: &'a str,
    net: &'a str,
    #[serde(rename = "type")]
    header_type: &'a str,
    host: String,
    path: String,
    tls: &'a str,
    sni: String,
    fp: &'a str,
    alpn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    udp: Option<bool>,
    #[serde(rename = "skip-cert-verify", skip_serializing_if = "Option::is_none")]
    skip_cert_verify: Option<bool>,
    #[serde(rename = "allowInsecure", skip_serializing_if = "Option::is_none")]
    allow_insecure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    insecure: Option<bool>,
}

/// Resolves the effective VMess network.
///
/// An unset or `tcp` network with WebSocket options becomes `ws`, and
/// `http2` is normalized to `h2`.
fn vmess_network(proxy: &ProxyConfig) -> String {
    let mut net = non_empty(&proxy.network).unwrap_or("tcp").to_ascii_lowercase();
    let has_ws = proxy.ws_declared || non_empty(&proxy.path).is_some();
    if net == "tcp" && has_ws && !proxy.http_header {
        net = "ws".to_string();
    }
    if net == "http2" {
        net = "h2".to_string();
    }
    net
}

/// Format: `vmess://BASE64(JSON)`
pub fn vmess_to_uri(proxy: &ProxyConfig) -> Option<String> {
    let uuid = non_empty(&proxy.uuid)?;
    let net = vmess_network(proxy);

    let header_type = if net == "tcp" && proxy.http_header {
        "http"
    } else {
        non_empty(&proxy.header_type).unwrap_or("none")
    };

    let mut path = proxy.path.clone().unwrap_or_default();
    let mut host = proxy.host.clone().unwrap_or_default();
    match net.as_str() {
        "h2" if path.is_empty() => path = "/".to_string(),
        "grpc" => path = proxy.service_name.clone().unwrap_or_default(),
        "quic" => {
            if let Some(security) = non_empty(&proxy.quic_security) {
                host = security.to_string();
            }
            if let Some(key) = non_empty(&proxy.quic_key) {
                path = key.to_string();
            }
        }
        _ => {}
    }

    let mut sni = proxy.sni.clone().unwrap_or_default();
    if sni.is_empty() && !host.is_empty() {
        sni = host.clone();
    }
    if host.is_empty() && !sni.is_empty() {
        host = sni.clone();
    }

    let share = VmessShare {
        v: "2",
        ps: if proxy.name.is_empty() { "VMess" } else { &proxy.name },
        add: &proxy.server,
        port: proxy.port,
        id: uuid,
        aid: proxy.alter_id,
        scy: non_empty(&proxy.cipher).unwrap_or("auto"),
        net: &net,
        header_type,
        host,
        path,
        tls: if proxy.tls { "tls" } else { "none" },
        sni,
        fp: proxy.fingerprint.as_deref().unwrap_or(""),
        alpn: join_alpn(&proxy.alpn).unwrap_or_default(),
        udp: proxy.udp,
        skip_cert_verify: proxy.skip_cert_verify,
        allow_insecure: proxy.skip_cert_verify,
        insecure: proxy.skip_cert_verify,
    };

    let json = serde_json::to_string(&share).ok()?;
    Some(format!("vmess://{}", base64_encode(&json)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProtocolKind;
    use crate::utils::base64::base64_decode;
    use serde_json::Value;

    fn decode(uri: &str) -> Value {
        let body = uri.strip_prefix("vmess://").unwrap();
        serde_json::from_str(&base64_decode(body)).unwrap()
    }

    fn vmess_proxy() -> ProxyConfig {
        let mut proxy = ProxyConfig::new(ProtocolKind::VMess);
        proxy.name = "香港 01".to_string();
        proxy.server = "hk.example.com".to_string();
        proxy.port = 443;
        proxy.uuid = Some("b831381d-6324-4d53-ad4f-8cda48b30811".to_string());
        proxy
    }

    #[test]
    fn test_key_order_and_defaults() {
        let uri = vmess_to_uri(&vmess_proxy()).unwrap();
        let json = base64_decode(uri.strip_prefix("vmess://").unwrap());
        assert_eq!(
            json,
            r#"{"v":"2","ps":"香港 01","add":"hk.example.com","port":443,"id":"b831381d-6324-4d53-ad4f-8cda48b30811","aid":0,"scy":"auto","net":"tcp","type":"none","host":"","path":"","tls":"none","sni":"","fp":"","alpn":""}"#
        );
    }

    #[test]
    fn test_ws_inferred_from_options() {
        let mut proxy = vmess_proxy();
        proxy.ws_declared = true;
        proxy.path = Some("/ray".to_string());
        proxy.host = Some("cdn.example.com".to_string());
        proxy.tls = true;

        let json = decode(&vmess_to_uri(&proxy).unwrap());
        assert_eq!(json["net"], "ws");
        assert_eq!(json["path"], "/ray");
        assert_eq!(json["host"], "cdn.example.com");
        assert_eq!(json["sni"], "cdn.example.com");
        assert_eq!(json["tls"], "tls");
    }

    #[test]
    fn test_sni_fills_host() {
        let mut proxy = vmess_proxy();
        proxy.network = Some("ws".to_string());
        proxy.sni = Some("sni.example.com".to_string());

        let json = decode(&vmess_to_uri(&proxy).unwrap());
        assert_eq!(json["host"], "sni.example.com");
        assert_eq!(json["sni"], "sni.example.com");
    }

    #[test]
    fn test_http2_and_grpc() {
        let mut proxy = vmess_proxy();
        proxy.network = Some("http2".to_string());
        let json = decode(&vmess_to_uri(&proxy).unwrap());
        assert_eq!(json["net"], "h2");
        assert_eq!(json["path"], "/");

        let mut proxy = vmess_proxy();
        proxy.network = Some("grpc".to_string());
        proxy.service_name = Some("gun".to_string());
        let json = decode(&vmess_to_uri(&proxy).unwrap());
        assert_eq!(json["net"], "grpc");
        assert_eq!(json["path"], "gun");
    }

    #[test]
    fn test_header_type_inference() {
        let mut proxy = vmess_proxy();
        proxy.http_header = true;
        let json = decode(&vmess_to_uri(&proxy).unwrap());
        assert_eq!(json["net"], "tcp");
        assert_eq!(json["type"], "http");

        let mut proxy = vmess_proxy();
        proxy.network = Some("kcp".to_string());
        proxy.header_type = Some("wechat-video".to_string());
        let json = decode(&vmess_to_uri(&proxy).unwrap());
        assert_eq!(json["type"], "wechat-video");
    }

    #[test]
    fn test_quic_security_and_key() {
        let mut proxy = vmess_proxy();
        proxy.network = Some("quic".to_string());
        proxy.quic_security = Some("aes-128-gcm".to_string());
        proxy.quic_key = Some("secret".to_string());
        proxy.header_type = Some("srtp".to_string());

        let json = decode(&vmess_to_uri(&proxy).unwrap());
        assert_eq!(json["host"], "aes-128-gcm");
        assert_eq!(json["path"], "secret");
        assert_eq!(json["type"], "srtp");
    }

    #[test]
    fn test_insecure_spellings() {
        let mut proxy = vmess_proxy();
        proxy.skip_cert_verify = Some(true);
        proxy.udp = Some(false);

        let json = decode(&vmess_to_uri(&proxy).unwrap());
        assert_eq!(json["skip-cert-verify"], true);
        assert_eq!(json["allowInsecure"], true);
        assert_eq!(json["insecure"], true);
        assert_eq!(json["udp"], false);

        let json = decode(&vmess_to_uri(&vmess_proxy()).unwrap());
        assert!(json.get("insecure").is_none());
        assert!(json.get("udp").is_none());
    }

    #[test]
    fn test_requires_uuid() {
        let mut proxy = vmess_proxy();
        proxy.uuid = None;
        assert!(vmess_to_uri(&proxy).is_none());
    }
}
