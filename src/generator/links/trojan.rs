use crate::models::{non_empty, ProxyConfig};
use crate::utils::url::url_encode;

use super::{append_fragment, join_alpn, QueryParams};

/// Format: `trojan://password@server:port?params#name`
pub fn trojan_to_uri(proxy: &ProxyConfig) -> Option<String> {
    let password = non_empty(&proxy.password)?;
    let mut uri = format!("trojan://{}@{}", url_encode(password), proxy.authority());

    let mut params = QueryParams::new();
    params.push_opt("sni", proxy.sni.as_deref());
    params.push_opt("alpn", join_alpn(&proxy.alpn).as_deref());

    match non_empty(&proxy.network).map(str::to_ascii_lowercase).as_deref() {
        Some("ws") => {
            params.push_raw("type", "ws");
            params.push_opt("path", proxy.path.as_deref());
            params.push_opt("host", proxy.host.as_deref());
        }
        Some("grpc") => {
            params.push_raw("type", "grpc");
            params.push_opt("serviceName", proxy.service_name.as_deref());
        }
        _ => {}
    }

    params.push_opt("shadow-tls-password", proxy.shadow_tls_password.as_deref());
    params.push_opt("shadow-tls-sni", proxy.shadow_tls_sni.as_deref());
    params.push_flag("allowInsecure", proxy.insecure());
    params.append_to(&mut uri);

    append_fragment(&mut uri, &proxy.name);
    Some(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProtocolKind;

    fn trojan_proxy() -> ProxyConfig {
        let mut proxy = ProxyConfig::new(ProtocolKind::Trojan);
        proxy.name = "JP Trojan".to_string();
        proxy.server = "jp.example.com".to_string();
        proxy.port = 443;
        proxy.password = Some("p@ss word".to_string());
        proxy
    }

    #[test]
    fn test_minimal_link() {
        assert_eq!(
            trojan_to_uri(&trojan_proxy()).unwrap(),
            "trojan://p%40ss%20word@jp.example.com:443#JP%20Trojan"
        );
    }

    #[test]
    fn test_ws_transport() {
        let mut proxy = trojan_proxy();
        proxy.network = Some("ws".to_string());
        proxy.path = Some("/trojan".to_string());
        proxy.host = Some("cdn.example.com".to_string());
        proxy.sni = Some("jp.example.com".to_string());
        proxy.skip_cert_verify = Some(true);

        assert_eq!(
            trojan_to_uri(&proxy).unwrap(),
            "trojan://p%40ss%20word@jp.example.com:443?sni=jp.example.com&type=ws\
             &path=%2Ftrojan&host=cdn.example.com&allowInsecure=1#JP%20Trojan"
        );
    }

    #[test]
    fn test_grpc_and_shadow_tls() {
        let mut proxy = trojan_proxy();
        proxy.network = Some("grpc".to_string());
        proxy.service_name = Some("svc".to_string());
        proxy.shadow_tls_password = Some("stls".to_string());
        proxy.shadow_tls_sni = Some("www.apple.com".to_string());

        let uri = trojan_to_uri(&proxy).unwrap();
        assert!(uri.contains(
            "?type=grpc&serviceName=svc&shadow-tls-password=stls&shadow-tls-sni=www.apple.com#"
        ));
    }

    #[test]
    fn test_ipv6_server_is_bracketed() {
        let mut proxy = trojan_proxy();
        proxy.server = "2001:db8::1".to_string();
        proxy.name.clear();
        assert_eq!(
            trojan_to_uri(&proxy).unwrap(),
            "trojan://p%40ss%20word@[2001:db8::1]:443"
        );
    }
}
