use crate::models::ProxyConfig;

use super::common::LinkParts;

/// Parse a Trojan link into a ProxyConfig
pub fn explode_trojan(trojan: &str, node: &mut ProxyConfig) -> bool {
    let Some(link) = LinkParts::parse(trojan) else {
        return false;
    };

    // Extract password
    let password = link.username();
    if password.is_empty() {
        return false;
    }
    let Some(host) = link.host() else {
        return false;
    };

    node.password = Some(password);
    node.server = host;
    node.port = link.url.port().unwrap_or(443);
    node.name = link.name();
    node.tls = true;

    // SNI - check for both "sni" and "peer" parameters
    node.sni = link.get(&["sni", "peer"]);
    node.alpn = link.alpn();

    let ws = link.get(&["ws"]).is_some_and(|v| v == "1");
    match link.get(&["type"]).as_deref() {
        Some("ws") => {
            node.network = Some("ws".to_string());
            node.ws_declared = true;
            node.path = link.get(&["path"]);
            node.host = link.get(&["host"]);
        }
        Some("grpc") => {
            node.network = Some("grpc".to_string());
            node.service_name = link.get(&["serviceName"]);
        }
        _ if ws => {
            node.network = Some("ws".to_string());
            node.ws_declared = true;
            node.path = link.get(&["wspath"]);
        }
        _ => {}
    }

    node.shadow_tls_password = link.get(&["shadow-tls-password"]);
    node.shadow_tls_sni = link.get(&["shadow-tls-sni"]);
    node.skip_cert_verify = link.flag(&["allowInsecure", "insecure"]);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProtocolKind;

    fn explode(link: &str) -> Option<ProxyConfig> {
        let mut node = ProxyConfig::new(ProtocolKind::Trojan);
        explode_trojan(link, &mut node).then_some(node)
    }

    #[test]
    fn test_trojan_ws() {
        let node = explode(
            "trojan://p%40ss%20word@jp.example.com:8443?peer=jp.example.com&type=ws\
             &path=%2Ftrojan&host=cdn.example.com&allowInsecure=1#JP%20Trojan",
        )
        .unwrap();
        assert_eq!(node.password.as_deref(), Some("p@ss word"));
        assert_eq!(node.port, 8443);
        assert_eq!(node.sni.as_deref(), Some("jp.example.com"));
        assert_eq!(node.network.as_deref(), Some("ws"));
        assert_eq!(node.path.as_deref(), Some("/trojan"));
        assert_eq!(node.host.as_deref(), Some("cdn.example.com"));
        assert_eq!(node.skip_cert_verify, Some(true));
        assert_eq!(node.name, "JP Trojan");
    }

    #[test]
    fn test_default_port_and_missing_password() {
        let node = explode("trojan://pw@example.com").unwrap();
        assert_eq!(node.port, 443);
        assert!(explode("trojan://example.com:443").is_none());
    }
}
