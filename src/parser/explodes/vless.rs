use crate::models::{ProxyConfig, RealityOptions};

use super::common::LinkParts;

/// Parse a VLESS link into a ProxyConfig
pub fn explode_vless(vless: &str, node: &mut ProxyConfig) -> bool {
    let Some(link) = LinkParts::parse(vless) else {
        return false;
    };
    let Some(host) = link.host() else {
        return false;
    };

    node.uuid = Some(link.username()).filter(|u| !u.is_empty());
    node.server = host;
    node.port = link.url.port().unwrap_or(0);
    node.name = link.name();

    let net = link
        .get(&["type"])
        .unwrap_or_else(|| "tcp".to_string())
        .to_ascii_lowercase();
    match net.as_str() {
        "ws" => {
            node.ws_declared = true;
            node.path = link.get(&["path"]);
            node.host = link.get(&["host"]);
            node.early_data = link.get(&["ed"]);
        }
        "grpc" => {
            node.service_name = link.get(&["serviceName", "path"]);
            node.grpc_mode = link.get(&["mode"]);
        }
        _ => {
            node.path = link.get(&["path"]);
            node.host = link.get(&["host"]);
        }
    }
    node.header_type = link.get(&["headerType"]).filter(|h| h != "none");
    node.network = Some(net);

    match link.get(&["security"]).as_deref() {
        Some("reality") => {
            node.tls = true;
            node.reality = Some(RealityOptions {
                public_key: link.get(&["pbk"]),
                short_id: link.get(&["sid"]),
                spider_x: link.get(&["spx"]),
            });
        }
        Some("tls") | Some("xtls") => node.tls = true,
        _ => {}
    }
    node.sni = link.get(&["sni", "peer"]);
    node.fingerprint = link.get(&["fp"]);
    node.alpn = link.alpn();
    node.flow = link.get(&["flow"]);
    node.skip_cert_verify = link.flag(&["allowInsecure", "insecure"]);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProtocolKind;

    fn explode(link: &str) -> ProxyConfig {
        let mut node = ProxyConfig::new(ProtocolKind::Vless);
        assert!(explode_vless(link, &mut node));
        node
    }

    #[test]
    fn test_ws_link() {
        let node = explode("vless://uuid@sg.example.com:443?type=ws#Singapore-Fast");
        assert_eq!(node.uuid.as_deref(), Some("uuid"));
        assert_eq!(node.server, "sg.example.com");
        assert_eq!(node.port, 443);
        assert_eq!(node.network.as_deref(), Some("ws"));
        assert_eq!(node.name, "Singapore-Fast");
        assert!(!node.tls);
    }

    #[test]
    fn test_reality_link() {
        let node = explode(
            "vless://uuid@1.2.3.4:443?encryption=none&security=reality&sni=www.apple.com\
             &fp=chrome&pbk=KEY&sid=ab&flow=xtls-rprx-vision&type=tcp&headerType=none",
        );
        assert!(node.tls);
        let reality = node.reality.unwrap();
        assert_eq!(reality.public_key.as_deref(), Some("KEY"));
        assert_eq!(reality.short_id.as_deref(), Some("ab"));
        assert_eq!(node.sni.as_deref(), Some("www.apple.com"));
        assert_eq!(node.flow.as_deref(), Some("xtls-rprx-vision"));
        assert_eq!(node.header_type, None);
    }

    #[test]
    fn test_encoded_path_and_grpc() {
        let node = explode("vless://u@h.com:443?type=ws&path=%2Fws%3Fed%3D2048&security=tls");
        assert_eq!(node.path.as_deref(), Some("/ws?ed=2048"));

        let node = explode("vless://u@h.com:443?type=grpc&serviceName=gun&mode=gun");
        assert_eq!(node.service_name.as_deref(), Some("gun"));
        assert_eq!(node.grpc_mode.as_deref(), Some("gun"));
    }
}
