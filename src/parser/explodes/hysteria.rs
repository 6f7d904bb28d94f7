use crate::models::ProxyConfig;

use super::common::LinkParts;

/// Parse a Hysteria/Hysteria2 link into a ProxyConfig
///
/// Handles the `hysteria2://`, `hy2://`, `hysteria://` and `hy://` schemes.
/// The auth string is read from the userinfo, or the `auth` parameter.
pub fn explode_hysteria(hysteria: &str, node: &mut ProxyConfig) -> bool {
    let Some(link) = LinkParts::parse(hysteria) else {
        return false;
    };
    let Some(host) = link.host() else {
        return false;
    };

    node.server = host;
    node.port = link.url.port().unwrap_or(443);
    node.name = link.name();
    node.tls = true;

    let user = link.username();
    node.password = match link.password() {
        // `user:pass` userinfo
        Some(pass) if !user.is_empty() => Some(format!("{}:{}", user, pass)),
        _ if !user.is_empty() => Some(user),
        _ => link.get(&["auth", "auth_str"]),
    };

    node.sni = link.get(&["sni", "peer"]);
    node.obfs = link.get(&["obfs"]);
    node.obfs_password = link.get(&["obfs-password", "obfsParam"]);
    node.alpn = link.alpn();
    node.skip_cert_verify = link.flag(&["insecure", "allowInsecure"]);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProtocolKind;

    #[test]
    fn test_hysteria2() {
        let mut node = ProxyConfig::new(ProtocolKind::Hysteria2);
        assert!(explode_hysteria(
            "hysteria2://secret@hy.example.com:8443?sni=hy.example.com&obfs=salamander\
             &obfs-password=obfs%20pw&insecure=1#HY2",
            &mut node
        ));
        assert_eq!(node.password.as_deref(), Some("secret"));
        assert_eq!(node.server, "hy.example.com");
        assert_eq!(node.port, 8443);
        assert_eq!(node.obfs_password.as_deref(), Some("obfs pw"));
        assert_eq!(node.skip_cert_verify, Some(true));
        assert_eq!(node.name, "HY2");
    }

    #[test]
    fn test_hy_alias_with_auth_param() {
        let mut node = ProxyConfig::new(ProtocolKind::Hysteria);
        assert!(explode_hysteria(
            "hy://hy.server.com:36712?auth=token&peer=sni.com&alpn=h3",
            &mut node
        ));
        assert_eq!(node.password.as_deref(), Some("token"));
        assert_eq!(node.sni.as_deref(), Some("sni.com"));
        assert_eq!(node.alpn, vec!["h3"]);
        assert!(node.name.is_empty());
    }
}
