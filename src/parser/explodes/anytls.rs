use crate::models::ProxyConfig;

use super::common::LinkParts;

/// Parse an AnyTLS link into a ProxyConfig
pub fn explode_anytls(anytls: &str, node: &mut ProxyConfig) -> bool {
    let Some(link) = LinkParts::parse(anytls) else {
        return false;
    };
    let Some(host) = link.host() else {
        return false;
    };

    node.password = Some(link.username()).filter(|p| !p.is_empty());
    node.server = host;
    node.port = link.url.port().unwrap_or(0);
    node.name = link.name();
    node.tls = true;

    node.sni = link.get(&["sni", "peer"]);
    node.fingerprint = link.get(&["fp"]);
    node.idle_session_check_interval = link.get(&["idle_session_check_interval"]);
    node.idle_session_timeout = link.get(&["idle_session_timeout"]);
    node.min_idle_session = link.get(&["min_idle_session"]);
    node.skip_cert_verify = link.flag(&["insecure", "allowInsecure"]);
    true
}
