use crate::models::{non_empty, ProxyConfig};
use crate::utils::url::url_encode;

use super::{append_fragment, join_alpn, QueryParams};

/// Format: `hysteria2://auth@server:port?params#name`
///
/// Hysteria v1 configs share the v2 link layout.
pub fn hysteria_to_uri(proxy: &ProxyConfig) -> Option<String> {
    let mut uri = format!("{}://", proxy.kind.scheme());
    if let Some(auth) = non_empty(&proxy.password) {
        uri.push_str(&url_encode(auth));
        uri.push('@');
    }
    uri.push_str(&proxy.authority());

    let mut params = QueryParams::new();
    params.push_opt("sni", proxy.sni.as_deref());
    params.push_opt("obfs", proxy.obfs.as_deref());
    params.push_opt("obfs-password", proxy.obfs_password.as_deref());
    params.push_opt("alpn", join_alpn(&proxy.alpn).as_deref());
    params.push_flag("insecure", proxy.insecure());
    params.append_to(&mut uri);

    append_fragment(&mut uri, &proxy.name);
    Some(uri)
}
