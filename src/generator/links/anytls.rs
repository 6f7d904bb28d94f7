use crate::models::{non_empty, ProxyConfig};
use crate::utils::url::url_encode;

use super::{append_fragment, QueryParams};

/// Format: `anytls://password@server:port?params#name`
pub fn anytls_to_uri(proxy: &ProxyConfig) -> Option<String> {
    let password = non_empty(&proxy.password)?;
    let mut uri = format!("anytls://{}@{}", url_encode(password), proxy.authority());

    let mut params = QueryParams::new();
    params.push_opt("sni", proxy.sni.as_deref());
    params.push_opt("fp", proxy.fingerprint.as_deref());
    params.push_opt(
        "idle_session_check_interval",
        proxy.idle_session_check_interval.as_deref(),
    );
    params.push_opt("idle_session_timeout", proxy.idle_session_timeout.as_deref());
    params.push_opt("min_idle_session", proxy.min_idle_session.as_deref());
    params.push_flag("insecure", proxy.insecure());
    params.append_to(&mut uri);

    append_fragment(&mut uri, &proxy.name);
    Some(uri)
}
