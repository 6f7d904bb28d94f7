use crate::models::{non_empty, ProxyConfig};
use crate::utils::base64::{base64_encode, url_safe_base64_encode};

/// Format: `ssr://BASE64(server:port:protocol:method:obfs:BASE64(password))[/?protoparam=..&obfsparam=..&remarks=..]`
///
/// Each parameter value is URL-safe Base64 on its own so it survives query
/// decoding.
pub fn ssr_to_uri(proxy: &ProxyConfig) -> Option<String> {
    let cipher = non_empty(&proxy.cipher)?;
    let password = proxy.password.as_deref()?;

    let plain_text = format!(
        "{}:{}:{}:{}:{}:{}",
        proxy.server,
        proxy.port,
        non_empty(&proxy.protocol).unwrap_or("origin"),
        cipher,
        non_empty(&proxy.obfs).unwrap_or("plain"),
        base64_encode(password)
    );
    let mut uri = format!("ssr://{}", base64_encode(&plain_text));

    let mut params = Vec::new();
    if let Some(param) = non_empty(&proxy.protocol_param) {
        params.push(format!("protoparam={}", url_safe_base64_encode(param)));
    }
    if let Some(param) = non_empty(&proxy.obfs_param) {
        params.push(format!("obfsparam={}", url_safe_base64_encode(param)));
    }
    if !proxy.name.is_empty() {
        params.push(format!("remarks={}", url_safe_base64_encode(&proxy.name)));
    }

    if !params.is_empty() {
        uri.push_str("/?");
        uri.push_str(&params.join("&"));
    }
    Some(uri)
}
