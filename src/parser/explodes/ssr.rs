use crate::models::ProxyConfig;
use crate::utils::base64::{base64_decode, try_base64_decode};

/// Parse a ShadowsocksR link into a ProxyConfig
///
/// Body: `BASE64(server:port:protocol:method:obfs:BASE64(password))`. The
/// `/?protoparam=..&obfsparam=..&remarks=..` query may sit inside or after
/// the Base64 body.
pub fn explode_ssr(ssr: &str, node: &mut ProxyConfig) -> bool {
    let Some((_, body)) = ssr.split_once("://") else {
        return false;
    };
    let body = body.split('#').next().unwrap_or("");
    let (body, outer_query) = split_query(body);
    let decoded = match try_base64_decode(body) {
        Ok(decoded) => decoded,
        Err(_) => return false,
    };

    let (main, inner_query) = split_query(&decoded);
    let query = format!("{}&{}", inner_query, outer_query);

    // The server may be an IPv6 literal, so split from the right.
    let mut fields: Vec<&str> = main.rsplitn(6, ':').collect();
    if fields.len() != 6 {
        return false;
    }
    fields.reverse();
    let port = match fields[1].parse::<u16>() {
        Ok(port) => port,
        Err(_) => return false,
    };

    node.server = fields[0].trim_matches(|c| c == '[' || c == ']').to_string();
    node.port = port;
    node.protocol = Some(fields[2].to_string());
    node.cipher = Some(fields[3].to_string());
    node.obfs = Some(fields[4].to_string());
    node.password = Some(base64_decode(fields[5]));

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = base64_decode(&value);
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "protoparam" => node.protocol_param = Some(value),
            "obfsparam" => node.obfs_param = Some(value),
            "remarks" => node.name = value,
            _ => {}
        }
    }
    true
}

fn split_query(text: &str) -> (&str, &str) {
    text.split_once("/?")
        .or_else(|| text.split_once('?'))
        .unwrap_or((text, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProtocolKind;
    use crate::utils::base64::{base64_encode, url_safe_base64_encode};

    #[test]
    fn test_explode_ssr() {
        let body = format!(
            "jp.example.com:8443:auth_aes128_md5:aes-128-cfb:tls1.2_ticket_auth:{}/?obfsparam={}&remarks={}",
            base64_encode("pw"),
            url_safe_base64_encode("cdn.example.com"),
            url_safe_base64_encode("日本 01"),
        );
        let link = format!("ssr://{}", url_safe_base64_encode(&body));

        let mut node = ProxyConfig::new(ProtocolKind::ShadowsocksR);
        assert!(explode_ssr(&link, &mut node));
        assert_eq!(node.server, "jp.example.com");
        assert_eq!(node.port, 8443);
        assert_eq!(node.protocol.as_deref(), Some("auth_aes128_md5"));
        assert_eq!(node.cipher.as_deref(), Some("aes-128-cfb"));
        assert_eq!(node.obfs.as_deref(), Some("tls1.2_ticket_auth"));
        assert_eq!(node.password.as_deref(), Some("pw"));
        assert_eq!(node.obfs_param.as_deref(), Some("cdn.example.com"));
        assert_eq!(node.protocol_param, None);
        assert_eq!(node.name, "日本 01");
    }

    #[test]
    fn test_query_after_body() {
        let link = format!(
            "ssr://{}/?remarks={}",
            base64_encode(&format!("1.2.3.4:80:origin:none:plain:{}", base64_encode("pw"))),
            url_safe_base64_encode("Outer"),
        );
        let mut node = ProxyConfig::new(ProtocolKind::ShadowsocksR);
        assert!(explode_ssr(&link, &mut node));
        assert_eq!(node.server, "1.2.3.4");
        assert_eq!(node.name, "Outer");
    }

    #[test]
    fn test_rejects_short_body() {
        let link = format!("ssr://{}", base64_encode("host:443:origin"));
        let mut node = ProxyConfig::new(ProtocolKind::ShadowsocksR);
        assert!(!explode_ssr(&link, &mut node));
    }
}
