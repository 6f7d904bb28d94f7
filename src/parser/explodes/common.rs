use std::collections::HashMap;

use log::debug;
use url::{Host, Url};

use crate::models::{scheme_of, ProtocolKind, ProxyConfig};
use crate::utils::url::url_decode;

/// Explode a share link into a ProxyConfig
///
/// The scheme is matched case-insensitively and the aliases `hy`, `hy2` and
/// `socks` are accepted. Returns `None` for unknown schemes, malformed links
/// and links without a server or port.
pub fn explode(link: &str) -> Option<ProxyConfig> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    let scheme = scheme_of(link).to_ascii_lowercase();
    let kind = ProtocolKind::from_type_tag(&scheme)?;
    let mut node = ProxyConfig::new(kind);

    let parsed = match kind {
        ProtocolKind::Shadowsocks => super::ss::explode_ss(link, &mut node),
        ProtocolKind::ShadowsocksR => super::ssr::explode_ssr(link, &mut node),
        ProtocolKind::VMess => super::vmess::explode_vmess(link, &mut node),
        ProtocolKind::Vless => super::vless::explode_vless(link, &mut node),
        ProtocolKind::Trojan => super::trojan::explode_trojan(link, &mut node),
        ProtocolKind::Hysteria | ProtocolKind::Hysteria2 => {
            super::hysteria::explode_hysteria(link, &mut node)
        }
        ProtocolKind::Tuic => super::tuic::explode_tuic(link, &mut node),
        ProtocolKind::AnyTls => super::anytls::explode_anytls(link, &mut node),
        ProtocolKind::Socks5 => super::socks::explode_socks(link, &mut node),
    };

    if !parsed || !node.is_valid() {
        debug!("Unable to explode {} link", scheme);
        return None;
    }
    Some(node)
}

/// A link parsed with `url`, with its query collected for lookups.
pub(crate) struct LinkParts {
    pub url: Url,
    pub params: HashMap<String, String>,
}

impl LinkParts {
    pub fn parse(link: &str) -> Option<Self> {
        let url = Url::parse(link).ok()?;
        let params = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Some(LinkParts { url, params })
    }

    /// Host without IPv6 brackets.
    pub fn host(&self) -> Option<String> {
        match self.url.host()? {
            Host::Domain(domain) => Some(url_decode(domain)),
            Host::Ipv4(addr) => Some(addr.to_string()),
            Host::Ipv6(addr) => Some(addr.to_string()),
        }
    }

    pub fn username(&self) -> String {
        url_decode(self.url.username())
    }

    pub fn password(&self) -> Option<String> {
        self.url.password().map(url_decode)
    }

    /// Decoded `#fragment`, or an empty string.
    pub fn name(&self) -> String {
        self.url.fragment().map(url_decode).unwrap_or_default()
    }

    /// First non-empty value among the given keys.
    pub fn get(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|k| self.params.get(*k))
            .find(|v| !v.is_empty())
            .cloned()
    }

    /// `1`/`true` under any of the given keys.
    pub fn flag(&self, keys: &[&str]) -> Option<bool> {
        keys.iter()
            .filter_map(|k| self.params.get(*k))
            .next()
            .map(|v| is_truthy(v))
    }

    pub fn alpn(&self) -> Vec<String> {
        self.get(&["alpn"])
            .map(|v| split_list(&v))
            .unwrap_or_default()
    }
}

pub(crate) fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Splits `host:port`, accepting bracketed IPv6 literals.
pub(crate) fn split_host_port(authority: &str) -> Option<(String, u16)> {
    let (host, port) = authority.rsplit_once(':')?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return None;
    }
    let port = port.trim().parse::<u16>().ok()?;
    Some((host.to_string(), port))
}
