//! Share-link encoders
//!
//! One encoder per [`ProtocolKind`]; [`proxy_to_uri`] dispatches over the
//! closed enum. Encoders return `None` when the config lacks the server, the
//! port or the protocol's primary credential.

mod anytls;
mod hysteria;
mod socks;
mod ss;
mod ssr;
mod trojan;
mod tuic;
mod vless;
mod vmess;

pub use anytls::anytls_to_uri;
pub use hysteria::hysteria_to_uri;
pub use socks::socks5_to_uri;
pub use ss::{build_plugin_string, ss_to_uri};
pub use ssr::ssr_to_uri;
pub use trojan::trojan_to_uri;
pub use tuic::tuic_to_uri;
pub use vless::{split_early_data, vless_to_uri};
pub use vmess::vmess_to_uri;

use log::debug;

use crate::models::{ProtocolKind, ProxyConfig};
use crate::utils::url::url_encode;

/// Convert a proxy to a single share link
///
/// # Returns
/// * `Some(link)` for a convertible config
/// * `None` when the config is missing required fields
pub fn proxy_to_uri(proxy: &ProxyConfig) -> Option<String> {
    if !proxy.is_valid() {
        debug!(
            "Skipping {} proxy '{}': missing server or port",
            proxy.kind, proxy.name
        );
        return None;
    }

    let uri = match proxy.kind {
        ProtocolKind::Shadowsocks => ss_to_uri(proxy),
        ProtocolKind::ShadowsocksR => ssr_to_uri(proxy),
        ProtocolKind::VMess => vmess_to_uri(proxy),
        ProtocolKind::Vless => vless_to_uri(proxy),
        ProtocolKind::Trojan => trojan_to_uri(proxy),
        ProtocolKind::Hysteria | ProtocolKind::Hysteria2 => hysteria_to_uri(proxy),
        ProtocolKind::Tuic => tuic_to_uri(proxy),
        ProtocolKind::AnyTls => anytls_to_uri(proxy),
        ProtocolKind::Socks5 => socks5_to_uri(proxy),
    };

    if uri.is_none() {
        debug!(
            "Skipping {} proxy '{}': missing credentials",
            proxy.kind, proxy.name
        );
    }
    uri
}

/// Ordered query parameters of a share link.
#[derive(Debug, Default)]
pub(crate) struct QueryParams {
    pairs: Vec<String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key=value` with the value percent-encoded.
    pub fn push(&mut self, key: &str, value: &str) {
        self.pairs.push(format!("{}={}", key, url_encode(value)));
    }

    /// Appends `key=value` verbatim.
    pub fn push_raw(&mut self, key: &str, value: &str) {
        self.pairs.push(format!("{}={}", key, value));
    }

    pub fn push_opt(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.push(key, v);
        }
    }

    pub fn push_flag(&mut self, key: &str, enabled: bool) {
        if enabled {
            self.push_raw(key, "1");
        }
    }

    /// Appends `?query` to the link when any parameter was set.
    pub fn append_to(self, uri: &mut String) {
        if !self.pairs.is_empty() {
            uri.push('?');
            uri.push_str(&self.pairs.join("&"));
        }
    }
}

/// Appends `#name` when the name is not empty.
pub(crate) fn append_fragment(uri: &mut String, name: &str) {
    if !name.is_empty() {
        uri.push('#');
        uri.push_str(&url_encode(name));
    }
}

pub(crate) fn join_alpn(alpn: &[String]) -> Option<String> {
    let joined = alpn
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
