//! Proxy model definitions
//!
//! Contains the structured, protocol-agnostic representation of a proxy that
//! sits between subscription documents and share links.

use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Represents the protocol of a proxy.
/// This is the closed set of protocols the link codecs understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolKind {
    #[serde(rename = "ss")]
    Shadowsocks,
    #[serde(rename = "ssr")]
    ShadowsocksR,
    #[serde(rename = "vmess")]
    VMess,
    #[serde(rename = "vless")]
    Vless,
    #[serde(rename = "trojan")]
    Trojan,
    #[serde(rename = "hysteria")]
    Hysteria,
    #[serde(rename = "hysteria2")]
    Hysteria2,
    #[serde(rename = "tuic")]
    Tuic,
    #[serde(rename = "anytls")]
    AnyTls,
    #[serde(rename = "socks5")]
    Socks5,
}

impl ProtocolKind {
    /// All protocol kinds, in the order links are usually listed.
    pub const ALL: [ProtocolKind; 10] = [
        ProtocolKind::Shadowsocks,
        ProtocolKind::ShadowsocksR,
        ProtocolKind::VMess,
        ProtocolKind::Vless,
        ProtocolKind::Trojan,
        ProtocolKind::Hysteria,
        ProtocolKind::Hysteria2,
        ProtocolKind::Tuic,
        ProtocolKind::AnyTls,
        ProtocolKind::Socks5,
    ];

    /// Resolves a Clash/Sing-box `type` value or a link scheme.
    ///
    /// Matching is case-insensitive and accepts the common aliases
    /// (`shadowsocks`, `hy2`, `socks`, ...).
    pub fn from_type_tag(tag: &str) -> Option<ProtocolKind> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "ss" | "shadowsocks" => Some(ProtocolKind::Shadowsocks),
            "ssr" | "shadowsocksr" => Some(ProtocolKind::ShadowsocksR),
            "vmess" => Some(ProtocolKind::VMess),
            "vless" => Some(ProtocolKind::Vless),
            "trojan" => Some(ProtocolKind::Trojan),
            "hysteria" | "hy" => Some(ProtocolKind::Hysteria),
            "hysteria2" | "hy2" => Some(ProtocolKind::Hysteria2),
            "tuic" => Some(ProtocolKind::Tuic),
            "anytls" => Some(ProtocolKind::AnyTls),
            "socks5" | "socks" => Some(ProtocolKind::Socks5),
            _ => None,
        }
    }

    /// Lower-cased declared type of the protocol.
    pub fn type_tag(self) -> &'static str {
        match self {
            ProtocolKind::Shadowsocks => "ss",
            ProtocolKind::ShadowsocksR => "ssr",
            ProtocolKind::VMess => "vmess",
            ProtocolKind::Vless => "vless",
            ProtocolKind::Trojan => "trojan",
            ProtocolKind::Hysteria => "hysteria",
            ProtocolKind::Hysteria2 => "hysteria2",
            ProtocolKind::Tuic => "tuic",
            ProtocolKind::AnyTls => "anytls",
            ProtocolKind::Socks5 => "socks5",
        }
    }

    /// Scheme emitted by the link encoder.
    ///
    /// Hysteria v1 configs are written as `hysteria2://` links.
    pub fn scheme(self) -> &'static str {
        match self {
            ProtocolKind::Hysteria => "hysteria2",
            other => other.type_tag(),
        }
    }

    /// Human-readable protocol name.
    pub fn display_name(self) -> &'static str {
        match self {
            ProtocolKind::Shadowsocks => "SS",
            ProtocolKind::ShadowsocksR => "SSR",
            ProtocolKind::VMess => "VMess",
            ProtocolKind::Vless => "VLESS",
            ProtocolKind::Trojan => "Trojan",
            ProtocolKind::Hysteria => "Hysteria",
            ProtocolKind::Hysteria2 => "Hysteria2",
            ProtocolKind::Tuic => "TUIC",
            ProtocolKind::AnyTls => "AnyTLS",
            ProtocolKind::Socks5 => "SOCKS5",
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A SIP003 plugin option value.
///
/// Boolean options render as bare flags when `true` and are dropped when
/// `false`; everything else is carried as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginOption {
    Flag(bool),
    Text(String),
}

impl PluginOption {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PluginOption::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// REALITY handshake options (VLESS).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealityOptions {
    pub public_key: Option<String>,
    pub short_id: Option<String>,
    pub spider_x: Option<String>,
}

/// Represents a proxy configuration.
///
/// A config is only convertible to a link when `server` is non-empty and
/// `port` is non-zero, see [`ProxyConfig::is_valid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub kind: ProtocolKind,
    pub name: String,
    pub server: String,
    pub port: u16,

    pub username: Option<String>,
    pub password: Option<String>,
    pub uuid: Option<String>,
    pub cipher: Option<String>,
    pub alter_id: u32,

    /// SSR protocol / obfs
    pub protocol: Option<String>,
    pub protocol_param: Option<String>,
    pub obfs: Option<String>,
    pub obfs_param: Option<String>,
    /// Hysteria2 salamander password
    pub obfs_password: Option<String>,

    pub plugin: Option<String>,
    pub plugin_opts: LinkedHashMap<String, PluginOption>,

    pub network: Option<String>,
    pub path: Option<String>,
    pub host: Option<String>,
    pub service_name: Option<String>,
    pub grpc_mode: Option<String>,
    pub early_data: Option<String>,
    pub header_type: Option<String>,
    /// `http-opts` (or `obfs: http`) was declared on a tcp transport
    pub http_header: bool,
    /// WebSocket options were declared even if `network` was not
    pub ws_declared: bool,
    pub quic_security: Option<String>,
    pub quic_key: Option<String>,

    pub tls: bool,
    pub sni: Option<String>,
    pub alpn: Vec<String>,
    pub fingerprint: Option<String>,
    pub reality: Option<RealityOptions>,
    pub flow: Option<String>,

    pub udp: Option<bool>,
    pub skip_cert_verify: Option<bool>,

    pub shadow_tls_password: Option<String>,
    pub shadow_tls_sni: Option<String>,

    pub congestion_control: Option<String>,
    pub udp_relay_mode: Option<String>,
    pub disable_sni: bool,

    pub idle_session_check_interval: Option<String>,
    pub idle_session_timeout: Option<String>,
    pub min_idle_session: Option<String>,

    /// Fields the codecs do not model, kept for round-tripping
    pub extra: BTreeMap<String, String>,
}

impl ProxyConfig {
    pub fn new(kind: ProtocolKind) -> Self {
        ProxyConfig {
            kind,
            name: String::new(),
            server: String::new(),
            port: 0,
            username: None,
            password: None,
            uuid: None,
            cipher: None,
            alter_id: 0,
            protocol: None,
            protocol_param: None,
            obfs: None,
            obfs_param: None,
            obfs_password: None,
            plugin: None,
            plugin_opts: LinkedHashMap::new(),
            network: None,
            path: None,
            host: None,
            service_name: None,
            grpc_mode: None,
            early_data: None,
            header_type: None,
            http_header: false,
            ws_declared: false,
            quic_security: None,
            quic_key: None,
            tls: false,
            sni: None,
            alpn: Vec::new(),
            fingerprint: None,
            reality: None,
            flow: None,
            udp: None,
            skip_cert_verify: None,
            shadow_tls_password: None,
            shadow_tls_sni: None,
            congestion_control: None,
            udp_relay_mode: None,
            disable_sni: false,
            idle_session_check_interval: None,
            idle_session_timeout: None,
            min_idle_session: None,
            extra: BTreeMap::new(),
        }
    }

    /// Server address and port are both present.
    pub fn is_valid(&self) -> bool {
        !self.server.trim().is_empty() && self.port != 0
    }

    pub fn insecure(&self) -> bool {
        self.skip_cert_verify == Some(true)
    }

    /// `host:port`, bracketing IPv6 literals.
    pub fn authority(&self) -> String {
        if self.server.contains(':') && !self.server.starts_with('[') {
            format!("[{}]:{}", self.server, self.port)
        } else {
            format!("{}:{}", self.server, self.port)
        }
    }
}

/// Returns the value when it is present and not blank.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
