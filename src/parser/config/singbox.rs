use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

use crate::models::{ProtocolKind, ProxyConfig, RealityOptions};
use crate::parser::explodes::parse_plugin_string;

use super::clash::HeaderOpts;
use super::de::{bool_like, string_or_number, string_or_seq};
use super::{first, stringify_extra};

#[derive(Debug, Default, Deserialize)]
pub struct SingboxUtls {
    #[serde(default, deserialize_with = "string_or_number")]
    pub fingerprint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SingboxReality {
    #[serde(default, deserialize_with = "bool_like")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub public_key: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub short_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SingboxTls {
    #[serde(default, deserialize_with = "bool_like")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub server_name: Option<String>,
    #[serde(default, deserialize_with = "bool_like")]
    pub insecure: Option<bool>,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub alpn: Vec<String>,
    #[serde(default)]
    pub utls: Option<SingboxUtls>,
    #[serde(default)]
    pub reality: Option<SingboxReality>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SingboxTransport {
    #[serde(rename = "type", default, deserialize_with = "string_or_number")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub path: Option<String>,
    #[serde(default)]
    pub headers: Option<HeaderOpts>,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub host: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub service_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub max_early_data: Option<String>,
}

/// Hysteria v1 carries the obfs password as a plain string, Hysteria2 as
/// `{type, password}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SingboxObfs {
    Plain(String),
    Typed {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
}

/// One entry of a Sing-box `outbounds:` list.
#[derive(Debug, Default, Deserialize)]
pub struct SingboxOutbound {
    #[serde(rename = "type", default, deserialize_with = "string_or_number")]
    pub outbound_type: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub server: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub server_port: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub auth_str: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub uuid: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub flow: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub alter_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub security: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub congestion_control: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub udp_relay_mode: Option<String>,
    #[serde(default)]
    pub obfs: Option<SingboxObfs>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub idle_session_check_interval: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub idle_session_timeout: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub min_idle_session: Option<String>,

    #[serde(default)]
    pub tls: Option<SingboxTls>,
    #[serde(default)]
    pub transport: Option<SingboxTransport>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub plugin: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub plugin_opts: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SingboxOutbound {
    /// Maps the outbound onto a ProxyConfig.
    ///
    /// Selector, direct, urltest and other outbounds without an endpoint
    /// yield `None`.
    pub fn into_proxy(self) -> Option<ProxyConfig> {
        let kind = ProtocolKind::from_type_tag(self.outbound_type.as_deref()?)?;
        let server = self.server.filter(|s| !s.trim().is_empty())?;
        let port = self.server_port.as_deref()?.trim().parse::<u16>().ok()?;
        if port == 0 {
            return None;
        }

        let mut node = ProxyConfig::new(kind);
        node.name = self.tag.unwrap_or_default();
        node.server = server.trim().to_string();
        node.port = port;

        node.username = self.username;
        node.password = first([self.password, self.auth_str]);
        node.uuid = self.uuid;
        node.flow = self.flow;
        node.alter_id = self
            .alter_id
            .and_then(|a| a.trim().parse::<u32>().ok())
            .unwrap_or(0);
        node.cipher = match kind {
            ProtocolKind::VMess => self.security,
            _ => self.method,
        };

        node.congestion_control = self.congestion_control;
        node.udp_relay_mode = self.udp_relay_mode;
        match self.obfs {
            Some(SingboxObfs::Plain(obfs)) => node.obfs = Some(obfs).filter(|o| !o.is_empty()),
            Some(SingboxObfs::Typed { kind, password }) => {
                node.obfs = kind;
                node.obfs_password = password;
            }
            None => {}
        }
        node.idle_session_check_interval = self.idle_session_check_interval;
        node.idle_session_timeout = self.idle_session_timeout;
        node.min_idle_session = self.min_idle_session;

        if let Some(tls) = self.tls {
            node.tls = tls.enabled.unwrap_or(false);
            node.sni = tls.server_name;
            node.skip_cert_verify = tls.insecure;
            node.alpn = tls.alpn;
            node.fingerprint = tls.utls.and_then(|u| u.fingerprint);
            node.reality = tls
                .reality
                .filter(|r| r.enabled != Some(false))
                .map(|r| RealityOptions {
                    public_key: r.public_key,
                    short_id: r.short_id,
                    spider_x: None,
                });
        }

        if let Some(transport) = self.transport {
            let net = transport
                .kind
                .map(|k| k.to_ascii_lowercase())
                .unwrap_or_default();
            let header_host = transport.headers.and_then(|h| h.host.into_iter().next());
            match net.as_str() {
                "ws" => {
                    node.ws_declared = true;
                    node.path = transport.path;
                    node.host = header_host.or(transport.host.into_iter().next());
                    node.early_data = transport.max_early_data;
                }
                "http" | "h2" | "httpupgrade" => {
                    node.path = transport.path;
                    node.host = transport.host.into_iter().next().or(header_host);
                }
                "grpc" => node.service_name = transport.service_name,
                _ => {}
            }
            if !net.is_empty() {
                node.network = Some(if net == "http" { "h2".to_string() } else { net });
            }
        }

        if let Some(plugin) = self.plugin.filter(|p| !p.is_empty()) {
            let plugin_string = match self.plugin_opts.filter(|o| !o.is_empty()) {
                Some(opts) => format!("{};{}", plugin, opts),
                None => plugin,
            };
            let (name, opts) = parse_plugin_string(&plugin_string);
            node.plugin = Some(name);
            node.plugin_opts = opts;
        }

        node.extra = stringify_extra(self.extra);
        Some(node)
    }
}
