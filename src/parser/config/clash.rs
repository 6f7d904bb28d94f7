use linked_hash_map::LinkedHashMap;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

use crate::models::{PluginOption, ProtocolKind, ProxyConfig, RealityOptions};

use super::de::{bool_like, string_or_number, string_or_seq};
use super::{first, scalar_text, stringify_extra};

#[derive(Debug, Default, Deserialize)]
pub struct HeaderOpts {
    #[serde(rename = "Host", alias = "host", default, deserialize_with = "string_or_seq")]
    pub host: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WsOpts {
    #[serde(default, deserialize_with = "string_or_number")]
    pub path: Option<String>,
    #[serde(default)]
    pub headers: Option<HeaderOpts>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub max_early_data: Option<String>,
}

/// `h2-opts`, `http-opts`, `httpupgrade-opts`, `splithttp-opts`
#[derive(Debug, Default, Deserialize)]
pub struct HttpOpts {
    #[serde(default, deserialize_with = "string_or_seq")]
    pub path: Vec<String>,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub host: Vec<String>,
    #[serde(default)]
    pub headers: Option<HeaderOpts>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GrpcOpts {
    #[serde(default, deserialize_with = "string_or_number")]
    pub grpc_service_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HeaderType {
    #[serde(rename = "type", default, deserialize_with = "string_or_number")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KcpOpts {
    #[serde(default)]
    pub header: Option<HeaderType>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuicOpts {
    #[serde(default, deserialize_with = "string_or_number")]
    pub security: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub key: Option<String>,
    #[serde(default)]
    pub header: Option<HeaderType>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClashRealityOpts {
    #[serde(default, alias = "public_key", deserialize_with = "string_or_number")]
    pub public_key: Option<String>,
    #[serde(default, alias = "short_id", deserialize_with = "string_or_number")]
    pub short_id: Option<String>,
    #[serde(default, alias = "spider", deserialize_with = "string_or_number")]
    pub spider_x: Option<String>,
}

/// One entry of a Clash `proxies:` list.
///
/// Every field is optional so a single malformed entry cannot fail the
/// whole document; missing essentials are rejected in [`ClashProxy::into_proxy`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClashProxy {
    #[serde(default, deserialize_with = "string_or_number")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "string_or_number")]
    pub proxy_type: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub server: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub port: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub cipher: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub auth: Option<String>,
    #[serde(default, alias = "auth_str", deserialize_with = "string_or_number")]
    pub auth_str: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub uuid: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub username: Option<String>,
    #[serde(rename = "alterId", default, deserialize_with = "string_or_number")]
    pub alter_id: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub protocol: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub protocol_param: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub obfs: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub obfs_param: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub obfs_password: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub plugin: Option<String>,
    #[serde(default)]
    pub plugin_opts: Option<LinkedHashMap<String, Value>>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub network: Option<String>,
    #[serde(default)]
    pub ws_opts: Option<WsOpts>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub ws_path: Option<String>,
    #[serde(default)]
    pub ws_headers: Option<HeaderOpts>,
    #[serde(default)]
    pub h2_opts: Option<HttpOpts>,
    #[serde(default)]
    pub http_opts: Option<HttpOpts>,
    #[serde(default)]
    pub grpc_opts: Option<GrpcOpts>,
    #[serde(rename = "serviceName", default, deserialize_with = "string_or_number")]
    pub service_name: Option<String>,
    #[serde(default)]
    pub httpupgrade_opts: Option<HttpOpts>,
    #[serde(default)]
    pub splithttp_opts: Option<HttpOpts>,
    #[serde(default)]
    pub kcp_opts: Option<KcpOpts>,
    #[serde(default)]
    pub quic_opts: Option<QuicOpts>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub host: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub max_early_data: Option<String>,

    #[serde(default, deserialize_with = "bool_like")]
    pub tls: Option<bool>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub servername: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sni: Option<String>,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub alpn: Vec<String>,
    #[serde(default, alias = "fingerprint", deserialize_with = "string_or_number")]
    pub client_fingerprint: Option<String>,
    #[serde(default, alias = "reality_opts")]
    pub reality_opts: Option<ClashRealityOpts>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub flow: Option<String>,

    #[serde(default, deserialize_with = "bool_like")]
    pub udp: Option<bool>,
    #[serde(default, deserialize_with = "bool_like")]
    pub skip_cert_verify: Option<bool>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub shadow_tls_password: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub shadow_tls_sni: Option<String>,

    #[serde(
        default,
        alias = "congestion_controller",
        alias = "congestion_control",
        deserialize_with = "string_or_number"
    )]
    pub congestion_controller: Option<String>,
    #[serde(default, alias = "udp_relay_mode", deserialize_with = "string_or_number")]
    pub udp_relay_mode: Option<String>,
    #[serde(default, alias = "disable_sni", deserialize_with = "bool_like")]
    pub disable_sni: Option<bool>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub idle_session_check_interval: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub idle_session_timeout: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub min_idle_session: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ClashProxy {
    /// Maps the entry onto a ProxyConfig.
    ///
    /// Returns `None` for an unknown type or a missing server or port.
    pub fn into_proxy(self) -> Option<ProxyConfig> {
        let kind = ProtocolKind::from_type_tag(self.proxy_type.as_deref()?)?;
        let server = self.server.filter(|s| !s.trim().is_empty())?;
        let port = self.port.as_deref()?.trim().parse::<u16>().ok()?;
        if port == 0 {
            return None;
        }

        let mut node = ProxyConfig::new(kind);
        node.name = self.name.unwrap_or_default();
        node.server = server.trim().to_string();
        node.port = port;

        node.password = first([self.password, self.auth, self.auth_str]);
        node.uuid = self.uuid;
        node.username = self.username;
        node.cipher = self.cipher;
        node.alter_id = self
            .alter_id
            .and_then(|a| a.trim().parse::<u32>().ok())
            .unwrap_or(0);

        node.protocol = self.protocol;
        node.protocol_param = self.protocol_param;
        node.obfs_param = self.obfs_param;
        node.obfs_password = self.obfs_password;
        match (kind, self.obfs.as_deref()) {
            (ProtocolKind::VMess, Some("http")) => node.http_header = true,
            (ProtocolKind::VMess, Some("websocket")) => node.ws_declared = true,
            _ => node.obfs = self.obfs,
        }

        node.plugin = self.plugin;
        if let Some(opts) = self.plugin_opts {
            for (key, value) in opts {
                let option = match value {
                    Value::Bool(b) => PluginOption::Flag(b),
                    other => match scalar_text(&other) {
                        Some(text) => PluginOption::Text(text),
                        None => continue,
                    },
                };
                node.plugin_opts.insert(key, option);
            }
        }

        node.network = self.network.map(|n| n.trim().to_ascii_lowercase());
        if let Some(ws) = self.ws_opts {
            node.ws_declared = true;
            node.path = ws.path;
            node.host = ws.headers.and_then(|h| h.host.into_iter().next());
            node.early_data = ws.max_early_data;
        }
        if self.ws_path.is_some() || self.ws_headers.is_some() {
            node.ws_declared = true;
            node.path = node.path.or(self.ws_path);
            node.host = node
                .host
                .or_else(|| self.ws_headers.and_then(|h| h.host.into_iter().next()));
        }
        if let Some(h2) = self.h2_opts {
            node.path = node.path.or(h2.path.into_iter().next());
            node.host = node.host.or(h2.host.into_iter().next());
        }
        if let Some(http) = self.http_opts {
            node.http_header = true;
            node.path = node.path.or(http.path.into_iter().next());
            node.host = node
                .host
                .or_else(|| http.headers.and_then(|h| h.host.into_iter().next()))
                .or(http.host.into_iter().next());
        }
        for opts in [self.httpupgrade_opts, self.splithttp_opts].into_iter().flatten() {
            node.path = node.path.or(opts.path.into_iter().next());
            node.host = node
                .host
                .or(opts.host.into_iter().next())
                .or_else(|| opts.headers.and_then(|h| h.host.into_iter().next()));
        }
        if let Some(grpc) = self.grpc_opts {
            node.service_name = grpc.grpc_service_name;
            node.grpc_mode = grpc.mode;
        }
        node.service_name = node.service_name.or(self.service_name);
        if let Some(kcp) = self.kcp_opts {
            node.header_type = kcp.header.and_then(|h| h.kind);
        }
        if let Some(quic) = self.quic_opts {
            node.quic_security = quic.security;
            node.quic_key = quic.key;
            node.header_type = node.header_type.or(quic.header.and_then(|h| h.kind));
        }
        node.path = node.path.or(self.path);
        node.host = node.host.or(self.host);
        node.grpc_mode = node.grpc_mode.or(self.mode);
        node.early_data = node.early_data.or(self.max_early_data);

        node.tls = self.tls.unwrap_or(false);
        node.sni = first([self.servername, self.sni]);
        node.alpn = self.alpn;
        node.fingerprint = self.client_fingerprint;
        node.reality = self.reality_opts.map(|r| RealityOptions {
            public_key: r.public_key,
            short_id: r.short_id,
            spider_x: r.spider_x,
        });
        node.flow = self.flow;

        node.udp = self.udp;
        node.skip_cert_verify = self.skip_cert_verify;
        node.shadow_tls_password = self.shadow_tls_password;
        node.shadow_tls_sni = self.shadow_tls_sni;
        node.congestion_control = self.congestion_controller;
        node.udp_relay_mode = self.udp_relay_mode;
        node.disable_sni = self.disable_sni.unwrap_or(false);
        node.idle_session_check_interval = self.idle_session_check_interval;
        node.idle_session_timeout = self.idle_session_timeout;
        node.min_idle_session = self.min_idle_session;

        node.extra = stringify_extra(self.extra);
        Some(node)
    }
}
