use log::{debug, info};
use regex::Regex;

use crate::generator::links::proxy_to_uri;
use crate::models::{Node, ProxyConfig};
use crate::settings::ParseOptions;
use crate::utils::base64::try_base64_decode;

use super::config::{proxies_from_json, proxies_from_yaml};
use super::error::ParseError;
use super::explodes::explode;
use super::node_manip::process_nodes;
use super::remark::extract_name;
use super::sniffer::{is_binary, sniff, ParseStrategy};

/// Nested Base64 layers deeper than this are abandoned.
const MAX_BASE64_DEPTH: usize = 4;

const LINK_PATTERN: &str =
    r"(?i)^(?:ssr|ss|vmess|vless|trojan|hysteria2|hysteria|hy2|hy|tuic|anytls|socks5|socks)://";

/// Turns subscription payloads into filtered, named nodes
///
/// A payload may be a Clash/Sing-box document in YAML or JSON, a Base64
/// blob (possibly nested), or plain share links one per line. Parsing
/// never fails; unusable input yields an empty list.
#[derive(Debug, Clone)]
pub struct SubscriptionParser {
    link_regex: Regex,
}

impl Default for SubscriptionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionParser {
    pub fn new() -> Self {
        SubscriptionParser {
            link_regex: Regex::new(LINK_PATTERN).unwrap(),
        }
    }

    /// Parses a payload, then applies exclude rules and name prefixing.
    ///
    /// # Examples
    /// ```
    /// use sublinks::{ParseOptions, SubscriptionParser};
    ///
    /// let parser = SubscriptionParser::new();
    /// let nodes = parser.parse(
    ///     "vless://uuid@sg.example.com:443?type=ws#Singapore-Fast",
    ///     "Sub",
    ///     &ParseOptions::default(),
    /// );
    /// assert_eq!(nodes.len(), 1);
    /// assert_eq!(nodes[0].protocol, "vless");
    /// assert_eq!(nodes[0].name, "Singapore-Fast");
    /// ```
    pub fn parse(&self, content: &str, subscription_name: &str, options: &ParseOptions) -> Vec<Node> {
        let nodes = self.parse_content(content, subscription_name, 0);
        info!(
            "Parsed {} nodes from subscription '{}'",
            nodes.len(),
            subscription_name
        );
        process_nodes(nodes, subscription_name, options)
    }

    fn parse_content(&self, content: &str, subscription_name: &str, depth: usize) -> Vec<Node> {
        let content = content.trim().trim_start_matches('\u{feff}').trim();
        if content.is_empty() {
            return Vec::new();
        }

        for strategy in sniff(content) {
            match self.run_strategy(strategy, content, subscription_name, depth) {
                Ok(nodes) if !nodes.is_empty() => {
                    debug!("{:?} strategy produced {} nodes", strategy, nodes.len());
                    return nodes;
                }
                Ok(_) => debug!("{:?} strategy produced no nodes", strategy),
                Err(err) => debug!("{:?} strategy failed: {}", strategy, err),
            }
        }
        Vec::new()
    }

    fn run_strategy(
        &self,
        strategy: ParseStrategy,
        content: &str,
        subscription_name: &str,
        depth: usize,
    ) -> Result<Vec<Node>, ParseError> {
        match strategy {
            ParseStrategy::Json => Ok(structured_nodes(
                proxies_from_json(content)?,
                subscription_name,
            )),
            ParseStrategy::Yaml => Ok(structured_nodes(
                proxies_from_yaml(content)?,
                subscription_name,
            )),
            ParseStrategy::Base64 => self.parse_base64(content, subscription_name, depth),
            ParseStrategy::PlainText => Ok(self.parse_lines(content, subscription_name)),
        }
    }

    fn parse_base64(
        &self,
        content: &str,
        subscription_name: &str,
        depth: usize,
    ) -> Result<Vec<Node>, ParseError> {
        if depth >= MAX_BASE64_DEPTH {
            return Err(ParseError::DepthExceeded(MAX_BASE64_DEPTH));
        }
        let decoded = try_base64_decode(content)?;
        if is_binary(&decoded) {
            return Err(ParseError::BinaryContent);
        }
        if decoded.trim() == content {
            return Err(ParseError::FixedPoint);
        }
        Ok(self.parse_content(&decoded, subscription_name, depth + 1))
    }

    fn parse_lines(&self, content: &str, subscription_name: &str) -> Vec<Node> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| self.link_regex.is_match(line))
            .map(|line| {
                Node::new(extract_name(line), line.to_string(), subscription_name)
                    .with_original(explode(line))
            })
            .collect()
    }
}

fn structured_nodes(proxies: Vec<ProxyConfig>, subscription_name: &str) -> Vec<Node> {
    proxies
        .into_iter()
        .filter_map(|proxy| {
            let Some(url) = proxy_to_uri(&proxy) else {
                debug!("Skipping {} proxy '{}': cannot build a link", proxy.kind, proxy.name);
                return None;
            };
            let name = if proxy.name.trim().is_empty() {
                extract_name(&url)
            } else {
                proxy.name.clone()
            };
            Some(Node::new(name, url, subscription_name).with_original(Some(proxy)))
        })
        .collect()
}

/// Parses a payload with a one-off [`SubscriptionParser`].
pub fn parse_subscription(content: &str, subscription_name: &str, options: &ParseOptions) -> Vec<Node> {
    SubscriptionParser::new().parse(content, subscription_name, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProtocolKind;
    use crate::utils::base64::base64_encode;

    fn parse(content: &str) -> Vec<Node> {
        parse_subscription(content, "sub", &ParseOptions::default())
    }

    #[test]
    fn test_plain_lines_filter_unknown_schemes() {
        let content = "\u{feff}# comment\r\nvless://uuid@sg.example.com:443?type=ws#Singapore-Fast\r\n\
                       http://example.com\r\n  TROJAN://pw@jp.test.com:443#JP  \r\n";
        let nodes = parse(content);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].protocol, "vless");
        assert_eq!(nodes[0].name, "Singapore-Fast");
        assert!(nodes[0].original.is_some());
        assert_eq!(nodes[1].protocol, "trojan");
        assert_eq!(nodes[1].url, "TROJAN://pw@jp.test.com:443#JP");
        assert_eq!(nodes[1].subscription_name, "sub");
        assert!(nodes.iter().all(|n| n.enabled));
        assert_ne!(nodes[0].id, nodes[1].id);
    }

    #[test]
    fn test_bom_after_leading_whitespace() {
        let nodes = parse(" \u{feff}trojan://p@a.com:443#X");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].url, "trojan://p@a.com:443#X");
    }

    #[test]
    fn test_base64_payload() {
        let payload =
            base64_encode("ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@us.example.com:8388#US-Node\n");
        let nodes = parse(&payload);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "US-Node");
        assert_eq!(nodes[0].protocol, "ss");
    }

    #[test]
    fn test_nested_base64_depth_limit() {
        let link = "trojan://password@nested.example.com:443#Nested";
        let mut payload = link.to_string();
        for _ in 0..3 {
            payload = base64_encode(&payload);
        }
        assert_eq!(parse(&payload).len(), 1);

        for _ in 0..3 {
            payload = base64_encode(&payload);
        }
        assert!(parse(&payload).is_empty());
    }

    #[test]
    fn test_clash_yaml() {
        let yaml = r#"
proxies:
  - name: "HK-VMess"
    type: vmess
    server: hk.example.com
    port: 443
    uuid: 11111111-2222-3333-4444-555555555555
    alterId: 0
    cipher: auto
  - name: "no-port"
    type: vmess
    server: x.example.com
    uuid: u
"#;
        let nodes = parse(yaml);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "HK-VMess");
        assert_eq!(nodes[0].protocol, "vmess");
        assert_eq!(
            nodes[0].original.as_ref().map(|p| p.kind),
            Some(ProtocolKind::VMess)
        );
    }

    #[test]
    fn test_clash_entry_without_port_yields_nothing() {
        let yaml = "proxies:\n  - {name: a, type: vmess, server: a.com, uuid: u}\n";
        assert!(parse(yaml).is_empty());
    }

    #[test]
    fn test_singbox_json() {
        let json = r#"{"outbounds":[
            {"type":"direct","tag":"direct"},
            {"type":"hysteria2","tag":"HY","server":"h.com","server_port":443,"password":"pw"}
        ]}"#;
        let nodes = parse(json);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "HY");
        assert_eq!(nodes[0].protocol, "hysteria2");
    }

    #[test]
    fn test_garbage_is_empty() {
        assert!(parse("").is_empty());
        assert!(parse("hello world\nnothing here").is_empty());
        assert!(parse("{not json").is_empty());
        let binary = base64_encode("\u{1}\u{2}\u{3}binary garbage payload");
        assert!(parse(&binary).is_empty());
    }

    #[test]
    fn test_options_are_applied() {
        let content = "ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ=@hk.com:8388#HK-01\n\
                       trojan://pw@jp.com:443#JP-01";
        let options = ParseOptions {
            exclude: Some("proto:ss".to_string()),
            prepend_sub_name: true,
        };
        let nodes = SubscriptionParser::default().parse(content, "MySub", &options);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "MySub - JP-01");
        assert_eq!(nodes[0].url, "trojan://pw@jp.com:443#MySub%20-%20JP-01");
    }
}
