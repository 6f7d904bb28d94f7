use log::{debug, info};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

use crate::models::{scheme_of, Node};
use crate::settings::ParseOptions;
use crate::utils::base64::{base64_encode, try_base64_decode};
use crate::utils::matcher::{build_alternation, split_protocol_list, strip_prefix_ignore_case};
use crate::utils::url::url_encode;

use super::remark::extract_name;

const KEEP_PREFIX: &str = "keep:";
const PROTO_PREFIX: &str = "proto:";

/// Whether matching nodes are dropped or are the only ones kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Blacklist,
    Whitelist,
}

/// Compiled form of an exclude rule block
#[derive(Debug, Clone)]
pub struct FilterRules {
    pub mode: FilterMode,
    protocols: HashSet<String>,
    name_pattern: Option<Regex>,
}

impl FilterRules {
    /// Compiles a rule block.
    ///
    /// Returns `None` when the block holds no effective rule, in which case
    /// nothing should be filtered.
    pub fn parse(block: &str) -> Option<FilterRules> {
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let keep_lines: Vec<&str> = lines
            .iter()
            .filter_map(|line| strip_prefix_ignore_case(line, KEEP_PREFIX))
            .map(str::trim)
            .collect();
        let (mode, rules) = if keep_lines.is_empty() {
            (FilterMode::Blacklist, lines)
        } else {
            (FilterMode::Whitelist, keep_lines)
        };

        let mut protocols = HashSet::new();
        let mut names = Vec::new();
        for rule in rules.into_iter().filter(|rule| !rule.is_empty()) {
            match strip_prefix_ignore_case(rule, PROTO_PREFIX) {
                Some(list) => protocols.extend(split_protocol_list(list)),
                None => names.push(rule.to_string()),
            }
        }

        if protocols.is_empty() && names.is_empty() {
            return None;
        }
        Some(FilterRules {
            mode,
            protocols,
            name_pattern: build_alternation(&names),
        })
    }

    /// Whether the node hits a protocol rule or the name pattern.
    pub fn matches(&self, node: &Node) -> bool {
        if self.protocols.contains(&node.protocol.to_ascii_lowercase()) {
            return true;
        }
        self.name_pattern
            .as_ref()
            .is_some_and(|re| re.is_match(&node.name))
    }

    /// Drops (blacklist) or keeps only (whitelist) the matching nodes,
    /// preserving order.
    pub fn apply(&self, nodes: Vec<Node>) -> Vec<Node> {
        let before = nodes.len();
        let kept: Vec<Node> = nodes
            .into_iter()
            .filter(|node| match self.mode {
                FilterMode::Blacklist => !self.matches(node),
                FilterMode::Whitelist => self.matches(node),
            })
            .collect();
        if kept.len() != before {
            info!(
                "Filter ({:?}) removed {} of {} nodes",
                self.mode,
                before - kept.len(),
                before
            );
        }
        kept
    }
}

/// Applies exclude rules, then optionally prefixes every name with the
/// subscription name.
pub fn process_nodes(nodes: Vec<Node>, subscription_name: &str, options: &ParseOptions) -> Vec<Node> {
    let mut nodes = match options.exclude_rules().and_then(FilterRules::parse) {
        Some(rules) => rules.apply(nodes),
        None => nodes,
    };

    let prefix = subscription_name.trim();
    if options.prepend_sub_name && !prefix.is_empty() {
        for node in nodes.iter_mut().filter(|node| !node.name.starts_with(prefix)) {
            let renamed = prefixed(prefix, &node.name);
            node.url = rename_link(&node.url, &renamed);
            node.name = renamed;
        }
    }
    nodes
}

/// Prefixes the display name carried by a share link.
///
/// Links whose name already starts with `prefix` are returned unchanged.
///
/// # Examples
/// ```
/// use sublinks::parser::prepend_name;
///
/// assert_eq!(
///     prepend_name("trojan://pw@a.com:443#HK-01", "MySub"),
///     "trojan://pw@a.com:443#MySub%20-%20HK-01"
/// );
/// ```
pub fn prepend_name(url: &str, prefix: &str) -> String {
    let prefix = prefix.trim();
    let current = extract_name(url);
    if prefix.is_empty() || current.starts_with(prefix) {
        return url.to_string();
    }
    rename_link(url, &prefixed(prefix, &current))
}

fn prefixed(prefix: &str, name: &str) -> String {
    if name.is_empty() {
        prefix.to_string()
    } else {
        format!("{} - {}", prefix, name)
    }
}

fn rename_link(url: &str, name: &str) -> String {
    let (main, fragment) = match url.rsplit_once('#') {
        Some((main, fragment)) => (main, Some(fragment)),
        None => (url, None),
    };

    if scheme_of(main).eq_ignore_ascii_case("vmess") {
        if let Some(body) = rename_vmess_body(&main[8..], name) {
            return match fragment {
                Some(_) => format!("vmess://{}#{}", body, url_encode(name)),
                None => format!("vmess://{}", body),
            };
        }
        debug!("VMess body is not JSON, renaming through the fragment");
    }

    format!("{}#{}", main, url_encode(name))
}

fn rename_vmess_body(encoded: &str, name: &str) -> Option<String> {
    let decoded = try_base64_decode(encoded).ok()?;
    let mut json: Value = serde_json::from_str(&decoded).ok()?;
    json.as_object_mut()?
        .insert("ps".to_string(), Value::String(name.to_string()));
    let text = serde_json::to_string(&json).ok()?;
    Some(base64_encode(&text))
}
