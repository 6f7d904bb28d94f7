use serde::Serialize;
use uuid::Uuid;

use super::proxy::ProxyConfig;

/// One canonical proxy endpoint: a named share link plus metadata.
///
/// `protocol` is always the lower-cased scheme of `url`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    pub url: String,
    pub protocol: String,
    pub enabled: bool,
    pub subscription_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<ProxyConfig>,
}

impl Node {
    /// Creates an enabled node with a fresh random id.
    pub fn new(name: String, url: String, subscription_name: &str) -> Self {
        let protocol = scheme_of(&url).to_ascii_lowercase();
        Node {
            id: Uuid::new_v4().to_string(),
            name,
            url,
            protocol,
            enabled: true,
            subscription_name: subscription_name.to_string(),
            original: None,
        }
    }

    pub fn with_original(mut self, original: Option<ProxyConfig>) -> Self {
        self.original = original;
        self
    }
}

/// Text before the first `://`, or an empty string.
pub fn scheme_of(link: &str) -> &str {
    link.find("://").map_or("", |pos| &link[..pos])
}
