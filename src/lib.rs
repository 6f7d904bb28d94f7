//! Subscription payloads to canonical proxy share links
//!
//! [`SubscriptionParser`] accepts Clash/Sing-box documents, Base64 blobs and
//! plain link lists, and returns [`Node`]s carrying canonical links.
//! [`proxy_to_uri`] and [`explode`] convert between [`ProxyConfig`] and
//! share links for every supported protocol.

pub mod generator;
pub mod models;
pub mod parser;
pub mod settings;
pub mod utils;

// Re-export the main types for easier access
pub use models::{Node, ProtocolKind, ProxyConfig};
pub use settings::ParseOptions;

// Re-export parsing entry points
pub use generator::proxy_to_uri;
pub use parser::{
    explode, extract_name, parse_subscription, process_nodes, sniff, FilterRules,
    SubscriptionParser,
};
