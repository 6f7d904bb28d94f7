//! Core data models
//!
//! This module contains the primary data structures used throughout the crate,
//! separated from the logic that operates on them.
//!
//! # Usage
//!
//! ```rust
//! use sublinks::models::{ProtocolKind, ProxyConfig};
//!
//! let mut proxy = ProxyConfig::new(ProtocolKind::Trojan);
//! proxy.server = "example.com".to_string();
//! proxy.port = 443;
//! proxy.password = Some("secret".to_string());
//! assert!(proxy.is_valid());
//! ```

mod node;
mod proxy;

pub use node::{scheme_of, Node};
pub(crate) use proxy::non_empty;
pub use proxy::{PluginOption, ProtocolKind, ProxyConfig, RealityOptions};
