pub mod config;
pub mod error;
pub mod explodes;
pub mod node_manip;
pub mod remark;
pub mod sniffer;
pub mod subparser;

pub use error::ParseError;
pub use explodes::explode;
pub use node_manip::{prepend_name, process_nodes, FilterMode, FilterRules};
pub use remark::extract_name;
pub use sniffer::{sniff, ParseStrategy};
pub use subparser::{parse_subscription, SubscriptionParser};
