mod anytls;
mod common;
mod hysteria;
mod socks;
mod ss;
mod ssr;
mod trojan;
mod tuic;
mod vless;
mod vmess;

pub use common::explode;

// Re-export per-protocol decoders
pub use anytls::explode_anytls;
pub use hysteria::explode_hysteria;
pub use socks::explode_socks;
pub use ss::{explode_ss, parse_plugin_string};
pub use ssr::explode_ssr;
pub use trojan::explode_trojan;
pub use tuic::explode_tuic;
pub use vless::explode_vless;
pub use vmess::explode_vmess;
