pub mod links;

// Re-export link encoders
pub use links::proxy_to_uri;
