use thiserror::Error;

/// Reasons a parse strategy gave up on a payload.
///
/// These never escape [`SubscriptionParser::parse`](super::SubscriptionParser::parse);
/// they are logged and the next strategy runs.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("decoded content is binary")]
    BinaryContent,

    #[error("decoding did not change the content")]
    FixedPoint,

    #[error("base64 nesting deeper than {0} levels")]
    DepthExceeded(usize),

    #[error("document has no proxies, nodes or outbounds")]
    UnsupportedDocument,
}
