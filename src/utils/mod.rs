pub mod base64;
pub mod matcher;
pub mod url;
