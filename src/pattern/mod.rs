// Tue Jan 13 2026 - Alex

pub mod compiler;
pub mod error;
pub mod matcher;

pub use compiler::{normalize_token, validate_template, HexPattern, PLACEHOLDER};
pub use error::PatternError;
pub use matcher::HexMatch;

/// Hex view of raw bytes used as the regex haystack.
pub fn encode_haystack(data: &[u8]) -> String {
    hex::encode_upper(data)
}

pub fn decode_haystack(haystack: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(haystack)
}

/// Builds the pattern that matches an already patched binary.
pub fn reverse_pattern(template: &str, hex_replace: &str) -> Result<HexPattern, PatternError> {
    HexPattern::compile(template, hex_replace)
}
