// Tue Jan 13 2026 - Alex

use crate::pattern::error::PatternError;
use regex::{Regex, RegexBuilder};

/// Placeholder substituted with the find (or replace) token before compilation.
pub const PLACEHOLDER: &str = "%s";

const REGEX_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// A pattern template compiled against one hex token.
///
/// The regex runs over the hex-string view of a binary, two characters per
/// byte. Matching is case-insensitive so templates may be written in either
/// case.
#[derive(Debug, Clone)]
pub struct HexPattern {
    regex: Regex,
    /// Same expression anchored at both ends, for re-checking a shorter window.
    whole: Regex,
    token: String,
}

impl HexPattern {
    pub fn compile(template: &str, hex_find: &str) -> Result<Self, PatternError> {
        let template = template.trim();
        if template.is_empty() {
            return Err(PatternError::EmptyTemplate);
        }

        let token = normalize_token(hex_find)?;
        let source = template.replace(PLACEHOLDER, &token);

        let regex = build(&source)?;
        let whole = build(&format!("^(?:{})$", source))?;

        Ok(Self { regex, whole, token })
    }

    /// The compiled expression, placeholder already substituted.
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    /// The uppercase token the substitution is anchored on.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }

    pub(crate) fn matches_whole(&self, window: &str) -> bool {
        self.whole.is_match(window)
    }
}

fn build(source: &str) -> Result<Regex, PatternError> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| PatternError::Compile(e.to_string()))
}

/// Uppercases a hex token and checks it describes whole bytes.
pub fn normalize_token(token: &str) -> Result<String, PatternError> {
    let cleaned: String = token
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    if cleaned.is_empty()
        || cleaned.len() % 2 != 0
        || !cleaned.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(PatternError::InvalidToken(token.to_string()));
    }

    Ok(cleaned)
}

/// Checks a template and its token pair before anything is compiled.
///
/// Replacement must not change the length of the patched window, otherwise
/// every byte after it would shift.
pub fn validate_template(template: &str, hex_find: &str, hex_replace: &str) -> Result<(), PatternError> {
    if template.trim().is_empty() {
        return Err(PatternError::EmptyTemplate);
    }

    let found = template.matches(PLACEHOLDER).count();
    if found != 1 {
        return Err(PatternError::Placeholder { placeholder: PLACEHOLDER, found });
    }

    let find = normalize_token(hex_find)?;
    let replace = normalize_token(hex_replace)?;
    if find.len() != replace.len() {
        return Err(PatternError::LengthMismatch { find, replace });
    }

    HexPattern::compile(template, &find)?;
    HexPattern::compile(template, &replace)?;
    Ok(())
}
