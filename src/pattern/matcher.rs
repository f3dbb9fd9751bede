// Tue Jan 13 2026 - Alex

use crate::pattern::compiler::{normalize_token, HexPattern};
use crate::pattern::error::PatternError;

/// Location of a pattern hit inside a hex haystack.
///
/// `anchor` is where the find token starts; it is always on a byte boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexMatch {
    pub start: usize,
    pub end: usize,
    pub anchor: usize,
}

impl HexMatch {
    pub fn byte_offset(&self) -> usize {
        self.anchor / 2
    }
}

impl HexPattern {
    /// Finds the first byte-aligned match.
    ///
    /// The anchor is the rightmost occurrence of the token inside the matched
    /// window: the leading bytes of a template are the opcode prefix and the
    /// flag sits at the end. When the greedy window ends on an odd offset,
    /// shorter windows from the same start are tried before moving on.
    pub fn find(&self, haystack: &str) -> Option<HexMatch> {
        let mut from = 0;

        while from <= haystack.len() {
            let m = self.regex().find_at(haystack, from)?;

            if let Some(anchor) = self.anchor_in(haystack, m.start(), m.end()) {
                if anchor % 2 == 0 {
                    return Some(HexMatch {
                        start: m.start(),
                        end: m.end(),
                        anchor,
                    });
                }
                log::trace!("Greedy match at {} ends on odd offset {}", m.start(), anchor);

                if let Some(found) = self.aligned_within(haystack, m.start(), anchor) {
                    return Some(found);
                }
            }

            from = m.start() + 1;
        }

        None
    }

    /// Even token offsets in `start..limit`, right to left, whose shortened
    /// window still matches the whole pattern.
    fn aligned_within(&self, haystack: &str, start: usize, limit: usize) -> Option<HexMatch> {
        let token = self.token().as_bytes();
        let bytes = haystack.as_bytes();

        (start..limit)
            .rev()
            .filter(|offset| offset % 2 == 0)
            .filter(|&offset| {
                bytes
                    .get(offset..offset + token.len())
                    .map_or(false, |slice| slice.eq_ignore_ascii_case(token))
            })
            .find_map(|anchor| {
                let end = anchor + token.len();
                let window = haystack.get(start..end)?;
                self.matches_whole(window).then_some(HexMatch { start, end, anchor })
            })
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.find(haystack).is_some()
    }

    /// Overwrites the token at the match anchor.
    pub fn apply(&self, haystack: &mut String, m: &HexMatch, hex_replace: &str) {
        debug_assert_eq!(hex_replace.len(), self.token().len());
        haystack.replace_range(m.anchor..m.anchor + self.token().len(), hex_replace);
    }

    /// Finds and applies in one step. Returns whether anything was replaced;
    /// the haystack is untouched when there is no match.
    pub fn patch(&self, haystack: &mut String, hex_replace: &str) -> Result<bool, PatternError> {
        let replace = normalize_token(hex_replace)?;
        if replace.len() != self.token().len() {
            return Err(PatternError::LengthMismatch {
                find: self.token().to_string(),
                replace,
            });
        }

        match self.find(haystack) {
            Some(m) => {
                self.apply(haystack, &m, &replace);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn anchor_in(&self, haystack: &str, start: usize, end: usize) -> Option<usize> {
        let window = haystack.get(start..end)?.to_ascii_uppercase();
        window.rfind(self.token()).map(|offset| start + offset)
    }
}
