// Fri Jan 17 2026 - Alex

/// Brace-depth tracker for the save grammar.
///
/// Counts raw `{` and `}` per line. Save files put one token per line, so no
/// tokenizer is needed; swap this out if quoted braces ever show up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockScanner {
    depth: i64,
}

impl BlockScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking at the line that opens a block.
    pub fn open(line: &str) -> Self {
        let mut scanner = Self::new();
        scanner.feed(line);
        scanner
    }

    pub fn feed(&mut self, line: &str) -> i64 {
        let opened = line.matches('{').count() as i64;
        let closed = line.matches('}').count() as i64;
        self.depth += opened - closed;
        self.depth
    }

    pub fn depth(&self) -> i64 {
        self.depth
    }

    pub fn is_closed(&self) -> bool {
        self.depth <= 0
    }
}

/// Splits `key=value`, trimming both sides.
pub fn key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

pub fn key_of(line: &str) -> Option<&str> {
    key_value(line).map(|(k, _)| k)
}

/// `key={` with any spacing around `=`.
pub fn opens_block(line: &str, key: &str) -> bool {
    matches!(key_value(line), Some((k, v)) if k == key && v.starts_with('{'))
}

pub fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}
