// Fri Jan 17 2026 - Alex

use crate::save::SaveError;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::fs;
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    /// Anything that is not valid UTF-8 is read as Windows-1252.
    Windows1252,
}

impl TextEncoding {
    pub fn detect(bytes: &[u8]) -> Self {
        match Encoding::for_bom(bytes) {
            Some((encoding, _)) if encoding == UTF_8 => TextEncoding::Utf8Bom,
            _ if std::str::from_utf8(bytes).is_ok() => TextEncoding::Utf8,
            _ => TextEncoding::Windows1252,
        }
    }

    fn codec(&self) -> &'static Encoding {
        match self {
            TextEncoding::Utf8 | TextEncoding::Utf8Bom => UTF_8,
            TextEncoding::Windows1252 => WINDOWS_1252,
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<String, SaveError> {
        let (text, had_errors) = match self {
            TextEncoding::Utf8Bom => self.codec().decode_with_bom_removal(bytes),
            _ => self.codec().decode_without_bom_handling(bytes),
        };
        if had_errors {
            return Err(SaveError::Encoding(format!("bytes are not valid {}", self.codec().name())));
        }
        Ok(text.into_owned())
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u8>, SaveError> {
        let (bytes, _, had_unmappable) = self.codec().encode(text);
        if had_unmappable {
            return Err(SaveError::Encoding(format!("text has characters outside {}", self.codec().name())));
        }

        if *self == TextEncoding::Utf8Bom {
            let mut out = UTF8_BOM.to_vec();
            out.extend_from_slice(&bytes);
            return Ok(out);
        }
        Ok(bytes.into_owned())
    }
}

/// A text file held as lines, remembering how to write it back.
///
/// Lines never carry their terminator. An element may hold embedded `\n`
/// when a multi-line block was spliced in; those follow the file's line
/// ending on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    pub lines: Vec<String>,
    encoding: TextEncoding,
    newline: &'static str,
    trailing_newline: bool,
}

impl TextDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self, SaveError> {
        let encoding = TextEncoding::detect(bytes);
        let text = encoding.decode(bytes)?;
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let trailing_newline = text.ends_with('\n');

        let mut lines: Vec<String> = text.split(newline).map(str::to_string).collect();
        if trailing_newline || text.is_empty() {
            lines.pop();
        }

        Ok(Self {
            lines,
            encoding,
            newline,
            trailing_newline,
        })
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, SaveError> {
        Self::parse(&fs::read(path)?)
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SaveError> {
        let mut text = self
            .lines
            .iter()
            .map(|line| {
                if self.newline == "\n" {
                    line.clone()
                } else {
                    line.replace("\r\n", "\n").replace('\n', self.newline)
                }
            })
            .collect::<Vec<_>>()
            .join(self.newline);

        if self.trailing_newline {
            text.push_str(self.newline);
        }

        self.encoding.encode(&text)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), SaveError> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(TextEncoding::detect(b"name=\"x\""), TextEncoding::Utf8);
        assert_eq!(TextEncoding::detect(b"\xEF\xBB\xBFname"), TextEncoding::Utf8Bom);
        assert_eq!(TextEncoding::detect(b"name=\"Caf\xE9\""), TextEncoding::Windows1252);
    }

    #[test]
    fn test_single_byte_text_survives_rewrite() {
        let bytes = b"name=\"Caf\xE9\"\nironman=no\n";
        let doc = TextDocument::parse(bytes).unwrap();
        assert_eq!(doc.lines, vec!["name=\"Café\"", "ironman=no"]);
        assert_eq!(doc.to_bytes().unwrap(), bytes.to_vec());
    }

    #[test]
    fn test_windows_1252_punctuation() {
        let bytes = b"name=\"\x93x\x94\"\ncost=\"\x80\"\n";
        let doc = TextDocument::parse(bytes).unwrap();
        assert_eq!(doc.encoding(), TextEncoding::Windows1252);
        assert_eq!(doc.lines, vec!["name=\"\u{201C}x\u{201D}\"", "cost=\"\u{20AC}\""]);
        assert_eq!(doc.to_bytes().unwrap(), bytes.to_vec());
    }

    #[test]
    fn test_bom_is_kept() {
        let bytes = b"\xEF\xBB\xBFversion=1\n";
        let doc = TextDocument::parse(bytes).unwrap();
        assert_eq!(doc.lines, vec!["version=1"]);
        assert_eq!(doc.to_bytes().unwrap(), bytes.to_vec());
    }

    #[test]
    fn test_crlf_and_embedded_block() {
        let mut doc = TextDocument::parse(b"a\r\nb\r\n").unwrap();
        assert_eq!(doc.lines, vec!["a", "b"]);

        doc.lines.insert(1, "x={\n}".to_string());
        assert_eq!(doc.to_bytes().unwrap(), b"a\r\nx={\r\n}\r\nb\r\n".to_vec());
    }

    #[test]
    fn test_missing_trailing_newline_is_kept() {
        let doc = TextDocument::parse(b"a\nb").unwrap();
        assert_eq!(doc.lines, vec!["a", "b"]);
        assert_eq!(doc.to_bytes().unwrap(), b"a\nb".to_vec());
    }

    #[test]
    fn test_single_byte_rejects_wide_chars() {
        let mut doc = TextDocument::parse(b"name=\"Caf\xE9\"\n").unwrap();
        doc.lines.push("title=\"\u{4E16}\"".to_string());
        assert!(matches!(doc.to_bytes(), Err(SaveError::Encoding(_))));
    }
}
