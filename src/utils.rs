//! Common utility functions shared across the codebase.

/// Checks if the text contains at least one Unicode alphabetic character.
///
/// Returns false for empty strings, pure numbers, or pure symbols.
///
/// # Examples
///
/// ```
/// use nlsctl::utils::contains_alphabetic;
///
/// assert!(contains_alphabetic("Hello"));
/// assert!(contains_alphabetic("你好"));
/// assert!(!contains_alphabetic("123"));
/// assert!(!contains_alphabetic("---"));
/// assert!(!contains_alphabetic(""));
/// ```
pub fn contains_alphabetic(text: &str) -> bool {
    text.chars().any(|c| c.is_alphabetic())
}

/// Returns the first line delimiter found in `text`, or `"\n"` if there is none.
pub fn detect_line_delimiter(text: &str) -> &'static str {
    match text.find(['\n', '\r']) {
        Some(i) if text[i..].starts_with("\r\n") => "\r\n",
        Some(i) if text[i..].starts_with('\r') => "\r",
        _ => "\n",
    }
}

/// Index of line start byte offsets for O(log n) line lookups.
///
/// Line 1 starts at offset 0, line 2 starts after the first `\n`, etc.
/// A `\r` directly before the `\n` is treated as part of the delimiter.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut starts = vec![0];
        for (i, c) in content.char_indices() {
            if c == '\n' {
                starts.push(i + 1);
            }
        }
        Self {
            starts,
            len: content.len(),
        }
    }

    /// 1-based line number containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }

    /// Byte offset where the 1-based `line` starts.
    pub fn line_start(&self, line: usize) -> usize {
        self.starts
            .get(line.saturating_sub(1))
            .copied()
            .unwrap_or(self.len)
    }

    /// Start of the line containing `offset`.
    pub fn line_start_of(&self, offset: usize) -> usize {
        self.line_start(self.line_of(offset))
    }

    /// End of the line containing `offset`, including its delimiter.
    pub fn line_end_with_delimiter(&self, offset: usize) -> usize {
        self.starts
            .get(self.line_of(offset))
            .copied()
            .unwrap_or(self.len)
    }

    /// End of the line containing `offset`, excluding its delimiter.
    pub fn line_end(&self, content: &str, offset: usize) -> usize {
        let end = self.line_end_with_delimiter(offset);
        let line = &content[self.line_start_of(offset)..end];
        end - (line.len() - line.trim_end_matches(['\n', '\r']).len())
    }

    /// Text of the line containing `offset`, without its delimiter.
    pub fn line_text<'a>(&self, content: &'a str, offset: usize) -> &'a str {
        &content[self.line_start_of(offset)..self.line_end(content, offset)]
    }

    /// 1-based column of `offset`, counted in characters.
    pub fn column(&self, content: &str, offset: usize) -> usize {
        content[self.line_start_of(offset)..offset].chars().count() + 1
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::*;

    #[test]
    fn test_contains_alphabetic() {
        assert!(contains_alphabetic("Hello"));
        assert!(contains_alphabetic("你好"));
        assert!(contains_alphabetic("Hello123"));
        assert!(contains_alphabetic("  abc  "));

        assert!(!contains_alphabetic("123"));
        assert!(!contains_alphabetic("!@#$%"));
        assert!(!contains_alphabetic("   "));
        assert!(!contains_alphabetic(""));
    }

    #[test]
    fn test_detect_line_delimiter() {
        assert_eq!(detect_line_delimiter("a=1\r\nb=2"), "\r\n");
        assert_eq!(detect_line_delimiter("a=1\rb=2"), "\r");
        assert_eq!(detect_line_delimiter("a=1\nb=2"), "\n");
        assert_eq!(detect_line_delimiter("a=1"), "\n");
    }

    #[test]
    fn test_line_index_lookup() {
        let content = "first\nsecond\r\nthird";
        let index = LineIndex::new(content);

        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(5), 1);
        assert_eq!(index.line_of(6), 2);
        assert_eq!(index.line_of(14), 3);

        assert_eq!(index.line_start_of(8), 6);
        assert_eq!(index.line_end(content, 8), 12);
        assert_eq!(index.line_end_with_delimiter(8), 14);
        assert_eq!(index.line_end(content, 15), content.len());
        assert_eq!(index.line_text(content, 7), "second");
        assert_eq!(index.column(content, 8), 3);
    }
}
