//! `.properties` resource file model.
//!
//! The file is parsed into an ordered list of entries that remember their
//! byte offsets in the original text. Comment and blank lines are not entries;
//! they are attached as a leading run to the entry that follows them, so edits
//! never separate a comment block from the key it documents. The list always
//! ends with a sentinel entry that anchors inserts at the end of the file.

use std::collections::HashSet;

use super::edit::{Region, TextEdit};
use super::escape::{escape_key, escape_value, unescape};
use crate::utils::detect_line_delimiter;

/// One `key=value` entry of a resource file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEntry {
    pub key: String,
    pub value: String,
    /// Start of the entry's first line.
    pub offset: usize,
    /// Length of the entry's own lines, continuation lines included,
    /// without the final line delimiter.
    pub len: usize,
    /// Length of the comment/blank run directly before `offset`.
    pub leading: usize,
    /// Length of the line delimiter ending the entry (0 at end of file).
    pub delimiter_len: usize,
}

impl PropertyEntry {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    fn region_with_leading(&self) -> Region {
        Region::between(self.offset - self.leading, self.end() + self.delimiter_len)
    }

    /// Placement score of `key` relative to this entry: number of matching
    /// leading characters minus the length difference.
    fn compare_to(&self, key: &str) -> i64 {
        let common = self
            .key
            .chars()
            .zip(key.chars())
            .take_while(|(a, b)| a == b)
            .count() as i64;
        let diff = (self.key.chars().count() as i64 - key.chars().count() as i64).abs();
        common - diff
    }
}

/// Parsed resource file.
#[derive(Debug, Clone)]
pub struct PropertyFile {
    text: String,
    entries: Vec<PropertyEntry>,
    /// Sentinel at end of file. Its `leading` covers trailing comment lines.
    last: PropertyEntry,
    delimiter: &'static str,
}

enum Slot<'a> {
    Entry(&'a PropertyEntry),
    Last,
}

impl PropertyFile {
    pub fn parse(text: &str) -> Self {
        let delimiter = detect_line_delimiter(text);
        let lines = split_lines(text);
        let mut entries = Vec::new();
        let mut leading_start: Option<usize> = None;

        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            let content = line.content(text);
            let trimmed = content.trim_start_matches([' ', '\t', '\u{c}']);
            if trimmed.is_empty() || trimmed.starts_with(['#', '!']) {
                leading_start.get_or_insert(line.start);
                i += 1;
                continue;
            }

            let start = line.start;
            let mut logical = String::from(trimmed);
            let mut last = line;
            while ends_with_continuation(last.content(text)) && i + 1 < lines.len() {
                logical.pop();
                i += 1;
                last = &lines[i];
                logical.push_str(
                    last.content(text)
                        .trim_start_matches([' ', '\t', '\u{c}']),
                );
            }
            if ends_with_continuation(last.content(text)) {
                logical.pop();
            }

            let (key, value) = split_key_value(&logical);
            entries.push(PropertyEntry {
                key: unescape(key),
                value: unescape(value),
                offset: start,
                len: last.content_end - start,
                leading: start - leading_start.take().unwrap_or(start),
                delimiter_len: last.end - last.content_end,
            });
            i += 1;
        }

        let last = PropertyEntry {
            key: String::new(),
            value: String::new(),
            offset: text.len(),
            len: 0,
            leading: text.len() - leading_start.unwrap_or(text.len()),
            delimiter_len: 0,
        };

        Self {
            text: text.to_string(),
            entries,
            last,
            delimiter,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn entries(&self) -> &[PropertyEntry] {
        &self.entries
    }

    pub fn delimiter(&self) -> &'static str {
        self.delimiter
    }

    pub fn entry(&self, key: &str) -> Option<&PropertyEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entry(key).map(|e| e.value.as_str())
    }

    /// Start a batch of edits against this snapshot.
    pub fn edits(&self) -> PropertyEdits<'_> {
        PropertyEdits {
            file: self,
            removed: HashSet::new(),
            edits: Vec::new(),
            inserts: Vec::new(),
        }
    }

    fn format_pair(key: &str, value: &str) -> String {
        format!("{}={}", escape_key(key), escape_value(value))
    }

    /// Render a new resource file holding `pairs` in the given order.
    pub fn render(pairs: &[(String, String)], delimiter: &str) -> String {
        pairs
            .iter()
            .map(|(k, v)| format!("{}{}", Self::format_pair(k, v), delimiter))
            .collect()
    }

    fn slot_offset(&self, slot: &Slot<'_>) -> usize {
        match slot {
            Slot::Entry(e) => e.offset - e.leading,
            Slot::Last => self.last.offset - self.last.leading,
        }
    }
}

/// A batch of edits against one [`PropertyFile`] snapshot.
///
/// Inserts are placed after all removals are known, so an insert never lands
/// inside an entry removed in the same batch.
pub struct PropertyEdits<'a> {
    file: &'a PropertyFile,
    removed: HashSet<usize>,
    edits: Vec<TextEdit>,
    inserts: Vec<(String, String)>,
}

impl PropertyEdits<'_> {
    pub fn insert(&mut self, key: &str, value: &str) {
        self.inserts.push((key.to_string(), value.to_string()));
    }

    /// Returns false if there is no entry for `key`.
    pub fn remove(&mut self, key: &str) -> bool {
        let file = self.file;
        let Some(index) = file
            .entries
            .iter()
            .enumerate()
            .position(|(i, e)| e.key == key && !self.removed.contains(&i))
        else {
            return false;
        };
        let entry = &file.entries[index];
        let mut region = entry.region_with_leading();

        // A last line without delimiter takes the delimiter before it along,
        // which is what an insert at end of file added.
        if entry.delimiter_len == 0 && entry.leading == 0 && index > 0 {
            let previous = &file.entries[index - 1];
            region = Region::between(entry.offset - previous.delimiter_len, entry.end());
        }

        self.removed.insert(index);
        self.edits.push(TextEdit::delete(region));
        true
    }

    /// Returns false if there is no entry for `old_key`.
    pub fn replace(&mut self, old_key: &str, new_key: &str, value: &str) -> bool {
        let Some(entry) = self.file.entry(old_key) else {
            return false;
        };
        self.edits.push(TextEdit::replace(
            Region::new(entry.offset, entry.len),
            PropertyFile::format_pair(new_key, value),
        ));
        true
    }

    pub fn finish(mut self) -> Vec<TextEdit> {
        let file = self.file;
        let mut inserts = std::mem::take(&mut self.inserts);
        inserts.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, value) in &inserts {
            let slot = self.insert_slot(key);
            let offset = file.slot_offset(&slot);
            let pair = PropertyFile::format_pair(key, value);
            let text = if offset == file.text.len()
                && !file.text.is_empty()
                && !file.text.ends_with(['\n', '\r'])
            {
                format!("{}{}", file.delimiter, pair)
            } else {
                format!("{}{}", pair, file.delimiter)
            };
            self.edits.push(TextEdit::insert(offset, text));
        }
        self.edits
    }

    /// Slot to insert before: the one after the first best-scoring entry.
    fn insert_slot(&self, key: &str) -> Slot<'_> {
        let live: Vec<&PropertyEntry> = self
            .file
            .entries
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.removed.contains(i))
            .map(|(_, e)| e)
            .collect();

        let mut best: Option<(usize, i64)> = None;
        for (i, entry) in live.iter().enumerate() {
            let score = entry.compare_to(key);
            if best.is_none_or(|(_, max)| score > max) {
                best = Some((i, score));
            }
        }

        match best {
            Some((i, _)) if i + 1 < live.len() => Slot::Entry(live[i + 1]),
            _ => Slot::Last,
        }
    }
}

struct RawLine {
    start: usize,
    content_end: usize,
    end: usize,
}

impl RawLine {
    fn content<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.content_end]
    }
}

fn split_lines(text: &str) -> Vec<RawLine> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(RawLine {
                    start,
                    content_end: i,
                    end: i + 1,
                });
                start = i + 1;
            }
            b'\r' => {
                let end = if bytes.get(i + 1) == Some(&b'\n') {
                    i + 2
                } else {
                    i + 1
                };
                lines.push(RawLine {
                    start,
                    content_end: i,
                    end,
                });
                start = end;
                i = end;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    if start < text.len() {
        lines.push(RawLine {
            start,
            content_end: text.len(),
            end: text.len(),
        });
    }
    lines
}

fn ends_with_continuation(line: &str) -> bool {
    let trailing = line.len() - line.trim_end_matches('\\').len();
    trailing % 2 == 1
}

/// Split a logical line (leading blanks removed) into raw key and value.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut separator = None;
    let mut chars = line.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '=' | ':' | ' ' | '\t' | '\u{c}' => {
                separator = Some((i, c));
                break;
            }
            _ => {}
        }
    }

    let Some((index, sep)) = separator else {
        return (line, "");
    };
    let key = &line[..index];
    let mut rest = line[index + sep.len_utf8()..].trim_start_matches([' ', '\t', '\u{c}']);
    if matches!(sep, ' ' | '\t' | '\u{c}')
        && let Some(stripped) = rest.strip_prefix(['=', ':'])
    {
        rest = stripped.trim_start_matches([' ', '\t', '\u{c}']);
    }
    (key, rest)
}

#[cfg(test)]
mod tests {
    use crate::core::edit::apply_edits;
    use crate::core::properties::*;
    use pretty_assertions::assert_eq;

    fn apply(text: &str, edits: &[TextEdit]) -> String {
        apply_edits(text, edits).unwrap().text
    }

    fn insert(file: &PropertyFile, key: &str, value: &str) -> TextEdit {
        let mut edits = file.edits();
        edits.insert(key, value);
        edits.finish().pop().unwrap()
    }

    fn remove(file: &PropertyFile, key: &str) -> Option<TextEdit> {
        let mut edits = file.edits();
        edits.remove(key).then(|| edits.finish().pop().unwrap())
    }

    #[test]
    fn test_parse_entries_and_separators() {
        let file = PropertyFile::parse("a=1\nb:2\nc 3\nd = 4\ne  : 5\nf\n");
        let pairs: Vec<(&str, &str)> = file
            .entries()
            .iter()
            .map(|e| (e.key.as_str(), e.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("a", "1"), ("b", "2"), ("c", "3"), ("d", "4"), ("e", "5"), ("f", "")]
        );
    }

    #[test]
    fn test_parse_escapes_and_continuations() {
        let text = "key\\ with\\=sep = va\\\n    lue\\\\\nnext=\\u00e9\\n\n";
        let file = PropertyFile::parse(text);
        assert_eq!(file.get("key with=sep"), Some("value\\"));
        assert_eq!(file.get("next"), Some("é\n"));

        let entry = file.entry("key with=sep").unwrap();
        assert_eq!(entry.offset, 0);
        assert_eq!(&text[entry.offset..entry.end()], "key\\ with\\=sep = va\\\n    lue\\\\");
    }

    #[test]
    fn test_comments_attach_to_next_entry() {
        let text = "# header\n\n! about b\nb=2\n# trailing\n";
        let file = PropertyFile::parse(text);
        let b = file.entry("b").unwrap();
        assert_eq!(b.offset, 20);
        assert_eq!(b.leading, 20);
        assert_eq!(file.entries().len(), 1);
    }

    #[test]
    fn test_insert_between_prefix_neighbours() {
        let text = "a=1\nc=3\n";
        let file = PropertyFile::parse(text);
        assert_eq!(apply(text, &[insert(&file, "b", "2")]), "a=1\nb=2\nc=3\n");
    }

    #[test]
    fn test_insert_next_to_longest_common_prefix() {
        let text = "menu.open=Open\nmenu.close=Close\ntitle=Title\n";
        let file = PropertyFile::parse(text);
        assert_eq!(
            apply(text, &[insert(&file, "menu.save", "Save")]),
            "menu.open=Open\nmenu.save=Save\nmenu.close=Close\ntitle=Title\n"
        );
    }

    #[test]
    fn test_insert_into_empty_file() {
        let file = PropertyFile::parse("");
        assert_eq!(apply("", &[insert(&file, "a", "1")]), "a=1\n");
    }

    #[test]
    fn test_insert_keeps_trailing_comments_last() {
        let text = "a=1\n# end\n";
        let file = PropertyFile::parse(text);
        assert_eq!(apply(text, &[insert(&file, "b", "2")]), "a=1\nb=2\n# end\n");
    }

    #[test]
    fn test_insert_without_final_newline() {
        let text = "a=1";
        let file = PropertyFile::parse(text);
        let mut edits = file.edits();
        edits.insert("c", "3");
        edits.insert("b", "2");
        assert_eq!(apply(text, &edits.finish()), "a=1\nb=2\nc=3");
    }

    #[test]
    fn test_insert_then_remove_round_trip() {
        let samples = [
            "a=1\nc=3\n",
            "# header\na=1\n\n# about c\nc=3\n",
            "a=1\r\nc=3\r\n",
            "a=1\nc=3",
            "# only comments\n",
            "",
        ];
        for text in samples {
            let file = PropertyFile::parse(text);
            let inserted = apply(text, &[insert(&file, "b", "two words")]);
            let reparsed = PropertyFile::parse(&inserted);
            assert_eq!(reparsed.get("b"), Some("two words"), "in {:?}", text);
            let removed = apply(&inserted, &[remove(&reparsed, "b").unwrap()]);
            assert_eq!(removed, text);
        }
    }

    #[test]
    fn test_remove_takes_leading_comments() {
        let text = "a=1\n# about b\nb=2\nc=3\n";
        let file = PropertyFile::parse(text);
        assert_eq!(apply(text, &[remove(&file, "b").unwrap()]), "a=1\nc=3\n");
        assert!(remove(&file, "missing").is_none());
    }

    #[test]
    fn test_replace_keeps_layout() {
        let text = "# c\na = 1\nb=2\n";
        let file = PropertyFile::parse(text);
        let mut edits = file.edits();
        assert!(edits.replace("a", "renamed", "  spaced"));
        assert_eq!(apply(text, &edits.finish()), "# c\nrenamed=\\ \\ spaced\nb=2\n");
    }

    #[test]
    fn test_remove_and_insert_in_one_batch() {
        let text = "a=1\nc=3";
        let file = PropertyFile::parse(text);
        let mut edits = file.edits();
        assert!(edits.remove("c"));
        edits.insert("b", "2");
        assert_eq!(apply(text, &edits.finish()), "a=1\nb=2");
    }
}
