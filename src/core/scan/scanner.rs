use tracing::debug;

use super::tags::{TagFormat, TagMarker, find_tags};
use super::tokens::{AccessorCall, ImportBinding, Token, TokenStream, collect_tokens};
use crate::core::{NlsError, edit::Region, parsers::source::parse_source};
use crate::utils::LineIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralKind {
    /// A string literal delimited by `quote`.
    String { quote: char },
    /// `Receiver.name`, a reference to an accessor field.
    AccessorField {
        receiver: String,
        receiver_region: Region,
        reference: Region,
    },
}

/// An element of a source line that can be a substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Decoded string value, or the field name for accessor fields.
    pub value: String,
    /// The literal including its quotes, or the field name.
    pub region: Region,
    /// 1-based line number.
    pub line: usize,
    /// Zero-based index among the string literals of the line. Accessor
    /// fields carry the index a string literal at their position would get.
    pub index: usize,
    pub tag: Option<TagMarker>,
    /// Where a tag for this literal is inserted if it has none. `None` if the
    /// line ends inside JSX text, where a comment would become visible text.
    pub tag_anchor: Option<usize>,
}

impl Literal {
    pub fn is_string(&self) -> bool {
        matches!(self.kind, LiteralKind::String { .. })
    }

    pub fn quote(&self) -> char {
        match self.kind {
            LiteralKind::String { quote } => quote,
            LiteralKind::AccessorField { .. } => '"',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub literals: Vec<Literal>,
}

impl Line {
    fn string_count(&self) -> usize {
        self.literals.iter().filter(|l| l.is_string()).count()
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub tag_format: TagFormat,
    /// Class name treated as accessor receiver, together with its import aliases.
    pub accessor_name: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            tag_format: TagFormat::default(),
            accessor_name: "Messages".to_string(),
        }
    }
}

/// Scanner output for one source file.
#[derive(Debug, Clone)]
pub struct ScanResult {
    lines: Vec<Line>,
    calls: Vec<AccessorCall>,
    imports: Vec<ImportBinding>,
    last_import_end: Option<usize>,
    line_index: LineIndex,
}

impl ScanResult {
    /// Lines holding at least one element, in source order. Each call starts
    /// a fresh iteration.
    pub fn lines(&self) -> std::slice::Iter<'_, Line> {
        self.lines.iter()
    }

    pub fn literals(&self) -> impl Iterator<Item = &Literal> {
        self.lines.iter().flat_map(|line| line.literals.iter())
    }

    pub fn calls(&self) -> &[AccessorCall] {
        &self.calls
    }

    /// The accessor call taking the literal at `region` as first argument.
    pub fn call_for(&self, region: Region) -> Option<&AccessorCall> {
        self.calls.iter().find(|c| c.literal == region)
    }

    pub fn imports(&self) -> &[ImportBinding] {
        &self.imports
    }

    pub fn import_for(&self, local: &str) -> Option<&ImportBinding> {
        self.imports.iter().find(|i| i.local == local)
    }

    pub fn last_import_end(&self) -> Option<usize> {
        self.last_import_end
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }
}

/// Scan a JavaScript/TypeScript source file.
pub fn scan(source: &str, file_path: &str, options: &ScanOptions) -> Result<ScanResult, NlsError> {
    let parsed = parse_source(source, file_path)?;
    let stream = collect_tokens(&parsed, source, &options.accessor_name);
    let result = group_lines(source, stream, &options.tag_format);
    debug!(
        file = file_path,
        lines = result.lines.len(),
        calls = result.calls.len(),
        "scanned source"
    );
    Ok(result)
}

/// Group an ordered token stream into lines and resolve tags.
pub fn group_lines(source: &str, stream: TokenStream, format: &TagFormat) -> ScanResult {
    let line_index = LineIndex::new(source);
    let mut lines: Vec<Line> = Vec::new();

    for token in stream.tokens {
        match token {
            Token::Str {
                region,
                value,
                quote,
            } => {
                let line = line_for(&mut lines, line_index.line_of(region.offset));
                let index = line.string_count();
                let number = line.number;
                line.literals.push(Literal {
                    kind: LiteralKind::String { quote },
                    value,
                    region,
                    line: number,
                    index,
                    tag: None,
                    tag_anchor: Some(region.end()),
                });
            }
            Token::FieldRef(field) => {
                let line = line_for(&mut lines, line_index.line_of(field.name_region.offset));
                let index = line.string_count();
                let number = line.number;
                line.literals.push(Literal {
                    kind: LiteralKind::AccessorField {
                        receiver: field.receiver,
                        receiver_region: field.receiver_region,
                        reference: field.reference,
                    },
                    value: field.name,
                    region: field.name_region,
                    line: number,
                    index,
                    tag: None,
                    tag_anchor: Some(field.reference.end()),
                });
            }
            Token::LineComment { region } => {
                let number = line_index.line_of(region.offset);
                let Some(line) = lines.last_mut().filter(|l| l.number == number) else {
                    continue;
                };
                for tag in find_tags(source, region.offset, region.end(), format) {
                    // Tags pointing past the line's literals are dropped.
                    if let Some(literal) = line
                        .literals
                        .iter_mut()
                        .filter(|l| l.is_string())
                        .nth(tag.number - 1)
                        && literal.tag.is_none()
                    {
                        literal.tag = Some(tag);
                    }
                }
            }
        }
    }

    for line in &mut lines {
        synthesize_anchors(source, &line_index, &stream.jsx_text, line);
    }

    ScanResult {
        lines,
        calls: stream.calls,
        imports: stream.imports,
        last_import_end: stream.last_import_end,
        line_index,
    }
}

fn line_for(lines: &mut Vec<Line>, number: usize) -> &mut Line {
    if lines.last().is_none_or(|l| l.number != number) {
        lines.push(Line {
            number,
            literals: Vec::new(),
        });
    }
    let last = lines.len() - 1;
    &mut lines[last]
}

/// Give every untagged literal a place for a future tag: after the previous
/// tagged literal's tag, else before the next tagged literal's tag, else at
/// the end of the line unless JSX text continues there.
fn synthesize_anchors(
    source: &str,
    line_index: &LineIndex,
    jsx_text: &[Region],
    line: &mut Line,
) {
    let last_end = line
        .literals
        .iter()
        .map(|l| l.region.end())
        .max()
        .unwrap_or(0);
    let line_end = line_index.line_end(source, last_end);
    let in_jsx_text = jsx_text
        .iter()
        .any(|text| text.offset <= line_end && line_end <= text.end());
    if in_jsx_text {
        debug!(line = line.number, "line ends in JSX text");
    }

    let anchors: Vec<Option<usize>> = (0..line.literals.len())
        .map(|i| {
            let literals = &line.literals;
            if let Some(tag) = literals[i].tag {
                return Some(tag.removal.offset);
            }
            if let Some(previous) = literals[..i].iter().rev().find_map(|l| l.tag) {
                return Some(previous.region.end());
            }
            if let Some(next) = literals[i + 1..].iter().find_map(|l| l.tag) {
                return Some(next.removal.offset);
            }
            (!in_jsx_text).then_some(line_end)
        })
        .collect();

    for (literal, anchor) in line.literals.iter_mut().zip(anchors) {
        literal.tag_anchor = anchor;
    }
}

#[cfg(test)]
mod tests {
    use crate::core::scan::*;
    use pretty_assertions::assert_eq;

    fn scan_js(code: &str) -> ScanResult {
        scan(code, "test.js", &ScanOptions::default()).unwrap()
    }

    #[test]
    fn test_single_tagged_literal() {
        let code = "foo(\"Hello\"); // $NON-NLS-1$\n";
        let result = scan_js(code);
        let lines: Vec<&Line> = result.lines().collect();
        assert_eq!(lines.len(), 1);

        let literal = &lines[0].literals[0];
        assert_eq!(literal.value, "Hello");
        assert_eq!(literal.index, 0);
        assert_eq!(literal.line, 1);
        let tag = literal.tag.unwrap();
        assert_eq!(tag.region.text(code), "// $NON-NLS-1$");
    }

    #[test]
    fn test_literals_grouped_per_line() {
        let code = "f(\"a\", \"b\");\ng(\"c\");\n\nh(\"d\", 'e', \"f\");\n";
        let result = scan_js(code);
        let shape: Vec<(usize, Vec<usize>)> = result
            .lines()
            .map(|l| (l.number, l.literals.iter().map(|lit| lit.index).collect()))
            .collect();
        assert_eq!(
            shape,
            vec![(1, vec![0, 1]), (2, vec![0]), (4, vec![0, 1, 2])]
        );
        assert_eq!(result.lines().count(), result.lines().count());
    }

    #[test]
    fn test_tag_for_missing_index_is_dropped() {
        let code = "f(\"a\"); //$NON-NLS-2$\n";
        let result = scan_js(code);
        assert!(result.literals().all(|l| l.tag.is_none()));
    }

    #[test]
    fn test_comment_on_other_line_is_ignored() {
        let code = "f(\"a\");\n//$NON-NLS-1$\n";
        let result = scan_js(code);
        assert!(result.literals().all(|l| l.tag.is_none()));
    }

    #[test]
    fn test_anchor_at_line_end() {
        let code = "f(\"a\", \"b\");\r\nnext();\r\n";
        let result = scan_js(code);
        let anchors: Vec<Option<usize>> = result.literals().map(|l| l.tag_anchor).collect();
        assert_eq!(anchors, vec![Some(12), Some(12)]);
    }

    #[test]
    fn test_anchor_after_previous_tag() {
        let code = "f(\"a\", \"b\", \"c\"); //$NON-NLS-1$ //$NON-NLS-3$\n";
        let result = scan_js(code);
        let literals: Vec<&Literal> = result.literals().collect();
        let first_tag = literals[0].tag.unwrap();
        assert_eq!(literals[1].tag_anchor, Some(first_tag.region.end()));
    }

    #[test]
    fn test_anchor_before_next_tag() {
        let code = "f(\"a\", \"b\"); //$NON-NLS-2$\n";
        let result = scan_js(code);
        let literals: Vec<&Literal> = result.literals().collect();
        let anchor = literals[0].tag_anchor.unwrap();
        assert_eq!(anchor, literals[1].tag.unwrap().removal.offset);
        assert_eq!(&code[anchor..], " //$NON-NLS-2$\n");
    }

    #[test]
    fn test_no_anchor_when_line_ends_in_jsx_text() {
        let code = "const el = (\n  <div>\n    {label(\"Hello\")}\n  </div>\n);\nf(\"a\");\n";
        let result = scan(code, "view.jsx", &ScanOptions::default()).unwrap();
        let anchors: Vec<(&str, Option<usize>)> = result
            .literals()
            .map(|l| (l.value.as_str(), l.tag_anchor))
            .collect();
        assert_eq!(anchors, vec![("Hello", None), ("a", Some(code.len() - 1))]);
    }

    #[test]
    fn test_accessor_fields_do_not_consume_tag_indices() {
        let code = "f(Messages.title, \"a\"); //$NON-NLS-1$\n";
        let result = scan_js(code);
        let literals: Vec<&Literal> = result.literals().collect();
        assert_eq!(literals.len(), 2);
        assert!(!literals[0].is_string());
        assert_eq!(literals[0].index, 0);
        assert_eq!(literals[1].index, 0);
        assert!(literals[1].tag.is_some());
    }
}
