//! Tag markers recording which literals on a line are intentionally inline.
//!
//! A tag is `prefix + n + postfix` inside a single-line comment, where `n` is
//! the 1-based index of the string literal on that line, e.g. `//$NON-NLS-2$`.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::edit::Region;

pub const DEFAULT_TAG_PREFIX: &str = "$NON-NLS-";
pub const DEFAULT_TAG_POSTFIX: &str = "$";

static DEFAULT_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| tag_regex(DEFAULT_TAG_PREFIX, DEFAULT_TAG_POSTFIX).unwrap());

/// Tag prefix and postfix, with the pattern matching them compiled once.
#[derive(Debug, Clone)]
pub struct TagFormat {
    prefix: String,
    postfix: String,
    pattern: Regex,
}

impl Default for TagFormat {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_TAG_PREFIX.to_string(),
            postfix: DEFAULT_TAG_POSTFIX.to_string(),
            pattern: DEFAULT_TAG_RE.clone(),
        }
    }
}

impl PartialEq for TagFormat {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix && self.postfix == other.postfix
    }
}

impl Eq for TagFormat {}

impl TagFormat {
    pub fn new(prefix: &str, postfix: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            prefix: prefix.to_string(),
            postfix: postfix.to_string(),
            pattern: tag_regex(prefix, postfix)?,
        })
    }

    /// Text of a complete tag comment for the 1-based index `number`.
    pub fn render(&self, number: usize) -> String {
        format!("//{}{}{}", self.prefix, number, self.postfix)
    }

    /// Text to insert after existing code to add a tag.
    pub fn render_insert(&self, number: usize) -> String {
        format!(" {}", self.render(number))
    }
}

/// `prefix n postfix`, optionally preceded by the `//` opening its comment.
fn tag_regex(prefix: &str, postfix: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?P<opener>//[ \t]*)?(?P<tag>{}(?P<number>[0-9]+){})",
        regex::escape(prefix),
        regex::escape(postfix)
    ))
}

/// A tag found in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMarker {
    /// 1-based literal index written in the tag.
    pub number: usize,
    /// The tag itself, including an introducing `//` if the tag starts its comment.
    pub region: Region,
    /// The digits of `number`.
    pub number_region: Region,
    /// `region` extended backwards over the blanks preceding it.
    pub removal: Region,
}

/// Find all tags between `start` and `end` in `source`.
///
/// `start` must point at the `//` opening a line comment.
pub fn find_tags(source: &str, start: usize, end: usize, format: &TagFormat) -> Vec<TagMarker> {
    if format.prefix.is_empty() {
        return Vec::new();
    }

    let text = &source[start..end];
    format
        .pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let tag = caps.name("tag")?;
            let digits = caps.name("number")?;
            let number = digits.as_str().parse::<usize>().ok().filter(|n| *n > 0)?;

            // The tag owns its `//` only if nothing but further comments follow.
            let rest = text[tag.end()..].trim_start_matches([' ', '\t']);
            let tag_start = caps
                .name("opener")
                .filter(|_| rest.is_empty() || rest.starts_with("//"))
                .map_or(tag.start(), |opener| opener.start());
            let before = &source[..start + tag_start];
            let blanks = before.len() - before.trim_end_matches([' ', '\t']).len();

            Some(TagMarker {
                number,
                region: Region::between(start + tag_start, start + tag.end()),
                number_region: Region::between(start + digits.start(), start + digits.end()),
                removal: Region::between(start + tag_start - blanks, start + tag.end()),
            })
        })
        .collect()
}
