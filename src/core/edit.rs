//! Text regions and batched text edits.

use super::NlsError;

/// A byte range in one text snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Region {
    pub offset: usize,
    pub len: usize,
}

impl Region {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    pub fn between(start: usize, end: usize) -> Self {
        Self {
            offset: start,
            len: end.saturating_sub(start),
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    pub fn contains(&self, other: &Region) -> bool {
        self.offset <= other.offset && other.end() <= self.end()
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.offset..self.end()]
    }
}

/// Replace `region` of the snapshot with `text`.
///
/// Inserts have an empty region, deletes an empty text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub region: Region,
    pub text: String,
}

impl TextEdit {
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            region: Region::new(offset, 0),
            text: text.into(),
        }
    }

    pub fn delete(region: Region) -> Self {
        Self {
            region,
            text: String::new(),
        }
    }

    pub fn replace(region: Region, text: impl Into<String>) -> Self {
        Self {
            region,
            text: text.into(),
        }
    }
}

/// Result of applying a batch of edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedEdits {
    pub text: String,
    /// Edits against `text` that restore the original snapshot.
    pub inverse: Vec<TextEdit>,
}

/// Order edits for application.
///
/// Edits keep their generation order when they start at the same offset,
/// except that inserts go before a replacement starting there.
pub fn sort_edits(edits: &[TextEdit]) -> Vec<TextEdit> {
    let mut sorted = edits.to_vec();
    sorted.sort_by_key(|edit| (edit.region.offset, edit.region.len > 0));
    sorted
}

/// Apply all edits to `source` as one batch.
///
/// Fails without touching anything if two edits overlap or an edit does not
/// fall on character boundaries of `source`.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<AppliedEdits, NlsError> {
    let sorted = sort_edits(edits);

    let mut last_end = 0;
    for edit in &sorted {
        let region = edit.region;
        if region.end() > source.len()
            || !source.is_char_boundary(region.offset)
            || !source.is_char_boundary(region.end())
        {
            return Err(NlsError::InvalidEdit {
                offset: region.offset,
            });
        }
        if region.offset < last_end {
            return Err(NlsError::OverlappingEdits {
                offset: region.offset,
            });
        }
        last_end = region.end();
    }

    let mut text = String::with_capacity(source.len());
    let mut inverse = Vec::with_capacity(sorted.len());
    let mut cursor = 0;
    for edit in &sorted {
        text.push_str(&source[cursor..edit.region.offset]);
        inverse.push(TextEdit::replace(
            Region::new(text.len(), edit.text.len()),
            edit.region.text(source),
        ));
        text.push_str(&edit.text);
        cursor = edit.region.end();
    }
    text.push_str(&source[cursor..]);

    Ok(AppliedEdits { text, inverse })
}
