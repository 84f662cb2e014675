//! Source edits: literals become accessor references and back, tags follow.

use std::collections::HashMap;

use crate::core::{
    accessor::AccessorKind,
    edit::TextEdit,
    escape::quote_source,
    model::{Substitution, SubstitutionState},
    scan::{Line, Literal, ScanResult, TagFormat},
};

pub const KEY_PLACEHOLDER: &str = "${key}";

/// How new accessor references are written.
#[derive(Debug, Clone, Copy)]
pub struct SourceRewriteOptions<'a> {
    /// Kind of the accessor new externalizations go to.
    pub kind: AccessorKind,
    /// Receiver used for new references.
    pub accessor_name: &'a str,
    /// Lookup call pattern, e.g. `getString(${key})`.
    pub pattern: &'a str,
    pub tag_format: &'a TagFormat,
}

/// Split a call pattern at its first `${key}`. Without a placeholder the
/// whole pattern goes before the key.
pub fn split_pattern(pattern: &str) -> (&str, &str) {
    match pattern.find(KEY_PLACEHOLDER) {
        Some(i) => (&pattern[..i], &pattern[i + KEY_PLACEHOLDER.len()..]),
        None => (pattern, ""),
    }
}

/// Edits for every line holding a substitution with a source change.
///
/// Edits stay within single literals, accessor references and tag regions,
/// so they never overlap as long as references do not nest.
pub fn source_edits(
    source: &str,
    scan: &ScanResult,
    subs: &[Substitution],
    options: &SourceRewriteOptions<'_>,
) -> Vec<TextEdit> {
    let by_offset: HashMap<usize, &Substitution> = subs
        .iter()
        .map(|s| (s.literal().region.offset, s))
        .collect();

    let mut edits = Vec::new();
    for line in scan.lines() {
        let line_subs: Vec<Option<&Substitution>> = line
            .literals
            .iter()
            .map(|l| by_offset.get(&l.region.offset).copied())
            .collect();
        if !line_subs.iter().flatten().any(|s| s.has_source_change()) {
            continue;
        }

        for sub in line_subs.iter().flatten() {
            if sub.has_source_change() {
                literal_edits(source, sub, options, &mut edits);
            }
        }
        tag_edits(line, &line_subs, options, &mut edits);
    }
    edits
}

fn kind_of(sub: &Substitution, options: &SourceRewriteOptions<'_>) -> AccessorKind {
    sub.accessor()
        .map(|a| a.binding.kind)
        .unwrap_or(options.kind)
}

/// True if the element is a string literal after the rewrite.
fn stays_string(literal: &Literal, sub: Option<&Substitution>, options: &SourceRewriteOptions<'_>) -> bool {
    match sub {
        None => literal.is_string(),
        Some(sub) if sub.is_externalized() => kind_of(sub, options) == AccessorKind::Lookup,
        Some(_) => true,
    }
}

fn literal_edits(
    source: &str,
    sub: &Substitution,
    options: &SourceRewriteOptions<'_>,
    edits: &mut Vec<TextEdit>,
) {
    let literal = sub.literal();
    let quote = literal.quote();
    let key = sub.key().unwrap_or_default();
    let was_externalized = sub.initial_state() == SubstitutionState::Externalized;

    match (was_externalized, sub.is_externalized()) {
        (false, true) => {
            let receiver = sub
                .accessor()
                .map(|a| a.receiver.text(source))
                .unwrap_or(options.accessor_name);
            let expression = match kind_of(sub, options) {
                AccessorKind::Fields => format!("{}.{}", receiver, key),
                AccessorKind::Lookup => {
                    let (before, after) = split_pattern(options.pattern);
                    format!("{}.{}{}{}", receiver, before, quote_source(key, quote), after)
                }
            };
            edits.push(TextEdit::replace(literal.region, expression));
        }
        (true, false) => {
            let region = sub
                .accessor()
                .map(|a| a.region)
                .unwrap_or(literal.region);
            edits.push(TextEdit::replace(
                region,
                quote_source(sub.value_or_empty(), quote),
            ));
        }
        (true, true) => {
            if sub.initial_key().is_none() || sub.is_key_rename() {
                let text = match kind_of(sub, options) {
                    AccessorKind::Fields => key.to_string(),
                    AccessorKind::Lookup => quote_source(key, quote),
                };
                edits.push(TextEdit::replace(literal.region, text));
            }
            if sub.is_accessor_rename()
                && let (Some(reference), Some(name)) = (sub.accessor(), sub.new_accessor_name())
            {
                edits.push(TextEdit::replace(reference.receiver, name));
            }
        }
        (false, false) => {}
    }
}

/// Insert, delete or renumber tags so that every final string literal that
/// is not internalized carries a tag with its index.
fn tag_edits(
    line: &Line,
    line_subs: &[Option<&Substitution>],
    options: &SourceRewriteOptions<'_>,
    edits: &mut Vec<TextEdit>,
) {
    let mut number = 0;
    for (literal, sub) in line.literals.iter().zip(line_subs) {
        let sub = *sub;
        let is_string = stays_string(literal, sub, options);
        if is_string {
            number += 1;
        }
        let needs_tag = is_string
            && sub.is_some_and(|s| s.state() != SubstitutionState::Internalized);

        match (literal.tag, needs_tag) {
            (Some(tag), true) if tag.number != number => {
                edits.push(TextEdit::replace(tag.number_region, number.to_string()));
            }
            (Some(tag), false) => edits.push(TextEdit::delete(tag.removal)),
            (None, true) => {
                if let Some(anchor) = literal.tag_anchor {
                    edits.push(TextEdit::insert(anchor, options.tag_format.render_insert(number)));
                }
            }
            _ => {}
        }
    }
}

/// Edit adding `statement` after the last import, or at the top of the file.
pub fn import_edit(source: &str, scan: &ScanResult, statement: &str) -> TextEdit {
    let delimiter = crate::utils::detect_line_delimiter(source);
    match scan.last_import_end() {
        Some(end) => {
            let offset = scan.line_index().line_end_with_delimiter(end);
            if offset == source.len() && !source.ends_with(['\n', '\r']) {
                TextEdit::insert(offset, format!("{}{}", delimiter, statement))
            } else {
                TextEdit::insert(offset, format!("{}{}", statement, delimiter))
            }
        }
        None => TextEdit::insert(0, format!("{}{}", statement, delimiter)),
    }
}
