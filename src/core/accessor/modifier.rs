use std::collections::HashSet;

use super::{AccessorClass, AccessorField};
use crate::core::{
    edit::{Region, TextEdit},
    model::{Substitution, owner, touched_keys},
};
use crate::utils::{LineIndex, detect_line_delimiter};

/// Edits adding and removing key fields of an existing accessor class.
///
/// Works on the keys touched by `subs`: a key without an externalized owner
/// loses its field line, a key with an owner but no field gets
/// `static key;` inserted in name order. Missing fields are left alone.
pub fn accessor_field_edits(
    source: &str,
    class: &AccessorClass,
    subs: &[&Substitution],
    indent: &str,
) -> Vec<TextEdit> {
    let touched = touched_keys(subs.iter().copied(), Substitution::has_accessor_class_change);
    let line_index = LineIndex::new(source);
    let delimiter = detect_line_delimiter(source);
    let indent = class
        .fields
        .first()
        .map(|f| leading_blanks(line_index.line_text(source, f.region.offset)))
        .unwrap_or(indent);

    let mut edits = Vec::new();
    let mut removed: HashSet<&str> = HashSet::new();
    for key in &touched {
        if owner(subs.iter().copied(), key).is_some() {
            continue;
        }
        if let Some(field) = class.field(key) {
            edits.push(TextEdit::delete(Region::between(
                line_index.line_start_of(field.region.offset),
                line_index.line_end_with_delimiter(field.region.end()),
            )));
            removed.insert(field.name.as_str());
        }
    }

    let live: Vec<&AccessorField> = class
        .fields
        .iter()
        .filter(|f| !removed.contains(f.name.as_str()))
        .collect();
    for key in &touched {
        if owner(subs.iter().copied(), key).is_none() || class.field(key).is_some() {
            continue;
        }
        let field = format!("{}static {};", indent, key);

        let edit = if let Some(next) = live.iter().find(|f| f.name.as_str() >= key.as_str()) {
            TextEdit::insert(
                line_index.line_start_of(next.region.offset),
                format!("{}{}", field, delimiter),
            )
        } else if let Some(last) = live.last() {
            TextEdit::insert(
                line_index.line_end_with_delimiter(last.region.end()),
                format!("{}{}", field, delimiter),
            )
        } else if line_index.line_of(class.body_open) == line_index.line_of(class.body_close) {
            TextEdit::insert(
                class.body_open,
                format!("{}{}{}", delimiter, field, delimiter),
            )
        } else {
            TextEdit::insert(
                line_index.line_end_with_delimiter(class.body_open),
                format!("{}{}", field, delimiter),
            )
        };
        edits.push(edit);
    }
    edits
}

fn leading_blanks(line: &str) -> &str {
    &line[..line.len() - line.trim_start_matches([' ', '\t']).len()]
}
