//! Escaping rules for `.properties` files and JavaScript string literals.

/// Escape control characters, backslashes and anything outside printable ASCII.
///
/// Non-ASCII characters become `\uXXXX` escapes, one per UTF-16 code unit.
pub fn escape_chars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            ' '..='~' => out.push(c),
            _ => push_unicode_escapes(&mut out, c),
        }
    }
    out
}

fn push_unicode_escapes(out: &mut String, c: char) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        out.push_str(&format!("\\u{:04X}", unit));
    }
}

/// Encode a value for the right-hand side of a property entry.
///
/// A leading comment character and all leading blanks are backslash-escaped
/// so the value survives the separator and comment handling of the reader.
pub fn escape_value(value: &str) -> String {
    let escaped = escape_chars(value);
    let mut out = String::with_capacity(escaped.len() + 2);
    if escaped.starts_with(['#', '!']) {
        out.push('\\');
    }
    let rest = escaped.trim_start_matches(' ');
    for _ in 0..escaped.len() - rest.len() {
        out.push_str("\\ ");
    }
    out.push_str(rest);
    out
}

/// Encode a property key. Separators and blanks are escaped anywhere in the key.
pub fn escape_key(key: &str) -> String {
    let escaped = escape_chars(key);
    let mut out = String::with_capacity(escaped.len() + 2);
    if escaped.starts_with(['#', '!']) {
        out.push('\\');
    }
    for c in escaped.chars() {
        if matches!(c, '=' | ':' | ' ') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Decode a property key or value. Inverse of [`escape_key`] and [`escape_value`].
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_high: Option<u16> = None;
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_surrogate(&mut out, &mut pending_high);
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            break;
        };
        if next == 'u' {
            let hex: String = chars.clone().take(4).collect();
            if hex.len() == 4
                && let Ok(unit) = u16::from_str_radix(&hex, 16)
            {
                for _ in 0..4 {
                    chars.next();
                }
                push_unit(&mut out, &mut pending_high, unit);
                continue;
            }
        }
        flush_surrogate(&mut out, &mut pending_high);
        out.push(match next {
            'b' => '\u{8}',
            't' => '\t',
            'n' => '\n',
            'f' => '\u{c}',
            'r' => '\r',
            other => other,
        });
    }
    flush_surrogate(&mut out, &mut pending_high);
    out
}

fn push_unit(out: &mut String, pending_high: &mut Option<u16>, unit: u16) {
    match (pending_high.take(), unit) {
        (Some(high), 0xDC00..=0xDFFF) => {
            out.extend(char::decode_utf16([high, unit]).map(|r| r.unwrap_or('\u{FFFD}')));
        }
        (previous, 0xD800..=0xDBFF) => {
            if previous.is_some() {
                out.push('\u{FFFD}');
            }
            *pending_high = Some(unit);
        }
        (previous, _) => {
            if previous.is_some() {
                out.push('\u{FFFD}');
            }
            out.push(char::from_u32(unit as u32).unwrap_or('\u{FFFD}'));
        }
    }
}

fn flush_surrogate(out: &mut String, pending_high: &mut Option<u16>) {
    if pending_high.take().is_some() {
        out.push('\u{FFFD}');
    }
}

/// Escape text for a JavaScript string literal delimited by `quote`.
///
/// Non-ASCII text is kept as is; only the quote, backslashes and control
/// characters are escaped.
pub fn escape_source(s: &str, quote: char) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                push_unicode_escapes(&mut out, c)
            }
            c => out.push(c),
        }
    }
    out
}

/// Quote `s` as a JavaScript string literal.
pub fn quote_source(s: &str, quote: char) -> String {
    format!("{quote}{}{quote}", escape_source(s, quote))
}
