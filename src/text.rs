//! Text classification and escaping helpers.
//!
//! Whitespace classification here is wider than `char::is_whitespace`: it
//! covers the Unicode space ranges the extractor has always treated as
//! ignorable, plus a fixed set of named HTML space entities. Any other
//! entity counts as real text and starts or extends a run.

/// Named HTML entities that represent a space character. Text consisting
/// only of these (and literal whitespace) is not extracted.
const SPACE_ENTITIES: &[&str] = &[
    "nbsp", "ensp", "emsp", "emsp13", "emsp14", "numsp", "puncsp", "thinsp", "hairsp", "nnbsp",
    "mmsp",
];

/// Returns true if the character is whitespace for extraction purposes.
///
/// Covers ASCII whitespace, NBSP, and the Unicode space/format ranges
/// U+2000–200F, U+2028–202F, and U+205F–206F.
pub fn is_white(c: char) -> bool {
    if matches!(c, ' ' | '\n' | '\t' | '\r' | '\u{C}') {
        return true;
    }
    let code = c as u32;
    code == 0x00A0
        || (0x2000..=0x200F).contains(&code)
        || (0x2028..=0x202F).contains(&code)
        || (0x205F..=0x206F).contains(&code)
}

/// Returns true if the text consists entirely of whitespace, where the
/// recognized space entities also count as whitespace. Any other character
/// or entity makes the text non-whitespace.
pub fn is_all_white(text: &str) -> bool {
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if c == '&' {
            match space_entity_len(rest) {
                Some(len) => rest = &rest[len..],
                None => return false,
            }
        } else if is_white(c) {
            rest = &rest[c.len_utf8()..];
        } else {
            return false;
        }
    }
    true
}

/// If `text` starts with a recognized space entity like `&nbsp;`, returns
/// the byte length of that entity including the delimiters.
fn space_entity_len(text: &str) -> Option<usize> {
    debug_assert!(text.starts_with('&'));
    let body = &text[1..];
    let end = body.find(';')?;
    let name = &body[..end];
    if SPACE_ENTITIES.contains(&name) {
        Some(end + 2)
    } else {
        None
    }
}

/// Escapes control characters that are not valid in HTML text as numeric
/// character references. The whitespace controls 0x09–0x0D are left alone.
pub fn escape_invalid_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let code = c as u32;
        if code < 0x09 || (0x0E..0x20).contains(&code) {
            out.push_str(&format!("&#{};", code));
        } else {
            out.push(c);
        }
    }
    out
}

/// Escapes a string for embedding in a quoted HTML attribute value.
///
/// Template spans `<% … %>` are passed through verbatim so that embedded
/// template code (which frequently contains quotes) survives untouched. A
/// single leading/trailing quote pair around the whole value is preserved
/// rather than escaped.
pub fn escape_quotes(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut ret = String::with_capacity(text.len());
    let mut suffix = None;
    let mut start = 0;
    let mut end = chars.len();

    if chars[0] == '"' || chars[0] == '\'' {
        ret.push(chars[0]);
        start = 1;
        if end > start && (chars[end - 1] == '"' || chars[end - 1] == '\'') {
            suffix = Some(chars[end - 1]);
            end -= 1;
        }
    }

    let mut i = start;
    while i < end {
        match chars[i] {
            '"' => ret.push_str("&quot;"),
            '\'' => ret.push_str("&apos;"),
            '<' => {
                if i + 1 < end && chars[i + 1] == '%' {
                    // copy the template span through verbatim
                    i += 2;
                    ret.push_str("<%");
                    while i + 1 < end && !(chars[i] == '%' && chars[i + 1] == '>') {
                        ret.push(chars[i]);
                        i += 1;
                    }
                    if i < end {
                        ret.push(chars[i]);
                    }
                } else {
                    ret.push_str("&lt;");
                }
            }
            '>' => {
                if i > 0 && chars[i - 1] == '%' {
                    ret.push('>');
                } else {
                    ret.push_str("&gt;");
                }
            }
            '\\' => {
                ret.push('\\');
                if i + 1 < end {
                    i += 1;
                    ret.push(chars[i]);
                }
            }
            c => ret.push(c),
        }
        i += 1;
    }

    if let Some(q) = suffix {
        ret.push(q);
    }

    ret
}

/// Counts newlines, for line-number tracking during a parse.
pub fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}
