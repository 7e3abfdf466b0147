//! Markup tokenizer for HTML template source.
//!
//! A single forward scan over the input that emits structural [`Event`]s:
//! tags, attributes, comments, CDATA/doctype blocks, and the two embedded
//! template forms (`<%= expr %>` / `<%- expr %>` echoes and `<% code %>`
//! statements). Template tags are recognized even in the middle of a tag's
//! attribute list, and a `>` that belongs to a `%>` never closes the
//! surrounding tag.
//!
//! This is not an HTML5 tokenizer and it never fails: anything that does
//! not parse as markup is emitted as literal text. The content of opaque
//! elements (script/style/code) is scanned as raw text up to the matching
//! close tag so that it survives byte-for-byte.

use crate::tags;

/// A structural event produced by the tokenizer. Events borrow from the
/// input and live only for the duration of one parse.
///
/// Template events carry the full raw text including delimiters, so the
/// consumer can reproduce the input exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    /// `<name`: the start of an open tag. Attributes and the closing `>`
    /// follow as separate events.
    OpenTag { name: &'a str },
    /// The `>` or `/>` that completes an open tag.
    CloseOpenedTag { name: &'a str, self_closing: bool },
    /// `</name>`
    CloseTag { name: &'a str },
    /// One attribute inside an open tag. The value is the raw text between
    /// the quotes (or empty for valueless attributes).
    Attribute { name: &'a str, value: &'a str },
    /// A text chunk between tags.
    Text { value: &'a str },
    /// `<!-- value -->` (the value excludes the delimiters).
    Comment { value: &'a str },
    /// A CDATA section, raw, including delimiters.
    CData { value: &'a str },
    /// A `<!…>` declaration such as a doctype, raw, including delimiters.
    DocType { value: &'a str },
    /// `<%= expr %>` or `<%- expr %>`, raw, including delimiters.
    TemplateEcho { value: &'a str },
    /// `<% code %>`, raw, including delimiters.
    TemplateTag { value: &'a str },
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'_' | b'-')
}

/// Tokenizes the input into a flat event list. Never fails; malformed
/// markup degrades to [`Event::Text`].
pub fn tokenize(input: &str) -> Vec<Event<'_>> {
    let bytes = input.as_bytes();
    let mut events = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            let start = i;
            while i < bytes.len() && bytes[i] != b'<' {
                i += 1;
            }
            events.push(Event::Text {
                value: &input[start..i],
            });
            continue;
        }

        match scan_markup(input, i, &mut events) {
            Some(next) => i = next,
            None => {
                // stray '<' that is not markup: fold it into the text run
                let start = i;
                i += 1;
                while i < bytes.len() && bytes[i] != b'<' {
                    i += 1;
                }
                events.push(Event::Text {
                    value: &input[start..i],
                });
            }
        }
    }

    events
}

/// Attempts to scan one markup construct starting at the `<` at `i`.
/// Returns the position after the construct, or `None` if the bytes there
/// are not markup. No events are emitted on the `None` path.
fn scan_markup<'a>(input: &'a str, i: usize, events: &mut Vec<Event<'a>>) -> Option<usize> {
    let rest = &input[i..];

    if rest.starts_with("<%") {
        return Some(scan_template(input, i, events));
    }

    if rest.starts_with("<!--") {
        let body_start = i + 4;
        return Some(match input[body_start..].find("-->") {
            Some(end) => {
                events.push(Event::Comment {
                    value: &input[body_start..body_start + end],
                });
                body_start + end + 3
            }
            None => {
                // unterminated comment swallows the rest of the input
                events.push(Event::Comment {
                    value: &input[body_start..],
                });
                input.len()
            }
        });
    }

    if rest.starts_with("<![CDATA[") {
        let end = input[i + 9..].find("]]>")?;
        let after = i + 9 + end + 3;
        events.push(Event::CData {
            value: &input[i..after],
        });
        return Some(after);
    }

    if rest.starts_with("<!") {
        let gt = rest.find('>')?;
        events.push(Event::DocType {
            value: &rest[..=gt],
        });
        return Some(i + gt + 1);
    }

    if let Some(after_slash) = rest.strip_prefix("</") {
        let name_len = after_slash
            .bytes()
            .take_while(|&b| is_name_byte(b))
            .count();
        if name_len == 0 {
            return None;
        }
        let name = &input[i + 2..i + 2 + name_len];
        let gt = rest.find('>')?;
        events.push(Event::CloseTag { name });
        return Some(i + gt + 1);
    }

    scan_open_tag(input, i, events)
}

fn scan_open_tag<'a>(input: &'a str, i: usize, events: &mut Vec<Event<'a>>) -> Option<usize> {
    let bytes = input.as_bytes();
    let name_start = i + 1;
    if name_start >= bytes.len() || !bytes[name_start].is_ascii_alphabetic() {
        return None;
    }

    let mut j = name_start;
    while j < bytes.len() && is_name_byte(bytes[j]) {
        j += 1;
    }
    let name = &input[name_start..j];
    events.push(Event::OpenTag { name });

    loop {
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= bytes.len() {
            // missing '>' at end of input is tolerated
            return Some(j);
        }
        if input[j..].starts_with("<%") {
            j = scan_template(input, j, events);
            continue;
        }
        match bytes[j] {
            b'>' => {
                events.push(Event::CloseOpenedTag {
                    name,
                    self_closing: false,
                });
                j += 1;
                if tags::is_opaque(name) {
                    j = scan_rawtext(input, j, name, events);
                }
                return Some(j);
            }
            b'/' if j + 1 < bytes.len() && bytes[j + 1] == b'>' => {
                events.push(Event::CloseOpenedTag {
                    name,
                    self_closing: true,
                });
                return Some(j + 2);
            }
            b if is_name_byte(b) => {
                j = scan_attribute(input, j, events);
            }
            _ => {
                // junk inside the tag, skip one whole character so the
                // cursor stays on a char boundary
                j += input[j..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }
}

fn scan_attribute<'a>(input: &'a str, start: usize, events: &mut Vec<Event<'a>>) -> usize {
    let bytes = input.as_bytes();
    let mut j = start;
    while j < bytes.len() && is_name_byte(bytes[j]) {
        j += 1;
    }
    let name = &input[start..j];

    let mut k = j;
    while k < bytes.len() && bytes[k].is_ascii_whitespace() {
        k += 1;
    }
    if k >= bytes.len() || bytes[k] != b'=' {
        // valueless attribute
        events.push(Event::Attribute { name, value: "" });
        return j;
    }
    k += 1;
    while k < bytes.len() && bytes[k].is_ascii_whitespace() {
        k += 1;
    }

    let value;
    if k < bytes.len() && (bytes[k] == b'"' || bytes[k] == b'\'') {
        let quote = bytes[k];
        k += 1;
        let value_start = k;
        while k < bytes.len() && bytes[k] != quote {
            k += 1;
        }
        value = &input[value_start..k];
        if k < bytes.len() {
            k += 1;
        }
    } else {
        let value_start = k;
        while k < bytes.len()
            && !bytes[k].is_ascii_whitespace()
            && bytes[k] != b'>'
            && !(bytes[k] == b'/' && k + 1 < bytes.len() && bytes[k + 1] == b'>')
        {
            k += 1;
        }
        value = &input[value_start..k];
    }

    events.push(Event::Attribute { name, value });
    k
}

/// Scans a template tag starting at the `<%` at `i`. Total: an unterminated
/// template swallows the rest of the input.
fn scan_template<'a>(input: &'a str, i: usize, events: &mut Vec<Event<'a>>) -> usize {
    let after = &input[i + 2..];
    let echo = after.starts_with('=') || after.starts_with('-');
    let (value, next) = match after.find("%>") {
        Some(end) => (&input[i..i + 2 + end + 2], i + 2 + end + 2),
        None => (&input[i..], input.len()),
    };
    if echo {
        events.push(Event::TemplateEcho { value });
    } else {
        events.push(Event::TemplateTag { value });
    }
    next
}

/// Consumes the raw content of an opaque element up to its matching close
/// tag (case-insensitive). Emits the content as one verbatim text event.
fn scan_rawtext<'a>(
    input: &'a str,
    from: usize,
    name: &str,
    events: &mut Vec<Event<'a>>,
) -> usize {
    let bytes = input.as_bytes();
    let mut k = from;
    while k < bytes.len() {
        if bytes[k] == b'<'
            && k + 2 + name.len() <= bytes.len()
            && bytes[k + 1] == b'/'
            && bytes[k + 2..k + 2 + name.len()].eq_ignore_ascii_case(name.as_bytes())
        {
            let mut g = k + 2 + name.len();
            while g < bytes.len() && bytes[g].is_ascii_whitespace() {
                g += 1;
            }
            if g < bytes.len() && bytes[g] == b'>' {
                if k > from {
                    events.push(Event::Text {
                        value: &input[from..k],
                    });
                }
                events.push(Event::CloseTag {
                    name: &input[k + 2..k + 2 + name.len()],
                });
                return g + 1;
            }
        }
        k += 1;
    }
    // close tag never arrives; the rest of the input is raw text
    if from < input.len() {
        events.push(Event::Text {
            value: &input[from..],
        });
    }
    input.len()
}
