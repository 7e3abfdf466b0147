//! Resource key derivation.
//!
//! Two key families exist. Markup sources (HTML templates) use the identity
//! family: the escaped source string is its own key. Script sources (Java,
//! Ruby) use the hash family: `"r"` followed by a rolling hash of the
//! cleaned, unescaped source.
//!
//! The hash and the cleaning step are a frozen protocol shared with every
//! other extractor in the localization ecosystem; the same logical string
//! must map to the same key no matter which extractor found it. Changing
//! either constant invalidates every key ever generated, so don't. Only the
//! per-language unescape step varies.

use std::sync::LazyLock;

use regex::Regex;

/// Largest prime that fits in 30 bits.
const HASH_MODULUS: u64 = 1_073_741_789;
/// Largest prime that fits in 16 bits, co-prime with the modulus.
const HASH_MULTIPLE: u64 = 65_521;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\n\r\x0C]+").unwrap());

/// The shared rolling hash over UTF-16 code units. Intermediate products
/// stay within 46 bits, so `u64` arithmetic never overflows.
pub fn hash(source: &str) -> u64 {
    let mut h: u64 = 0;
    for unit in source.encode_utf16() {
        h = (h + u64::from(unit)) * HASH_MULTIPLE % HASH_MODULUS;
    }
    h
}

/// Returns the standard hash key for a cleaned source string, or `None`
/// for an empty string, which has no key.
pub fn hash_key(source: &str) -> Option<String> {
    if source.is_empty() {
        return None;
    }
    Some(format!("r{}", hash(source)))
}

/// Collapses runs of horizontal whitespace to a single space and trims the
/// ends. Case is preserved. Part of the shared key protocol.
pub fn clean_string(source: &str) -> String {
    WHITESPACE_RUN.replace_all(source, " ").trim().to_string()
}

/// Key for a string extracted from Java source: interpret the escapes the
/// Java string-literal grammar would, then clean and hash.
pub fn java_key(source: &str) -> Option<String> {
    hash_key(&clean_string(&unescape_java(source)))
}

/// Key for a double-quoted Ruby string literal. Literal newlines inside the
/// literal are removed before unescaping.
pub fn ruby_key(source: &str) -> Option<String> {
    hash_key(&clean_string(&unescape_ruby(source)))
}

/// Key for a single-quoted Ruby string literal, where only `\'` and `\\`
/// are interpreted by the language.
pub fn ruby_key_unescaped(source: &str) -> Option<String> {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().filter(|&c| c != '\n').peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('\'') => {
                    out.push('\'');
                    chars.next();
                }
                Some('\\') => {
                    out.push('\\');
                    chars.next();
                }
                _ => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    hash_key(&clean_string(&out))
}

fn unescape_java(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn unescape_ruby(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars: Vec<char> = source.chars().filter(|&c| c != '\n').collect();
    chars.reverse();
    while let Some(c) = chars.pop() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.pop() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some(e @ ('x' | 'u')) => {
                let mut hex = String::new();
                let max = if e == 'x' { 2 } else { 4 };
                while hex.len() < max && chars.last().is_some_and(|c| c.is_ascii_hexdigit()) {
                    hex.push(chars.pop().unwrap());
                }
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if !hex.is_empty() => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(e);
                        out.push_str(&hex);
                    }
                }
            }
            // identity escapes the Ruby lexer drops
            Some(other @ ('d' | 'g' | 'h' | 'i' | 'j' | 'k' | 'l' | 'm' | 'o' | 'p' | 'q' | 'w'
            | 'y' | 'z')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
