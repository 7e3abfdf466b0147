//! Static capability tables for HTML tags and attributes.
//!
//! These tables drive the run segmenter: which tags may appear inside a
//! translatable run, which attributes carry translatable text, which tags
//! wrap content that must never be analyzed, and which tags never have a
//! close tag. They are fixed configuration data, not user-extensible.

/// Tags that do not cause a break in a translatable run. When one of these
/// opens while text is being accumulated, its markup is folded into the run
/// instead of terminating it.
pub fn is_non_breaking(name: &str) -> bool {
    matches!(
        name,
        "a" | "abbr"
            | "b"
            | "bdi"
            | "bdo"
            | "br"
            | "dfn"
            | "del"
            | "em"
            | "i"
            | "ins"
            | "mark"
            | "ruby"
            | "rt"
            | "span"
            | "strong"
            | "sub"
            | "sup"
            | "time"
            | "u"
            | "var"
            | "wbr"
    )
}

/// Tags whose content is opaque: scripts, styles, and code listings are
/// copied through verbatim and never searched for translatable text.
pub fn is_opaque(name: &str) -> bool {
    matches!(name, "script" | "style" | "code")
}

/// Tags that never take a close tag. These are not pushed onto the tag
/// stack when folded into a run.
pub fn is_self_closing(name: &str) -> bool {
    matches!(name, "bdi" | "bdo" | "br")
}

/// Returns true if the given attribute on the given element contains
/// localizable text. `title` is localizable on every element; the rest are
/// element-specific.
pub fn is_localizable_attribute(tag: &str, attr: &str) -> bool {
    if attr == "title" {
        return true;
    }
    matches!(
        (tag, attr),
        ("area", "alt")
            | ("img", "alt")
            | ("input", "alt")
            | ("input", "placeholder")
            | ("optgroup", "label")
            | ("option", "label")
            | ("textarea", "placeholder")
            | ("track", "label")
    )
}
