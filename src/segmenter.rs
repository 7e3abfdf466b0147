//! Run segmentation for HTML template files.
//!
//! Drives the tokenizer and splits the document into an alternating list
//! of literal and localizable segments. Text is accumulated into a *run*
//! that grows across non-breaking inline markup (`<b>`, `<span>`, …) and
//! is flushed into a [`Resource`] whenever breaking markup or a template
//! statement interrupts it. Concatenating the segment texts back together
//! reproduces the source document, minus comments, so the same segment
//! list later drives localized re-assembly.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::resource::{Resource, TranslationSet};
use crate::tags;
use crate::text::{self, escape_invalid_chars, escape_quotes};
use crate::tokenizer::{self, Event};

/// One piece of the sliced document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Literal segments are copied to the output untouched; localizable
    /// segments are replaced by their translation.
    pub localizable: bool,
    pub text: String,
    /// When set, this segment carries a translated attribute value that is
    /// substituted into the next localizable segment in place of
    /// [`Segment::replacement`] rather than emitted on its own.
    pub attribute_substitution: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    /// Attribute values are re-escaped for a quoted context on output.
    pub escape: bool,
}

impl Segment {
    fn literal(text: String) -> Self {
        Segment {
            localizable: false,
            text,
            attribute_substitution: false,
            replacement: None,
            escape: false,
        }
    }

    fn localizable(text: String) -> Self {
        Segment {
            localizable: true,
            text,
            attribute_substitution: false,
            replacement: None,
            escape: false,
        }
    }

    fn attribute_value(text: String) -> Self {
        Segment {
            localizable: true,
            text,
            attribute_substitution: false,
            replacement: None,
            escape: true,
        }
    }

    fn attribute_substitution(text: String, replacement: String) -> Self {
        Segment {
            localizable: true,
            text,
            attribute_substitution: true,
            replacement: Some(replacement),
            escape: true,
        }
    }
}

/// An HTML template file in the middle of extraction or localization.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    project: String,
    path: String,
    source_locale: String,
    set: TranslationSet,
    segments: Vec<Segment>,
    resource_index: usize,
}

impl TemplateFile {
    pub fn new(
        project: impl Into<String>,
        path: impl Into<String>,
        source_locale: impl Into<String>,
    ) -> Self {
        TemplateFile {
            project: project.into(),
            path: path.into(),
            source_locale: source_locale.into(),
            set: TranslationSet::new(),
            segments: Vec::new(),
            resource_index: 0,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn source_locale(&self) -> &str {
        &self.source_locale
    }

    pub fn translation_set(&self) -> &TranslationSet {
        &self.set
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Reads the file at `root`/`path` and parses it. An unreadable file
    /// is logged and leaves the set empty; it is never an error.
    pub fn extract_from(&mut self, root: &Path) {
        let full = root.join(&self.path);
        match fs::read_to_string(&full) {
            Ok(data) => {
                if !data.is_empty() {
                    self.parse(&data);
                }
            }
            Err(err) => {
                warn!(path = %full.display(), %err, "could not read file; no strings extracted");
            }
        }
    }

    /// Parses template source, appending to the segment list and the
    /// translation set.
    pub fn parse(&mut self, data: &str) {
        debug!(path = %self.path, "extracting strings from HTML template");
        let mut segmenter = Segmenter::new();
        for event in tokenizer::tokenize(data) {
            segmenter.handle(event);
        }
        let (segments, extracted) = segmenter.finish();
        for found in extracted {
            trace!(text = %found.text, line = found.line, "extracted string");
            self.set.add(Resource {
                project: self.project.clone(),
                key: found.text.clone(),
                source: found.text,
                source_locale: self.source_locale.clone(),
                path: self.path.clone(),
                datatype: "html".into(),
                comment: found.comment,
                line: found.line,
                index: self.resource_index,
            });
            self.resource_index += 1;
        }
        self.segments.extend(segments);
    }
}

/// A string pulled out of the document, waiting to become a resource.
struct Extracted {
    text: String,
    comment: Option<String>,
    line: usize,
}

/// The segmentation state machine. One instance per parse.
struct Segmenter<'a> {
    /// Literal text that precedes the current run.
    accumulator: String,
    /// The open run of translatable text. Non-empty means a run is open.
    run: String,
    /// Translator note from an `i18n:` comment, attached to the next
    /// extracted string.
    pending_comment: Option<String>,
    /// Non-breaking tags opened inside the current run. Scoped to one run:
    /// cleared on every flush and on every unmatched close tag.
    tag_stack: Vec<&'a str>,
    /// The tag whose attribute list we are currently inside, if any.
    current_tag: Option<&'a str>,
    /// True directly after a tag name, before any attribute. A template
    /// tag here needs a separating space.
    after_tag_name: bool,
    /// True directly after a mid-tag template tag; the next attribute is
    /// emitted without a leading space.
    attr_no_space: bool,
    /// Nesting depth of script/style/code elements. While non-zero,
    /// everything is copied verbatim.
    opaque_depth: usize,
    line: usize,
    /// Line on which the current run opened.
    run_line: usize,
    segments: Vec<Segment>,
    extracted: Vec<Extracted>,
}

impl<'a> Segmenter<'a> {
    fn new() -> Self {
        Segmenter {
            accumulator: String::new(),
            run: String::new(),
            pending_comment: None,
            tag_stack: Vec::new(),
            current_tag: None,
            after_tag_name: false,
            attr_no_space: false,
            opaque_depth: 0,
            line: 1,
            run_line: 1,
            segments: Vec::new(),
            extracted: Vec::new(),
        }
    }

    fn handle(&mut self, event: Event<'a>) {
        match event {
            Event::OpenTag { name } => self.open_tag(name),
            Event::CloseOpenedTag { name, self_closing } => {
                self.close_opened_tag(name, self_closing)
            }
            Event::CloseTag { name } => self.close_tag(name),
            Event::Attribute { name, value } => self.attribute(name, value),
            Event::Text { value } => self.text(value),
            Event::Comment { value } => self.comment(value),
            Event::CData { value } | Event::DocType { value } => {
                self.active_buffer().push_str(value);
                self.line += text::count_newlines(value);
            }
            Event::TemplateEcho { value } => self.template_echo(value),
            Event::TemplateTag { value } => self.template_tag(value),
        }
    }

    /// The buffer new markup text goes into: the run while one is open,
    /// the accumulator otherwise.
    fn active_buffer(&mut self) -> &mut String {
        if self.run.is_empty() {
            &mut self.accumulator
        } else {
            &mut self.run
        }
    }

    fn open_tag(&mut self, name: &'a str) {
        if self.opaque_depth > 0 {
            self.accumulator.push('<');
            self.accumulator.push_str(name);
        } else if !self.run.is_empty() && tags::is_non_breaking(name) {
            // the run absorbs inline markup
            self.run.push('<');
            self.run.push_str(name);
            if !tags::is_self_closing(name) {
                self.tag_stack.push(name);
            }
        } else {
            self.flush_run();
            self.accumulator.push('<');
            self.accumulator.push_str(name);
            if tags::is_opaque(name) {
                self.opaque_depth += 1;
            }
        }
        self.current_tag = Some(name);
        self.after_tag_name = true;
        self.attr_no_space = false;
    }

    fn close_opened_tag(&mut self, name: &'a str, self_closing: bool) {
        let token = if self_closing { "/>" } else { ">" };
        self.active_buffer().push_str(token);
        if self_closing && tags::is_opaque(name) && self.opaque_depth > 0 {
            // <script/> has no raw content and no close tag coming
            self.opaque_depth -= 1;
        }
        self.current_tag = None;
        self.after_tag_name = false;
        self.attr_no_space = false;
    }

    fn close_tag(&mut self, name: &'a str) {
        if self.opaque_depth > 0 {
            self.accumulator.push_str("</");
            self.accumulator.push_str(name);
            self.accumulator.push('>');
            if tags::is_opaque(name) {
                self.opaque_depth -= 1;
            }
            return;
        }
        if !self.run.is_empty() && self.tag_stack.contains(&name) {
            // balanced within the run: pop everything above the match
            while let Some(top) = self.tag_stack.pop() {
                if top == name {
                    break;
                }
            }
            self.run.push_str("</");
            self.run.push_str(name);
            self.run.push('>');
        } else {
            self.flush_run();
            self.accumulator.push_str("</");
            self.accumulator.push_str(name);
            self.accumulator.push('>');
        }
    }

    fn attribute(&mut self, name: &'a str, value: &'a str) {
        self.line += text::count_newlines(value);
        if self.opaque_depth > 0 {
            self.accumulator.push(' ');
            self.accumulator.push_str(name);
            self.accumulator.push_str("=\"");
            self.accumulator.push_str(value);
            self.accumulator.push('"');
            return;
        }

        let tag = self.current_tag.unwrap_or("");
        let lead = if self.attr_no_space { "" } else { " " };
        let localizable = tags::is_localizable_attribute(tag, name)
            && !value.trim().is_empty()
            && !value.starts_with("<%");

        if localizable {
            trace!(tag, attribute = name, value, "localizable attribute");
            self.extracted.push(Extracted {
                text: value.to_string(),
                comment: self.pending_comment.clone(),
                line: self.line,
            });
            if !self.run.is_empty() {
                // reinsert the translated value into the surrounding
                // string at re-assembly time
                let replacement = format!("{{{name}}}");
                self.segments.push(Segment::attribute_substitution(
                    escape_quotes(value),
                    replacement.clone(),
                ));
                self.run.push(' ');
                self.run.push_str(name);
                self.run.push_str("=\"");
                self.run.push_str(&replacement);
                self.run.push('"');
            } else {
                self.accumulator.push(' ');
                self.accumulator.push_str(name);
                self.accumulator.push_str("=\"");
                let literal = std::mem::take(&mut self.accumulator);
                self.segments.push(Segment::literal(literal));
                self.segments.push(Segment::attribute_value(value.to_string()));
                self.accumulator.push('"');
            }
        } else {
            // valueless attributes get explicit empty quotes
            let escaped = escape_quotes(value);
            let buffer = self.active_buffer();
            buffer.push_str(lead);
            buffer.push_str(name);
            buffer.push_str("=\"");
            buffer.push_str(&escaped);
            buffer.push('"');
        }
        self.after_tag_name = false;
        self.attr_no_space = false;
    }

    fn text(&mut self, value: &str) {
        if self.opaque_depth > 0 {
            self.accumulator.push_str(value);
        } else if text::is_all_white(value) {
            self.active_buffer().push_str(value);
        } else {
            if self.run.is_empty() {
                self.run_line = self.line;
                if !self.accumulator.is_empty() {
                    let literal = std::mem::take(&mut self.accumulator);
                    self.segments.push(Segment::literal(literal));
                }
            }
            self.run.push_str(value);
        }
        self.line += text::count_newlines(value);
    }

    fn comment(&mut self, value: &str) {
        self.line += text::count_newlines(value);
        if self.opaque_depth > 0 {
            self.accumulator.push_str("<!--");
            self.accumulator.push_str(value);
            self.accumulator.push_str("-->");
            return;
        }
        // comments are dropped from the output; i18n: comments annotate
        // the next extracted string
        if let Some(note) = value.trim().strip_prefix("i18n:") {
            self.pending_comment = Some(note.trim().to_string());
        }
    }

    fn template_echo(&mut self, raw: &str) {
        self.line += text::count_newlines(raw);
        if self.opaque_depth > 0 {
            self.accumulator.push_str(raw);
            return;
        }
        // an echo extends an open run but never opens one
        let after_tag_name = self.after_tag_name;
        let buffer = self.active_buffer();
        if after_tag_name {
            buffer.push(' ');
        }
        buffer.push_str(raw);
        if self.current_tag.is_some() {
            self.attr_no_space = true;
        }
        self.after_tag_name = false;
    }

    fn template_tag(&mut self, raw: &str) {
        self.line += text::count_newlines(raw);
        if self.opaque_depth > 0 {
            self.accumulator.push_str(raw);
            return;
        }
        // a statement is a hard boundary
        self.flush_run();
        if self.after_tag_name {
            self.accumulator.push(' ');
        }
        self.accumulator.push_str(raw);
        if self.current_tag.is_some() {
            self.attr_no_space = true;
        }
        self.after_tag_name = false;
    }

    /// Closes the current run: leading and trailing whitespace stay
    /// literal, the trimmed middle becomes a localizable segment and an
    /// extracted string. A run of pure whitespace folds back into the
    /// accumulator without producing anything.
    fn flush_run(&mut self) {
        if self.run.is_empty() {
            return;
        }
        let run = std::mem::take(&mut self.run);
        self.tag_stack.clear();

        let Some(start) = run.find(|c| !text::is_white(c)) else {
            self.accumulator.push_str(&run);
            return;
        };
        let last = run.rfind(|c| !text::is_white(c)).unwrap_or(start);
        let end = last + run[last..].chars().next().map_or(0, char::len_utf8);

        self.accumulator.push_str(&run[..start]);
        if !self.accumulator.is_empty() {
            let literal = std::mem::take(&mut self.accumulator);
            self.segments.push(Segment::literal(literal));
        }

        let value = escape_invalid_chars(&run[start..end]);
        self.extracted.push(Extracted {
            text: value.clone(),
            comment: self.pending_comment.take(),
            line: self.run_line + text::count_newlines(&run[..start]),
        });
        self.segments.push(Segment::localizable(value));

        self.accumulator.push_str(&run[end..]);
    }

    fn finish(mut self) -> (Vec<Segment>, Vec<Extracted>) {
        self.flush_run();
        if !self.accumulator.is_empty() {
            let literal = std::mem::take(&mut self.accumulator);
            self.segments.push(Segment::literal(literal));
        }
        (self.segments, self.extracted)
    }
}
