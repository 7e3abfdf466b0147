//! Localized re-assembly of parsed template files.
//!
//! Walks the segment list produced by extraction, replaces each
//! localizable segment with its translation, and writes the result to a
//! locale-tagged sibling path. Strings without a translation fall back to
//! the source text, so a partially translated file still re-assembles
//! completely.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::segmenter::TemplateFile;
use crate::text::escape_quotes;

/// One translated string, keyed by project, locale, and resource key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationEntry {
    pub project: String,
    pub locale: String,
    pub key: String,
    pub target: String,
}

impl TranslationEntry {
    pub fn new(
        project: impl Into<String>,
        locale: impl Into<String>,
        key: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        TranslationEntry {
            project: project.into(),
            locale: locale.into(),
            key: key.into(),
            target: target.into(),
        }
    }
}

/// A source of translations. Extraction keys HTML strings by their own
/// source text, so lookups pass the extracted string as the key.
pub trait TranslationLookup {
    fn lookup(&self, project: &str, locale: &str, key: &str) -> Option<&TranslationEntry>;
}

/// An in-memory translation store.
#[derive(Debug, Clone, Default)]
pub struct Translations {
    entries: HashMap<(String, String, String), TranslationEntry>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: TranslationEntry) {
        let key = (
            entry.project.clone(),
            entry.locale.clone(),
            entry.key.clone(),
        );
        self.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TranslationLookup for Translations {
    fn lookup(&self, project: &str, locale: &str, key: &str) -> Option<&TranslationEntry> {
        self.entries
            .get(&(project.to_string(), locale.to_string(), key.to_string()))
    }
}

/// Options for [`TemplateFile::localize_text_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalizeOptions {
    /// Wrap each translated string in a `<span loclang="html" x-locid="…">`
    /// marker so translated text can be traced back to its source string.
    pub identify: bool,
}

/// Produces the localized counterpart of a source path by inserting (or
/// substituting) the locale in the dotted basename.
///
/// `simple.tmpl.html` becomes `simple.fr-FR.tmpl.html`, and an existing
/// source-locale token such as in `simple.en-US.tmpl.html` is replaced
/// rather than doubled up.
pub fn localized_path(path: &str, source_locale: &str, locale: &str) -> String {
    let (dir, file) = match path.rfind('/') {
        Some(pos) => (&path[..pos + 1], &path[pos + 1..]),
        None => ("", path),
    };
    let mut parts: Vec<&str> = file.split('.').collect();
    let n = parts.len();
    if n >= 2 {
        if n > 2 && parts[n - 3] == source_locale {
            parts[n - 3] = locale;
        } else if parts[n - 2] == source_locale {
            parts[n - 2] = locale;
        } else if n > 2 {
            parts.insert(n - 2, locale);
        } else {
            parts.insert(n - 1, locale);
        }
    } else {
        parts.push(locale);
    }
    format!("{}{}", dir, parts.join("."))
}

impl TemplateFile {
    /// Re-assembles the document with every localizable segment replaced
    /// by its translation for `locale`.
    pub fn localize_text<L: TranslationLookup>(&self, translations: &L, locale: &str) -> String {
        self.localize_text_with(translations, locale, LocalizeOptions::default())
    }

    pub fn localize_text_with<L: TranslationLookup>(
        &self,
        translations: &L,
        locale: &str,
        options: LocalizeOptions,
    ) -> String {
        debug!(path = %self.path(), locale, "localizing template");
        let mut out = String::new();
        // a translated attribute value waiting to be substituted into the
        // run segment that carries its placeholder
        let mut pending: Option<(String, String)> = None;

        for segment in self.segments() {
            if !segment.localizable {
                out.push_str(&segment.text);
                continue;
            }

            let translated = translations
                .lookup(self.project(), locale, &segment.text)
                .map(|entry| entry.target.clone())
                .unwrap_or_else(|| segment.text.clone());

            if segment.attribute_substitution {
                let token = segment.replacement.clone().unwrap_or_default();
                pending = Some((token, escape_quotes(&translated)));
                continue;
            }

            let mut piece = translated;
            if let Some((token, substitution)) = pending.take() {
                piece = piece.replace(&token, &substitution);
            }
            if options.identify {
                piece = format!(
                    "<span loclang=\"html\" x-locid=\"{}\">{}</span>",
                    escape_quotes(&segment.text),
                    piece
                );
            }
            if segment.escape {
                piece = escape_quotes(&piece);
            }
            out.push_str(&piece);
        }

        out
    }

    /// The locale-tagged output path for this file.
    pub fn localized_path(&self, locale: &str) -> String {
        localized_path(self.path(), self.source_locale(), locale)
    }

    /// Writes one localized copy of the file under `root` for each locale.
    /// A file with no extracted strings is skipped.
    pub fn localize<L: TranslationLookup>(
        &self,
        root: &Path,
        translations: &L,
        locales: &[&str],
    ) -> Result<()> {
        if self.translation_set().is_empty() {
            debug!(path = %self.path(), "no localizable strings; skipping");
            return Ok(());
        }
        for locale in locales {
            let path = root.join(self.localized_path(locale));
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("could not create {}", parent.display()))?;
            }
            fs::write(&path, self.localize_text(translations, locale))
                .with_context(|| format!("could not write {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> TemplateFile {
        let mut file = TemplateFile::new("webapp", "tmpl/test.tmpl.html", "en-US");
        file.parse(data);
        file
    }

    fn french() -> Translations {
        let mut t = Translations::new();
        t.add(TranslationEntry::new(
            "webapp",
            "fr-FR",
            "This is a test",
            "Ceci est un essai",
        ));
        t
    }

    #[test]
    fn test_localize_simple_text() {
        let file = parse("<html><body>This is a test</body></html>");
        assert_eq!(
            file.localize_text(&french(), "fr-FR"),
            "<html><body>Ceci est un essai</body></html>"
        );
    }

    #[test]
    fn test_untranslated_falls_back_to_source() {
        let file = parse("<html><body>This is a test</body></html>");
        let empty = Translations::new();
        assert_eq!(
            file.localize_text(&empty, "de-DE"),
            "<html><body>This is a test</body></html>"
        );
    }

    #[test]
    fn test_localize_preserves_whitespace() {
        let file = parse("<html><body>   This is a test   </body></html>");
        assert_eq!(
            file.localize_text(&french(), "fr-FR"),
            "<html><body>   Ceci est un essai   </body></html>"
        );
    }

    #[test]
    fn test_localize_standalone_attribute() {
        let file = parse(concat!(
            "<html><body>",
            "<img src=\"foo.png\" alt=\"Alternate text\">",
            "</body></html>"
        ));
        let mut t = Translations::new();
        t.add(TranslationEntry::new(
            "webapp",
            "fr-FR",
            "Alternate text",
            "Texte alternative",
        ));
        assert_eq!(
            file.localize_text(&t, "fr-FR"),
            "<html><body><img src=\"foo.png\" alt=\"Texte alternative\"></body></html>"
        );
    }

    #[test]
    fn test_localize_attribute_substitution_in_run() {
        let file = parse(concat!(
            "<html><body>",
            "This is <a href=\"foo.html\" title=\"localizable title\">a test</a> of non-breaking tags.",
            "</body></html>"
        ));
        let mut t = Translations::new();
        t.add(TranslationEntry::new(
            "webapp",
            "fr-FR",
            "localizable title",
            "titre localisable",
        ));
        t.add(TranslationEntry::new(
            "webapp",
            "fr-FR",
            "This is <a href=\"foo.html\" title=\"{title}\">a test</a> of non-breaking tags.",
            "Ceci est <a href=\"foo.html\" title=\"{title}\">un essai</a> des balises non-ruptures.",
        ));
        assert_eq!(
            file.localize_text(&t, "fr-FR"),
            concat!(
                "<html><body>",
                "Ceci est <a href=\"foo.html\" title=\"titre localisable\">un essai</a> des balises non-ruptures.",
                "</body></html>"
            )
        );
    }

    #[test]
    fn test_localize_keeps_template_tags() {
        let file = parse(concat!(
            "<html><body>",
            "<% if(doctor){ %>Consult<% } else { %>Get doctor<% } %>",
            "</body></html>"
        ));
        let mut t = Translations::new();
        t.add(TranslationEntry::new(
            "webapp", "fr-FR", "Consult", "Consulter",
        ));
        t.add(TranslationEntry::new(
            "webapp",
            "fr-FR",
            "Get doctor",
            "Obtenir un médecin",
        ));
        assert_eq!(
            file.localize_text(&t, "fr-FR"),
            concat!(
                "<html><body>",
                "<% if(doctor){ %>Consulter<% } else { %>Obtenir un médecin<% } %>",
                "</body></html>"
            )
        );
    }

    #[test]
    fn test_localize_drops_i18n_comment() {
        let file = parse(concat!(
            "<html><body>\n",
            "<!-- i18n: context note -->\n",
            "This is a test\n",
            "</body></html>"
        ));
        assert_eq!(
            file.localize_text(&french(), "fr-FR"),
            "<html><body>\n\nCeci est un essai\n</body></html>"
        );
    }

    #[test]
    fn test_identify_mode_wraps_strings() {
        let file = parse("<html><body>This is a test</body></html>");
        let out = file.localize_text_with(
            &french(),
            "fr-FR",
            LocalizeOptions { identify: true },
        );
        assert_eq!(
            out,
            concat!(
                "<html><body>",
                "<span loclang=\"html\" x-locid=\"This is a test\">Ceci est un essai</span>",
                "</body></html>"
            )
        );
    }

    #[test]
    fn test_identify_mode_wraps_before_attribute_escaping() {
        let file = parse(concat!(
            "<html><body>",
            "<img src=\"foo.png\" alt=\"Alternate text\">",
            "</body></html>"
        ));
        let mut t = Translations::new();
        t.add(TranslationEntry::new(
            "webapp",
            "fr-FR",
            "Alternate text",
            "Texte alternative",
        ));
        let out = file.localize_text_with(&t, "fr-FR", LocalizeOptions { identify: true });
        assert_eq!(
            out,
            concat!(
                "<html><body><img src=\"foo.png\" alt=\"",
                "&lt;span loclang=&quot;html&quot; x-locid=&quot;Alternate text&quot;&gt;",
                "Texte alternative&lt;/span&gt;",
                "\"></body></html>"
            )
        );
    }

    #[test]
    fn test_localize_document_snapshot() {
        let file = parse(concat!(
            "<html>\n",
            "   <body>\n",
            "       This is a test\n",
            "       <img src=\"pic.png\" alt=\"Alternate text\">\n",
            "   </body>\n",
            "</html>\n"
        ));
        let mut t = french();
        t.add(TranslationEntry::new(
            "webapp",
            "fr-FR",
            "Alternate text",
            "Texte alternative",
        ));
        insta::assert_snapshot!(file.localize_text(&t, "fr-FR"), @r#"
        <html>
           <body>
               Ceci est un essai
               <img src="pic.png" alt="Texte alternative">
           </body>
        </html>
        "#);
    }

    #[test]
    fn test_localized_path_insertion() {
        assert_eq!(
            localized_path("simple.tmpl.html", "en-US", "fr-FR"),
            "simple.fr-FR.tmpl.html"
        );
        assert_eq!(
            localized_path("simple.html", "en-US", "fr-FR"),
            "simple.fr-FR.html"
        );
        assert_eq!(localized_path("simple", "en-US", "fr-FR"), "simple.fr-FR");
    }

    #[test]
    fn test_localized_path_replaces_source_locale() {
        assert_eq!(
            localized_path("simple.en-US.tmpl.html", "en-US", "fr-FR"),
            "simple.fr-FR.tmpl.html"
        );
        assert_eq!(
            localized_path("simple.en-US.html", "en-US", "fr-FR"),
            "simple.fr-FR.html"
        );
    }

    #[test]
    fn test_localized_path_keeps_directory() {
        assert_eq!(
            localized_path("tmpl/nested/simple.tmpl.html", "en-US", "fr-FR"),
            "tmpl/nested/simple.fr-FR.tmpl.html"
        );
    }

    #[test]
    fn test_localize_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("page.tmpl.html"),
            "<html><body>This is a test</body></html>",
        )
        .unwrap();
        let mut file = TemplateFile::new("webapp", "page.tmpl.html", "en-US");
        file.extract_from(dir.path());
        file.localize(dir.path(), &french(), &["fr-FR"]).unwrap();
        let out = std::fs::read_to_string(dir.path().join("page.fr-FR.tmpl.html")).unwrap();
        assert_eq!(out, "<html><body>Ceci est un essai</body></html>");
    }

    #[test]
    fn test_localize_skips_file_without_strings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.tmpl.html"), "<html><body></body></html>").unwrap();
        let mut file = TemplateFile::new("webapp", "page.tmpl.html", "en-US");
        file.extract_from(dir.path());
        file.localize(dir.path(), &french(), &["fr-FR"]).unwrap();
        assert!(!dir.path().join("page.fr-FR.tmpl.html").exists());
    }
}
