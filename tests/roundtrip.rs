//! End-to-end extraction and localization over real files on disk.

use anyhow::Result;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use tmploc::{TemplateFile, TranslationEntry, Translations};

/// A project directory on disk holding template files under test.
struct ProjectTest {
    root: TempDir,
}

impl ProjectTest {
    fn new() -> Result<Self> {
        Ok(ProjectTest {
            root: TempDir::new()?,
        })
    }

    fn write_file(&self, path: &str, contents: &str) -> Result<()> {
        let full = self.root.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full, contents)?;
        Ok(())
    }

    fn read_file(&self, path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.root.path().join(path))?)
    }

    fn extract(&self, path: &str) -> TemplateFile {
        let mut file = TemplateFile::new("webapp", path, "en-US");
        file.extract_from(self.root.path());
        file
    }
}

fn french() -> Translations {
    let mut t = Translations::new();
    for (key, target) in [
        ("This is a test", "Ceci est un essai"),
        ("Hello, world!", "Bonjour, le monde!"),
        ("Alternate text", "Texte alternative"),
    ] {
        t.add(TranslationEntry::new("webapp", "fr-FR", key, target));
    }
    t
}

#[test]
fn test_extract_and_localize_whole_file() -> Result<()> {
    let project = ProjectTest::new()?;
    project.write_file(
        "tmpl/greeting.tmpl.html",
        concat!(
            "<html>\n",
            "   <body>\n",
            "       Hello, world!\n",
            "       <img src=\"pic.png\" alt=\"Alternate text\">\n",
            "       <% if (extended) { %>\n",
            "       This is a test\n",
            "       <% } %>\n",
            "   </body>\n",
            "</html>\n"
        ),
    )?;

    let file = project.extract("tmpl/greeting.tmpl.html");
    assert_eq!(file.translation_set().size(), 3);

    file.localize(project.root.path(), &french(), &["fr-FR"])?;

    let localized = project.read_file("tmpl/greeting.fr-FR.tmpl.html")?;
    assert_eq!(
        localized,
        concat!(
            "<html>\n",
            "   <body>\n",
            "       Bonjour, le monde!\n",
            "       <img src=\"pic.png\" alt=\"Texte alternative\">\n",
            "       <% if (extended) { %>\n",
            "       Ceci est un essai\n",
            "       <% } %>\n",
            "   </body>\n",
            "</html>\n"
        )
    );
    Ok(())
}

#[test]
fn test_localize_to_multiple_locales() -> Result<()> {
    let project = ProjectTest::new()?;
    project.write_file(
        "page.tmpl.html",
        "<html><body>This is a test</body></html>",
    )?;

    let file = project.extract("page.tmpl.html");

    let mut translations = french();
    translations.add(TranslationEntry::new(
        "webapp",
        "de-DE",
        "This is a test",
        "Dies ist einen Test",
    ));

    file.localize(project.root.path(), &translations, &["fr-FR", "de-DE"])?;

    assert_eq!(
        project.read_file("page.fr-FR.tmpl.html")?,
        "<html><body>Ceci est un essai</body></html>"
    );
    assert_eq!(
        project.read_file("page.de-DE.tmpl.html")?,
        "<html><body>Dies ist einen Test</body></html>"
    );
    Ok(())
}

#[test]
fn test_source_locale_in_path_is_replaced() -> Result<()> {
    let project = ProjectTest::new()?;
    project.write_file(
        "page.en-US.tmpl.html",
        "<html><body>This is a test</body></html>",
    )?;

    let file = project.extract("page.en-US.tmpl.html");
    file.localize(project.root.path(), &french(), &["fr-FR"])?;

    assert_eq!(
        project.read_file("page.fr-FR.tmpl.html")?,
        "<html><body>Ceci est un essai</body></html>"
    );
    Ok(())
}

#[test]
fn test_untranslated_file_round_trips_byte_for_byte() -> Result<()> {
    let source = concat!(
        "<!DOCTYPE html>\n",
        "<html>\n",
        "   <head>\n",
        "       <script>\n",
        "           if (a < b) { document.write(\"<p>raw</p>\"); }\n",
        "       </script>\n",
        "   </head>\n",
        "   <body class=\"main\">\n",
        "       This is a test of <em>inline</em> markup.\n",
        "       <span <% if (c) { %>class=\"foo\"<% } %>>conditional</span>\n",
        "       <%= echoed %>\n",
        "   </body>\n",
        "</html>\n"
    );
    let project = ProjectTest::new()?;
    project.write_file("page.tmpl.html", source)?;

    let file = project.extract("page.tmpl.html");
    let empty = Translations::new();
    assert_eq!(file.localize_text(&empty, "fr-FR"), source);
    Ok(())
}

#[test]
fn test_file_without_strings_writes_nothing() -> Result<()> {
    let project = ProjectTest::new()?;
    project.write_file("empty.tmpl.html", "<html><body>\n   \n</body></html>")?;

    let file = project.extract("empty.tmpl.html");
    assert!(file.translation_set().is_empty());

    file.localize(project.root.path(), &french(), &["fr-FR"])?;
    assert!(!project.root.path().join("empty.fr-FR.tmpl.html").exists());
    Ok(())
}
