//! Assembling source files into a manuscript.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::app::format;
use crate::domain::errors::SourceError;
use crate::domain::model::{CodeStyle, HeadingLevel, Manuscript, SourceList};

/// Title used when nothing else is configured.
pub const DEFAULT_TITLE: &str = "Go Code Documentation";

/// Entry from the source list that was not an existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSource {
    pub path: PathBuf,
}

impl SkippedSource {
    /// Console line announcing the skip.
    pub fn warning(&self) -> String {
        format!(
            "Warning: {} does not exist and will be skipped.",
            self.path.display()
        )
    }
}

/// Outcome of a successful assembly.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub manuscript: Manuscript,
    pub included: Vec<PathBuf>,
    pub skipped: Vec<SkippedSource>,
}

/// Builds a manuscript from an ordered list of source files.
#[derive(Debug, Clone)]
pub struct Assembler {
    title: String,
    code_style: CodeStyle,
}

impl Default for Assembler {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            code_style: CodeStyle::default(),
        }
    }
}

impl Assembler {
    pub fn new(title: impl Into<String>, code_style: CodeStyle) -> Self {
        Self {
            title: title.into(),
            code_style,
        }
    }

    /// Walk `sources` in order, adding a heading and a code block for every existing file.
    ///
    /// Missing entries are skipped and reported in [`Assembly::skipped`]. Any read or decode
    /// failure aborts the whole assembly.
    pub fn assemble(&self, sources: &SourceList) -> Result<Assembly> {
        self.assemble_with(sources, |_| {})
    }

    /// Like [`Assembler::assemble`], calling `on_skip` as soon as an entry is skipped, so the
    /// caller hears about it even when a later entry aborts the run.
    pub fn assemble_with<F>(&self, sources: &SourceList, mut on_skip: F) -> Result<Assembly>
    where
        F: FnMut(&SkippedSource),
    {
        let mut manuscript = Manuscript::new(self.title.clone(), self.code_style.clone())
            .context("invalid code style")?;
        let mut included = Vec::new();
        let mut skipped = Vec::new();

        for path in sources.entries() {
            if !path.is_file() {
                warn!(path = %path.display(), "source file missing; skipping");
                let entry = SkippedSource { path: path.clone() };
                on_skip(&entry);
                skipped.push(entry);
                continue;
            }

            let code = read_source(path)?;

            if !included.is_empty() {
                manuscript.add_page_break();
            }
            manuscript.add_heading(path.display().to_string(), HeadingLevel::Section);
            debug!(path = %path.display(), bytes = code.len(), "adding source file");
            format::add_code_block(&mut manuscript, code);
            included.push(path.clone());
        }

        Ok(Assembly {
            manuscript,
            included,
            skipped,
        })
    }
}

/// Read a whole file as UTF-8 text that XML 1.0 documents can carry.
pub fn read_source(path: &Path) -> Result<String, SourceError> {
    let bytes = fs::read(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|source| SourceError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some((line, character)) = first_unsupported_char(&text) {
        return Err(SourceError::UnsupportedCharacter {
            path: path.to_path_buf(),
            character,
            line,
        });
    }
    Ok(text)
}

/// First character outside the XML 1.0 `Char` production, with its 1-based line.
fn first_unsupported_char(text: &str) -> Option<(usize, char)> {
    text.split('\n').enumerate().find_map(|(index, line)| {
        line.chars()
            .find(|ch| !is_xml_char(*ch))
            .map(|ch| (index + 1, ch))
    })
}

fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}')
        || ch >= '\u{10000}'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn skips_missing_files_without_blocks() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let a = write(temp.path(), "a.go", b"package a");
        let b = temp.path().join("b.go");

        let assembly = Assembler::default().assemble(&SourceList::new([a.clone(), b.clone()]))?;

        let doc = &assembly.manuscript;
        assert_eq!(doc.headings(HeadingLevel::Section), vec![a.display().to_string()]);
        assert_eq!(doc.code_blocks(), vec!["package a"]);
        assert_eq!(doc.page_breaks(), 0);
        assert_eq!(assembly.included, vec![a]);
        assert_eq!(assembly.skipped, vec![SkippedSource { path: b }]);
        Ok(())
    }

    #[test]
    fn page_breaks_separate_included_files() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let a = write(temp.path(), "a.go", b"package a");
        let missing = temp.path().join("gone.go");
        let b = write(temp.path(), "b.go", b"package b");
        let c = write(temp.path(), "c.go", b"package c");

        let assembly = Assembler::default().assemble(&SourceList::new([a, missing, b, c]))?;

        assert_eq!(assembly.included.len(), 3);
        assert_eq!(assembly.manuscript.page_breaks(), 2);
        Ok(())
    }

    #[test]
    fn duplicates_are_documented_each_time() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let a = write(temp.path(), "a.go", b"package a");

        let assembly = Assembler::default().assemble(&SourceList::new([a.clone(), a]))?;

        assert_eq!(assembly.manuscript.headings(HeadingLevel::Section).len(), 2);
        assert_eq!(assembly.manuscript.page_breaks(), 1);
        Ok(())
    }

    #[test]
    fn directories_count_as_missing() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let assembly = Assembler::default().assemble(&SourceList::new([temp.path()]))?;
        assert_eq!(assembly.skipped.len(), 1);
        assert!(assembly.included.is_empty());
        Ok(())
    }

    #[test]
    fn invalid_utf8_is_fatal() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let bad = write(temp.path(), "latin1.go", &[0x70, 0xe9, 0xff]);

        let err = Assembler::default()
            .assemble(&SourceList::new([bad]))
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::Decode { .. })
        ));
        Ok(())
    }

    #[test]
    fn control_characters_are_fatal() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let feed = write(temp.path(), "feed.c", b"int a;\x0c\nint b;\x00\n");

        let err = Assembler::default()
            .assemble(&SourceList::new([feed]))
            .unwrap_err();

        match err.downcast_ref::<SourceError>() {
            Some(SourceError::UnsupportedCharacter {
                character, line, ..
            }) => {
                assert_eq!(*character, '\x0c');
                assert_eq!(*line, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn tabs_and_crlf_are_accepted() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = write(temp.path(), "crlf.go", b"func a() {\r\n\treturn \xc3\xa9\r\n}\r\n");
        assert_eq!(read_source(&path)?, "func a() {\r\n\treturn \u{e9}\r\n}\r\n");
        Ok(())
    }

    #[test]
    fn skips_are_reported_before_a_fatal_entry() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let missing = temp.path().join("missing.go");
        let bad = write(temp.path(), "bad.go", &[0xff, 0xfe]);

        let mut reported = Vec::new();
        let sources = SourceList::new([missing.clone(), bad]);
        let result =
            Assembler::default().assemble_with(&sources, |entry| reported.push(entry.path.clone()));

        assert!(result.is_err());
        assert_eq!(reported, vec![missing]);
        Ok(())
    }

    #[test]
    fn warning_names_the_file() {
        let skipped = SkippedSource {
            path: PathBuf::from("b.go"),
        };
        assert_eq!(
            skipped.warning(),
            "Warning: b.go does not exist and will be skipped."
        );
    }
}
