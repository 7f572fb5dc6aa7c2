//! Domain models for source lists and the document being assembled.

use std::path::{Path, PathBuf};

use crate::domain::errors::StyleError;

/// Ordered list of files to document. Order is document order; duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    entries: Vec<PathBuf>,
}

impl SourceList {
    pub fn new<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Heading depth inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    /// Document title, level 0.
    Title,
    /// One per documented file, level 1.
    Section,
}

impl HeadingLevel {
    pub fn depth(&self) -> u8 {
        match self {
            HeadingLevel::Title => 0,
            HeadingLevel::Section => 1,
        }
    }

    /// Paragraph style id used when rendering to a word-processing document.
    pub fn style_id(&self) -> &'static str {
        match self {
            HeadingLevel::Title => "Title",
            HeadingLevel::Section => "Heading1",
        }
    }
}

/// A single element of the document, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { text: String, level: HeadingLevel },
    PageBreak,
    /// Verbatim file contents rendered with the code style.
    Code { text: String },
}

/// Paragraph style applied to every code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeStyle {
    pub id: String,
    pub name: String,
    pub font: String,
    /// Font size in points.
    pub size: u32,
    /// Glyph color as `RRGGBB`.
    pub color: String,
    /// Background shading fill as `RRGGBB`.
    pub shading: String,
}

impl CodeStyle {
    pub const ID: &'static str = "Code";

    pub fn validate(&self) -> Result<(), StyleError> {
        if self.font.trim().is_empty() {
            return Err(StyleError::EmptyFont);
        }
        if self.size == 0 {
            return Err(StyleError::InvalidSize);
        }
        check_hex_color("glyph", &self.color)?;
        check_hex_color("shading", &self.shading)?;
        Ok(())
    }

    /// Size in half-points, the unit word-processing formats store.
    pub fn half_points(&self) -> usize {
        self.size as usize * 2
    }
}

impl Default for CodeStyle {
    fn default() -> Self {
        Self {
            id: Self::ID.into(),
            name: Self::ID.into(),
            font: "Courier New".into(),
            size: 10,
            color: "000000".into(),
            shading: "D3D3D3".into(),
        }
    }
}

fn check_hex_color(attribute: &'static str, value: &str) -> Result<(), StyleError> {
    if value.len() == 6 && value.chars().all(|ch| ch.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(StyleError::InvalidColor {
            attribute,
            value: value.to_string(),
        })
    }
}

/// In-memory document built up block by block before it is rendered.
///
/// Styles are registered when the manuscript is created, so every code block refers to the
/// same single definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manuscript {
    title: String,
    code_style: CodeStyle,
    blocks: Vec<Block>,
}

impl Manuscript {
    /// Create a manuscript with a title heading and a validated code style.
    pub fn new(title: impl Into<String>, code_style: CodeStyle) -> Result<Self, StyleError> {
        code_style.validate()?;
        let title = title.into();
        Ok(Self {
            blocks: vec![Block::Heading {
                text: title.clone(),
                level: HeadingLevel::Title,
            }],
            title,
            code_style,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn code_style(&self) -> &CodeStyle {
        &self.code_style
    }

    /// Paragraph style ids registered for this document, each exactly once.
    pub fn styles(&self) -> Vec<&str> {
        vec![
            HeadingLevel::Title.style_id(),
            HeadingLevel::Section.style_id(),
            self.code_style.id.as_str(),
        ]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn add_heading(&mut self, text: impl Into<String>, level: HeadingLevel) {
        self.push(Block::Heading {
            text: text.into(),
            level,
        });
    }

    pub fn add_page_break(&mut self) {
        self.push(Block::PageBreak);
    }

    /// Headings at the given level, in document order.
    pub fn headings(&self, level: HeadingLevel) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading { text, level: found } if *found == level => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn page_breaks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, Block::PageBreak))
            .count()
    }

    pub fn code_blocks(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Code { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Group blocks into one section per level-1 heading.
    pub fn sections(&self) -> Vec<Section<'_>> {
        let mut sections: Vec<Section<'_>> = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Heading {
                    text,
                    level: HeadingLevel::Section,
                } => sections.push(Section {
                    heading: text,
                    code: Vec::new(),
                }),
                Block::Code { text } => {
                    if let Some(current) = sections.last_mut() {
                        current.code.push(text);
                    }
                }
                _ => {}
            }
        }
        sections
    }

    /// One line per block; handy for logs and snapshots.
    pub fn outline(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Heading { text, level } => format!("h{} {text}", level.depth()),
                Block::PageBreak => "page-break".to_string(),
                Block::Code { text } => format!(
                    "code [{}] {} lines",
                    self.code_style.id,
                    text.lines().count()
                ),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// View over a documented file: its heading and the code blocks that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub heading: &'a str,
    pub code: Vec<&'a str>,
}

impl Section<'_> {
    /// Fence language derived from the heading's file extension.
    pub fn language(&self) -> &'static str {
        language_for(Path::new(self.heading))
    }
}

fn language_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("go") => "go",
        Some("rs") => "rust",
        Some("py") => "python",
        Some("js") | Some("mjs") => "javascript",
        Some("ts") => "typescript",
        Some("c") | Some("h") => "c",
        Some("cc") | Some("cpp") | Some("hpp") => "cpp",
        Some("java") => "java",
        Some("toml") => "toml",
        Some("json") => "json",
        Some("sh") => "sh",
        _ => "text",
    }
}
