//! Word-processing (`.docx`) encoding backed by `docx-rs`.

use std::io::Cursor;

use anyhow::{Result, anyhow};
use docx_rs::{BreakType, Docx, Paragraph, Run, RunFonts, Shading, Style, StyleType};

use crate::app::format::layout_lines;
use crate::domain::model::{Block, CodeStyle, HeadingLevel, Manuscript};

const HEADING_COLOR: &str = "2F5496";

/// Encode the manuscript as a `.docx` package.
pub fn render(manuscript: &Manuscript) -> Result<Vec<u8>> {
    let style = manuscript.code_style();
    let mut docx = Docx::new()
        .add_style(heading_style(HeadingLevel::Title))
        .add_style(heading_style(HeadingLevel::Section))
        .add_style(code_style(style));

    for block in manuscript.blocks() {
        let paragraph = match block {
            Block::Heading { text, level } => Paragraph::new()
                .style(level.style_id())
                .add_run(Run::new().add_text(text.as_str())),
            Block::PageBreak => Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
            Block::Code { text } => code_paragraph(text, style),
        };
        docx = docx.add_paragraph(paragraph);
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|err| anyhow!("failed to encode docx package: {err}"))?;
    Ok(buffer.into_inner())
}

fn heading_style(level: HeadingLevel) -> Style {
    let (name, size) = match level {
        HeadingLevel::Title => ("Title", 52),
        HeadingLevel::Section => ("Heading 1", 32),
    };
    Style::new(level.style_id(), StyleType::Paragraph)
        .name(name)
        .size(size)
        .color(HEADING_COLOR)
        .bold()
}

fn code_style(style: &CodeStyle) -> Style {
    let font = style.font.as_str();
    let mut code = Style::new(style.id.as_str(), StyleType::Paragraph)
        .name(style.name.as_str())
        .fonts(
            RunFonts::new()
                .ascii(font)
                .hi_ansi(font)
                .east_asia(font)
                .cs(font),
        )
        .size(style.half_points())
        .color(style.color.as_str());
    // Paragraph-level shading, so empty code blocks are shaded too.
    code.paragraph_property = code
        .paragraph_property
        .shading(Shading::new().fill(style.shading.as_str()));
    code
}

fn code_paragraph(text: &str, style: &CodeStyle) -> Paragraph {
    let mut run = Run::new();
    for (index, segments) in layout_lines(text).into_iter().enumerate() {
        if index > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        for (column, segment) in segments.into_iter().enumerate() {
            if column > 0 {
                run = run.add_tab();
            }
            if !segment.is_empty() {
                run = run.add_text(segment);
            }
        }
    }
    Paragraph::new().style(style.id.as_str()).add_run(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::format::add_code_block;

    #[test]
    fn renders_a_zip_package() -> Result<()> {
        let mut manuscript = Manuscript::new("Docs", CodeStyle::default())?;
        manuscript.add_heading("a.go", HeadingLevel::Section);
        add_code_block(&mut manuscript, "package a\n\nfunc A() {\n\treturn\n}\n");

        let bytes = render(&manuscript)?;
        assert!(bytes.starts_with(b"PK"));
        Ok(())
    }

    #[test]
    fn renders_title_only_document() -> Result<()> {
        let manuscript = Manuscript::new("Docs", CodeStyle::default())?;
        let bytes = render(&manuscript)?;
        assert!(!bytes.is_empty());
        Ok(())
    }
}
