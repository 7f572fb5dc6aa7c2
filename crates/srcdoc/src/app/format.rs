//! Code block formatting.

use crate::domain::model::{Block, Manuscript};

/// Append `text` verbatim as one paragraph in the manuscript's code style.
///
/// The style itself is registered when the [`Manuscript`] is created; this only references it.
/// Empty text yields an empty styled paragraph.
pub fn add_code_block(manuscript: &mut Manuscript, text: impl Into<String>) {
    manuscript.push(Block::Code { text: text.into() });
}

/// Split code into lines of tab-separated segments, the shape word processors lay text out in.
///
/// Every `\n` starts a new line, so trailing newlines survive as empty lines. The `\r` of a
/// `\r\n` pair is dropped.
pub fn layout_lines(text: &str) -> Vec<Vec<&str>> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(|line| line.split('\t').collect())
        .collect()
}
