//! Block Scanner
//!
//! Turns document lines into a tree of [`Block`]s by following brace nesting
//! line by line. A line opens a block when its trimmed text ends with `{` and
//! closes one when it ends with `}`; the text before the first `{` is the
//! block header, whose first token is the block kind and whose last token (if
//! there are two or more) is the block name.
//!
//! A header of kind `void` is the body of its enclosing block and gets the
//! kind `<EnclosingKind>_Main`, so `void main(){` inside `Vs_Shader` becomes a
//! `Vs_Shader_Main` block.
//!
//! A line that starts with `}` and ends with `{` (`} else {`) continues the
//! current block: nesting depth is unchanged and no sibling is opened.
//!
//! Classification looks only at how a trimmed line starts and ends, so a
//! single-line block such as `if (a) { b = 1.0; }` counts as a closing line
//! and ends the enclosing block early. Stage bodies must open and close
//! nested blocks on lines of their own.

use std::fmt;

use crate::errors::{MatDefError, Result};
use crate::resources::StageKind;
use crate::settings::CompilerSettings;

// ============================================================================
// BlockKind
// ============================================================================

/// Declared type of a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Def,
    Params,
    SubTechnology,
    Vars,
    /// `Vs_Shader` / `Fs_Shader` container.
    Shader(StageKind),
    /// `Vs_Shader_Main` / `Fs_Shader_Main` stage body.
    ShaderMain(StageKind),
    /// Anything else; ignored by the interpreter.
    Other(String),
}

impl BlockKind {
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token {
            "Def" => Self::Def,
            "Params" => Self::Params,
            "SubTechnology" => Self::SubTechnology,
            "Vars" => Self::Vars,
            "Vs_Shader" => Self::Shader(StageKind::Vertex),
            "Fs_Shader" => Self::Shader(StageKind::Fragment),
            "Vs_Shader_Main" => Self::ShaderMain(StageKind::Vertex),
            "Fs_Shader_Main" => Self::ShaderMain(StageKind::Fragment),
            other => Self::Other(other.to_string()),
        }
    }

    /// Kind given to a `void` block nested directly inside a block of this kind.
    #[must_use]
    pub fn main_of(&self) -> Self {
        Self::parse(&format!("{self}_Main"))
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Def => f.write_str("Def"),
            Self::Params => f.write_str("Params"),
            Self::SubTechnology => f.write_str("SubTechnology"),
            Self::Vars => f.write_str("Vars"),
            Self::Shader(stage) => f.write_str(stage.shader_block()),
            Self::ShaderMain(stage) => f.write_str(stage.main_block()),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

// ============================================================================
// Block
// ============================================================================

/// A brace-delimited unit of the document.
///
/// Line indices are 0-based positions in the shared line slice; `start_line`
/// is the header line and `end_line` the line that closes the block.
#[derive(Debug, Clone)]
pub struct Block<'a> {
    kind: BlockKind,
    name: Option<&'a str>,
    lines: &'a [&'a str],
    start_line: usize,
    end_line: usize,
    children: Vec<Block<'a>>,
}

impl<'a> Block<'a> {
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&'a str> {
        self.name
    }

    #[inline]
    #[must_use]
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    #[inline]
    #[must_use]
    pub fn end_line(&self) -> usize {
        self.end_line
    }

    /// Immediate child blocks, in document order.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Block<'a>] {
        &self.children
    }

    /// Lines strictly between the header and the closing line, with their
    /// 0-based indices. Lines of nested blocks are included.
    pub fn interior(&self) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        let lines: &'a [&'a str] = self.lines;
        (self.start_line + 1..self.end_line).map(move |i| (i, lines[i]))
    }
}

// ============================================================================
// Scanning
// ============================================================================

/// Result of scanning a whole document.
#[derive(Debug)]
pub struct ScannedDocument<'a> {
    /// The first top-level block.
    pub root: Block<'a>,
    /// Non-blank, non-comment lines after the root block.
    pub trailing_lines: usize,
}

/// Splits a trimmed opener line into `(kind token, name)`.
fn parse_header(trimmed: &str) -> (&str, Option<&str>) {
    let header = trimmed.find('{').map_or(trimmed, |i| &trimmed[..i]);
    let tokens: Vec<&str> = header.split_whitespace().collect();
    let kind = tokens.first().copied().unwrap_or("");
    let name = if tokens.len() > 1 { tokens.last().copied() } else { None };
    (kind, name)
}

#[derive(Clone, Copy)]
enum LineClass {
    Skip,
    Open,
    Close,
    Plain,
}

fn classify(trimmed: &str, settings: &CompilerSettings) -> LineClass {
    if trimmed.is_empty() || settings.is_comment(trimmed) {
        LineClass::Skip
    } else if trimmed.ends_with('{') {
        if trimmed.starts_with('}') {
            LineClass::Plain
        } else {
            LineClass::Open
        }
    } else if trimmed.ends_with('}') {
        LineClass::Close
    } else {
        LineClass::Plain
    }
}

/// Scans the block whose header is at `start`, returning it with its
/// `end_line` set to the line where nesting returns to the starting depth.
pub fn scan_block<'a>(
    lines: &'a [&'a str],
    start: usize,
    kind: BlockKind,
    name: Option<&'a str>,
    settings: &CompilerSettings,
) -> Result<Block<'a>> {
    let mut children = Vec::new();
    let mut i = start + 1;

    while i < lines.len() {
        let trimmed = lines[i].trim();
        match classify(trimmed, settings) {
            LineClass::Open => {
                let (kind_token, child_name) = parse_header(trimmed);
                let child_kind = if kind_token == "void" {
                    kind.main_of()
                } else {
                    BlockKind::parse(kind_token)
                };
                let child = scan_block(lines, i, child_kind, child_name, settings)?;
                i = child.end_line + 1;
                children.push(child);
                continue;
            }
            LineClass::Close => {
                return Ok(Block {
                    kind,
                    name,
                    lines,
                    start_line: start,
                    end_line: i,
                    children,
                });
            }
            LineClass::Skip | LineClass::Plain => {}
        }
        i += 1;
    }

    Err(MatDefError::structural(
        Some(start + 1),
        format!("'{kind}' block is never closed"),
    ))
}

/// Finds the first top-level block whose kind is not `void` and scans it.
///
/// Top-level `void` blocks are skipped whole. Returns `Ok(None)` when the
/// document has no top-level block at all.
pub fn scan_document<'a>(
    lines: &'a [&'a str],
    settings: &CompilerSettings,
) -> Result<Option<ScannedDocument<'a>>> {
    let mut i = 0;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        if let LineClass::Open = classify(trimmed, settings) {
            let (kind_token, name) = parse_header(trimmed);
            if kind_token.is_empty() || kind_token == "void" {
                let skipped = scan_block(lines, i, BlockKind::parse(kind_token), name, settings)?;
                log::debug!(
                    "Skipping top-level '{}' block at line {}",
                    kind_token,
                    i + 1
                );
                i = skipped.end_line + 1;
                continue;
            }

            let root = scan_block(lines, i, BlockKind::parse(kind_token), name, settings)?;
            let trailing_lines = lines[root.end_line + 1..]
                .iter()
                .filter(|l| !matches!(classify(l.trim(), settings), LineClass::Skip))
                .count();
            return Ok(Some(ScannedDocument {
                root,
                trailing_lines,
            }));
        }
        i += 1;
    }
    Ok(None)
}
