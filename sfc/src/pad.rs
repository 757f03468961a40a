use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::block::BlockKind;
use crate::position::LineIndex;

/// Languages whose `//` line comment makes a safe filler line.
const LINE_COMMENT_LANGS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "mjs", "cjs", "javascript", "typescript",
];

/// How block content is padded so that its own line numbers (and, in
/// [`PadMode::Space`], its columns) match the original document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PadMode {
    /// Content is returned verbatim.
    #[default]
    None,
    /// One filler line per document line before the content.
    Line,
    /// Everything before the content, blanked out to spaces.
    Space,
}

impl From<bool> for PadMode {
    fn from(pad: bool) -> Self {
        if pad { PadMode::Line } else { PadMode::None }
    }
}

impl FromStr for PadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "false" => Ok(PadMode::None),
            "line" | "true" => Ok(PadMode::Line),
            "space" => Ok(PadMode::Space),
            other => Err(format!("unknown pad mode '{}' (expected none, line or space)", other)),
        }
    }
}

impl fmt::Display for PadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PadMode::None => "none",
            PadMode::Line => "line",
            PadMode::Space => "space",
        })
    }
}

/// Block content after padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Padded {
    pub content: String,
    /// Byte length of the filler in front of the original content.
    pub prefix_len: usize,
}

/// The text of one filler line for a block in [`PadMode::Line`].
pub fn filler_line(kind: &BlockKind, lang: Option<&str>) -> &'static str {
    let commentable = match lang {
        None => true,
        Some(lang) => LINE_COMMENT_LANGS.iter().any(|l| l.eq_ignore_ascii_case(lang)),
    };
    if *kind == BlockKind::Script && commentable {
        "//"
    } else {
        ""
    }
}

/// Pad the content at `content` in the indexed document.
pub fn pad(index: &LineIndex<'_>, source: &str, content: Range<usize>, filler: &str, mode: PadMode) -> Padded {
    let body = &source[content.clone()];

    let mut padded = match mode {
        PadMode::None => {
            return Padded {
                content: body.to_string(),
                prefix_len: 0,
            };
        }
        PadMode::Line => {
            let lines_before = index.position(content.start).line - 1;
            let mut prefix = String::with_capacity((filler.len() + 1) * lines_before + body.len() + 1);
            for _ in 0..lines_before {
                prefix.push_str(filler);
                prefix.push('\n');
            }
            prefix
        }
        PadMode::Space => source[..content.start]
            .chars()
            .map(|c| if c == '\n' || c == '\r' { c } else { ' ' })
            .collect(),
    };

    let prefix_len = padded.len();
    padded.push_str(body);
    if !padded.ends_with('\n') {
        padded.push('\n');
    }

    Padded {
        content: padded,
        prefix_len,
    }
}
