use serde::{Deserialize, Serialize};
use sourcemap::SourceMapBuilder;

use crate::MapOptions;
use crate::position::{LineIndex, Position};

/// A revision 3 source map from one block's content back to the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    pub sources: Vec<String>,
    #[serde(default)]
    pub sources_content: Vec<Option<String>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

/// Where a generated position came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalPosition<'a> {
    pub source: &'a str,
    /// 1-based.
    pub line: usize,
    /// 1-based, in characters.
    pub column: usize,
}

impl SourceMap {
    /// Build the map for a block whose document content starts at
    /// `content_start` and appears in `generated` after `prefix_len` bytes of
    /// padding.
    ///
    /// Every line of the content gets a token at its first character, and
    /// every non-whitespace character gets its own token. Returns `None` if
    /// the encoded map cannot be produced.
    pub fn for_block(
        options: &MapOptions,
        index: &LineIndex<'_>,
        source: &str,
        content_start: usize,
        content_len: usize,
        generated: &str,
        prefix_len: usize,
    ) -> Option<Self> {
        let file = normalize_path(&options.filename);
        let mut builder = SourceMapBuilder::new(Some(&file));
        if let Some(root) = &options.source_root {
            builder.set_source_root(Some(&normalize_path(root)));
        }
        let source_id = builder.add_source(&options.filename);
        builder.set_source_contents(source_id, Some(source));

        let prefix = &generated[..prefix_len];
        let mut generated_line = prefix.matches('\n').count() as u32;
        let mut generated_column = prefix
            .rsplit('\n')
            .next()
            .map_or(0, |last| last.chars().count()) as u32;

        let start = index.position(content_start);
        let mut original_line = (start.line - 1) as u32;
        let mut original_column = (start.column - 1) as u32;
        let mut line_has_token = false;

        for c in source[content_start..content_start + content_len].chars() {
            if c == '\n' {
                generated_line += 1;
                generated_column = 0;
                original_line += 1;
                original_column = 0;
                line_has_token = false;
                continue;
            }

            if !line_has_token || !c.is_whitespace() {
                builder.add_raw(
                    generated_line,
                    generated_column,
                    original_line,
                    original_column,
                    Some(source_id),
                    None,
                );
                line_has_token = true;
            }

            generated_column += 1;
            original_column += 1;
        }

        let mut encoded = Vec::new();
        if let Err(e) = builder.into_sourcemap().to_writer(&mut encoded) {
            tracing::warn!(error = %e, file = %file, "cannot encode source map");
            return None;
        }
        match serde_json::from_slice(&encoded) {
            Ok(map) => Some(map),
            Err(e) => {
                tracing::warn!(error = %e, file = %file, "cannot read back source map");
                None
            }
        }
    }

    /// Map a 1-based line and column of the generated content back to the
    /// document.
    ///
    /// Uses the closest token at or before `column` on that line, or the
    /// first token on the line when `column` precedes all of them.
    /// Returns `None` for lines without tokens or malformed mappings.
    pub fn original_position_for(&self, line: usize, column: usize) -> Option<OriginalPosition<'_>> {
        let encoded = serde_json::to_vec(self).ok()?;
        let decoded = sourcemap::SourceMap::from_slice(&encoded).ok()?;
        let line = u32::try_from(line.checked_sub(1)?).ok()?;
        let column = u32::try_from(column.saturating_sub(1)).ok()?;

        let mut on_line = decoded.tokens().filter(|t| t.get_dst_line() == line);
        let first = on_line.next()?;
        let token = on_line
            .take_while(|t| t.get_dst_col() <= column)
            .last()
            .filter(|_| first.get_dst_col() <= column)
            .unwrap_or(first);

        Some(OriginalPosition {
            source: self.sources.get(token.get_src_id() as usize)?,
            line: token.get_src_line() as usize + 1,
            column: token.get_src_col() as usize + 1,
        })
    }

    /// Same as [`SourceMap::original_position_for`], taking a [`Position`].
    pub fn original_position(&self, generated: Position) -> Option<OriginalPosition<'_>> {
        self.original_position_for(generated.line, generated.column)
    }
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
