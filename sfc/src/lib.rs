pub mod block;
pub mod pad;
pub mod parser;
pub mod position;
pub mod source_map;

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::pad::PadMode;
use crate::parser::{ParseWarning, Parser};

/// A split single-file component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    /// The first top-level `<template>` block, if any.
    pub template: Option<Block>,
    /// The first top-level `<script>` block, if any.
    pub script: Option<Block>,
    /// Every top-level `<style>` block, in document order.
    pub styles: Vec<Block>,
    /// Every other top-level block, in document order.
    pub custom_blocks: Vec<Block>,
    /// Non-fatal problems found while splitting. Never serialized.
    #[serde(skip)]
    pub warnings: Vec<ParseWarning>,
}

impl ParseResult {
    /// All extracted blocks in document order.
    pub fn blocks(&self) -> Vec<&Block> {
        let mut blocks: Vec<&Block> = self
            .template
            .iter()
            .chain(self.script.iter())
            .chain(self.styles.iter())
            .chain(self.custom_blocks.iter())
            .collect();
        blocks.sort_by_key(|b| b.start.offset);
        blocks
    }
}

/// Options controlling how block content is returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Line-correction by rewriting content. See [`PadMode`].
    pub pad: PadMode,
    /// When set, script and style blocks carry a source map.
    pub map: Option<MapOptions>,
}

/// Source map settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapOptions {
    /// Recorded as the map's `file` and its only `sources` entry.
    pub filename: String,
    pub source_root: Option<String>,
}

impl MapOptions {
    pub fn new(filename: impl Into<String>) -> Self {
        MapOptions {
            filename: filename.into(),
            source_root: None,
        }
    }
}

/// Split `source` into its top-level blocks.
pub fn parse(source: &str, options: &ParseOptions) -> ParseResult {
    Parser::new(source, 0).parse(options)
}
