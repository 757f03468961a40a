use crate::block::{Block, BlockKind};
use crate::pad::{self, PadMode};
use crate::parser::attributes::parse_attributes;
use crate::parser::scanner::RawBlock;
use crate::parser::warning::ParseWarning;
use crate::position::LineIndex;
use crate::source_map::SourceMap;
use crate::{ParseOptions, ParseResult};

/// Fold scanned blocks into a result.
///
/// The first `<template>` and the first `<script>` win. Later ones are
/// dropped with a warning so that the result does not depend on anything but
/// document order.
pub(super) fn assemble(
    source: &str,
    file_id: usize,
    raw_blocks: Vec<RawBlock<'_>>,
    options: &ParseOptions,
) -> ParseResult {
    let index = LineIndex::new(source);
    let mut result = ParseResult::default();

    for raw in raw_blocks {
        if !raw.terminated {
            tracing::debug!(name = raw.name, offset = raw.tag.start, "unterminated block");
            result.warnings.push(
                ParseWarning::new(
                    format!("<{}> block is never closed", raw.name),
                    raw.tag.clone(),
                    file_id,
                )
                .with_note("the block extends to the end of the document"),
            );
        }

        let taken = match raw.kind {
            BlockKind::Template => result.template.is_some(),
            BlockKind::Script => result.script.is_some(),
            _ => false,
        };
        if taken {
            tracing::debug!(name = raw.name, offset = raw.tag.start, "duplicate block dropped");
            result.warnings.push(
                ParseWarning::new(
                    format!("duplicate <{}> block ignored", raw.kind),
                    raw.tag.clone(),
                    file_id,
                )
                .with_note(format!("only the first <{}> block is used", raw.kind)),
            );
            continue;
        }

        let block = build_block(source, &index, &raw, options);
        match block.kind {
            BlockKind::Template => result.template = Some(block),
            BlockKind::Script => result.script = Some(block),
            BlockKind::Style => result.styles.push(block),
            BlockKind::Custom(_) => result.custom_blocks.push(block),
        }
    }

    result
}

fn build_block(source: &str, index: &LineIndex<'_>, raw: &RawBlock<'_>, options: &ParseOptions) -> Block {
    let mut block = Block {
        kind: raw.kind.clone(),
        content: String::new(),
        attrs: parse_attributes(raw.attrs),
        start: index.position(raw.content.start),
        end: index.position(raw.content.end),
        lang: None,
        src: None,
        scoped: false,
        module: None,
        setup: false,
        functional: false,
        map: None,
    };
    block.promote_attrs();

    // Template markup is never padded.
    let mode = match block.kind {
        BlockKind::Template => PadMode::None,
        _ => options.pad,
    };
    let filler = pad::filler_line(&block.kind, block.lang.as_deref());
    let padded = pad::pad(index, source, raw.content.clone(), filler, mode);

    if let Some(map_options) = &options.map {
        if block.kind.is_raw_text() {
            block.map = SourceMap::for_block(
                map_options,
                index,
                source,
                raw.content.start,
                raw.content.len(),
                &padded.content,
                padded.prefix_len,
            );
        }
    }

    block.content = padded.content;
    block
}
