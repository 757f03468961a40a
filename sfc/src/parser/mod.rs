pub mod attributes;
pub mod scanner;
pub mod warning;

mod assemble;

pub use warning::ParseWarning;

use crate::{ParseOptions, ParseResult};

/// Parser entry point.
pub struct Parser<'a> {
    source: &'a str,
    file_id: usize,
}

impl<'a> Parser<'a> {
    /// `file_id` is carried into every warning for codespan-reporting.
    pub fn new(source: &'a str, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Split the source into its blocks. Never fails; problems are reported
    /// in [`ParseResult::warnings`].
    pub fn parse(&self, options: &ParseOptions) -> ParseResult {
        let raw = scanner::scan(self.source);
        tracing::debug!(blocks = raw.len(), "scanned component");
        assemble::assemble(self.source, self.file_id, raw, options)
    }
}
