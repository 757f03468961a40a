use std::ops::Range;

use crate::block::BlockKind;

/// Elements that never take a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// A top-level block as found in the source, before attributes are parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBlock<'a> {
    pub name: &'a str,
    pub kind: BlockKind,
    /// Text between the tag name and the closing `>` (or `/>`).
    pub attrs: &'a str,
    /// The opening tag, `<` through `>`.
    pub tag: Range<usize>,
    pub content: Range<usize>,
    /// False when the document ended before the closing tag.
    pub terminated: bool,
}

/// A start tag: `<name attrs>` or `<name attrs/>`.
#[derive(Debug, Clone)]
struct StartTag {
    name: Range<usize>,
    attrs: Range<usize>,
    /// Offset just past the closing `>`.
    end: usize,
    self_closing: bool,
    /// False when the `>` was never found.
    closed: bool,
}

/// Find every top-level block in `source` in one left-to-right pass.
pub fn scan(source: &str) -> Vec<RawBlock<'_>> {
    Scanner::new(source).run()
}

struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Scanner {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    fn run(mut self) -> Vec<RawBlock<'a>> {
        let mut blocks = Vec::new();

        while let Some(lt) = self.find_byte(b'<', self.pos) {
            let rest = &self.bytes[lt..];

            if rest.starts_with(b"<!--") {
                self.pos = self.skip_comment(lt);
            } else if rest.starts_with(b"<!") || rest.starts_with(b"<?") || rest.starts_with(b"</") {
                // Declarations, processing instructions and stray end tags.
                self.pos = self.find_byte(b'>', lt).map_or(self.bytes.len(), |gt| gt + 1);
            } else if let Some(tag) = self.start_tag(lt) {
                let block = self.read_block(lt, tag);
                tracing::trace!(
                    name = block.name,
                    offset = lt,
                    terminated = block.terminated,
                    "top-level block"
                );
                blocks.push(block);
            } else {
                self.pos = lt + 1;
            }
        }

        blocks
    }

    /// Consume the body of a top-level tag and leave `pos` after its end tag.
    fn read_block(&mut self, lt: usize, tag: StartTag) -> RawBlock<'a> {
        let source = self.source;
        let name = &source[tag.name.clone()];
        let kind = BlockKind::from_tag(name);
        let body_start = tag.end;
        self.pos = body_start;

        let (content, terminated) = if !tag.closed {
            (body_start..body_start, false)
        } else if tag.self_closing || is_void(name) {
            (body_start..body_start, true)
        } else if kind.is_raw_text() {
            self.raw_text_body(name, body_start)
        } else {
            self.nested_body(name, body_start)
        };

        if !terminated {
            self.pos = self.bytes.len();
        }

        RawBlock {
            name,
            kind,
            attrs: &source[tag.attrs],
            tag: lt..tag.end,
            content,
            terminated,
        }
    }

    /// Script and style: the first matching end tag closes the block.
    fn raw_text_body(&mut self, name: &str, start: usize) -> (Range<usize>, bool) {
        let mut i = start;
        while let Some(lt) = self.find_byte(b'<', i) {
            if self.bytes.get(lt + 1) == Some(&b'/') && self.name_at(lt + 2, name) {
                self.pos = self.end_tag_end(lt);
                return (start..lt, true);
            }
            i = lt + 1;
        }
        (start..self.bytes.len(), false)
    }

    /// Template and custom blocks: only tags with the block's own name move
    /// the depth counter; the end tag that brings it back to zero closes it.
    fn nested_body(&mut self, name: &str, start: usize) -> (Range<usize>, bool) {
        let mut depth = 1usize;
        let mut i = start;

        while let Some(lt) = self.find_byte(b'<', i) {
            let rest = &self.bytes[lt..];

            if rest.starts_with(b"<!--") {
                i = self.skip_comment(lt);
            } else if rest.starts_with(b"</") {
                if self.name_at(lt + 2, name) {
                    depth -= 1;
                    if depth == 0 {
                        self.pos = self.end_tag_end(lt);
                        return (start..lt, true);
                    }
                }
                i = lt + 2;
            } else if let Some(tag) = self.start_tag(lt) {
                if !tag.self_closing && self.source[tag.name.clone()].eq_ignore_ascii_case(name) {
                    depth += 1;
                }
                i = tag.end;
            } else {
                i = lt + 1;
            }
        }

        (start..self.bytes.len(), false)
    }

    /// Parse a start tag at `lt`, or `None` if no tag name follows the `<`.
    fn start_tag(&self, lt: usize) -> Option<StartTag> {
        let name_start = lt + 1;
        if !self.bytes.get(name_start)?.is_ascii_alphabetic() {
            return None;
        }
        let name_end = name_start
            + self.bytes[name_start..]
                .iter()
                .take_while(|&&b| is_name_byte(b))
                .count();
        if !self.is_name_boundary(name_end) {
            return None;
        }

        let Some(gt) = self.find_tag_end(name_end) else {
            return Some(StartTag {
                name: name_start..name_end,
                attrs: name_end..self.bytes.len(),
                end: self.bytes.len(),
                self_closing: false,
                closed: false,
            });
        };

        let self_closing = gt > name_end && self.bytes[gt - 1] == b'/';
        let attrs_end = if self_closing { gt - 1 } else { gt };
        Some(StartTag {
            name: name_start..name_end,
            attrs: name_end..attrs_end,
            end: gt + 1,
            self_closing,
            closed: true,
        })
    }

    /// The `>` ending a tag, skipping any `>` inside quoted attribute values.
    /// A quote that is never closed ends at the first `>` after it.
    fn find_tag_end(&self, from: usize) -> Option<usize> {
        let mut i = from;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'>' => return Some(i),
                b'=' => {
                    i += 1;
                    while i < self.bytes.len() && self.bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    if let Some(&quote @ (b'"' | b'\'')) = self.bytes.get(i) {
                        match self.find_byte(quote, i + 1) {
                            Some(close) => i = close + 1,
                            None => return self.find_byte(b'>', i + 1),
                        }
                    }
                }
                _ => i += 1,
            }
        }
        None
    }

    /// Whether the tag name `name` starts at `at` and is not a prefix of a longer name.
    fn name_at(&self, at: usize, name: &str) -> bool {
        let end = at + name.len();
        self.bytes
            .get(at..end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name.as_bytes()))
            && self.is_name_boundary(end)
    }

    fn is_name_boundary(&self, at: usize) -> bool {
        match self.bytes.get(at) {
            None => true,
            Some(&b) => b.is_ascii_whitespace() || b == b'>' || b == b'/',
        }
    }

    /// Offset just past the `>` of the end tag starting at `lt`.
    fn end_tag_end(&self, lt: usize) -> usize {
        self.find_byte(b'>', lt).map_or(self.bytes.len(), |gt| gt + 1)
    }

    fn skip_comment(&self, lt: usize) -> usize {
        let body = lt + 4;
        self.source[body..]
            .find("-->")
            .map_or(self.bytes.len(), |rel| body + rel + 3)
    }

    fn find_byte(&self, needle: u8, from: usize) -> Option<usize> {
        self.bytes
            .get(from..)?
            .iter()
            .position(|&b| b == needle)
            .map(|rel| from + rel)
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}
