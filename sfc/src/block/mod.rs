pub mod attrs;

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::position::Position;
use crate::source_map::SourceMap;

pub use attrs::{AttrValue, Attributes};

/// What a top-level tag is, by name. `template`, `script` and `style` are
/// reserved; every other name is a custom block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum BlockKind {
    Template,
    Script,
    Style,
    Custom(String),
}

impl BlockKind {
    /// Classify a tag name. Reserved names match ASCII case-insensitively.
    pub fn from_tag(name: &str) -> Self {
        if name.eq_ignore_ascii_case("template") {
            BlockKind::Template
        } else if name.eq_ignore_ascii_case("script") {
            BlockKind::Script
        } else if name.eq_ignore_ascii_case("style") {
            BlockKind::Style
        } else {
            BlockKind::Custom(name.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BlockKind::Template => "template",
            BlockKind::Script => "script",
            BlockKind::Style => "style",
            BlockKind::Custom(name) => name,
        }
    }

    /// Script and style bodies are raw text: nothing inside them is a tag.
    pub fn is_raw_text(&self) -> bool {
        matches!(self, BlockKind::Script | BlockKind::Style)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<BlockKind> for String {
    fn from(kind: BlockKind) -> String {
        match kind {
            BlockKind::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl From<String> for BlockKind {
    fn from(name: String) -> Self {
        BlockKind::from_tag(&name)
    }
}

/// One extracted top-level section of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Text between the opening and closing tag, or its padded form.
    pub content: String,
    pub attrs: Attributes,
    /// Position of the first content character in the document.
    pub start: Position,
    /// Position just past the last content character in the document.
    pub end: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub scoped: bool,
    /// CSS modules: `true`, or the name given as `module="name"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<AttrValue>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub setup: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub functional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<SourceMap>,
}

impl Block {
    /// Byte range of the extracted content in the original document.
    pub fn span(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }

    /// Lift the well-known attributes onto their own fields.
    pub(crate) fn promote_attrs(&mut self) {
        self.lang = self.attrs.get("lang").and_then(|v| v.as_str()).map(str::to_string);

        match self.kind {
            BlockKind::Template => {
                self.functional = self.attrs.contains_key("functional");
            }
            BlockKind::Script => {
                self.src = attr_string(&self.attrs, "src");
                self.setup = self.attrs.contains_key("setup");
            }
            BlockKind::Style => {
                self.src = attr_string(&self.attrs, "src");
                self.scoped = self.attrs.contains_key("scoped");
                self.module = self.attrs.get("module").cloned().map(|v| match v {
                    AttrValue::Value(name) if name.is_empty() => AttrValue::Flag(true),
                    other => other,
                });
            }
            BlockKind::Custom(_) => {
                self.src = attr_string(&self.attrs, "src");
            }
        }
    }
}

fn attr_string(attrs: &Attributes, name: &str) -> Option<String> {
    attrs.get(name).and_then(|v| v.as_str()).map(str::to_string)
}

fn is_false(b: &bool) -> bool {
    !*b
}
