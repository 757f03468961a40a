use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute name to value. Names are unique; the last duplicate wins.
pub type Attributes = BTreeMap<String, AttrValue>;

/// The value of a tag attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// A valueless attribute such as `scoped`. Always `true`.
    Flag(bool),
    Value(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Value(s) => Some(s),
            AttrValue::Flag(_) => None,
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, AttrValue::Flag(true))
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Value(s.to_string())
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Flag(b)
    }
}
