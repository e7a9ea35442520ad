//! Concrete element-query expressions.

use serde::{Deserialize, Serialize};

/// One element-query expression. Course pages from different rendering
/// passes expose slightly different markup, so a role is looked up through
/// an ordered list of these, most-specific first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    /// Parse a raw configuration string. Expressions starting with `//`
    /// are XPath, everything else is treated as CSS.
    pub fn parse(raw: &str) -> Selector {
        if raw.starts_with("//") {
            Selector::XPath(raw.to_string())
        } else {
            Selector::Css(raw.to_string())
        }
    }

    pub fn expression(&self) -> &str {
        match self {
            Selector::Css(expr) | Selector::XPath(expr) => expr,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Selector::Css(_) => "css",
            Selector::XPath(_) => "xpath",
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression())
    }
}
