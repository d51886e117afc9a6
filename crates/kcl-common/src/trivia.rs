//! Trivia: comments and blank-line runs, tracked alongside tokens but not
//! part of the token stream itself (spec invariant 6).

use serde::Serialize;

use crate::position::Range;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TriviaItem {
    /// `isBlock` distinguishes `/* ... */` from `// ...` comments; `text`
    /// excludes the delimiters.
    Comment { text: String, is_block: bool, range: Range },
    /// A run of `count` consecutive blank lines between tokens.
    BlankRun { count: u32, range: Range },
}

impl TriviaItem {
    pub fn range(&self) -> Range {
        match self {
            TriviaItem::Comment { range, .. } => *range,
            TriviaItem::BlankRun { range, .. } => *range,
        }
    }
}
