//! Shared types for the kcl toolchain: byte-offset ranges, line/character
//! positions, the token set, trivia, units, and diagnostics. Every other
//! crate in the workspace depends on this one and none of it depends back.

pub mod diagnostic;
pub mod position;
pub mod token;
pub mod trivia;
pub mod unit;

pub use diagnostic::{Diagnostic, Severity};
pub use position::{LineIndex, Position, PositionRange, Range};
pub use token::{Keyword, Op, Token, TokenKind};
pub use trivia::TriviaItem;
pub use unit::{Unit, UnitCategory};
