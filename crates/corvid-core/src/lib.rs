//! Grammar AST, rule-name interning, and source indexing shared by the
//! corvid compiler and runtime.

mod grammar;
mod interner;
mod item;
mod source;

pub use grammar::{Alternative, Grammar, GrammarError, Rule};
pub use interner::{RuleId, RuleInterner};
pub use item::{Item, ItemAttributes};
pub use source::{SourceIndex, SourceLocation, SourceRange};
