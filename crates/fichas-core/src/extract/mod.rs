//! Field extraction from transcribed text.

mod builder;
pub mod rules;

pub use builder::RecordBuilder;
pub use rules::{default_rules, KeywordRule, LineClass, RuleSet, SEPARATOR};
