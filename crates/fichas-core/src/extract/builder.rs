//! Record builder driving the line classifier over a whole transcript.

use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::record::{is_reserved_label, Record};

use super::rules::{LineClass, RuleSet};

/// Builds one [`Record`] per transcript.
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    rules: RuleSet,
}

impl RecordBuilder {
    /// Create a builder classifying lines with `rules`.
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Create a builder from the configured keyword rules.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(RuleSet::new(config.rules.clone()))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Build a record from `raw_text`. Never fails; empty input yields a
    /// record with only `full_text` set.
    pub fn build(&self, source_id: &str, raw_text: &str) -> Record {
        let mut record = Record::new(source_id, raw_text);
        let mut ignored = 0usize;

        for line in raw_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match self.rules.classify(line) {
                LineClass::Fixed { kind, value } => {
                    if !record.set_if_unset(kind, value) {
                        debug!("{}: keeping first {} value", source_id, kind);
                    }
                }
                LineClass::Extra { label, value } => {
                    if is_reserved_label(&label) {
                        debug!("{}: dropping extra field with reserved label {:?}", source_id, label);
                    } else {
                        record.insert_extra(label, value);
                    }
                }
                LineClass::Unmatched => ignored += 1,
            }
        }

        debug!(
            "{}: built record with {} extra fields, {} lines ignored",
            source_id,
            record.extra_fields().len(),
            ignored
        );

        record
    }
}
