//! Keyword rules for classifying transcript lines.
//!
//! Each line is lowercased and tested against a prioritized list of rules.
//! The first rule whose keywords occur in the line decides the field; the
//! value is whatever follows the first [`SEPARATOR`]. Keywords are plain
//! substrings, so `tel` also matches inside longer words.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::models::record::FieldKind;

/// Character separating a label from its value.
pub const SEPARATOR: char = ':';

/// A declarative rule mapping keywords to a fixed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Field this rule assigns.
    pub kind: FieldKind,

    /// Rules are tried in ascending priority.
    pub priority: u32,

    /// The rule applies when any of these occurs in the line.
    pub keywords: Vec<String>,

    /// Extra keyword groups; each group needs at least one hit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Vec<String>>,

    /// The rule is skipped when any of these occurs in the line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

impl KeywordRule {
    pub fn new(kind: FieldKind, priority: u32, keywords: &[&str]) -> Self {
        Self {
            kind,
            priority,
            keywords: to_owned(keywords),
            requires: Vec::new(),
            excludes: Vec::new(),
        }
    }

    /// Require at least one keyword from `group` as well.
    pub fn requiring(mut self, group: &[&str]) -> Self {
        self.requires.push(to_owned(group));
        self
    }

    /// Skip the rule when any of `keywords` is present.
    pub fn excluding(mut self, keywords: &[&str]) -> Self {
        self.excludes.extend(to_owned(keywords));
        self
    }

    /// Test the rule against an already lowercased line.
    pub fn matches(&self, lower: &str) -> bool {
        contains_any(lower, &self.keywords)
            && self.requires.iter().all(|group| contains_any(lower, group))
            && !contains_any(lower, &self.excludes)
    }

    fn normalized(mut self) -> Self {
        self.keywords = normalize(self.keywords);
        self.requires = self.requires.into_iter().map(normalize).collect();
        self.excludes = normalize(self.excludes);
        self
    }
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn normalize(words: Vec<String>) -> Vec<String> {
    words
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn contains_any(lower: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| lower.contains(k.as_str()))
}

const FAMILY_NAME_KEYWORDS: &[&str] = &["apellido", "surname", "last name"];

/// The built-in Spanish/English vocabulary.
///
/// Family name is tried before given name, and given name additionally
/// excludes the family-name keywords, so `Nombre y apellido: ...` and
/// `Surname: ...` never land in the given-name slot.
pub fn default_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(FieldKind::FamilyName, 10, FAMILY_NAME_KEYWORDS),
        KeywordRule::new(FieldKind::GivenName, 20, &["nombre", "name"])
            .excluding(FAMILY_NAME_KEYWORDS),
        KeywordRule::new(FieldKind::Address, 30, &["direcci", "domicilio", "address"]),
        KeywordRule::new(
            FieldKind::Phone,
            40,
            &["tel", "celular", "móvil", "movil", "phone", "mobile"],
        ),
        KeywordRule::new(FieldKind::BirthDate, 50, &["fecha", "date"])
            .requiring(&["nacimiento", "birth"]),
        KeywordRule::new(FieldKind::City, 60, &["ciudad", "municipio", "city"]),
        KeywordRule::new(FieldKind::Notes, 70, &["observaci", "nota", "note"]),
    ]
}

/// Outcome of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// The line carries a fixed field.
    Fixed { kind: FieldKind, value: String },
    /// The line is an unrecognized `label: value` pair.
    Extra { label: String, value: String },
    /// The line is discarded.
    Unmatched,
}

/// Ordered rule list used to classify lines.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<KeywordRule>,
}

impl RuleSet {
    /// Build a rule set; keywords are lowercased and rules sorted by priority.
    ///
    /// Rules sharing a priority keep their relative order.
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        let mut rules: Vec<KeywordRule> = rules.into_iter().map(KeywordRule::normalized).collect();
        rules.sort_by_key(|r| r.priority);
        Self { rules }
    }

    /// Replace the keywords of every rule for `kind`.
    pub fn with_keywords(mut self, kind: FieldKind, keywords: &[&str]) -> Self {
        let keywords = normalize(to_owned(keywords));
        for rule in self.rules.iter_mut().filter(|r| r.kind == kind) {
            rule.keywords = keywords.clone();
        }
        self
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Classify a trimmed, non-empty line.
    pub fn classify(&self, line: &str) -> LineClass {
        let lower = line.to_lowercase();

        if let Some(rule) = self.rules.iter().find(|r| r.matches(&lower)) {
            trace!("Line matched {} rule: {}", rule.kind, line);
            return match split_pair(line) {
                Some((_, value)) if !value.is_empty() => LineClass::Fixed {
                    kind: rule.kind,
                    value: value.to_string(),
                },
                _ => LineClass::Unmatched,
            };
        }

        match split_pair(line) {
            Some((label, value)) if !label.is_empty() => LineClass::Extra {
                label: label.to_string(),
                value: value.to_string(),
            },
            _ => LineClass::Unmatched,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

/// Split on the first separator, trimming both halves.
fn split_pair(line: &str) -> Option<(&str, &str)> {
    line.split_once(SEPARATOR)
        .map(|(label, value)| (label.trim(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixed(kind: FieldKind, value: &str) -> LineClass {
        LineClass::Fixed {
            kind,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_family_name_beats_given_name() {
        let rules = RuleSet::default();
        assert_eq!(
            rules.classify("Apellido: García López"),
            fixed(FieldKind::FamilyName, "García López")
        );
        assert_eq!(
            rules.classify("Nombre y apellido: Ana García"),
            fixed(FieldKind::FamilyName, "Ana García")
        );
        assert_eq!(
            rules.classify("Surname: Smith"),
            fixed(FieldKind::FamilyName, "Smith")
        );
        assert_eq!(rules.classify("NOMBRE: Ana"), fixed(FieldKind::GivenName, "Ana"));
    }

    #[test]
    fn test_each_fixed_field() {
        let rules = RuleSet::default();
        let cases = [
            ("Dirección: Calle 5 #10-20", FieldKind::Address, "Calle 5 #10-20"),
            ("Domicilio: Av. Siempre Viva", FieldKind::Address, "Av. Siempre Viva"),
            ("Teléfono: 300 123 4567", FieldKind::Phone, "300 123 4567"),
            ("Celular: 310-555-0000", FieldKind::Phone, "310-555-0000"),
            ("MÓVIL: 611 22 33 44", FieldKind::Phone, "611 22 33 44"),
            ("Fecha de nacimiento: 12/03/1980", FieldKind::BirthDate, "12/03/1980"),
            ("Date of birth: 1980-03-12", FieldKind::BirthDate, "1980-03-12"),
            ("Ciudad: Medellín", FieldKind::City, "Medellín"),
            ("Municipio: Envigado", FieldKind::City, "Envigado"),
            ("Observaciones: ninguna", FieldKind::Notes, "ninguna"),
            ("Nota: llamar en la tarde", FieldKind::Notes, "llamar en la tarde"),
        ];

        for (line, kind, value) in cases {
            assert_eq!(rules.classify(line), fixed(kind, value), "line: {line}");
        }
    }

    #[test]
    fn test_extra_field_splits_on_first_separator() {
        let rules = RuleSet::default();
        assert_eq!(
            rules.classify("Profesión: Ingeniero"),
            LineClass::Extra {
                label: "Profesión".to_string(),
                value: "Ingeniero".to_string(),
            }
        );
        assert_eq!(
            rules.classify("Hora de ingreso: 10:30"),
            LineClass::Extra {
                label: "Hora de ingreso".to_string(),
                value: "10:30".to_string(),
            }
        );
    }

    #[test]
    fn test_birth_date_needs_both_keywords() {
        let rules = RuleSet::default();
        assert_eq!(
            rules.classify("Fecha: 2024-01-01"),
            LineClass::Extra {
                label: "Fecha".to_string(),
                value: "2024-01-01".to_string(),
            }
        );
    }

    #[test]
    fn test_keyword_without_separator_is_unmatched() {
        let rules = RuleSet::default();
        assert_eq!(rules.classify("Nombre Ana"), LineClass::Unmatched);
        assert_eq!(rules.classify("Teléfono pendiente"), LineClass::Unmatched);
        assert_eq!(rules.classify("texto suelto"), LineClass::Unmatched);
    }

    #[test]
    fn test_empty_value_is_unmatched() {
        let rules = RuleSet::default();
        assert_eq!(rules.classify("Nombre:"), LineClass::Unmatched);
        assert_eq!(rules.classify(": sin etiqueta"), LineClass::Unmatched);
    }

    #[test]
    fn test_substring_matching_is_preserved() {
        // "tel" inside "Hotel" still selects the phone rule.
        let rules = RuleSet::default();
        assert_eq!(
            rules.classify("Hotel: Central"),
            fixed(FieldKind::Phone, "Central")
        );
    }

    #[test]
    fn test_rules_sorted_by_priority() {
        let mut rules = default_rules();
        rules.reverse();
        let set = RuleSet::new(rules);
        let kinds: Vec<FieldKind> = set.rules().iter().map(|r| r.kind).collect();
        assert_eq!(kinds[0], FieldKind::FamilyName);
        assert_eq!(kinds[1], FieldKind::GivenName);
        assert_eq!(kinds[6], FieldKind::Notes);
    }

    #[test]
    fn test_injected_keywords() {
        let rules = RuleSet::default().with_keywords(FieldKind::City, &["Localidad"]);
        assert_eq!(
            rules.classify("Localidad: Bello"),
            fixed(FieldKind::City, "Bello")
        );
        assert_eq!(
            rules.classify("Ciudad: Bello"),
            LineClass::Extra {
                label: "Ciudad".to_string(),
                value: "Bello".to_string(),
            }
        );
    }
}
