//! Personal record data models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, TranscriptionError};

/// Name of the identifier column shared by every export.
pub const SOURCE_ID_KEY: &str = "source_id";

/// One of the seven predefined personal-record attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Given name (nombre).
    GivenName,
    /// Family name (apellido).
    FamilyName,
    /// Street address (dirección / domicilio).
    Address,
    /// Phone number (teléfono / celular / móvil).
    Phone,
    /// Birth date (fecha de nacimiento).
    BirthDate,
    /// City or municipality.
    City,
    /// Free-form observations.
    Notes,
}

impl FieldKind {
    /// All fixed fields, in export order.
    pub const ALL: [FieldKind; 7] = [
        FieldKind::GivenName,
        FieldKind::FamilyName,
        FieldKind::Address,
        FieldKind::Phone,
        FieldKind::BirthDate,
        FieldKind::City,
        FieldKind::Notes,
    ];

    /// Key used in the structured and tabular documents.
    pub fn key(self) -> &'static str {
        match self {
            Self::GivenName => "given_name",
            Self::FamilyName => "family_name",
            Self::Address => "address",
            Self::Phone => "phone",
            Self::BirthDate => "birth_date",
            Self::City => "city",
            Self::Notes => "notes",
        }
    }

    /// Canonical label as written on the source cards.
    pub fn label(self) -> &'static str {
        match self {
            Self::GivenName => "nombre",
            Self::FamilyName => "apellido",
            Self::Address => "dirección",
            Self::Phone => "teléfono",
            Self::BirthDate => "fecha",
            Self::City => "ciudad",
            Self::Notes => "observaciones",
        }
    }

    /// Heading used in the human-readable report.
    pub fn report_heading(self) -> &'static str {
        match self {
            Self::GivenName => "NOMBRE",
            Self::FamilyName => "APELLIDO",
            Self::Address => "DIRECCIÓN",
            Self::Phone => "TELÉFONO",
            Self::BirthDate => "FECHA NACIMIENTO",
            Self::City => "CIUDAD",
            Self::Notes => "OBSERVACIONES",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Returns true if `label` collides with a fixed field or the identifier column.
///
/// Comparison is case-insensitive and applies to the canonical card label as
/// well as the export key.
pub fn is_reserved_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    lower == SOURCE_ID_KEY
        || FieldKind::ALL
            .iter()
            .any(|kind| lower == kind.label() || lower == kind.key())
}

/// One structured result derived from one input's raw transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    source_id: String,
    given_name: Option<String>,
    family_name: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    birth_date: Option<String>,
    city: Option<String>,
    notes: Option<String>,
    #[serde(default)]
    extra_fields: BTreeMap<String, String>,
    full_text: String,
}

impl Record {
    /// Create an empty record for `source_id` holding the raw transcript.
    pub fn new(source_id: impl Into<String>, full_text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            given_name: None,
            family_name: None,
            address: None,
            phone: None,
            birth_date: None,
            city: None,
            notes: None,
            extra_fields: BTreeMap::new(),
            full_text: full_text.into(),
        }
    }

    /// Identifier of the originating input.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Value of a fixed field, if it was captured.
    pub fn field(&self, kind: FieldKind) -> Option<&str> {
        self.slot(kind).as_deref()
    }

    /// Unrecognized `label: value` pairs.
    pub fn extra_fields(&self) -> &BTreeMap<String, String> {
        &self.extra_fields
    }

    /// The verbatim transcript this record was built from.
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Set a fixed field unless it already holds a value.
    ///
    /// Returns true when the value was stored.
    pub(crate) fn set_if_unset(&mut self, kind: FieldKind, value: String) -> bool {
        let slot = self.slot_mut(kind);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    /// Insert an extra field, replacing an earlier value under the same label.
    pub(crate) fn insert_extra(&mut self, label: String, value: String) {
        self.extra_fields.insert(label, value);
    }

    fn slot(&self, kind: FieldKind) -> &Option<String> {
        match kind {
            FieldKind::GivenName => &self.given_name,
            FieldKind::FamilyName => &self.family_name,
            FieldKind::Address => &self.address,
            FieldKind::Phone => &self.phone,
            FieldKind::BirthDate => &self.birth_date,
            FieldKind::City => &self.city,
            FieldKind::Notes => &self.notes,
        }
    }

    fn slot_mut(&mut self, kind: FieldKind) -> &mut Option<String> {
        match kind {
            FieldKind::GivenName => &mut self.given_name,
            FieldKind::FamilyName => &mut self.family_name,
            FieldKind::Address => &mut self.address,
            FieldKind::Phone => &mut self.phone,
            FieldKind::BirthDate => &mut self.birth_date,
            FieldKind::City => &mut self.city,
            FieldKind::Notes => &mut self.notes,
        }
    }
}

/// Why an input could not be turned into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The transcription provider produced no text.
    Transcription,
    /// Record construction faulted.
    Build,
}

/// Placeholder entry for an input that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub source_id: String,
    pub kind: FailureKind,
    pub error: String,
}

impl ErrorEntry {
    pub fn transcription(source_id: impl Into<String>, err: &TranscriptionError) -> Self {
        Self {
            source_id: source_id.into(),
            kind: FailureKind::Transcription,
            error: err.to_string(),
        }
    }

    pub fn build(source_id: impl Into<String>, err: &BuildError) -> Self {
        Self {
            source_id: source_id.into(),
            kind: FailureKind::Build,
            error: err.to_string(),
        }
    }
}

/// One slot of a batch: a record or the failure that replaced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Record(Record),
    Failed(ErrorEntry),
}

impl BatchEntry {
    /// Identifier of the originating input.
    pub fn source_id(&self) -> &str {
        match self {
            Self::Record(record) => record.source_id(),
            Self::Failed(entry) => &entry.source_id,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            Self::Failed(_) => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl From<Record> for BatchEntry {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<ErrorEntry> for BatchEntry {
    fn from(entry: ErrorEntry) -> Self {
        Self::Failed(entry)
    }
}

/// Ordered, append-only collection of entries for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordBatch {
    entries: Vec<BatchEntry>,
}

impl RecordBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the end of the batch.
    pub fn push(&mut self, entry: impl Into<BatchEntry>) {
        self.entries.push(entry.into());
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Successful records, in batch order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().filter_map(BatchEntry::as_record)
    }

    /// Failed entries, in batch order.
    pub fn failures(&self) -> impl Iterator<Item = &ErrorEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            BatchEntry::Failed(failed) => Some(failed),
            BatchEntry::Record(_) => None,
        })
    }

    pub fn succeeded(&self) -> usize {
        self.records().count()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    /// Parse a structured export back into a batch.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
