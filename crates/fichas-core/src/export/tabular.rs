//! CSV export of successful records.

use crate::error::ExportError;
use crate::models::record::{FieldKind, RecordBatch, SOURCE_ID_KEY};

/// Header row: fixed fields, then `source_id`, then the unified schema.
pub fn header(schema: &[String]) -> Vec<&str> {
    FieldKind::ALL
        .iter()
        .map(|kind| kind.key())
        .chain(std::iter::once(SOURCE_ID_KEY))
        .chain(schema.iter().map(String::as_str))
        .collect()
}

/// Render one row per successful record. Failed entries are left out.
pub fn render(batch: &RecordBatch, schema: &[String]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(header(schema))?;

    for record in batch.records() {
        let row: Vec<&str> = FieldKind::ALL
            .iter()
            .map(|&kind| record.field(kind).unwrap_or(""))
            .chain(std::iter::once(record.source_id()))
            .chain(
                schema
                    .iter()
                    .map(|label| record.extra_fields().get(label).map_or("", String::as_str)),
            )
            .collect();
        wtr.write_record(&row)?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| ExportError::Flush(e.error().to_string()))?;
    Ok(String::from_utf8(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranscriptionError;
    use crate::extract::RecordBuilder;
    use crate::models::record::ErrorEntry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_order() {
        let schema = vec!["Barrio".to_string(), "Profesión".to_string()];
        assert_eq!(
            header(&schema),
            vec![
                "given_name",
                "family_name",
                "address",
                "phone",
                "birth_date",
                "city",
                "notes",
                "source_id",
                "Barrio",
                "Profesión",
            ]
        );
    }

    #[test]
    fn test_rows_skip_failures_and_quote() {
        let builder = RecordBuilder::default();
        let mut batch = RecordBatch::new();
        batch.push(builder.build("1.jpeg", "Nombre: Ana\nDirección: Calle 5, apto \"B\""));
        batch.push(ErrorEntry::transcription(
            "2.jpeg",
            &TranscriptionError::Recognition("x".to_string()),
        ));
        batch.push(builder.build("3.jpeg", "Barrio: Centro"));

        let schema = vec!["Barrio".to_string()];
        let csv = render(&batch, &schema).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "given_name,family_name,address,phone,birth_date,city,notes,source_id,Barrio"
        );
        assert_eq!(lines[1], "Ana,,\"Calle 5, apto \"\"B\"\"\",,,,,1.jpeg,");
        assert_eq!(lines[2], ",,,,,,,3.jpeg,Centro");
    }
}
