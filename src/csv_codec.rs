//! CSV import/export of the record collection.

use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{Field, ProjectEntry, RecordDraft};

/// Serialize entries with a header row of the fourteen column names.
pub fn encode<'a, I>(entries: I) -> TrackerResult<Vec<u8>>
where
    I: IntoIterator<Item = &'a ProjectEntry>,
{
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(Field::ALL.iter().map(|field| field.column()))
        .map_err(|e| TrackerError::Export(e.to_string()))?;

    for entry in entries {
        writer
            .write_record(Field::ALL.iter().map(|&field| entry.text(field)))
            .map_err(|e| TrackerError::Export(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| TrackerError::Export(e.to_string()))
}

/// Parse CSV bytes into drafts, mapping columns by header name.
///
/// Columns the tracker does not know (an exported `id`, for instance) are
/// ignored and missing ones simply stay absent in every draft.
pub fn decode(bytes: &[u8]) -> TrackerResult<Vec<RecordDraft>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(TrackerError::ImportParse("no header row".to_string()));
    }
    let columns = build_column_map(&headers);

    let mut drafts = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        if row.len() > headers.len() {
            return Err(TrackerError::ImportParse(format!(
                "row {} has {} fields, header has {}",
                index + 2,
                row.len(),
                headers.len()
            )));
        }
        drafts.push(draft_from_row(&row, &columns));
    }

    Ok(drafts)
}

fn build_column_map(headers: &StringRecord) -> HashMap<Field, usize> {
    let mut columns = HashMap::new();
    for (index, header) in headers.iter().enumerate() {
        if let Some(field) = Field::from_column(header) {
            columns.entry(field).or_insert(index);
        }
    }
    columns
}

fn draft_from_row(row: &StringRecord, columns: &HashMap<Field, usize>) -> RecordDraft {
    let mut draft = RecordDraft::new();
    for (&field, &index) in columns {
        if let Some(value) = row.get(index) {
            draft.set(field, value);
        }
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const HEADER: &str = "who,what,why,where,when,how,cost,planned_end,deadline_status,\
task_status,return_type,return_estimate,history,notes";

    #[test]
    fn header_lists_every_column_but_id_in_order() {
        let bytes = encode(std::iter::empty::<&ProjectEntry>()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), format!("{HEADER}\n"));
    }

    #[test]
    fn quotes_embedded_commas_and_newlines() {
        let entry = ProjectEntry {
            who: "Alice".into(),
            what: "Buy paint, brushes".into(),
            notes: "first\nsecond".into(),
            cost: Some(99.5),
            ..ProjectEntry::default()
        };

        let text = String::from_utf8(encode([&entry]).unwrap()).unwrap();

        assert!(text.contains("\"Buy paint, brushes\""));
        assert!(text.contains("\"first\nsecond\""));
        assert!(text.contains(",99.5,"));
        assert_eq!(decode(text.as_bytes()).unwrap()[0].get(Field::Notes), Some("first\nsecond"));
    }

    #[test]
    fn missing_columns_stay_absent() {
        let drafts = decode(b"who,task_status\nAlice,Completed\n").unwrap();

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].get(Field::Who), Some("Alice"));
        assert_eq!(drafts[0].get(Field::TaskStatus), Some("Completed"));
        assert_eq!(drafts[0].get(Field::Cost), None);
        assert_eq!(drafts[0].get(Field::Notes), None);
    }

    #[test]
    fn id_and_unknown_columns_are_ignored() {
        let drafts = decode(b"id,Who , extra\n7,Bob,whatever\n").unwrap();

        assert_eq!(drafts[0], RecordDraft::new().with(Field::Who, "Bob"));
    }

    #[test]
    fn short_rows_are_padded() {
        let drafts = decode(b"who,what,cost\nAlice\n").unwrap();

        assert_eq!(drafts[0].get(Field::Who), Some("Alice"));
        assert_eq!(drafts[0].get(Field::What), None);
    }

    #[test]
    fn long_rows_are_rejected() {
        let err = decode(b"who,what\nAlice,Paint,extra\n").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ImportParse);
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(decode(b"").unwrap_err().kind(), ErrorKind::ImportParse);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = decode(b"who,what\n\xff\xfe,paint\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ImportParse);
    }
}
