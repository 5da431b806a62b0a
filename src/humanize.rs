//! Turns tabular query results into labelled, human-readable chat text.

/// One result row as ordered (column, value) pairs. Field order follows the
/// result set's column order.
pub type Record = Vec<(String, String)>;

/// Reply used when a query returns zero rows.
pub const NO_DATA: &str = "No data found.";

/// Zip column names with each row to build per-row records.
pub fn records_from(columns: &[String], rows: &[Vec<String>]) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect::<Record>()
        })
        .collect()
}

/// Render records as a numbered, labelled text block.
///
/// A single record is rendered bare; only multi-record results get the
/// "1." / "2." index headers. Records are separated by a blank line.
pub fn humanize(records: &[Record]) -> String {
    if records.is_empty() {
        return NO_DATA.to_string();
    }

    let mut entries = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let mut lines = Vec::with_capacity(record.len() + 1);
        if records.len() != 1 {
            lines.push(format!("{}.", index + 1));
        }
        for (field, value) in record {
            lines.push(format!("{}: {}", field_label(field), value));
        }
        entries.push(lines.join("\n"));
    }
    entries.join("\n\n")
}

/// "user_name" → "User name". Underscores become spaces, first character is
/// uppercased, the rest lowercased.
fn field_label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
