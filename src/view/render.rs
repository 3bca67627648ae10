//! Plain-text table rendering for the terminal

use super::form;
use crate::storage::record::{Record, Value};

const COLUMNS: &[(&str, &str)] = &[
    (form::FIELD_STUDENT_ID, "Student ID"),
    (form::FIELD_NAME, "Name"),
    (form::FIELD_COURSE, "Course"),
    (form::FIELD_YEAR_LEVEL, "Year Level"),
    (form::FIELD_EMAIL, "Email"),
];

/// The empty-state message shown instead of a table.
pub const EMPTY_MESSAGE: &str = "No students found.";

/// Render the student list as a numbered table with a count footer.
/// With zero records, the empty-state message replaces the table; the count
/// label is always present.
pub fn render_table(records: &[Record]) -> String {
    let mut out = String::new();

    if records.is_empty() {
        out.push_str(EMPTY_MESSAGE);
        out.push('\n');
    } else {
        let rows: Vec<Vec<String>> = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let mut row = vec![(i + 1).to_string()];
                row.extend(COLUMNS.iter().map(|(key, _)| cell(record, key)));
                row
            })
            .collect();

        let mut headers = vec!["#".to_string()];
        headers.extend(COLUMNS.iter().map(|(_, label)| label.to_string()));

        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                rows.iter()
                    .map(|row| row[col].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        push_row(&mut out, &headers, &widths);
        push_separator(&mut out, &widths);
        for row in &rows {
            push_row(&mut out, row, &widths);
        }
    }

    out.push('\n');
    out.push_str(&format!("Total Students: {}\n", records.len()));
    out
}

fn cell(record: &Record, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_json().to_string(),
        None => String::new(),
    }
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn push_separator(out: &mut String, widths: &[usize]) {
    let line: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line.join("  "));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::record::Fields;

    fn juan() -> Record {
        let mut record = Record::new("s-1", Fields::new());
        record
            .set("studentId", "2021-12345")
            .set("name", "Juan Dela Cruz")
            .set("course", "BS Computer Science")
            .set("yearLevel", "2nd Year")
            .set("email", "juan@g.msuiit.edu.ph");
        record
    }

    #[test]
    fn test_empty_state() {
        let output = render_table(&[]);
        assert!(output.contains(EMPTY_MESSAGE));
        assert!(output.contains("Total Students: 0"));
        assert!(!output.contains("Student ID"));
    }

    #[test]
    fn test_single_row() {
        let output = render_table(&[juan()]);
        assert!(output.contains("2021-12345"));
        assert!(output.contains("Juan Dela Cruz"));
        assert!(output.contains("BS Computer Science"));
        assert!(output.contains("2nd Year"));
        assert!(output.contains("juan@g.msuiit.edu.ph"));
        assert!(output.contains("Total Students: 1"));
        assert!(!output.contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_rows_are_numbered() {
        let mut second = juan();
        second.id = "s-2".to_string();
        second.set("name", "Maria Clara");
        let output = render_table(&[juan(), second]);
        assert!(output.lines().any(|l| l.starts_with('1')));
        assert!(output.lines().any(|l| l.starts_with('2')));
        assert!(output.contains("Total Students: 2"));
    }
}
