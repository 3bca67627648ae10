//! Form state for the record management screen
//!
//! Mirrors the record shape minus store-managed fields. Constraints here are
//! view-layer only: the store accepts any field map.

use crate::storage::record::{Fields, Record, Value};

/// Year-level labels offered by the form.
pub const YEAR_LEVELS: &[&str] = &["1st Year", "2nd Year", "3rd Year", "4th Year", "5th Year"];

pub const FIELD_STUDENT_ID: &str = "studentId";
pub const FIELD_NAME: &str = "name";
pub const FIELD_COURSE: &str = "course";
pub const FIELD_YEAR_LEVEL: &str = "yearLevel";
pub const FIELD_EMAIL: &str = "email";

/// The editable fields of one student record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentForm {
    pub student_id: String,
    pub name: String,
    pub course: String,
    pub year_level: String,
    pub email: String,
}

impl StudentForm {
    /// Populate the form from a row's current values.
    pub fn from_record(record: &Record) -> Self {
        let text = |key: &str| {
            record
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            student_id: text(FIELD_STUDENT_ID),
            name: text(FIELD_NAME),
            course: text(FIELD_COURSE),
            year_level: text(FIELD_YEAR_LEVEL),
            email: text(FIELD_EMAIL),
        }
    }

    /// The field map this form submits.
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(FIELD_STUDENT_ID.into(), self.student_id.trim().into());
        fields.insert(FIELD_NAME.into(), self.name.trim().into());
        fields.insert(FIELD_COURSE.into(), self.course.trim().into());
        fields.insert(FIELD_YEAR_LEVEL.into(), self.year_level.trim().into());
        fields.insert(FIELD_EMAIL.into(), self.email.trim().into());
        fields
    }

    /// Discard all entered values.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Required-ness plus the year-level label set. Returns the message to
    /// surface when the form cannot be submitted.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            (FIELD_STUDENT_ID, &self.student_id, "Student ID"),
            (FIELD_NAME, &self.name, "Name"),
            (FIELD_COURSE, &self.course, "Course"),
            (FIELD_YEAR_LEVEL, &self.year_level, "Year Level"),
            (FIELD_EMAIL, &self.email, "Email"),
        ];
        for (_, value, label) in required {
            if value.trim().is_empty() {
                return Err(format!("{} is required", label));
            }
        }
        if !YEAR_LEVELS.contains(&self.year_level.trim()) {
            return Err(format!(
                "Year Level must be one of: {}",
                YEAR_LEVELS.join(", ")
            ));
        }
        Ok(())
    }
}
