//! Template engine for the dashboard export

use std::path::Path;
use tera::{Context, Tera};

use crate::error::{Error, Result};
use crate::storage::record::Record;

/// Template engine wrapper
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine loading templates from a directory
    pub fn new(templates_dir: &Path) -> Self {
        let pattern = templates_dir.join("**/*.html").display().to_string();
        let tera = Tera::new(&pattern).unwrap_or_else(|_| Tera::default());
        Self { tera }
    }

    /// Create an empty template engine
    pub fn empty() -> Self {
        Self {
            tera: Tera::default(),
        }
    }

    /// Whether a template with the given name is registered
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Add a template from a string
    pub fn add_template(&mut self, name: &str, content: &str) -> Result<()> {
        self.tera
            .add_raw_template(name, content)
            .map_err(|e| Error::Other(format!("Template error: {}", e)))?;
        Ok(())
    }

    /// Render a template with records
    pub fn render(&self, template_name: &str, records: &[Record]) -> Result<String> {
        let mut context = Context::new();
        context.insert("students", &records_to_json(records));
        context.insert("count", &records.len());

        self.tera
            .render(template_name, &context)
            .map_err(|e| Error::Other(format!("Template error: {}", e)))
    }

    /// The built-in student table template
    pub fn default_table_template() -> &'static str {
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Student Records</title>
    <style>
        body { font-family: system-ui, sans-serif; max-width: 900px; margin: 2rem auto; padding: 0 1rem; }
        table { border-collapse: collapse; width: 100%; }
        th, td { text-align: left; padding: 0.5rem 0.75rem; border-bottom: 1px solid #eee; }
        th { border-bottom: 2px solid #ccc; }
        .empty { color: #666; font-style: italic; }
        .count { color: #666; font-size: 0.9rem; }
    </style>
</head>
<body>
    <h1>Student Records</h1>

    {% if count == 0 %}
    <p class="empty">No students found.</p>
    {% else %}
    <table>
        <thead>
            <tr>
                <th>Student ID</th>
                <th>Name</th>
                <th>Course</th>
                <th>Year Level</th>
                <th>Email</th>
            </tr>
        </thead>
        <tbody>
            {% for s in students %}
            <tr>
                <td>{{ s.studentId | default(value="") }}</td>
                <td>{{ s.name | default(value="") }}</td>
                <td>{{ s.course | default(value="") }}</td>
                <td>{{ s.yearLevel | default(value="") }}</td>
                <td>{{ s.email | default(value="") }}</td>
            </tr>
            {% endfor %}
        </tbody>
    </table>
    {% endif %}

    <p class="count">Total Students: {{ count }}</p>
</body>
</html>"#
    }
}

/// Convert records to JSON-serializable form, id and timestamps included
pub fn records_to_json(records: &[Record]) -> Vec<serde_json::Value> {
    records.iter().map(Record::to_json).collect()
}
