//! Dashboard export
//!
//! Writes a static HTML + JSON snapshot of a collection under
//! `views/{collection}/`. A custom tera template at
//! `.roster/templates/{collection}.html` overrides the built-in table.

use std::path::PathBuf;
use tokio::fs;

use super::templates::{records_to_json, TemplateEngine};
use crate::error::{Error, Result};
use crate::Store;

/// Render and write `index.html` and `index.json` for a collection,
/// ordered by name for a stable page. Returns the output directory.
pub async fn export_dashboard(store: &Store, collection: &str) -> Result<PathBuf> {
    let records = store.query(collection, &[], Some("name"), None).await?;

    let output_dir = store.root().join("views").join(collection);
    fs::create_dir_all(&output_dir)
        .await
        .map_err(|source| Error::FileWriteError {
            path: output_dir.clone(),
            source,
        })?;

    // Custom template wins over the built-in table
    let templates_dir = store.root().join(".roster").join("templates");
    let mut engine = TemplateEngine::new(&templates_dir);
    let template_name = format!("{}.html", collection);
    let template = if engine.has_template(&template_name) {
        template_name.as_str()
    } else {
        engine.add_template("default", TemplateEngine::default_table_template())?;
        "default"
    };

    let html = engine.render(template, &records)?;
    let html_path = output_dir.join("index.html");
    fs::write(&html_path, html)
        .await
        .map_err(|source| Error::FileWriteError {
            path: html_path,
            source,
        })?;

    let json = serde_json::to_string_pretty(&records_to_json(&records))
        .map_err(|e| Error::Other(format!("JSON export error: {}", e)))?;
    let json_path = output_dir.join("index.json");
    fs::write(&json_path, json)
        .await
        .map_err(|source| Error::FileWriteError {
            path: json_path,
            source,
        })?;

    tracing::info!(collection, path = %output_dir.display(), "dashboard exported");
    Ok(output_dir)
}
