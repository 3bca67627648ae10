//! Collection - a group of records stored in a directory
//!
//! Each collection is a directory containing one YAML file per record.
//! Collections are pure namespaces: reading a collection that was never
//! written to yields no records rather than an error.
//!
//! Directory structure:
//! ```text
//! /collections/
//!   /students/
//!     550e8400-e29b-41d4-a716-446655440000.yaml
//!     2021-12345.yaml
//!   /courses/
//!     bs-computer-science.yaml
//! ```

use super::record::{Record, StoredRecord};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// A collection of records
#[derive(Debug, Clone)]
pub struct Collection {
    /// Name of the collection (directory name)
    pub name: String,
    /// Path to the collection directory
    pub path: PathBuf,
}

impl Collection {
    /// Open a collection at the given path
    pub fn open(name: impl Into<String>, base_path: &Path) -> Self {
        let name = name.into();
        let path = base_path.join("collections").join(&name);
        Self { name, path }
    }

    /// Create the collection directory if it doesn't exist
    pub async fn ensure_exists(&self) -> Result<()> {
        fs::create_dir_all(&self.path)
            .await
            .map_err(|source| Error::FileWriteError {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }

    /// List all records in the collection, in directory order
    pub async fn list(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();

        if !self.path.exists() {
            return Ok(records);
        }

        for entry in WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.extension().map(|e| e == "yaml").unwrap_or(false) {
                records.push(self.read_record(path).await?);
            }
        }

        Ok(records)
    }

    /// Read a single record by ID
    pub async fn get(&self, id: &str) -> Result<Option<Record>> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }
        self.read_record(&path).await.map(Some)
    }

    /// Write a record, creating or fully replacing the file
    pub async fn write(&self, record: &Record) -> Result<()> {
        self.ensure_exists().await?;
        let path = self.record_path(&record.id);

        let content = serde_yaml::to_string(&StoredRecord::from_record(record)).map_err(|e| {
            Error::YamlSerializeError {
                message: e.to_string(),
            }
        })?;
        fs::write(&path, content)
            .await
            .map_err(|source| Error::FileWriteError { path, source })?;
        Ok(())
    }

    /// Delete a record by ID; returns whether a record existed
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let path = self.record_path(id);
        if path.exists() {
            fs::remove_file(&path)
                .await
                .map_err(|source| Error::FileWriteError { path, source })?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Count records in the collection
    pub async fn count(&self) -> Result<usize> {
        let records = self.list().await?;
        Ok(records.len())
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.path.join(format!("{}.yaml", id))
    }

    /// Read a record from a path
    async fn read_record(&self, path: &Path) -> Result<Record> {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Other(format!("Invalid record path: {}", path.display())))?;

        let content = fs::read_to_string(path)
            .await
            .map_err(|source| Error::FileReadError {
                path: path.to_path_buf(),
                source,
            })?;
        let stored: StoredRecord = serde_yaml::from_str(&content)?;

        Ok(stored.into_record(id))
    }
}
