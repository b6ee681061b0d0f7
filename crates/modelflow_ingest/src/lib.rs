// SPDX-License-Identifier: MIT OR Apache-2.0
//! Spreadsheet ingestion for modelflow.
//!
//! A model workbook declares its variables on two sheets, `INPUTS` and
//! `OUTPUTS`, each with a `variable_name` column. Ingestion never fails: every
//! problem is reported through [`IngestResult::error`] so the caller can still
//! create (or keep) a node for the file.

pub mod error;
pub mod workbook;

pub use error::IngestError;
pub use workbook::{read_variables, ModelVariables, INPUTS_SHEET, OUTPUTS_SHEET, VARIABLE_NAME_COLUMN};

use serde::Serialize;
use std::path::Path;

/// File extensions accepted as spreadsheets
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Outcome of ingesting one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestResult {
    /// Name of the source file
    pub filename: String,
    /// Input variable names, in row order
    pub inputs: Vec<String>,
    /// Output variable names, in row order
    pub outputs: Vec<String>,
    /// Human-readable error, if ingestion failed
    pub error: Option<String>,
}

impl IngestResult {
    fn failed(filename: String, error: &IngestError) -> Self {
        Self {
            filename,
            inputs: Vec::new(),
            outputs: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    /// Whether ingestion succeeded
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Check whether a path has a spreadsheet extension
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Ingest a workbook already in memory
pub fn ingest_bytes(filename: impl Into<String>, bytes: &[u8]) -> IngestResult {
    let filename = filename.into();
    match read_variables(bytes) {
        Ok(ModelVariables { inputs, outputs }) => {
            tracing::debug!(
                file = %filename,
                inputs = inputs.len(),
                outputs = outputs.len(),
                "ingested workbook"
            );
            IngestResult {
                filename,
                inputs,
                outputs,
                error: None,
            }
        }
        Err(err) => {
            tracing::warn!(file = %filename, "ingestion failed: {err}");
            IngestResult::failed(filename, &err)
        }
    }
}

/// Read and ingest a workbook from disk
pub fn ingest_path(path: &Path) -> IngestResult {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if !is_supported(path) {
        let err = IngestError::UnsupportedFileType(filename.clone());
        tracing::warn!(path = %path.display(), "{err}");
        return IngestResult::failed(filename, &err);
    }

    match std::fs::read(path) {
        Ok(bytes) => ingest_bytes(filename, &bytes),
        Err(e) => {
            tracing::warn!(path = %path.display(), "failed to read workbook: {e}");
            IngestResult::failed(filename, &IngestError::Read)
        }
    }
}
