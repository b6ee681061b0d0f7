// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ingestion failures and their user-facing messages.

use thiserror::Error;

/// Why a spreadsheet could not be turned into model ports.
///
/// The `Display` text is what ends up on the node as its load error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// The file could not be read from disk
    #[error("Failed to read the file from disk.")]
    Read,

    /// The bytes are not a workbook calamine can open
    #[error("Could not parse file: {0}")]
    Parse(String),

    /// One or both required sheets are absent
    #[error(
        "Required sheet(s) not found: {}. Sheets in this file: {}.",
        .missing.join(" and "),
        present_sheets(.found)
    )]
    MissingSheets {
        /// Required sheet names that were not found, in canonical order
        missing: Vec<String>,
        /// Sheet names present in the workbook, in workbook order
        found: Vec<String>,
    },

    /// The file extension is not a spreadsheet format
    #[error("Unsupported file type: {0}. Expected a spreadsheet (.xlsx, .xlsm, .xlsb, .xls, .ods).")]
    UnsupportedFileType(String),
}

fn present_sheets(found: &[String]) -> String {
    if found.is_empty() {
        "(no sheets found)".to_string()
    } else {
        found.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_one_sheet_message() {
        let err = IngestError::MissingSheets {
            missing: vec!["OUTPUTS".into()],
            found: vec!["INPUTS".into()],
        };
        assert_eq!(
            err.to_string(),
            "Required sheet(s) not found: OUTPUTS. Sheets in this file: INPUTS."
        );
    }

    #[test]
    fn test_missing_both_sheets_message() {
        let err = IngestError::MissingSheets {
            missing: vec!["INPUTS".into(), "OUTPUTS".into()],
            found: vec!["Sheet1".into(), "Notes".into()],
        };
        assert_eq!(
            err.to_string(),
            "Required sheet(s) not found: INPUTS and OUTPUTS. Sheets in this file: Sheet1, Notes."
        );
    }

    #[test]
    fn test_no_sheets_message() {
        let err = IngestError::MissingSheets {
            missing: vec!["INPUTS".into(), "OUTPUTS".into()],
            found: vec![],
        };
        assert!(err.to_string().ends_with("Sheets in this file: (no sheets found)."));
    }

    #[test]
    fn test_read_and_parse_messages() {
        assert_eq!(IngestError::Read.to_string(), "Failed to read the file from disk.");
        assert_eq!(
            IngestError::Parse("bad zip".into()).to_string(),
            "Could not parse file: bad zip"
        );
    }
}
