// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reading variable names out of a workbook with calamine.

use crate::error::IngestError;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;

/// Sheet listing the model's input variables
pub const INPUTS_SHEET: &str = "INPUTS";

/// Sheet listing the model's output variables
pub const OUTPUTS_SHEET: &str = "OUTPUTS";

/// Header of the column holding variable names
pub const VARIABLE_NAME_COLUMN: &str = "variable_name";

/// Variable names read from the two required sheets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelVariables {
    /// Names from the INPUTS sheet, in row order
    pub inputs: Vec<String>,
    /// Names from the OUTPUTS sheet, in row order
    pub outputs: Vec<String>,
}

/// Open a workbook from memory and read both variable lists
pub fn read_variables(bytes: &[u8]) -> Result<ModelVariables, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| IngestError::Parse(e.to_string()))?;

    let found = workbook.sheet_names();
    let missing: Vec<String> = [INPUTS_SHEET, OUTPUTS_SHEET]
        .into_iter()
        .filter(|required| !found.iter().any(|name| name == required))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingSheets { missing, found });
    }

    let inputs = workbook
        .worksheet_range(INPUTS_SHEET)
        .map_err(|e| IngestError::Parse(e.to_string()))?;
    let outputs = workbook
        .worksheet_range(OUTPUTS_SHEET)
        .map_err(|e| IngestError::Parse(e.to_string()))?;

    Ok(ModelVariables {
        inputs: variable_names(&inputs),
        outputs: variable_names(&outputs),
    })
}

/// Values of the `variable_name` column below the header row.
///
/// Values are trimmed and blanks dropped; duplicates are kept.
pub fn variable_names(range: &Range<Data>) -> Vec<String> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let Some(column) = header
        .iter()
        .position(|cell| cell_text(cell).as_deref() == Some(VARIABLE_NAME_COLUMN))
    else {
        tracing::debug!("sheet has no {VARIABLE_NAME_COLUMN} column");
        return Vec::new();
    };

    rows.filter_map(|row| row.get(column).and_then(cell_text))
        .collect()
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(rows: &[&[&str]]) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(1) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let cell = if value.is_empty() {
                    Data::Empty
                } else {
                    Data::String((*value).to_string())
                };
                range.set_value((r as u32, c as u32), cell);
            }
        }
        range
    }

    #[test]
    fn test_reads_column_by_header() {
        let sheet = range(&[
            &["description", "variable_name"],
            &["Loan amount", " principal "],
            &["Blank row", ""],
            &["Rate", "rate"],
            &["Rate again", "rate"],
        ]);
        assert_eq!(variable_names(&sheet), vec!["principal", "rate", "rate"]);
    }

    #[test]
    fn test_missing_column_yields_nothing() {
        let sheet = range(&[&["name"], &["principal"]]);
        assert!(variable_names(&sheet).is_empty());
    }

    #[test]
    fn test_numbers_use_display_form() {
        let mut sheet = range(&[&["variable_name"], &[""]]);
        sheet.set_value((1, 0), Data::Int(42));
        assert_eq!(variable_names(&sheet), vec!["42"]);
    }

    #[test]
    fn test_garbage_bytes_fail_to_parse() {
        let err = read_variables(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)));
    }
}
