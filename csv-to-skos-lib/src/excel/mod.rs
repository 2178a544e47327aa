use calamine::{open_workbook_auto, Reader, Sheets};
use csv::WriterBuilder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::SkosError;

const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Whether the input should be read as a workbook instead of delimited text.
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub struct SpreadsheetReader {
    workbook: Sheets<BufReader<File>>,
}

impl SpreadsheetReader {
    pub fn open(path: &Path) -> Result<Self, SkosError> {
        let workbook = open_workbook_auto(path).map_err(|e| {
            SkosError::Spreadsheet(format!(
                "Failed to open workbook {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self { workbook })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// Render a sheet as comma-delimited CSV bytes, header row first.
    ///
    /// Without a sheet name the first sheet of the workbook is used.
    pub fn sheet_as_csv(&mut self, sheet_name: Option<&str>) -> Result<Vec<u8>, SkosError> {
        let sheet_name = match sheet_name {
            Some(name) => name.to_string(),
            None => self.sheet_names().into_iter().next().ok_or_else(|| {
                SkosError::Spreadsheet("Workbook does not contain any sheet".to_string())
            })?,
        };
        tracing::debug!("Reading sheet '{}'", sheet_name);

        let range = self.workbook.worksheet_range(&sheet_name).map_err(|e| {
            SkosError::Spreadsheet(format!("Sheet '{sheet_name}' not found in workbook: {e}"))
        })?;

        let mut writer = WriterBuilder::new().from_writer(vec![]);

        for row in range.rows() {
            let row_data: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            writer.write_record(&row_data)?;
        }

        writer.flush()?;

        writer
            .into_inner()
            .map_err(|e| SkosError::Spreadsheet(format!("Failed to get CSV data: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_spreadsheet() {
        assert!(is_spreadsheet(Path::new("data/MUN.xlsx")));
        assert!(is_spreadsheet(Path::new("data/MUN.ODS")));
        assert!(!is_spreadsheet(Path::new("data/MUN.csv")));
        assert!(!is_spreadsheet(Path::new("data/MUN")));
    }

    #[test]
    fn test_open_missing_workbook() {
        let result = SpreadsheetReader::open(Path::new("../test-data/does-not-exist.xlsx"));
        assert!(matches!(result, Err(SkosError::Spreadsheet(_))));
    }
}
