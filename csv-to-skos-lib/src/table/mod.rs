use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::SkosError;
use crate::excel::{is_spreadsheet, SpreadsheetReader};

/// Cell contents treated the same as an empty cell.
pub const NULL_MARKERS: [&str; 10] = [
    "NaN", "nan", "NA", "N/A", "n/a", "NULL", "null", "None", "#N/A", "<NA>",
];

pub fn is_missing(value: &str) -> bool {
    value.is_empty() || NULL_MARKERS.contains(&value)
}

/// The whole input, held in memory.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<StringRecord>,
}

impl Table {
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, SkosError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        tracing::debug!("CSV headers: {:?}", headers);

        let records = rdr.records().collect::<Result<Vec<_>, _>>()?;

        Ok(Self { headers, records })
    }

    /// Read a delimited file, or the given sheet of a workbook.
    pub fn from_path(
        path: &Path,
        delimiter: u8,
        sheet_name: Option<&str>,
    ) -> Result<Self, SkosError> {
        tracing::debug!("Reading tabular data from {:?}", path);
        if is_spreadsheet(path) {
            let bytes = SpreadsheetReader::open(path)?.sheet_as_csv(sheet_name)?;
            return Self::from_reader(bytes.as_slice(), b',');
        }
        Self::from_reader(open_csv(path)?, delimiter)
    }

    /// Read only the header row.
    pub fn headers_from_path(
        path: &Path,
        delimiter: u8,
        sheet_name: Option<&str>,
    ) -> Result<Vec<String>, SkosError> {
        if is_spreadsheet(path) {
            return Ok(Self::from_path(path, delimiter, sheet_name)?.headers);
        }
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(open_csv(path)?);
        Ok(rdr.headers()?.iter().map(|h| h.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.records.iter().enumerate().map(|(i, record)| Row {
            headers: &self.headers,
            record,
            number: i + 1,
        })
    }
}

fn open_csv(path: &Path) -> Result<File, SkosError> {
    File::open(path).map_err(|e| {
        SkosError::Configuration(format!(
            "Invalid CSV file path: '{}' ({})",
            path.display(),
            e
        ))
    })
}

/// One data row seen through the header row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    headers: &'a [String],
    record: &'a StringRecord,
    number: usize,
}

impl<'a> Row<'a> {
    pub fn new(headers: &'a [String], record: &'a StringRecord, number: usize) -> Self {
        Self {
            headers,
            record,
            number,
        }
    }

    /// 1-based position among the data rows.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.record.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reader_with_separator() {
        let data = "label;definition\nA;D1\nB;\n";
        let table = Table::from_reader(data.as_bytes(), b';').unwrap();
        assert_eq!(table.headers, vec!["label", "definition"]);
        assert_eq!(table.len(), 2);

        let rows: Vec<Row> = table.rows().collect();
        assert_eq!(rows[0].get("label"), Some("A"));
        assert_eq!(rows[1].get("definition"), Some(""));
        assert_eq!(rows[1].number(), 2);
        assert_eq!(rows[1].get("unknown"), None);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let data = "label,definition\nA,D1,extra\n";
        let result = Table::from_reader(data.as_bytes(), b',');
        assert!(matches!(result, Err(SkosError::Csv(_))));
    }

    #[test]
    fn test_missing_markers() {
        assert!(is_missing(""));
        assert!(is_missing("NaN"));
        assert!(is_missing("nan"));
        assert!(is_missing("N/A"));
        assert!(!is_missing("0"));
        assert!(!is_missing("Nantes"));
    }

    #[test]
    fn test_missing_file_is_a_configuration_error() {
        let path = Path::new("../test-data/nope.csv");
        let result = Table::from_path(path, b',', None);
        assert!(matches!(result, Err(SkosError::Configuration(_))));

        let result = Table::headers_from_path(path, b',', None);
        assert!(matches!(result, Err(SkosError::Configuration(_))));
    }

    const WORKBOOK: &str = "../test-data/municipalites.xlsx";

    #[test]
    fn test_workbook_first_sheet_by_default() {
        let table = Table::from_path(Path::new(WORKBOOK), b';', None).unwrap();
        assert_eq!(table.headers, vec!["munnom", "mdes", "regadm"]);
        assert_eq!(table.len(), 3);

        let rows: Vec<Row> = table.rows().collect();
        assert_eq!(rows[1].get("munnom"), Some("Sept-Îles"));
        assert_eq!(rows[2].get("regadm"), Some("Gaspésie"));
    }

    #[test]
    fn test_workbook_named_sheet() {
        let path = Path::new(WORKBOOK);
        let table = Table::from_path(path, b',', Some("Regions")).unwrap();
        assert_eq!(table.headers, vec!["region", "mrc", "munnom"]);
        assert_eq!(table.rows().next().unwrap().get("mrc"), Some("Manicouagan"));

        let headers = Table::headers_from_path(path, b',', Some("Regions")).unwrap();
        assert_eq!(headers, table.headers);
    }

    #[test]
    fn test_workbook_missing_sheet() {
        let result = Table::from_path(Path::new(WORKBOOK), b',', Some("Absente"));
        assert!(matches!(result, Err(SkosError::Spreadsheet(_))));
    }
}
