use crate::error::SkosError;
use crate::table::{is_missing, Row};
use crate::types::{ColumnSpec, Columns};

/// Separator placed between the values of a multi-column field.
pub const VALUE_SEPARATOR: &str = " - ";

impl ColumnSpec {
    /// Turn the column selection into an ordered list of names.
    ///
    /// Text selections lose all whitespace before being split on commas, so an
    /// empty string yields the `[""]` sentinel.
    pub fn normalize(&self) -> Columns {
        match self {
            ColumnSpec::Text(text) => {
                let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                Columns::new(compact.split(',').map(String::from).collect())
            }
            ColumnSpec::List(names) => Columns::new(names.clone()),
        }
    }
}

/// Join the non-missing values of `columns` in `row`.
///
/// Unset columns produce an empty string; a column absent from the header
/// row is an error.
pub fn clean(columns: Option<&Columns>, row: &Row) -> Result<String, SkosError> {
    let columns = match columns {
        Some(columns) if !columns.is_unset() => columns,
        _ => return Ok(String::new()),
    };

    let mut values = Vec::with_capacity(columns.names().len());
    for column in columns.names() {
        if !row.has_column(column) {
            return Err(SkosError::MissingColumn {
                column: column.clone(),
                row: row.number(),
            });
        }
        if let Some(value) = row.get(column) {
            if !is_missing(value) {
                values.push(value);
            }
        }
    }

    Ok(values.join(VALUE_SEPARATOR))
}
