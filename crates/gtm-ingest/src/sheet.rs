//! Workbook reading into plain string tables.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use crate::error::Result;

/// Sheet holding variable rows.
pub const VARIABLES_SHEET: &str = "Variables";
/// Sheet holding trigger rows.
pub const TRIGGERS_SHEET: &str = "Triggers";
/// Sheet holding tag rows.
pub const TAGS_SHEET: &str = "Tags";

/// One worksheet: a trimmed header row and the data rows below it.
///
/// Empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl SheetTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self {
            headers: headers
                .iter()
                .map(|header| normalize_header(header))
                .collect(),
            rows,
        }
    }

    /// Iterates data rows with header-based cell access.
    pub fn records(&self) -> impl Iterator<Item = SheetRecord<'_>> {
        self.rows.iter().map(move |cells| SheetRecord {
            headers: &self.headers,
            cells,
        })
    }
}

/// A data row viewed through its table's headers.
#[derive(Debug, Clone, Copy)]
pub struct SheetRecord<'a> {
    headers: &'a [String],
    cells: &'a [Option<String>],
}

impl<'a> SheetRecord<'a> {
    /// Cell under `column`, or `None` when the column or the value is absent.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|header| header == column)?;
        self.cells
            .get(index)
            .and_then(Option::as_deref)
            .filter(|value| !value.is_empty())
    }
}

/// Sheets found in a workbook; a missing sheet is `None`.
#[derive(Debug, Default)]
pub(crate) struct Workbook {
    pub variables: Option<SheetTable>,
    pub triggers: Option<SheetTable>,
    pub tags: Option<SheetTable>,
}

pub(crate) fn read_workbook(raw: &[u8]) -> Result<Workbook> {
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(raw.to_vec()))?;
    let names = sheets.sheet_names();
    tracing::debug!(sheets = ?names, "workbook opened");

    let mut read = |name: &str| -> Result<Option<SheetTable>> {
        if !names.iter().any(|sheet| sheet == name) {
            return Ok(None);
        }
        let range = sheets.worksheet_range(name)?;
        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|row| row.iter().map(|cell| cell_text(cell).unwrap_or_default()).collect())
            .unwrap_or_default();
        let rows = rows
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        Ok(Some(SheetTable::new(headers, rows)))
    };

    Ok(Workbook {
        variables: read(VARIABLES_SHEET)?,
        triggers: read(TRIGGERS_SHEET)?,
        tags: read(TAGS_SHEET)?,
    })
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Renders a cell as text. Integral numbers drop the fractional part.
pub(crate) fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(text) if text.is_empty() => None,
        Data::String(text) => Some(text.clone()),
        Data::Float(number) => Some(format_number(*number)),
        Data::Int(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

fn format_number(number: f64) -> String {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}
