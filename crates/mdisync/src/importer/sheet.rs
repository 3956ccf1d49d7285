//! Workbook reading.
//!
//! The workbook is read once into a [`SheetTable`]; row extraction and
//! merging never touch calamine types.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDateTime;

use crate::config::ImportConfig;
use crate::error::ImportError;

/// One cell, reduced to the shapes the importer distinguishes.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Bool(bool),
    /// A spreadsheet error value such as `#REF!`.
    Error(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// 1-based row number in the sheet.
    pub number: usize,
    pub cells: Vec<Cell>,
}

/// The report body: the header row and every non-blank row below it.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

impl SheetTable {
    /// Builds the table from a grid whose first row is sheet row
    /// `first_row_number`. The header is the first row at or after
    /// `skip_rows` presentation rows.
    pub fn from_grid(
        grid: Vec<Vec<Cell>>,
        first_row_number: usize,
        sheet: &str,
        skip_rows: usize,
    ) -> Result<Self, ImportError> {
        // Presentation rows still to drop once the grid's own offset is
        // accounted for.
        let skip = (skip_rows + 1).saturating_sub(first_row_number);
        let mut numbered = grid
            .into_iter()
            .enumerate()
            .map(|(i, cells)| (first_row_number + i, cells))
            .skip(skip);

        let (_, header_cells) = numbered.next().ok_or_else(|| ImportError::MissingHeader {
            sheet: sheet.to_string(),
            skip_rows,
        })?;
        let headers = header_cells.iter().map(header_text).collect();

        let rows = numbered
            .filter(|(_, cells)| !cells.iter().all(Cell::is_empty))
            .map(|(number, cells)| SheetRow { number, cells })
            .collect();

        Ok(Self { headers, rows })
    }

    /// Column index of the header equal to `name` after trimming.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name.trim())
    }
}

fn header_text(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(n) => format_number(*n),
        Cell::Bool(b) => b.to_string(),
        Cell::Date(dt) => dt.to_string(),
        Cell::Empty | Cell::Error(_) => String::new(),
    }
}

/// Renders a number the way it reads in the sheet: integral values have
/// no trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Opens a workbook (xlsx, xlsm, xls, ods) and reads the configured sheet.
pub fn read_sheet(path: &Path, config: &ImportConfig) -> Result<SheetTable, ImportError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ImportError::OpenWorkbook {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if !workbook.sheet_names().iter().any(|s| s == &config.sheet_name) {
        return Err(ImportError::SheetNotFound(config.sheet_name.clone()));
    }

    let range = workbook
        .worksheet_range(&config.sheet_name)
        .map_err(|e| ImportError::OpenWorkbook {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    log::debug!(
        "Read sheet '{}' ({} x {})",
        config.sheet_name,
        range.height(),
        range.width()
    );

    let (grid, first_row_number) = range_to_grid(&range);
    SheetTable::from_grid(grid, first_row_number, &config.sheet_name, config.skip_rows)
}

/// Converts a calamine range to owned cells. Ranges start at their first
/// used cell, so the sheet row number of the first grid row is returned.
fn range_to_grid(range: &Range<Data>) -> (Vec<Vec<Cell>>, usize) {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let pad = start_col as usize;

    let grid = range
        .rows()
        .map(|row| {
            let mut cells = vec![Cell::Empty; pad];
            cells.extend(row.iter().map(convert));
            cells
        })
        .collect();

    (grid, start_row as usize + 1)
}

fn convert(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) => Cell::Date(dt),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Error(e.to_string()),
    }
}
