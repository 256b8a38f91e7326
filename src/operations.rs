//! One-shot helpers that open a workbook file, do one thing, and save when
//! something changed.

use std::path::Path;

use crate::error::{Result, StateError};
use crate::excel::{CellValue, DEFAULT_SHEET_NAME, Extent, Workbook};
use crate::utils::{col_name_to_index, parse_cell_reference};

/// Creates a new workbook file. With `sheet_name` the default `Sheet1` is
/// renamed to it.
pub fn create_new_file<P: AsRef<Path>>(path: P, sheet_name: Option<&str>) -> Result<()> {
    let mut workbook = Workbook::new();

    if let Some(name) = sheet_name {
        workbook.rename_sheet(DEFAULT_SHEET_NAME, name)?;
    }

    workbook.save(path)
}

/// Adds `sheet_name` unless a sheet with that name (any case) exists.
/// Returns whether the sheet was added.
pub fn add_new_sheet<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<bool> {
    let path = path.as_ref();
    let mut workbook = Workbook::open(path)?;

    if workbook.contains_sheet(sheet_name) {
        log::debug!("Sheet '{}' already exists in {}", sheet_name, path.display());
        return Ok(false);
    }

    workbook.add_sheet(sheet_name)?;
    workbook.save(path)?;
    Ok(true)
}

/// Removes `sheet_name` if present. Returns whether a sheet was removed;
/// removing the sole sheet is an error.
pub fn remove_worksheet<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<bool> {
    let path = path.as_ref();
    let mut workbook = Workbook::open(path)?;

    if !workbook.contains_sheet(sheet_name) {
        return Ok(false);
    }

    workbook.remove_sheet(sheet_name)?;
    workbook.save(path)?;
    Ok(true)
}

/// Writes `value` to the A1-style `cell` of an existing sheet.
pub fn set_cell_value<P: AsRef<Path>>(
    path: P,
    sheet_name: &str,
    cell: &str,
    value: impl Into<CellValue>,
) -> Result<()> {
    let path = path.as_ref();
    let (row, col) = parse_cell_reference(cell)?;

    let mut workbook = Workbook::open(path)?;
    workbook
        .require_sheet_mut(sheet_name)?
        .set_value(row, col, value)?;
    workbook.save(path)
}

pub fn last_row<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<usize> {
    Ok(last_row_column(path, sheet_name)?.last_row)
}

pub fn last_row_column<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Extent> {
    let workbook = Workbook::open(path)?;
    Ok(workbook.require_sheet(sheet_name)?.extent())
}

/// Letters of the used columns, e.g. `["A", "B", "C"]`.
pub fn used_columns<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Vec<String>> {
    let workbook = Workbook::open(path)?;
    Ok(workbook.require_sheet(sheet_name)?.used_column_names())
}

pub fn sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    Ok(Workbook::open(path)?.sheet_names())
}

pub fn sheet_exists<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<bool> {
    Ok(Workbook::open(path)?.contains_sheet(sheet_name))
}

/// Every value of `column` (a letter name such as `A`) down to the last used row.
pub fn column_values<P: AsRef<Path>>(path: P, sheet_name: &str, column: &str) -> Result<Vec<String>> {
    let col = col_name_to_index(column)
        .ok_or_else(|| StateError::InvalidCellReference(column.to_string()))?;

    let workbook = Workbook::open(path)?;
    Ok(workbook.require_sheet(sheet_name)?.column_values(col))
}
