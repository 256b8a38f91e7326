use serde::Serialize;
use std::path::Path;

use crate::error::{Result, StateError};
use crate::excel::{CellValue, DEFAULT_SHEET_NAME, Style, Workbook, ensure_xlsx_target, parse_number};
use crate::import::reader::missing_header;
use crate::import::{DefaultSheetPolicy, ImportOptions, ImportRecord, RaggedRows, read_records};

/// What an import did to the workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub sheet: String,
    pub rows: usize,
    pub columns: usize,
    /// The sheet already existed and its previous content was discarded
    pub replaced_existing: bool,
    pub removed_default_sheet: bool,
}

/// Imports a tab-delimited text file into `sheet_name` of the workbook at
/// `workbook_path`, creating the workbook or the sheet when missing.
pub fn import_tab_delimited<P, Q>(text_path: P, workbook_path: Q, sheet_name: &str) -> Result<ImportSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    import_tab_delimited_with(text_path, workbook_path, sheet_name, &ImportOptions::default())
}

pub fn import_tab_delimited_with<P, Q>(
    text_path: P,
    workbook_path: Q,
    sheet_name: &str,
    options: &ImportOptions,
) -> Result<ImportSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let text_path = text_path.as_ref();
    let workbook_path = workbook_path.as_ref();
    ensure_xlsx_target(workbook_path)?;

    let records = read_records(text_path, options)?;
    let mut workbook = Workbook::open_or_create(workbook_path)?;

    let summary = import_records(&mut workbook, sheet_name, &records, options)?;
    workbook.save(workbook_path)?;

    log::info!(
        "Imported {} into {}!{} ({} rows x {} columns)",
        text_path.display(),
        workbook_path.display(),
        summary.sheet,
        summary.rows,
        summary.columns
    );

    Ok(summary)
}

/// Loads `records` into `sheet_name` and applies the header layout. The first
/// record is the header and fixes the column count. Blank records keep their
/// row empty.
pub fn import_records(
    workbook: &mut Workbook,
    sheet_name: &str,
    records: &[ImportRecord],
    options: &ImportOptions,
) -> Result<ImportSummary> {
    let column_count = match records.first() {
        Some(header) if !header.is_blank() => header.fields.len(),
        _ => return Err(missing_header("<records>")),
    };

    if options.ragged_rows == RaggedRows::Reject {
        if let Some(record) = records
            .iter()
            .find(|r| !r.is_blank() && r.fields.len() != column_count)
        {
            return Err(StateError::RaggedRow {
                line: record.line,
                expected: column_count,
                found: record.fields.len(),
            }
            .into());
        }
    }

    let had_default_sheet = workbook.contains_sheet(DEFAULT_SHEET_NAME);
    let replaced_existing = workbook.contains_sheet(sheet_name);

    if replaced_existing {
        log::debug!("Clearing existing sheet '{}'", sheet_name);
        workbook.select_sheet(sheet_name)?.clear_content();
    } else {
        workbook.add_sheet(sheet_name)?;
        workbook.select_sheet(sheet_name)?;
    }

    let header_style = workbook.create_style(Style::header());
    let sheet = workbook.active_sheet_mut();
    let target_name = sheet.name.clone();

    for (row_idx, record) in records.iter().enumerate() {
        let row = row_idx + 1;

        if record.fields.len() > column_count {
            log::warn!(
                "Line {} has {} fields, keeping the first {}",
                record.line,
                record.fields.len(),
                column_count
            );
        }

        for (col_idx, field) in record.fields.iter().take(column_count).enumerate() {
            sheet.set_value(row, col_idx + 1, field_value(field, row, options))?;
        }
    }

    sheet.set_range_style((1, 1), (1, column_count), header_style)?;

    for col in 1..=sheet.extent().last_column.max(column_count) {
        sheet.autofit_column(col)?;
    }

    if let Some((row, col)) = options.active_cell {
        sheet.set_active_cell(row, col)?;
    }

    let (freeze_rows, freeze_cols) = options.freeze_panes;
    sheet.freeze_panes(freeze_rows, freeze_cols)?;

    let extent = sheet.extent();
    let removed_default_sheet = had_default_sheet
        && !target_name.eq_ignore_ascii_case(DEFAULT_SHEET_NAME)
        && remove_default_sheet(workbook, options.default_sheet)?;

    Ok(ImportSummary {
        sheet: target_name,
        rows: extent.last_row,
        columns: extent.last_column,
        replaced_existing,
        removed_default_sheet,
    })
}

fn field_value(field: &str, row: usize, options: &ImportOptions) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }

    if row > 1 && options.detect_numbers {
        if let Some(number) = parse_number(field) {
            return CellValue::Number(number);
        }
    }

    CellValue::Text(field.to_string())
}

fn remove_default_sheet(workbook: &mut Workbook, policy: DefaultSheetPolicy) -> Result<bool> {
    let is_empty = workbook
        .sheet(DEFAULT_SHEET_NAME)
        .is_some_and(|sheet| sheet.is_empty());

    let remove = match policy {
        DefaultSheetPolicy::Remove => true,
        DefaultSheetPolicy::RemoveIfEmpty => is_empty,
        DefaultSheetPolicy::Keep => false,
    };

    if !remove {
        return Ok(false);
    }

    if workbook.sheet_count() <= 1 {
        log::warn!("Keeping '{}', it is the only sheet", DEFAULT_SHEET_NAME);
        return Ok(false);
    }

    let active = workbook.active_sheet().name.clone();
    workbook.remove_sheet(DEFAULT_SHEET_NAME)?;
    workbook.select_sheet(&active)?;

    log::debug!("Removed placeholder sheet '{}'", DEFAULT_SHEET_NAME);
    Ok(true)
}
