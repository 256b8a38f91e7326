use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook as XlsxWorkbook, Worksheet};
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result, StateError};
use crate::excel::{Cell, CellValue, FillPattern, Sheet, Style, Workbook};

const DEFAULT_DATE_FORMAT: &str = "yyyy-mm-dd";
const DEFAULT_DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Only the `.xlsx` package format is written, so other extensions are refused
/// instead of getting xlsx bytes under the wrong name.
pub fn ensure_xlsx_target(path: &Path) -> Result<()> {
    let is_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));

    if is_xlsx {
        Ok(())
    } else {
        Err(StateError::UnsupportedFormat(path.display().to_string()).into())
    }
}

impl Workbook {
    /// Writes the workbook as `.xlsx`. The file is written next to `path`
    /// and renamed over it, so a failed save leaves any existing file intact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        ensure_xlsx_target(path)?;
        let buffer = self.to_xlsx_buffer()?;

        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|e| Error::io(parent, e))?;
        temp.write_all(&buffer).map_err(|e| Error::io(temp.path(), e))?;
        temp.as_file().sync_all().map_err(|e| Error::io(temp.path(), e))?;
        temp.persist(path).map_err(|e| Error::io(path, e.error))?;

        log::info!(
            "Saved {} ({} sheet(s), {} bytes)",
            path.display(),
            self.sheet_count(),
            buffer.len()
        );
        Ok(())
    }

    pub fn to_xlsx_buffer(&self) -> Result<Vec<u8>> {
        let mut workbook = XlsxWorkbook::new();

        for (index, sheet) in self.sheets().enumerate() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            self.write_sheet(worksheet, sheet)?;

            if index == self.active_sheet_index() {
                worksheet.set_active(true);
            }
        }

        Ok(workbook.save_to_buffer()?)
    }

    fn write_sheet(&self, worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
        for (col, width) in sheet.column_widths() {
            worksheet.set_column_width((col - 1) as u16, width)?;
        }

        for (row, col, cell) in sheet.cells() {
            let row_idx = (row - 1) as u32;
            let col_idx = (col - 1) as u16;
            let format = self.cell_format(cell);

            match (&cell.value, format) {
                (CellValue::Empty, Some(format)) => {
                    worksheet.write_blank(row_idx, col_idx, &format)?;
                }
                (CellValue::Empty, None) => {}
                (CellValue::Text(s), Some(format)) => {
                    worksheet.write_string_with_format(row_idx, col_idx, s, &format)?;
                }
                (CellValue::Text(s), None) => {
                    worksheet.write_string(row_idx, col_idx, s)?;
                }
                (CellValue::Number(n), Some(format)) => {
                    worksheet.write_number_with_format(row_idx, col_idx, *n, &format)?;
                }
                (CellValue::Number(n), None) => {
                    worksheet.write_number(row_idx, col_idx, *n)?;
                }
                (CellValue::Boolean(b), Some(format)) => {
                    worksheet.write_boolean_with_format(row_idx, col_idx, *b, &format)?;
                }
                (CellValue::Boolean(b), None) => {
                    worksheet.write_boolean(row_idx, col_idx, *b)?;
                }
                (CellValue::Date(dt), format) => {
                    // Dates always need a number format or Excel shows the serial
                    let format = format.unwrap_or_else(|| date_format(dt));
                    worksheet.write_number_with_format(
                        row_idx,
                        col_idx,
                        excel_serial(dt),
                        &format,
                    )?;
                }
            }
        }

        if let Some((rows, cols)) = sheet.frozen_panes() {
            worksheet.set_freeze_panes(rows as u32, cols as u16)?;
        }

        if let Some((row, col)) = sheet.active_cell() {
            let (row, col) = ((row - 1) as u32, (col - 1) as u16);
            worksheet.set_selection(row, col, row, col)?;
        }

        Ok(())
    }

    fn cell_format(&self, cell: &Cell) -> Option<Format> {
        let style = cell.style.and_then(|id| self.style(id))?;
        if style.is_default() {
            return None;
        }

        let mut format = to_format(style);
        if style.num_format.is_none() {
            if let CellValue::Date(dt) = &cell.value {
                format = format.set_num_format(date_num_format(dt));
            }
        }

        Some(format)
    }
}

fn to_format(style: &Style) -> Format {
    let mut format = Format::new();

    if style.bold {
        format = format.set_bold();
    }

    if let Some(color) = style.font_color {
        format = format.set_font_color(Color::RGB(color));
    }

    if let Some(fill) = style.fill {
        let pattern = match fill.pattern {
            FillPattern::Solid => FormatPattern::Solid,
            FillPattern::LightGray => FormatPattern::LightGray,
            FillPattern::MediumGray => FormatPattern::MediumGray,
        };
        format = format
            .set_pattern(pattern)
            .set_foreground_color(Color::RGB(fill.foreground))
            .set_background_color(Color::RGB(fill.background));
    }

    if let Some(num_format) = &style.num_format {
        format = format.set_num_format(num_format);
    }

    format
}

fn date_num_format(dt: &NaiveDateTime) -> &'static str {
    if dt.time() == chrono::NaiveTime::MIN {
        DEFAULT_DATE_FORMAT
    } else {
        DEFAULT_DATETIME_FORMAT
    }
}

fn date_format(dt: &NaiveDateTime) -> Format {
    Format::new().set_num_format(date_num_format(dt))
}

/// Days since 1899-12-30, the epoch that absorbs Excel's phantom 1900-02-29.
/// Serials before March 1900 are therefore off by one, as they are in Excel.
fn excel_serial(dt: &NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or_default()
        .and_time(chrono::NaiveTime::MIN);
    (*dt - epoch).num_seconds() as f64 / 86_400.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_matches_excel() {
        let date = NaiveDate::from_ymd_opt(2017, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(excel_serial(&date), 42736.0);

        let noon = NaiveDate::from_ymd_opt(1900, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(excel_serial(&noon), 61.5);
    }

    #[test]
    fn buffer_is_a_zip_package() {
        let mut workbook = Workbook::new();
        let header = workbook.create_style(Style::header());
        let sheet = workbook.active_sheet_mut();
        sheet.set_value(1, 1, "Name").unwrap();
        sheet.set_style(1, 1, header).unwrap();
        sheet.set_style(1, 2, header).unwrap();
        sheet.freeze_panes(1, 6).unwrap();
        sheet.set_active_cell(2, 3).unwrap();

        let buffer = workbook.to_xlsx_buffer().unwrap();
        assert_eq!(&buffer[..2], b"PK");
    }

    #[test]
    fn only_xlsx_paths_are_saved() {
        let dir = tempfile::TempDir::new().unwrap();
        let workbook = Workbook::new();

        for name in ["book.ods", "book.xls", "book.xlsm", "book"] {
            let path = dir.path().join(name);
            let err = workbook.save(&path).unwrap_err();
            assert_eq!(
                err.as_state(),
                Some(&StateError::UnsupportedFormat(path.display().to_string()))
            );
            assert!(!path.exists());
        }

        let path = dir.path().join("book.XLSX");
        workbook.save(&path).unwrap();
        assert!(path.exists());
    }
}
