mod cell;
mod sheet;
mod style;
mod workbook;
mod writer;

pub use cell::{Cell, CellValue, parse_number};
pub use sheet::{Extent, Sheet};
pub use style::{Fill, FillPattern, Style, StyleId};
pub use workbook::{DEFAULT_SHEET_NAME, Workbook, validate_sheet_name};
pub use writer::ensure_xlsx_target;
