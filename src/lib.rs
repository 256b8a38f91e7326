pub mod error;
pub mod excel;
pub mod import;
pub mod operations;
pub mod search;
pub mod utils;

pub use error::{Error, ErrorKind, LibraryError, Result, StateError};
pub use excel::{CellValue, Extent, Workbook};
pub use import::{ImportOptions, ImportSummary, import_tab_delimited, import_tab_delimited_with};
pub use search::{FoundItem, SearchItem, find_text};
