mod adapter;
mod options;
mod reader;

pub use adapter::{ImportSummary, import_records, import_tab_delimited, import_tab_delimited_with};
pub use options::{DefaultSheetPolicy, ImportOptions, RaggedRows};
pub use reader::{ImportRecord, read_records, read_records_from};
