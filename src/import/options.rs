use std::str::FromStr;

/// What to do with records whose field count differs from the header's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RaggedRows {
    /// Truncate long records to the header width; short ones stay short.
    #[default]
    Fit,
    /// Fail the import on the first mismatching record.
    Reject,
}

/// What to do with a `Sheet1` placeholder when importing into another sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultSheetPolicy {
    #[default]
    Remove,
    RemoveIfEmpty,
    Keep,
}

impl FromStr for RaggedRows {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fit" | "truncate" => Ok(RaggedRows::Fit),
            "reject" => Ok(RaggedRows::Reject),
            _ => Err(format!("Invalid ragged row policy: {s}")),
        }
    }
}

impl FromStr for DefaultSheetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remove" => Ok(DefaultSheetPolicy::Remove),
            "remove-if-empty" | "if-empty" => Ok(DefaultSheetPolicy::RemoveIfEmpty),
            "keep" => Ok(DefaultSheetPolicy::Keep),
            _ => Err(format!("Invalid default sheet policy: {s}")),
        }
    }
}

/// Options for importing delimited text
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Field delimiter (default: tab)
    pub delimiter: u8,
    /// Quote character; `None` splits on every delimiter (default)
    pub quote: Option<u8>,
    /// Write numeric data fields as numbers rather than text
    pub detect_numbers: bool,
    pub ragged_rows: RaggedRows,
    pub default_sheet: DefaultSheetPolicy,
    /// 1-based (row, col) selected after the import; default C2
    pub active_cell: Option<(usize, usize)>,
    /// Frozen (rows, cols); default keeps the header and six columns in view
    pub freeze_panes: (usize, usize),
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            quote: None,
            detect_numbers: true,
            ragged_rows: RaggedRows::Fit,
            default_sheet: DefaultSheetPolicy::Remove,
            active_cell: Some((2, 3)),
            freeze_panes: (1, 6),
        }
    }
}
