use serde::Serialize;
use std::path::PathBuf;

use crate::error::Result;
use crate::excel::{Sheet, Workbook};
use crate::utils::index_to_col_name;

/// What to look for, and where.
#[derive(Debug, Clone)]
pub struct SearchItem {
    pub file_name: PathBuf,
    pub sheet_name: String,
    pub token: String,
    pub case_sensitive: bool,
    /// Match the whole cell rather than any substring of it
    pub whole_cell: bool,
}

impl SearchItem {
    pub fn new(file_name: impl Into<PathBuf>, sheet_name: &str, token: &str) -> Self {
        Self {
            file_name: file_name.into(),
            sheet_name: sheet_name.to_string(),
            token: token.to_string(),
            case_sensitive: true,
            whole_cell: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundItem {
    pub row: usize,
    pub column: usize,
    pub column_name: String,
}

pub fn find_text(item: &SearchItem) -> Result<Vec<FoundItem>> {
    let workbook = Workbook::open(&item.file_name)?;
    let sheet = workbook.require_sheet(&item.sheet_name)?;

    let found = find_in_sheet(sheet, item);
    log::debug!(
        "Found {} match(es) for '{}' in {}",
        found.len(),
        item.token,
        sheet.name
    );

    Ok(found)
}

/// Column by column, top to bottom, over the used range.
pub fn find_in_sheet(sheet: &Sheet, item: &SearchItem) -> Vec<FoundItem> {
    let extent = sheet.extent();
    let token = if item.case_sensitive {
        item.token.clone()
    } else {
        item.token.to_lowercase()
    };

    let mut results = Vec::new();

    for col in 1..=extent.last_column {
        for row in 1..=extent.last_row {
            let Some(value) = sheet.value(row, col) else {
                continue;
            };

            let mut content = value.to_display_string();
            if !item.case_sensitive {
                content = content.to_lowercase();
            }

            let matched = if item.whole_cell {
                content == token
            } else {
                content.contains(&token)
            };

            if matched {
                results.push(FoundItem {
                    row,
                    column: col,
                    column_name: index_to_col_name(col),
                });
            }
        }
    }

    results
}
