use calamine::{Data, Reader, open_workbook_auto};
use indexmap::IndexMap;
use std::path::Path;

use crate::error::{Error, Result, StateError};
use crate::excel::{CellValue, Sheet, Style, StyleId};

/// Name of the sheet every new workbook starts with.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Sheets are keyed by their lower-cased name so lookups are case-insensitive
/// without scanning; the map keeps tab order.
#[derive(Clone, Debug)]
pub struct Workbook {
    sheets: IndexMap<String, Sheet>,
    styles: Vec<Style>,
    active_sheet_index: usize,
}

fn sheet_key(name: &str) -> String {
    name.to_lowercase()
}

pub fn validate_sheet_name(name: &str) -> std::result::Result<(), StateError> {
    let invalid = |reason| StateError::InvalidSheetName {
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(invalid("name is longer than 31 characters"));
    }
    if name.contains(FORBIDDEN_SHEET_CHARS) {
        return Err(invalid("name contains one of [ ] : * ? / \\"));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(invalid("name starts or ends with an apostrophe"));
    }

    Ok(())
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// A fresh workbook holding the single placeholder sheet `Sheet1`.
    pub fn new() -> Self {
        let mut sheets = IndexMap::new();
        sheets.insert(
            sheet_key(DEFAULT_SHEET_NAME),
            Sheet::new(DEFAULT_SHEET_NAME),
        );

        Self {
            sheets,
            styles: Vec::new(),
            active_sheet_index: 0,
        }
    }

    /// Reads every sheet's values. Styles and layout are not read back.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        std::fs::metadata(path).map_err(|source| Error::io(path, source))?;

        let mut workbook = open_workbook_auto(path)?;
        let sheet_names = workbook.sheet_names().to_vec();

        let mut sheets = IndexMap::with_capacity(sheet_names.len());
        for name in &sheet_names {
            let range = workbook.worksheet_range(name)?;
            let sheet = create_sheet_from_range(name, &range)?;
            sheets.insert(sheet_key(name), sheet);
        }

        if sheets.is_empty() {
            return Err(StateError::NoSheets.into());
        }

        log::debug!("Opened {} with {} sheet(s)", path.display(), sheets.len());

        Ok(Self {
            sheets,
            styles: Vec::new(),
            active_sheet_index: 0,
        })
    }

    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            log::debug!("{} does not exist, starting a new workbook", path.display());
            Ok(Self::new())
        }
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.values().map(|sheet| sheet.name.clone()).collect()
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.values()
    }

    pub fn contains_sheet(&self, name: &str) -> bool {
        self.sheets.contains_key(&sheet_key(name))
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.get(&sheet_key(name))
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.get_mut(&sheet_key(name))
    }

    pub fn require_sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheet(name)
            .ok_or_else(|| StateError::SheetNotFound(name.to_string()).into())
    }

    pub fn require_sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheets
            .get_mut(&sheet_key(name))
            .ok_or_else(|| StateError::SheetNotFound(name.to_string()).into())
    }

    pub fn add_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        validate_sheet_name(name)?;

        let key = sheet_key(name);
        if self.sheets.contains_key(&key) {
            return Err(StateError::SheetExists(name.to_string()).into());
        }

        let (index, _) = self.sheets.insert_full(key, Sheet::new(name));
        Ok(&mut self.sheets[index])
    }

    /// Removes a sheet. The last remaining sheet can never be removed.
    pub fn remove_sheet(&mut self, name: &str) -> Result<Sheet> {
        let key = sheet_key(name);
        let Some(index) = self.sheets.get_index_of(&key) else {
            return Err(StateError::SheetNotFound(name.to_string()).into());
        };

        if self.sheets.len() <= 1 {
            return Err(StateError::SoleSheet(self.sheets[index].name.clone()).into());
        }

        let (_, sheet) = self
            .sheets
            .shift_remove_index(index)
            .ok_or_else(|| StateError::SheetNotFound(name.to_string()))?;

        // Adjust active sheet so it keeps pointing at the same tab, or the first if that one went away
        if self.active_sheet_index == index {
            self.active_sheet_index = 0;
        } else if self.active_sheet_index > index {
            self.active_sheet_index -= 1;
        }

        Ok(sheet)
    }

    pub fn rename_sheet(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        validate_sheet_name(new_name)?;

        let old_key = sheet_key(old_name);
        let new_key = sheet_key(new_name);
        let Some(index) = self.sheets.get_index_of(&old_key) else {
            return Err(StateError::SheetNotFound(old_name.to_string()).into());
        };

        if new_key != old_key && self.sheets.contains_key(&new_key) {
            return Err(StateError::SheetExists(new_name.to_string()).into());
        }

        let (_, mut sheet) = self
            .sheets
            .shift_remove_index(index)
            .ok_or_else(|| StateError::SheetNotFound(old_name.to_string()))?;
        sheet.name = new_name.to_string();
        self.sheets.shift_insert(index, new_key, sheet);

        Ok(())
    }

    pub fn select_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        let Some(index) = self.sheets.get_index_of(&sheet_key(name)) else {
            return Err(StateError::SheetNotFound(name.to_string()).into());
        };

        self.active_sheet_index = index;
        Ok(&mut self.sheets[index])
    }

    pub fn active_sheet_index(&self) -> usize {
        self.active_sheet_index
    }

    pub fn active_sheet(&self) -> &Sheet {
        &self.sheets[self.active_sheet_index]
    }

    pub fn active_sheet_mut(&mut self) -> &mut Sheet {
        &mut self.sheets[self.active_sheet_index]
    }

    /// Registers a style so it can be applied to cells of any sheet.
    pub fn create_style(&mut self, style: Style) -> StyleId {
        if let Some(index) = self.styles.iter().position(|s| s == &style) {
            return StyleId(index);
        }

        self.styles.push(style);
        StyleId(self.styles.len() - 1)
    }

    pub fn style(&self, id: StyleId) -> Option<&Style> {
        self.styles.get(id.0)
    }
}

fn create_sheet_from_range(name: &str, range: &calamine::Range<Data>) -> Result<Sheet> {
    let mut sheet = Sheet::new(name);

    // used_cells() is relative to the range start, which need not be A1
    let (start_row, start_col) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or_default();

    for (row_idx, col_idx, cell) in range.used_cells() {
        let value = match cell {
            Data::Empty => continue,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Boolean(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(datetime) => CellValue::Date(datetime),
                None => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(format!("Error: {:?}", e)),
        };

        sheet.set_value(
            start_row + row_idx + 1,
            start_col + col_idx + 1,
            value,
        )?;
    }

    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn new_workbook_has_placeholder_sheet() {
        let workbook = Workbook::new();
        assert_eq!(workbook.sheet_names(), vec!["Sheet1".to_string()]);
        assert!(workbook.contains_sheet("SHEET1"));
    }

    #[test]
    fn sheet_lookup_ignores_case_and_keeps_original_name() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("Customers").unwrap();

        assert!(workbook.contains_sheet("customers"));
        assert_eq!(workbook.sheet("CUSTOMERS").unwrap().name, "Customers");

        let err = workbook.add_sheet("customers").unwrap_err();
        assert_eq!(
            err.as_state(),
            Some(&StateError::SheetExists("customers".to_string()))
        );
    }

    #[test]
    fn removing_the_sole_sheet_is_rejected() {
        let mut workbook = Workbook::new();
        let err = workbook.remove_sheet("sheet1").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::State);
        assert_eq!(
            err.as_state(),
            Some(&StateError::SoleSheet("Sheet1".to_string()))
        );
        assert_eq!(workbook.sheet_count(), 1);
    }

    #[test]
    fn removing_the_active_sheet_selects_another() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("A").unwrap();
        workbook.add_sheet("B").unwrap();
        workbook.select_sheet("b").unwrap();

        workbook.remove_sheet("Sheet1").unwrap();
        assert_eq!(workbook.active_sheet().name, "B");

        workbook.remove_sheet("B").unwrap();
        assert_eq!(workbook.active_sheet().name, "A");
        assert_eq!(workbook.sheet_names(), vec!["A".to_string()]);
    }

    #[test]
    fn rename_keeps_position() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("Other").unwrap();
        workbook.rename_sheet("sheet1", "Data").unwrap();

        assert_eq!(
            workbook.sheet_names(),
            vec!["Data".to_string(), "Other".to_string()]
        );
        assert!(workbook.rename_sheet("Data", "OTHER").is_err());
        workbook.rename_sheet("Data", "DATA").unwrap();
        assert_eq!(workbook.sheet_names()[0], "DATA");
    }

    #[test]
    fn invalid_sheet_names_are_rejected() {
        let mut workbook = Workbook::new();
        for name in ["", "a/b", "'quoted'", "x".repeat(32).as_str()] {
            let err = workbook.add_sheet(name).unwrap_err();
            assert!(
                matches!(err.as_state(), Some(StateError::InvalidSheetName { .. })),
                "{name}"
            );
        }
    }

    #[test]
    fn identical_styles_share_an_id() {
        let mut workbook = Workbook::new();
        let a = workbook.create_style(Style::header());
        let b = workbook.create_style(Style::header());
        let c = workbook.create_style(Style::new());

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(workbook.style(a).unwrap().bold);
    }
}
