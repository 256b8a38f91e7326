use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::StateError;
use crate::excel::{Cell, CellValue, StyleId};
use crate::utils::{MAX_COLS, MAX_ROWS, index_to_col_name};

/// Excel refuses column widths above this.
const MAX_COLUMN_WIDTH: f64 = 255.0;
const MIN_COLUMN_WIDTH: usize = 3;
const COLUMN_PADDING: f64 = 2.0;

/// Last used row and column of a sheet, both 0 when the sheet is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Extent {
    pub last_row: usize,
    pub last_column: usize,
}

/// A worksheet grid. `data` is indexed 1-based; row 0 and column 0 are padding.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub name: String,
    data: Vec<Vec<Cell>>,
    max_rows: usize,
    max_cols: usize,
    column_widths: BTreeMap<usize, f64>,
    freeze_panes: Option<(usize, usize)>,
    active_cell: Option<(usize, usize)>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: vec![vec![Cell::empty(); 1]; 1],
            max_rows: 0,
            max_cols: 0,
            column_widths: BTreeMap::new(),
            freeze_panes: None,
            active_cell: None,
        }
    }

    pub fn extent(&self) -> Extent {
        Extent {
            last_row: self.max_rows,
            last_column: self.max_cols,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max_rows == 0
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.data.get(row).and_then(|r| r.get(col))
    }

    pub fn value(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.cell(row, col)
            .map(|cell| &cell.value)
            .filter(|value| !value.is_empty())
    }

    pub fn value_as_string(&self, row: usize, col: usize) -> String {
        self.value(row, col)
            .map(CellValue::to_display_string)
            .unwrap_or_default()
    }

    pub fn style(&self, row: usize, col: usize) -> Option<StyleId> {
        self.cell(row, col).and_then(|cell| cell.style)
    }

    pub fn set_value(
        &mut self,
        row: usize,
        col: usize,
        value: impl Into<CellValue>,
    ) -> Result<(), StateError> {
        check_bounds(row, col)?;
        let value = value.into();

        if value.is_empty() && self.cell(row, col).is_none() {
            return Ok(());
        }

        self.ensure_cell_exists(row, col);
        self.data[row][col].value = value;

        if self.data[row][col].value.is_empty() {
            self.recalculate_extent();
        } else {
            self.max_rows = self.max_rows.max(row);
            self.max_cols = self.max_cols.max(col);
        }

        Ok(())
    }

    pub fn set_style(&mut self, row: usize, col: usize, style: StyleId) -> Result<(), StateError> {
        check_bounds(row, col)?;
        self.ensure_cell_exists(row, col);
        self.data[row][col].style = Some(style);
        Ok(())
    }

    /// Applies `style` to every cell of the inclusive rectangle.
    pub fn set_range_style(
        &mut self,
        (first_row, first_col): (usize, usize),
        (last_row, last_col): (usize, usize),
        style: StyleId,
    ) -> Result<(), StateError> {
        check_bounds(first_row, first_col)?;
        check_bounds(last_row, last_col)?;

        for row in first_row..=last_row {
            for col in first_col..=last_col {
                self.set_style(row, col, style)?;
            }
        }

        Ok(())
    }

    /// Drops every value, style and column width. Panes and the active cell
    /// are left alone.
    pub fn clear_content(&mut self) {
        self.data = vec![vec![Cell::empty(); 1]; 1];
        self.column_widths.clear();
        self.max_rows = 0;
        self.max_cols = 0;
    }

    pub fn row_values(&self, row: usize) -> Vec<String> {
        (1..=self.max_cols)
            .map(|col| self.value_as_string(row, col))
            .collect()
    }

    pub fn column_values(&self, col: usize) -> Vec<String> {
        (1..=self.max_rows)
            .map(|row| self.value_as_string(row, col))
            .collect()
    }

    /// Non-blank cells in row-major order, 1-based.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> {
        self.data.iter().enumerate().skip(1).flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(_, cell)| !cell.is_blank())
                .map(move |(col, cell)| (row, col, cell))
        })
    }

    /// Used column letters, `A` through the last used column.
    pub fn used_column_names(&self) -> Vec<String> {
        (1..=self.max_cols).map(index_to_col_name).collect()
    }

    pub fn column_width(&self, col: usize) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.column_widths.iter().map(|(col, width)| (*col, *width))
    }

    pub fn set_column_width(&mut self, col: usize, width: f64) -> Result<(), StateError> {
        check_bounds(1, col)?;
        self.column_widths
            .insert(col, width.clamp(0.0, MAX_COLUMN_WIDTH));
        Ok(())
    }

    /// Sizes `col` to its widest value and returns the width that was set.
    pub fn autofit_column(&mut self, col: usize) -> Result<f64, StateError> {
        let width = self.calculate_column_width(col) as f64 + COLUMN_PADDING;
        self.set_column_width(col, width)?;
        Ok(self.column_width(col).unwrap_or(width))
    }

    pub fn freeze_panes(&mut self, rows: usize, cols: usize) -> Result<(), StateError> {
        if rows >= MAX_ROWS || cols >= MAX_COLS {
            return Err(StateError::CellOutOfRange {
                row: rows,
                col: cols,
            });
        }

        self.freeze_panes = (rows > 0 || cols > 0).then_some((rows, cols));
        Ok(())
    }

    pub fn frozen_panes(&self) -> Option<(usize, usize)> {
        self.freeze_panes
    }

    pub fn set_active_cell(&mut self, row: usize, col: usize) -> Result<(), StateError> {
        check_bounds(row, col)?;
        self.active_cell = Some((row, col));
        Ok(())
    }

    pub fn active_cell(&self) -> Option<(usize, usize)> {
        self.active_cell
    }

    fn calculate_column_width(&self, col: usize) -> usize {
        let mut max_width = MIN_COLUMN_WIDTH;

        for row in 1..=self.max_rows {
            let Some(value) = self.value(row, col) else {
                continue;
            };

            let display_width: usize = value
                .to_display_string()
                .chars()
                .map(|c| if c.is_ascii() { 1 } else { 2 })
                .sum();

            max_width = max_width.max(display_width);
        }

        max_width
    }

    fn ensure_cell_exists(&mut self, row: usize, col: usize) {
        if row >= self.data.len() {
            self.data.resize_with(row + 1, Vec::new);
        }

        let cells = &mut self.data[row];
        if col >= cells.len() {
            cells.resize_with(col + 1, Cell::empty);
        }
    }

    fn recalculate_extent(&mut self) {
        let mut max_rows = 0;
        let mut max_cols = 0;

        for (row_idx, row) in self.data.iter().enumerate().skip(1) {
            // Find last non-empty cell in this row
            if let Some(col_idx) = row
                .iter()
                .enumerate()
                .skip(1)
                .rev()
                .find(|(_, cell)| !cell.value.is_empty())
                .map(|(idx, _)| idx)
            {
                max_rows = row_idx;
                max_cols = max_cols.max(col_idx);
            }
        }

        self.max_rows = max_rows;
        self.max_cols = max_cols;
    }
}

fn check_bounds(row: usize, col: usize) -> Result<(), StateError> {
    if row == 0 || col == 0 || row > MAX_ROWS || col > MAX_COLS {
        return Err(StateError::CellOutOfRange { row, col });
    }
    Ok(())
}
