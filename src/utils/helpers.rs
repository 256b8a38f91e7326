use crate::error::StateError;

/// Last row Excel can address.
pub const MAX_ROWS: usize = 1_048_576;
/// Last column Excel can address (XFD).
pub const MAX_COLS: usize = 16_384;

/// Converts a 1-based column index to its letter name (1 -> A, 27 -> AA).
#[must_use]
pub fn index_to_col_name(index: usize) -> String {
    let mut col_name = String::new();
    let mut n = index;

    while n > 0 {
        let remainder = (n - 1) % 26;
        col_name.insert(0, (b'A' + remainder as u8) as char);
        n = (n - 1) / 26;
    }

    if col_name.is_empty() {
        col_name.push('A');
    }

    col_name
}

#[must_use]
pub fn col_name_to_index(name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }

    let mut result: usize = 0;

    for c in name.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }

        let val = (c.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
        result = result.checked_mul(26)?.checked_add(val)?;
    }

    (result <= MAX_COLS).then_some(result)
}

// Format cell reference (e.g., A1, B2)
#[must_use]
pub fn cell_reference(cell: (usize, usize)) -> String {
    format!("{}{}", index_to_col_name(cell.1), cell.0)
}

/// Parses an A1-style reference into a 1-based `(row, col)` pair.
/// Absolute markers (`$B$3`) are accepted and ignored.
pub fn parse_cell_reference(reference: &str) -> Result<(usize, usize), StateError> {
    let invalid = || StateError::InvalidCellReference(reference.to_string());

    let cleaned: String = reference.trim().chars().filter(|c| *c != '$').collect();
    let split = cleaned
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (letters, digits) = cleaned.split_at(split);

    let col = col_name_to_index(letters).ok_or_else(invalid)?;
    let row = digits.parse::<usize>().map_err(|_| invalid())?;

    if row == 0 || row > MAX_ROWS {
        return Err(invalid());
    }

    Ok((row, col))
}
