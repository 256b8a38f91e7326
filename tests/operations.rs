//! File-level sheet and cell operations

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use tabsheet::excel::CellValue;
use tabsheet::{ErrorKind, SearchItem, StateError, find_text, operations};

#[test]
fn test_create_and_manage_sheets() {
    let dir = TempDir::new().unwrap();
    let book = dir.path().join("book.xlsx");

    operations::create_new_file(&book, Some("Main")).unwrap();
    assert_eq!(operations::sheet_names(&book).unwrap(), vec!["Main".to_string()]);

    assert!(operations::add_new_sheet(&book, "Second").unwrap());
    assert!(!operations::add_new_sheet(&book, "SECOND").unwrap());
    assert!(operations::sheet_exists(&book, "second").unwrap());

    assert!(operations::remove_worksheet(&book, "second").unwrap());
    assert!(!operations::remove_worksheet(&book, "second").unwrap());
    assert_eq!(operations::sheet_names(&book).unwrap(), vec!["Main".to_string()]);
}

#[test]
fn test_removing_sole_sheet_is_rejected() {
    let dir = TempDir::new().unwrap();
    let book = dir.path().join("book.xlsx");
    operations::create_new_file(&book, None).unwrap();

    let err = operations::remove_worksheet(&book, "Sheet1").unwrap_err();
    assert_eq!(
        err.as_state(),
        Some(&StateError::SoleSheet("Sheet1".to_string()))
    );
    assert_eq!(operations::sheet_names(&book).unwrap(), vec!["Sheet1".to_string()]);
}

#[test]
fn test_set_cell_values_and_read_back() {
    let dir = TempDir::new().unwrap();
    let book = dir.path().join("book.xlsx");
    operations::create_new_file(&book, None).unwrap();

    operations::set_cell_value(&book, "Sheet1", "A1", "Name").unwrap();
    operations::set_cell_value(&book, "Sheet1", "A3", CellValue::parse("Bob")).unwrap();
    operations::set_cell_value(&book, "Sheet1", "H3", 100.3).unwrap();
    operations::set_cell_value(&book, "Sheet1", "H4", CellValue::parse("2017-01-01")).unwrap();

    let extent = operations::last_row_column(&book, "Sheet1").unwrap();
    assert_eq!((extent.last_row, extent.last_column), (4, 8));
    assert_eq!(
        operations::column_values(&book, "Sheet1", "A").unwrap(),
        vec!["Name", "", "Bob", ""]
    );
    assert_eq!(
        operations::column_values(&book, "Sheet1", "h").unwrap(),
        vec!["", "", "100.3", "2017-01-01"]
    );
}

#[test]
fn test_cell_errors_are_typed() {
    let dir = TempDir::new().unwrap();
    let book = dir.path().join("book.xlsx");
    operations::create_new_file(&book, None).unwrap();

    let err = operations::set_cell_value(&book, "Missing", "A1", "x").unwrap_err();
    assert_eq!(
        err.as_state(),
        Some(&StateError::SheetNotFound("Missing".to_string()))
    );

    let err = operations::set_cell_value(&book, "Sheet1", "1A", "x").unwrap_err();
    assert_eq!(
        err.as_state(),
        Some(&StateError::InvalidCellReference("1A".to_string()))
    );

    let err = operations::sheet_names(dir.path().join("missing.xlsx")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_find_text_in_saved_workbook() {
    let dir = TempDir::new().unwrap();
    let book = dir.path().join("book.xlsx");
    operations::create_new_file(&book, Some("People")).unwrap();
    operations::set_cell_value(&book, "People", "A1", "Karen").unwrap();
    operations::set_cell_value(&book, "People", "C5", "karen").unwrap();

    let exact = find_text(&SearchItem::new(&book, "People", "Karen")).unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!((exact[0].row, exact[0].column_name.as_str()), (1, "A"));

    let any_case = SearchItem {
        case_sensitive: false,
        ..SearchItem::new(&book, "People", "KAREN")
    };
    let found = find_text(&any_case).unwrap();
    assert_eq!(
        found
            .iter()
            .map(|f| (f.row, f.column))
            .collect::<Vec<_>>(),
        vec![(1, 1), (5, 3)]
    );
}
