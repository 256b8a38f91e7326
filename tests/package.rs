//! Layout written into the saved xlsx package

use pretty_assertions::assert_eq;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

use tabsheet::{ErrorKind, StateError, import_tab_delimited};

fn package_entry(book: &Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(book).unwrap()).unwrap();
    let mut xml = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

fn imported_book(dir: &TempDir) -> std::path::PathBuf {
    let text = dir.path().join("people.txt");
    fs::write(&text, "Name\tAge\nAlice\t30\n").unwrap();
    let book = dir.path().join("people.xlsx");
    import_tab_delimited(&text, &book, "Data").unwrap();
    book
}

#[test]
fn test_header_style_is_saved() {
    let dir = TempDir::new().unwrap();
    let book = imported_book(&dir);

    let styles = package_entry(&book, "xl/styles.xml");
    assert!(styles.contains("<b/>"));
    assert!(styles.contains(r#"<color rgb="FFFFFFFF"/>"#));
    assert!(styles.contains(r#"patternType="lightGray""#));
    assert!(styles.contains(r#"<fgColor rgb="FF4472C4"/>"#));

    let sheet = package_entry(&book, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<c r="A1" s="1" t="s">"#));
    assert!(sheet.contains(r#"<c r="B1" s="1" t="s">"#));
    assert!(!sheet.contains(r#"<c r="A2" s="#));
    assert!(sheet.contains(r#"<c r="B2"><v>30</v></c>"#));
}

#[test]
fn test_widths_and_frozen_panes_are_saved() {
    let dir = TempDir::new().unwrap();
    let book = imported_book(&dir);
    let sheet = package_entry(&book, "xl/worksheets/sheet1.xml");

    assert!(sheet.contains(r#"<pane xSplit="6" ySplit="1" topLeftCell="G2" activePane="bottomRight" state="frozen"/>"#));
    assert_eq!(sheet.matches(r#"customWidth="1""#).count(), 2);
}

#[test]
fn test_active_cell_is_saved_after_the_panes() {
    let dir = TempDir::new().unwrap();
    let book = imported_book(&dir);
    let sheet = package_entry(&book, "xl/worksheets/sheet1.xml");

    // The writer has no way to attach the selection to a pane, so C2 is
    // stored as a pane-less selection after the bottom-right one.
    assert!(sheet.contains(
        r#"<selection pane="bottomRight"/><selection activeCell="C2" sqref="C2"/>"#
    ));
}

#[test]
fn test_non_xlsx_target_is_rejected() {
    let dir = TempDir::new().unwrap();
    let text = dir.path().join("people.txt");
    fs::write(&text, "Name\tAge\nAlice\t30\n").unwrap();

    for name in ["people.xls", "people.ods", "people.xlsm"] {
        let book = dir.path().join(name);
        let err = import_tab_delimited(&text, &book, "Data").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::State);
        assert_eq!(
            err.as_state(),
            Some(&StateError::UnsupportedFormat(book.display().to_string()))
        );
        assert!(!book.exists());
    }
}
