use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::{Error, LibraryError, Result};
use crate::import::ImportOptions;

/// One line of the source text split into fields. A blank line is a record
/// with no fields, so every line keeps its own row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// 1-based line in the source where the record starts
    pub line: usize,
    pub fields: Vec<String>,
}

impl ImportRecord {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    pub fn blank(line: usize) -> Self {
        Self::new(line, Vec::new())
    }

    pub fn is_blank(&self) -> bool {
        self.fields.is_empty()
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const TEXT_SOURCE: &str = "<text>";

/// Reads every record of a delimited text file. The first line must be a
/// non-blank header.
pub fn read_records<P: AsRef<Path>>(path: P, options: &ImportOptions) -> Result<Vec<ImportRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;

    let records = read_records_from(BufReader::new(file), options).map_err(|err| match err {
        Error::Io { source, .. } => Error::io(path, source),
        other => other,
    })?;

    log::debug!(
        "Read {} record(s) from {}, header has {} field(s)",
        records.len(),
        path.display(),
        records[0].fields.len()
    );

    Ok(records)
}

pub fn read_records_from<R: Read>(mut reader: R, options: &ImportOptions) -> Result<Vec<ImportRecord>> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(TEXT_SOURCE, e))?;
    let text = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true);

    match options.quote {
        Some(quote) => builder.quote(quote),
        None => builder.quoting(false),
    };

    // csv drops empty lines, so line breaks are counted on the raw bytes
    // between records to put the blank lines back.
    let mut csv_reader = builder.from_reader(text);
    let mut record = csv::StringRecord::new();
    let mut records = Vec::new();
    let mut cursor = 0;
    let mut line = 1;

    while csv_reader.read_record(&mut record).map_err(text_error)? {
        let end = (csv_reader.position().byte() as usize).clamp(cursor, text.len());
        let content_start = cursor + leading_breaks(&text[cursor..end]);
        let breaks = count_line_breaks(&text[cursor..content_start]);

        if records.is_empty() && breaks > 0 {
            return Err(blank_header(TEXT_SOURCE));
        }

        // The first break closes the previous record, any further one is a blank line
        for blank in 1..breaks {
            records.push(ImportRecord::blank(line + blank));
        }
        line += breaks;

        records.push(ImportRecord::new(
            line,
            record.iter().map(str::to_string).collect(),
        ));

        let content_end = end - trailing_breaks(&text[content_start..end]);
        line += count_line_breaks(&text[content_start..content_end]);
        cursor = content_end;
    }

    if records.is_empty() {
        return Err(missing_header(TEXT_SOURCE));
    }

    Ok(records)
}

pub(crate) fn missing_header(source: impl AsRef<Path>) -> Error {
    Error::io(
        source,
        io::Error::new(io::ErrorKind::UnexpectedEof, "source text has no header line"),
    )
}

fn blank_header(source: impl AsRef<Path>) -> Error {
    Error::io(
        source,
        io::Error::new(io::ErrorKind::InvalidData, "first line is blank, expected a header"),
    )
}

fn is_break(b: &u8) -> bool {
    matches!(b, b'\r' | b'\n')
}

fn leading_breaks(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| is_break(b)).count()
}

fn trailing_breaks(bytes: &[u8]) -> usize {
    bytes.iter().rev().take_while(|b| is_break(b)).count()
}

/// `\r\n`, `\n` and a lone `\r` each end one line.
fn count_line_breaks(bytes: &[u8]) -> usize {
    let mut count = 0;
    let mut iter = bytes.iter().peekable();

    while let Some(b) = iter.next() {
        match b {
            b'\n' => count += 1,
            b'\r' => {
                count += 1;
                iter.next_if_eq(&&b'\n');
            }
            _ => {}
        }
    }

    count
}

fn text_error(err: csv::Error) -> Error {
    if !err.is_io_error() {
        return Error::Library(LibraryError::Text(err));
    }

    match err.into_kind() {
        csv::ErrorKind::Io(source) => Error::io(TEXT_SOURCE, source),
        other => Error::io(TEXT_SOURCE, io::Error::other(format!("{other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(records: &[ImportRecord]) -> Vec<Vec<&str>> {
        records
            .iter()
            .map(|r| r.fields.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn splits_on_tabs_without_quoting() {
        let text = "Name\tAge\n\"Bob\" Jr\t41\nAlice\t30\textra\n";
        let records = read_records_from(text.as_bytes(), &ImportOptions::default()).unwrap();

        assert_eq!(
            fields(&records),
            vec![
                vec!["Name", "Age"],
                vec!["\"Bob\" Jr", "41"],
                vec!["Alice", "30", "extra"],
            ]
        );
        assert_eq!(records[2].line, 3);
    }

    #[test]
    fn honours_quote_character_when_set() {
        let options = ImportOptions {
            quote: Some(b'"'),
            ..ImportOptions::default()
        };
        let text = "a\tb\n\"x\ty\"\tz\n";
        let records = read_records_from(text.as_bytes(), &options).unwrap();

        assert_eq!(fields(&records), vec![vec!["a", "b"], vec!["x\ty", "z"]]);
    }

    #[test]
    fn invalid_utf8_is_a_library_error() {
        let bytes: &[u8] = b"a\tb\n\xff\xfe\tc\n";
        let err = read_records_from(bytes, &ImportOptions::default()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Library);
    }

    #[test]
    fn blank_lines_become_empty_records() {
        let text = "Name\tAge\r\n\r\nAlice\t30\r\n\n\nBob\t41\n";
        let records = read_records_from(text.as_bytes(), &ImportOptions::default()).unwrap();

        assert_eq!(
            records.iter().map(|r| r.line).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );
        assert!(records[1].is_blank());
        assert_eq!(records[2].fields, vec!["Alice", "30"]);
        assert!(records[3].is_blank() && records[4].is_blank());
        assert_eq!(records[5].fields, vec!["Bob", "41"]);
    }

    #[test]
    fn blank_first_line_is_rejected() {
        let err = read_records_from(&b"\nName\tAge\n"[..], &ImportOptions::default()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
        assert!(err.to_string().contains("first line is blank"));
    }

    #[test]
    fn byte_order_mark_is_not_part_of_the_header() {
        let records = read_records_from(&b"\xEF\xBB\xBFName\tAge\n"[..], &ImportOptions::default()).unwrap();
        assert_eq!(records[0].fields, vec!["Name", "Age"]);
    }

    #[test]
    fn quoted_line_breaks_do_not_add_rows() {
        let options = ImportOptions {
            quote: Some(b'"'),
            ..ImportOptions::default()
        };
        let text = "a\tb\n\"two\nlines\"\tx\n\ny\tz\n";
        let records = read_records_from(text.as_bytes(), &options).unwrap();

        assert_eq!(
            records.iter().map(|r| r.line).collect::<Vec<_>>(),
            vec![1, 2, 4, 5]
        );
        assert_eq!(records[1].fields, vec!["two\nlines", "x"]);
        assert!(records[2].is_blank());
    }
}
