use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad class of a failure, for callers that only need to branch on the cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A file was missing, unreadable, empty or could not be written.
    Io,
    /// The operation would break a workbook invariant or named something absent.
    State,
    /// The spreadsheet or text library rejected the data.
    Library,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("Cannot delete the sole worksheet '{0}'")]
    SoleSheet(String),

    #[error("Worksheet '{0}' already exists")]
    SheetExists(String),

    #[error("Worksheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Invalid worksheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: &'static str },

    #[error("Invalid cell reference '{0}'")]
    InvalidCellReference(String),

    #[error("Cell ({row}, {col}) is outside the worksheet")]
    CellOutOfRange { row: usize, col: usize },

    #[error("Line {line} has {found} fields, header has {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Cannot save {0}: only .xlsx workbooks can be written")]
    UnsupportedFormat(String),

    #[error("No worksheets found in file")]
    NoSheets,
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Unable to parse Excel file: {0}")]
    Read(#[from] calamine::Error),

    #[error("Unable to write Excel file: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("Unable to parse delimited text: {0}")]
    Text(#[from] csv::Error),
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::State(_) => ErrorKind::State,
            Error::Library(_) => ErrorKind::Library,
        }
    }

    /// The invariant violation behind this error, if that is what it is.
    pub fn as_state(&self) -> Option<&StateError> {
        match self {
            Error::State(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Error::Library(LibraryError::Write(err))
    }
}

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Error::Library(LibraryError::Read(err))
    }
}
