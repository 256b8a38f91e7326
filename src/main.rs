use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use tabsheet::excel::CellValue;
use tabsheet::import::{DefaultSheetPolicy, ImportOptions, RaggedRows};
use tabsheet::utils::parse_cell_reference;
use tabsheet::{SearchItem, operations};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a tab-delimited text file into a sheet, replacing its content
    Import {
        text_file: PathBuf,
        workbook: PathBuf,
        /// Target sheet, created when missing
        #[arg(long, short = 's', default_value = "Sheet1")]
        sheet: String,
        /// Field delimiter; a single character, or "tab"
        #[arg(long, short = 'd', default_value = "tab")]
        delimiter: String,
        /// Treat this character as a quote around fields
        #[arg(long)]
        quote: Option<char>,
        /// Keep numeric-looking fields as text
        #[arg(long)]
        no_numbers: bool,
        /// Rows longer than the header: 'fit' truncates, 'reject' fails
        #[arg(long, default_value = "fit")]
        ragged: String,
        /// Placeholder Sheet1 handling: 'remove', 'remove-if-empty' or 'keep'
        #[arg(long, default_value = "remove")]
        default_sheet: String,
        /// Cell selected after the import
        #[arg(long, default_value = "C2")]
        active_cell: String,
        #[arg(long, default_value = "1")]
        freeze_rows: usize,
        #[arg(long, default_value = "6")]
        freeze_cols: usize,
        #[arg(long, short = 'j')]
        json: bool,
    },
    /// Create a new workbook
    Create {
        workbook: PathBuf,
        /// Name for the first sheet instead of Sheet1
        #[arg(long, short = 's')]
        sheet: Option<String>,
    },
    /// Add a sheet unless it already exists
    AddSheet { workbook: PathBuf, sheet: String },
    /// Remove a sheet if it exists
    RemoveSheet { workbook: PathBuf, sheet: String },
    /// List sheet names
    Sheets { workbook: PathBuf },
    /// Tell whether a sheet exists (exit code 1 when it does not)
    Exists { workbook: PathBuf, sheet: String },
    /// Set one cell, e.g. `set-cell book.xlsx Data B3 42`
    SetCell {
        workbook: PathBuf,
        sheet: String,
        cell: String,
        value: String,
        /// Store the value as text without type detection
        #[arg(long)]
        text: bool,
    },
    /// Print the last used row and column
    Extent {
        workbook: PathBuf,
        sheet: String,
        #[arg(long, short = 'j')]
        json: bool,
    },
    /// Print the letters of the used columns
    Columns { workbook: PathBuf, sheet: String },
    /// Print every value of one column
    ColumnValues {
        workbook: PathBuf,
        sheet: String,
        #[arg(default_value = "A")]
        column: String,
    },
    /// Find cells containing a token
    Find {
        workbook: PathBuf,
        sheet: String,
        token: String,
        #[arg(long, short = 'i')]
        ignore_case: bool,
        /// Match substrings instead of whole cells
        #[arg(long, short = 'c')]
        contains: bool,
        #[arg(long, short = 'j')]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Import {
            text_file,
            workbook,
            sheet,
            delimiter,
            quote,
            no_numbers,
            ragged,
            default_sheet,
            active_cell,
            freeze_rows,
            freeze_cols,
            json,
        } => {
            let options = ImportOptions {
                delimiter: parse_delimiter(&delimiter)?,
                quote: quote.map(ascii_byte).transpose()?,
                detect_numbers: !no_numbers,
                ragged_rows: ragged.parse::<RaggedRows>().map_err(anyhow::Error::msg)?,
                default_sheet: default_sheet
                    .parse::<DefaultSheetPolicy>()
                    .map_err(anyhow::Error::msg)?,
                active_cell: Some(parse_cell_reference(&active_cell)?),
                freeze_panes: (freeze_rows, freeze_cols),
            };

            let summary =
                tabsheet::import_tab_delimited_with(&text_file, &workbook, &sheet, &options)
                    .with_context(|| {
                        format!(
                            "Failed to import {} into {}",
                            text_file.display(),
                            workbook.display()
                        )
                    })?;

            if json {
                print_json(&summary)?;
            } else {
                println!(
                    "Imported {} rows x {} columns into '{}'",
                    summary.rows, summary.columns, summary.sheet
                );
            }
        }
        Command::Create { workbook, sheet } => {
            operations::create_new_file(&workbook, sheet.as_deref())
                .with_context(|| format!("Failed to create {}", workbook.display()))?;
        }
        Command::AddSheet { workbook, sheet } => {
            if !operations::add_new_sheet(&workbook, &sheet)? {
                println!("Sheet '{}' already exists", sheet);
            }
        }
        Command::RemoveSheet { workbook, sheet } => {
            if !operations::remove_worksheet(&workbook, &sheet)? {
                println!("Sheet '{}' not found", sheet);
            }
        }
        Command::Sheets { workbook } => {
            for name in operations::sheet_names(&workbook)? {
                println!("{}", name);
            }
        }
        Command::Exists { workbook, sheet } => {
            if !operations::sheet_exists(&workbook, &sheet)? {
                std::process::exit(1);
            }
        }
        Command::SetCell {
            workbook,
            sheet,
            cell,
            value,
            text,
        } => {
            let value = if text {
                CellValue::Text(value)
            } else {
                CellValue::parse(&value)
            };
            operations::set_cell_value(&workbook, &sheet, &cell, value)
                .with_context(|| format!("Failed to set {}!{}", sheet, cell))?;
        }
        Command::Extent {
            workbook,
            sheet,
            json,
        } => {
            let extent = operations::last_row_column(&workbook, &sheet)?;
            if json {
                print_json(&extent)?;
            } else {
                println!("{}\t{}", extent.last_row, extent.last_column);
            }
        }
        Command::Columns { workbook, sheet } => {
            println!("{}", operations::used_columns(&workbook, &sheet)?.join(" "));
        }
        Command::ColumnValues {
            workbook,
            sheet,
            column,
        } => {
            for value in operations::column_values(&workbook, &sheet, &column)? {
                println!("{}", value);
            }
        }
        Command::Find {
            workbook,
            sheet,
            token,
            ignore_case,
            contains,
            json,
        } => {
            let item = SearchItem {
                case_sensitive: !ignore_case,
                whole_cell: !contains,
                ..SearchItem::new(workbook, &sheet, &token)
            };
            let found = tabsheet::find_text(&item)?;

            if json {
                print_json(&found)?;
            } else {
                for item in &found {
                    println!("{}{}", item.column_name, item.row);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn parse_delimiter(s: &str) -> Result<u8> {
    match s {
        "tab" | "\\t" => Ok(b'\t'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => ascii_byte(c),
                _ => anyhow::bail!("Invalid delimiter: {}", s),
            }
        }
    }
}

fn ascii_byte(c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        anyhow::bail!("Delimiter and quote must be ASCII: {}", c)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json_string = serde_json::to_string_pretty(value)?;
    println!("{}", json_string);
    Ok(())
}
