use chrono::{NaiveDate, NaiveDateTime};

use crate::excel::StyleId;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Boolean(bool),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: Option<StyleId>,
}

impl CellValue {
    /// Interprets user input the way a spreadsheet would on entry:
    /// numbers, ISO dates and `true`/`false` become typed values, the rest text.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if let Some(number) = parse_number(trimmed) {
            return CellValue::Number(number);
        }

        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
            return CellValue::Date(dt);
        }

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return CellValue::Date(date.and_time(chrono::NaiveTime::MIN));
        }

        match trimmed.to_lowercase().as_str() {
            "true" => CellValue::Boolean(true),
            "false" => CellValue::Boolean(false),
            _ => CellValue::Text(input.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Display form used for searching, column listings and width estimates.
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(f) => format_number(*f),
            CellValue::Date(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            CellValue::Boolean(b) => {
                if *b {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Date(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self { value, style: None }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_blank(&self) -> bool {
        self.value.is_empty() && self.style.is_none()
    }
}

/// Finite numbers only; "NaN" and "inf" stay text.
pub fn parse_number(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn format_number(f: f64) -> String {
    if f == (f as i64) as f64 && f.abs() < 1e10 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_detects_types() {
        assert_eq!(CellValue::parse("30"), CellValue::Number(30.0));
        assert_eq!(CellValue::parse(" 2.5 "), CellValue::Number(2.5));
        assert_eq!(CellValue::parse("TRUE"), CellValue::Boolean(true));
        assert_eq!(CellValue::parse(""), CellValue::Empty);
        assert_eq!(CellValue::parse("NaN"), CellValue::Text("NaN".to_string()));
        assert_eq!(
            CellValue::parse("2017-01-02"),
            CellValue::Date(
                NaiveDate::from_ymd_opt(2017, 1, 2)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
        assert_eq!(CellValue::parse("Alice"), CellValue::Text("Alice".to_string()));
    }

    #[test]
    fn display_drops_integral_fraction() {
        assert_eq!(CellValue::Number(30.0).to_display_string(), "30");
        assert_eq!(CellValue::Number(100.3).to_display_string(), "100.3");
        assert_eq!(CellValue::Boolean(false).to_display_string(), "FALSE");
        assert_eq!(CellValue::parse("2017-01-02").to_display_string(), "2017-01-02");
    }
}
