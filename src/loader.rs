//! Spreadsheet loading primitives feeding the embedding pipeline.

use calamine::{open_workbook, Data, Range, Reader, Xlsx, XlsxError};
use chrono::NaiveDateTime;
use serde::de::{MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// Timestamp layout used for date cells in the JSON output. Parsing accepts
/// an optional fractional-second component.
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A single scalar cell preserved with its native spreadsheet type.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell (also produced by formula-error cells).
    Null,
    /// Boolean cell.
    Bool(bool),
    /// Integer cell.
    Int(i64),
    /// Floating-point cell.
    Float(f64),
    /// Text cell.
    Text(String),
    /// Date/time cell, carried without a timezone.
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Converts a raw spreadsheet cell into its preserved scalar form.
    pub fn from_cell(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Null,
            Data::Bool(value) => CellValue::Bool(*value),
            Data::Int(value) => CellValue::Int(*value),
            Data::Float(value) => CellValue::Float(*value),
            Data::String(value) => CellValue::Text(value.clone()),
            Data::DateTime(value) => value
                .as_datetime()
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Null),
            Data::DateTimeIso(value) => parse_datetime(value)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Text(value.clone())),
            Data::DurationIso(value) => CellValue::Text(value.clone()),
            Data::Error(_) => CellValue::Null,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(value) => write!(f, "{value}"),
            CellValue::Int(value) => write!(f, "{value}"),
            CellValue::Float(value) => write!(f, "{value}"),
            CellValue::Text(value) => f.write_str(value),
            CellValue::DateTime(value) => write!(f, "{}", value.format(DATETIME_FORMAT)),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_unit(),
            CellValue::Bool(value) => serializer.serialize_bool(*value),
            CellValue::Int(value) => serializer.serialize_i64(*value),
            CellValue::Float(value) => serializer.serialize_f64(*value),
            CellValue::Text(value) => serializer.serialize_str(value),
            CellValue::DateTime(value) => {
                serializer.collect_str(&value.format(DATETIME_FORMAT))
            }
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CellValueVisitor)
    }
}

struct CellValueVisitor;

impl<'de> Visitor<'de> for CellValueVisitor {
    type Value = CellValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar cell value (null, bool, number, or string)")
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(CellValue::Null)
    }

    fn visit_bool<E: serde::de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(CellValue::Bool(value))
    }

    fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(CellValue::Int(value))
    }

    fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<Self::Value, E> {
        match i64::try_from(value) {
            Ok(value) => Ok(CellValue::Int(value)),
            Err(_) => Ok(CellValue::Float(value as f64)),
        }
    }

    fn visit_f64<E: serde::de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(CellValue::Float(value))
    }

    fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Self::Value, E> {
        match parse_datetime(value) {
            Some(datetime) => Ok(CellValue::DateTime(datetime)),
            None => Ok(CellValue::Text(value.to_string())),
        }
    }
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT).ok()
}

/// One record from the tabular input: column names paired with cell values,
/// in worksheet column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a named cell, keeping insertion order.
    pub fn push(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.push((column.into(), value));
    }

    /// Borrow of the ordered (column, value) pairs.
    pub fn cells(&self) -> &[(String, CellValue)] {
        &self.cells
    }

    /// Number of cells in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cell values stringified and joined with single spaces, in column
    /// order. Column names are not part of the blob.
    pub fn joined_text(&self) -> String {
        let values: Vec<String> = self
            .cells
            .iter()
            .map(|(_, value)| value.to_string())
            .collect();
        values.join(" ")
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RowVisitor)
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of column names to cell values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut row = Row::new();
        while let Some((column, value)) = access.next_entry::<String, CellValue>()? {
            row.push(column, value);
        }
        Ok(row)
    }
}

/// Errors that can emerge while reading the input workbook.
#[derive(Debug)]
pub enum LoadError {
    /// The workbook could not be opened, read, or parsed, or the requested
    /// worksheet does not exist.
    Workbook(XlsxError),
    /// The workbook contains no worksheets at all.
    EmptyWorkbook,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Workbook(err) => write!(f, "failed to read workbook: {err}"),
            LoadError::EmptyWorkbook => f.write_str("workbook contains no worksheets"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Reads the given worksheet (or the first one when `sheet` is `None`) into
/// ordered rows. The first worksheet row is treated as the header; any
/// columns are accepted and no schema is enforced.
pub fn load_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<Row>, LoadError> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(LoadError::Workbook)?;
    let range = match sheet {
        Some(name) => workbook.worksheet_range(name).map_err(LoadError::Workbook)?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or(LoadError::EmptyWorkbook)?
            .map_err(LoadError::Workbook)?,
    };
    Ok(rows_from_range(&range))
}

fn rows_from_range(range: &Range<Data>) -> Vec<Row> {
    let mut sheet_rows = range.rows();
    let header = match sheet_rows.next() {
        Some(cells) => cells,
        None => return Vec::new(),
    };
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(position, cell)| header_name(position, cell))
        .collect();

    let mut rows = Vec::new();
    for cells in sheet_rows {
        let mut row = Row::new();
        for (position, column) in columns.iter().enumerate() {
            let value = cells
                .get(position)
                .map(CellValue::from_cell)
                .unwrap_or(CellValue::Null);
            row.push(column.clone(), value);
        }
        rows.push(row);
    }
    rows
}

/// Header cells are stringified as-is; blank headers get a positional name.
fn header_name(position: usize, cell: &Data) -> String {
    let name = CellValue::from_cell(cell).to_string();
    if name.trim().is_empty() {
        format!("column_{}", position + 1)
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;
    use chrono::NaiveDate;

    fn sample_datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn converts_native_cell_types() {
        assert_eq!(CellValue::from_cell(&Data::Empty), CellValue::Null);
        assert_eq!(CellValue::from_cell(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(CellValue::from_cell(&Data::Int(7)), CellValue::Int(7));
        assert_eq!(
            CellValue::from_cell(&Data::Float(2.5)),
            CellValue::Float(2.5)
        );
        assert_eq!(
            CellValue::from_cell(&Data::String("hi".into())),
            CellValue::Text("hi".into())
        );
        assert_eq!(
            CellValue::from_cell(&Data::Error(CellErrorType::Div0)),
            CellValue::Null
        );
    }

    #[test]
    fn synthesizes_names_for_blank_headers() {
        assert_eq!(header_name(0, &Data::String("name".into())), "name");
        assert_eq!(header_name(2, &Data::Empty), "column_3");
        assert_eq!(header_name(4, &Data::String("  ".into())), "column_5");
        assert_eq!(header_name(1, &Data::Int(2024)), "2024");
    }

    #[test]
    fn range_rows_follow_header_order_and_pad_short_rows() {
        let mut range = Range::new((0, 0), (2, 2));
        range.set_value((0, 0), Data::String("a".into()));
        range.set_value((0, 1), Data::String("b".into()));
        range.set_value((0, 2), Data::String("c".into()));
        range.set_value((1, 0), Data::Int(1));
        range.set_value((1, 1), Data::String("x".into()));
        range.set_value((1, 2), Data::Bool(false));
        range.set_value((2, 0), Data::Int(2));
        range.set_value((2, 1), Data::String("y".into()));

        let rows = rows_from_range(&range);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].cells(),
            &[
                ("a".to_string(), CellValue::Int(1)),
                ("b".to_string(), CellValue::Text("x".into())),
                ("c".to_string(), CellValue::Bool(false)),
            ]
        );
        // trailing cell missing in the sheet loads as null
        assert_eq!(rows[1].cells()[2], ("c".to_string(), CellValue::Null));
    }

    #[test]
    fn header_only_sheet_yields_no_rows() {
        let mut range = Range::new((0, 0), (0, 1));
        range.set_value((0, 0), Data::String("a".into()));
        range.set_value((0, 1), Data::String("b".into()));
        assert!(rows_from_range(&range).is_empty());
    }

    #[test]
    fn missing_workbook_is_a_load_error() {
        let err = load_rows(Path::new("/no/such/workbook.xlsx"), None).unwrap_err();
        assert!(matches!(err, LoadError::Workbook(_)));
    }

    #[test]
    fn row_serializes_in_column_order() {
        let mut row = Row::new();
        row.push("b", CellValue::Int(1));
        row.push("a", CellValue::Text("x".into()));
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"b":1,"a":"x"}"#);
    }

    #[test]
    fn row_round_trips_with_native_types() {
        let mut row = Row::new();
        row.push("name", CellValue::Text("widget".into()));
        row.push("count", CellValue::Int(3));
        row.push("price", CellValue::Float(1.25));
        row.push("active", CellValue::Bool(true));
        row.push("note", CellValue::Null);
        row.push("updated", CellValue::DateTime(sample_datetime()));

        let json = serde_json::to_string(&row).unwrap();
        let parsed: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, row);
    }

    #[test]
    fn joined_text_uses_spaces_and_column_order() {
        let mut row = Row::new();
        row.push("a", CellValue::Null);
        row.push("b", CellValue::Int(7));
        row.push("c", CellValue::Text("widget".into()));
        row.push("d", CellValue::Float(1.5));
        assert_eq!(row.joined_text(), " 7 widget 1.5");
    }
}
