use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::error::SchemaError;

// ---------------------------------------------------------------------------
// Value – a single cell of a raw row
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as handed over by a data source.
/// Used as a key in `BTreeMap` / `BTreeSet` downstream, so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64` when it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Short type name used in schema error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Date(_) => "date",
            Value::Null => "null",
        }
    }
}

// ---------------------------------------------------------------------------
// Field – the fixed record schema
// ---------------------------------------------------------------------------

/// The 13 columns of a production record, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Field {
    Date,
    Production,
    Cost,
    Energy,
    Nemploye,
    Equipment,
    Hours,
    Sales,
    Revenue,
    Profit,
    Quality,
    Satisfaction,
    Id,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Date,
        Field::Production,
        Field::Cost,
        Field::Energy,
        Field::Nemploye,
        Field::Equipment,
        Field::Hours,
        Field::Sales,
        Field::Revenue,
        Field::Profit,
        Field::Quality,
        Field::Satisfaction,
        Field::Id,
    ];

    /// Fields offered as sidebar selectors, in display order.
    pub const FILTERABLE: [Field; 3] = [Field::Quality, Field::Nemploye, Field::Equipment];

    /// Number of cells every raw row must carry.
    pub const COUNT: usize = Self::ALL.len();

    /// Column header as it appears in the source data.
    pub fn name(self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Production => "Production",
            Field::Cost => "Cost",
            Field::Energy => "Energy",
            Field::Nemploye => "Nemploye",
            Field::Equipment => "Equipment",
            Field::Hours => "Hours",
            Field::Sales => "Sales",
            Field::Revenue => "Revenue",
            Field::Profit => "Profit",
            Field::Quality => "Quality",
            Field::Satisfaction => "Satisfaction",
            Field::Id => "id",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Position of the field in a raw row.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether the field can be summed / averaged.
    pub fn is_numeric(self) -> bool {
        !matches!(self, Field::Date | Field::Equipment)
    }

    /// Free-text column: sources hand it over verbatim, never type-guessed.
    pub fn is_text(self) -> bool {
        matches!(self, Field::Equipment)
    }

    /// Whether the field has few enough distinct values to group by.
    pub fn is_categorical(self) -> bool {
        matches!(
            self,
            Field::Equipment | Field::Nemploye | Field::Quality | Field::Satisfaction
        )
    }

    pub fn numeric() -> impl Iterator<Item = Field> {
        Self::ALL.into_iter().filter(|f| f.is_numeric())
    }

    pub fn categorical() -> impl Iterator<Item = Field> {
        Self::ALL.into_iter().filter(|f| f.is_categorical())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// One production/operations record with typed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub production: f64,
    pub cost: f64,
    pub energy: f64,
    /// Head count (`Nemploye` column).
    pub employees: i64,
    pub equipment: String,
    pub hours: f64,
    pub sales: f64,
    pub revenue: f64,
    pub profit: f64,
    /// Quality score.
    pub quality: i64,
    /// Satisfaction score.
    pub satisfaction: i64,
    pub id: i64,
}

impl Record {
    /// Build a record from a positional raw row (`row` is used for error reporting).
    pub fn from_row(row: usize, cells: &[Value]) -> Result<Self, SchemaError> {
        if cells.len() != Field::COUNT {
            return Err(SchemaError::ColumnCount {
                row,
                expected: Field::COUNT,
                found: cells.len(),
            });
        }
        let cell = |field: Field| Cell {
            row,
            field,
            value: &cells[field.index()],
        };

        Ok(Record {
            date: cell(Field::Date).date()?,
            production: cell(Field::Production).number()?,
            cost: cell(Field::Cost).number()?,
            energy: cell(Field::Energy).number()?,
            employees: cell(Field::Nemploye).integer()?,
            equipment: cell(Field::Equipment).text()?,
            hours: cell(Field::Hours).number()?,
            sales: cell(Field::Sales).number()?,
            revenue: cell(Field::Revenue).number()?,
            profit: cell(Field::Profit).number()?,
            quality: cell(Field::Quality).integer()?,
            satisfaction: cell(Field::Satisfaction).integer()?,
            id: cell(Field::Id).integer()?,
        })
    }

    /// The cell for `field` as a dynamic value.
    pub fn value(&self, field: Field) -> Value {
        match field {
            Field::Date => Value::Date(self.date),
            Field::Equipment => Value::Text(self.equipment.clone()),
            Field::Nemploye => Value::Integer(self.employees),
            Field::Quality => Value::Integer(self.quality),
            Field::Satisfaction => Value::Integer(self.satisfaction),
            Field::Id => Value::Integer(self.id),
            // Remaining fields are float measures.
            other => Value::Float(self.measure(other).unwrap_or_default()),
        }
    }

    /// The cell for `field` as a number, `None` for non-numeric fields.
    pub fn measure(&self, field: Field) -> Option<f64> {
        match field {
            Field::Production => Some(self.production),
            Field::Cost => Some(self.cost),
            Field::Energy => Some(self.energy),
            Field::Nemploye => Some(self.employees as f64),
            Field::Hours => Some(self.hours),
            Field::Sales => Some(self.sales),
            Field::Revenue => Some(self.revenue),
            Field::Profit => Some(self.profit),
            Field::Quality => Some(self.quality as f64),
            Field::Satisfaction => Some(self.satisfaction as f64),
            Field::Id => Some(self.id as f64),
            Field::Date | Field::Equipment => None,
        }
    }
}

/// A raw cell being coerced into its column type.
struct Cell<'a> {
    row: usize,
    field: Field,
    value: &'a Value,
}

impl Cell<'_> {
    fn mismatch(&self, expected: &'static str) -> SchemaError {
        SchemaError::ColumnType {
            row: self.row,
            field: self.field,
            expected,
            found: self.value.type_name().to_string(),
        }
    }

    /// NaN and infinities are how pandas spells a missing cell; they are nulls.
    fn number(&self) -> Result<f64, SchemaError> {
        self.value
            .as_f64()
            .filter(|f| f.is_finite())
            .ok_or_else(|| self.mismatch("number"))
    }

    fn integer(&self) -> Result<i64, SchemaError> {
        match self.value {
            Value::Integer(i) => Ok(*i),
            // Whole floats show up when a writer widened an int column.
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
            _ => Err(self.mismatch("integer")),
        }
    }

    fn date(&self) -> Result<NaiveDate, SchemaError> {
        match self.value {
            Value::Date(d) => Ok(*d),
            Value::Text(s) => {
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| self.mismatch("date"))
            }
            _ => Err(self.mismatch("date")),
        }
    }

    fn text(&self) -> Result<String, SchemaError> {
        match self.value {
            Value::Null => Err(self.mismatch("text")),
            Value::Text(s) => Ok(s.clone()),
            Value::Integer(i) => Ok(i.to_string()),
            // `Display` rounds floats for the table; keep every digit here.
            Value::Float(f) => Ok(f.to_string()),
            other => Ok(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// All records of one load, with the distinct values of every categorical column.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<Record>,
    /// For each categorical field the sorted set of distinct values.
    pub unique_values: BTreeMap<Field, BTreeSet<Value>>,
}

impl Dataset {
    /// Validate raw rows against the schema and build the dataset.
    ///
    /// Every row is checked; the first offending row aborts the load.
    pub fn from_rows(rows: Vec<Vec<Value>>) -> Result<Self, SchemaError> {
        if rows.is_empty() {
            return Err(SchemaError::Empty);
        }
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, cells)| Record::from_row(i, cells))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_records(records))
    }

    /// Build column indices from already typed records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut unique_values: BTreeMap<Field, BTreeSet<Value>> = BTreeMap::new();
        for rec in &records {
            for field in Field::categorical() {
                unique_values
                    .entry(field)
                    .or_default()
                    .insert(rec.value(field));
            }
        }
        Dataset {
            records,
            unique_values,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

}
