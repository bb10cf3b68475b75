//! Shared builders for unit tests.

use chrono::NaiveDate;

use super::model::{Dataset, Record, Value};

/// A valid positional raw row with the given id.
pub fn raw_row(id: i64) -> Vec<Value> {
    vec![
        Value::Text("2024-03-01".into()),
        Value::Float(120.5),
        Value::Integer(40),
        Value::Float(9.25),
        Value::Integer(12),
        Value::Text("Press".into()),
        Value::Float(7.5),
        Value::Integer(300),
        Value::Float(1500.0),
        Value::Float(250.0),
        Value::Integer(4),
        Value::Integer(3),
        Value::Integer(id),
    ]
}

/// A record where only the commonly filtered/aggregated columns matter.
pub fn record(quality: i64, equipment: &str, production: f64) -> Record {
    Record {
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        production,
        cost: production / 2.0,
        energy: production / 10.0,
        employees: 10,
        equipment: equipment.to_string(),
        hours: 8.0,
        sales: 0.0,
        revenue: 0.0,
        profit: 0.0,
        quality,
        satisfaction: 3,
        id: 0,
    }
}

/// Dataset from `(quality, equipment, production)` triples, ids assigned in order.
pub fn dataset(rows: &[(i64, &str, f64)]) -> Dataset {
    let records = rows
        .iter()
        .enumerate()
        .map(|(i, &(q, eq, p))| Record {
            id: i as i64,
            ..record(q, eq, p)
        })
        .collect();
    Dataset::from_records(records)
}
