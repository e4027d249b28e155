//! Calendar encodings of the transaction timestamp
//!
//! Row-local features: they need neither partitioning nor sorting, and the
//! table keeps its row order and index.

use super::orderer::TimeOrderer;
use crate::error::Result;
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use fraudagg_core::{Column, Table, Value};
use std::f64::consts::TAU;
use tracing::debug;

/// Output column names
pub const IS_WEEKDAY: &str = "is_weekday";
pub const IS_NIGHT: &str = "is_night";
pub const TX_TIME_COS: &str = "tx_time_cos";
pub const TX_TIME_SIN: &str = "tx_time_sin";

/// Last hour of the day still counted as night
const NIGHT_END_HOUR: u32 = 6;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Cyclic encoding applied to the fraction of the day elapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayTimeEncoding {
    Cos,
    Sin,
}

/// 1 for Monday to Friday, 0 for the weekend
pub fn is_weekday(ts: &DateTime<Utc>) -> i64 {
    match ts.weekday() {
        Weekday::Sat | Weekday::Sun => 0,
        _ => 1,
    }
}

/// 1 from midnight through the end of hour 6, else 0
pub fn is_night(ts: &DateTime<Utc>) -> i64 {
    i64::from(ts.hour() <= NIGHT_END_HOUR)
}

/// Cosine or sine of `2π · seconds_since_midnight / 86400`
pub fn encode_day_time(ts: &DateTime<Utc>, encoding: DayTimeEncoding) -> f64 {
    let angle = TAU * f64::from(ts.num_seconds_from_midnight()) / SECONDS_PER_DAY;
    match encoding {
        DayTimeEncoding::Cos => angle.cos(),
        DayTimeEncoding::Sin => angle.sin(),
    }
}

/// Append `is_weekday`, `is_night`, `tx_time_cos` and `tx_time_sin`
pub fn add_calendar_features(table: &Table, datetime_col: &str) -> Result<Table> {
    let timestamps = TimeOrderer::datetimes(table, datetime_col)?;

    let mut result = table.clone();
    result.push_column(Column::new(
        IS_WEEKDAY,
        timestamps.iter().map(|ts| Value::Integer(is_weekday(ts))).collect(),
    ))?;
    result.push_column(Column::new(
        IS_NIGHT,
        timestamps.iter().map(|ts| Value::Integer(is_night(ts))).collect(),
    ))?;
    result.push_column(Column::new(
        TX_TIME_COS,
        timestamps
            .iter()
            .map(|ts| Value::Number(encode_day_time(ts, DayTimeEncoding::Cos)))
            .collect(),
    ))?;
    result.push_column(Column::new(
        TX_TIME_SIN,
        timestamps
            .iter()
            .map(|ts| Value::Number(encode_day_time(ts, DayTimeEncoding::Sin)))
            .collect(),
    ))?;

    debug!(rows = result.num_rows(), "Added calendar features");
    Ok(result)
}
