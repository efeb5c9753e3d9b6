use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Columns projected out of the raw export, in output order.
pub const KEPT_COLUMNS: [&str; 11] = [
    "Num_Acc", "date", "lat", "long", "age", "grav", "sexe", "atm", "lum", "dep", "hrmn",
];

/// Header of the cleaned file. `hrmn` is replaced by the derived `hour`.
pub const CLEANED_COLUMNS: [&str; 11] = [
    "Num_Acc", "date", "lat", "long", "age", "grav", "sexe", "atm", "lum", "dep", "hour",
];

/// One row of the raw export, restricted to the kept columns.
///
/// Every field stays textual here; empty fields deserialize to `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Num_Acc")]
    pub num_acc: Option<String>,
    pub date: Option<String>,
    pub lat: Option<String>,
    pub long: Option<String>,
    pub age: Option<String>,
    pub grav: Option<String>,
    pub sexe: Option<String>,
    pub atm: Option<String>,
    pub lum: Option<String>,
    pub dep: Option<String>,
    pub hrmn: Option<String>,
}

/// A raw row after type coercion. Values that failed to coerce are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercedRecord {
    pub num_acc: Option<String>,
    pub date: Option<NaiveDate>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub age: Option<f64>,
    pub grav: Option<String>,
    pub sexe: Option<String>,
    pub atm: Option<String>,
    pub lum: Option<String>,
    pub dep: Option<String>,
    pub hour: Option<u32>,
}

/// A row of the cleaned dataset. Field order matches [`CLEANED_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedRecord {
    #[serde(rename = "Num_Acc")]
    pub num_acc: Option<String>,
    pub date: NaiveDate,
    pub lat: f64,
    pub long: f64,
    pub age: i64,
    pub grav: Option<String>,
    pub sexe: Option<String>,
    pub atm: Option<String>,
    pub lum: Option<String>,
    pub dep: Option<String>,
    pub hour: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningSummary {
    pub input_rows: usize,
    pub dropped_missing: usize,
    pub dropped_zero_latitude: usize,
    pub output_rows: usize,
}

impl CleaningSummary {
    pub fn dropped_total(&self) -> usize {
        self.dropped_missing + self.dropped_zero_latitude
    }
}
