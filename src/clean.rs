use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime, Timelike};
use tracing::debug;

use crate::config::CleanerPaths;
use crate::error::Result;
use crate::io;
use crate::models::{CleanedRecord, CleaningSummary, CoercedRecord, RawRecord};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub summary: CleaningSummary,
    /// `None` on a dry run.
    pub output: Option<PathBuf>,
}

/// Load, clean and write one raw export. Nothing is written when loading fails
/// or when `dry_run` is set.
pub fn clean_file(paths: &CleanerPaths, dry_run: bool) -> Result<CleaningOutcome> {
    let raw = io::load_raw(&paths.raw)?;
    let (records, summary) = clean_records(raw);

    let output = if dry_run {
        None
    } else {
        io::write_cleaned(&paths.cleaned, &records)?;
        Some(paths.cleaned.clone())
    };

    Ok(CleaningOutcome { summary, output })
}

/// Coerce every row, then drop incomplete rows, then drop zero latitudes.
/// Row order is preserved.
pub fn clean_records(raw: Vec<RawRecord>) -> (Vec<CleanedRecord>, CleaningSummary) {
    let input_rows = raw.len();
    let mut rows: Vec<CoercedRecord> = raw.into_iter().map(coerce).collect();

    rows.retain(CoercedRecord::is_complete);
    let dropped_missing = input_rows - rows.len();
    debug!(dropped = dropped_missing, "dropped rows with missing fields");

    let complete = rows.len();
    rows.retain(|row| !row.has_sentinel_latitude());
    let dropped_zero_latitude = complete - rows.len();
    debug!(dropped = dropped_zero_latitude, "dropped rows with zero latitude");

    let cleaned: Vec<CleanedRecord> = rows.into_iter().filter_map(finalize).collect();
    let summary = CleaningSummary {
        input_rows,
        dropped_missing,
        dropped_zero_latitude,
        output_rows: cleaned.len(),
    };

    (cleaned, summary)
}

/// Convert textual fields to typed ones. Never fails; bad values become `None`.
pub fn coerce(raw: RawRecord) -> CoercedRecord {
    CoercedRecord {
        date: parse_date(raw.date.as_deref()),
        lat: parse_number(raw.lat.as_deref()),
        long: parse_number(raw.long.as_deref()),
        age: parse_number(raw.age.as_deref()),
        hour: parse_hour(raw.hrmn.as_deref()),
        num_acc: raw.num_acc,
        grav: raw.grav,
        sexe: raw.sexe,
        atm: raw.atm,
        lum: raw.lum,
        dep: raw.dep,
    }
}

impl CoercedRecord {
    pub fn is_complete(&self) -> bool {
        self.date.is_some()
            && self.lat.is_some()
            && self.long.is_some()
            && self.age.is_some()
            && self.hour.is_some()
    }

    pub fn has_sentinel_latitude(&self) -> bool {
        self.lat == Some(0.0)
    }
}

/// Fix the final integer types. Returns `None` only for incomplete rows, which
/// have already been filtered out by the time this runs.
pub fn finalize(row: CoercedRecord) -> Option<CleanedRecord> {
    Some(CleanedRecord {
        date: row.date?,
        lat: row.lat?,
        long: row.long?,
        age: row.age?.trunc() as i64,
        hour: row.hour?,
        num_acc: row.num_acc,
        grav: row.grav,
        sexe: row.sexe,
        atm: row.atm,
        lum: row.lum,
        dep: row.dep,
    })
}

/// Calendar date, optionally followed by a time of day which is discarded.
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    let (date_part, time_part) = match value.find([' ', 'T']) {
        Some(idx) => (&value[..idx], Some(value[idx + 1..].trim())),
        None => (value, None),
    };

    if let Some(time) = time_part {
        TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())?;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

pub fn parse_number(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Hour of an `HH:MM` time of day.
pub fn parse_hour(value: Option<&str>) -> Option<u32> {
    NaiveTime::parse_from_str(value?.trim(), "%H:%M")
        .ok()
        .map(|time| time.hour())
}
