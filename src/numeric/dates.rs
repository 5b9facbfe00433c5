// ============================================================================
// Calendar Dates
// Packing of calendar dates into display numbers (M.DDYYYY / D.MMYYYY)
// ============================================================================

use super::errors::{CalcError, CalcResult};
use chrono::{Datelike, NaiveDate, TimeDelta};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest day offset accepted by date arithmetic (well past year 9999)
const MAX_DAY_OFFSET: f64 = 10_000_000.0;

/// Order of day and month in an encoded date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "UPPERCASE")
)]
pub enum DateFormat {
    /// `M.DDYYYY`
    #[default]
    Mdy,
    /// `D.MMYYYY`
    Dmy,
}

/// Decode a display number into a calendar date.
///
/// The value is read with six fractional digits; the date must exist on the
/// calendar (no 31st of a 30-day month, no 29 February outside leap years).
pub fn decode_date(value: f64, format: DateFormat) -> CalcResult<NaiveDate> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::InvalidDate);
    }

    let text = format!("{:.6}", value);
    let (int_part, frac_part) = text.split_once('.').ok_or(CalcError::InvalidDate)?;
    let lead = parse_field::<u32>(Some(int_part))?;
    let pair = parse_field::<u32>(frac_part.get(0..2))?;
    let year = parse_field::<i32>(frac_part.get(2..6))?;

    let (month, day) = match format {
        DateFormat::Mdy => (lead, pair),
        DateFormat::Dmy => (pair, lead),
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or(CalcError::InvalidDate)
}

/// Encode a calendar date as a display number
pub fn encode_date(date: NaiveDate, format: DateFormat) -> CalcResult<f64> {
    let year = date.year();
    if !(0..=9999).contains(&year) {
        return Err(CalcError::InvalidDate);
    }

    let text = match format {
        DateFormat::Mdy => format!("{}.{:02}{:04}", date.month(), date.day(), year),
        DateFormat::Dmy => format!("{}.{:02}{:04}", date.day(), date.month(), year),
    };
    text.parse::<f64>().map_err(|_| CalcError::InvalidDate)
}

/// Day of week, Monday = 1 through Sunday = 7
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// Signed number of calendar days from `start` to `end`
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    end.signed_duration_since(start).num_days()
}

/// Move a date by a (truncated) number of days
pub fn add_days(date: NaiveDate, days: f64) -> CalcResult<NaiveDate> {
    if !days.is_finite() || days.abs() > MAX_DAY_OFFSET {
        return Err(CalcError::InvalidDate);
    }
    let delta = TimeDelta::try_days(days.trunc() as i64).ok_or(CalcError::InvalidDate)?;
    date.checked_add_signed(delta).ok_or(CalcError::InvalidDate)
}

/// DATE key: encoded base date plus days, returning the encoded result and
/// its day of week
pub fn shift_encoded_date(base: f64, days: f64, format: DateFormat) -> CalcResult<(f64, u8)> {
    let date = add_days(decode_date(base, format)?, days)?;
    Ok((encode_date(date, format)?, day_of_week(date)))
}

/// ΔDYS key: days between two encoded dates
pub fn days_between_encoded(start: f64, end: f64, format: DateFormat) -> CalcResult<i64> {
    Ok(days_between(
        decode_date(start, format)?,
        decode_date(end, format)?,
    ))
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>) -> CalcResult<T> {
    field
        .and_then(|f| f.parse::<T>().ok())
        .ok_or(CalcError::InvalidDate)
}
