// ============================================================================
// Numeric Module
// Display formatting, date packing and scalar helpers shared by the engine
// ============================================================================
//
// This module provides:
// - format / format_with: the display formatter (FIX, SCI, locale separators)
// - Date packing: M.DDYYYY / D.MMYYYY encode, decode and arithmetic
// - Math helpers: factorial, FRAC, INTG, RND rounding
// - CalcError: the soft error labels ("Error 0" ... "Error 8")
//
// Everything here is pure and total: no panics, failures are values.

mod dates;
mod errors;
mod format;
mod math;

pub use dates::{
    add_days, day_of_week, days_between, days_between_encoded, decode_date, encode_date,
    shift_encoded_date, DateFormat,
};
pub use errors::{CalcError, CalcResult};
pub use format::{
    format, format_entry, format_with, DisplayFormat, NumberLocale, ENTRY_CURSOR, ERROR_TEXT,
    MAX_DECIMALS,
};
pub use math::{factorial, frac, intg, round_to_decimals};
