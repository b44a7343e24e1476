// The row parser: turns one raw line of a poll file into typed values.

use csv::{StringRecord, Trim};
use log::debug;
use std::io::Read;
use std::str::FromStr;

use crate::config::*;

/// The minimum number of comma-separated fields of a data row.
pub const MIN_FIELDS: usize = 5;

/// A fully parsed data row.
///
/// All the fields are validated before a row is handed to the store, so that a
/// failure never leaves a partially appended record behind.
#[derive(PartialEq, Debug, Clone)]
pub struct ParsedRow {
    pub month: String,
    pub date: i64,
    pub sample: u64,
    pub sample_type: SampleType,
    pub harris: f64,
    pub trump: f64,
}

/// A reader over the rows of a poll file.
///
/// Quotes carry no meaning, rows may have any number of fields and every field
/// is trimmed. Empty lines produce no record.
pub fn poll_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(rdr)
}

/// Parses the record found on line `ordinal` (starting at 0) of a poll file.
///
/// Returns `Ok(None)` for the header (the first line, whatever its content) and
/// for rows with fewer than 5 fields. Fields after the fifth are ignored.
pub fn parse_row(ordinal: usize, record: &StringRecord) -> Result<Option<ParsedRow>, PollError> {
    if ordinal == 0 {
        return Ok(None);
    }
    let lineno = ordinal + 1;
    let fields: Vec<&str> = record.iter().collect();
    if fields.len() < MIN_FIELDS {
        debug!(
            "parse_row: lineno {}: skipping incomplete row {:?}",
            lineno, fields
        );
        return Ok(None);
    }

    let month = fields[0].to_string();
    let date: i64 = parse_number(lineno, Column::Date, fields[1])?;

    // The sample descriptor looks like '1880 LV' or '820 RV'.
    let mut sample_parts = fields[2].split_whitespace();
    let sample: u64 = parse_number(
        lineno,
        Column::SampleSize,
        sample_parts.next().unwrap_or(""),
    )?;
    let type_token = sample_parts.next();
    let sample_type = if sample_parts.next().is_none() {
        SampleType::from_token(type_token)
    } else {
        SampleType::Unknown
    };

    let harris = to_fraction(lineno, Column::HarrisResult, fields[3])?;
    let trump = to_fraction(lineno, Column::TrumpResult, fields[4])?;

    Ok(Some(ParsedRow {
        month,
        date,
        sample,
        sample_type,
        harris,
        trump,
    }))
}

/// Converts a result that is either a fraction (`0.4934`) or a percentage
/// (`49.34`) to a fraction. Any value above 1 is read as a percentage.
///
/// Values that are still outside [0, 1] after this conversion (negative, above
/// 100, NaN or infinite) are rejected with `ResultOutOfRange`, which is stricter
/// than the plain percentage rule: stored results are always fractions.
pub fn to_fraction(lineno: usize, column: Column, s: &str) -> Result<f64, PollError> {
    let raw: f64 = parse_number(lineno, column, s)?;
    let v = if raw > 1.0 { raw / 100.0 } else { raw };
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(PollError::ResultOutOfRange {
            lineno,
            column,
            value: raw,
        })
    }
}

fn parse_number<T: FromStr>(lineno: usize, column: Column, s: &str) -> Result<T, PollError> {
    s.parse::<T>().map_err(|_| PollError::MalformedRow {
        lineno,
        column,
        value: s.to_string(),
    })
}
