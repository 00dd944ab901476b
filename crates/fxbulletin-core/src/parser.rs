//! Strict parser for the pipe-separated daily bulletin.
//!
//! Expected format:
//!
//! ```text
//! 23 Dec 2025 #248
//! Country|Currency|Amount|Code|Rate
//! Australia|dollar|1|AUD|13.818
//! ```
//!
//! Parsing is all-or-nothing: the first structural violation aborts with a
//! single [`ParseError`] and no partial bulletin is returned.

use std::str::FromStr;

use rust_decimal::Decimal;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::domain::{BulletinRecord, DailyBulletin, COLUMN_HEADER};
use crate::ParseError;

const MIN_LINE_COUNT: usize = 3;
const HEADER_PART_COUNT: usize = 2;
const RECORD_FIELD_COUNT: usize = 5;

const HEADER_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[day padding:none] [month repr:short case_sensitive:false] [year]");

/// Parser for the daily bulletin text format.
#[derive(Debug, Clone, Copy, Default)]
pub struct BulletinParser;

impl BulletinParser {
    pub const fn new() -> Self {
        Self
    }

    pub fn parse(&self, raw: &str) -> Result<DailyBulletin, ParseError> {
        parse_bulletin(raw)
    }
}

/// Parse raw bulletin text into a [`DailyBulletin`].
pub fn parse_bulletin(raw: &str) -> Result<DailyBulletin, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    // Blank lines anywhere in the text are dropped before line roles are assigned.
    let lines: Vec<&str> = raw
        .split(['\r', '\n'])
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() < MIN_LINE_COUNT {
        return Err(ParseError::InsufficientLines {
            line_count: lines.len(),
        });
    }

    let (date, sequence) = parse_header(lines[0])?;
    validate_columns(lines[1])?;

    let records = lines[2..]
        .iter()
        .enumerate()
        .map(|(index, line)| parse_record(index + MIN_LINE_COUNT, line))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(%date, sequence, records = records.len(), "parsed bulletin");

    Ok(DailyBulletin {
        date,
        sequence,
        records,
    })
}

fn parse_header(header: &str) -> Result<(Date, u32), ParseError> {
    let parts: Vec<&str> = header.split('#').map(str::trim).collect();
    if parts.len() != HEADER_PART_COUNT {
        return Err(ParseError::MalformedHeader {
            header: header.to_owned(),
        });
    }

    let date = Date::parse(parts[0], HEADER_DATE).map_err(|_| ParseError::InvalidDate {
        value: parts[0].to_owned(),
    })?;

    let sequence = parts[1]
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidSequence {
            value: parts[1].to_owned(),
        })?;

    Ok((date, sequence))
}

fn validate_columns(line: &str) -> Result<(), ParseError> {
    if !line.trim().eq_ignore_ascii_case(COLUMN_HEADER) {
        return Err(ParseError::UnexpectedColumns {
            value: line.to_owned(),
        });
    }
    Ok(())
}

fn parse_record(line_number: usize, line: &str) -> Result<BulletinRecord, ParseError> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() != RECORD_FIELD_COUNT {
        return Err(ParseError::MalformedRecord {
            line: line_number,
            fields: fields.len(),
            value: line.to_owned(),
        });
    }

    let amount = fields[2]
        .parse::<u32>()
        .ok()
        .filter(|amount| *amount > 0)
        .ok_or_else(|| ParseError::InvalidAmount {
            line: line_number,
            value: fields[2].to_owned(),
        })?;

    let rate = Some(fields[4])
        .filter(|raw| is_plain_decimal(raw))
        .and_then(|raw| Decimal::from_str(raw).ok())
        .filter(|rate| *rate > Decimal::ZERO)
        .ok_or_else(|| ParseError::InvalidRate {
            line: line_number,
            value: fields[4].to_owned(),
        })?;

    Ok(BulletinRecord {
        country: fields[0].to_owned(),
        currency_name: fields[1].to_owned(),
        amount,
        code: fields[3].to_owned(),
        rate,
    })
}

/// Digits with at most one `.`; no sign, exponent or digit separators.
fn is_plain_decimal(raw: &str) -> bool {
    let mut digits = 0;
    let mut dots = 0;
    for ch in raw.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}
