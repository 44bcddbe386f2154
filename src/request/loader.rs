//! Reading request records from a comma-delimited file.
//!
//! Expected header columns: `user_id`, `request_time`, `processing_time`.
//! `request_time` holds either seconds since the start of the run or RFC 3339
//! timestamps; timestamps are rebased onto the earliest one in the file.
//! Fields may be double-quoted, with `""` standing for a literal quote; a
//! quoted field may contain commas and line breaks.

use super::Request;
use crate::error::LoadError;
use chrono::{DateTime, FixedOffset};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;

const USER_ID: &str = "user_id";
const REQUEST_TIME: &str = "request_time";
const PROCESSING_TIME: &str = "processing_time";

enum ArrivalStamp {
    Seconds(f64),
    Timestamp(DateTime<FixedOffset>),
}

/// Load requests from a CSV file on disk
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Request>, LoadError> {
    let file = File::open(path)?;
    parse_csv(file)
}

/// Parse requests from any reader producing CSV text
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Request>, LoadError> {
    let mut records = Records::new(BufReader::new(reader));

    let header = match records.next() {
        Some(record) => record?.1,
        None => return Ok(Vec::new()),
    };

    let column = |name: &'static str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))
    };
    let id_col = column(USER_ID)?;
    let time_col = column(REQUEST_TIME)?;
    let duration_col = column(PROCESSING_TIME)?;

    let mut rows = Vec::new();
    for record in records {
        let (line_no, fields) = record?;
        if fields.len() != header.len() {
            return Err(LoadError::RowLength {
                line: line_no,
                expected: header.len(),
                found: fields.len(),
            });
        }

        let stamp = parse_arrival(&fields[time_col]).ok_or_else(|| LoadError::InvalidField {
            line: line_no,
            column: REQUEST_TIME,
            value: fields[time_col].clone(),
        })?;

        let duration = fields[duration_col]
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| LoadError::InvalidField {
                line: line_no,
                column: PROCESSING_TIME,
                value: fields[duration_col].clone(),
            })?;

        rows.push((fields[id_col].clone(), stamp, duration));
    }

    resolve_arrivals(rows)
}

/// Non-blank CSV records with the line each one starts on
struct Records<B> {
    lines: Lines<B>,
    line_no: usize,
}

impl<B: BufRead> Records<B> {
    fn new(reader: B) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<B: BufRead> Iterator for Records<B> {
    type Item = Result<(usize, Vec<String>), LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;
            if record.trim().is_empty() {
                continue;
            }

            let start = self.line_no;
            // An open quote continues the record onto the next line
            loop {
                if let Some(fields) = split_row(&record) {
                    return Some(Ok((start, fields)));
                }
                match self.lines.next() {
                    Some(Ok(more)) => {
                        self.line_no += 1;
                        record.push('\n');
                        record.push_str(&more);
                    }
                    Some(Err(e)) => return Some(Err(e.into())),
                    None => return Some(Err(LoadError::UnterminatedQuote { line: start })),
                }
            }
        }
    }
}

/// Split one record into fields. Returns `None` while a quoted field is
/// still open at the end of `record`.
fn split_row(record: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = record.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c != '"' {
                field.push(c);
            } else if chars.peek() == Some(&'"') {
                chars.next();
                field.push('"');
            } else {
                in_quotes = false;
            }
            continue;
        }

        match c {
            ',' => {
                fields.push(finish_field(&mut field, quoted));
                quoted = false;
            }
            '"' if !quoted && field.trim().is_empty() => {
                field.clear();
                quoted = true;
                in_quotes = true;
            }
            c if quoted && c.is_whitespace() => {}
            c => field.push(c),
        }
    }

    if in_quotes {
        return None;
    }
    fields.push(finish_field(&mut field, quoted));
    Some(fields)
}

fn finish_field(field: &mut String, quoted: bool) -> String {
    let value = std::mem::take(field);
    if quoted {
        value
    } else {
        value.trim().to_string()
    }
}

fn parse_arrival(raw: &str) -> Option<ArrivalStamp> {
    if let Ok(seconds) = raw.parse::<f64>() {
        return (seconds.is_finite() && seconds >= 0.0).then_some(ArrivalStamp::Seconds(seconds));
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(ArrivalStamp::Timestamp)
}

fn resolve_arrivals(rows: Vec<(String, ArrivalStamp, f64)>) -> Result<Vec<Request>, LoadError> {
    let all_seconds = rows
        .iter()
        .all(|(_, stamp, _)| matches!(stamp, ArrivalStamp::Seconds(_)));
    let all_timestamps = rows
        .iter()
        .all(|(_, stamp, _)| matches!(stamp, ArrivalStamp::Timestamp(_)));
    if !all_seconds && !all_timestamps {
        return Err(LoadError::MixedTimestamps);
    }

    let origin = rows
        .iter()
        .filter_map(|(_, stamp, _)| match stamp {
            ArrivalStamp::Timestamp(ts) => Some(*ts),
            ArrivalStamp::Seconds(_) => None,
        })
        .min();

    Ok(rows
        .into_iter()
        .map(|(id, stamp, duration)| {
            let arrival = match (stamp, origin) {
                (ArrivalStamp::Seconds(seconds), _) => seconds,
                (ArrivalStamp::Timestamp(ts), Some(origin)) => seconds_between(origin, ts),
                (ArrivalStamp::Timestamp(_), None) => 0.0,
            };
            Request::new(id, arrival, duration)
        })
        .collect())
}

fn seconds_between(origin: DateTime<FixedOffset>, ts: DateTime<FixedOffset>) -> f64 {
    let delta = ts.signed_duration_since(origin);
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}
