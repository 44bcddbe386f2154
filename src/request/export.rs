//! Writing requests back out as CSV: input-format workloads and result records.

use super::Request;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write requests in the loader's input format (user_id,request_time,processing_time)
pub fn write_requests_csv<W: Write>(mut out: W, requests: &[Request]) -> std::io::Result<()> {
    writeln!(out, "user_id,request_time,processing_time")?;
    for request in requests {
        writeln!(
            out,
            "{},{},{}",
            escape_csv(&request.request_id),
            request.arrival_time,
            request.service_duration
        )?;
    }
    out.flush()
}

/// Write completed and rejected records, one row per request.
///
/// Rejected requests carry the rejection sentinel in `completion_time` and
/// empty service columns.
pub fn write_records_csv<W: Write>(mut out: W, records: &[Request]) -> std::io::Result<()> {
    writeln!(
        out,
        "user_id,arrival_time,service_duration,enqueue_time,service_start_time,completion_time,status,endpoint_used,remote_fault"
    )?;
    for record in records {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            escape_csv(&record.request_id),
            record.arrival_time,
            record.service_duration,
            optional(record.enqueue_time),
            optional(record.service_start_time),
            record.completion_time_or_sentinel(),
            record.status,
            record
                .endpoint_used
                .map(|endpoint| endpoint.to_string())
                .unwrap_or_default(),
            record.remote_fault,
        )?;
    }
    out.flush()
}

/// Create `path` and write the records to it
pub fn save_records_csv<P: AsRef<Path>>(path: P, records: &[Request]) -> std::io::Result<()> {
    write_records_csv(BufWriter::new(File::create(path)?), records)
}

/// Create `path` and write the requests to it in input format
pub fn save_requests_csv<P: AsRef<Path>>(path: P, requests: &[Request]) -> std::io::Result<()> {
    write_requests_csv(BufWriter::new(File::create(path)?), requests)
}

/// Quote a field that holds a delimiter, quote or line break
fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
