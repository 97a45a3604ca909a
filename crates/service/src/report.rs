//! CSV export of the follower report.

use csv::{Terminator, WriterBuilder};
use serde::Serialize;

use crate::errors::ServiceError;
use crate::vacation::ReportRow;

pub const CSV_HEADER: [&str; 2] = ["destination", "followersCount"];

/// One CSV line (serialization only)
#[derive(Debug, Serialize)]
struct CsvReportRow<'a> {
    destination: &'a str,
    followers_count: i64,
}

/// Render the report as CSV. Fields containing a comma, quote or line break
/// are quoted with inner quotes doubled.
pub fn to_csv(rows: &[ReportRow]) -> Result<String, ServiceError> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)
        .map_err(|e| ServiceError::Storage(e.to_string()))?;
    for row in rows {
        wtr.serialize(CsvReportRow { destination: &row.destination, followers_count: row.followers_count })
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
    }
    let bytes = wtr.into_inner().map_err(|e| ServiceError::Storage(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::Storage(e.to_string()))
}
