use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;

use crate::error::ApiError;

/// A row that can be written as one CSV record.
pub trait CsvRecord {
    const HEADERS: &'static [&'static str];

    fn record(&self) -> Vec<String>;
}

/// Render rows as RFC 4180 CSV with a header line.
pub fn to_csv<R: CsvRecord>(rows: &[R]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(R::HEADERS)?;
    for row in rows {
        writer.write_record(row.record())?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn export_filename(entity: &str, date: NaiveDate) -> String {
    format!("{}-{}.csv", entity, date.format("%Y-%m-%d"))
}

/// A downloadable CSV body.
pub struct CsvDownload {
    pub filename: String,
    pub body: String,
}

impl CsvDownload {
    pub fn new<R: CsvRecord>(entity: &str, date: NaiveDate, rows: &[R]) -> Result<Self, ApiError> {
        let body = to_csv(rows).map_err(|e| {
            tracing::error!("Failed to render CSV for {}: {}", entity, e);
            ApiError::internal_server_error("Failed to render export")
        })?;
        Ok(Self {
            filename: export_filename(entity, date),
            body,
        })
    }
}

impl IntoResponse for CsvDownload {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        let disposition = HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
        (
            [
                (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.body,
        )
            .into_response()
    }
}
