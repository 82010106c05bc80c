// Chunked CSV streaming of the bulk export table
use crate::domain::dashboard::ExportTable;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Local, TimeZone};
use futures::stream::Stream;
use std::fmt::Write;

const ROWS_PER_CHUNK: usize = 500;

pub fn format_timestamp<Tz: TimeZone>(time_ms: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp_millis(time_ms) {
        Some(utc) => utc.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => time_ms.to_string(),
    }
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn header_row(table: &ExportTable) -> String {
    let mut row = String::from("Timestamp");
    for column in &table.columns {
        row.push(',');
        row.push_str(&escape_field(&column.header));
    }
    row.push('\n');
    row
}

pub fn data_row<Tz: TimeZone>(table: &ExportTable, idx: usize, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut row = format_timestamp(table.timestamps_ms[idx], tz);
    for column in &table.columns {
        row.push(',');
        if let Some(Some(value)) = column.values.get(idx) {
            let _ = write!(row, "{}", value);
        }
    }
    row.push('\n');
    row
}

/// Header chunk followed by chunks of `ROWS_PER_CHUNK` rows
pub fn csv_chunks(table: ExportTable) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
    async_stream::stream! {
        yield Ok(Bytes::from(header_row(&table)));

        let mut chunk = BytesMut::new();
        for idx in 0..table.row_count() {
            chunk.put_slice(data_row(&table, idx, &Local).as_bytes());
            if (idx + 1) % ROWS_PER_CHUNK == 0 {
                yield Ok(chunk.split().freeze());
            }
        }
        if !chunk.is_empty() {
            yield Ok(chunk.freeze());
        }
    }
}

/// Streaming attachment response for the export table
pub fn csv_attachment(table: ExportTable) -> Result<Response<Body>, StatusCode> {
    let filename = format!("aquarium_data_{}.csv", Local::now().format("%Y%m%d_%H%M%S"));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from_stream(csv_chunks(table)))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
