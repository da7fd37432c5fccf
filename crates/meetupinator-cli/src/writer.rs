//! CSV event list output.
//!
//! Start and end times are rendered in the event's own timezone, using the
//! `utc_offset` the API sends alongside `time`.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeDelta};
use meetupinator_api::EventRecord;
use serde_json::Value;
use tracing::debug;

use crate::error::CliResult;

/// Column headers, in output order.
pub const HEADERS: [&str; 7] = [
    "Group name",
    "Event name",
    "Day of week",
    "Date",
    "Start time",
    "End time",
    "Event URL",
];

/// Duration assumed when an event has none (3 hours).
const DEFAULT_DURATION_MS: i64 = 3 * 60 * 60 * 1000;

/// Writes `events` as CSV to the file at `path`, replacing it.
pub fn write_event_file(path: &Path, events: &[EventRecord]) -> CliResult<()> {
    let file = std::fs::File::create(path)?;
    write_events(file, events)?;
    debug!("wrote {} events to {}", events.len(), path.display());
    Ok(())
}

/// Writes a header row and one row per event.
pub fn write_events<W: Write>(out: W, events: &[EventRecord]) -> CliResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADERS)?;
    for event in events {
        writer.write_record(event_row(event))?;
    }
    writer.flush()?;
    Ok(())
}

fn event_row(event: &EventRecord) -> [String; 7] {
    let group_name = event
        .get("group")
        .and_then(|group| group.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let name = text_field(event, "name");
    let url = text_field(event, "event_url");

    let (day, date, start, end) = match local_span(event) {
        Some((start, end)) => (
            start.format("%A").to_string(),
            start.format("%d/%m/%Y").to_string(),
            clock_time(start),
            clock_time(end),
        ),
        None => Default::default(),
    };

    [
        group_name.to_string(),
        name.to_string(),
        day,
        date,
        start,
        end,
        url.to_string(),
    ]
}

fn text_field<'a>(event: &'a EventRecord, field: &str) -> &'a str {
    event.get(field).and_then(Value::as_str).unwrap_or_default()
}

/// Local start and end of an event, or `None` without a usable `time`.
fn local_span(event: &EventRecord) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let time = event.get("time").and_then(Value::as_i64)?;
    let offset = event.get("utc_offset").and_then(Value::as_i64).unwrap_or(0);
    let duration = event
        .get("duration")
        .and_then(Value::as_i64)
        .unwrap_or(DEFAULT_DURATION_MS);

    let start = DateTime::from_timestamp_millis(time.checked_add(offset)?)?.naive_utc();
    let end = start.checked_add_signed(TimeDelta::try_milliseconds(duration)?)?;
    Some((start, end))
}

fn clock_time(at: NaiveDateTime) -> String {
    at.format("%-I:%M %p").to_string()
}
