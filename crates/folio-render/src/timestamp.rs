//! Timestamp parsing and `<time>` markup.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Date format shown inside the `<time>` element.
const SHORT_FORMAT: &str = "%Y-%m-%d";

/// Date-time format shown in the `<time>` tooltip.
const FULL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// HTML character reference for a line feed, used inside the tooltip.
const TOOLTIP_NEWLINE: &str = "&#10;";

/// Parse an ISO-8601 timestamp.
///
/// Accepts, in order:
/// - RFC 3339 (`2024-03-01T09:00:00Z`, `2024-03-01T09:00:00.5+02:00`)
/// - Date-time without offset, taken as UTC (`2024-03-01T09:00:00`)
/// - Bare date, taken as midnight UTC (`2024-03-01`)
///
/// Returns `None` for empty or unparseable values.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render creation/update timestamps as a `<time>` element.
///
/// The element shows the creation date in emphasis (markdown `*...*`, since
/// the markup is expanded before the markdown transform) and carries both
/// full timestamps in its tooltip:
///
/// ```text
/// <time datetime="2024-03-01T09:00:00Z" title="Created at: 2024-03-01 09:00:00&#10;Updated at: 2024-03-02 12:30:00">*2024-03-01*</time>
/// ```
#[must_use]
pub fn time_markup(created: DateTime<Utc>, updated: DateTime<Utc>) -> String {
    format!(
        "<time datetime=\"{datetime}\" title=\"Created at: {created_full}{TOOLTIP_NEWLINE}Updated at: {updated_full}\">*{short}*</time>",
        datetime = created.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        created_full = created.format(FULL_FORMAT),
        updated_full = updated.format(FULL_FORMAT),
        short = created.format(SHORT_FORMAT),
    )
}
