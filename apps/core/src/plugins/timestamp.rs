use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::model::ResultItem;
use crate::plugin::{Plugin, PluginError};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Unix timestamp and local date conversion, both directions plus `now`.
pub struct TimestampPlugin;

impl Plugin for TimestampPlugin {
    fn name(&self) -> &'static str {
        "Timestamp"
    }

    fn description(&self) -> &'static str {
        "Convert between Unix timestamps and dates"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["t"]
    }

    fn execute(&self, query: &str) -> Result<Vec<ResultItem>, PluginError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        if trimmed.eq_ignore_ascii_case("now") {
            let now = Local::now();
            let timestamp = now.timestamp();
            let date = now.format(DISPLAY_FORMAT).to_string();
            return Ok(vec![
                ResultItem::plugin_result(
                    format!("Current timestamp: {timestamp}"),
                    timestamp.to_string(),
                ),
                ResultItem::plugin_result(format!("Current date: {date}"), date.clone()),
            ]);
        }

        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(timestamp_to_date(trimmed));
        }

        Ok(date_to_timestamp(trimmed))
    }
}

fn timestamp_to_date(digits: &str) -> Vec<ResultItem> {
    let Ok(timestamp) = digits.parse::<i64>() else {
        return vec![ResultItem::plugin_error("Timestamp out of range")];
    };
    match Local.timestamp_opt(timestamp, 0).earliest() {
        Some(datetime) => {
            let date = datetime.format(DISPLAY_FORMAT).to_string();
            vec![ResultItem::plugin_result(
                format!("Date: {date}"),
                date.clone(),
            )]
        }
        None => vec![ResultItem::plugin_error("Timestamp out of range")],
    }
}

fn date_to_timestamp(text: &str) -> Vec<ResultItem> {
    let mut naive: Option<NaiveDateTime> = None;
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            naive = Some(parsed);
            break;
        }
    }
    if naive.is_none() {
        for format in DATE_FORMATS {
            if let Ok(day) = NaiveDate::parse_from_str(text, format) {
                naive = day.and_hms_opt(0, 0, 0);
                break;
            }
        }
    }

    let Some(naive) = naive else {
        return vec![ResultItem::plugin_error("Invalid date format")];
    };
    match Local.from_local_datetime(&naive).earliest() {
        Some(datetime) => {
            let timestamp = datetime.timestamp();
            vec![ResultItem::plugin_result(
                format!("Timestamp: {timestamp}"),
                timestamp.to_string(),
            )]
        }
        None => vec![ResultItem::plugin_error("Invalid local time")],
    }
}
