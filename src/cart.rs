//! Broadcast cart chunk field values
//!
//! Only the values are produced here; writing the chunk into a WAV file is
//! left to an external cart writer.

use std::path::Path;

use chrono::{DateTime, FixedOffset, Local, Months, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{AudioError, Result};

pub const AES46_2002_DATE_FORMAT: &str = "%Y-%m-%d";
pub const PRSS_DATE_FORMAT: &str = "%Y/%m/%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

pub const DEFAULT_VERSION: &str = "0101";
pub const DEFAULT_PRODUCER_APP_ID: &str = "ContentDepot";
pub const DEFAULT_PRODUCER_APP_VERSION: &str = "1.0";
pub const DEFAULT_TAG_TEXT: &str = "\r\n";

/// Caller-supplied cart values; anything absent gets a default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartOptions {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cut_id: Option<String>,
    pub version: Option<String>,
    pub producer_app_id: Option<String>,
    pub producer_app_version: Option<String>,
    pub level_reference: Option<i32>,
    pub tag_text: Option<String>,
    /// RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`
    pub start_at: Option<String>,
    pub end_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartFields {
    pub title: String,
    pub artist: Option<String>,
    pub cut_id: Option<String>,
    pub version: String,
    pub producer_app_id: String,
    pub producer_app_version: String,
    pub level_reference: i32,
    pub tag_text: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
}

impl CartFields {
    pub fn from_options(audio_path: &Path, options: &CartOptions) -> Result<Self> {
        let start = match options.start_at.as_deref() {
            Some(value) => parse_datetime(value)?,
            None => Local::now().fixed_offset(),
        };
        let end = match options.end_at.as_deref() {
            Some(value) => parse_datetime(value)?,
            None => start
                .checked_add_months(Months::new(12))
                .ok_or_else(|| AudioError::InvalidArgument(format!("no end date after {}", start)))?,
        };

        let title = options.title.clone().unwrap_or_else(|| {
            audio_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        Ok(Self {
            title,
            artist: options.artist.clone(),
            cut_id: options.cut_id.clone(),
            version: options
                .version
                .clone()
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            producer_app_id: options
                .producer_app_id
                .clone()
                .unwrap_or_else(|| DEFAULT_PRODUCER_APP_ID.to_string()),
            producer_app_version: options
                .producer_app_version
                .clone()
                .unwrap_or_else(|| DEFAULT_PRODUCER_APP_VERSION.to_string()),
            level_reference: options.level_reference.unwrap_or(0),
            tag_text: options
                .tag_text
                .clone()
                .unwrap_or_else(|| DEFAULT_TAG_TEXT.to_string()),
            start_date: start.format(PRSS_DATE_FORMAT).to_string(),
            start_time: start.format(TIME_FORMAT).to_string(),
            end_date: end.format(PRSS_DATE_FORMAT).to_string(),
            end_time: end.format(TIME_FORMAT).to_string(),
        })
    }
}

/// Parse a date or date-time; values without an offset are local time
pub fn parse_datetime(value: &str) -> Result<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt);
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, AES46_2002_DATE_FORMAT)
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|e| AudioError::InvalidArgument(format!("invalid date '{}': {}", value, e)))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| AudioError::InvalidArgument(format!("nonexistent local time '{}'", value)))
}
