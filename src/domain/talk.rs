use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

pub const MAX_TITLE_CHARS: usize = 500;
pub const MAX_AUTHOR_CHARS: usize = 200;
pub const MAX_LINK_CHARS: usize = 1000;

/// Month-name formats accepted for the `date` column, tried in order.
const DATE_FORMATS: [&str; 2] = ["%B %Y", "%b %Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Parses `December 2021` or `Dec 2021`. The first matching format wins.
    pub fn parse_month_name(value: &str) -> Result<Self, TalkRecordError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(TalkRecordError::MissingField("date"));
        }

        // chrono needs a day to build a date, so pin it to the first.
        let with_day = format!("1 {}", value);
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(&with_day, &format!("%d {}", format)).ok())
            .map(|date| Self {
                year: date.year(),
                month: date.month(),
            })
            .ok_or_else(|| TalkRecordError::InvalidDate(value.to_string()))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One CSV row as read from the upload, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TalkCsvRecord {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub views: Option<String>,
    pub likes: Option<String>,
    pub link: Option<String>,
}

/// A validated talk ready for the batch sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalkRequest {
    pub title: String,
    pub author: String,
    pub date: YearMonth,
    pub views: i64,
    pub likes: i64,
    pub link: String,
}

impl TryFrom<TalkCsvRecord> for TalkRequest {
    type Error = TalkRecordError;

    fn try_from(record: TalkCsvRecord) -> Result<Self, Self::Error> {
        let title = required_text(record.title, "title", MAX_TITLE_CHARS)?;
        let author = required_text(record.author, "author", MAX_AUTHOR_CHARS)?;
        let date = YearMonth::parse_month_name(record.date.as_deref().unwrap_or_default())?;
        let views = counter(record.views, "views")?;
        let likes = counter(record.likes, "likes")?;
        let link = required_text(record.link, "link", MAX_LINK_CHARS)?;

        Ok(Self {
            title,
            author,
            date,
            views,
            likes,
            link,
        })
    }
}

fn required_text(
    value: Option<String>,
    field: &'static str,
    max_chars: usize,
) -> Result<String, TalkRecordError> {
    let value = value.as_deref().map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(TalkRecordError::MissingField(field));
    }
    if value.chars().count() > max_chars {
        return Err(TalkRecordError::TooLong { field, max_chars });
    }
    Ok(value.to_string())
}

/// Blank counters read as zero; negative ones are clamped to zero.
fn counter(value: Option<String>, field: &'static str) -> Result<i64, TalkRecordError> {
    let value = value.as_deref().map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<i64>()
        .map(|n| n.max(0))
        .map_err(|_| TalkRecordError::InvalidCounter {
            field,
            value: value.to_string(),
        })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TalkRecordError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("{field} exceeds {max_chars} characters")]
    TooLong {
        field: &'static str,
        max_chars: usize,
    },
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid {field}: {value}")]
    InvalidCounter { field: &'static str, value: String },
}
