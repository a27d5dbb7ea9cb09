use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::models::AirQualityRecord;

use super::{group_in_encounter_order, mean};

// ---

/// Average AQI of one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAverage {
    // ---
    pub region: String,
    pub mean_aqi: f64,
    pub count: usize,
}

/// Grouping key of a monthly trend.
///
/// Well-formed `YYYY-MM-DD` dates become `Month`; anything else is kept
/// verbatim as `Raw` and forms its own group. Equality and ordering are
/// defined on the rendered label, so both kinds sort lexicographically
/// together and a raw `"2025-01"` shares a group with parsed January 2025.
#[derive(Debug, Clone)]
pub enum MonthKey {
    Month { year: i32, month: u32 },
    Raw(String),
}

impl MonthKey {
    /// Parse a strict `YYYY-MM-DD` date. Anything else, including dates with
    /// surrounding or embedded whitespace, keys on the raw text.
    pub fn from_date(date: &str) -> Self {
        // ---
        if date.chars().any(char::is_whitespace) {
            return MonthKey::Raw(date.to_string());
        }
        match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(d) => MonthKey::Month {
                year: d.year(),
                month: d.month(),
            },
            Err(_) => MonthKey::Raw(date.to_string()),
        }
    }

    pub fn label(&self) -> Cow<'_, str> {
        // ---
        match self {
            MonthKey::Month { year, month } => Cow::Owned(format!("{}-{:02}", year, month)),
            MonthKey::Raw(raw) => Cow::Borrowed(raw),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl PartialEq for MonthKey {
    fn eq(&self, other: &Self) -> bool {
        self.label() == other.label()
    }
}

impl Eq for MonthKey {}

impl PartialOrd for MonthKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MonthKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label().cmp(&other.label())
    }
}

/// Average AQI of one month (or raw date label).
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    // ---
    pub key: MonthKey,
    pub mean_aqi: f64,
    pub count: usize,
}

/// Average AQI per region, highest average first.
///
/// Regions are grouped by exact string. The sort is stable, so regions with
/// identical averages keep their first-encounter order.
pub fn average_aqi_by_region<'a, I>(records: I) -> Vec<RegionAverage>
where
    I: IntoIterator<Item = &'a AirQualityRecord>,
{
    // ---
    let groups = group_in_encounter_order(records.into_iter().map(|r| (r.region.as_str(), r.aqi)));

    let mut averages: Vec<RegionAverage> = groups
        .into_iter()
        .map(|(region, values)| RegionAverage {
            region: region.to_string(),
            mean_aqi: mean(&values),
            count: values.len(),
        })
        .collect();

    averages.sort_by(|a, b| b.mean_aqi.total_cmp(&a.mean_aqi));
    tracing::debug!("Computed averages for {} regions", averages.len());
    averages
}

/// Average AQI per month, ascending by key label.
///
/// Intended for the records of a single region. Dates that do not parse as
/// `YYYY-MM-DD` are grouped under their raw text instead of failing.
pub fn monthly_trend<'a, I>(records: I) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a AirQualityRecord>,
{
    // ---
    let mut months: BTreeMap<MonthKey, Vec<i64>> = BTreeMap::new();
    for r in records {
        months.entry(MonthKey::from_date(&r.date)).or_default().push(r.aqi);
    }

    months
        .into_iter()
        .map(|(key, values)| TrendPoint {
            key,
            mean_aqi: mean(&values),
            count: values.len(),
        })
        .collect()
}
