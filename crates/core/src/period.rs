use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reporting window a user can ask for: today, this week, or this month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Day,
    Week,
    Month,
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportPeriod::Day => write!(f, "day"),
            ReportPeriod::Week => write!(f, "week"),
            ReportPeriod::Month => write!(f, "month"),
        }
    }
}

impl std::str::FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "dia" => Ok(ReportPeriod::Day),
            "week" | "semana" => Ok(ReportPeriod::Week),
            "month" | "mes" | "mês" => Ok(ReportPeriod::Month),
            other => Err(format!("Unknown report period: '{other}'")),
        }
    }
}

impl ReportPeriod {
    /// Range from the start of the period up to and including `today`.
    /// Weeks start on Monday.
    pub fn range(self, today: NaiveDate) -> DateRange {
        let start = match self {
            ReportPeriod::Day => today,
            ReportPeriod::Week => {
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
            }
            ReportPeriod::Month => today.with_day(1).unwrap_or(today),
        };
        DateRange::new(start, today)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// A due date as the user stated it, or the "no date" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateSpec {
    DayMonth {
        day: u32,
        month: u32,
        year: Option<i32>,
    },
    #[default]
    Unspecified,
}

impl DateSpec {
    pub fn day_month(day: u32, month: u32, year: Option<i32>) -> Self {
        DateSpec::DayMonth { day, month, year }
    }

    pub fn is_unspecified(self) -> bool {
        matches!(self, DateSpec::Unspecified)
    }

    /// Concrete date, taking the year from `today` when none was given.
    pub fn to_date(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateSpec::DayMonth { day, month, year } => {
                NaiveDate::from_ymd_opt(year.unwrap_or(today.year()), month, day)
            }
            DateSpec::Unspecified => None,
        }
    }
}

impl fmt::Display for DateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSpec::DayMonth { day, month, year: Some(y) } => {
                write!(f, "{day:02}/{month:02}/{y}")
            }
            DateSpec::DayMonth { day, month, year: None } => write!(f, "{day:02}/{month:02}"),
            DateSpec::Unspecified => write!(f, "Sem data"),
        }
    }
}
