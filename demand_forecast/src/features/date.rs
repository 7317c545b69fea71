//! Calendar fields derived from the row date

use super::FeatureFrame;
use crate::error::Result;
use chrono::{Datelike, NaiveDate};

/// Calendar feature names, in the order they are added
pub const DATE_FEATURES: [&str; 9] = [
    "month",
    "day_of_month",
    "day_of_year",
    "week_of_year",
    "day_of_week",
    "year",
    "is_wknd",
    "is_month_start",
    "is_month_end",
];

/// Calendar fields for one date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub month: u32,
    pub day_of_month: u32,
    pub day_of_year: u32,
    pub week_of_year: u32,
    /// Monday = 0
    pub day_of_week: u32,
    pub year: i32,
    /// `day_of_week / 4`, so Friday counts as a weekend day
    pub is_wknd: u32,
    pub is_month_start: u32,
    pub is_month_end: u32,
}

impl CalendarFields {
    pub fn from_date(date: NaiveDate) -> Self {
        let day_of_week = date.weekday().num_days_from_monday();
        let is_month_end = date
            .succ_opt()
            .map_or(true, |next| next.month() != date.month());

        Self {
            month: date.month(),
            day_of_month: date.day(),
            day_of_year: date.ordinal(),
            week_of_year: date.iso_week().week(),
            day_of_week,
            year: date.year(),
            is_wknd: day_of_week / 4,
            is_month_start: u32::from(date.day() == 1),
            is_month_end: u32::from(is_month_end),
        }
    }

    /// Values in `DATE_FEATURES` order
    pub fn values(&self) -> [f64; 9] {
        [
            self.month as f64,
            self.day_of_month as f64,
            self.day_of_year as f64,
            self.week_of_year as f64,
            self.day_of_week as f64,
            self.year as f64,
            self.is_wknd as f64,
            self.is_month_start as f64,
            self.is_month_end as f64,
        ]
    }
}

/// Adds the nine calendar columns
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFeatureExtractor;

impl DateFeatureExtractor {
    pub fn apply(&self, frame: &mut FeatureFrame) -> Result<()> {
        let fields: Vec<[f64; 9]> = frame
            .base()
            .dates()
            .iter()
            .map(|&d| CalendarFields::from_date(d).values())
            .collect();

        for (idx, name) in DATE_FEATURES.iter().enumerate() {
            let column = fields.iter().map(|row| Some(row[idx])).collect();
            frame.push_column(*name, column)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friday_counts_as_weekend() {
        // 2024-01-04 is a Thursday
        let thursday = CalendarFields::from_date("2024-01-04".parse().unwrap());
        let friday = CalendarFields::from_date("2024-01-05".parse().unwrap());
        let sunday = CalendarFields::from_date("2024-01-07".parse().unwrap());

        assert_eq!((thursday.day_of_week, thursday.is_wknd), (3, 0));
        assert_eq!((friday.day_of_week, friday.is_wknd), (4, 1));
        assert_eq!((sunday.day_of_week, sunday.is_wknd), (6, 1));
    }

    #[test]
    fn test_month_boundaries() {
        let leap_end = CalendarFields::from_date("2024-02-29".parse().unwrap());
        assert_eq!(leap_end.is_month_end, 1);
        assert_eq!(leap_end.day_of_year, 60);

        let start = CalendarFields::from_date("2024-03-01".parse().unwrap());
        assert_eq!(start.is_month_start, 1);
        assert_eq!(start.is_month_end, 0);
    }

    #[test]
    fn test_iso_week_at_year_start() {
        // 2021-01-01 belongs to ISO week 53 of 2020
        let fields = CalendarFields::from_date("2021-01-01".parse().unwrap());
        assert_eq!(fields.week_of_year, 53);
        assert_eq!(fields.year, 2021);
    }
}
