//! Rows to be predicted
//!
//! Months and years are approximated as 30 and 365 days. A model trained
//! against horizons built this way expects the same row counts, so the
//! approximation is kept.

use crate::data::{EntityKey, SalesFrame};
use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Calendar unit of a forecast horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PeriodType {
    Day,
    Month,
    Year,
}

impl PeriodType {
    /// Days covered by one period
    pub fn days(&self) -> usize {
        match self {
            PeriodType::Day => 1,
            PeriodType::Month => 30,
            PeriodType::Year => 365,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PeriodType::Day => "D",
            PeriodType::Month => "M",
            PeriodType::Year => "Y",
        }
    }
}

impl FromStr for PeriodType {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "d" | "day" | "days" | "daily" => Ok(PeriodType::Day),
            "m" | "month" | "months" | "monthly" => Ok(PeriodType::Month),
            "y" | "year" | "years" | "yearly" => Ok(PeriodType::Year),
            other => Err(ForecastError::Input(format!(
                "Unsupported period type: {}",
                other
            ))),
        }
    }
}

impl TryFrom<String> for PeriodType {
    type Error = ForecastError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PeriodType> for String {
    fn from(value: PeriodType) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How far ahead to forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    /// A count of calendar periods
    Periods { period_type: PeriodType, count: usize },
    /// An exact number of days
    Days(usize),
}

impl Horizon {
    /// Build a period horizon, rejecting a zero count
    pub fn periods(period_type: PeriodType, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(ForecastError::Input(
                "Number of periods must be positive".to_string(),
            ));
        }
        Ok(Horizon::Periods { period_type, count })
    }

    /// Number of daily rows this horizon produces per entity
    pub fn days(&self) -> usize {
        match *self {
            Horizon::Periods { period_type, count } => period_type.days() * count,
            Horizon::Days(days) => days,
        }
    }
}

/// Which entities receive future rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityScope {
    /// Every entity observed in history
    #[default]
    All,
    /// Entities matching whichever filters are present
    Filtered { store: Option<u32>, item: Option<u32> },
}

impl EntityScope {
    pub fn from_filters(store: Option<u32>, item: Option<u32>) -> Self {
        if store.is_none() && item.is_none() {
            EntityScope::All
        } else {
            EntityScope::Filtered { store, item }
        }
    }

    pub fn store(&self) -> Option<u32> {
        match self {
            EntityScope::All => None,
            EntityScope::Filtered { store, .. } => *store,
        }
    }

    pub fn item(&self) -> Option<u32> {
        match self {
            EntityScope::All => None,
            EntityScope::Filtered { item, .. } => *item,
        }
    }

    /// History rows inside the scope
    pub fn apply(&self, history: &SalesFrame) -> SalesFrame {
        match self {
            EntityScope::All => history.clone(),
            EntityScope::Filtered { store, item } => history.filter(*store, *item),
        }
    }
}

/// Expands entities in scope against the dates following the history
#[derive(Debug, Clone, Copy, Default)]
pub struct FutureFrameSynthesizer;

impl FutureFrameSynthesizer {
    /// Future rows, sorted by (store, item, date), with no sales.
    ///
    /// Dates start the day after the latest historical date (across all
    /// entities). Entities are the product of distinct stores and items in
    /// scope, keeping only pairs that appear in history.
    pub fn synthesize(
        &self,
        history: &SalesFrame,
        horizon: Horizon,
        scope: EntityScope,
    ) -> Result<SalesFrame> {
        let last_date = history.last_date().ok_or_else(|| {
            ForecastError::Input("Cannot build a forecast frame from empty history".to_string())
        })?;
        tracing::info!(%last_date, horizon_days = horizon.days(), "synthesizing future frame");

        let dates = Self::date_range(last_date, horizon.days())?;
        let observed: BTreeSet<EntityKey> = scope.apply(history).entity_keys().into_iter().collect();
        let stores: BTreeSet<u32> = observed.iter().map(|k| k.store).collect();
        let items: BTreeSet<u32> = observed.iter().map(|k| k.item).collect();

        let mut records = Vec::with_capacity(observed.len() * dates.len());
        for &store in &stores {
            for &item in &items {
                if !observed.contains(&EntityKey::new(store, item)) {
                    continue;
                }
                records.extend(dates.iter().map(|&date| crate::data::SalesRecord {
                    date,
                    store,
                    item,
                    sales: None,
                }));
            }
        }

        let frame = SalesFrame::from_records(records);
        tracing::info!(rows = frame.len(), entities = observed.len(), "future frame created");
        Ok(frame)
    }

    fn date_range(last_date: NaiveDate, days: usize) -> Result<Vec<NaiveDate>> {
        (1..=days as u64)
            .map(|offset| {
                last_date.checked_add_days(Days::new(offset)).ok_or_else(|| {
                    ForecastError::Input(format!(
                        "Horizon of {} days overflows the calendar",
                        days
                    ))
                })
            })
            .collect()
    }
}

/// Date, store and item columns of a future frame, as separate arrays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FutureMetadata {
    pub date: Vec<NaiveDate>,
    pub store: Vec<u32>,
    pub item: Vec<u32>,
}

impl From<&SalesFrame> for FutureMetadata {
    fn from(frame: &SalesFrame) -> Self {
        Self {
            date: frame.dates().to_vec(),
            store: frame.stores().to_vec(),
            item: frame.items().to_vec(),
        }
    }
}
