//! Sales history handling
//!
//! `SalesFrame` is the columnar table every stage starts from. Its schema is fixed:
//!
//! | column | type             | notes                                  |
//! |--------|------------------|----------------------------------------|
//! | date   | `NaiveDate`      | calendar day                           |
//! | store  | `u32`            | positive                               |
//! | item   | `u32`            | positive                               |
//! | sales  | `Option<f64>`    | `None` for rows awaiting a prediction  |

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::io::Cursor;
use std::path::Path;

/// Days between 0001-01-01 and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Columns every upload must carry
pub const REQUIRED_COLUMNS: [&str; 4] = ["date", "store", "item", "sales"];

/// Identifies one independent time series
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub store: u32,
    pub item: u32,
}

impl EntityKey {
    pub fn new(store: u32, item: u32) -> Self {
        Self { store, item }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Store {} Item {}", self.store, self.item)
    }
}

/// One row of sales history, as sent inline by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub store: u32,
    pub item: u32,
    #[serde(default)]
    pub sales: Option<f64>,
}

/// Columnar sales history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesFrame {
    dates: Vec<NaiveDate>,
    stores: Vec<u32>,
    items: Vec<u32>,
    sales: Vec<Option<f64>>,
}

impl SalesFrame {
    /// Create a frame from equal-length columns
    pub fn new(
        dates: Vec<NaiveDate>,
        stores: Vec<u32>,
        items: Vec<u32>,
        sales: Vec<Option<f64>>,
    ) -> Result<Self> {
        let n = dates.len();
        if stores.len() != n || items.len() != n || sales.len() != n {
            return Err(ForecastError::Input(format!(
                "Column lengths differ: date={}, store={}, item={}, sales={}",
                n,
                stores.len(),
                items.len(),
                sales.len()
            )));
        }

        Ok(Self {
            dates,
            stores,
            items,
            sales,
        })
    }

    /// Build a frame from row records
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = SalesRecord>,
    {
        let mut frame = Self::default();
        for record in records {
            frame.dates.push(record.date);
            frame.stores.push(record.store);
            frame.items.push(record.item);
            frame.sales.push(record.sales);
        }
        frame
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn stores(&self) -> &[u32] {
        &self.stores
    }

    pub fn items(&self) -> &[u32] {
        &self.items
    }

    pub fn sales(&self) -> &[Option<f64>] {
        &self.sales
    }

    /// Entity key of row `i`
    pub fn key(&self, i: usize) -> EntityKey {
        EntityKey::new(self.stores[i], self.items[i])
    }

    /// Latest date in the frame
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.iter().max().copied()
    }

    /// Distinct entity keys, ascending
    pub fn entity_keys(&self) -> Vec<EntityKey> {
        (0..self.len())
            .map(|i| self.key(i))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows matching the optional store and item filters
    pub fn filter(&self, store: Option<u32>, item: Option<u32>) -> Self {
        let rows: Vec<usize> = (0..self.len())
            .filter(|&i| store.map_or(true, |s| self.stores[i] == s))
            .filter(|&i| item.map_or(true, |it| self.items[i] == it))
            .collect();
        self.select_rows(&rows)
    }

    /// Copy of the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            dates: rows.iter().map(|&i| self.dates[i]).collect(),
            stores: rows.iter().map(|&i| self.stores[i]).collect(),
            items: rows.iter().map(|&i| self.items[i]).collect(),
            sales: rows.iter().map(|&i| self.sales[i]).collect(),
        }
    }

    /// Rows of `self` followed by rows of `other`
    pub fn concat(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged.dates.extend_from_slice(&other.dates);
        merged.stores.extend_from_slice(&other.stores);
        merged.items.extend_from_slice(&other.items);
        merged.sales.extend_from_slice(&other.sales);
        merged
    }

    /// Rows ordered by (store, item, date).
    ///
    /// Fails when an entity has two rows for the same date.
    pub fn sorted_by_entity(&self) -> Result<Self> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&i| (self.stores[i], self.items[i], self.dates[i]));

        for pair in order.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if self.key(a) == self.key(b) && self.dates[a] == self.dates[b] {
                return Err(ForecastError::Input(format!(
                    "Duplicate date {} for {}",
                    self.dates[a],
                    self.key(a)
                )));
            }
        }

        Ok(self.select_rows(&order))
    }

    /// Convert to a polars DataFrame with the documented schema
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let days: Vec<i32> = self.dates.iter().map(|d| date_to_days(*d)).collect();
        let df = DataFrame::new(vec![
            Series::new("date", days).cast(&DataType::Date)?,
            Series::new("store", self.stores.clone()),
            Series::new("item", self.items.clone()),
            Series::new("sales", self.sales.clone()),
        ])?;
        Ok(df)
    }
}

/// Loader for sales history uploads
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load sales history from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<SalesFrame> {
        let bytes = std::fs::read(path)?;
        Self::from_csv_bytes(&bytes)
    }

    /// Load sales history from the raw bytes of an uploaded delimited file
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<SalesFrame> {
        tracing::info!(content_length = bytes.len(), "reading uploaded file");
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ForecastError::Input(
                "Uploaded file is empty or invalid.".to_string(),
            ));
        }

        let df = CsvReader::new(Cursor::new(bytes.to_vec()))
            .infer_schema(None)
            .has_header(true)
            .finish()
            .map_err(|e| ForecastError::Input(format!("Uploaded file is empty or invalid: {}", e)))?;

        Self::from_dataframe(df)
    }

    /// Validate an existing DataFrame and convert it to a `SalesFrame`.
    ///
    /// Header whitespace is stripped before the required columns are looked up.
    pub fn from_dataframe(mut df: DataFrame) -> Result<SalesFrame> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        df.set_column_names(&names)?;
        tracing::debug!(rows = df.height(), columns = ?names, "parsed sales table");

        if df.height() == 0 {
            return Err(ForecastError::Input(
                "Uploaded file is empty or invalid.".to_string(),
            ));
        }

        for required in REQUIRED_COLUMNS {
            if !names.iter().any(|name| name == required) {
                return Err(ForecastError::Input(format!(
                    "Missing required column '{}'",
                    required
                )));
            }
        }

        let dates = Self::parse_dates(df.column("date")?)?;
        let stores = Self::parse_ids(df.column("store")?)?;
        let items = Self::parse_ids(df.column("item")?)?;
        let sales_col = df.column("sales")?.cast(&DataType::Float64)?;
        let sales = sales_col
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();

        SalesFrame::new(dates, stores, items, sales)
    }

    /// Build a frame from inline JSON records, rejecting non-positive ids
    pub fn from_records(records: Vec<SalesRecord>) -> Result<SalesFrame> {
        if let Some((row, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| r.store == 0 || r.item == 0)
        {
            let column = if record.store == 0 { "store" } else { "item" };
            return Err(ForecastError::Input(format!(
                "Column '{}' needs a positive integer at row {}",
                column, row
            )));
        }
        Ok(SalesFrame::from_records(records))
    }

    fn parse_dates(series: &Series) -> Result<Vec<NaiveDate>> {
        match series.dtype() {
            DataType::Utf8 => series
                .utf8()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| {
                    value.and_then(parse_date).ok_or_else(|| {
                        ForecastError::Input(format!(
                            "Invalid date value {:?} at row {}",
                            value.unwrap_or(""),
                            row
                        ))
                    })
                })
                .collect(),
            DataType::Date | DataType::Datetime(_, _) => {
                let days = series.cast(&DataType::Date)?.cast(&DataType::Int32)?;
                days.i32()?
                    .into_iter()
                    .enumerate()
                    .map(|(row, value)| {
                        value.and_then(days_to_date).ok_or_else(|| {
                            ForecastError::Input(format!("Missing date at row {}", row))
                        })
                    })
                    .collect()
            }
            other => Err(ForecastError::Input(format!(
                "Column 'date' has unsupported type {}",
                other
            ))),
        }
    }

    fn parse_ids(series: &Series) -> Result<Vec<u32>> {
        let name = series.name().to_string();
        let ids = series.cast(&DataType::Int64).map_err(|_| {
            ForecastError::Input(format!("Column '{}' must hold integers", name))
        })?;
        let ids = ids
            .i64()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value
                    .filter(|&v| v > 0)
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or_else(|| {
                        ForecastError::Input(format!(
                            "Column '{}' needs a positive integer at row {}",
                            name, row
                        ))
                    })
            })
            .collect();
        ids
    }
}

/// Parse `YYYY-MM-DD`, or the date part of `YYYY-MM-DD HH:MM:SS`
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_epoch_conversion() {
        assert_eq!(date_to_days(d("1970-01-01")), 0);
        assert_eq!(days_to_date(31), Some(d("1970-02-01")));
    }

    #[test]
    fn test_sorted_by_entity_rejects_duplicates() {
        let frame = SalesFrame::new(
            vec![d("2024-01-01"), d("2024-01-01")],
            vec![1, 1],
            vec![1, 1],
            vec![Some(1.0), Some(2.0)],
        )
        .unwrap();

        assert!(matches!(
            frame.sorted_by_entity(),
            Err(ForecastError::Input(_))
        ));
    }
}
