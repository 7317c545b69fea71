//! Forecast request parameters

use crate::data::{DataLoader, SalesFrame, SalesRecord};
use crate::error::{ForecastError, Result};
use crate::future::{EntityScope, Horizon, PeriodType};
use serde::{Deserialize, Serialize};

/// Parameters of one forecast request, as received from the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Restrict the forecast to one store
    #[serde(default)]
    pub store_num: Option<u32>,
    /// Restrict the forecast to one item
    #[serde(default)]
    pub item_num: Option<u32>,
    pub period_type: PeriodType,
    pub num_periods: usize,
    /// Inline history, used when no upload accompanies the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<SalesRecord>>,
}

impl ForecastRequest {
    pub fn new(period_type: PeriodType, num_periods: usize) -> Self {
        Self {
            store_num: None,
            item_num: None,
            period_type,
            num_periods,
            data: None,
        }
    }

    pub fn with_store(mut self, store: u32) -> Self {
        self.store_num = Some(store);
        self
    }

    pub fn with_item(mut self, item: u32) -> Self {
        self.item_num = Some(item);
        self
    }

    pub fn with_data(mut self, data: Vec<SalesRecord>) -> Self {
        self.data = Some(data);
        self
    }

    /// Parse a JSON request body
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Forecast length derived from `period_type` and `num_periods`
    pub fn horizon(&self) -> Result<Horizon> {
        Horizon::periods(self.period_type, self.num_periods)
    }

    pub fn scope(&self) -> EntityScope {
        EntityScope::from_filters(self.store_num, self.item_num)
    }

    /// History carried inline in the request body
    pub fn history(&self) -> Result<SalesFrame> {
        match &self.data {
            Some(records) if !records.is_empty() => DataLoader::from_records(records.clone()),
            _ => Err(ForecastError::Input("No data provided".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_with_inline_data() {
        let json = r#"{
            "store_num": 2,
            "period_type": "M",
            "num_periods": 2,
            "data": [
                {"date": "2024-01-01", "store": 2, "item": 5, "sales": 10.0},
                {"date": "2024-01-02", "store": 2, "item": 5}
            ]
        }"#;

        let request = ForecastRequest::from_json_str(json).unwrap();
        assert_eq!(request.item_num, None);
        assert_eq!(request.horizon().unwrap().days(), 60);
        assert_eq!(request.scope().store(), Some(2));

        let history = request.history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.sales()[1], None);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(ForecastRequest::from_json_str(r#"{"period_type": "W", "num_periods": 1}"#).is_err());

        let request = ForecastRequest::new(PeriodType::Day, 0);
        assert!(matches!(request.horizon(), Err(ForecastError::Input(_))));
        assert!(matches!(request.history(), Err(ForecastError::Input(_))));
    }
}
