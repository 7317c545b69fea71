//! # Demand Forecast Workspace
//!
//! Umbrella crate for the sales forecasting workspace.
//!
//! - [`sales_math`]: windowing and smoothing kernels over nullable series
//! - [`demand_forecast`]: feature engineering, future frames, selection and responses
//!
//! ## Example
//!
//! ```
//! use demand_forecast_workspace::demand_forecast::{PeriodType, ForecastRequest};
//!
//! let request = ForecastRequest::new(PeriodType::Month, 2).with_store(1);
//! assert_eq!(request.horizon().unwrap().days(), 60);
//! ```

pub use demand_forecast;
pub use sales_math;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernels_are_reachable() {
        let shifted = sales_math::shift(&[Some(1.0), Some(2.0)], 1);
        assert_eq!(shifted, vec![None, Some(1.0)]);
    }

    #[test]
    fn test_version() {
        assert_eq!(demand_forecast::NAME, "demand_forecast");
    }
}
