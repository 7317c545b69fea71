use chrono::NaiveDate;
use demand_forecast::data::{EntityKey, SalesFrame, SalesRecord};
use demand_forecast::error::ForecastError;
use demand_forecast::future::{EntityScope, FutureFrameSynthesizer, FutureMetadata, Horizon, PeriodType};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn record(date: &str, store: u32, item: u32) -> SalesRecord {
    SalesRecord {
        date: date.parse().unwrap(),
        store,
        item,
        sales: Some(1.0),
    }
}

fn date(value: &str) -> NaiveDate {
    value.parse().unwrap()
}

#[test]
fn test_one_month_horizon() {
    let history = SalesFrame::from_records(vec![
        record("2024-01-30", 1, 1),
        record("2024-01-31", 1, 1),
    ]);
    let horizon = Horizon::periods(PeriodType::Month, 1).unwrap();

    let future = FutureFrameSynthesizer
        .synthesize(&history, horizon, EntityScope::All)
        .unwrap();

    assert_eq!(future.len(), 30);
    assert_eq!(future.dates()[0], date("2024-02-01"));
    assert_eq!(future.dates()[29], date("2024-03-01"));
    assert!(future.sales().iter().all(Option::is_none));
}

#[rstest]
#[case("D", 3, 3)]
#[case("day", 2, 2)]
#[case("M", 2, 60)]
#[case("y", 1, 365)]
fn test_horizon_days(#[case] period: &str, #[case] count: usize, #[case] days: usize) {
    let period_type: PeriodType = period.parse().unwrap();
    assert_eq!(Horizon::periods(period_type, count).unwrap().days(), days);
}

#[test]
fn test_invalid_horizons() {
    assert!(matches!("W".parse::<PeriodType>(), Err(ForecastError::Input(_))));
    assert!(matches!(
        Horizon::periods(PeriodType::Day, 0),
        Err(ForecastError::Input(_))
    ));
}

#[test]
fn test_empty_history_is_rejected() {
    let result = FutureFrameSynthesizer.synthesize(
        &SalesFrame::default(),
        Horizon::Days(5),
        EntityScope::All,
    );
    assert!(matches!(result, Err(ForecastError::Input(_))));
}

#[test]
fn test_entities_follow_scope() {
    let history = SalesFrame::from_records(vec![
        record("2024-01-01", 1, 1),
        record("2024-01-01", 1, 2),
        record("2024-01-01", 2, 1),
        record("2024-01-02", 2, 1),
    ]);

    let all = FutureFrameSynthesizer
        .synthesize(&history, Horizon::Days(2), EntityScope::All)
        .unwrap();
    // (2, 2) never appears in history, so it gets no rows
    assert_eq!(
        all.entity_keys(),
        vec![EntityKey::new(1, 1), EntityKey::new(1, 2), EntityKey::new(2, 1)]
    );
    assert_eq!(all.len(), 6);
    // Dates follow the latest date across every entity
    assert_eq!(all.dates()[0], date("2024-01-03"));

    let store_one = FutureFrameSynthesizer
        .synthesize(&history, Horizon::Days(2), EntityScope::from_filters(Some(1), None))
        .unwrap();
    assert_eq!(
        store_one.entity_keys(),
        vec![EntityKey::new(1, 1), EntityKey::new(1, 2)]
    );

    let metadata = FutureMetadata::from(&store_one);
    assert_eq!(metadata.store, vec![1, 1, 1, 1]);
    assert_eq!(metadata.item, vec![1, 1, 2, 2]);
    assert_eq!(metadata.date[1], date("2024-01-04"));
}

#[test]
fn test_period_type_serde() {
    let parsed: PeriodType = serde_json::from_str("\"month\"").unwrap();
    assert_eq!(parsed, PeriodType::Month);
    assert_eq!(serde_json::to_string(&PeriodType::Year).unwrap(), "\"Y\"");
}
