use chrono::NaiveDate;
use demand_forecast::data::{SalesFrame, SalesRecord};
use demand_forecast::error::{AlignmentWarning, ForecastError};
use demand_forecast::features::FeatureFrame;
use demand_forecast::models::LinearModel;
use demand_forecast::selection::{FeatureSelector, ImportanceReport};
use pretty_assertions::assert_eq;

#[test]
fn test_threshold_drops_low_importance() {
    let selection = FeatureSelector::default().select_with(&[10.0, 60.0, 40.0], &["a", "b", "c"]);

    assert_eq!(selection.kept, vec!["b"]);
    assert_eq!(selection.dropped, vec!["a", "c"]);
    assert_eq!(selection.report.entries[0].feature, "b");
    assert!(selection.report.alignment.is_none());
}

#[test]
fn test_threshold_is_inclusive() {
    let selection = FeatureSelector::new(50.0).select_with(&[50.0, 49.9], &["a", "b"]);
    assert_eq!(selection.kept, vec!["a"]);
}

#[test]
fn test_length_mismatch_truncates() {
    // Three candidates, two scores: the unpaired trailing feature is kept
    let selection = FeatureSelector::default().select_with(&[80.0, 10.0], &["a", "b", "c"]);

    assert_eq!(selection.kept, vec!["a", "c"]);
    assert_eq!(selection.dropped, vec!["b"]);
    assert_eq!(
        selection.report.alignment,
        Some(AlignmentWarning {
            stage: "feature_importance",
            expected: 3,
            actual: 2,
            kept: 2,
        })
    );

    // More scores than candidates
    let report = ImportanceReport::pair(&[1.0, 2.0, 3.0], &["x"]);
    assert_eq!(report.entries.len(), 1);
    assert!(report.alignment.is_some());
}

#[test]
fn test_selection_keeps_candidate_order() {
    let model = LinearModel::new(
        vec!["a".into(), "b".into(), "c".into(), "d".into()],
        vec![0.0; 4],
        0.0,
    )
    .unwrap()
    .with_importances(vec![90.0, 5.0, 70.0, 100.0]);

    let selection = FeatureSelector::default().select(&model, &["a", "b", "c", "d"]);
    assert_eq!(selection.kept, vec!["a", "c", "d"]);
}

#[test]
fn test_prediction_set_uses_null_sales_rows() {
    let records = ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"]
        .iter()
        .enumerate()
        .map(|(i, date)| SalesRecord {
            date: date.parse().unwrap(),
            store: 1,
            item: 2,
            sales: if i < 2 { Some(i as f64) } else { None },
        })
        .collect::<Vec<_>>();
    let frame = FeatureFrame::new(&SalesFrame::from_records(records)).unwrap();

    let selector = FeatureSelector::default();
    let selection = selector.select_with(&[100.0, 100.0], &["store", "item"]);
    let set = selector.prediction_set(&frame, &selection).unwrap();

    assert_eq!(set.rows, vec![2, 3]);
    assert_eq!(set.matrix.height(), 2);
    assert_eq!(set.matrix.get_column_names(), vec!["store", "item"]);
    assert_eq!(set.metadata.item, vec![2, 2]);
    assert_eq!(set.metadata.date[0], "2024-01-03".parse::<NaiveDate>().unwrap());
}

#[test]
fn test_prediction_set_rejects_unknown_columns() {
    let records = vec![SalesRecord {
        date: "2024-01-01".parse().unwrap(),
        store: 1,
        item: 1,
        sales: None,
    }];
    let frame = FeatureFrame::new(&SalesFrame::from_records(records)).unwrap();

    let selector = FeatureSelector::default();
    let selection = selector.select_with(&[100.0], &["sales_lag_1"]);
    assert!(selector.prediction_set(&frame, &selection).is_err());
}

#[test]
fn test_prediction_set_needs_a_kept_feature() {
    let records = vec![
        SalesRecord {
            date: "2024-01-01".parse().unwrap(),
            store: 1,
            item: 1,
            sales: Some(4.0),
        },
        SalesRecord {
            date: "2024-01-02".parse().unwrap(),
            store: 1,
            item: 1,
            sales: None,
        },
    ];
    let frame = FeatureFrame::new(&SalesFrame::from_records(records)).unwrap();

    let selector = FeatureSelector::default();
    let selection = selector.select_with(&[0.0, 0.0], &["store", "item"]);
    assert!(selection.kept.is_empty());
    assert!(matches!(
        selector.prediction_set(&frame, &selection),
        Err(ForecastError::Model(_))
    ));
}
