use chrono::NaiveDate;
use demand_forecast::data::{DataLoader, EntityKey, SalesFrame, SalesRecord};
use demand_forecast::error::ForecastError;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn record(date: &str, store: u32, item: u32, sales: Option<f64>) -> SalesRecord {
    SalesRecord {
        date: date.parse().unwrap(),
        store,
        item,
        sales,
    }
}

#[test]
fn test_data_loader_from_csv() {
    // Header whitespace is stripped before validation
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, " date , store,item ,sales").unwrap();
    writeln!(file, "2024-01-01,1,1,13").unwrap();
    writeln!(file, "2024-01-02,1,1,11").unwrap();
    writeln!(file, "2024-01-01,2,1,").unwrap();

    let frame = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(frame.len(), 3);
    assert_eq!(frame.sales(), &[Some(13.0), Some(11.0), None]);
    assert_eq!(frame.stores(), &[1, 1, 2]);
    assert_eq!(frame.last_date(), Some("2024-01-02".parse().unwrap()));
}

#[test]
fn test_data_loader_accepts_timestamps() {
    let csv = "date,store,item,sales\n2024-03-01 00:00:00,3,7,5.5\n";
    let frame = DataLoader::from_csv_bytes(csv.as_bytes()).unwrap();

    assert_eq!(frame.dates()[0], NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert_eq!(frame.key(0), EntityKey::new(3, 7));
}

#[test]
fn test_data_loader_error_handling() {
    // Non-existent file
    assert!(matches!(
        DataLoader::from_csv("nonexistent_file.csv"),
        Err(ForecastError::Io(_))
    ));

    // Empty upload
    assert!(matches!(
        DataLoader::from_csv_bytes(b"  \n"),
        Err(ForecastError::Input(_))
    ));

    // Missing column
    let err = DataLoader::from_csv_bytes(b"date,store,item\n2024-01-01,1,1\n").unwrap_err();
    match err {
        ForecastError::Input(msg) => assert!(msg.contains("sales")),
        other => panic!("Expected Input error, got {:?}", other),
    }

    // Bad date
    assert!(matches!(
        DataLoader::from_csv_bytes(b"date,store,item,sales\n01/02/2024,1,1,3\n"),
        Err(ForecastError::Input(_))
    ));

    // Non-positive id
    assert!(matches!(
        DataLoader::from_csv_bytes(b"date,store,item,sales\n2024-01-01,0,1,3\n"),
        Err(ForecastError::Input(_))
    ));
}

#[test]
fn test_sales_frame_operations() {
    let frame = DataLoader::from_records(vec![
        record("2024-01-02", 2, 1, Some(4.0)),
        record("2024-01-01", 1, 2, Some(3.0)),
        record("2024-01-01", 2, 1, Some(2.0)),
        record("2024-01-01", 1, 1, Some(1.0)),
    ])
    .unwrap();

    assert_eq!(
        frame.entity_keys(),
        vec![EntityKey::new(1, 1), EntityKey::new(1, 2), EntityKey::new(2, 1)]
    );
    assert_eq!(frame.filter(Some(2), None).len(), 2);
    assert_eq!(frame.filter(Some(1), Some(2)).sales(), &[Some(3.0)]);
    assert!(frame.filter(Some(9), None).is_empty());

    let sorted = frame.sorted_by_entity().unwrap();
    assert_eq!(sorted.sales(), &[Some(1.0), Some(3.0), Some(2.0), Some(4.0)]);

    let merged = frame.concat(&sorted);
    assert_eq!(merged.len(), 8);
}

#[test]
fn test_sorting_rejects_duplicate_dates() {
    let frame = SalesFrame::from_records(vec![
        record("2024-01-01", 1, 1, Some(1.0)),
        record("2024-01-01", 1, 1, Some(2.0)),
    ]);

    assert!(matches!(frame.sorted_by_entity(), Err(ForecastError::Input(_))));
}

#[test]
fn test_sales_frame_length_check() {
    let result = SalesFrame::new(
        vec!["2024-01-01".parse().unwrap()],
        vec![1, 2],
        vec![1],
        vec![None],
    );
    assert!(matches!(result, Err(ForecastError::Input(_))));
}

#[test]
fn test_to_dataframe_round_trip() {
    let frame = SalesFrame::from_records(vec![
        record("2024-01-01", 1, 1, Some(1.0)),
        record("2024-01-02", 1, 1, None),
    ]);

    let df = frame.to_dataframe().unwrap();
    assert_eq!(df.height(), 2);
    assert_eq!(df.get_column_names(), vec!["date", "store", "item", "sales"]);

    let back = DataLoader::from_dataframe(df).unwrap();
    assert_eq!(back, frame);
}

#[test]
fn test_header_only_upload_is_rejected() {
    let err = DataLoader::from_csv_bytes(b"date,store,item,sales\n").unwrap_err();
    assert!(matches!(err, ForecastError::Input(_)));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_inline_records_need_positive_ids() {
    let err = DataLoader::from_records(vec![
        record("2024-01-01", 1, 1, Some(1.0)),
        record("2024-01-02", 0, 1, Some(2.0)),
    ])
    .unwrap_err();
    match err {
        ForecastError::Input(msg) => assert!(msg.contains("'store'") && msg.contains("row 1")),
        other => panic!("Expected Input error, got {:?}", other),
    }

    assert!(matches!(
        DataLoader::from_records(vec![record("2024-01-01", 3, 0, None)]),
        Err(ForecastError::Input(_))
    ));
}
