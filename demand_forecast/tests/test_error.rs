use demand_forecast::error::{AlignmentWarning, ForecastError};
use rstest::rstest;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    assert!(matches!(ForecastError::from(io_error), ForecastError::Io(_)));

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(ForecastError::from(json_error), ForecastError::Json(_)));

    let math_error = sales_math::MathError::InvalidInput("window is zero".to_string());
    match ForecastError::from(math_error) {
        ForecastError::Input(msg) => assert!(msg.contains("window is zero")),
        other => panic!("Expected Input variant, got {:?}", other),
    }
}

#[rstest]
#[case(ForecastError::Input("bad".into()), 400)]
#[case(ForecastError::Polars("bad".into()), 400)]
#[case(ForecastError::NotFound("none".into()), 404)]
#[case(ForecastError::Model("boom".into()), 500)]
#[case(ForecastError::Io(io::Error::new(io::ErrorKind::Other, "disk")), 500)]
fn test_status_codes(#[case] error: ForecastError, #[case] status: u16) {
    assert_eq!(error.status_code(), status);
}

#[test]
fn test_client_messages() {
    let error = ForecastError::NotFound("No data found for the specified store and item".into());
    assert_eq!(
        error.client_message(),
        "No data found for the specified store and item"
    );

    // Internal details stay out of the client message
    let error = ForecastError::Io(io::Error::new(io::ErrorKind::Other, "/secret/path"));
    assert!(!error.client_message().contains("/secret/path"));
    assert!(format!("{}", error).contains("/secret/path"));
}

#[test]
fn test_alignment_warning() {
    assert_eq!(AlignmentWarning::check("stage", 3, 3), None);

    let warning = AlignmentWarning::check("stage", 3, 5).unwrap();
    assert_eq!(warning.kept, 3);
    assert_eq!(format!("{}", warning), "stage: expected 3 values, got 5; kept 3");
}
