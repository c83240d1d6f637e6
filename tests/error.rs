//! Tests for error module

use mobmetrics::error::{MobilityError, OptionExt};

#[test]
fn test_error_display() {
    let err = MobilityError::InvalidValue {
        line: 7,
        column: "x".to_string(),
        value: "abc".to_string(),
    };
    assert!(err.to_string().contains("line 7"));
    assert!(err.to_string().contains("'abc'"));

    let err = MobilityError::MissingColumns {
        missing: vec!["timestamp".to_string(), "y".to_string()],
    };
    assert!(err.to_string().contains("timestamp, y"));
}

#[test]
fn test_insufficient_columns_display() {
    let err = MobilityError::InsufficientColumns {
        found: 3,
        minimum_required: 4,
    };
    assert!(err.to_string().contains("3 columns"));
    assert!(err.to_string().contains("at least 4"));
}

#[test]
fn test_option_ext() {
    let none: Option<i32> = None;
    let result = none.ok_or_missing_input("TRVD", "trace_loc");
    assert!(matches!(
        result,
        Err(MobilityError::MissingInput { ref metric, ref input })
            if metric == "TRVD" && input == "trace_loc"
    ));

    let some = Some(3).ok_or_missing_input("TRVD", "trace_loc");
    assert!(matches!(some, Ok(3)));
}

#[test]
fn test_from_io_error() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: MobilityError = io.into();
    assert!(matches!(err, MobilityError::Io(_)));
}

#[test]
fn test_from_serde_error() {
    let parse = serde_json::from_str::<Vec<i32>>("[1,").unwrap_err();
    let err: MobilityError = parse.into();
    assert!(matches!(err, MobilityError::Serialization(_)));
}
