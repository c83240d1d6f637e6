//! Tests for lib.rs core types and configuration

use mobmetrics::{
    AnalysisConfig, Contact, ContactConfig, DistanceType, LocationConfig, MobilityError, Trace,
    TracePoint,
};

fn unsorted_trace() -> Trace {
    Trace::new(vec![
        TracePoint::new(2, 20.0, 0.0, 0.0),
        TracePoint::new(1, 30.0, 1.0, 1.0),
        TracePoint::new(2, 10.0, 2.0, 2.0),
        TracePoint::new(1, 15.0, 3.0, 3.0),
    ])
}

#[test]
fn test_trace_point_validation() {
    assert!(TracePoint::new(1, 0.0, 8.55, 47.37).is_valid());
    assert!(!TracePoint::new(1, f64::NAN, 0.0, 0.0).is_valid());
    assert!(!TracePoint::new(1, 0.0, f64::INFINITY, 0.0).is_valid());
}

#[test]
fn test_trace_sort_and_order() {
    let mut trace = unsorted_trace();
    assert!(!trace.is_ordered());

    trace.sort();
    assert!(trace.is_ordered());

    let keys: Vec<(i64, f64)> = trace.points.iter().map(|p| (p.id, p.timestamp)).collect();
    assert_eq!(keys, vec![(1, 15.0), (1, 30.0), (2, 10.0), (2, 20.0)]);
}

#[test]
fn test_trace_node_ids_and_points() {
    let trace = unsorted_trace();
    assert_eq!(trace.node_ids(), vec![1, 2]);
    assert_eq!(trace.node_points(2).len(), 2);
    assert!(trace.node_points(9).is_empty());
}

#[test]
fn test_group_by_node_orders_each_group_by_time() {
    let trace = unsorted_trace();
    let groups = trace.group_by_node();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0, 1);
    let times: Vec<f64> = groups[1].1.iter().map(|p| p.timestamp).collect();
    assert_eq!(times, vec![10.0, 20.0]);
}

#[test]
fn test_group_by_node_keeps_trace_order_for_equal_timestamps() {
    let trace = Trace::new(vec![
        TracePoint::new(4, 5.0, 1.0, 0.0),
        TracePoint::new(4, 0.0, 0.0, 0.0),
        TracePoint::new(4, 5.0, 2.0, 0.0),
    ]);
    let groups = trace.group_by_node();

    let xs: Vec<f64> = groups[0].1.iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![0.0, 1.0, 2.0]);
}

#[test]
fn test_normalize_timestamps() {
    let mut trace = unsorted_trace();
    trace.normalize_timestamps();
    let min = trace.points.iter().map(|p| p.timestamp).fold(f64::INFINITY, f64::min);
    assert_eq!(min, 0.0);
    assert_eq!(trace.points[1].timestamp, 20.0);

    let mut empty = Trace::default();
    empty.normalize_timestamps();
    assert!(empty.is_empty());
}

#[test]
fn test_distance_type_parsing() {
    assert_eq!("euclidean".parse::<DistanceType>().ok(), Some(DistanceType::Euclidean));
    assert_eq!(" Haversine ".parse::<DistanceType>().ok(), Some(DistanceType::Haversine));
    assert_eq!("HAVERSINE".parse::<DistanceType>().ok(), Some(DistanceType::Haversine));

    let err = "manhattan".parse::<DistanceType>();
    assert!(matches!(err, Err(MobilityError::UnsupportedDistanceType(ref s)) if s == "manhattan"));
}

#[test]
fn test_distance_type_display_round_trip() {
    for dist_type in [DistanceType::Euclidean, DistanceType::Haversine] {
        assert_eq!(dist_type.to_string().parse::<DistanceType>().ok(), Some(dist_type));
    }
}

#[test]
fn test_contact_pair_is_unordered() {
    let contact = Contact {
        id1: 9,
        id2: 4,
        x1: 0.0,
        y1: 0.0,
        x2: 0.0,
        y2: 0.0,
        timestamp: 0.0,
    };
    assert_eq!(contact.pair(), (4, 9));
}

#[test]
fn test_config_defaults() {
    let locations = LocationConfig::default();
    assert_eq!(locations.max_distance, 50.0);
    assert_eq!(locations.pause_threshold, 10.0);
    assert_eq!(locations.pause_threshold_secs(), 600.0);
    assert_eq!(locations.dist_type, DistanceType::Haversine);

    let contacts = ContactConfig::default();
    assert_eq!(contacts.radius, 10.0);
    assert_eq!(contacts.dist_type, DistanceType::Haversine);
    assert_eq!(DistanceType::default(), DistanceType::Haversine);
}

#[test]
fn test_config_validation() {
    let config = LocationConfig {
        max_distance: -1.0,
        ..LocationConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(MobilityError::InvalidParameter { ref name, .. }) if name == "max_distance"
    ));

    let config = ContactConfig {
        radius: f64::NAN,
        ..ContactConfig::default()
    };
    assert!(config.validate().is_err());

    // Zero is a valid radius: only exact co-location counts
    let config = ContactConfig {
        radius: 0.0,
        ..ContactConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_analysis_config_from_json() {
    let json = r#"{
        "locations": { "max_distance": 25.0, "dist_type": "euclidean" },
        "contacts": { "radius": 2.5 }
    }"#;

    let config = AnalysisConfig::from_json(json).unwrap();
    assert_eq!(config.locations.max_distance, 25.0);
    assert_eq!(config.locations.pause_threshold, 10.0);
    assert_eq!(config.locations.dist_type, DistanceType::Euclidean);
    assert_eq!(config.contacts.radius, 2.5);
    assert_eq!(config.contacts.dist_type, DistanceType::Haversine);
}

#[test]
fn test_analysis_config_rejects_bad_values() {
    let bad_type = r#"{ "locations": { "dist_type": "manhattan" } }"#;
    assert!(matches!(
        AnalysisConfig::from_json(bad_type),
        Err(MobilityError::Serialization(_))
    ));

    let negative = r#"{ "contacts": { "radius": -3.0 } }"#;
    assert!(matches!(
        AnalysisConfig::from_json(negative),
        Err(MobilityError::InvalidParameter { .. })
    ));
}
