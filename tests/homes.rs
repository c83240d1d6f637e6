//! Tests for home-location detection

use mobmetrics::{find_homes, find_homes_multi, LocatedPoint};

fn row(id: i64, timestamp: f64, x: f64, sl: u32) -> LocatedPoint {
    LocatedPoint {
        id,
        timestamp,
        x,
        y: 0.0,
        sl,
        gl: true,
    }
}

#[test]
fn test_longest_run_wins() {
    let rows = vec![
        row(1, 0.0, 0.0, 0),
        row(1, 100.0, 0.0, 0),
        row(1, 200.0, 5.0, 1),
        row(1, 700.0, 5.1, 1),
        row(1, 800.0, 9.0, 2),
        row(1, 900.0, 9.0, 2),
    ];

    let homes = find_homes(&rows);
    assert_eq!(homes.len(), 1);
    assert_eq!(homes[0].id, 1);
    assert_eq!(homes[0].home_location, 1);
    assert_eq!(homes[0].dwell_time, 500.0);
    // Position of the last point of the winning run
    assert_eq!(homes[0].x, 5.1);
}

#[test]
fn test_ties_keep_first_run() {
    let rows = vec![
        row(1, 0.0, 0.0, 0),
        row(1, 300.0, 0.0, 0),
        row(1, 400.0, 5.0, 1),
        row(1, 700.0, 5.0, 1),
        row(1, 800.0, 9.0, 2),
    ];

    let homes = find_homes(&rows);
    assert_eq!(homes[0].home_location, 0);
    assert_eq!(homes[0].dwell_time, 300.0);
}

#[test]
fn test_final_run_is_compared() {
    let rows = vec![
        row(1, 0.0, 0.0, 0),
        row(1, 100.0, 0.0, 0),
        row(1, 200.0, 5.0, 1),
        row(1, 900.0, 5.0, 1),
    ];

    let homes = find_homes(&rows);
    assert_eq!(homes[0].home_location, 1);
    assert_eq!(homes[0].dwell_time, 700.0);
}

#[test]
fn test_revisited_location_counts_runs_separately() {
    // Two 200s visits to sl 0 do not add up against one 300s visit to sl 1
    let rows = vec![
        row(1, 0.0, 0.0, 0),
        row(1, 200.0, 0.0, 0),
        row(1, 300.0, 5.0, 1),
        row(1, 600.0, 5.0, 1),
        row(1, 700.0, 0.0, 0),
        row(1, 900.0, 0.0, 0),
    ];

    let homes = find_homes(&rows);
    assert_eq!(homes[0].home_location, 1);
}

#[test]
fn test_single_point_node_is_its_own_home() {
    let rows = vec![row(4, 50.0, 3.0, 0)];
    let homes = find_homes(&rows);

    assert_eq!(homes.len(), 1);
    assert_eq!(homes[0].id, 4);
    assert_eq!(homes[0].home_location, 0);
    assert_eq!(homes[0].x, 3.0);
    assert_eq!(homes[0].dwell_time, 0.0);
}

#[test]
fn test_one_home_per_node() {
    let rows = vec![
        row(1, 0.0, 0.0, 0),
        row(1, 100.0, 0.0, 0),
        row(2, 0.0, 7.0, 0),
        row(2, 50.0, 8.0, 1),
        row(2, 400.0, 8.0, 1),
        row(3, 10.0, 1.0, 0),
    ];

    let homes = find_homes(&rows);
    let summary: Vec<(i64, u32, f64)> =
        homes.iter().map(|h| (h.id, h.home_location, h.dwell_time)).collect();
    assert_eq!(summary, vec![(1, 0, 100.0), (2, 1, 350.0), (3, 0, 0.0)]);
}

#[test]
fn test_empty_input() {
    assert!(find_homes(&[]).is_empty());
}

#[test]
fn test_find_homes_multi_keeps_input_order() {
    let a = vec![row(1, 0.0, 0.0, 0), row(1, 10.0, 0.0, 0)];
    let b = vec![row(2, 0.0, 0.0, 0)];

    let homes = find_homes_multi(&[a.as_slice(), b.as_slice(), &[]]);
    assert_eq!(homes.len(), 3);
    assert_eq!(homes[0][0].id, 1);
    assert_eq!(homes[1][0].id, 2);
    assert!(homes[2].is_empty());
}
