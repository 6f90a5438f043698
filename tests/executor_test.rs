mod common;

use chrono::NaiveDate;
use common::{empty_store, seed};
use foodshare::core::{CellValue, NewListing};
use foodshare::db::{row_count, DatabaseUrl, Table};
use foodshare::{Action, AppConfig, Dashboard, Outcome, QueryExecutor, TrackerError};
use pretty_assertions::assert_eq;
use std::io::{self, BufReader, Read};
use tempfile::TempDir;

fn listings_store(dir: &TempDir) -> (DatabaseUrl, QueryExecutor) {
    let (url, executor) = empty_store(dir);
    seed(
        &url,
        "INSERT INTO Providers VALUES (1, 'Green Grocer', 'Supermarket', '1 Main St', 'New York', '555-0101');
         INSERT INTO Providers VALUES (2, 'Bean Bakery', 'Restaurant', '9 Elm Rd', 'Boston', '555-0102');
         INSERT INTO Providers VALUES (3, 'Lake Deli', 'Restaurant', '4 Shore Dr', 'Chicago', '555-0103');
         INSERT INTO Food_Listings VALUES (1, 'Bread', 10, '2025-03-17', 1, 'Supermarket', 'New York', 'Vegetarian', 'Breakfast');
         INSERT INTO Food_Listings VALUES (2, 'Soup', 5, '2025-03-20', 2, 'Restaurant', 'Boston', 'Vegan', 'Dinner');
         INSERT INTO Food_Listings VALUES (3, 'Salad', 7, '2025-03-21', 3, 'Restaurant', 'Chicago', 'Vegan', 'Lunch');",
    );
    (url, executor)
}

fn food_ids(executor: &QueryExecutor, cities: &[&str]) -> Vec<i64> {
    let cities: Vec<String> = cities.iter().map(|c| c.to_string()).collect();
    executor
        .filter_listings(&cities)
        .unwrap()
        .column("Food_ID")
        .iter()
        .filter_map(|c| c.as_i64())
        .collect()
}

#[test]
fn test_filter_listings_by_city_set() {
    let dir = TempDir::new().unwrap();
    let (_url, executor) = listings_store(&dir);

    assert_eq!(food_ids(&executor, &[]), vec![1, 2, 3]);
    assert_eq!(food_ids(&executor, &["New York"]), vec![1]);
    assert_eq!(food_ids(&executor, &["New York", "Boston"]), vec![1, 2]);
    assert_eq!(food_ids(&executor, &["Atlantis"]), Vec::<i64>::new());
}

#[test]
fn test_filter_listings_returns_all_columns() {
    let dir = TempDir::new().unwrap();
    let (_url, executor) = listings_store(&dir);

    let table = executor.filter_listings(&[]).unwrap();
    assert_eq!(table.columns, Table::FoodListings.columns());
}

#[test]
fn test_distinct_cities_sorted() {
    let dir = TempDir::new().unwrap();
    let (_url, executor) = listings_store(&dir);

    assert_eq!(
        executor.distinct_cities().unwrap(),
        vec!["Boston", "Chicago", "New York"]
    );
}

#[test]
fn test_insert_with_unknown_provider_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (url, executor) = listings_store(&dir);
    let expiry = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();

    let result = executor.insert_listing(&NewListing::new("Rice", 3, expiry, 999));

    assert!(matches!(result, Err(TrackerError::IntegrityError { .. })));
    let conn = url.open().unwrap();
    assert_eq!(row_count(&conn, Table::FoodListings).unwrap(), 3);
}

#[test]
fn test_insert_binds_hostile_text_verbatim() {
    let dir = TempDir::new().unwrap();
    let (_url, executor) = listings_store(&dir);
    let expiry = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
    let name = "Pie'); DROP TABLE Food_Listings; --";

    let mut listing = NewListing::new(name, 2, expiry, 2);
    listing.location = Some("Boston".to_string());
    let food_id = executor.insert_listing(&listing).unwrap();

    assert_eq!(food_id, 4);
    let table = executor.filter_listings(&["Boston".to_string()]).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(1, "Food_Name"), Some(&CellValue::Text(name.to_string())));
}

#[test]
fn test_dashboard_survives_failures() {
    let dir = TempDir::new().unwrap();
    let (_url, executor) = listings_store(&dir);
    let dashboard = Dashboard::new(executor, AppConfig::default());

    let bad = dashboard.handle(Action::Sql("SELECT * FROM Donations".to_string()));
    assert!(matches!(bad, Outcome::Error(_)));

    let out_of_range = dashboard.handle(Action::RunEntry {
        number: 42,
        city: None,
    });
    assert!(matches!(out_of_range, Outcome::Error(ref m) if m.contains("No catalog entry 42")));

    let orphan = dashboard.handle(Action::AddListing(NewListing::new(
        "Rice",
        3,
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        999,
    )));
    assert!(matches!(orphan, Outcome::Error(ref m) if m.contains("rejected")));

    match dashboard.handle(Action::RunEntry {
        number: 3,
        city: None,
    }) {
        Outcome::Table { title, table, chart } => {
            assert!(title.contains("New York"));
            assert_eq!(table.len(), 1);
            assert!(chart.is_none());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_dashboard_bar_chart_for_bar_entries() {
    let dir = TempDir::new().unwrap();
    let (_url, executor) = listings_store(&dir);
    let dashboard = Dashboard::new(executor, AppConfig::default());

    match dashboard.handle(Action::RunEntry {
        number: 13,
        city: None,
    }) {
        Outcome::Table { chart, .. } => {
            let chart = chart.expect("entry 13 is charted");
            assert!(chart.starts_with("TotalQuantityDonated"));
            assert!(chart.contains("Green Grocer"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_dashboard_add_listing_reports_food_id() {
    let dir = TempDir::new().unwrap();
    let (_url, executor) = listings_store(&dir);
    let dashboard = Dashboard::new(executor, AppConfig::default());

    let outcome = dashboard.handle(Action::parse("add Apples; 20; 2025-05-01; 1; New York").unwrap());
    assert_eq!(outcome, Outcome::Inserted { food_id: 4 });
    assert!(dashboard.present(&outcome).contains("Food_ID 4"));
}

fn session_output(dashboard: &Dashboard, input: &[u8]) -> String {
    let mut output = Vec::new();
    dashboard.run_session(input, &mut output).unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn test_session_survives_undecodable_line() {
    let dir = TempDir::new().unwrap();
    let (_url, executor) = listings_store(&dir);
    let dashboard = Dashboard::new(executor, AppConfig::default());

    let output = session_output(&dashboard, b"catalog\n\xff\xfe bad\nrun 1\nquit\nrun 2\n");

    assert!(output.contains("Unknown command"));
    assert!(output.contains("== 1. Providers per city =="));
    assert!(output.ends_with("Goodbye!\n"));
    // quit 之後的指令不再執行
    assert!(!output.contains("== 2. Provider type contribution =="));
}

#[test]
fn test_session_keeps_going_after_failed_command() {
    let dir = TempDir::new().unwrap();
    let (_url, executor) = listings_store(&dir);
    let dashboard = Dashboard::new(executor, AppConfig::default());

    let output = session_output(&dashboard, b"sql SELECT * FROM Donors\nrun 99\ncities\n");

    assert!(output.contains("No catalog entry 99"));
    assert!(output.contains("Cities: Boston, Chicago, New York"));
    assert!(output.ends_with("Goodbye!\n"));
}

struct Disconnected;

impl Read for Disconnected {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("terminal went away"))
    }
}

#[test]
fn test_session_ends_cleanly_when_input_fails() {
    let dir = TempDir::new().unwrap();
    let (_url, executor) = listings_store(&dir);
    let dashboard = Dashboard::new(executor, AppConfig::default());

    let mut output = Vec::new();
    dashboard
        .run_session(BufReader::new(Disconnected), &mut output)
        .unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains("Input error: terminal went away"));
    assert!(output.ends_with("Goodbye!\n"));
}

#[test]
fn test_missing_store_is_connectivity_error_per_call() {
    let dir = TempDir::new().unwrap();
    let executor = QueryExecutor::new(DatabaseUrl::from_path(dir.path().join("gone.db")));

    assert!(matches!(
        executor.ping(),
        Err(TrackerError::ConnectivityError { .. })
    ));
    assert!(matches!(
        executor.filter_listings(&[]),
        Err(TrackerError::ConnectivityError { .. })
    ));

    let dashboard = Dashboard::new(executor, AppConfig::default());
    assert!(matches!(dashboard.handle(Action::Cities), Outcome::Error(_)));
}
