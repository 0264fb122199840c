mod common;

use std::fs;
use std::path::PathBuf;

use league_forecast::h2h::{H2hBaseline, head_to_head, parse_baseline_json};

use common::{fixture, played};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn baseline() -> H2hBaseline {
    parse_baseline_json(&read_fixture("h2h_baseline.json")).expect("fixture should parse")
}

#[test]
fn baseline_fixture_is_keyed_on_sorted_pair() {
    let b = baseline();
    assert_eq!(b.len(), 2);
    let records: Vec<_> = b.records().filter(|r| r.team1 == "Bahia").collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].team2, "Palmeiras");
    assert_eq!(records[0].wins_team1, 4);
    assert_eq!(records[0].wins_team2, 15);
}

#[test]
fn live_results_add_to_the_baseline() {
    let log = vec![
        played(1, 0, "Santos", "Flamengo", 2, 1),
        played(5, 28, "Flamengo", "Santos", 0, 0),
        played(6, 35, "Santos", "Bahia", 4, 0),
        fixture(20, 140, "Flamengo", "Santos"),
    ];
    let (summary, rows) = head_to_head(&log, "Santos", "Flamengo", &baseline());

    assert_eq!(summary.wins_a, 9 + 1);
    assert_eq!(summary.wins_b, 12);
    assert_eq!(summary.draws, 7 + 1);
    assert_eq!(summary.goals_a, 2);
    assert_eq!(summary.goals_b, 1);
    assert_eq!(summary.total_matches(), 30);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].home_team, "Flamengo");
    assert_eq!(rows[1].home_team, "Santos");
    assert!(rows[0].date > rows[1].date);
}

#[test]
fn swapping_the_teams_mirrors_the_summary() {
    let log = vec![played(1, 0, "Bahia", "Palmeiras", 1, 3)];
    let b = baseline();
    let (ab, _) = head_to_head(&log, "Palmeiras", "Bahia", &b);
    let (ba, _) = head_to_head(&log, "Bahia", "Palmeiras", &b);
    assert_eq!((ab.wins_a, ab.wins_b, ab.draws), (16, 4, 5));
    assert_eq!((ba.wins_a, ba.wins_b, ba.draws), (4, 16, 5));
    assert_eq!((ab.goals_a, ab.goals_b), (3, 1));
    assert_eq!(ab.total_matches(), ba.total_matches());
}

#[test]
fn pair_without_history_is_all_zero() {
    let (summary, rows) = head_to_head(&[], "Gremio", "Vasco", &baseline());
    assert_eq!(summary.total_matches(), 0);
    assert_eq!((summary.goals_a, summary.goals_b), (0, 0));
    assert!(rows.is_empty());
}

#[test]
fn same_team_twice_is_empty() {
    let log = vec![played(1, 0, "Santos", "Flamengo", 2, 1)];
    let (summary, rows) = head_to_head(&log, "Santos", "Santos", &baseline());
    assert_eq!(summary.total_matches(), 0);
    assert!(rows.is_empty());
}
