mod common;

use rusqlite::Connection;

use league_forecast::error::PredictError;
use league_forecast::form::TeamStateMap;
use league_forecast::h2h::{BaselineRecord, BaselineSource, H2hBaseline, head_to_head};
use league_forecast::match_log::{future_fixtures, played_matches};
use league_forecast::predictor::{OutcomeModel, OutcomeProbs};
use league_forecast::simulator::simulate;
use league_forecast::store::{
    init_schema, load_baseline, load_matches, upsert_baseline, upsert_matches,
};
use league_forecast::targets::Outcome;

use common::{fixture, played};

fn memory_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

#[test]
fn matches_round_trip_in_date_order() {
    let mut conn = memory_db();
    let log = vec![
        fixture(3, 14, "Santos", "Bahia"),
        played(1, 0, "Bahia", "Gremio", 1, 2),
        played(2, 7, "Gremio", "Santos", 0, 0),
    ];
    assert_eq!(upsert_matches(&mut conn, &log).unwrap(), 3);

    let loaded = load_matches(&conn).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0], log[1]);
    assert_eq!(loaded[1], log[2]);
    assert_eq!(loaded[2], log[0]);
    assert!(!loaded[2].is_played());
}

#[test]
fn reimport_updates_scores_in_place() {
    let mut conn = memory_db();
    upsert_matches(&mut conn, &[fixture(3, 14, "Santos", "Bahia")]).unwrap();
    upsert_matches(&mut conn, &[played(3, 14, "Santos", "Bahia", 2, 2)]).unwrap();

    let loaded = load_matches(&conn).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].home_goals, Some(2));
    assert_eq!(loaded[0].away_goals, Some(2));
}

struct HomeWins;

impl OutcomeModel for HomeWins {
    fn outcome_probs(
        &self,
        _home: &str,
        _away: &str,
        _state: &TeamStateMap,
    ) -> Result<OutcomeProbs, PredictError> {
        Ok(OutcomeProbs::new(vec![(Outcome::Home, 1.0)]))
    }
}

#[test]
fn rescheduled_fixture_replaces_its_old_row() {
    let mut conn = memory_db();
    upsert_matches(
        &mut conn,
        &[played(1, 0, "A", "B", 1, 0), fixture(2, 7, "B", "A")],
    )
    .unwrap();
    upsert_matches(&mut conn, &[played(2, 10, "B", "A", 0, 2)]).unwrap();

    let loaded = load_matches(&conn).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[1], played(2, 10, "B", "A", 0, 2));

    let results = played_matches(&loaded);
    let future = future_fixtures(&loaded);
    assert!(future.is_empty());
    let table = simulate(2, &future, &results, &HomeWins, &TeamStateMap::new());
    let a = table.row("A").unwrap();
    assert_eq!((a.played, a.wins, a.points), (2, 2, 6));
}

#[test]
fn baseline_is_stored_canonically_and_served_by_the_connection() {
    let mut conn = memory_db();
    let baseline = H2hBaseline::from_records([BaselineRecord {
        team1: "Santos".into(),
        team2: "Bahia".into(),
        wins_team1: 6,
        wins_team2: 2,
        draws: 3,
    }]);
    assert_eq!(upsert_baseline(&mut conn, &baseline).unwrap(), 1);

    let loaded = load_baseline(&conn).unwrap();
    assert_eq!(loaded, baseline);

    let record = conn.lookup("Santos", "Bahia").unwrap();
    assert_eq!(record.team1, "Bahia");
    assert_eq!(record.wins_for("Santos"), 6);
    assert!(conn.lookup("Santos", "Gremio").is_none());

    let log = vec![played(1, 0, "Bahia", "Santos", 1, 0)];
    let (summary, _) = head_to_head(&log, "Bahia", "Santos", &conn);
    assert_eq!((summary.wins_a, summary.wins_b, summary.draws), (3, 6, 3));
}
