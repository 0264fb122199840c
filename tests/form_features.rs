mod common;

use league_forecast::form::{
    FormConfig, FormFeatures, TeamStateMap, build_features, build_features_with,
};
use league_forecast::match_log::played_matches;
use league_forecast::targets::Outcome;

use common::{played, season};

#[test]
fn warmup_trims_first_twenty_rows() {
    for played_rounds in [0usize, 3, 6, 7, 10] {
        let log = season(10, played_rounds);
        let matches = played_matches(&log);
        let (table, state) = build_features(&matches);
        assert_eq!(table.len(), matches.len().saturating_sub(20));
        if matches.is_empty() {
            assert!(table.is_empty());
            assert!(state.is_empty());
        } else {
            assert_eq!(state.len(), 6);
        }
    }
}

#[test]
fn unknown_team_features_are_the_prior() {
    let state = TeamStateMap::new();
    let f = state.features_for("Nowhere FC", 5);
    assert_eq!(
        f,
        FormFeatures {
            strength: 1.0,
            form_points: 0.0,
            goals_for_avg: 0.0,
            goals_against_avg: 0.0,
        }
    );
}

#[test]
fn rows_only_see_earlier_results() {
    let log = vec![
        played(1, 0, "Bahia", "Santos", 2, 0),
        played(2, 7, "Bahia", "Gremio", 1, 1),
    ];
    let cfg = FormConfig {
        warmup_rows: 0,
        ..FormConfig::default()
    };
    let (table, state) = build_features_with(&played_matches(&log), &cfg);
    assert_eq!(table.len(), 2);

    let first = &table.rows[0].features;
    assert_eq!(first.home, FormFeatures::default());
    assert_eq!(first.away, FormFeatures::default());

    let second = &table.rows[1].features;
    assert_eq!(second.home.strength, 3.0);
    assert_eq!(second.home.form_points, 3.0);
    assert_eq!(second.home.goals_for_avg, 2.0);
    assert_eq!(second.home.goals_against_avg, 0.0);
    assert_eq!(second.away, FormFeatures::default());
    assert_eq!(table.rows[1].targets.outcome, Outcome::Draw);

    // Final state includes the last match.
    let bahia = state.features_for("Bahia", 5);
    assert_eq!(bahia.strength, 2.0);
    assert_eq!(bahia.goals_for_avg, 1.5);
}

#[test]
fn input_order_does_not_matter_across_dates() {
    let log = vec![
        played(2, 7, "Santos", "Bahia", 0, 1),
        played(1, 0, "Bahia", "Santos", 3, 0),
    ];
    let cfg = FormConfig {
        warmup_rows: 0,
        ..FormConfig::default()
    };
    let (table, _) = build_features_with(&played_matches(&log), &cfg);
    assert_eq!(table.rows[0].fixture.home_team, "Bahia");
    assert_eq!(table.rows[1].features.away.form_points, 3.0);
    assert_eq!(table.rows[1].features.home.goals_against_avg, 3.0);
}

#[test]
fn same_day_matches_keep_input_order() {
    let log = vec![
        played(1, 0, "Bahia", "Santos", 1, 0),
        played(1, 0, "Bahia", "Gremio", 0, 0),
    ];
    let cfg = FormConfig {
        warmup_rows: 0,
        ..FormConfig::default()
    };
    let (table, _) = build_features_with(&played_matches(&log), &cfg);
    assert_eq!(table.rows[1].fixture.away_team, "Gremio");
    assert_eq!(table.rows[1].features.home.form_points, 3.0);
}

#[test]
fn window_limits_rolling_stats_but_not_strength() {
    let mut log = Vec::new();
    for day in 0..6u32 {
        // Five losses, then a win.
        let (hg, ag) = if day < 5 { (0, 2) } else { (4, 0) };
        log.push(played(i64::from(day) + 1, day * 7, "Bahia", "Santos", hg, ag));
    }
    let cfg = FormConfig {
        window: 3,
        warmup_rows: 0,
        ..FormConfig::default()
    };
    let (_, state) = build_features_with(&played_matches(&log), &cfg);
    let f = state.features_for("Bahia", cfg.window);
    assert_eq!(f.form_points, 3.0);
    assert!((f.goals_for_avg - 4.0 / 3.0).abs() < 1e-12);
    assert!((f.goals_against_avg - 4.0 / 3.0).abs() < 1e-12);
    assert!((f.strength - 0.5).abs() < 1e-12);
    assert_eq!(state.get("Bahia").unwrap().form_string(3), "LLW");
    assert_eq!(state.get("Santos").unwrap().form_string(10), "WWWWWL");
}

#[test]
fn targets_follow_goals_line() {
    let log = vec![
        played(1, 0, "Bahia", "Santos", 2, 1),
        played(1, 1, "Gremio", "Flamengo", 0, 2),
    ];
    let cfg = FormConfig {
        warmup_rows: 0,
        goals_line: 2.5,
        ..FormConfig::default()
    };
    let (table, _) = build_features_with(&played_matches(&log), &cfg);
    let t0 = table.rows[0].targets;
    assert_eq!(t0.outcome, Outcome::Home);
    assert!(t0.over_line);
    assert!(t0.both_scored);
    let t1 = table.rows[1].targets;
    assert_eq!(t1.outcome, Outcome::Away);
    assert!(!t1.over_line);
    assert!(!t1.both_scored);
}
