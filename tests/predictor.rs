mod common;

use league_forecast::config::ForecastConfig;
use league_forecast::form::{FormConfig, build_features_with};
use league_forecast::match_log::played_matches;
use league_forecast::model_store::{load_bundle, save_bundle};
use league_forecast::predictor::OutcomeModel;
use league_forecast::trainer::{TargetKey, TrainedModels, TrainingOutcome, train_with};

use common::{played, season};

fn cfg_without_warmup() -> ForecastConfig {
    ForecastConfig {
        form: FormConfig {
            warmup_rows: 0,
            ..FormConfig::default()
        },
        ..ForecastConfig::default()
    }
}

fn trained() -> (TrainedModels, league_forecast::form::TeamStateMap) {
    let cfg = ForecastConfig::default();
    let log = season(20, 20);
    let (table, state) = build_features_with(&played_matches(&log), &cfg.form);
    let models = train_with(&table, &cfg)
        .into_models()
        .expect("season should have enough rows");
    (models, state)
}

#[test]
fn all_three_targets_are_trained() {
    let (models, _) = trained();
    for key in TargetKey::ALL {
        assert!(models.models.contains(key), "missing {}", key.key());
    }
    assert_eq!(models.training_rows, 40);
    assert_eq!(models.form_window, 5);
}

#[test]
fn prediction_has_every_key_and_sums_to_one() {
    let (models, state) = trained();
    let p = models.predict("Bahia", "Santos", &state).to_map();
    for key in ["home", "draw", "away", "over25", "btts"] {
        assert!(p.contains_key(key), "missing {key}");
    }
    let total = p["home"] + p["draw"] + p["away"];
    assert!((total - 1.0).abs() < 1e-9);
    assert!(p.values().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn repeated_predictions_are_identical() {
    let (models, state) = trained();
    let first = models.predict("Flamengo", "Gremio", &state);
    let second = models.predict("Flamengo", "Gremio", &state);
    assert_eq!(first, second);
}

#[test]
fn unseen_team_still_gets_a_prediction() {
    let (models, state) = trained();
    let p = models.predict("Vasco", "Santos", &state).to_map();
    for key in ["home", "draw", "away", "over25", "btts"] {
        assert!(p.contains_key(key), "missing {key}");
    }
    assert!(models.predict_outcome("Vasco", "Cruzeiro", &state).is_ok());
}

#[test]
fn ten_rows_is_not_enough() {
    let cfg = cfg_without_warmup();
    let log = season(10, 10);
    let matches = played_matches(&log);

    let (table, _) = build_features_with(&matches[..10], &cfg.form);
    assert_eq!(
        train_with(&table, &cfg),
        TrainingOutcome::InsufficientData {
            rows: 10,
            required: 11
        }
    );

    let (table, _) = build_features_with(&matches[..11], &cfg.form);
    assert!(matches!(train_with(&table, &cfg), TrainingOutcome::Trained(_)));
}

#[test]
fn single_class_targets_are_left_out() {
    // Never more than two goals and never both teams on the scoresheet.
    let scores = [(1, 0), (0, 1), (0, 0), (2, 0), (0, 2), (1, 0)];
    let log: Vec<_> = (0..12u32)
        .map(|i| {
            let (hg, ag) = scores[i as usize % scores.len()];
            let (home, away) = if i % 2 == 0 { ("Bahia", "Santos") } else { ("Santos", "Gremio") };
            played(i64::from(i) + 1, i, home, away, hg, ag)
        })
        .collect();
    let cfg = cfg_without_warmup();
    let (table, state) = build_features_with(&played_matches(&log), &cfg.form);
    let models = train_with(&table, &cfg).into_models().unwrap();

    assert!(models.models.contains(TargetKey::Outcome));
    assert!(!models.models.contains(TargetKey::OverLine));
    assert!(!models.models.contains(TargetKey::BothScored));

    let p = models.predict("Bahia", "Gremio", &state).to_map();
    assert_eq!(p.len(), 3);
    assert!(!p.contains_key("btts"));
}

#[test]
fn bundle_survives_a_save_and_load() {
    let (models, state) = trained();
    let dir = std::env::temp_dir().join(format!("league_forecast_bundle_{}", std::process::id()));
    let path = dir.join("models.json");
    save_bundle(&path, &models).unwrap();
    let loaded = load_bundle(&path).unwrap();
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(loaded.schema, models.schema);
    assert_eq!(loaded.encoder, models.encoder);
    let a = models.predict("Bahia", "Santos", &state).to_map();
    let b = loaded.predict("Bahia", "Santos", &state).to_map();
    assert_eq!(a.len(), b.len());
    for (key, p) in &a {
        assert!((p - b[key]).abs() < 1e-9, "{key} drifted");
    }
}
