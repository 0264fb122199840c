use std::path::PathBuf;

use anyhow::{Context, Result};

use league_forecast::calibration::{
    self, Prob3, calibration_bins, empirical_outcome_probs, evaluate_binary, evaluate_probs,
};
use league_forecast::config::ForecastConfig;
use league_forecast::form::{FeatureTable, build_features_with};
use league_forecast::match_log::played_matches;
use league_forecast::store::{self, default_db_path, open_db};
use league_forecast::targets::Outcome;
use league_forecast::trainer::{TrainingOutcome, train_with};

const DEFAULT_TRAIN_SHARE: f64 = 0.85;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::init();

    let db_path = parse_db_path_arg()
        .or_else(default_db_path)
        .context("unable to resolve sqlite path")?;
    let train_share = parse_f64_arg("--train-share")
        .unwrap_or(DEFAULT_TRAIN_SHARE)
        .clamp(0.5, 0.95);
    let bins = parse_f64_arg("--bins").map(|b| b as usize).unwrap_or(10);
    let show_bins = has_flag("--bins");
    let cfg = ForecastConfig::from_env();

    let conn = open_db(&db_path)?;
    let log = store::load_matches(&conn)?;
    let (table, _) = build_features_with(&played_matches(&log), &cfg.form);
    if table.is_empty() {
        println!("No feature rows in {}", db_path.display());
        return Ok(());
    }

    let split = ((table.len() as f64) * train_share).round() as usize;
    let split = split.clamp(1, table.len());
    let train = FeatureTable {
        rows: table.rows[..split].to_vec(),
    };
    let test = &table.rows[split..];
    if test.is_empty() {
        println!("Nothing left to evaluate after a {train_share:.2} split");
        return Ok(());
    }

    let models = match train_with(&train, &cfg) {
        TrainingOutcome::Trained(models) => models,
        TrainingOutcome::InsufficientData { rows, required } => {
            println!("Not enough data to train: {rows} rows, need at least {required}");
            return Ok(());
        }
    };

    let train_outcomes: Vec<Outcome> = train.rows.iter().map(|r| r.targets.outcome).collect();
    let prior = empirical_outcome_probs(&train_outcomes);

    let mut outcome_preds = Vec::new();
    let mut prior_preds = Vec::new();
    let mut outcomes = Vec::new();
    let mut over_preds = Vec::new();
    let mut over_actual = Vec::new();
    let mut btts_preds = Vec::new();
    let mut btts_actual = Vec::new();

    for row in test {
        let prediction = models.predict_row(row);
        if let Some(probs) = &prediction.outcome {
            outcome_preds.push(Prob3::from_outcome_probs(probs));
            prior_preds.push(prior);
            outcomes.push(row.targets.outcome);
        }
        if let Some(p) = prediction.over_line {
            over_preds.push(p);
            over_actual.push(row.targets.over_line);
        }
        if let Some(p) = prediction.both_scored {
            btts_preds.push(p);
            btts_actual.push(row.targets.both_scored);
        }
    }

    println!("DB: {}", db_path.display());
    println!("Rows: train={} test={}", train.len(), test.len());
    print_metrics("Outcome (model)", evaluate_probs(&outcome_preds, &outcomes));
    print_metrics("Outcome (train frequencies)", evaluate_probs(&prior_preds, &outcomes));
    print_metrics("Over line", evaluate_binary(&over_preds, &over_actual));
    print_metrics("Both teams score", evaluate_binary(&btts_preds, &btts_actual));

    if show_bins {
        for class in Outcome::ALL {
            println!("Calibration ({}):", class.label());
            for bin in calibration_bins(&outcome_preds, &outcomes, class, bins) {
                if bin.count == 0 {
                    continue;
                }
                println!(
                    "  [{:.2}, {:.2}) n={:<4} pred={:.3} actual={:.3}",
                    bin.bucket_start, bin.bucket_end, bin.count, bin.avg_pred, bin.actual_rate
                );
            }
        }
    }

    Ok(())
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db"
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    std::env::var("LEAGUE_FORECAST_DB")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

fn parse_f64_arg(name: &str) -> Option<f64> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && let Ok(v) = raw.trim().parse::<f64>()
        {
            return Some(v);
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && let Ok(v) = next.trim().parse::<f64>()
        {
            return Some(v);
        }
    }
    None
}

fn has_flag(name: &str) -> bool {
    std::env::args()
        .skip(1)
        .any(|arg| arg == name || arg.starts_with(&format!("{name}=")))
}

fn print_metrics(label: &str, metrics: calibration::Metrics) {
    println!("{label}:");
    println!(
        "  samples={} brier={:.4} log_loss={:.4} accuracy={:.3}",
        metrics.samples, metrics.brier, metrics.log_loss, metrics.accuracy
    );
}
