use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use log::{info, warn};

use league_forecast::config::ForecastConfig;
use league_forecast::form::{TeamStateMap, build_features_with};
use league_forecast::h2h::{head_to_head, parse_baseline_json};
use league_forecast::match_log::{Match, future_fixtures, parse_match_log_json, played_matches};
use league_forecast::model_store::{default_bundle_path, load_bundle, save_bundle};
use league_forecast::simulator::{simulate, simulate_trials};
use league_forecast::standings::position_history;
use league_forecast::store::{self, default_db_path, open_db};
use league_forecast::trainer::{TrainedModels, TrainingOutcome, train_with};

const VALUE_FLAGS: [&str; 5] = ["--db", "--model", "--trials", "--seed", "--team"];

const USAGE: &str = "\
usage: league_forecast <command> [args]

  import <matches.json>            load a match log into the store
  import-baseline <baseline.json>  load head-to-head baseline records
  train                            fit and save the model bundle
  predict <home> <away>            outcome, over and both-score probabilities
  simulate <round> [--trials N] [--seed S]
                                   project the table through a round
  h2h <team_a> <team_b>            head-to-head record
  evolution [--team NAME]          table position after every round

options: --db PATH, --model PATH";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first().cloned() else {
        println!("{USAGE}");
        return Ok(());
    };
    let rest = &args[1..];
    let cfg = ForecastConfig::from_env();

    match command.as_str() {
        "import" => cmd_import(rest),
        "import-baseline" => cmd_import_baseline(rest),
        "train" => cmd_train(rest, &cfg),
        "predict" => cmd_predict(rest, &cfg),
        "simulate" => cmd_simulate(rest, &cfg),
        "h2h" => cmd_h2h(rest),
        "evolution" => cmd_evolution(rest),
        "help" | "--help" | "-h" => {
            println!("{USAGE}");
            Ok(())
        }
        other => bail!("unknown command {other:?}\n\n{USAGE}"),
    }
}

fn cmd_import(args: &[String]) -> Result<()> {
    let path = positional(args, 0).context("missing match log path")?;
    let raw = fs::read_to_string(&path).with_context(|| format!("read {path}"))?;
    let matches = parse_match_log_json(&raw)?;

    let db_path = resolve_db_path(args)?;
    let mut conn = open_db(&db_path)?;
    let written = store::upsert_matches(&mut conn, &matches)?;
    println!(
        "Imported {written} matches into {} ({} played)",
        db_path.display(),
        matches.iter().filter(|m| m.is_played()).count()
    );
    Ok(())
}

fn cmd_import_baseline(args: &[String]) -> Result<()> {
    let path = positional(args, 0).context("missing baseline path")?;
    let raw = fs::read_to_string(&path).with_context(|| format!("read {path}"))?;
    let baseline = parse_baseline_json(&raw)?;

    let db_path = resolve_db_path(args)?;
    let mut conn = open_db(&db_path)?;
    let written = store::upsert_baseline(&mut conn, &baseline)?;
    println!("Imported {written} head-to-head pairs into {}", db_path.display());
    Ok(())
}

fn cmd_train(args: &[String], cfg: &ForecastConfig) -> Result<()> {
    let log = load_log(args)?;
    let Some(models) = fit_models(&log, cfg) else {
        return Ok(());
    };
    let model_path = resolve_model_path(args)?;
    save_bundle(&model_path, &models)?;

    let mut targets = models
        .models
        .keys()
        .map(|k| k.key())
        .collect::<Vec<_>>();
    targets.sort_unstable();
    println!(
        "Trained {} on {} rows -> {}",
        targets.join(", "),
        models.training_rows,
        model_path.display()
    );
    Ok(())
}

fn cmd_predict(args: &[String], cfg: &ForecastConfig) -> Result<()> {
    let home = positional(args, 0).context("missing home team")?;
    let away = positional(args, 1).context("missing away team")?;
    let log = load_log(args)?;
    let state = team_state(&log, cfg);
    let Some(models) = models_for(args, &log, cfg)? else {
        return Ok(());
    };

    let prediction = models.predict(&home, &away, &state);
    if prediction.is_empty() {
        println!("No prediction available for {home} vs {away}");
        return Ok(());
    }
    println!("{home} vs {away}");
    if !models.encoder.knows_home(&home) {
        println!("  note: {home} never played at home in the training data");
    }
    if !models.encoder.knows_away(&away) {
        println!("  note: {away} never played away in the training data");
    }
    for (key, p) in prediction.to_map() {
        println!("  {key:<6} {:>5.1}%", p * 100.0);
    }
    if let Some(form) = state.get(&home) {
        println!("  form {home}: {}", form.form_string(cfg.form.window));
    }
    if let Some(form) = state.get(&away) {
        println!("  form {away}: {}", form.form_string(cfg.form.window));
    }
    Ok(())
}

fn cmd_simulate(args: &[String], cfg: &ForecastConfig) -> Result<()> {
    let through_round = positional(args, 0)
        .context("missing round")?
        .trim()
        .parse::<i64>()
        .context("round must be an integer")?;
    let log = load_log(args)?;
    let state = team_state(&log, cfg);
    let Some(models) = models_for(args, &log, cfg)? else {
        return Ok(());
    };
    let played = played_matches(&log);
    let future = future_fixtures(&log);

    if let Some(trials) = parse_usize_arg(args, "--trials") {
        let seed = parse_usize_arg(args, "--seed").unwrap_or(0) as u64;
        let rows = simulate_trials(through_round, &future, &played, &models, &state, trials, seed);
        println!("Projection through round {through_round} ({trials} trials, seed {seed})");
        println!(
            "{:<4} {:<24} {:>7} {:>7} {:>5} {:>5} {:>6}",
            "#", "Team", "Pts", "Rank", "Best", "Worst", "Top%"
        );
        for (idx, r) in rows.iter().enumerate() {
            println!(
                "{:<4} {:<24} {:>7.2} {:>7.2} {:>5} {:>5} {:>5.1}%",
                idx + 1,
                r.team,
                r.mean_points,
                r.mean_rank,
                r.best_rank,
                r.worst_rank,
                r.top_share * 100.0
            );
        }
        return Ok(());
    }

    let table = simulate(through_round, &future, &played, &models, &state);
    println!("Projected table through round {through_round}");
    println!(
        "{:<28} {:>4} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4}",
        "Team", "Pts", "P", "W", "D", "L", "GF", "GA", "GD"
    );
    for row in &table.rows {
        println!(
            "{:<28} {:>4} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4}",
            row.label(),
            row.points,
            row.played,
            row.wins,
            row.draws,
            row.losses,
            row.goals_for,
            row.goals_against,
            row.goal_difference
        );
    }
    Ok(())
}

fn cmd_h2h(args: &[String]) -> Result<()> {
    let team_a = positional(args, 0).context("missing first team")?;
    let team_b = positional(args, 1).context("missing second team")?;
    let db_path = resolve_db_path(args)?;
    let conn = open_db(&db_path)?;
    let log = store::load_matches(&conn)?;

    let (summary, rows) = head_to_head(&log, &team_a, &team_b, &conn);
    println!("{team_a} vs {team_b}: {} matches", summary.total_matches());
    println!(
        "  wins {team_a}={} {team_b}={} draws={}",
        summary.wins_a, summary.wins_b, summary.draws
    );
    println!("  goals {team_a}={} {team_b}={}", summary.goals_a, summary.goals_b);
    for r in rows {
        println!(
            "  {}  {} {} x {} {}",
            r.date.format("%Y-%m-%d"),
            r.home_team,
            r.home_goals,
            r.away_goals,
            r.away_team
        );
    }
    Ok(())
}

fn cmd_evolution(args: &[String]) -> Result<()> {
    let log = load_log(args)?;
    let team = parse_string_arg(args, "--team");
    let history = position_history(&log);
    for (name, series) in &history {
        if team.as_deref().is_some_and(|t| t != name.as_str()) {
            continue;
        }
        let positions = series
            .iter()
            .map(|(round, pos)| format!("{round}:{pos}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{name:<24} {positions}");
    }
    Ok(())
}

fn load_log(args: &[String]) -> Result<Vec<Match>> {
    let db_path = resolve_db_path(args)?;
    let conn = open_db(&db_path)?;
    let log = store::load_matches(&conn)?;
    info!("loaded {} matches from {}", log.len(), db_path.display());
    Ok(log)
}

fn team_state(log: &[Match], cfg: &ForecastConfig) -> TeamStateMap {
    let (_, state) = build_features_with(&played_matches(log), &cfg.form);
    state
}

fn fit_models(log: &[Match], cfg: &ForecastConfig) -> Option<TrainedModels> {
    let (table, _) = build_features_with(&played_matches(log), &cfg.form);
    match train_with(&table, cfg) {
        TrainingOutcome::Trained(models) => Some(models),
        TrainingOutcome::InsufficientData { rows, required } => {
            println!("Not enough data to train: {rows} feature rows, need at least {required}");
            None
        }
    }
}

/// Saved bundle when one exists, otherwise a fresh fit on the stored log.
fn models_for(args: &[String], log: &[Match], cfg: &ForecastConfig) -> Result<Option<TrainedModels>> {
    let model_path = resolve_model_path(args)?;
    if model_path.exists() {
        let models = load_bundle(&model_path)?;
        if models.form_window != cfg.form.window {
            warn!(
                "bundle was trained with window {} but FORM_WINDOW is {}",
                models.form_window,
                cfg.form.window
            );
        }
        return Ok(Some(models));
    }
    info!("no model bundle at {}, training in memory", model_path.display());
    Ok(fit_models(log, cfg))
}

fn resolve_db_path(args: &[String]) -> Result<PathBuf> {
    parse_string_arg(args, "--db")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("LEAGUE_FORECAST_DB")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        })
        .or_else(default_db_path)
        .ok_or_else(|| anyhow!("unable to resolve sqlite path"))
}

fn resolve_model_path(args: &[String]) -> Result<PathBuf> {
    parse_string_arg(args, "--model")
        .map(PathBuf::from)
        .or_else(default_bundle_path)
        .ok_or_else(|| anyhow!("unable to resolve model bundle path"))
}

fn parse_string_arg(args: &[String], name: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && !raw.trim().is_empty()
        {
            return Some(raw.trim().to_string());
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn parse_usize_arg(args: &[String], name: &str) -> Option<usize> {
    parse_string_arg(args, name)?.parse::<usize>().ok()
}

/// The `n`th argument that is neither a flag nor a flag's value.
fn positional(args: &[String], n: usize) -> Option<String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = VALUE_FLAGS.contains(&arg.as_str());
            continue;
        }
        out.push(arg.clone());
    }
    out.into_iter().nth(n)
}
