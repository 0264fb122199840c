use std::path::PathBuf;

use crate::form::FormConfig;
use crate::logreg::LogRegParams;

const CACHE_DIR: &str = "league_forecast";

pub const DEFAULT_FORM_WINDOW: usize = 5;
pub const DEFAULT_WARMUP_ROWS: usize = 20;
pub const DEFAULT_GOALS_LINE: f64 = 2.5;
pub const DEFAULT_MIN_TRAINING_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastConfig {
    pub form: FormConfig,
    /// Training needs strictly more rows than this.
    pub min_training_rows: usize,
    pub logreg: LogRegParams,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            form: FormConfig::default(),
            min_training_rows: DEFAULT_MIN_TRAINING_ROWS,
            logreg: LogRegParams::default(),
        }
    }
}

impl ForecastConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unparseable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let usize_var = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());
        let f64_var = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };

        Self {
            form: FormConfig {
                window: usize_var("FORM_WINDOW")
                    .unwrap_or(d.form.window)
                    .clamp(1, 38),
                warmup_rows: usize_var("WARMUP_ROWS")
                    .unwrap_or(d.form.warmup_rows)
                    .min(1000),
                goals_line: f64_var("GOALS_LINE")
                    .unwrap_or(d.form.goals_line)
                    .clamp(0.5, 10.5),
            },
            min_training_rows: usize_var("MIN_TRAINING_ROWS").unwrap_or(d.min_training_rows),
            logreg: LogRegParams {
                max_iters: usize_var("LOGREG_MAX_ITERS")
                    .unwrap_or(d.logreg.max_iters)
                    .clamp(1, 100_000),
                l2: f64_var("LOGREG_L2").unwrap_or(d.logreg.l2).clamp(0.0, 1e4),
                learning_rate: f64_var("LOGREG_LEARNING_RATE")
                    .unwrap_or(d.logreg.learning_rate)
                    .clamp(1e-4, 5.0),
                tol: d.logreg.tol,
            },
        }
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn lookup_overrides_and_falls_back() {
        let vars = HashMap::from([
            ("FORM_WINDOW", "3"),
            ("WARMUP_ROWS", "abc"),
            ("LOGREG_L2", "0.25"),
        ]);
        let cfg = ForecastConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.form.window, 3);
        assert_eq!(cfg.form.warmup_rows, DEFAULT_WARMUP_ROWS);
        assert!((cfg.logreg.l2 - 0.25).abs() < 1e-12);
        assert_eq!(cfg.min_training_rows, DEFAULT_MIN_TRAINING_ROWS);
    }

    #[test]
    fn window_is_clamped() {
        let cfg = ForecastConfig::from_lookup(|k| (k == "FORM_WINDOW").then(|| "0".to_string()));
        assert_eq!(cfg.form.window, 1);
    }
}
