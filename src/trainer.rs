use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::ForecastConfig;
use crate::encoder::TeamEncoder;
use crate::form::{FeatureRow, FeatureTable, NUMERIC_FEATURE_NAMES};
use crate::logreg::LogisticRegression;
use crate::schema::FeatureSchema;
use crate::targets::binary_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetKey {
    Outcome,
    OverLine,
    BothScored,
}

impl TargetKey {
    pub const ALL: [TargetKey; 3] = [TargetKey::Outcome, TargetKey::OverLine, TargetKey::BothScored];

    pub fn key(self) -> &'static str {
        match self {
            TargetKey::Outcome => "resultado",
            TargetKey::OverLine => "over25",
            TargetKey::BothScored => "btts",
        }
    }

    pub fn label_for(self, row: &FeatureRow) -> &'static str {
        match self {
            TargetKey::Outcome => row.targets.outcome.label(),
            TargetKey::OverLine => binary_label(row.targets.over_line),
            TargetKey::BothScored => binary_label(row.targets.both_scored),
        }
    }
}

/// Fitted classifiers by target. A target may be missing when its labels had a
/// single class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSet {
    models: BTreeMap<TargetKey, LogisticRegression>,
}

impl ModelSet {
    pub fn get(&self, key: TargetKey) -> Option<&LogisticRegression> {
        self.models.get(&key)
    }

    pub fn insert(&mut self, key: TargetKey, model: LogisticRegression) {
        self.models.insert(key, model);
    }

    pub fn contains(&self, key: TargetKey) -> bool {
        self.models.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = TargetKey> + '_ {
        self.models.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModels {
    pub models: ModelSet,
    pub encoder: TeamEncoder,
    pub schema: FeatureSchema,
    /// Rolling window the numeric features were computed with.
    pub form_window: usize,
    pub training_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainingOutcome {
    Trained(TrainedModels),
    InsufficientData { rows: usize, required: usize },
}

impl TrainingOutcome {
    pub fn into_models(self) -> Option<TrainedModels> {
        match self {
            TrainingOutcome::Trained(models) => Some(models),
            TrainingOutcome::InsufficientData { .. } => None,
        }
    }
}

pub fn train(table: &FeatureTable) -> TrainingOutcome {
    train_with(table, &ForecastConfig::default())
}

pub fn train_with(table: &FeatureTable, cfg: &ForecastConfig) -> TrainingOutcome {
    if table.len() <= cfg.min_training_rows {
        return TrainingOutcome::InsufficientData {
            rows: table.len(),
            required: cfg.min_training_rows + 1,
        };
    }

    let encoder = TeamEncoder::fit(
        table
            .rows
            .iter()
            .map(|r| (r.fixture.home_team.as_str(), r.fixture.away_team.as_str())),
    );
    let schema = training_schema(&encoder);
    let x: Vec<Vec<f64>> = table
        .rows
        .iter()
        .map(|r| {
            let named = model_inputs(
                &encoder,
                &r.fixture.home_team,
                &r.fixture.away_team,
                &r.features.named(),
            );
            schema.project(&named)
        })
        .collect();

    let mut models = ModelSet::default();
    for key in TargetKey::ALL {
        let y: Vec<&str> = table.rows.iter().map(|r| key.label_for(r)).collect();
        match LogisticRegression::fit(&x, &y, &cfg.logreg) {
            Ok(model) => {
                debug!(
                    "trained {} on {} rows: {} iterations, log loss {:.4}",
                    key.key(),
                    x.len(),
                    model.iterations(),
                    model.train_log_loss()
                );
                models.insert(key, model);
            }
            Err(err) => warn!("skipping {} model: {err}", key.key()),
        }
    }

    TrainingOutcome::Trained(TrainedModels {
        models,
        encoder,
        schema,
        form_window: cfg.form.window,
        training_rows: table.len(),
    })
}

/// One-hot identity columns followed by the numeric form columns.
pub fn training_schema(encoder: &TeamEncoder) -> FeatureSchema {
    let mut columns = encoder.column_names();
    columns.extend(NUMERIC_FEATURE_NAMES.iter().map(|s| s.to_string()));
    FeatureSchema::new(columns)
}

pub(crate) fn model_inputs(
    encoder: &TeamEncoder,
    home: &str,
    away: &str,
    numeric: &[(String, f64)],
) -> Vec<(String, f64)> {
    let mut named = encoder.encode_named(home, away);
    named.extend(numeric.iter().cloned());
    named
}
