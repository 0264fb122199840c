use std::collections::BTreeMap;

use log::warn;

use crate::encoder::TeamEncoder;
use crate::error::PredictError;
use crate::form::{FeatureRow, MatchFeatures, TeamStateMap};
use crate::schema::FeatureSchema;
use crate::targets::Outcome;
use crate::trainer::{ModelSet, TargetKey, TrainedModels, model_inputs};

const POSITIVE_LABEL: &str = "1";

/// Outcome probabilities in the classifier's own class order.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeProbs {
    entries: Vec<(Outcome, f64)>,
}

impl OutcomeProbs {
    pub fn new(entries: Vec<(Outcome, f64)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, outcome: Outcome) -> Option<f64> {
        self.entries
            .iter()
            .find(|(o, _)| *o == outcome)
            .map(|(_, p)| *p)
    }

    pub fn entries(&self) -> &[(Outcome, f64)] {
        &self.entries
    }

    /// Ties go to the earliest class in classifier order.
    pub fn most_likely(&self) -> Option<Outcome> {
        let mut best: Option<(Outcome, f64)> = None;
        for &(o, p) in &self.entries {
            if best.is_none_or(|(_, bp)| p > bp) {
                best = Some((o, p));
            }
        }
        best.map(|(o, _)| o)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchPrediction {
    pub outcome: Option<OutcomeProbs>,
    pub over_line: Option<f64>,
    pub both_scored: Option<f64>,
}

impl MatchPrediction {
    /// Dictionary view; unavailable predictions have no key.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        if let Some(outcome) = &self.outcome {
            for (o, p) in outcome.entries() {
                out.insert(o.label().to_string(), *p);
            }
        }
        if let Some(p) = self.over_line {
            out.insert(TargetKey::OverLine.key().to_string(), p);
        }
        if let Some(p) = self.both_scored {
            out.insert(TargetKey::BothScored.key().to_string(), p);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.outcome.is_none() && self.over_line.is_none() && self.both_scored.is_none()
    }
}

/// Anything the season simulator can ask for a fixture's outcome.
pub trait OutcomeModel {
    fn outcome_probs(
        &self,
        home: &str,
        away: &str,
        state: &TeamStateMap,
    ) -> Result<OutcomeProbs, PredictError>;

    fn predict_outcome(
        &self,
        home: &str,
        away: &str,
        state: &TeamStateMap,
    ) -> Result<Outcome, PredictError> {
        self.outcome_probs(home, away, state)?
            .most_likely()
            .ok_or(PredictError::MissingModel(TargetKey::Outcome))
    }
}

/// Input vector for one fixture, aligned to `schema`.
pub fn match_feature_vector(
    home: &str,
    away: &str,
    encoder: &TeamEncoder,
    features: &MatchFeatures,
    schema: &FeatureSchema,
) -> Vec<f64> {
    schema.project(&model_inputs(encoder, home, away, &features.named()))
}

pub fn predict_match(
    home: &str,
    away: &str,
    models: &ModelSet,
    encoder: &TeamEncoder,
    state: &TeamStateMap,
    schema: &FeatureSchema,
    window: usize,
) -> MatchPrediction {
    let features = state.match_features(home, away, window);
    predict_from_features(home, away, models, encoder, &features, schema)
}

pub fn predict_from_features(
    home: &str,
    away: &str,
    models: &ModelSet,
    encoder: &TeamEncoder,
    features: &MatchFeatures,
    schema: &FeatureSchema,
) -> MatchPrediction {
    let x = match_feature_vector(home, away, encoder, features, schema);

    let outcome = match outcome_probs_for(models, &x) {
        Ok(probs) => Some(probs),
        Err(PredictError::MissingModel(_)) => None,
        Err(err) => {
            warn!("outcome prediction failed for {home} vs {away}: {err}");
            None
        }
    };

    MatchPrediction {
        outcome,
        over_line: positive_prob(models, TargetKey::OverLine, &x, home, away),
        both_scored: positive_prob(models, TargetKey::BothScored, &x, home, away),
    }
}

fn outcome_probs_for(models: &ModelSet, x: &[f64]) -> Result<OutcomeProbs, PredictError> {
    let model = models
        .get(TargetKey::Outcome)
        .ok_or(PredictError::MissingModel(TargetKey::Outcome))?;
    let probs = model.predict_proba(x)?;
    let mut entries = Vec::with_capacity(probs.len());
    for (label, p) in model.classes().iter().zip(probs) {
        let outcome =
            Outcome::from_label(label).ok_or_else(|| PredictError::UnknownLabel(label.clone()))?;
        entries.push((outcome, p));
    }
    Ok(OutcomeProbs::new(entries))
}

fn positive_prob(
    models: &ModelSet,
    key: TargetKey,
    x: &[f64],
    home: &str,
    away: &str,
) -> Option<f64> {
    let model = models.get(key)?;
    let result = model
        .class_index(POSITIVE_LABEL)
        .ok_or_else(|| PredictError::UnknownLabel(POSITIVE_LABEL.to_string()))
        .and_then(|idx| Ok(model.predict_proba(x)?[idx]));
    match result {
        Ok(p) => Some(p),
        Err(err) => {
            warn!("{} prediction failed for {home} vs {away}: {err}", key.key());
            None
        }
    }
}

impl TrainedModels {
    pub fn predict(&self, home: &str, away: &str, state: &TeamStateMap) -> MatchPrediction {
        predict_match(
            home,
            away,
            &self.models,
            &self.encoder,
            state,
            &self.schema,
            self.form_window,
        )
    }

    /// Uses the features already stored on the row instead of a state snapshot.
    pub fn predict_row(&self, row: &FeatureRow) -> MatchPrediction {
        predict_from_features(
            &row.fixture.home_team,
            &row.fixture.away_team,
            &self.models,
            &self.encoder,
            &row.features,
            &self.schema,
        )
    }
}

impl OutcomeModel for TrainedModels {
    fn outcome_probs(
        &self,
        home: &str,
        away: &str,
        state: &TeamStateMap,
    ) -> Result<OutcomeProbs, PredictError> {
        let features = state.match_features(home, away, self.form_window);
        let x = match_feature_vector(home, away, &self.encoder, &features, &self.schema);
        outcome_probs_for(&self.models, &x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_likely_respects_class_order_on_ties() {
        let probs = OutcomeProbs::new(vec![
            (Outcome::Away, 0.4),
            (Outcome::Draw, 0.2),
            (Outcome::Home, 0.4),
        ]);
        assert_eq!(probs.most_likely(), Some(Outcome::Away));
        assert_eq!(probs.get(Outcome::Draw), Some(0.2));
    }

    #[test]
    fn empty_prediction_has_no_keys() {
        assert!(MatchPrediction::default().to_map().is_empty());
    }
}
