use std::collections::BTreeMap;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::form::TeamStateMap;
use crate::match_log::{Match, PlayedMatch};
use crate::predictor::{OutcomeModel, OutcomeProbs};
use crate::standings::{Standings, StandingsTable};
use crate::targets::Outcome;

/// Replays the played results, then applies the most likely predicted outcome of
/// every remaining fixture up to `through_round`.
///
/// Rolling form stays frozen at `state`; simulated results only move the table.
/// A fixture is skipped when a team has no row or the model cannot score it.
pub fn simulate<M: OutcomeModel + ?Sized>(
    through_round: i64,
    future: &[Match],
    played: &[PlayedMatch],
    model: &M,
    state: &TeamStateMap,
) -> StandingsTable {
    let mut table = replay(played);

    let mut applied = 0usize;
    for fixture in fixtures_through(future, through_round) {
        if !table.contains(&fixture.home_team) || !table.contains(&fixture.away_team) {
            continue;
        }
        match model.predict_outcome(&fixture.home_team, &fixture.away_team, state) {
            Ok(outcome) => {
                table.apply_outcome(&fixture.home_team, &fixture.away_team, outcome);
                applied += 1;
            }
            Err(err) => warn!(
                "skipping {} vs {} (round {:?}): {err}",
                fixture.home_team, fixture.away_team, fixture.round
            ),
        }
    }
    debug!(
        "simulated {applied} fixtures through round {through_round} over {} teams",
        table.team_count()
    );

    table.rank()
}

/// Table built from real results only.
pub fn replay(played: &[PlayedMatch]) -> Standings {
    let mut table = Standings::bootstrap(played);
    for m in played {
        table.apply_result(m);
    }
    table
}

/// Unplayed fixtures with a known round no later than `through_round`.
pub fn fixtures_through(future: &[Match], through_round: i64) -> impl Iterator<Item = &Match> {
    future
        .iter()
        .filter(|m| !m.is_played())
        .filter(move |m| m.round.is_some_and(|r| r <= through_round))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRow {
    pub team: String,
    pub mean_points: f64,
    pub mean_rank: f64,
    pub best_rank: usize,
    pub worst_rank: usize,
    /// Share of trials finishing first.
    pub top_share: f64,
}

/// Monte Carlo variant of [`simulate`]: every fixture's outcome is drawn from the
/// predicted probabilities, `trials` times. Deterministic for a given `seed`.
pub fn simulate_trials<M: OutcomeModel + ?Sized>(
    through_round: i64,
    future: &[Match],
    played: &[PlayedMatch],
    model: &M,
    state: &TeamStateMap,
    trials: usize,
    seed: u64,
) -> Vec<ProjectionRow> {
    let base = replay(played);

    // Probabilities depend only on the frozen state, so score each fixture once.
    let mut scored: Vec<(&Match, OutcomeProbs)> = Vec::new();
    for fixture in fixtures_through(future, through_round) {
        if !base.contains(&fixture.home_team) || !base.contains(&fixture.away_team) {
            continue;
        }
        match model.outcome_probs(&fixture.home_team, &fixture.away_team, state) {
            Ok(probs) => scored.push((fixture, probs)),
            Err(err) => warn!(
                "skipping {} vs {} (round {:?}): {err}",
                fixture.home_team, fixture.away_team, fixture.round
            ),
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut acc: BTreeMap<String, RankAccumulator> = BTreeMap::new();
    for _ in 0..trials {
        let mut table = base.clone();
        for (fixture, probs) in &scored {
            if let Some(outcome) = sample_outcome(probs, &mut rng) {
                table.apply_outcome(&fixture.home_team, &fixture.away_team, outcome);
            }
        }
        for row in table.rank().rows {
            acc.entry(row.team).or_default().push(row.points, row.rank);
        }
    }

    let mut rows: Vec<ProjectionRow> = acc
        .into_iter()
        .map(|(team, a)| a.finish(team, trials))
        .collect();
    rows.sort_by(|a, b| {
        b.mean_points
            .total_cmp(&a.mean_points)
            .then_with(|| a.mean_rank.total_cmp(&b.mean_rank))
    });
    rows
}

fn sample_outcome<R: Rng>(probs: &OutcomeProbs, rng: &mut R) -> Option<Outcome> {
    let total: f64 = probs.entries().iter().map(|(_, p)| p.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return probs.most_likely();
    }
    let mut draw = rng.gen_range(0.0..total);
    for &(outcome, p) in probs.entries() {
        let p = p.max(0.0);
        if draw < p {
            return Some(outcome);
        }
        draw -= p;
    }
    probs.entries().last().map(|(o, _)| *o)
}

#[derive(Debug, Clone, Default)]
struct RankAccumulator {
    points_sum: f64,
    rank_sum: f64,
    best: Option<usize>,
    worst: usize,
    firsts: usize,
}

impl RankAccumulator {
    fn push(&mut self, points: u32, rank: usize) {
        self.points_sum += f64::from(points);
        self.rank_sum += rank as f64;
        self.best = Some(self.best.map_or(rank, |b| b.min(rank)));
        self.worst = self.worst.max(rank);
        if rank == 1 {
            self.firsts += 1;
        }
    }

    fn finish(self, team: String, trials: usize) -> ProjectionRow {
        let n = trials.max(1) as f64;
        ProjectionRow {
            team,
            mean_points: self.points_sum / n,
            mean_rank: self.rank_sum / n,
            best_rank: self.best.unwrap_or(0),
            worst_rank: self.worst,
            top_share: self.firsts as f64 / n,
        }
    }
}
