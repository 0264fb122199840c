use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    /// Class label used by the outcome classifier.
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Home => "home",
            Outcome::Draw => "draw",
            Outcome::Away => "away",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "home" => Some(Outcome::Home),
            "draw" => Some(Outcome::Draw),
            "away" => Some(Outcome::Away),
            _ => None,
        }
    }

    /// Result for (home, away).
    pub fn results(self) -> (ResultLetter, ResultLetter) {
        match self {
            Outcome::Home => (ResultLetter::Win, ResultLetter::Loss),
            Outcome::Draw => (ResultLetter::Draw, ResultLetter::Draw),
            Outcome::Away => (ResultLetter::Loss, ResultLetter::Win),
        }
    }

    /// Points for (home, away).
    pub fn points(self) -> (u32, u32) {
        let (home, away) = self.results();
        (u32::from(home.points()), u32::from(away.points()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultLetter {
    Win,
    Draw,
    Loss,
}

impl ResultLetter {
    pub fn from_goals(scored: u32, conceded: u32) -> Self {
        if scored > conceded {
            ResultLetter::Win
        } else if scored == conceded {
            ResultLetter::Draw
        } else {
            ResultLetter::Loss
        }
    }

    pub fn points(self) -> u8 {
        match self {
            ResultLetter::Win => 3,
            ResultLetter::Draw => 1,
            ResultLetter::Loss => 0,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            ResultLetter::Win => 'W',
            ResultLetter::Draw => 'D',
            ResultLetter::Loss => 'L',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTargets {
    pub outcome: Outcome,
    pub over_line: bool,
    pub both_scored: bool,
}

pub fn classify_outcome(home_goals: u32, away_goals: u32) -> Outcome {
    if home_goals > away_goals {
        Outcome::Home
    } else if home_goals < away_goals {
        Outcome::Away
    } else {
        Outcome::Draw
    }
}

pub fn derive_targets(home_goals: u32, away_goals: u32, goals_line: f64) -> MatchTargets {
    MatchTargets {
        outcome: classify_outcome(home_goals, away_goals),
        over_line: f64::from(home_goals) + f64::from(away_goals) > goals_line,
        both_scored: home_goals > 0 && away_goals > 0,
    }
}

pub fn binary_label(flag: bool) -> &'static str {
    if flag { "1" } else { "0" }
}
