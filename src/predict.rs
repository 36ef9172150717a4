//! Single-game predictions: repeated simulation of one matchup, summarised as win percentages,
//! average goals and a favourite.

use anyhow::bail;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tinyrand::Rand;
use tracing::debug;

use crate::game::{GameModel, Side};
use crate::league::TeamId;
use crate::random;
use crate::schedule::Schedule;
use crate::strength::TeamRating;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictOptions {
    /// Simulations per game.
    pub iterations: u64,
    /// Win probability a side must exceed to be named the favourite.
    pub favourite_threshold: f64,
}
impl PredictOptions {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        const MIN_ITERATIONS: u64 = 100;
        if self.iterations < MIN_ITERATIONS {
            bail!("number of prediction iterations cannot be fewer than {MIN_ITERATIONS}");
        }
        if !(0.5..1.0).contains(&self.favourite_threshold) {
            bail!("favourite threshold must be in the range 0.5..1");
        }
        Ok(())
    }
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            iterations: 25_000,
            favourite_threshold: 0.62,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Favourite {
    #[strum(to_string = "HOME")]
    Home,
    #[strum(to_string = "AWAY")]
    Away,
    #[strum(to_string = "TOSS-UP")]
    TossUp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GamePrediction {
    pub home: TeamId,
    pub away: TeamId,
    pub home_win_prob: f64,
    pub away_win_prob: f64,
    pub home_avg_goals: f64,
    pub away_avg_goals: f64,
    /// Average combined goals, rounded to 2 decimal places.
    pub expected_total: f64,
    /// Home win probability derived from the goal distributions rather than by simulation.
    pub analytic_home_win_prob: f64,
    pub favourite: Favourite,
}

pub fn predict_game(
    model: &GameModel,
    ratings: &[TeamRating],
    home: TeamId,
    away: TeamId,
    options: &PredictOptions,
    rand: &mut impl Rand,
) -> GamePrediction {
    let home_rating = &ratings[home.as_index()];
    let away_rating = &ratings[away.as_index()];
    let (mut home_wins, mut home_goals, mut away_goals) = (0u64, 0u64, 0u64);
    for _ in 0..options.iterations {
        let result = model.simulate(home_rating, away_rating, rand);
        if result.winner == Side::Home {
            home_wins += 1;
        }
        home_goals += result.home_goals as u64;
        away_goals += result.away_goals as u64;
    }

    let iterations = options.iterations as f64;
    let home_win_prob = home_wins as f64 / iterations;
    let away_win_prob = 1.0 - home_win_prob;
    let favourite = if home_win_prob > options.favourite_threshold {
        Favourite::Home
    } else if away_win_prob > options.favourite_threshold {
        Favourite::Away
    } else {
        Favourite::TossUp
    };
    GamePrediction {
        home,
        away,
        home_win_prob,
        away_win_prob,
        home_avg_goals: home_goals as f64 / iterations,
        away_avg_goals: away_goals as f64 / iterations,
        expected_total: ((home_goals + away_goals) as f64 / iterations * 100.0).round() / 100.0,
        analytic_home_win_prob: model.home_win_probability(home_rating, away_rating),
        favourite,
    }
}

/// Predicts every game scheduled on `date`, played or not, in schedule order. Each game draws
/// from its own stream, so a prediction does not depend on the games listed before it.
pub fn predict_date(
    model: &GameModel,
    ratings: &[TeamRating],
    schedule: &Schedule,
    date: NaiveDate,
    options: &PredictOptions,
    seed: u64,
) -> Vec<GamePrediction> {
    let predictions: Vec<_> = schedule
        .on(date)
        .enumerate()
        .map(|(index, game)| {
            let mut rand = random::trial_rand(seed, index as u64);
            predict_game(model, ratings, game.home, game.away, options, &mut rand)
        })
        .collect();
    debug!("predicted {} games on {date}", predictions.len());
    predictions
}
