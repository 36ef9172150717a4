//! Monte Carlo season engine. Each trial completes the remaining schedule at random on top of the
//! pre-simulation standings, then ranks the league, seeds the playoffs and plays out the bracket.
//! Per-team outcome counts are accumulated across trials.
//!
//! Trials are spread over a [rayon] pool. Every trial draws from its own random stream, derived
//! from the engine's seed and the trial's index, so a given seed yields identical tallies
//! irrespective of the number of threads.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use ordinalizer::Ordinal;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};
use thiserror::Error;
use tracing::{debug, info};

use crate::bracket::{Bracket, BracketOutcome, Stage, Topology};
use crate::config::Config;
use crate::game::GameModel;
use crate::league::{League, TeamId};
use crate::playoff::PlayoffFormat;
use crate::random;
use crate::schedule::{Schedule, ScheduleError};
use crate::standings::{Ranking, Standings, TrialStandings};
use crate::strength::TeamRating;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display)]
pub enum Outcome {
    #[strum(to_string = "Playoffs")]
    Playoffs,
    #[strum(to_string = "R1")]
    FirstRound,
    #[strum(to_string = "R2")]
    SecondRound,
    #[strum(to_string = "Conf final")]
    ConferenceFinal,
    #[strum(to_string = "Cup")]
    Championship,
    #[strum(to_string = "Points leader")]
    PointsLeader,
    #[strum(to_string = "Div leader")]
    DivisionLeader,
}

impl From<Stage> for Outcome {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::FirstRound => Outcome::FirstRound,
            Stage::SecondRound => Outcome::SecondRound,
            Stage::ConferenceFinal => Outcome::ConferenceFinal,
        }
    }
}

/// Per-team outcome counts over a number of completed trials. Each count is incremented at most
/// once per team per trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    counts: Vec<[u64; Outcome::COUNT]>,
    trials: u64,
}
impl Tally {
    pub fn new(teams: usize) -> Self {
        Self {
            counts: vec![[0; Outcome::COUNT]; teams],
            trials: 0,
        }
    }

    /// Number of trials completed.
    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn teams(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, team: TeamId, outcome: Outcome) -> u64 {
        self.counts[team.as_index()][outcome.ordinal()]
    }

    pub fn counts(&self, team: TeamId) -> &[u64; Outcome::COUNT] {
        &self.counts[team.as_index()]
    }

    /// Relative frequency of an outcome; zero if no trials were completed.
    pub fn probability(&self, team: TeamId, outcome: Outcome) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.count(team, outcome) as f64 / self.trials as f64
        }
    }

    /// Sum of an outcome's counts across all teams.
    pub fn total(&self, outcome: Outcome) -> u64 {
        self.counts.iter().map(|counts| counts[outcome.ordinal()]).sum()
    }

    pub fn merge(&mut self, other: &Tally) {
        debug_assert_eq!(self.counts.len(), other.counts.len());
        for (counts, other_counts) in self.counts.iter_mut().zip(other.counts.iter()) {
            for (count, other_count) in counts.iter_mut().zip(other_counts.iter()) {
                *count += other_count;
            }
        }
        self.trials += other.trials;
    }

    #[inline]
    fn increment(&mut self, team: TeamId, outcome: Outcome) {
        self.counts[team.as_index()][outcome.ordinal()] += 1;
    }
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("expected {expected} team ratings, got {actual}")]
    RatingCount { expected: usize, actual: usize },

    #[error("baseline standings cover {actual} teams, but the league has {expected}")]
    BaselineSize { expected: usize, actual: usize },

    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub struct SeasonEngine<'a> {
    league: &'a League,
    model: GameModel,
    format: PlayoffFormat,
    topology: Topology,
    trials: u64,
    seed: u64,
    threads: Option<usize>,
    progress_every: u64,
    stop: Arc<AtomicBool>,
}
impl<'a> SeasonEngine<'a> {
    pub fn new(league: &'a League) -> Self {
        Self {
            league,
            model: GameModel::default(),
            format: PlayoffFormat::default(),
            topology: Topology::default(),
            trials: 10_000,
            seed: 42,
            threads: None,
            progress_every: 0,
            stop: Arc::new(AtomicBool::default()),
        }
    }

    /// Validates the configuration and applies its model, playoff and season settings.
    pub fn from_config(league: &'a League, config: &Config) -> Result<Self, anyhow::Error> {
        config.validate()?;
        Ok(Self::new(league)
            .with_model(config.game.clone())
            .with_format(config.playoffs.clone())
            .with_topology(config.season.topology)
            .with_trials(config.season.trials)
            .with_seed(config.season.seed)
            .with_threads(config.season.threads)
            .with_progress_every(config.season.progress_every))
    }

    pub fn with_model(mut self, model: GameModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_format(mut self, format: PlayoffFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Runs on a dedicated pool of the given size; `None` uses the global pool.
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// Logs progress every so many completed trials; zero disables it.
    pub fn with_progress_every(mut self, progress_every: u64) -> Self {
        self.progress_every = progress_every;
        self
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// A flag that, once raised, stops the engine from starting further trials. Trials already
    /// underway run to completion.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Completes the season `trials` times. `baseline` holds the standings built from the
    /// schedule's played games and `ratings` is indexed by [TeamId].
    pub fn simulate(
        &self,
        schedule: &Schedule,
        baseline: &Standings,
        ratings: &[TeamRating],
    ) -> Result<Tally, SimulationError> {
        let teams = self.league.len();
        schedule.validate(self.league)?;
        if ratings.len() != teams {
            return Err(SimulationError::RatingCount {
                expected: teams,
                actual: ratings.len(),
            });
        }
        if baseline.len() != teams {
            return Err(SimulationError::BaselineSize {
                expected: teams,
                actual: baseline.len(),
            });
        }

        let remaining: Vec<_> = schedule
            .remaining()
            .map(|game| (game.home, game.away))
            .collect();
        debug!(
            "simulating {} remaining games over {} trials",
            remaining.len(),
            self.trials
        );

        let completed = AtomicU64::default();
        let run = || self.run_trials(&remaining, baseline, ratings, &completed);
        let tally = match self.threads {
            None => run(),
            Some(threads) => ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(run),
        };
        info!("completed {} of {} trials", tally.trials(), self.trials);
        Ok(tally)
    }

    fn run_trials(
        &self,
        remaining: &[(TeamId, TeamId)],
        baseline: &Standings,
        ratings: &[TeamRating],
        completed: &AtomicU64,
    ) -> Tally {
        let teams = self.league.len();
        (0..self.trials)
            .into_par_iter()
            .fold(
                || Worker::new(self, remaining, baseline, ratings),
                |mut worker, trial| {
                    if !self.stop.load(Ordering::Relaxed) {
                        worker.run(trial);
                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        if self.progress_every > 0 && done % self.progress_every == 0 {
                            info!("{done} of {} trials", self.trials);
                        }
                    }
                    worker
                },
            )
            .map(|worker| worker.tally)
            .reduce(
                || Tally::new(teams),
                |mut tally, other| {
                    tally.merge(&other);
                    tally
                },
            )
    }
}

/// Scratch state of one rayon job: trial standings, ranking and bracket buffers, and the tally
/// the job accumulates into.
struct Worker<'a> {
    league: &'a League,
    model: &'a GameModel,
    format: &'a PlayoffFormat,
    seed: u64,
    remaining: &'a [(TeamId, TeamId)],
    ratings: &'a [TeamRating],
    bracket: Bracket<'a>,
    standings: TrialStandings<'a>,
    ranking: Ranking,
    outcome: BracketOutcome,
    tally: Tally,
}
impl<'a> Worker<'a> {
    fn new(
        engine: &'a SeasonEngine,
        remaining: &'a [(TeamId, TeamId)],
        baseline: &'a Standings,
        ratings: &'a [TeamRating],
    ) -> Self {
        let league = engine.league;
        Self {
            league,
            model: &engine.model,
            format: &engine.format,
            seed: engine.seed,
            remaining,
            ratings,
            bracket: Bracket::new(
                &engine.model,
                ratings,
                engine.topology,
                league.conferences().len(),
            ),
            standings: baseline.trial(),
            ranking: Ranking::with_capacity(league.len()),
            outcome: BracketOutcome::default(),
            tally: Tally::new(league.len()),
        }
    }

    fn run(&mut self, trial: u64) {
        let mut rand = random::trial_rand(self.seed, trial);

        self.standings.reset();
        for &(home, away) in self.remaining {
            let result = self.model.simulate(
                &self.ratings[home.as_index()],
                &self.ratings[away.as_index()],
                &mut rand,
            );
            self.standings.apply(home, away, &result);
        }
        self.standings.finalize_into(&mut self.ranking);

        if let Some(leader) = self.ranking.leader() {
            self.tally.increment(leader, Outcome::PointsLeader);
        }
        for division in self.league.divisions() {
            let ranking = &self.ranking;
            if let Some(&leader) = division.teams.iter().min_by_key(|team| ranking.rank(**team)) {
                self.tally.increment(leader, Outcome::DivisionLeader);
            }
        }

        let field = self.format.select_field(self.league, &self.ranking);
        for team in field.teams() {
            self.tally.increment(team, Outcome::Playoffs);
        }

        self.bracket
            .run_into(&field, &self.ranking, &mut self.outcome, &mut rand);
        for stage in Stage::iter() {
            for &team in self.outcome.winners(stage) {
                self.tally.increment(team, stage.into());
            }
        }
        if let Some(champion) = self.outcome.champion {
            self.tally.increment(champion, Outcome::Championship);
        }
        self.tally.trials += 1;
    }
}
