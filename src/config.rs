//! Model and simulation settings. Every section carries working defaults, so a JSON file need
//! only name the values it overrides.

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::bracket::Topology;
use crate::game::GameModel;
use crate::playoff::PlayoffFormat;
use crate::poisson;
use crate::predict::PredictOptions;
use crate::strength::RatingOptions;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameModel,
    pub ratings: RatingOptions,
    pub season: SeasonOptions,
    pub playoffs: PlayoffFormat,
    pub predict: PredictOptions,
}
impl Config {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.game.validate()?;
        self.ratings.validate()?;
        self.season.validate()?;
        self.playoffs.validate()?;
        self.predict.validate()?;
        let max_rate = self.game.max_expected_goals(&self.ratings.range());
        if max_rate > poisson::MAX_RATE {
            bail!(
                "a scoring rate of up to {max_rate:.2} is possible; rates above {} are not supported",
                poisson::MAX_RATE
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonOptions {
    pub trials: u64,
    pub seed: u64,
    pub topology: Topology,
    /// Trials between progress reports; zero disables reporting.
    pub progress_every: u64,
    /// Size of a dedicated worker pool; the global pool is used if unset.
    pub threads: Option<usize>,
}
impl SeasonOptions {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.trials == 0 {
            bail!("at least one trial is required");
        }
        if self.threads == Some(0) {
            bail!("worker pool cannot be empty");
        }
        Ok(())
    }
}

impl Default for SeasonOptions {
    fn default() -> Self {
        Self {
            trials: 10_000,
            seed: 42,
            topology: Topology::default(),
            progress_every: 2_000,
            threads: None,
        }
    }
}
