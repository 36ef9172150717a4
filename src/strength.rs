//! Team strength ratings. A [StrengthProvider] maps a team name to an offensive and defensive
//! rating (expected goals for and against per 60 minutes). Providers never fail: unknown teams
//! receive the fallback rating and every value is clamped to a plausible range before it
//! reaches the simulation.

use std::io::BufRead;
use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::bail;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::file::ReadJsonFile;
use crate::csv::{CsvReader, Header, MissingColumn};
use crate::league::League;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamRating {
    pub offense: f64,
    pub defense: f64,
}
impl TeamRating {
    pub fn new(offense: f64, defense: f64) -> Self {
        Self { offense, defense }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingOptions {
    pub fallback: TeamRating,
    pub min_rating: f64,
    pub max_rating: f64,
    /// Players with less 5v5 time on ice (in minutes) are excluded from aggregation.
    pub min_toi_minutes: f64,
}
impl RatingOptions {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.min_rating > 0.0 && self.min_rating <= self.max_rating) {
            bail!(
                "rating clamp range {}..={} must be positive and non-empty",
                self.min_rating,
                self.max_rating
            );
        }
        if !self.range().contains(&self.fallback.offense)
            || !self.range().contains(&self.fallback.defense)
        {
            bail!("fallback rating must lie within the clamp range");
        }
        if self.min_toi_minutes < 0.0 {
            bail!("minimum TOI cannot be negative");
        }
        Ok(())
    }

    pub fn range(&self) -> RangeInclusive<f64> {
        self.min_rating..=self.max_rating
    }

    /// Clamps a rating into range, substituting the fallback for non-finite components.
    pub fn sanitise(&self, rating: TeamRating) -> TeamRating {
        let clamp = |value: f64, fallback: f64| {
            if value.is_finite() {
                value.clamp(self.min_rating, self.max_rating)
            } else {
                fallback
            }
        };
        TeamRating {
            offense: clamp(rating.offense, self.fallback.offense),
            defense: clamp(rating.defense, self.fallback.defense),
        }
    }
}

impl Default for RatingOptions {
    fn default() -> Self {
        Self {
            fallback: TeamRating::new(2.80, 2.80),
            min_rating: 1.8,
            max_rating: 4.8,
            min_toi_minutes: 20.0,
        }
    }
}

pub trait StrengthProvider {
    fn rating(&self, team: &str) -> TeamRating;
}

impl<F: Fn(&str) -> TeamRating> StrengthProvider for F {
    fn rating(&self, team: &str) -> TeamRating {
        self(team)
    }
}

/// Resolves the rating of every team in the league, indexed by [TeamId](crate::league::TeamId).
pub fn resolve(
    league: &League,
    provider: &impl StrengthProvider,
    options: &RatingOptions,
) -> Vec<TeamRating> {
    league
        .teams()
        .iter()
        .map(|team| {
            let rating = options.sanitise(provider.rating(&team.name));
            debug!(
                "{}: offense {:.3}, defense {:.3}",
                team.name, rating.offense, rating.defense
            );
            rating
        })
        .collect()
}

/// Per-player 5v5 totals, as exported by the player statistics store.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerLine {
    pub team: String,
    pub toi: f64,
    pub xgf: f64,
    pub xga: f64,
}

#[derive(Debug, Error)]
pub enum RatingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    MissingColumn(#[from] MissingColumn),

    #[error("line {line}: invalid {column} '{value}'")]
    InvalidValue {
        line: usize,
        column: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct RatingTable {
    ratings: FxHashMap<String, TeamRating>,
    options: RatingOptions,
}
impl RatingTable {
    pub fn new(ratings: FxHashMap<String, TeamRating>, options: RatingOptions) -> Self {
        Self { ratings, options }
    }

    /// Reads a JSON object mapping team names to ratings.
    pub fn read_json(path: impl AsRef<Path>, options: RatingOptions) -> Result<Self, RatingError> {
        let ratings = FxHashMap::<String, TeamRating>::read_json_file(path)?;
        Ok(Self::new(ratings, options))
    }

    /// Reads a player statistics CSV with (at least) the columns `team,toi,xgf,xga` and aggregates
    /// it into team ratings.
    pub fn read_players_csv(
        path: impl AsRef<Path>,
        options: RatingOptions,
    ) -> Result<Self, RatingError> {
        let players = read_players(CsvReader::open(path)?)?;
        Ok(Self::from_players(&players, options))
    }

    /// Aggregates player lines into per-team rates: `Σ xGF / (Σ TOI / 60)` and likewise for xGA,
    /// over the players whose TOI exceeds the minimum. Teams without qualifying TOI are omitted
    /// and so fall back to the default rating.
    pub fn from_players(players: &[PlayerLine], options: RatingOptions) -> Self {
        #[derive(Default)]
        struct Totals {
            toi: f64,
            xgf: f64,
            xga: f64,
        }

        let mut totals: FxHashMap<&str, Totals> = FxHashMap::default();
        for player in players
            .iter()
            .filter(|player| player.toi > options.min_toi_minutes)
        {
            let team = totals.entry(&player.team).or_default();
            team.toi += player.toi;
            team.xgf += player.xgf;
            team.xga += player.xga;
        }

        let ratings = totals
            .into_iter()
            .filter(|(_, totals)| totals.toi > 0.0)
            .map(|(team, totals)| {
                let hours = totals.toi / 60.0;
                let rating = TeamRating {
                    offense: round_3dp(totals.xgf / hours),
                    defense: round_3dp(totals.xga / hours),
                };
                (team.to_string(), rating)
            })
            .collect();
        Self::new(ratings, options)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

impl StrengthProvider for RatingTable {
    fn rating(&self, team: &str) -> TeamRating {
        match self.ratings.get(team) {
            None => self.options.fallback,
            Some(&rating) => self.options.sanitise(rating),
        }
    }
}

fn round_3dp(value: f64) -> f64 {
    (value * 1_000.0).round() / 1_000.0
}

pub fn read_players<R: BufRead>(mut reader: CsvReader<R>) -> Result<Vec<PlayerLine>, RatingError> {
    let header = match reader.read() {
        None => return Ok(vec![]),
        Some(record) => Header::from(record?),
    };
    let team_col = header.require("team")?;
    let toi_col = header.require("toi")?;
    let xgf_col = header.require("xgf")?;
    let xga_col = header.require("xga")?;

    let mut players = vec![];
    for (index, record) in reader.enumerate() {
        let record = record?;
        let line = index + 2;
        let field = |col: usize| record.get(col).map(|value| value.trim()).unwrap_or_default();
        let number = |col: usize, column: &'static str| -> Result<f64, RatingError> {
            let value = field(col);
            if value.is_empty() {
                return Ok(0.0);
            }
            value.parse::<f64>().map_err(|_| RatingError::InvalidValue {
                line,
                column,
                value: value.into(),
            })
        };
        players.push(PlayerLine {
            team: field(team_col).to_string(),
            toi: number(toi_col, "toi")?,
            xgf: number(xgf_col, "xgf")?,
            xga: number(xga_col, "xga")?,
        });
    }
    Ok(players)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;
    use std::io::Cursor;

    fn player(team: &str, toi: f64, xgf: f64, xga: f64) -> PlayerLine {
        PlayerLine {
            team: team.into(),
            toi,
            xgf,
            xga,
        }
    }

    #[test]
    fn aggregate_with_toi_filter() {
        let players = [
            player("Dallas Stars", 600.0, 30.0, 24.0),
            player("Dallas Stars", 600.0, 32.0, 26.0),
            // below the TOI threshold; would otherwise dominate
            player("Dallas Stars", 10.0, 50.0, 0.0),
        ];
        let table = RatingTable::from_players(&players, RatingOptions::default());
        let rating = table.rating("Dallas Stars");
        assert_float_relative_eq!(3.1, rating.offense);
        assert_float_relative_eq!(2.5, rating.defense);
    }

    #[test]
    fn clamp_and_fallback() {
        let players = [player("Hot Shots", 60.0, 9.0, 0.5)];
        let table = RatingTable::from_players(&players, RatingOptions::default());
        assert_eq!(TeamRating::new(4.8, 1.8), table.rating("Hot Shots"));
        assert_eq!(TeamRating::new(2.80, 2.80), table.rating("Unknown"));
    }

    #[test]
    fn team_without_qualifying_toi_falls_back() {
        let players = [player("Bench Warmers", 5.0, 1.0, 1.0)];
        let table = RatingTable::from_players(&players, RatingOptions::default());
        assert!(table.is_empty());
        assert_eq!(TeamRating::new(2.80, 2.80), table.rating("Bench Warmers"));
    }

    #[test]
    fn sanitise_non_finite() {
        let options = RatingOptions::default();
        assert_eq!(
            TeamRating::new(2.80, 1.8),
            options.sanitise(TeamRating::new(f64::NAN, 0.3))
        );
    }

    #[test]
    fn closure_provider_is_sanitised_on_resolve() {
        let league = League::nhl();
        let provider = |team: &str| {
            if team == "Boston Bruins" {
                TeamRating::new(10.0, 3.0)
            } else {
                TeamRating::new(3.0, 3.0)
            }
        };
        let ratings = resolve(&league, &provider, &RatingOptions::default());
        assert_eq!(32, ratings.len());
        assert_eq!(TeamRating::new(4.8, 3.0), ratings[0]);
        assert_eq!(TeamRating::new(3.0, 3.0), ratings[31]);
    }

    #[test]
    fn parse_players_csv() {
        let data = "player,team,toi,xgf,xga\nA,Utah Hockey Club,120.5,6.1,5.0\nB,Utah Hockey Club,,0,0\n";
        let players = read_players(CsvReader::new(Cursor::new(data))).unwrap();
        assert_eq!(
            vec![
                player("Utah Hockey Club", 120.5, 6.1, 5.0),
                player("Utah Hockey Club", 0.0, 0.0, 0.0)
            ],
            players
        );
    }

    #[test]
    fn parse_players_csv_errors() {
        let data = "player,team,toi,xgf\nA,Utah Hockey Club,1,2\n";
        let err = read_players(CsvReader::new(Cursor::new(data))).unwrap_err();
        assert_eq!("missing column xga", err.to_string());

        let data = "team,toi,xgf,xga\nUtah Hockey Club,lots,2,2\n";
        let err = read_players(CsvReader::new(Cursor::new(data))).unwrap_err();
        assert_eq!("line 2: invalid toi 'lots'", err.to_string());
    }

    #[test]
    fn options_validation() {
        assert!(RatingOptions::default().validate().is_ok());
        let options = RatingOptions {
            fallback: TeamRating::new(5.0, 2.8),
            ..RatingOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
