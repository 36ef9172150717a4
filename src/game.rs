//! Single-game outcome model. Each side's goals are drawn from a Poisson distribution whose mean
//! is driven by its own offense, the opponent's defense and a league baseline; the home side
//! alone receives a multiplicative home-ice advantage. Games tied after regulation are settled by
//! one weighted coin flip that favours the home side.

use std::ops::RangeInclusive;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tinyrand::Rand;

use crate::factorial::Lookup;
use crate::poisson;
use crate::random;
use crate::strength::TeamRating;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Side {
    Home,
    Away,
}
impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// How a game was decided. The empty, `OT` and `SO` spellings follow the schedule's overtime
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
pub enum Decision {
    #[default]
    #[strum(serialize = "")]
    Regulation,

    #[strum(serialize = "OT")]
    Overtime,

    #[strum(serialize = "SO")]
    Shootout,
}
impl Decision {
    /// Regulation and overtime wins earn ROW credit; shootout wins do not.
    pub fn earns_row(&self) -> bool {
        matches!(self, Decision::Regulation | Decision::Overtime)
    }

    /// Overtime and shootout wins count towards OTW.
    pub fn earns_otw(&self) -> bool {
        matches!(self, Decision::Overtime | Decision::Shootout)
    }

    /// The loser of a game decided beyond regulation still earns a point.
    pub fn loser_points(&self) -> u16 {
        match self {
            Decision::Regulation => 0,
            Decision::Overtime | Decision::Shootout => 1,
        }
    }
}

pub const WIN_POINTS: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub winner: Side,
    pub home_goals: u16,
    pub away_goals: u16,
    pub decision: Decision,
}
impl GameResult {
    pub fn home_points(&self) -> u16 {
        self.points(Side::Home)
    }

    pub fn away_points(&self) -> u16 {
        self.points(Side::Away)
    }

    pub fn points(&self, side: Side) -> u16 {
        if side == self.winner {
            WIN_POINTS
        } else {
            self.decision.loser_points()
        }
    }

    pub fn goals(&self, side: Side) -> u16 {
        match side {
            Side::Home => self.home_goals,
            Side::Away => self.away_goals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameModel {
    /// Multiplier (> 1) applied to the home side's scoring rate.
    pub home_ice_advantage: f64,
    /// League-average expected goals per 60 minutes.
    pub league_avg_xg: f64,
    /// Probability that the home side wins a game tied after regulation.
    pub ot_home_win_prob: f64,
}
impl GameModel {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        const VALID_HOME_ICE_ADVANTAGE: RangeInclusive<f64> = 1.0..=2.0;
        if !VALID_HOME_ICE_ADVANTAGE.contains(&self.home_ice_advantage) {
            bail!("home-ice advantage must be in the range {VALID_HOME_ICE_ADVANTAGE:?}");
        }
        const VALID_LEAGUE_AVG_XG: RangeInclusive<f64> = 1.0..=6.0;
        if !VALID_LEAGUE_AVG_XG.contains(&self.league_avg_xg) {
            bail!("league-average xG must be in the range {VALID_LEAGUE_AVG_XG:?}");
        }
        if !(0.0..=1.0).contains(&self.ot_home_win_prob) {
            bail!("overtime home win probability must be in the range 0..=1");
        }
        Ok(())
    }

    /// Scoring rates `(home, away)` for a matchup.
    #[inline]
    pub fn expected_goals(&self, home: &TeamRating, away: &TeamRating) -> (f64, f64) {
        let home_xg = home.offense * self.home_ice_advantage * (self.league_avg_xg / away.defense);
        let away_xg = away.offense * (self.league_avg_xg / home.defense);
        (home_xg, away_xg)
    }

    /// The highest scoring rate any matchup can produce when ratings are clamped to `ratings`.
    pub fn max_expected_goals(&self, ratings: &RangeInclusive<f64>) -> f64 {
        ratings.end() * self.home_ice_advantage * (self.league_avg_xg / ratings.start())
    }

    #[inline]
    pub fn simulate(&self, home: &TeamRating, away: &TeamRating, rand: &mut impl Rand) -> GameResult {
        let (home_xg, away_xg) = self.expected_goals(home, away);
        let home_goals = poisson::sample(home_xg, rand);
        let away_goals = poisson::sample(away_xg, rand);

        if home_goals > away_goals {
            GameResult {
                winner: Side::Home,
                home_goals,
                away_goals,
                decision: Decision::Regulation,
            }
        } else if away_goals > home_goals {
            GameResult {
                winner: Side::Away,
                home_goals,
                away_goals,
                decision: Decision::Regulation,
            }
        } else if random::coin(self.ot_home_win_prob, rand) {
            GameResult {
                winner: Side::Home,
                home_goals: home_goals + 1,
                away_goals,
                decision: Decision::Shootout,
            }
        } else {
            GameResult {
                winner: Side::Away,
                home_goals,
                away_goals: away_goals + 1,
                decision: Decision::Shootout,
            }
        }
    }

    /// Analytic probability that the home side wins: `P(H > A) + p_ot · P(H = A)`.
    pub fn home_win_probability(&self, home: &TeamRating, away: &TeamRating) -> f64 {
        let (home_xg, away_xg) = self.expected_goals(home, away);
        let factorial = Lookup::default();
        let home_pmf = poisson::pmf(home_xg, poisson::MAX_GOALS, &factorial);
        let away_pmf = poisson::pmf(away_xg, poisson::MAX_GOALS, &factorial);

        let mut regulation = 0.0;
        let mut tied = 0.0;
        for (home_goals, home_prob) in home_pmf.iter().enumerate() {
            for (away_goals, away_prob) in away_pmf.iter().enumerate() {
                let joint = home_prob * away_prob;
                if home_goals > away_goals {
                    regulation += joint;
                } else if home_goals == away_goals {
                    tied += joint;
                }
            }
        }
        regulation + self.ot_home_win_prob * tied
    }
}

impl Default for GameModel {
    fn default() -> Self {
        Self {
            home_ice_advantage: 1.10,
            league_avg_xg: 2.95,
            ot_home_win_prob: 0.55,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;
    use std::str::FromStr;
    use tinyrand::{Seeded, Wyrand};

    const EVEN: TeamRating = TeamRating {
        offense: 2.95,
        defense: 2.95,
    };

    #[test]
    fn expected_goals() {
        let model = GameModel::default();
        let (home_xg, away_xg) = model.expected_goals(&EVEN, &EVEN);
        assert_float_relative_eq!(3.245, home_xg);
        assert_float_relative_eq!(2.95, away_xg);

        let strong = TeamRating::new(3.5, 2.5);
        let weak = TeamRating::new(2.5, 3.5);
        let (home_xg, away_xg) = model.expected_goals(&strong, &weak);
        assert_float_relative_eq!(3.5 * 1.1 * 2.95 / 3.5, home_xg);
        assert_float_relative_eq!(2.5 * 2.95 / 2.5, away_xg);
    }

    #[test]
    fn points_and_goals_are_consistent() {
        let model = GameModel::default();
        let mut rand = Wyrand::seed(11);
        let mut shootouts = 0;
        for _ in 0..10_000 {
            let result = model.simulate(&EVEN, &EVEN, &mut rand);
            let points = (result.home_points(), result.away_points());
            match result.decision {
                Decision::Regulation => {
                    assert_eq!(2, points.0 + points.1, "{result:?}");
                    assert!(result.decision.earns_row());
                }
                Decision::Shootout => {
                    shootouts += 1;
                    assert_eq!(3, points.0 + points.1, "{result:?}");
                    assert!(!result.decision.earns_row());
                    assert_eq!(1, result.home_goals.abs_diff(result.away_goals));
                }
                Decision::Overtime => unreachable!(),
            }
            assert_ne!((2, 2), points);
            assert_eq!(WIN_POINTS, result.points(result.winner));
            assert!(result.goals(result.winner) > result.goals(result.winner.opposite()));
        }
        assert!(shootouts > 0);
    }

    #[test]
    fn equal_ratings_favour_home() {
        const GAMES: usize = 50_000;
        let model = GameModel::default();
        let expected = model.home_win_probability(&EVEN, &EVEN);
        assert!(expected > 0.53, "{expected}");

        let mut rand = Wyrand::seed(2024);
        let home_wins = (0..GAMES)
            .filter(|_| model.simulate(&EVEN, &EVEN, &mut rand).winner == Side::Home)
            .count();
        let fraction = home_wins as f64 / GAMES as f64;
        assert_float_absolute_eq!(expected, fraction, 0.02);
        assert!(fraction > 0.52, "{fraction}");
    }

    #[test]
    fn neutral_model_is_a_coin_toss() {
        let model = GameModel {
            home_ice_advantage: 1.0,
            ot_home_win_prob: 0.5,
            ..GameModel::default()
        };
        assert_float_absolute_eq!(0.5, model.home_win_probability(&EVEN, &EVEN), 1e-9);
    }

    #[test]
    fn decision_flags() {
        assert_eq!(Decision::Regulation, Decision::from_str("").unwrap());
        assert_eq!(Decision::Overtime, Decision::from_str("OT").unwrap());
        assert_eq!(Decision::Shootout, Decision::from_str("SO").unwrap());
        assert!(Decision::from_str("2OT").is_err());
        assert!(Decision::Overtime.earns_row() && Decision::Overtime.earns_otw());
        assert!(!Decision::Shootout.earns_row() && Decision::Shootout.earns_otw());
        assert!(Decision::Regulation.earns_row() && !Decision::Regulation.earns_otw());
    }

    #[test]
    fn validation() {
        assert!(GameModel::default().validate().is_ok());
        let model = GameModel {
            ot_home_win_prob: 1.5,
            ..GameModel::default()
        };
        assert!(model.validate().is_err());

        for league_avg_xg in [0.0, 0.5, 6.5, 20.0, f64::NAN, f64::INFINITY] {
            let model = GameModel {
                league_avg_xg,
                ..GameModel::default()
            };
            assert!(model.validate().is_err(), "{league_avg_xg}");
        }
    }

    #[test]
    fn max_expected_goals_bounds_every_matchup() {
        let model = GameModel::default();
        let range = 1.8..=4.8;
        let (strongest, weakest) = (TeamRating::new(4.8, 4.8), TeamRating::new(1.8, 1.8));
        let (home_xg, _) = model.expected_goals(&strongest, &weakest);
        assert_float_relative_eq!(home_xg, model.max_expected_goals(&range));
        let (_, away_xg) = model.expected_goals(&weakest, &strongest);
        assert!(away_xg < model.max_expected_goals(&range));
    }
}
