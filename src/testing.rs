//! Testing helpers.

use chrono::NaiveDate;
use tinyrand::Rand;

use crate::league::{ConferenceSpec, DivisionSpec, League, LeagueSpec, TeamId};
use crate::schedule::{Schedule, ScheduledGame};
use crate::strength::TeamRating;

/// A generator that returns the same value forever. Draws of zero make every game a 0-0 tie
/// settled in the home side's favour.
pub struct Constant(pub u64);

impl Rand for Constant {
    fn next_u64(&mut self) -> u64 {
        self.0
    }
}

/// A league of `conferences` × `divisions` × `teams` teams, named `c{i}d{j}t{k}`.
pub fn synthetic_league(conferences: usize, divisions: usize, teams: usize) -> League {
    let spec = LeagueSpec {
        conferences: (0..conferences)
            .map(|c| ConferenceSpec {
                name: format!("c{c}"),
                divisions: (0..divisions)
                    .map(|d| DivisionSpec {
                        name: format!("c{c}d{d}"),
                        teams: (0..teams).map(|t| format!("c{c}d{d}t{t}")).collect(),
                    })
                    .collect(),
            })
            .collect(),
    };
    League::try_from(spec).unwrap()
}

pub fn even_ratings(teams: usize) -> Vec<TeamRating> {
    vec![TeamRating::new(2.95, 2.95); teams]
}

/// Ratings spread linearly so that lower team indices are stronger.
pub fn graded_ratings(teams: usize) -> Vec<TeamRating> {
    (0..teams)
        .map(|index| {
            let step = index as f64 / teams.max(1) as f64;
            TeamRating::new(3.6 - step * 1.2, 3.6 - step * 1.2)
        })
        .collect()
}

/// A home-and-away double round robin, none of it played.
pub fn round_robin(league: &League) -> Schedule {
    let start = NaiveDate::from_ymd_opt(2025, 10, 7).unwrap();
    let mut games = vec![];
    for home in league.ids() {
        for away in league.ids() {
            if home != away {
                let day = games.len() as u64 / 8;
                games.push(ScheduledGame::unplayed(
                    start + chrono::Days::new(day),
                    home,
                    away,
                ));
            }
        }
    }
    Schedule::new(games, league).unwrap()
}

pub fn team(index: usize) -> TeamId {
    TeamId::index(index)
}
