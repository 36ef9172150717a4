//! Single-elimination playoff bracket of best-of-7 series. Each conference is reduced to a
//! champion; the two conference champions meet in the final.

use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter, EnumString};
use tinyrand::Rand;

use crate::game::{GameModel, Side};
use crate::league::TeamId;
use crate::playoff::PlayoffField;
use crate::standings::Ranking;
use crate::strength::TeamRating;

/// Games a side must win to take a series.
pub const SERIES_WINS: u8 = 4;

/// Round-1 pairing scheme within a conference. Neither scheme reseeds after round 1: winners
/// meet their bracket neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Topology {
    /// 1v8, 2v7, 3v6, 4v5; only an 8-team conference is played.
    #[default]
    Fixed,

    /// 1v2, 3v4, …; any power-of-two conference of at least 2 teams is played.
    Halving,
}
impl Topology {
    /// Round-1 pairings as indices into a conference's seed list (best seed first), or `None` if
    /// a conference of that size cannot be bracketed.
    pub fn first_round(&self, seeds: usize) -> Option<Vec<(usize, usize)>> {
        match self {
            Topology::Fixed => {
                const SEEDS: usize = 8;
                (seeds == SEEDS).then(|| (0..SEEDS / 2).map(|i| (i, SEEDS - 1 - i)).collect())
            }
            Topology::Halving => (seeds >= 2 && seeds.is_power_of_two())
                .then(|| (0..seeds).step_by(2).map(|i| (i, i + 1)).collect()),
        }
    }
}

/// Conference rounds that are tallied, aligned to the conference final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Ordinal, EnumCount, EnumIter, Display)]
pub enum Stage {
    FirstRound,
    SecondRound,
    ConferenceFinal,
}
impl Stage {
    /// The stage of conference round `round` (zero-based) out of `rounds`, if tallied.
    fn of_round(round: usize, rounds: usize) -> Option<Stage> {
        match rounds - 1 - round {
            0 => Some(Stage::ConferenceFinal),
            1 => Some(Stage::SecondRound),
            2 => Some(Stage::FirstRound),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Series {
    pub winner: TeamId,
    pub loser: TeamId,
    pub winner_wins: u8,
    pub loser_wins: u8,
}
impl Series {
    pub fn games(&self) -> u8 {
        self.winner_wins + self.loser_wins
    }
}

/// Plays a best-of-7 series between `a` and `b`. Home ice alternates every game, starting with `a`
/// if `a_home_first`.
pub fn best_of_7(
    model: &GameModel,
    ratings: &[TeamRating],
    a: TeamId,
    b: TeamId,
    a_home_first: bool,
    rand: &mut impl Rand,
) -> Series {
    let (mut a_wins, mut b_wins) = (0, 0);
    let mut a_home = a_home_first;
    while a_wins < SERIES_WINS && b_wins < SERIES_WINS {
        let (home, away) = if a_home { (a, b) } else { (b, a) };
        let result = model.simulate(
            &ratings[home.as_index()],
            &ratings[away.as_index()],
            rand,
        );
        let a_won = (result.winner == Side::Home) == a_home;
        if a_won {
            a_wins += 1;
        } else {
            b_wins += 1;
        }
        a_home = !a_home;
    }
    if a_wins == SERIES_WINS {
        Series {
            winner: a,
            loser: b,
            winner_wins: a_wins,
            loser_wins: b_wins,
        }
    } else {
        Series {
            winner: b,
            loser: a,
            winner_wins: b_wins,
            loser_wins: a_wins,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BracketOutcome {
    winners: [Vec<TeamId>; 3],
    pub conference_champions: Vec<TeamId>,
    pub champion: Option<TeamId>,
}
impl BracketOutcome {
    /// Series winners of a tallied stage, across all conferences.
    pub fn winners(&self, stage: Stage) -> &[TeamId] {
        &self.winners[stage.ordinal()]
    }

    pub fn clear(&mut self) {
        for winners in &mut self.winners {
            winners.clear();
        }
        self.conference_champions.clear();
        self.champion = None;
    }
}

pub struct Bracket<'a> {
    model: &'a GameModel,
    ratings: &'a [TeamRating],
    topology: Topology,
    conferences: usize,
}
impl<'a> Bracket<'a> {
    pub fn new(
        model: &'a GameModel,
        ratings: &'a [TeamRating],
        topology: Topology,
        conferences: usize,
    ) -> Self {
        Self {
            model,
            ratings,
            topology,
            conferences,
        }
    }

    pub fn run(&self, field: &PlayoffField, ranking: &Ranking, rand: &mut impl Rand) -> BracketOutcome {
        let mut outcome = BracketOutcome::default();
        self.run_into(field, ranking, &mut outcome, rand);
        outcome
    }

    /// Plays out the bracket into `outcome`, overwriting its contents. A conference that cannot be
    /// bracketed under the topology produces no champion, and the final is played only if
    /// exactly two conference champions emerge.
    pub fn run_into(
        &self,
        field: &PlayoffField,
        ranking: &Ranking,
        outcome: &mut BracketOutcome,
        rand: &mut impl Rand,
    ) {
        outcome.clear();
        for conference in 0..self.conferences {
            let seeds = field.conference(conference);
            if let Some(champion) = self.run_conference(&seeds, ranking, outcome, rand) {
                outcome.conference_champions.push(champion);
            }
        }

        if let [first, second] = outcome.conference_champions[..] {
            outcome.champion = Some(self.series(first, second, ranking, rand).winner);
        }
    }

    fn run_conference(
        &self,
        seeds: &[TeamId],
        ranking: &Ranking,
        outcome: &mut BracketOutcome,
        rand: &mut impl Rand,
    ) -> Option<TeamId> {
        let pairings = self.topology.first_round(seeds.len())?;
        let rounds = seeds.len().trailing_zeros() as usize;

        let mut alive: Vec<_> = pairings
            .into_iter()
            .map(|(a, b)| self.series(seeds[a], seeds[b], ranking, rand).winner)
            .collect();
        let mut round = 0;
        loop {
            if let Some(stage) = Stage::of_round(round, rounds) {
                outcome.winners[stage.ordinal()].extend_from_slice(&alive);
            }
            if alive.len() == 1 {
                return Some(alive[0]);
            }
            alive = alive
                .chunks(2)
                .map(|pair| self.series(pair[0], pair[1], ranking, rand).winner)
                .collect();
            round += 1;
        }
    }

    /// The better-ranked side opens at home.
    fn series(&self, a: TeamId, b: TeamId, ranking: &Ranking, rand: &mut impl Rand) -> Series {
        let a_home_first = ranking.rank(a) < ranking.rank(b);
        best_of_7(self.model, self.ratings, a, b, a_home_first, rand)
    }
}
