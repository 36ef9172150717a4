//! League standings. [Standings] is the immutable pre-simulation baseline folded from played
//! games; [TrialStandings] layers a small per-trial delta over it, cleared between trials. Both
//! finalise into a [Ranking] ordered by points, ROW, OTW, goal differential and goals for.
//! Residual ties fall back to league declaration order; that convention is arbitrary and carries
//! no league rule behind it.

use std::cmp::Ordering;

use crate::game::{GameResult, Side};
use crate::league::{League, TeamId};
use crate::schedule::Schedule;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record {
    pub points: u32,
    /// Regulation and overtime wins.
    pub row: u32,
    /// Overtime and shootout wins.
    pub otw: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub games_played: u32,
}
impl Record {
    pub fn goal_diff(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }

    /// Credits one side of a decided game.
    #[inline]
    pub fn credit(&mut self, result: &GameResult, side: Side) {
        self.points += result.points(side) as u32;
        self.goals_for += result.goals(side) as u32;
        self.goals_against += result.goals(side.opposite()) as u32;
        self.games_played += 1;
        if result.winner == side {
            if result.decision.earns_row() {
                self.row += 1;
            }
            if result.decision.earns_otw() {
                self.otw += 1;
            }
        }
    }

    #[inline]
    fn combine(&self, other: &Record) -> Record {
        Record {
            points: self.points + other.points,
            row: self.row + other.row,
            otw: self.otw + other.otw,
            goals_for: self.goals_for + other.goals_for,
            goals_against: self.goals_against + other.goals_against,
            games_played: self.games_played + other.games_played,
        }
    }

    /// Compares two records under the tie-break sequence; `Greater` means `self` ranks higher.
    pub fn compare(&self, other: &Record) -> Ordering {
        self.points
            .cmp(&other.points)
            .then(self.row.cmp(&other.row))
            .then(self.otw.cmp(&other.otw))
            .then(self.goal_diff().cmp(&other.goal_diff()))
            .then(self.goals_for.cmp(&other.goals_for))
    }
}

#[inline]
fn apply(records: &mut [Record], home: TeamId, away: TeamId, result: &GameResult) {
    records[home.as_index()].credit(result, Side::Home);
    records[away.as_index()].credit(result, Side::Away);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Standings {
    records: Vec<Record>,
}
impl Standings {
    pub fn empty(teams: usize) -> Self {
        Self {
            records: vec![Record::default(); teams],
        }
    }

    /// Folds every played game of a schedule, validated against `league`, into a fresh table
    /// sized to the league.
    pub fn build(league: &League, schedule: &Schedule) -> Self {
        let mut standings = Self::empty(league.len());
        for game in schedule.played() {
            if let Some(result) = game.result() {
                standings.apply(game.home, game.away, &result);
            }
        }
        standings
    }

    pub fn apply(&mut self, home: TeamId, away: TeamId, result: &GameResult) {
        apply(&mut self.records, home, away, result);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, team: TeamId) -> &Record {
        &self.records[team.as_index()]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finalize(&self) -> Ranking {
        let mut ranking = Ranking::with_capacity(self.records.len());
        ranking.rebuild(self.records.iter().copied());
        ranking
    }

    /// Opens a trial over this baseline.
    pub fn trial(&self) -> TrialStandings<'_> {
        TrialStandings {
            baseline: &self.records,
            delta: vec![Record::default(); self.records.len()],
        }
    }
}

#[derive(Debug)]
pub struct TrialStandings<'a> {
    baseline: &'a [Record],
    delta: Vec<Record>,
}
impl<'a> TrialStandings<'a> {
    /// Discards the delta, restoring the baseline.
    pub fn reset(&mut self) {
        self.delta.fill(Record::default());
    }

    #[inline]
    pub fn apply(&mut self, home: TeamId, away: TeamId, result: &GameResult) {
        apply(&mut self.delta, home, away, result);
    }

    pub fn record(&self, team: TeamId) -> Record {
        let index = team.as_index();
        self.baseline[index].combine(&self.delta[index])
    }

    pub fn finalize(&self) -> Ranking {
        let mut ranking = Ranking::with_capacity(self.baseline.len());
        self.finalize_into(&mut ranking);
        ranking
    }

    /// Ranks into an existing [Ranking], reusing its buffers.
    pub fn finalize_into(&self, ranking: &mut Ranking) {
        ranking.rebuild(
            self.baseline
                .iter()
                .zip(self.delta.iter())
                .map(|(baseline, delta)| baseline.combine(delta)),
        );
    }
}

/// Teams in standings order. Position 0 is the league leader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    order: Vec<TeamId>,
    ranks: Vec<usize>,
    records: Vec<Record>,
}
impl Ranking {
    pub fn with_capacity(teams: usize) -> Self {
        Self {
            order: Vec::with_capacity(teams),
            ranks: Vec::with_capacity(teams),
            records: Vec::with_capacity(teams),
        }
    }

    fn rebuild(&mut self, records: impl Iterator<Item = Record>) {
        self.records.clear();
        self.records.extend(records);
        let teams = self.records.len();

        self.order.clear();
        self.order.extend((0..teams).map(TeamId::index));
        let records = &self.records;
        self.order.sort_unstable_by(|a, b| {
            records[b.as_index()]
                .compare(&records[a.as_index()])
                .then(a.cmp(b))
        });

        self.ranks.clear();
        self.ranks.resize(teams, 0);
        for (rank, team) in self.order.iter().enumerate() {
            self.ranks[team.as_index()] = rank;
        }
    }

    pub fn order(&self) -> &[TeamId] {
        &self.order
    }

    /// Zero-based standings position of a team.
    pub fn rank(&self, team: TeamId) -> usize {
        self.ranks[team.as_index()]
    }

    pub fn record(&self, team: TeamId) -> &Record {
        &self.records[team.as_index()]
    }

    pub fn leader(&self) -> Option<TeamId> {
        self.order.first().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
