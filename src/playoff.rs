//! Playoff qualification. The top teams of each division take guaranteed berths; the best of the
//! rest in each conference take the wildcards.

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::league::{League, TeamId};
use crate::standings::Ranking;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayoffFormat {
    /// Guaranteed berths per division.
    pub division_berths: usize,
    /// Wildcard berths per conference.
    pub wildcards: usize,
    pub max_field: usize,
}
impl PlayoffFormat {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        const MAX_FIELD: usize = 16;
        if self.max_field == 0 || self.max_field > MAX_FIELD {
            bail!("playoff field must hold between 1 and {MAX_FIELD} teams");
        }
        if self.division_berths == 0 && self.wildcards == 0 {
            bail!("at least one berth must be awarded");
        }
        Ok(())
    }

    /// Derives the qualified field from a final ranking.
    pub fn select_field(&self, league: &League, ranking: &Ranking) -> PlayoffField {
        let mut taken = vec![false; league.len()];
        let mut division_counts = vec![0; league.divisions().len()];
        let mut wildcard_counts = vec![0; league.conferences().len()];
        let mut teams = Vec::with_capacity(self.max_field);

        for &team in ranking.order() {
            let division = league.division_of(team);
            if division_counts[division] < self.division_berths {
                division_counts[division] += 1;
                taken[team.as_index()] = true;
                teams.push(team);
            }
        }
        for &team in ranking.order() {
            let conference = league.conference_of(team);
            if !taken[team.as_index()] && wildcard_counts[conference] < self.wildcards {
                wildcard_counts[conference] += 1;
                taken[team.as_index()] = true;
                teams.push(team);
            }
        }

        // guaranteed berths are listed ahead of wildcards, so the cap trims wildcards first
        teams.truncate(self.max_field);
        teams.sort_by_key(|&team| ranking.rank(team));
        PlayoffField {
            seeds: teams
                .into_iter()
                .map(|team| Seed {
                    team,
                    conference: league.conference_of(team),
                })
                .collect(),
        }
    }
}

impl Default for PlayoffFormat {
    fn default() -> Self {
        Self {
            division_berths: 3,
            wildcards: 2,
            max_field: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    pub team: TeamId,
    pub conference: usize,
}

/// Qualified teams in standings order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayoffField {
    seeds: Vec<Seed>,
}
impl PlayoffField {
    pub fn seeds(&self) -> &[Seed] {
        &self.seeds
    }

    pub fn teams(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.seeds.iter().map(|seed| seed.team)
    }

    /// Teams of one conference, best seed first.
    pub fn conference(&self, conference: usize) -> Vec<TeamId> {
        self.seeds
            .iter()
            .filter(|seed| seed.conference == conference)
            .map(|seed| seed.team)
            .collect()
    }

    pub fn contains(&self, team: TeamId) -> bool {
        self.seeds.iter().any(|seed| seed.team == team)
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}
