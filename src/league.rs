//! The league structure: an immutable team → division → conference assignment. Teams are
//! addressed by a dense [TeamId], assigned in declaration order.

use std::fmt::{Display, Formatter};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamId(usize);

impl TeamId {
    pub fn index(index: usize) -> Self {
        Self(index)
    }

    pub fn as_index(&self) -> usize {
        self.0
    }
}

impl Display for TeamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Declarative form of a league, as read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSpec {
    pub conferences: Vec<ConferenceSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceSpec {
    pub name: String,
    pub divisions: Vec<DivisionSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionSpec {
    pub name: String,
    pub teams: Vec<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum LeagueError {
    #[error("a league must have at least one conference")]
    NoConferences,

    #[error("conference {0} has no divisions")]
    EmptyConference(String),

    #[error("division {0} has no teams")]
    EmptyDivision(String),

    #[error("team {0} is assigned more than once")]
    DuplicateTeam(String),
}

#[derive(Debug, Clone)]
pub struct Team {
    pub name: String,
    pub division: usize,
    pub conference: usize,
}

#[derive(Debug, Clone)]
pub struct Division {
    pub name: String,
    pub conference: usize,
    pub teams: Vec<TeamId>,
}

#[derive(Debug, Clone)]
pub struct Conference {
    pub name: String,
    pub divisions: Vec<usize>,
    pub teams: Vec<TeamId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "LeagueSpec")]
pub struct League {
    teams: Vec<Team>,
    divisions: Vec<Division>,
    conferences: Vec<Conference>,
    by_name: FxHashMap<String, TeamId>,
}
impl League {
    /// The 32-team NHL: Atlantic and Metropolitan in the East, Central and Pacific in the West.
    pub fn nhl() -> Self {
        fn division(name: &str, teams: [&str; 8]) -> DivisionSpec {
            DivisionSpec {
                name: name.into(),
                teams: teams.iter().map(ToString::to_string).collect(),
            }
        }

        let spec = LeagueSpec {
            conferences: vec![
                ConferenceSpec {
                    name: "Eastern".into(),
                    divisions: vec![
                        division(
                            "Atlantic",
                            [
                                "Boston Bruins",
                                "Buffalo Sabres",
                                "Detroit Red Wings",
                                "Florida Panthers",
                                "Montreal Canadiens",
                                "Ottawa Senators",
                                "Tampa Bay Lightning",
                                "Toronto Maple Leafs",
                            ],
                        ),
                        division(
                            "Metropolitan",
                            [
                                "Carolina Hurricanes",
                                "Columbus Blue Jackets",
                                "New Jersey Devils",
                                "New York Islanders",
                                "New York Rangers",
                                "Philadelphia Flyers",
                                "Pittsburgh Penguins",
                                "Washington Capitals",
                            ],
                        ),
                    ],
                },
                ConferenceSpec {
                    name: "Western".into(),
                    divisions: vec![
                        division(
                            "Central",
                            [
                                "Chicago Blackhawks",
                                "Colorado Avalanche",
                                "Dallas Stars",
                                "Minnesota Wild",
                                "Nashville Predators",
                                "St. Louis Blues",
                                "Utah Hockey Club",
                                "Winnipeg Jets",
                            ],
                        ),
                        division(
                            "Pacific",
                            [
                                "Anaheim Ducks",
                                "Calgary Flames",
                                "Edmonton Oilers",
                                "Los Angeles Kings",
                                "San Jose Sharks",
                                "Seattle Kraken",
                                "Vancouver Canucks",
                                "Vegas Golden Knights",
                            ],
                        ),
                    ],
                },
            ],
        };
        Self::try_from(spec).expect("the built-in league is well-formed")
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, id: TeamId) -> &Team {
        &self.teams[id.0]
    }

    pub fn name(&self, id: TeamId) -> &str {
        &self.teams[id.0].name
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TeamId> {
        (0..self.teams.len()).map(TeamId)
    }

    pub fn find(&self, name: &str) -> Option<TeamId> {
        self.by_name.get(name).copied()
    }

    pub fn divisions(&self) -> &[Division] {
        &self.divisions
    }

    pub fn conferences(&self) -> &[Conference] {
        &self.conferences
    }

    pub fn conference_of(&self, id: TeamId) -> usize {
        self.teams[id.0].conference
    }

    pub fn division_of(&self, id: TeamId) -> usize {
        self.teams[id.0].division
    }
}

impl TryFrom<LeagueSpec> for League {
    type Error = LeagueError;

    fn try_from(spec: LeagueSpec) -> Result<Self, Self::Error> {
        if spec.conferences.is_empty() {
            return Err(LeagueError::NoConferences);
        }
        let mut teams = vec![];
        let mut divisions = vec![];
        let mut conferences = Vec::with_capacity(spec.conferences.len());
        let mut by_name = FxHashMap::default();
        for (conference_index, conference_spec) in spec.conferences.into_iter().enumerate() {
            if conference_spec.divisions.is_empty() {
                return Err(LeagueError::EmptyConference(conference_spec.name));
            }
            let mut conference = Conference {
                name: conference_spec.name,
                divisions: vec![],
                teams: vec![],
            };
            for division_spec in conference_spec.divisions {
                if division_spec.teams.is_empty() {
                    return Err(LeagueError::EmptyDivision(division_spec.name));
                }
                let division_index = divisions.len();
                let mut division = Division {
                    name: division_spec.name,
                    conference: conference_index,
                    teams: Vec::with_capacity(division_spec.teams.len()),
                };
                for name in division_spec.teams {
                    let id = TeamId(teams.len());
                    if by_name.insert(name.clone(), id).is_some() {
                        return Err(LeagueError::DuplicateTeam(name));
                    }
                    teams.push(Team {
                        name,
                        division: division_index,
                        conference: conference_index,
                    });
                    division.teams.push(id);
                    conference.teams.push(id);
                }
                conference.divisions.push(division_index);
                divisions.push(division);
            }
            conferences.push(conference);
        }
        Ok(Self {
            teams,
            divisions,
            conferences,
            by_name,
        })
    }
}
