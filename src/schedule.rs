//! The season schedule: played games with their final scores and the games still to be played.

use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::csv::{CsvReader, Header, MissingColumn};
use crate::game::{Decision, GameResult, Side};
use crate::league::{League, TeamId};

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledGame {
    pub date: NaiveDate,
    pub home: TeamId,
    pub away: TeamId,
    pub played: bool,
    pub home_goals: u16,
    pub away_goals: u16,
    pub overtime: Decision,
}
impl ScheduledGame {
    pub fn unplayed(date: NaiveDate, home: TeamId, away: TeamId) -> Self {
        Self {
            date,
            home,
            away,
            played: false,
            home_goals: 0,
            away_goals: 0,
            overtime: Decision::Regulation,
        }
    }

    pub fn played(
        date: NaiveDate,
        home: TeamId,
        away: TeamId,
        home_goals: u16,
        away_goals: u16,
        overtime: Decision,
    ) -> Self {
        Self {
            date,
            home,
            away,
            played: true,
            home_goals,
            away_goals,
            overtime,
        }
    }

    /// The final result of a played game; `None` if the game is yet to be played.
    pub fn result(&self) -> Option<GameResult> {
        if !self.played {
            return None;
        }
        let winner = if self.home_goals > self.away_goals {
            Side::Home
        } else {
            Side::Away
        };
        Some(GameResult {
            winner,
            home_goals: self.home_goals,
            away_goals: self.away_goals,
            decision: self.overtime,
        })
    }

    pub fn validate(&self, league: &League) -> Result<(), InvalidGame> {
        for team in [self.home, self.away] {
            if team.as_index() >= league.len() {
                return Err(InvalidGame::UnknownTeamId(team));
            }
        }
        if self.home == self.away {
            return Err(InvalidGame::SameTeam(league.name(self.home).into()));
        }
        if self.played {
            if self.home_goals == self.away_goals {
                return Err(InvalidGame::Tied {
                    home_goals: self.home_goals,
                    away_goals: self.away_goals,
                });
            }
            if self.overtime != Decision::Regulation
                && self.home_goals.abs_diff(self.away_goals) != 1
            {
                return Err(InvalidGame::ExtraTimeMargin {
                    decision: self.overtime,
                    home_goals: self.home_goals,
                    away_goals: self.away_goals,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidGame {
    #[error("team id {0} is not in the league")]
    UnknownTeamId(TeamId),

    #[error("{0} cannot play itself")]
    SameTeam(String),

    #[error("a played game cannot end tied ({home_goals}-{away_goals})")]
    Tied { home_goals: u16, away_goals: u16 },

    #[error("a game decided in {decision:?} must be won by one goal ({home_goals}-{away_goals})")]
    ExtraTimeMargin {
        decision: Decision,
        home_goals: u16,
        away_goals: u16,
    },
}

#[derive(Debug, Error)]
pub enum ScheduleError {
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

    #[error("line {line}: unknown team '{team}'")]
    UnknownTeam { line: usize, team: String },

    #[error("game {index} on {date}: {source}")]
    InvalidGame {
        index: usize,
        date: NaiveDate,
        source: InvalidGame,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Schedule {
    games: Vec<ScheduledGame>,
}
impl Schedule {
    /// Validates every game against the league before accepting the schedule.
    pub fn new(games: Vec<ScheduledGame>, league: &League) -> Result<Self, ScheduleError> {
        let schedule = Self { games };
        schedule.validate(league)?;
        Ok(schedule)
    }

    pub fn validate(&self, league: &League) -> Result<(), ScheduleError> {
        for (index, game) in self.games.iter().enumerate() {
            game.validate(league)
                .map_err(|source| ScheduleError::InvalidGame {
                    index,
                    date: game.date,
                    source,
                })?;
        }
        Ok(())
    }

    pub fn read_csv(path: impl AsRef<Path>, league: &League) -> Result<Self, ScheduleError> {
        Self::parse(CsvReader::open(path)?, league)
    }

    /// Parses a schedule with the columns `date,visitor,home,vg,hg,ot,played`, in any order.
    pub fn parse<R: BufRead>(mut reader: CsvReader<R>, league: &League) -> Result<Self, ScheduleError> {
        let header = match reader.read() {
            None => return Ok(Self::default()),
            Some(record) => Header::from(record?),
        };
        let date_col = header.require("date")?;
        let visitor_col = header.require("visitor")?;
        let home_col = header.require("home")?;
        let vg_col = header.require("vg")?;
        let hg_col = header.require("hg")?;
        let ot_col = header.require("ot")?;
        let played_col = header.require("played")?;

        let mut games = vec![];
        for (index, record) in reader.enumerate() {
            let record = record?;
            let line = index + 2;
            let field = |col: usize| record.get(col).map(|value| value.trim()).unwrap_or_default();
            let invalid = |column: &'static str, value: &str| ScheduleError::InvalidValue {
                line,
                column,
                value: value.into(),
            };
            let team = |col: usize| {
                let name = field(col);
                league.find(name).ok_or_else(|| ScheduleError::UnknownTeam {
                    line,
                    team: name.into(),
                })
            };
            let goals = |col: usize, column: &'static str| -> Result<u16, ScheduleError> {
                let value = field(col);
                if value.is_empty() {
                    Ok(0)
                } else {
                    value.parse().map_err(|_| invalid(column, value))
                }
            };

            let date = field(date_col);
            let date = date
                .get(..10)
                .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
                .ok_or_else(|| invalid("date", date))?;
            let played = parse_flag(field(played_col)).ok_or_else(|| invalid("played", field(played_col)))?;
            let overtime = Decision::from_str(field(ot_col)).map_err(|_| invalid("ot", field(ot_col)))?;
            games.push(ScheduledGame {
                date,
                home: team(home_col)?,
                away: team(visitor_col)?,
                played,
                home_goals: goals(hg_col, "hg")?,
                away_goals: goals(vg_col, "vg")?,
                overtime,
            });
        }
        let schedule = Self::new(games, league)?;
        debug!(
            "parsed schedule of {} games ({} played)",
            schedule.len(),
            schedule.played().count()
        );
        Ok(schedule)
    }

    pub fn games(&self) -> &[ScheduledGame] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn played(&self) -> impl Iterator<Item = &ScheduledGame> {
        self.games.iter().filter(|game| game.played)
    }

    pub fn remaining(&self) -> impl Iterator<Item = &ScheduledGame> {
        self.games.iter().filter(|game| !game.played)
    }

    pub fn on(&self, date: NaiveDate) -> impl Iterator<Item = &ScheduledGame> {
        self.games.iter().filter(move |game| game.date == date)
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "date,visitor,home,vg,hg,ot,played\n";

    fn parse(rows: &str) -> Result<Schedule, ScheduleError> {
        let data = format!("{HEADER}{rows}");
        Schedule::parse(CsvReader::new(Cursor::new(data)), &League::nhl())
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn parse_played_and_unplayed() {
        let schedule = parse(
            "2025-10-07,Chicago Blackhawks,Florida Panthers,2,3,,True\n\
             2025-10-08,Boston Bruins,Washington Capitals,3,2,SO,true\n\
             2026-04-16,Boston Bruins,Buffalo Sabres,,,,False\n",
        )
        .unwrap();
        let league = League::nhl();
        assert_eq!(3, schedule.len());
        assert_eq!(2, schedule.played().count());
        assert_eq!(1, schedule.remaining().count());

        let first = &schedule.games()[0];
        assert_eq!(date("2025-10-07"), first.date);
        assert_eq!("Florida Panthers", league.name(first.home));
        assert_eq!("Chicago Blackhawks", league.name(first.away));
        assert_eq!(
            Some(GameResult {
                winner: Side::Home,
                home_goals: 3,
                away_goals: 2,
                decision: Decision::Regulation
            }),
            first.result()
        );

        let second = &schedule.games()[1];
        let result = second.result().unwrap();
        assert_eq!(Side::Away, result.winner);
        assert_eq!(Decision::Shootout, result.decision);
        assert_eq!(1, result.home_points());

        assert_eq!(None, schedule.games()[2].result());
        assert_eq!(1, schedule.on(date("2026-04-16")).count());
    }

    #[test]
    fn reject_unknown_team() {
        let err = parse("2025-10-07,Quebec Nordiques,Florida Panthers,2,3,,True\n").unwrap_err();
        assert_eq!("line 2: unknown team 'Quebec Nordiques'", err.to_string());
    }

    #[test]
    fn reject_bad_overtime_flag() {
        let err = parse("2025-10-07,Chicago Blackhawks,Florida Panthers,2,3,2OT,True\n").unwrap_err();
        assert_eq!("line 2: invalid ot '2OT'", err.to_string());
    }

    #[test]
    fn reject_bad_played_flag() {
        let err = parse("2025-10-07,Chicago Blackhawks,Florida Panthers,2,3,,maybe\n").unwrap_err();
        assert_eq!("line 2: invalid played 'maybe'", err.to_string());
    }

    #[test]
    fn reject_tied_played_game() {
        let err = parse("2025-10-07,Chicago Blackhawks,Florida Panthers,3,3,,True\n").unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidGame {
                index: 0,
                source: InvalidGame::Tied { .. },
                ..
            }
        ));
    }

    #[test]
    fn reject_wide_overtime_margin() {
        let err = parse("2025-10-07,Chicago Blackhawks,Florida Panthers,1,4,OT,True\n").unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidGame {
                source: InvalidGame::ExtraTimeMargin { .. },
                ..
            }
        ));
    }

    #[test]
    fn reject_team_playing_itself() {
        let league = League::nhl();
        let team = TeamId::index(3);
        let err = Schedule::new(
            vec![ScheduledGame::unplayed(date("2025-12-01"), team, team)],
            &league,
        )
        .unwrap_err();
        assert_eq!(
            "game 0 on 2025-12-01: Florida Panthers cannot play itself",
            err.to_string()
        );
    }

    #[test]
    fn reject_foreign_team_id() {
        let league = League::nhl();
        let err = Schedule::new(
            vec![ScheduledGame::unplayed(
                date("2025-12-01"),
                TeamId::index(0),
                TeamId::index(40),
            )],
            &league,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidGame {
                source: InvalidGame::UnknownTeamId(_),
                ..
            }
        ));
    }

    #[test]
    fn empty_input() {
        let schedule = Schedule::parse(CsvReader::new(Cursor::new("")), &League::nhl()).unwrap();
        assert!(schedule.is_empty());
    }
}
