//! A fast Monte Carlo model of ice hockey season outcomes. Completes the remaining schedule at
//! random many times over, then derives per-team probabilities of making the playoffs, winning
//! each playoff round, topping a division or the league, and winning the championship.

#![allow(clippy::too_many_arguments)]

pub mod bracket;
pub mod config;
pub mod csv;
pub mod factorial;
pub mod file;
pub mod game;
pub mod league;
pub mod mc;
pub mod playoff;
pub mod poisson;
pub mod predict;
pub mod print;
pub mod random;
pub mod schedule;
pub mod standings;
pub mod strength;
pub mod timed;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
