use std::io;
use std::io::Write;

use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};
use strum::IntoEnumIterator;

use crate::csv::CsvWriter;
use crate::league::{League, TeamId};
use crate::mc::{Outcome, Tally};
use crate::predict::GamePrediction;

/// Teams by descending playoff probability, then by championship probability and team order.
pub fn sort_by_playoffs(tally: &Tally) -> Vec<TeamId> {
    let mut teams: Vec<_> = (0..tally.teams()).map(TeamId::index).collect();
    teams.sort_by(|a, b| {
        tally
            .count(*b, Outcome::Playoffs)
            .cmp(&tally.count(*a, Outcome::Playoffs))
            .then(
                tally
                    .count(*b, Outcome::Championship)
                    .cmp(&tally.count(*a, Outcome::Championship)),
            )
            .then(a.cmp(b))
    });
    teams
}

fn percent(probability: f64) -> String {
    format!("{:.1}", probability * 100.0)
}

pub fn tabulate_tally(league: &League, tally: &Tally) -> Table {
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![
                Col::new(Styles::default().with(MinWidth(24)).with(HAlign::Left)),
                Col::new(
                    Styles::default()
                        .with(Separator(true))
                        .with(MinWidth(14))
                        .with(HAlign::Left),
                ),
            ];
            for _ in Outcome::iter() {
                cols.push(Col::new(
                    Styles::default().with(MinWidth(8)).with(HAlign::Right),
                ));
            }
            cols
        })
        .with_row({
            let mut header_cells = vec!["Team".into(), "Division".into()];
            for outcome in Outcome::iter() {
                header_cells.push(format!("{outcome} %").into());
            }
            Row::new(Styles::default().with(Header(true)), header_cells)
        });

    for team in sort_by_playoffs(tally) {
        let mut row_cells = vec![
            league.name(team).to_string().into(),
            league.divisions()[league.division_of(team)].name.clone().into(),
        ];
        for outcome in Outcome::iter() {
            row_cells.push(percent(tally.probability(team, outcome)).into());
        }
        table.push_row(Row::new(Styles::default(), row_cells));
    }
    table
}

/// Writes one row per team, in playoff-probability order, with every outcome as a percentage.
pub fn write_tally_csv<W: Write>(
    league: &League,
    tally: &Tally,
    writer: &mut CsvWriter<W>,
) -> Result<(), io::Error> {
    let mut header = vec!["team".to_string()];
    header.extend(Outcome::iter().map(|outcome| outcome.to_string()));
    writer.append(header)?;
    for team in sort_by_playoffs(tally) {
        let mut record = vec![league.name(team).to_string()];
        record.extend(Outcome::iter().map(|outcome| percent(tally.probability(team, outcome))));
        writer.append(record)?;
    }
    writer.flush()
}

pub fn tabulate_predictions(league: &League, predictions: &[GamePrediction]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(24)).with(HAlign::Left)),
            Col::new(
                Styles::default()
                    .with(Separator(true))
                    .with(MinWidth(24))
                    .with(HAlign::Left),
            ),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(
                Styles::default()
                    .with(Separator(true))
                    .with(MinWidth(8))
                    .with(HAlign::Right),
            ),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(9)).with(HAlign::Centred)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Home".into(),
                "Away".into(),
                "Home %".into(),
                "Away %".into(),
                "Home G".into(),
                "Away G".into(),
                "Total".into(),
                "Model %".into(),
                "Favourite".into(),
            ],
        ));

    for prediction in predictions {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                league.name(prediction.home).to_string().into(),
                league.name(prediction.away).to_string().into(),
                percent(prediction.home_win_prob).into(),
                percent(prediction.away_win_prob).into(),
                format!("{:.2}", prediction.home_avg_goals).into(),
                format!("{:.2}", prediction.away_avg_goals).into(),
                format!("{:.2}", prediction.expected_total).into(),
                percent(prediction.analytic_home_win_prob).into(),
                prediction.favourite.to_string().into(),
            ],
        ));
    }
    table
}
