use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::bail;
use chrono::{Local, NaiveDate};
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use puckdrop::config::Config;
use puckdrop::file::ReadJsonFile;
use puckdrop::league::League;
use puckdrop::predict;
use puckdrop::print::tabulate_predictions;
use puckdrop::schedule::Schedule;
use puckdrop::strength;
use puckdrop::strength::RatingTable;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// schedule CSV (date,visitor,home,vg,hg,ot,played)
    #[clap(short = 's', long)]
    schedule: PathBuf,

    /// date of the games to predict (YYYY-MM-DD); today if omitted
    #[clap(short = 'd', long)]
    date: Option<NaiveDate>,

    /// JSON configuration file; defaults apply if omitted
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// JSON league structure; the NHL is assumed if omitted
    #[clap(short = 'l', long)]
    league: Option<PathBuf>,

    /// JSON map of team ratings
    #[clap(short = 'r', long)]
    ratings: Option<PathBuf>,

    /// player statistics CSV (player,team,toi,xgf,xga) to derive ratings from
    #[clap(short = 'p', long)]
    players: Option<PathBuf>,

    /// simulations per game
    #[clap(short = 'i', long)]
    iterations: Option<u64>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.ratings.is_some() && self.players.is_some() {
            bail!("at most one of the -r and -p flags may be specified");
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let mut config = match &args.config {
        None => Config::default(),
        Some(path) => Config::read_json_file(path)?,
    };
    if let Some(iterations) = args.iterations {
        config.predict.iterations = iterations;
    }
    config.validate()?;

    let league = match &args.league {
        None => League::nhl(),
        Some(path) => League::read_json_file(path)?,
    };
    let schedule = Schedule::read_csv(&args.schedule, &league)?;
    let table = match (&args.ratings, &args.players) {
        (Some(path), _) => RatingTable::read_json(path, config.ratings.clone())?,
        (_, Some(path)) => RatingTable::read_players_csv(path, config.ratings.clone())?,
        (None, None) => RatingTable::new(Default::default(), config.ratings.clone()),
    };
    let ratings = strength::resolve(&league, &table, &config.ratings);

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let predictions = predict::predict_date(
        &config.game,
        &ratings,
        &schedule,
        date,
        &config.predict,
        config.season.seed,
    );
    if predictions.is_empty() {
        info!("no games scheduled on {date}");
        return Ok(());
    }

    info!(
        "{} games on {date}, {} simulations each",
        predictions.len(),
        config.predict.iterations
    );
    let table = tabulate_predictions(&league, &predictions);
    info!("\n{}", Console::default().render(&table));
    Ok(())
}
