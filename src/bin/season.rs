use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::bail;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use puckdrop::bracket::Topology;
use puckdrop::config::Config;
use puckdrop::csv::CsvWriter;
use puckdrop::file::{ReadJsonFile, WriteJsonFile};
use puckdrop::league::League;
use puckdrop::mc::SeasonEngine;
use puckdrop::print::{tabulate_tally, write_tally_csv};
use puckdrop::schedule::Schedule;
use puckdrop::standings::Standings;
use puckdrop::strength;
use puckdrop::strength::RatingTable;
use puckdrop::timed::Timed;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// schedule CSV (date,visitor,home,vg,hg,ot,played)
    #[clap(short = 's', long)]
    schedule: PathBuf,

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

    /// number of simulated seasons
    #[clap(short = 't', long)]
    trials: Option<u64>,

    /// random seed
    #[clap(long)]
    seed: Option<u64>,

    /// size of a dedicated worker pool
    #[clap(long)]
    threads: Option<usize>,

    /// round-1 pairing scheme (fixed or halving)
    #[clap(long)]
    topology: Option<Topology>,

    /// CSV file to write outcome percentages to
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,

    /// JSON file to save the effective configuration to
    #[clap(long)]
    save_config: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.ratings.is_some() && self.players.is_some() {
            bail!("at most one of the -r and -p flags may be specified");
        }
        Ok(())
    }

    fn apply(&self, config: &mut Config) {
        if let Some(trials) = self.trials {
            config.season.trials = trials;
        }
        if let Some(seed) = self.seed {
            config.season.seed = seed;
        }
        if let Some(threads) = self.threads {
            config.season.threads = Some(threads);
        }
        if let Some(topology) = self.topology {
            config.season.topology = topology;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
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
    args.apply(&mut config);
    config.validate()?;
    debug!("config: {config:?}");
    if let Some(path) = &args.save_config {
        config.write_json_file(path)?;
        info!("saved config to {}", path.display());
    }

    let league = match &args.league {
        None => League::nhl(),
        Some(path) => League::read_json_file(path)?,
    };
    let schedule = Schedule::read_csv(&args.schedule, &league)?;
    info!(
        "loaded {} games, {} played, {} remaining",
        schedule.len(),
        schedule.played().count(),
        schedule.remaining().count()
    );

    let table = match (&args.ratings, &args.players) {
        (Some(path), _) => RatingTable::read_json(path, config.ratings.clone())?,
        (_, Some(path)) => RatingTable::read_players_csv(path, config.ratings.clone())?,
        (None, None) => RatingTable::new(Default::default(), config.ratings.clone()),
    };
    info!("rated {} teams", table.len());
    let ratings = strength::resolve(&league, &table, &config.ratings);

    let baseline = Standings::build(&league, &schedule);
    let engine = SeasonEngine::from_config(&league, &config)?;
    let stop = engine.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted; finishing the trials in flight");
            stop.store(true, Ordering::Relaxed);
        }
    });
    let timed = Timed::result(|| engine.simulate(&schedule, &baseline, &ratings))?;
    info!(
        "simulated {} seasons in {:.3}s ({:.0} seasons/s)",
        timed.value.trials(),
        timed.elapsed.as_secs_f64(),
        timed.rate(timed.value.trials())
    );
    let tally = timed.value;
    if tally.trials() < engine.trials() {
        warn!(
            "stopped early: reporting {} of {} seasons",
            tally.trials(),
            engine.trials()
        );
    }

    let table = tabulate_tally(&league, &tally);
    info!("\n{}", Console::default().render(&table));

    if let Some(path) = &args.output {
        let mut writer = CsvWriter::create(path)?;
        write_tally_csv(&league, &tally, &mut writer)?;
        info!("wrote {}", path.display());
    }
    Ok(())
}
