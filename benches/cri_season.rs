use chrono::{Days, NaiveDate};
use criterion::{criterion_group, criterion_main, Criterion};

use puckdrop::league::League;
use puckdrop::mc::SeasonEngine;
use puckdrop::schedule::{Schedule, ScheduledGame};
use puckdrop::standings::Standings;
use puckdrop::strength::TeamRating;

fn criterion_benchmark(c: &mut Criterion) {
    let league = League::nhl();
    let start = NaiveDate::from_ymd_opt(2025, 10, 7).unwrap();
    let mut games = vec![];
    for home in league.ids() {
        for away in league.ids() {
            if home != away {
                let day = games.len() as u64 / 16;
                games.push(ScheduledGame::unplayed(start + Days::new(day), home, away));
            }
        }
    }
    let schedule = Schedule::new(games, &league).unwrap();
    let baseline = Standings::build(&league, &schedule);
    let ratings: Vec<_> = (0..league.len())
        .map(|index| {
            let step = index as f64 / league.len() as f64;
            TeamRating::new(3.4 - step, 2.5 + step)
        })
        .collect();

    {
        // sanity check
        let engine = SeasonEngine::new(&league).with_trials(10);
        let tally = engine.simulate(&schedule, &baseline, &ratings).unwrap();
        assert_eq!(10, tally.trials());
    }

    let mut group = c.benchmark_group("cri_season");
    group.sample_size(10);
    group.bench_function("cri_season_100_trials", |b| {
        let engine = SeasonEngine::new(&league).with_trials(100);
        b.iter(|| engine.simulate(&schedule, &baseline, &ratings).unwrap());
    });
    group.bench_function("cri_season_100_trials_single_thread", |b| {
        let engine = SeasonEngine::new(&league)
            .with_trials(100)
            .with_threads(Some(1));
        b.iter(|| engine.simulate(&schedule, &baseline, &ratings).unwrap());
    });
    group.bench_function("cri_season_finalize", |b| {
        b.iter(|| baseline.finalize());
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
