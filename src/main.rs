use std::path::PathBuf;

use sparty_logic::graph::graphviz::ToGraphviz;
use sparty_logic::level::LevelDesc;
use sparty_logic::simulator::Simulator;
use structopt::StructOpt;

/// Runs a conveyor level headless and reports how the products were routed
#[derive(StructOpt, Debug)]
#[structopt(name = "sparty-logic")]
struct Opt {
    /// Level description (JSON)
    #[structopt(parse(from_os_str))]
    level: PathBuf,

    /// Number of ticks to run
    #[structopt(short, long, default_value = "600")]
    ticks: usize,

    /// Seconds per tick
    #[structopt(short, long, default_value = "0.016")]
    elapsed: f64,

    /// Leave the conveyors stopped
    #[structopt(long)]
    no_start: bool,

    /// Print the circuit as graphviz after the run
    #[structopt(short, long)]
    graphviz: bool,
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = Opt::from_args();
    let scene = LevelDesc::load(&opt.level)?.to_scene()?;

    let mut sim = Simulator::from(scene)?;
    if !opt.no_start {
        sim.start_conveyors();
    }

    let ticks = sim.run(opt.ticks, opt.elapsed);
    let score = sim.listener();
    tracing::info!(
        "ran {ticks} ticks: {} good, {} bad, level end: {}",
        score.correct(),
        score.incorrect(),
        score.level_ended()
    );

    if opt.graphviz {
        println!("{}", sim.to_graphviz());
    }

    Ok(())
}
