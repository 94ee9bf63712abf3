use std::{io, path::Path, time::Instant};

use anyhow::Context;
use clap::Parser;
use log::info;
use sat_solver::{
    dimacs::parser::DimacsParser,
    solver::config::{HeuristicOption, PolarityOption, PropagationMode},
    CdclSolver, SolveStatus, SolverConfig,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// File path of instance to parse (stdin if omitted)
    #[arg(short, long)]
    pub file: Option<String>,

    /// Propagate by rescanning every clause instead of using watched literals
    #[arg(short, long, default_value_t = false)]
    pub rescan: bool,

    /// Whether to prefer true in decisions (instead of the more frequent polarity)
    #[arg(short, long, default_value_t = false)]
    pub true_pref: bool,

    /// Whether to remember the last polarity of a variable and branch on it
    #[arg(short, long, default_value_t = false)]
    pub save_phases: bool,

    /// Number of learned clauses between score decays
    #[arg(short, long, default_value_t = 3)]
    pub decay_interval: u64,

    /// Print the satisfying assignment as a `v ... 0` line
    #[arg(short, long, default_value_t = false)]
    pub model: bool,

    /// Print runtime statistics to stderr
    #[arg(long, default_value_t = false)]
    pub stats: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder().filter(None, level).init();
    log::set_max_level(level);

    // Get instance
    let formula = match &args.file {
        Some(file) => DimacsParser::new(file)
            .and_then(|p| p.parse())
            .with_context(|| format!("failed to read {file}"))?,
        None => DimacsParser::from_reader(io::stdin().lock())
            .parse()
            .context("failed to read stdin")?,
    };

    let mut cfg = SolverConfig::default();
    if args.rescan {
        cfg.propagation = PropagationMode::Rescan;
    }
    if args.true_pref {
        cfg.decision_policy.initial_polarity = PolarityOption::True;
    }
    cfg.decision_policy.save_phases = args.save_phases;
    let HeuristicOption::Vsids { decay_interval, .. } = &mut cfg.decision_policy.heuristic;
    *decay_interval = args.decay_interval;
    info!("Config: {:#?}", cfg);

    let mut solver = CdclSolver::new(cfg, &formula);
    let start = Instant::now();
    let res = solver.solve().context("solver hit an internal error")?;
    let elapsed = start.elapsed();

    println!("{res}");
    if let (SolveStatus::Sat, true) = (res, args.model) {
        if let Some(model) = solver.model() {
            println!("{model}");
        }
    }
    if args.stats {
        eprintln!("{}", solver.stats());
    }

    let name = args
        .file
        .as_deref()
        .and_then(|f| Path::new(f).file_name())
        .and_then(|f| f.to_str())
        .unwrap_or("<stdin>");
    info!("[{}] Status: {}\tElapsed: {:#?}", name, res, elapsed);
    Ok(())
}
