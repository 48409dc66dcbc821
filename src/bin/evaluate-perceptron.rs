//! Evaluate a perceptron [`BranchPredictor`] against a commit log.

use perceptron_bp::*;
use perceptron_bp::stats::*;

use clap::Parser;
use itertools::Itertools;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULTS: PerceptronConfig = PerceptronConfig::REFERENCE;

#[derive(Parser, Debug)]
#[command(name = "evaluate-perceptron", version,
    about = "Evaluate a fixed-width perceptron branch predictor against a RISC-V commit log")]
struct Args {
    /// Commit log (e.g. from `spike -l --log-commits`)
    trace: PathBuf,

    /// Global history length in bits
    #[arg(long, default_value_t = DEFAULTS.history_len)]
    history: usize,

    /// Weight width in bits (2, 4 or 8)
    #[arg(long, default_value_t = DEFAULTS.weight_bits)]
    weight_bits: u32,

    /// Weighted-sum width in bits [default: derived]
    #[arg(long)]
    sum_bits: Option<u32>,

    /// Training threshold
    #[arg(long, default_value_t = DEFAULTS.threshold)]
    threshold: i32,

    /// Storage budget for the perceptron table in bits
    #[arg(long, default_value_t = DEFAULTS.storage_bits)]
    storage_bits: usize,

    /// Keep a bias weight in every perceptron
    #[arg(long)]
    bias: bool,

    #[arg(long, value_enum, default_value_t = SumMode::Accumulate)]
    sum_mode: SumMode,

    #[arg(long, value_enum, default_value_t = TrainingRule::Uniform)]
    training_rule: TrainingRule,

    /// Number of low program counter bits seen by the predictor
    #[arg(long, default_value_t = DEFAULTS.address_bits)]
    address_bits: u32,

    /// Don't print a line for every branch
    #[arg(short, long)]
    quiet: bool,

    /// Number of poorly-predicted branches to list
    #[arg(long, default_value_t = 4)]
    worst: usize,

    /// Number of most frequently executed branches to list
    #[arg(long, default_value_t = 0)]
    common: usize,

    /// Only evaluate the first N records of the trace
    #[arg(long)]
    limit: Option<usize>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}
impl Args {
    fn config(&self) -> PerceptronConfig {
        PerceptronConfig {
            history_len: self.history,
            weight_bits: self.weight_bits,
            sum_bits: self.sum_bits,
            threshold: self.threshold,
            storage_bits: self.storage_bits,
            bias: self.bias,
            sum_mode: self.sum_mode,
            training_rule: self.training_rule,
            address_bits: self.address_bits,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_event(e: &BranchEvent) {
    let weights = e.bias.iter().chain(e.weights.iter()).join(", ");
    println!(
        "Branch address: {:08x}, inst: {:08x}, index: {:3}, offset: {:4}, \
         taken: {:?}, prediction: {:?}, y: {:4}, weights: [{}], trained: {}",
        e.record.pc,
        e.record.inst,
        e.prediction.index,
        e.offset,
        e.outcome,
        e.prediction.outcome,
        e.prediction.y,
        weights,
        e.trained,
    );
}

fn print_branch(pc: u32, data: &BranchData) {
    println!("  {:08x} {:6}/{:6} {:.4} {}",
        pc, data.hits, data.occ, data.hit_rate(), data.pattern()
    );
}

fn print_summary(stat: &BranchStats, worst: usize, common: usize) {
    match stat.hit_rate() {
        Some(rate) => println!("Accuracy: {:.4} ({}/{}, {} misses)",
            rate, stat.global_hits(), stat.global_brns(), stat.global_miss()),
        None => {
            println!("Accuracy: no branches observed");
            return;
        },
    }
    println!("Unique branches: {} ({} always taken, {} never taken)",
        stat.num_unique_branches(),
        stat.num_always_taken(),
        stat.num_never_taken(),
    );

    let top = stat.get_common_branches(common);
    if !top.is_empty() {
        println!("Most common branches:");
        for (pc, data) in top {
            print_branch(pc, data);
        }
    }

    let low = stat.get_low_rate_branches(worst, 2, 0.5);
    if !low.is_empty() {
        println!("Low hit-rate branches:");
        for (pc, data) in low {
            print_branch(pc, data);
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let mut bp = args.config().build()?;
    let trace = TextTrace::from_file(&args.trace)?;

    let cfg = bp.config();
    println!("[*] {}: {} records", trace.name(), trace.num_entries());
    println!("Perceptrons: {}", bp.num_perceptrons());
    println!("Storage: {} bits", cfg.storage_bits);
    println!("Storage per perceptron: {} bits", cfg.storage_per_perceptron());
    println!("Weight max: {}, sum width: {} bits", cfg.weight_max(), cfg.sum_bits());

    let records = match args.limit {
        Some(limit) => trace.as_slice_trunc(limit),
        None => trace.as_slice(),
    };
    let stat = evaluate_with(records, &mut bp, |e| {
        if !args.quiet {
            print_event(e);
        }
    });
    print_summary(&stat, args.worst, args.common);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        },
    }
}
