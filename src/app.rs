//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging and the thread pool
//! - parses CLI arguments
//! - runs the sweep / single inversion / inspection / synthesis
//! - prints reports and writes optional exports

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, CurveArgs, InspectArgs, InvertArgs, SynthArgs};
use crate::data::{SyntheticConfig, generate_fault_plane_solutions};
use crate::domain::TradeoffConfig;
use crate::error::AppError;
use crate::inversion::{InversionOptions, invert};
use crate::io::read_fault_plane_solutions;
use crate::tradeoff::{DEFAULT_DAMPING_CANDIDATES, log_space};

pub mod pipeline;

/// Environment variable that sizes the global rayon pool.
pub const THREADS_ENV: &str = "TRADEOFF_THREADS";

/// Entry point for the `tradeoff` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    init_tracing(cli.verbose);
    init_thread_pool()?;

    match cli.command {
        Command::Curve(args) => handle_curve(args),
        Command::Invert(args) => handle_invert(args),
        Command::Inspect(args) => handle_inspect(args),
        Command::Synth(args) => handle_synth(args),
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn init_thread_pool() -> Result<(), AppError> {
    let Ok(raw) = std::env::var(THREADS_ENV) else {
        return Ok(());
    };
    let threads: usize = raw
        .trim()
        .parse()
        .map_err(|_| AppError::new(2, format!("{THREADS_ENV} must be a positive integer, got '{raw}'.")))?;
    if threads == 0 {
        return Err(AppError::new(2, format!("{THREADS_ENV} must be > 0.")));
    }
    if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
        tracing::warn!("could not size the thread pool: {e}");
    }
    tracing::debug!(threads = rayon::current_num_threads(), "thread pool ready");
    Ok(())
}

fn handle_curve(args: CurveArgs) -> Result<(), AppError> {
    let config = tradeoff_config_from_args(&args)?;
    let run = pipeline::run_tradeoff(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.table, &run.result, &run.selected, &config)
    );

    // Optional exports.
    if let Some(path) = &config.export_json {
        crate::io::export::write_curve_json(path, &run.result, Some(&run.selected), &config)?;
    }
    if let Some(path) = &config.export_csv {
        crate::io::export::write_curve_csv(path, &run.result)?;
    }

    Ok(())
}

fn handle_invert(args: InvertArgs) -> Result<(), AppError> {
    let table = read_fault_plane_solutions(&args.input)?;
    let opts = InversionOptions {
        time_damping_ratio: args.time_damping_ratio,
    };
    let outcome = invert(&table, args.damping, &opts)?;
    println!("{}", crate::report::format_inversion(&table, &outcome));
    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    let table = read_fault_plane_solutions(&args.input)?;
    print!("{}", crate::report::format_table_summary(&table));
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let config = SyntheticConfig {
        nx: args.nx,
        ny: args.ny,
        nz: args.nz,
        nt: args.nt,
        per_cell: args.per_cell,
        noise_deg: args.noise_deg,
        seed: args.seed,
    };
    let table = generate_fault_plane_solutions(&config)?;
    crate::io::export::write_fault_plane_solutions(&args.output, &table)?;
    println!(
        "Wrote {} records in {} cells to {}",
        table.len(),
        table.cell_count(),
        args.output.display()
    );
    Ok(())
}

/// Map `curve` arguments to a run configuration.
pub fn tradeoff_config_from_args(args: &CurveArgs) -> Result<TradeoffConfig, AppError> {
    let damping_candidates = match (&args.damping, &args.sweep) {
        (Some(list), _) => list.clone(),
        (None, Some(sweep)) => log_space(sweep.min, sweep.max, sweep.steps)?,
        (None, None) => DEFAULT_DAMPING_CANDIDATES.to_vec(),
    };

    let deadline = match args.deadline_secs {
        Some(secs) => Some(
            Duration::try_from_secs_f64(secs)
                .map_err(|e| AppError::new(2, format!("Invalid deadline {secs}: {e}")))?,
        ),
        None => None,
    };

    Ok(TradeoffConfig {
        input_path: args.input.clone(),
        damping_candidates,
        time_damping_ratio: args.time_damping_ratio,
        parallel: !args.sequential,
        deadline,
        strict_monotonicity: args.strict,
        export_json: args.export_json.clone(),
        export_csv: args.export_csv.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn curve_args(argv: &[&str]) -> CurveArgs {
        let mut full = vec!["tradeoff", "curve", "in.txt"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Curve(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn defaults_use_the_built_in_sweep() {
        let config = tradeoff_config_from_args(&curve_args(&[])).unwrap();
        assert_eq!(config.damping_candidates, DEFAULT_DAMPING_CANDIDATES.to_vec());
        assert!(config.parallel);
        assert!(config.deadline.is_none());
        assert_eq!(config.time_damping_ratio, 1.0);
    }

    #[test]
    fn sweep_and_flags_are_mapped() {
        let config = tradeoff_config_from_args(&curve_args(&[
            "--sweep",
            "0.5:8:9",
            "--sequential",
            "--strict",
            "--deadline-secs",
            "2.5",
        ]))
        .unwrap();
        assert_eq!(config.damping_candidates.len(), 9);
        assert_eq!(config.damping_candidates[0], 0.5);
        assert_eq!(config.damping_candidates[8], 8.0);
        assert!(!config.parallel);
        assert!(config.strict_monotonicity);
        assert_eq!(config.deadline, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn bad_sweep_or_deadline_is_a_usage_error() {
        let err = tradeoff_config_from_args(&curve_args(&["--sweep", "5:1:4"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = tradeoff_config_from_args(&curve_args(&["--deadline-secs=-1"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
