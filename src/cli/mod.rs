//! Command-line parsing for the damped stress inversion tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the inversion/sweep code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "tradeoff",
    version,
    about = "Damped stress inversion of fault-plane solutions with L-curve damping selection"
)]
pub struct Cli {
    /// Log verbosity when RUST_LOG is unset (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sweep damping values, print the trade-off curve and the selected model.
    Curve(CurveArgs),
    /// Run a single inversion at a fixed damping.
    Invert(InvertArgs),
    /// Print the schema and counts of an input file.
    Inspect(InspectArgs),
    /// Write a synthetic input file with a known stress field.
    Synth(SynthArgs),
}

#[derive(Debug, Args, Clone)]
pub struct CurveArgs {
    /// Fault-plane solution file (`x y dip dip_angle rake` or `x y z t dip dip_angle rake`).
    pub input: PathBuf,

    /// Comma-separated damping candidates (default: the built-in 21-value sweep).
    #[arg(long, value_delimiter = ',', num_args = 1.., conflicts_with = "sweep")]
    pub damping: Option<Vec<f64>>,

    /// Log-spaced sweep as MIN:MAX:STEPS.
    #[arg(long, value_parser = parse_sweep)]
    pub sweep: Option<SweepRange>,

    /// Weight of time-axis roughening relative to space.
    #[arg(long, default_value_t = 1.0)]
    pub time_damping_ratio: f64,

    /// Solve candidates one at a time instead of on the thread pool.
    #[arg(long)]
    pub sequential: bool,

    /// Abort the sweep after this many seconds.
    #[arg(long)]
    pub deadline_secs: Option<f64>,

    /// Fail if the curve is not monotonic.
    #[arg(long)]
    pub strict: bool,

    /// Export the curve and the selected model to JSON.
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Export the curve to CSV.
    #[arg(long)]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct InvertArgs {
    pub input: PathBuf,

    /// Damping value.
    #[arg(long)]
    pub damping: f64,

    /// Weight of time-axis roughening relative to space.
    #[arg(long, default_value_t = 1.0)]
    pub time_damping_ratio: f64,
}

#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    pub input: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Output file.
    pub output: PathBuf,

    #[arg(long, default_value_t = 3)]
    pub nx: usize,

    #[arg(long, default_value_t = 3)]
    pub ny: usize,

    /// Cells along depth; values above 1 switch to the space-time layout.
    #[arg(long, default_value_t = 1)]
    pub nz: usize,

    /// Cells along time; values above 1 switch to the space-time layout.
    #[arg(long, default_value_t = 1)]
    pub nt: usize,

    /// Records per cell.
    #[arg(long, default_value_t = 10)]
    pub per_cell: usize,

    /// Rake noise standard deviation, degrees.
    #[arg(long, default_value_t = 10.0)]
    pub noise_deg: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// A `MIN:MAX:STEPS` log-spaced sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRange {
    pub min: f64,
    pub max: f64,
    pub steps: usize,
}

fn parse_sweep(s: &str) -> Result<SweepRange, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let [min, max, steps] = parts.as_slice() else {
        return Err(format!("expected MIN:MAX:STEPS, got '{s}'"));
    };
    let min: f64 = min.trim().parse().map_err(|e| format!("invalid MIN '{min}': {e}"))?;
    let max: f64 = max.trim().parse().map_err(|e| format!("invalid MAX '{max}': {e}"))?;
    let steps: usize = steps.trim().parse().map_err(|e| format!("invalid STEPS '{steps}': {e}"))?;
    Ok(SweepRange { min, max, steps })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damping_list_is_comma_separated() {
        let cli = Cli::try_parse_from(["tradeoff", "curve", "in.txt", "--damping", "0.5,1,2.5"]).unwrap();
        let Command::Curve(args) = cli.command else {
            panic!("expected curve");
        };
        assert_eq!(args.damping, Some(vec![0.5, 1.0, 2.5]));
        assert!(args.sweep.is_none());
        assert!(!args.sequential);
    }

    #[test]
    fn sweep_is_parsed() {
        let cli = Cli::try_parse_from(["tradeoff", "curve", "in.txt", "--sweep", "0.1:10:15"]).unwrap();
        let Command::Curve(args) = cli.command else {
            panic!("expected curve");
        };
        assert_eq!(
            args.sweep,
            Some(SweepRange {
                min: 0.1,
                max: 10.0,
                steps: 15
            })
        );
        assert!(parse_sweep("1:2").is_err());
        assert!(parse_sweep("a:2:3").is_err());
    }

    #[test]
    fn damping_and_sweep_conflict() {
        let res = Cli::try_parse_from([
            "tradeoff", "curve", "in.txt", "--damping", "1,2,3", "--sweep", "0.1:1:5",
        ]);
        assert!(res.is_err());
    }
}
