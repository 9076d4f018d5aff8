//! End-to-end runs on synthetic catalogs written to disk.

use stress_tradeoff::app::pipeline::run_tradeoff;
use stress_tradeoff::data::{SyntheticConfig, generate_fault_plane_solutions};
use stress_tradeoff::domain::{Schema, TradeoffConfig};
use stress_tradeoff::io::{write_curve_csv, write_curve_json, write_fault_plane_solutions};
use stress_tradeoff::tradeoff::{SweepOptions, calculate_tradeoff_curve_with, log_space};
use stress_tradeoff::{DEFAULT_DAMPING_CANDIDATES, TradeoffError, read_fault_plane_solutions};

fn config(input: std::path::PathBuf) -> TradeoffConfig {
    TradeoffConfig {
        input_path: input,
        damping_candidates: DEFAULT_DAMPING_CANDIDATES.to_vec(),
        time_damping_ratio: 1.0,
        parallel: true,
        deadline: None,
        strict_monotonicity: true,
        export_json: None,
        export_csv: None,
    }
}

#[test]
fn synthetic_catalog_runs_through_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("catalog.txt");
    let table = generate_fault_plane_solutions(&SyntheticConfig {
        nx: 4,
        ny: 3,
        per_cell: 8,
        seed: 11,
        ..SyntheticConfig::default()
    })
    .unwrap();
    write_fault_plane_solutions(&input, &table).unwrap();

    let cfg = config(input);
    let run = run_tradeoff(&cfg).unwrap();
    assert_eq!(run.table.len(), 96);
    assert_eq!(run.table.schema(), Schema::Planar);
    assert!(run.result.monotonicity_violations().is_empty());
    assert_eq!(run.selected.model.cells().len(), 12);

    let json = dir.path().join("curve.json");
    let csv = dir.path().join("curve.csv");
    write_curve_json(&json, &run.result, Some(&run.selected), &cfg).unwrap();
    write_curve_csv(&csv, &run.result).unwrap();

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(value["selected"]["cells"].as_array().unwrap().len(), 12);
    assert_eq!(
        value["selected"]["damping"].as_f64(),
        Some(run.result.selected_damping_value())
    );
    assert_eq!(std::fs::read_to_string(&csv).unwrap().lines().count(), 22);
}

#[test]
fn time_damping_ratio_reshapes_a_space_time_curve() {
    let table = generate_fault_plane_solutions(&SyntheticConfig {
        nx: 2,
        ny: 2,
        nt: 3,
        per_cell: 8,
        ..SyntheticConfig::default()
    })
    .unwrap();
    let candidates = log_space(0.2, 5.0, 8).unwrap();

    let curve = |ratio: f64| {
        let mut opts = SweepOptions::default();
        opts.inversion.time_damping_ratio = ratio;
        calculate_tradeoff_curve_with(&table, &candidates, &opts).unwrap()
    };
    let loose = curve(0.1);
    let tight = curve(3.0);

    assert!(loose.monotonicity_violations().is_empty());
    assert!(tight.monotonicity_violations().is_empty());
    assert_ne!(loose.model_length(), tight.model_length());
}

#[test]
fn written_space_time_catalog_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("st.txt");
    let table = generate_fault_plane_solutions(&SyntheticConfig {
        nz: 2,
        per_cell: 6,
        ..SyntheticConfig::default()
    })
    .unwrap();
    write_fault_plane_solutions(&path, &table).unwrap();

    let back = read_fault_plane_solutions(&path).unwrap();
    assert_eq!(back.schema(), Schema::SpaceTime);
    assert_eq!(back.cell_count(), 18);

    let err = calculate_tradeoff_curve_with(&back, &[1.0, 2.0], &SweepOptions::default()).unwrap_err();
    assert!(matches!(err, TradeoffError::Selection(_)));
}
