use bootband::{
    Analysis, Dataset, Samples, TimeSeries,
    data::{ModelOutput, read_file, write_file},
};
use chrono::{Months, NaiveDate};
use std::{
    env, fs,
    path::{Path, PathBuf},
    process::Command,
};

fn quarterly(start: u32, vals: &[f64]) -> TimeSeries {
    let origin = NaiveDate::from_ymd_opt(2000, 3, 31).expect("failed to build date");
    let index = (0..vals.len() as u32)
        .map(|i| origin + Months::new(3 * (start + i)))
        .collect();
    TimeSeries::new(index, vals.to_vec()).expect("failed to build series")
}

fn run_bin(args: &[&str]) {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_bootband"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    let stdout_str =
        std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );
}

/// Write the config file and a dataset of 44 quarterly levels with 36
/// training rates and 7 test rates.
fn write_inputs(test_dir: &Path) -> Dataset {
    fs::remove_dir_all(test_dir).ok();
    fs::create_dir_all(test_dir.join("replicates")).expect("failed to create test directory");

    let config_path = test_dir.join("config.toml");
    let config_contents = String::new()
        + "[bootstrap]\n"
        + "n_samples = 20\n"
        + "seed = 7\n"
        + "\n"
        + "[band]\n"
        + "lower_q = 0.025\n"
        + "upper_q = 0.975\n";

    fs::write(&config_path, config_contents).expect("failed to write config file");

    let rates: Vec<f64> = (0..43)
        .map(|i| 0.01 + 0.005 * (i as f64 * 0.7).sin())
        .collect();
    let mut levels = vec![100.0];
    for rate in &rates {
        levels.push(levels.last().expect("levels are not empty") * (1.0 + rate));
    }
    let dataset = Dataset {
        levels: quarterly(0, &levels),
        train: quarterly(1, &rates[..36]),
        test: quarterly(37, &rates[36..]),
    };
    write_file(test_dir.join("dataset.msgpack"), &dataset).expect("failed to write dataset");
    dataset
}

const N_HORIZON: usize = 11;

/// Stand-in for the external model: every replicate forecasts its own mean
/// over the 7 test quarters and 4 extra quarters.
fn write_forecasts(test_dir: &Path, samples: &Samples, rep_nums: impl Iterator<Item = usize>) {
    for (rep_num, rep) in rep_nums.zip(samples.ensemble.replicates()) {
        let avg = rep.values().iter().sum::<f64>() / rep.len() as f64;
        let forecast = quarterly(37, &vec![avg; N_HORIZON]);
        let rep_file = test_dir
            .join("replicates")
            .join(format!("replicate-{rep_num:04}.msgpack"));
        write_file(rep_file, &forecast).expect("failed to write replicate forecast");
    }
    let output = ModelOutput {
        fitted: vec![0.01; 36],
        point: quarterly(37, &vec![0.01; N_HORIZON]),
    };
    write_file(test_dir.join("forecast.msgpack"), &output).expect("failed to write forecast");
}

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");
    let dataset = write_inputs(&test_dir);

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--work-dir", test_dir_str, "resample"]);

    let samples: Samples =
        read_file(test_dir.join("samples.msgpack")).expect("failed to read samples");
    assert_eq!(samples.ensemble.len(), 20);
    for rep in samples.ensemble.replicates() {
        assert_eq!(rep.index(), dataset.train.index());
    }

    write_forecasts(&test_dir, &samples, 0..);

    run_bin(&["--work-dir", test_dir_str, "summarize"]);

    let analysis: Analysis =
        read_file(test_dir.join("reports.msgpack")).expect("failed to read reports");
    assert_eq!(analysis.rate.table.rows.len(), N_HORIZON);
    assert_eq!(analysis.level.table.rows.len(), N_HORIZON);
    assert!(analysis.level.error.is_some());
    for row in &analysis.level.table.rows {
        assert!(row.lower <= row.mean && row.mean <= row.upper);
    }

    run_bin(&["--work-dir", test_dir_str, "clean"]);

    assert!(!test_dir.join("samples.msgpack").exists());
    assert!(!test_dir.join("reports.msgpack").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn summarize_reads_replicates_with_gapped_numbering() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("gapped_numbering");
    write_inputs(&test_dir);

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--work-dir", test_dir_str, "resample"]);

    let samples: Samples =
        read_file(test_dir.join("samples.msgpack")).expect("failed to read samples");
    write_forecasts(&test_dir, &samples, (1..).step_by(2).take(3));

    run_bin(&["--work-dir", test_dir_str, "summarize"]);

    let analysis: Analysis =
        read_file(test_dir.join("reports.msgpack")).expect("failed to read reports");
    assert_eq!(analysis.level.table.rows.len(), N_HORIZON);

    fs::remove_dir_all(&test_dir).ok();
}
