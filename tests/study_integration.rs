//! End-to-end study on a synthetic weekly CO2 record.
//!
//! The record mimics the Mauna Loa layout: weekly readings from late March
//! 1958 through December 2001 with occasional gaps, written to CSV and run
//! through the default analysis (monthly means, holdout from January 1998).

use std::f64::consts::PI;
use std::io::Write;

use chrono::{Duration, NaiveDate};
use rand::{rngs::StdRng, Rng, SeedableRng};
use smoothcast::config::StudyConfig;
use smoothcast::io::{read_csv, CsvOptions};
use smoothcast::study::run_study;
use tempfile::NamedTempFile;

/// Seeded uniform noise on [-0.5, 0.5).
fn uniform_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-0.5..0.5)).collect()
}

/// Weekly CSV with a linear rise, an annual cycle and every 41st week blank.
fn weekly_co2_csv() -> NamedTempFile {
    let start = NaiveDate::from_ymd_opt(1958, 3, 29).unwrap();
    let end = NaiveDate::from_ymd_opt(2001, 12, 29).unwrap();
    let noise = uniform_noise(3000, 2024);

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,co2").unwrap();

    let mut week = 0usize;
    loop {
        let date = start + Duration::days(7 * week as i64);
        if date > end {
            break;
        }
        let years = (7 * week) as f64 / 365.25;
        if week % 41 == 20 {
            writeln!(file, "{date},").unwrap();
        } else {
            let ppm = 315.0 + 1.4 * years + 3.0 * (2.0 * PI * years).sin() + 0.3 * noise[week];
            writeln!(file, "{date},{ppm:.4}").unwrap();
        }
        week += 1;
    }
    file.flush().unwrap();
    file
}

#[test]
fn default_study_on_weekly_record() {
    let csv = weekly_co2_csv();
    let series = read_csv(csv.path(), &CsvOptions::with_columns("date", "co2")).unwrap();
    assert_eq!(series.len(), 2284);
    assert!(series.has_missing_values());

    let report = run_study(&series, &StudyConfig::default()).unwrap();

    // March 1958 through December 2001
    assert_eq!(report.n_observations, 526);
    assert_eq!(report.train_size, 478);
    assert_eq!(report.test_size, 48);
    assert_eq!(report.test_start, NaiveDate::from_ymd_opt(1998, 1, 1).unwrap());

    assert!(!report.stationarity.is_stationary());
    assert!(report.stationarity.p_value > 0.5);
    assert!(report.decomposition.seasonal_strength > 0.95);
    assert!(report.decomposition.resid_mean.abs() < 0.1);

    assert_eq!(report.ses.n_trials, 20);
    assert_eq!(report.des.n_trials, 100);
    assert_eq!(report.tes.n_trials, 512);

    assert!(report.des.final_mae < report.des.baseline_mae);
    assert!(report.tes.final_mae < report.tes.baseline_mae);
    assert!(report.tes.final_mae < 0.5);
    assert_eq!(report.best_model().0, "HoltWinters(additive)");
    assert_eq!(report.tes.forecast.len(), 48);
}

#[test]
fn configured_study_and_json_report() {
    let csv = weekly_co2_csv();
    let mut toml = NamedTempFile::new().unwrap();
    write!(
        toml,
        r#"
test_size = 24

[ses]
alpha = {{ start = 0.1, stop = 1.0, step = 0.1 }}

[tes]
alpha = {{ start = 0.2, stop = 1.0, step = 0.2 }}
beta = {{ start = 0.2, stop = 1.0, step = 0.2 }}
gamma = {{ start = 0.2, stop = 1.0, step = 0.2 }}
"#
    )
    .unwrap();

    let config = StudyConfig::from_path(toml.path()).unwrap();
    let series = read_csv(csv.path(), &CsvOptions::default()).unwrap();
    let report = run_study(&series, &config).unwrap();

    assert_eq!(report.test_size, 24);
    assert_eq!(report.test_start, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    assert_eq!(report.ses.n_trials, 10);
    assert_eq!(report.tes.n_trials, 64);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["test_size"], 24);
    assert_eq!(json["tes"]["forecast"].as_array().unwrap().len(), 24);
    assert!(json["tes"]["best"]["gamma"].is_number());
    assert_eq!(json["stationarity"]["verdict"], "NonStationary");
    assert_eq!(json["decomposition"]["model"], "additive");
}

#[test]
fn study_rejects_bad_split() {
    let csv = weekly_co2_csv();
    let series = read_csv(csv.path(), &CsvOptions::default()).unwrap();

    let config = StudyConfig {
        train_end: NaiveDate::from_ymd_opt(1950, 1, 1),
        ..StudyConfig::default()
    };
    assert!(run_study(&series, &config).is_err());
}
