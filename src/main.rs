//! # smoothcast
//!
//! Command-line interface for the smoothcast library.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use smoothcast::config::StudyConfig;
use smoothcast::core::{MissingValuePolicy, TimeSeries};
use smoothcast::decomposition::{seasonal_decompose, DecompositionModel};
use smoothcast::io::{read_csv, CsvOptions};
use smoothcast::models::exponential::{
    DoubleExponentialSmoothing, HoltWinters, SeasonalType, SimpleExponentialSmoothing,
};
use smoothcast::models::BoxedForecaster;
use smoothcast::study::{run_study, DecompositionSummary};
use smoothcast::validation::{adf_test, AdfConfig, AdfRegression, StationarityVerdict};

#[derive(Parser)]
#[command(name = "smoothcast")]
#[command(about = "Exponential smoothing forecasts and diagnostics", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis: diagnostics, grid search and holdout errors
    Study {
        #[command(flatten)]
        data: DataArgs,

        /// Study configuration (TOML); defaults reproduce the CO2 analysis
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Augmented Dickey-Fuller test
    Stationarity {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long, default_value = "0.05")]
        significance: f64,

        /// Include a linear time trend in the test regression
        #[arg(long)]
        trend: bool,
    },

    /// Classical seasonal decomposition
    Decompose {
        #[command(flatten)]
        data: DataArgs,

        #[arg(short, long, default_value = "12")]
        period: usize,

        #[arg(short, long, value_enum, default_value = "additive")]
        model: Seasonality,
    },

    /// Fit one model on the whole series and forecast ahead
    Forecast {
        #[command(flatten)]
        data: DataArgs,

        #[arg(short, long, value_enum)]
        model: ModelKind,

        /// Number of periods to forecast
        #[arg(long)]
        horizon: usize,

        /// Level weight; estimated when omitted
        #[arg(long)]
        alpha: Option<f64>,

        /// Trend weight (des, tes)
        #[arg(long)]
        beta: Option<f64>,

        /// Seasonal weight (tes)
        #[arg(long)]
        gamma: Option<f64>,

        #[arg(short, long, default_value = "12")]
        period: usize,

        #[arg(long, value_enum, default_value = "additive")]
        seasonality: Seasonality,

        /// Prediction interval coverage, e.g. 0.95
        #[arg(long)]
        level: Option<f64>,
    },
}

#[derive(Args)]
struct DataArgs {
    /// Input CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Date column, by header name or zero-based index
    #[arg(long, default_value = "0")]
    date_column: String,

    /// Value column, by header name or zero-based index
    #[arg(long, default_value = "1")]
    value_column: String,

    /// Average observations into calendar months first
    #[arg(long)]
    monthly: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelKind {
    Ses,
    Des,
    Tes,
}

#[derive(Clone, Copy, ValueEnum)]
enum Seasonality {
    Additive,
    Multiplicative,
}

impl From<Seasonality> for SeasonalType {
    fn from(s: Seasonality) -> Self {
        match s {
            Seasonality::Additive => SeasonalType::Additive,
            Seasonality::Multiplicative => SeasonalType::Multiplicative,
        }
    }
}

impl From<Seasonality> for DecompositionModel {
    fn from(s: Seasonality) -> Self {
        match s {
            Seasonality::Additive => DecompositionModel::Additive,
            Seasonality::Multiplicative => DecompositionModel::Multiplicative,
        }
    }
}

#[derive(Serialize)]
struct ForecastPoint {
    timestamp: chrono::DateTime<chrono::Utc>,
    forecast: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upper: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "smoothcast=debug"
    } else {
        "smoothcast=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .init();

    match cli.command {
        Commands::Study {
            data,
            config,
            output,
        } => {
            let mut config = match config {
                Some(path) => StudyConfig::from_path(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => StudyConfig::default(),
            };
            // The study resamples and fills gaps itself
            config.resample_monthly |= data.monthly;
            let series = load(&data, false)?;
            let report = run_study(&series, &config).context("study failed")?;
            let rendered = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => fs::write(&path, rendered)
                    .with_context(|| format!("writing report to {}", path.display()))?,
                None => println!("{rendered}"),
            }
        }

        Commands::Stationarity {
            data,
            significance,
            trend,
        } => {
            let series = load(&data, true)?;
            let config = AdfConfig {
                regression: if trend {
                    AdfRegression::ConstantTrend
                } else {
                    AdfRegression::Constant
                },
                ..AdfConfig::default()
            };
            let result = adf_test(series.values(), &config)?;
            let verdict = StationarityVerdict::from_adf(&result, significance);
            eprintln!("{verdict}");
            print_json(&json!({ "verdict": verdict, "adf": result }))?;
        }

        Commands::Decompose {
            data,
            period,
            model,
        } => {
            let series = load(&data, true)?;
            let decomposition = seasonal_decompose(series.values(), period, model.into())?;
            print_json(&json!({
                "summary": DecompositionSummary::from(&decomposition),
                "timestamps": series.timestamps(),
                "observed": decomposition.observed,
                "trend": decomposition.trend,
                "seasonal": decomposition.seasonal,
                "resid": decomposition.resid,
            }))?;
        }

        Commands::Forecast {
            data,
            model,
            horizon,
            alpha,
            beta,
            gamma,
            period,
            seasonality,
            level,
        } => {
            let series = load(&data, true)?;
            let mut forecaster = build_model(model, alpha, beta, gamma, period, seasonality.into())?;
            forecaster
                .fit(&series)
                .with_context(|| format!("fitting {}", forecaster.name()))?;

            let forecast = match level {
                Some(level) => forecaster.predict_with_intervals(horizon, level)?,
                None => forecaster.predict(horizon)?,
            };
            let timestamps = series.future_timestamps(horizon)?;
            let points: Vec<ForecastPoint> = timestamps
                .into_iter()
                .enumerate()
                .map(|(i, timestamp)| ForecastPoint {
                    timestamp,
                    forecast: forecast.primary()[i],
                    lower: forecast.lower().map(|l| l[i]),
                    upper: forecast.upper().map(|u| u[i]),
                })
                .collect();
            print_json(&json!({ "model": forecaster.name(), "forecast": points }))?;
        }
    }

    Ok(())
}

fn load(data: &DataArgs, prepare: bool) -> anyhow::Result<TimeSeries> {
    let options = CsvOptions::with_columns(&data.date_column, &data.value_column);
    let mut series = read_csv(&data.input, &options)
        .with_context(|| format!("reading {}", data.input.display()))?;

    if !prepare {
        return Ok(series);
    }
    if data.monthly {
        series = series.resample_monthly_mean()?;
    }
    if series.has_missing_values() {
        series = series.sanitized(MissingValuePolicy::BackwardFill)?;
        if series.has_missing_values() {
            bail!("series ends with missing values that cannot be back-filled");
        }
    }
    Ok(series)
}

fn build_model(
    kind: ModelKind,
    alpha: Option<f64>,
    beta: Option<f64>,
    gamma: Option<f64>,
    period: usize,
    seasonal_type: SeasonalType,
) -> anyhow::Result<BoxedForecaster> {
    let model: BoxedForecaster = match (kind, alpha, beta, gamma) {
        (ModelKind::Ses, Some(a), _, _) => Box::new(SimpleExponentialSmoothing::new(a)),
        (ModelKind::Ses, None, _, _) => Box::new(SimpleExponentialSmoothing::auto()),
        (ModelKind::Des, Some(a), Some(b), _) => Box::new(DoubleExponentialSmoothing::new(a, b)),
        (ModelKind::Des, None, None, _) => Box::new(DoubleExponentialSmoothing::auto()),
        (ModelKind::Tes, Some(a), Some(b), Some(g)) => {
            Box::new(HoltWinters::new(a, b, g, period, seasonal_type))
        }
        (ModelKind::Tes, None, None, None) => Box::new(HoltWinters::auto(period, seasonal_type)),
        _ => bail!("give either all smoothing weights of the model or none"),
    };
    Ok(model)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_take_all_weights_or_none() {
        let model = build_model(
            ModelKind::Tes,
            Some(0.3),
            Some(0.1),
            Some(0.2),
            12,
            SeasonalType::Additive,
        )
        .unwrap();
        assert_eq!(model.name(), "HoltWinters(additive)");

        let model =
            build_model(ModelKind::Des, None, None, None, 12, SeasonalType::Additive).unwrap();
        assert_eq!(model.name(), "DoubleExponentialSmoothing");

        let model =
            build_model(ModelKind::Ses, Some(0.5), None, None, 12, SeasonalType::Additive).unwrap();
        assert_eq!(model.name(), "SimpleExponentialSmoothing");

        assert!(build_model(
            ModelKind::Tes,
            Some(0.3),
            None,
            Some(0.2),
            12,
            SeasonalType::Multiplicative
        )
        .is_err());
        assert!(
            build_model(ModelKind::Des, Some(0.3), None, None, 12, SeasonalType::Additive).is_err()
        );
    }

    #[test]
    fn forecast_command_parses() {
        let cli = Cli::try_parse_from([
            "smoothcast",
            "forecast",
            "--input",
            "co2.csv",
            "--model",
            "tes",
            "--horizon",
            "48",
            "--seasonality",
            "multiplicative",
        ])
        .unwrap();

        match cli.command {
            Commands::Forecast {
                model,
                horizon,
                period,
                seasonality,
                alpha,
                ..
            } => {
                assert!(matches!(model, ModelKind::Tes));
                assert_eq!(horizon, 48);
                assert_eq!(period, 12);
                assert!(matches!(seasonality, Seasonality::Multiplicative));
                assert!(alpha.is_none());
            }
            _ => panic!("expected the forecast command"),
        }
    }
}
