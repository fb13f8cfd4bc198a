//! Perf Engine Binary
//!
//! Ranks symbols of a close-price panel by risk-adjusted performance.
//!
//! # Usage
//!
//! ```bash
//! perf-engine --config config.yaml stats --ratio cagr_ui --top-n 10
//! perf-engine --start 2021-01-04 --offset 59 resolve
//! perf-engine --format csv lookback --lookbacks 15,30,60
//! perf-engine rolling --symbol SPY --window 30
//! perf-engine sample --samples 20 --lookback 60 --eval 20 --seed 7
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (overrides `observability.logging.level`)
//! - Any `${VAR}` referenced from the config file

use std::path::Path;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use perf_engine::config::{
    Config, DataConfig, ReportFormat, SamplingConfig, load_config, validate_config,
};
use perf_engine::metrics::perf_stats_moving_window;
use perf_engine::report::{render_range, render_rolling, render_stats, render_windows};
use perf_engine::telemetry::init_logging;
use perf_engine::windows::{lookback_windows, random_slices, sample_windows, split_fractions};
use perf_engine::{
    DateIndex, PriceMatrix, Ratio, WindowEvaluator, WindowSpec, compute_perf_stats,
    load_close_csv, resolve_range,
};

/// Config file read when `--config` is not given and the file exists.
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Parser)]
#[command(name = "perf-engine", version, about = "Performance statistics over daily close prices")]
struct Cli {
    /// Path to the YAML config file.
    #[arg(long, global = true)]
    config: Option<String>,

    /// Start limit, yyyy-mm-dd.
    #[arg(long, global = true)]
    start: Option<String>,

    /// End limit, yyyy-mm-dd.
    #[arg(long, global = true)]
    end: Option<String>,

    /// Rows to move from the given limit.
    #[arg(long, global = true, allow_negative_numbers = true)]
    offset: Option<i64>,

    /// Report format.
    #[arg(long, global = true, value_enum)]
    format: Option<FormatArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute stats over the resolved range and print the ranking.
    Stats {
        /// Ratio to rank by (cagr_ui, cagr_std, std_ui).
        #[arg(long)]
        ratio: Option<Ratio>,
        /// Number of symbols to print.
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Print the resolved date range only.
    Resolve,
    /// Evaluate trailing lookback windows ending at the resolved range end.
    Lookback {
        /// Lookbacks in rows, comma separated.
        #[arg(long, value_delimiter = ',')]
        lookbacks: Option<Vec<usize>>,
        /// Number of symbols to print per ratio.
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Moving-window stats for one symbol.
    Rolling {
        /// Symbol to analyse.
        #[arg(long)]
        symbol: Option<String>,
        /// Window length in rows.
        #[arg(long)]
        window: Option<usize>,
    },
    /// Random train / eval slices drawn from the training split of the range.
    Sample {
        /// Number of slices.
        #[arg(long)]
        samples: Option<usize>,
        /// Training rows per slice.
        #[arg(long)]
        lookback: Option<usize>,
        /// Evaluation rows per slice.
        #[arg(long)]
        eval: Option<usize>,
        /// RNG seed for reproducible slices.
        #[arg(long)]
        seed: Option<u64>,
        /// Number of symbols to print per ratio.
        #[arg(long)]
        top_n: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Table,
    Json,
    Csv,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Table => Self::Table,
            FormatArg::Json => Self::Json,
            FormatArg::Csv => Self::Csv,
        }
    }
}

impl Cli {
    /// Copy command-line overrides into the loaded config.
    fn apply_overrides(&self, config: &mut Config) {
        if self.start.is_some() {
            config.range.start.clone_from(&self.start);
        }
        if self.end.is_some() {
            config.range.end.clone_from(&self.end);
        }
        if self.offset.is_some() {
            config.range.offset = self.offset;
        }
        if let Some(format) = self.format {
            config.report.format = format.into();
        }

        match &self.command {
            Command::Stats { ratio, top_n } => {
                if let Some(ratio) = ratio {
                    config.report.ratio = *ratio;
                }
                if let Some(top_n) = top_n {
                    config.report.top_n = *top_n;
                }
            }
            Command::Resolve => {}
            Command::Lookback { lookbacks, top_n } => {
                if let Some(lookbacks) = lookbacks {
                    config.lookbacks.clone_from(lookbacks);
                }
                if let Some(top_n) = top_n {
                    config.report.top_n = *top_n;
                }
            }
            Command::Rolling { symbol, window } => {
                if symbol.is_some() {
                    config.rolling.symbol.clone_from(symbol);
                }
                if let Some(window) = window {
                    config.rolling.window = *window;
                }
            }
            Command::Sample {
                samples,
                lookback,
                eval,
                seed,
                top_n,
            } => {
                if let Some(samples) = samples {
                    config.sampling.samples = *samples;
                }
                if let Some(lookback) = lookback {
                    config.sampling.lookback = *lookback;
                }
                if let Some(eval) = eval {
                    config.sampling.eval = *eval;
                }
                if seed.is_some() {
                    config.sampling.seed = *seed;
                }
                if let Some(top_n) = top_n {
                    config.report.top_n = *top_n;
                }
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => load_config(Some(path)).with_context(|| format!("loading {path}"))?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_config(None).with_context(|| format!("loading {DEFAULT_CONFIG_PATH}"))?
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate_config(&config).context("invalid configuration")?;
    init_logging(&config.observability.logging)?;

    let matrix = load_matrix(&config.data)?;
    let calendar = build_calendar(&matrix, &config.data)?;
    let query = config.range.query()?;
    let range = resolve_range(&calendar, &query).context("resolving date range")?;
    info!(
        date_start = %range.date_start,
        date_end = %range.date_end,
        rows = range.row_count(),
        "Range resolved"
    );

    let format = config.report.format;
    let output = match &cli.command {
        Command::Resolve => render_range(&range, format)?,
        Command::Stats { .. } => {
            let (window, dropped) = matrix.slice(&range)?.drop_all_nan()?;
            if !dropped.symbols.is_empty() {
                info!(symbols = ?dropped.symbols, "Symbols without closes in range skipped");
            }
            let stats = compute_perf_stats(&window)?;
            let ranked = stats.rank_by(config.report.ratio, Some(config.report.top_n));
            if ranked.is_empty() {
                warn!(ratio = %config.report.ratio, "No symbol has a finite ratio in range");
            }
            render_stats(&ranked, format)?
        }
        Command::Lookback { .. } => {
            let calendar = calendar.slice(range.iloc_start, range.iloc_end)?;
            let specs = lookback_windows(&calendar, &config.lookbacks)?;
            let evaluator = WindowEvaluator::new(config.parallel.clone());
            evaluator.configure_thread_pool()?;
            let windows = evaluator
                .evaluate(&matrix, &calendar, &specs)
                .context("evaluating lookback windows")?;
            render_windows(&windows, config.report.top_n, format)?
        }
        Command::Rolling { .. } => {
            let symbol = rolling_symbol(&config)?;
            let window = matrix.slice(&range)?;
            let close = window
                .column(&symbol)
                .with_context(|| format!("symbol '{symbol}' not in price matrix"))?;
            let stats = perf_stats_moving_window(close, config.rolling.window)
                .with_context(|| format!("moving-window stats for {symbol}"))?;
            render_rolling(&symbol, window.dates(), &stats, format)?
        }
        Command::Sample { .. } => {
            let calendar = calendar.slice(range.iloc_start, range.iloc_end)?;
            let mut rng = match config.sampling.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            let (train, specs) = sample_specs(&calendar, &config.sampling, &mut rng)?;
            let evaluator = WindowEvaluator::new(config.parallel.clone());
            evaluator.configure_thread_pool()?;
            let windows = evaluator
                .evaluate(&matrix, &train, &specs)
                .context("evaluating sample slices")?;
            render_windows(&windows, config.report.top_n, format)?
        }
    };

    print!("{output}");
    Ok(())
}

/// Load the close panel and apply the configured cleaning passes.
fn load_matrix(data: &DataConfig) -> anyhow::Result<PriceMatrix> {
    let mut matrix = load_close_csv(&data.close_csv, &data.date_column)
        .with_context(|| format!("loading close prices from {}", data.close_csv))?;

    if data.fill_zero_rows {
        let (filled, report) = matrix.fill_zero_rows_from_previous();
        if !report.filled.is_empty() {
            info!(rows = report.filled.len(), "All-zero rows replaced by previous row");
        }
        matrix = filled;
    }
    if let Some(max_nan) = data.max_nan_per_column {
        let (kept, dropped) = matrix.drop_nan_columns(max_nan);
        if !dropped.is_empty() {
            info!(symbols = ?dropped, max_nan, "Dropped sparse symbols");
        }
        matrix = kept;
    }
    if let Some(max_nan) = data.max_nan_per_row {
        let (kept, dropped) = matrix.drop_nan_rows(max_nan)?;
        if !dropped.is_empty() {
            info!(rows = dropped.len(), max_nan, "Dropped sparse rows");
        }
        matrix = kept;
    }

    let (matrix, dropped) = matrix.drop_all_nan()?;
    if !dropped.is_empty() {
        info!(
            rows = dropped.dates.len(),
            symbols = ?dropped.symbols,
            "Dropped empty rows and symbols"
        );
    }
    info!(
        rows = matrix.n_rows(),
        symbols = matrix.n_cols(),
        "Close prices ready"
    );
    Ok(matrix)
}

/// Trading calendar: the reference symbol's listed dates, or every matrix row.
fn build_calendar(matrix: &PriceMatrix, data: &DataConfig) -> anyhow::Result<DateIndex> {
    match data.reference_symbol.as_deref() {
        Some(symbol) => matrix
            .listed_dates(symbol)
            .with_context(|| format!("building calendar from {symbol}")),
        None => Ok(matrix.index().clone()),
    }
}

/// Training calendar of the split and the windows of its random slices.
fn sample_specs(
    calendar: &DateIndex,
    sampling: &SamplingConfig,
    rng: &mut StdRng,
) -> anyhow::Result<(DateIndex, Vec<WindowSpec>)> {
    let split = split_fractions(
        calendar.len(),
        sampling.train,
        sampling.validation,
        sampling.test,
    )?;
    info!(
        train = split.train.len(),
        validation = split.validation.len(),
        test = split.test.len(),
        "Split resolved range"
    );
    let Some(last_train) = split.train.end.checked_sub(1) else {
        bail!("training split of {} rows is empty", calendar.len());
    };
    let train = calendar.slice(split.train.start, last_train)?;

    let slices = random_slices(
        train.len(),
        sampling.samples,
        sampling.lookback,
        sampling.eval,
        rng,
    )
    .context("drawing sample slices from the training split")?;
    let specs = sample_windows(&train, &slices)?;
    Ok((train, specs))
}

fn rolling_symbol(config: &Config) -> anyhow::Result<String> {
    match (&config.rolling.symbol, &config.data.reference_symbol) {
        (Some(symbol), _) | (None, Some(symbol)) => Ok(symbol.clone()),
        (None, None) => bail!("rolling needs --symbol, rolling.symbol or data.reference_symbol"),
    }
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
