use anyhow::{Context, Result};
use btreport::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "btreport")]
#[command(about = "Plots and summarizes long/short backtest results", long_about = None)]
struct Cli {
    //json configuration file, flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    //path to the results csv (default out/results.csv)
    #[arg(long)]
    input: Option<PathBuf>,

    //path of the chart image (default out/cumulative_returns.png)
    #[arg(long)]
    output: Option<PathBuf>,

    //chart resolution in dots per inch (default 300)
    #[arg(long)]
    dpi: Option<u32>,

    //skip the chart and only print statistics
    #[arg(long)]
    no_plot: bool,

    //create the chart's output directory if it is missing
    #[arg(long)]
    create_dirs: bool,

    //return periods per year for sharpe annualization (default 252)
    #[arg(long)]
    periods_per_year: Option<f64>,

    //also write the drawdown series to this csv
    #[arg(long)]
    drawdown_csv: Option<PathBuf>,

    //print the extended statistics table after the summary
    #[arg(long)]
    table: bool,

    //increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = build_config(&cli)?;
    let show_table = cli.table;

    run_report(&config, show_table)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_config(cli: &Cli) -> Result<ReportConfig> {
    let mut config = match &cli.config {
        Some(path) => ReportConfig::from_json_file(path)
            .context(format!("Failed to load configuration from {:?}", path))?,
        None => ReportConfig::default(),
    };

    if let Some(input) = &cli.input {
        config.input_path = input.clone();
    }
    if let Some(output) = &cli.output {
        config.output_path = output.clone();
    }
    if let Some(dpi) = cli.dpi {
        config.dpi = dpi;
    }
    if cli.no_plot {
        config.plot = false;
    }
    if cli.create_dirs {
        config.create_dirs = true;
    }
    if let Some(periods) = cli.periods_per_year {
        config.periods_per_year = periods;
    }
    if let Some(path) = &cli.drawdown_csv {
        config.drawdown_csv = Some(path.clone());
    }

    config.validate().context("Invalid report configuration")?;
    Ok(config)
}

fn run_report(config: &ReportConfig, show_table: bool) -> Result<()> {
    //load data
    info!(path = %config.input_path.display(), "loading results");
    let table = load_results(&config.input_path).context(format!(
        "Failed to load results from {:?}",
        config.input_path
    ))?;
    info!(rows = table.len(), "results loaded");

    //plot, keeping the failure so the statistics still get printed
    let plot_result = if config.plot {
        render_cumulative_returns(&table, &config.chart_config())
    } else {
        Ok(())
    };
    if let Err(err) = &plot_result {
        error!(error = %err, "chart was not produced");
    }

    //summarize
    let stats = SummaryStats::from_table_with_periods(&table, config.periods_per_year)
        .context("Failed to summarize results")?;
    stats.print();

    if show_table {
        println!();
        stats.pretty_print_table();
    }

    if let Some(path) = &config.drawdown_csv {
        write_drawdown_csv(&drawdown_series(&table), path)
            .context(format!("Failed to write drawdown series to {:?}", path))?;
        info!(path = %path.display(), "drawdown series saved");
    }

    plot_result.context(format!(
        "Failed to save chart to {:?}",
        config.output_path
    ))?;

    if !stats.all_defined() {
        warn!("one or more statistics are undefined");
        anyhow::bail!("Degenerate statistics: results do not support every summary metric");
    }

    Ok(())
}
