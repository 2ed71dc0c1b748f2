use std::error::Error;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use tracing_subscriber::EnvFilter;

use ups_runtime_report::chart::ChartRenderer;
use ups_runtime_report::clock::FixedClock;
use ups_runtime_report::fonts;
use ups_runtime_report::layout::OverflowPolicy;
use ups_runtime_report::sink::DirectorySink;
use ups_runtime_report::snapshot::{PngFileSnapshot, RenderedChart, SnapshotProvider};
use ups_runtime_report::{format, runtime_table, KvaRating, ReportConfig, ReportExporter};

/// Renders UPS runtime charts and exports them as PDF reports.
///
/// Chart labels need `Roboto-Medium.ttf` under `assets/fonts` (next to the
/// binary or the crate) or in the directory named by `UPS_REPORT_FONTS_DIR`.
/// Without it the chart is drawn without text.
#[derive(Parser)]
#[command(author, version, about = "UPS runtime chart and report exporter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available kVA ratings and their runtime series.
    List,

    /// Render the runtime chart of one rating to a PNG file.
    Chart {
        /// Rating key, e.g. `2` or `2kVA`.
        #[arg(long)]
        kva: KvaRating,

        #[arg(long, default_value = "chart.png")]
        out: PathBuf,

        /// TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Export the PDF report of one rating.
    Export {
        /// Rating key, e.g. `2` or `2kVA`.
        #[arg(long)]
        kva: KvaRating,

        /// Use this image as the chart instead of rendering one.
        #[arg(long)]
        snapshot: Option<PathBuf>,

        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Report date as YYYY-MM-DD instead of today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Deployment root of the verification badge (directory or URL).
        #[arg(long)]
        asset_root: Option<String>,

        /// Keep everything on one page even when it overflows.
        #[arg(long)]
        unbounded: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List => {
            list();
            Ok(())
        }
        Commands::Chart { kva, out, config } => chart(kva, out, config),
        Commands::Export {
            kva,
            snapshot,
            out_dir,
            config,
            date,
            asset_root,
            unbounded,
        } => {
            export(ExportArgs {
                kva,
                snapshot,
                out_dir,
                config,
                date,
                asset_root,
                unbounded,
            })
            .await
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn list() {
    for dataset in runtime_table().iter() {
        let loads: Vec<String> = dataset
            .load_points()
            .iter()
            .map(|load| format::load_label(*load))
            .collect();
        println!("{}", dataset.rating().display_label());
        println!("  loads: {}", loads.join(", "));
        for series in dataset.series() {
            println!("  - {}", series.name());
        }
    }
}

fn chart(kva: KvaRating, out: PathBuf, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let config = ReportConfig::load(config.as_deref())?;
    fonts::install_chart_font();

    let dataset = runtime_table().get(kva);
    let image = ChartRenderer::new(config.chart.style()).render(dataset)?;
    image.save(&out)?;
    info!("wrote {}", out.display());
    Ok(())
}

struct ExportArgs {
    kva: KvaRating,
    snapshot: Option<PathBuf>,
    out_dir: PathBuf,
    config: Option<PathBuf>,
    date: Option<NaiveDate>,
    asset_root: Option<String>,
    unbounded: bool,
}

async fn export(args: ExportArgs) -> Result<(), Box<dyn Error>> {
    let mut config = ReportConfig::load(args.config.as_deref())?;
    if let Some(root) = args.asset_root {
        config = config.with_asset_root(root);
    }
    if args.unbounded {
        config = config.with_overflow(OverflowPolicy::Unbounded);
    }

    let provider: Box<dyn SnapshotProvider> = match args.snapshot {
        Some(path) => Box::new(PngFileSnapshot::new(path)),
        None => {
            fonts::install_chart_font();
            Box::new(RenderedChart::new(ChartRenderer::new(config.chart.style())))
        }
    };

    let mut exporter = ReportExporter::new(config).with_sink(DirectorySink::new(args.out_dir));
    if let Some(date) = args.date {
        exporter = exporter.with_clock(FixedClock::new(date));
    }

    let dataset = runtime_table().get(args.kva);
    match exporter
        .export_report(args.kva, dataset, provider.as_ref())
        .await
    {
        Some(summary) => {
            let location = summary
                .path
                .map(|path| path.display().to_string())
                .unwrap_or(summary.filename);
            println!(
                "{} ({} page(s){})",
                location,
                summary.page_count,
                if summary.verification_included {
                    ", verified"
                } else {
                    ""
                }
            );
            Ok(())
        }
        None => Err("no report was produced; see the log for details".into()),
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
