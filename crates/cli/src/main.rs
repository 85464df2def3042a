//! fieldscan CLI - field assessment from multispectral band stacks

mod insight;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fieldscan_algorithms::imagery::{
    compute_indices, interpretation, interpretation_for_name, EngineOptions, IndexSet,
    SessionMetadata, SpectralIndex, REQUIRED_BANDS,
};
use fieldscan_algorithms::insight::{request_insights, Insight};
use fieldscan_algorithms::AnalysisSession;
use fieldscan_colormap::{auto_params, write_png, ColorScheme, ColormapParams};
use fieldscan_core::io::write_band;
use fieldscan_core::stack::{load_band_stack_with, BandStack, LoaderOptions};

use insight::{ChatCompletionClient, InsightArgs};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "fieldscan")]
#[command(author, version, about = "Field assessment from satellite band stacks", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the bands come from and how they feed the engine.
#[derive(Args)]
struct StackArgs {
    /// Directory holding one GeoTIFF per band (e.g. T31_B04.tif)
    dir: PathBuf,

    /// Rescale every band to [0, 1] before computing indices
    #[arg(long)]
    normalize: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute all indices and print the field summary
    Analyze {
        #[command(flatten)]
        stack: StackArgs,
        /// Moisture descriptor reported in the summary
        #[arg(long, default_value = "high")]
        moisture: String,
        /// Valid-pixel percentage for the summary (default: measured from the bands)
        #[arg(long)]
        valid_pixels: Option<f64>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        /// Ask the insight endpoint for advice on the summary
        #[arg(long)]
        insights: bool,
        #[command(flatten)]
        insight: InsightArgs,
    },
    /// Show statistics for indices and optionally export them as GeoTIFF
    Index {
        #[command(flatten)]
        stack: StackArgs,
        /// Only this index (short or full name); default is the whole catalog
        #[arg(short, long)]
        index: Option<SpectralIndex>,
        /// Write each computed index to <OUT>/<NAME>.tif
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render one index as a color-mapped PNG
    Render {
        #[command(flatten)]
        stack: StackArgs,
        /// Index to render (short or full name)
        index: SpectralIndex,
        /// Output PNG file
        output: PathBuf,
        /// Color scheme: rdylgn, ndvi, blue-white-red, water, grayscale
        #[arg(short, long, default_value = "rdylgn")]
        scheme: ColorScheme,
        /// Lower end of the color range
        #[arg(long, default_value = "-1.0", allow_hyphen_values = true)]
        min: f64,
        /// Upper end of the color range
        #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
        max: f64,
        /// Fit the color range to the data instead of --min/--max
        #[arg(long)]
        auto_range: bool,
    },
    /// Print the interpretation guide for an index
    Interpret {
        /// Index name; omit to list the catalog
        name: Option<String>,
    },
    /// List the band files of a directory and their statistics
    Bands {
        /// Directory holding the band files
        dir: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn engine_options(args: &StackArgs) -> EngineOptions {
    EngineOptions {
        normalize_inputs: args.normalize,
        ..Default::default()
    }
}

fn read_stack(dir: &Path) -> Result<BandStack> {
    let pb = spinner("Reading bands...");
    let stack = load_band_stack_with(dir, &LoaderOptions::default());
    pb.finish_and_clear();
    let stack = stack.with_context(|| format!("Failed to load bands from {}", dir.display()))?;
    info!("Input: {} bands, {} x {}", stack.len(), stack.shape().1, stack.shape().0);
    Ok(stack)
}

fn run_indices(args: &StackArgs, selection: &[SpectralIndex]) -> Result<IndexSet> {
    let stack = read_stack(&args.dir)?;
    let pb = spinner("Computing indices...");
    let set = compute_indices(&stack, selection, &engine_options(args));
    pb.finish_and_clear();
    set.context("Failed to compute indices")
}

fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        "undefined".to_string()
    } else {
        format!("{:.4}", v)
    }
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Commands ───────────────────────────────────────────────────────────

fn analyze(
    stack_args: StackArgs,
    moisture: String,
    valid_pixels: Option<f64>,
    json: bool,
    insights: Option<InsightArgs>,
) -> Result<()> {
    let stack = read_stack(&stack_args.dir)?;
    let valid_pixels = valid_pixels.unwrap_or_else(|| stack.valid_pixel_percentage());
    let mut session = AnalysisSession::new(stack, engine_options(&stack_args));

    let start = Instant::now();
    let pb = spinner("Computing indices...");
    let computed = session.compute_indices().map(|set| set.degraded().collect::<Vec<_>>());
    pb.finish_and_clear();
    for index in computed.context("Failed to compute indices")? {
        warn!("{} could not be computed; reported as undefined", index);
    }

    let metadata = SessionMetadata {
        moisture,
        valid_pixels,
    };
    let summary = session
        .summarize(metadata)
        .context("Failed to summarize indices")?;
    info!("Analysis finished in {:.2?}", start.elapsed());

    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{}", summary);
    }

    if let Some(args) = insights {
        let report = summary.report();
        let insight = match ChatCompletionClient::new(args) {
            Ok(client) => {
                let pb = spinner("Requesting insights...");
                let insight = request_insights(&client, &report);
                pb.finish_and_clear();
                insight
            }
            Err(e) => Insight::Unavailable(e.to_string()),
        };
        match insight {
            Insight::Generated(text) => println!("\nFARMER INSIGHTS:\n{}", text),
            Insight::Unavailable(reason) => println!("\nInsights unavailable: {}", reason),
        }
    }
    Ok(())
}

fn index(stack_args: StackArgs, only: Option<SpectralIndex>, out: Option<PathBuf>) -> Result<()> {
    let selection: Vec<SpectralIndex> = match only {
        Some(index) => vec![index],
        None => SpectralIndex::ALL.to_vec(),
    };
    let set = run_indices(&stack_args, &selection)?;

    for (index, outcome) in set.iter() {
        let stats = outcome.statistics();
        println!("{}", index.full_name());
        if let Some(reason) = outcome.degradation_reason() {
            println!("  Not computed: {}", reason);
        }
        println!("  Mean: {}", fmt_value(stats.mean));
        println!("  Min: {}", fmt_value(stats.min));
        println!("  Max: {}", fmt_value(stats.max));
        println!(
            "  Valid pixels: {} ({:.1}%)",
            stats.valid_count,
            stats.valid_percentage()
        );
        if only.is_some() {
            println!("\n{}", interpretation(index));
        }
    }

    if let Some(out) = out {
        std::fs::create_dir_all(&out)
            .with_context(|| format!("Failed to create {}", out.display()))?;
        let pb = spinner("Writing indices...");
        let start = Instant::now();
        for (index, outcome) in set.iter() {
            let path = out.join(format!("{}.tif", index.short_name()));
            write_band(outcome.raster(), &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        pb.finish_and_clear();
        done(&format!("{} indices", set.len()), &out, start.elapsed());
    }
    Ok(())
}

fn render(
    stack_args: StackArgs,
    index: SpectralIndex,
    output: PathBuf,
    params: ColormapParams,
    auto_range: bool,
) -> Result<()> {
    let set = run_indices(&stack_args, &[index])?;
    let raster = set
        .require(index)
        .context("Index missing from engine output")?;
    let params = if auto_range {
        auto_params(raster, params.scheme)
    } else {
        params
    };

    let start = Instant::now();
    write_png(raster, &params, &output).context("Failed to write PNG")?;
    done(index.short_name(), &output, start.elapsed());
    Ok(())
}

fn interpret(name: Option<String>) {
    match name {
        Some(name) => println!("{}", interpretation_for_name(&name)),
        None => {
            for index in SpectralIndex::ALL {
                println!("{:<6} {}", index.short_name(), index.full_name());
            }
        }
    }
}

fn bands(dir: PathBuf) -> Result<()> {
    let stack = read_stack(&dir)?;
    let (rows, cols) = stack.shape();

    println!("Directory: {}", dir.display());
    println!("Bands: {} ({} x {})", stack.len(), cols, rows);
    for (slot, band) in stack.bands().iter().enumerate() {
        let stats = band.raster.statistics();
        println!(
            "  [{}] {:<24} min {:>10} max {:>10} mean {:>10} valid {:.1}%",
            slot,
            band.name,
            fmt_value(stats.min),
            fmt_value(stats.max),
            fmt_value(stats.mean),
            stats.valid_percentage()
        );
    }
    println!("Valid pixels: {:.1}%", stack.valid_pixel_percentage());
    if let Err(e) = stack.require(REQUIRED_BANDS) {
        println!("Index computation unavailable: {}", e);
    }
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Analyze {
            stack,
            moisture,
            valid_pixels,
            json,
            insights,
            insight,
        } => analyze(
            stack,
            moisture,
            valid_pixels,
            json,
            insights.then_some(insight),
        ),

        Commands::Index { stack, index: only, out } => index(stack, only, out),

        Commands::Render {
            stack,
            index,
            output,
            scheme,
            min,
            max,
            auto_range,
        } => render(
            stack,
            index,
            output,
            ColormapParams::with_range(scheme, min, max),
            auto_range,
        ),

        Commands::Interpret { name } => {
            interpret(name);
            Ok(())
        }

        Commands::Bands { dir } => bands(dir),
    }
}
