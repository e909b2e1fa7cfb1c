use anyhow::{Context, Result};
use city_labels::{Config, MarkerStyle, RunInputs, run, run_selection_only};
use clap::Parser;
use log::{error, info, warn};
use std::{io::Write, path::PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Pick one city per country and render a labelled map for each",
    long_about = None
)]
struct Args {
    /// City dataset (CSV with country, city, lat, lng columns)
    #[arg(short = 'i', long = "cities")]
    cities: PathBuf,

    /// Configuration file path
    #[arg(short = 'c', long = "config", default_value = "config/default.toml")]
    config: PathBuf,

    /// World boundaries (GeoJSON) drawn behind each marker
    #[arg(short = 'b', long = "boundaries")]
    boundaries: Option<PathBuf>,

    /// Number of labels to select
    #[arg(short = 'n', long = "labels")]
    labels: Option<usize>,

    /// Output root directory
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,

    /// Make label text visible in the maps
    #[arg(long = "add-text")]
    add_text: bool,

    /// Marker style
    #[arg(short = 'm', long = "marker", value_enum)]
    marker: Option<MarkerStyle>,

    /// Outline label boxes (red when they hide the marker)
    #[arg(long = "draw-text-boxes")]
    draw_text_boxes: bool,

    /// Only write the selection CSV, do not render maps
    #[arg(long = "select-only")]
    select_only: bool,
}

fn main() {
    // Initialize logger - defaults to RUST_LOG if set, otherwise INFO
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let args = Args::parse();
    if let Err(e) = run_cli(&args) {
        error!("Error: {e}");

        // Provide helpful hints for common errors
        use std::io::ErrorKind;
        for cause in e.chain().skip(1) {
            if let Some(ioe) = cause.downcast_ref::<std::io::Error>() {
                match ioe.kind() {
                    ErrorKind::NotFound => {
                        error!("Hint: Check the --cities and --boundaries paths.");
                        break;
                    }
                    ErrorKind::PermissionDenied => {
                        error!("Hint: Run in a writable directory or set CITY_LABELS_OUTPUT_DIR.");
                        break;
                    }
                    _ => {}
                }
            }
        }
        let _ = std::io::stderr().flush();
        std::process::exit(1);
    }
}

fn run_cli(args: &Args) -> Result<()> {
    let config = load_config(args)?;

    let inputs = RunInputs {
        cities: args.cities.clone(),
        boundaries: args.boundaries.clone(),
    };
    info!("Output directory: {}", config.output.output_dir.display());

    if args.select_only {
        let (selection, path) = run_selection_only(&config, &inputs)
            .with_context(|| format!("selecting cities from {}", args.cities.display()))?;
        info!(
            "{} labels (+{} pinned) written to {}",
            selection.labels.len(),
            selection.pinned.len(),
            path.display()
        );
        return Ok(());
    }

    let report = run(&config, &inputs)
        .with_context(|| format!("rendering labels from {}", args.cities.display()))?;
    if report.is_underfilled() {
        warn!(
            "Only {} of {} labels could be selected",
            report.selected, report.requested
        );
    }
    if let Some(path) = &report.manifest {
        info!(
            "Remember to resave {} with Western (Windows 1252) encoding if the layout tool needs it",
            path.display()
        );
    }
    Ok(())
}

/// File settings, then `CITY_LABELS_OUTPUT_DIR`, then command-line flags.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if args.config.exists() {
        Config::load_from_file(&args.config)
            .with_context(|| format!("loading config {}", args.config.display()))?
    } else {
        warn!(
            "Config file not found: {}, using default settings",
            args.config.display()
        );
        Config::default()
    };
    config.apply_env()?;

    if let Some(n) = args.labels {
        config.selection.number_of_labels = n;
    }
    if let Some(out) = &args.out {
        config.output.output_dir = out.clone();
    }
    if let Some(marker) = args.marker {
        config.render.marker = marker;
    }
    if args.add_text {
        config.render.add_text = true;
    }
    if args.draw_text_boxes {
        config.render.draw_text_boxes = true;
    }
    config.validate()?;
    Ok(config)
}
