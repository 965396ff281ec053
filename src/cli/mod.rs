//! Command-line interface for the terrain pipeline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::{loaders, writers};
use crate::processors::{self, BoundingExtent, Denoiser};
use crate::visualization;
use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "terrain-prep")]
#[command(about = "Terrain data normalization and elevation denoising", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align mask exports onto drainage/NDVI data and merge a location
    Merge {
        /// Directory containing <location>data/ folders
        data_dir: PathBuf,
        /// Location name (e.g. cbd, orakei, penrose)
        location: String,
        /// Output JSON path (defaults to <data_dir>/<location>_all.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also save a scatter plot of the merged data
        #[arg(long)]
        plot: bool,
    },

    /// Rescale merged data into the location's terrain rectangle
    ToTerrain {
        /// Merged terrain JSON file
        input: PathBuf,
        /// Location name used to look up the terrain size
        location: String,
        /// Output JSON path (defaults to <location>_unity.json next to input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also save a plot of the rescaled water points
        #[arg(long)]
        plot: bool,
    },

    /// Remove elevation spikes from a TIFF raster
    Denoise {
        /// Input TIFF file
        input: PathBuf,
        /// Location name used to look up the threshold
        location: String,
        /// Output directory for pass rasters (defaults to input directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Override the configured number of passes
        #[arg(long)]
        iterations: Option<usize>,
    },

    /// Convert hourly precipitation into engine rainfall records
    Weather {
        /// Hourly forecast-archive JSON export
        input: PathBuf,
        /// Output JSON path (defaults to <input stem>_processed.json next to input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also save a plot of rainfall around the wettest hour
        #[arg(long)]
        plot: bool,
    },

    /// Write the default configuration as YAML
    InitConfig {
        /// Output YAML path
        path: PathBuf,
    },
}

/// Upper bound on points drawn in verification plots
const MAX_PLOT_POINTS: usize = 1_000_000;

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Create a bar counting denoise passes
fn create_pass_bar(passes: usize) -> ProgressBar {
    let pb = ProgressBar::new(passes as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos}/{len} {msg}") {
        pb.set_style(style);
    }
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            let head: String = value.chars().take(36).collect();
            format!("{}...", head)
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Merge { data_dir, location, output, plot } => {
            cmd_merge(&data_dir, &location, output, plot, &config)
        }
        Commands::ToTerrain { input, location, output, plot } => {
            cmd_to_terrain(&input, &location, output, plot, &config)
        }
        Commands::Denoise { input, location, output_dir, iterations } => {
            cmd_denoise(&input, &location, output_dir, iterations, &config)
        }
        Commands::Weather { input, output, plot } => cmd_weather(&input, output, plot, &config),
        Commands::InitConfig { path } => cmd_init_config(&path, &config),
    });

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            let config = PipelineConfig::from_yaml(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            info!("Loaded config from: {}", path.display());
            Ok(config)
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// Directory containing `path`, or `.` for bare file names.
fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn cmd_merge(
    data_dir: &Path,
    location: &str,
    output: Option<PathBuf>,
    plot: bool,
    config: &PipelineConfig,
) -> Result<()> {
    let start = Instant::now();
    let output = output.unwrap_or_else(|| data_dir.join(format!("{location}_all.json")));

    println!("Merging terrain data for {}...", location);
    println!("Data directory: {}", data_dir.display());

    let spinner = create_spinner("Aligning and merging datasets...");
    let merged = processors::prepare_location(data_dir, location, &config.merge.tags);
    spinner.finish_and_clear();
    let merged = merged.with_context(|| format!("Failed to prepare location {location}"))?;

    writers::write_terrain_json(&output, &merged)?;

    let mut items = vec![
        ("Location", location.to_string()),
        ("Output file", output.display().to_string()),
        ("Records", merged.len().to_string()),
    ];

    if plot {
        let plot_path = output.with_file_name(format!("{location}_data.png"));
        let drawn = visualization::plot_terrain(&plot_path, &merged.records, None, MAX_PLOT_POINTS)
            .with_context(|| format!("Failed to plot {}", plot_path.display()))?;
        items.push(("Plot", plot_path.display().to_string()));
        items.push(("Points plotted", drawn.to_string()));
    }

    items.push(("Duration", format!("{:.2?}", start.elapsed())));
    print_summary("Merge Complete", &items);
    Ok(())
}

fn cmd_to_terrain(
    input: &Path,
    location: &str,
    output: Option<PathBuf>,
    plot: bool,
    config: &PipelineConfig,
) -> Result<()> {
    let start = Instant::now();

    // Look up the rectangle before touching any files
    let rect = config.terrain_rect(location)?;
    let output = output.unwrap_or_else(|| parent_dir(input).join(format!("{location}_unity.json")));

    println!("Loading data for {}", location);
    let mut data = loaders::load_terrain_json(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let transform = processors::rescale_to_terrain(&mut data, rect)
        .with_context(|| format!("Failed to rescale {}", input.display()))?;

    writers::write_terrain_json(&output, &data)?;

    let mut items = vec![
        ("Location", location.to_string()),
        ("Output file", output.display().to_string()),
        ("Records", data.len().to_string()),
        ("X equation", format!("x2 = {}", transform.x)),
        ("Y equation", format!("y2 = {}", transform.y)),
    ];

    if plot {
        let plot_path = output.with_file_name(format!("{location}_verify.png"));
        let bounds = BoundingExtent::from_rect(rect);
        let drawn = visualization::plot_terrain(
            &plot_path,
            data.with_category("water"),
            Some(bounds),
            MAX_PLOT_POINTS,
        )
        .with_context(|| format!("Failed to plot {}", plot_path.display()))?;
        items.push(("Verify plot", plot_path.display().to_string()));
        items.push(("Points plotted", drawn.to_string()));
    }

    items.push(("Duration", format!("{:.2?}", start.elapsed())));
    print_summary("Terrain Rescale Complete", &items);
    Ok(())
}

fn cmd_denoise(
    input: &Path,
    location: &str,
    output_dir: Option<PathBuf>,
    iterations: Option<usize>,
    config: &PipelineConfig,
) -> Result<()> {
    let start = Instant::now();

    let mut denoise_config = config.denoise_for(location)?;
    if let Some(iterations) = iterations {
        denoise_config.iterations = iterations;
    }
    let output_dir = output_dir.unwrap_or_else(|| parent_dir(input));

    println!("Denoising raster for {}...", location);
    println!("Input: {}", input.display());
    println!("Output directory: {}", output_dir.display());
    println!("Upper bound: {}", denoise_config.upper_bound);
    println!("Passes: {}", denoise_config.iterations);

    let grid = loaders::load_raster_tiff(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let (width, height) = (grid.width(), grid.height());

    let denoiser = Denoiser::new(denoise_config);
    let bar = create_pass_bar(denoiser.config().iterations);
    let mut total_changed = 0;
    let mut outputs = Vec::new();

    let result = denoiser.run_with(grid, |pass| -> Result<()> {
        let path = output_dir.join(format!("{location}pass{}.tif", pass.pass));
        writers::write_raster_tiff(&path, pass.grid)?;

        total_changed += pass.stats.changed();
        bar.set_message(format!("{} cells repaired", pass.stats.changed()));
        bar.inc(1);
        outputs.push(path);
        Ok(())
    });
    bar.finish_and_clear();
    result?;

    let last = outputs
        .last()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());

    print_summary(
        "Denoise Complete",
        &[
            ("Input file", input.display().to_string()),
            ("Raster size", format!("{}x{}", width, height)),
            ("Passes written", outputs.len().to_string()),
            ("Last pass", last),
            ("Cells repaired", total_changed.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}

fn cmd_weather(
    input: &Path,
    output: Option<PathBuf>,
    plot: bool,
    config: &PipelineConfig,
) -> Result<()> {
    let start = Instant::now();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "weather".to_string());
    let output = output.unwrap_or_else(|| parent_dir(input).join(format!("{stem}_processed.json")));

    println!("Processing rainfall from {}", input.display());
    let weather = loaders::load_hourly_weather_json(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let data = processors::rainfall_series(&weather)
        .with_context(|| format!("Invalid hourly series in {}", input.display()))?;

    writers::write_weather_json(&output, &data)?;

    let mut items = vec![
        ("Output file", output.display().to_string()),
        ("Hours", data.len().to_string()),
    ];

    if let Some(peak) = processors::peak_hour(&data) {
        let record = data.records[peak];
        items.push(("Peak hour (unix)", record.time.to_string()));
        items.push(("Peak rainfall", format!("{}mm", record.rainfall)));

        if plot {
            let plot_path = output.with_file_name(format!("{stem}_rainfall.png"));
            let window = processors::peak_window(&data, peak, config.weather.plot_window_hours);
            visualization::plot_rainfall(&plot_path, window)
                .with_context(|| format!("Failed to plot {}", plot_path.display()))?;
            items.push(("Plot", plot_path.display().to_string()));
        }
    }

    items.push(("Duration", format!("{:.2?}", start.elapsed())));
    print_summary("Weather Processing Complete", &items);
    Ok(())
}

fn cmd_init_config(path: &Path, config: &PipelineConfig) -> Result<()> {
    config
        .to_yaml(path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    print_summary(
        "Config Written",
        &[
            ("Output file", path.display().to_string()),
            ("Locations", config.locations.len().to_string()),
        ],
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::points::{PointRecord, TerrainData};
    use crate::core::raster::RasterGrid;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_denoise() {
        let cli = Cli::try_parse_from([
            "terrain-prep",
            "-vv",
            "denoise",
            "orakei.tif",
            "orakei",
            "--iterations",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Denoise { location, iterations, .. } => {
                assert_eq!(location, "orakei");
                assert_eq!(iterations, Some(2));
            }
            _ => panic!("expected denoise command"),
        }
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("a.tif")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("data/a.tif")), PathBuf::from("data"));
    }

    #[test]
    fn test_cmd_to_terrain_writes_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("cbd_all.json");
        let data = TerrainData::new(vec![
            PointRecord::new(10.0, 10.0, "water"),
            PointRecord::new(20.0, 30.0, "catch"),
        ]);
        writers::write_terrain_json(&input, &data).unwrap();

        cmd_to_terrain(&input, "cbd", None, false, &PipelineConfig::default()).unwrap();

        let out = loaders::load_terrain_json(dir.path().join("cbd_unity.json")).unwrap();
        let close = |a: f64, b: f64| (a - b).abs() < 1e-6;
        assert!(close(out.records[0].x, 0.0) && close(out.records[0].y, 3796.0));
        assert!(close(out.records[1].x, 3376.0) && close(out.records[1].y, 0.0));
    }

    #[test]
    fn test_cmd_to_terrain_unknown_location() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("missing.json");

        let err = cmd_to_terrain(&input, "atlantis", None, false, &PipelineConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("Unknown location"));
    }

    #[test]
    fn test_cmd_denoise_writes_each_pass() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("sylvia.tif");
        let mut grid = RasterGrid::filled(30, 30, 1.0).unwrap();
        grid.set(15, 15, 90.0);
        writers::write_raster_tiff(&input, &grid).unwrap();

        cmd_denoise(&input, "sylvia", None, Some(3), &PipelineConfig::default()).unwrap();

        for pass in 1..=3 {
            let path = dir.path().join(format!("sylviapass{pass}.tif"));
            let out = loaders::load_raster_tiff(&path).unwrap();
            assert_eq!(out.get(15, 15), 1.0);
        }
        assert!(!dir.path().join("sylviapass4.tif").exists());
    }

    #[test]
    fn test_cmd_weather_writes_records_and_plot() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("akl.json");
        std::fs::write(
            &input,
            r#"{"hourly": {"time": [0, 3600, 7200, 10800], "precipitation": [0.2, null, 6.5, 1.0]}}"#,
        )
        .unwrap();

        cmd_weather(&input, None, true, &PipelineConfig::default()).unwrap();

        let content = std::fs::read_to_string(dir.path().join("akl_processed.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        let records = json["weatherData"].as_array().unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1]["time"], 3600);
        assert_eq!(records[1]["rainfall"], 0.0);
        assert_eq!(records[2]["rainfall"], 6.5);
        assert!(dir.path().join("akl_rainfall.png").exists());
    }

    #[test]
    fn test_cmd_weather_length_mismatch() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("akl.json");
        std::fs::write(&input, r#"{"hourly": {"time": [0, 3600], "precipitation": [1.0]}}"#).unwrap();

        let err = cmd_weather(&input, None, false, &PipelineConfig::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("length mismatch"));
        assert!(!dir.path().join("akl_processed.json").exists());
    }
}
