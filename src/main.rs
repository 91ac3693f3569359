//! Converts a point in lon/lat to azimuth and range pixel indices of the
//! Sentinel-1 bursts containing it, printed as CSV

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use s1reader::core::{
    find_overlapping_bursts, locate_in_burst, BurstFilter, HeightSource, NewtonGeo2Rdr,
    PointQuery, SearchConfig, CSV_HEADER,
};
use s1reader::{Polarization, SafeBurstLoader, SarError};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Converts a point in lon/lat to azimuth time and range",
    allow_negative_numbers = true
)]
struct Args {
    /// Longitude of point
    lon: f64,

    /// Latitude of point
    lat: f64,

    /// Sentinel-1 zip/SAFE file
    s1_file: PathBuf,

    /// Directory containing the orbit files
    #[arg(long)]
    orbit_dir: Option<PathBuf>,

    /// DEM file (optional, for height)
    #[arg(short, long)]
    dem: Option<PathBuf>,

    /// Manually specify height (meters above the ellipsoid)
    #[arg(long)]
    height: Option<f64>,

    /// Polarization to use
    #[arg(short, long, default_value = "vv", value_parser = ["vv", "vh", "hh", "hv"])]
    pol: String,

    /// Print only the bursts of the given IW
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=3))]
    iw: Option<u8>,

    /// Specific burst ID to use within the product
    #[arg(short, long)]
    burst_id: Option<String>,

    /// Output file for the buffer around the point
    #[arg(long)]
    outfile: Option<PathBuf>,

    /// Buffer (in pixels) around the point to output
    #[arg(long, default_value_t = 100)]
    buffer: i64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let height_source = match HeightSource::resolve(args.height, args.dem.as_deref()) {
        Ok(source) => source,
        Err(SarError::Usage(msg)) => Args::command()
            .error(ErrorKind::MissingRequiredArgument, msg)
            .exit(),
        Err(e) => return Err(e.into()),
    };
    let pol: Polarization = args.pol.parse()?;

    let height = height_source
        .height_at(args.lon, args.lat)
        .context("Failed to read height from DEM")?;
    let point = PointQuery { lon: args.lon, lat: args.lat, height };
    log::info!("Point: lon={}, lat={}, h={}", point.lon, point.lat, point.height);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", CSV_HEADER)?;

    let loader = SafeBurstLoader::default();
    let bursts = find_overlapping_bursts(
        &loader,
        &args.s1_file,
        args.lon,
        args.lat,
        args.orbit_dir.as_deref(),
        pol,
        &SearchConfig::default(),
    )
    .with_context(|| format!("Failed to load bursts from {}", args.s1_file.display()))?;

    let filter = BurstFilter { burst_id: args.burst_id.clone(), swath: args.iw };
    let solver = NewtonGeo2Rdr::default();

    for burst in bursts.iter().filter(|b| filter.matches(b)) {
        let row = locate_in_burst(&solver, &point, burst)?;
        writeln!(out, "{}", row)?;

        if let Some(outfile) = &args.outfile {
            let window = row.pixel_window(args.buffer);
            log::info!(
                "Window for {}: rows {:?}, cols {:?}",
                row.burst_id.as_deref().unwrap_or("burst"),
                window.rows,
                window.cols
            );
            log::warn!("Cropping is not implemented, {} was not written", outfile.display());
        }
    }

    out.flush()?;
    Ok(())
}
