//! Point query to burst pixel indices, and the CSV rows reporting them

use crate::core::geo2rdr::{Geo2Rdr, RadarCoordinate, ZeroDoppler};
use crate::io::dem::DemReader;
use crate::types::{Burst, LookSide, RadarGridParameters, SarError, SarResult};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: &str = "lon,lat,az_idx,range_idx,burst_id,tiff_path";

/// Where the point's height comes from
#[derive(Debug, Clone, PartialEq)]
pub enum HeightSource {
    Explicit(f64),
    Dem(PathBuf),
}

impl HeightSource {
    /// An explicit height wins over a DEM; having neither is a usage error
    pub fn resolve(height: Option<f64>, dem: Option<&Path>) -> SarResult<Self> {
        match (height, dem) {
            (Some(h), _) => Ok(HeightSource::Explicit(h)),
            (None, Some(dem)) => Ok(HeightSource::Dem(dem.to_path_buf())),
            (None, None) => Err(SarError::Usage(
                "Must specify either --height or --dem".to_string(),
            )),
        }
    }

    pub fn height_at(&self, lon: f64, lat: f64) -> SarResult<f64> {
        match self {
            HeightSource::Explicit(h) => Ok(*h),
            HeightSource::Dem(path) => DemReader::height_at(path, lon, lat),
        }
    }
}

/// Geodetic point in degrees and meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointQuery {
    pub lon: f64,
    pub lat: f64,
    pub height: f64,
}

impl PointQuery {
    /// `[lon_rad, lat_rad, height]`
    pub fn llh_radians(&self) -> [f64; 3] {
        [self.lon.to_radians(), self.lat.to_radians(), self.height]
    }
}

/// Radar coordinates of a point for one burst: zero Doppler, right-looking
pub fn s1_geo2rdr(solver: &dyn Geo2Rdr, point: &PointQuery, burst: &Burst) -> SarResult<RadarCoordinate> {
    solver.geo2rdr(
        point.llh_radians(),
        &burst.orbit,
        &ZeroDoppler,
        burst.wavelength,
        LookSide::Right,
    )
}

/// Nearest pixel (azimuth, range) on the radar grid, ties to even.
///
/// Not clamped: indices can be negative or past the image edge.
pub fn radar_indices(coord: &RadarCoordinate, grid: &RadarGridParameters) -> (i64, i64) {
    let az = (coord.azimuth_time - grid.sensing_start) / grid.az_time_interval;
    let rg = (coord.slant_range - grid.starting_range) / grid.range_pixel_spacing;
    (az.round_ties_even() as i64, rg.round_ties_even() as i64)
}

/// One CSV row of output
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub lon: f64,
    pub lat: f64,
    pub az_idx: i64,
    pub range_idx: i64,
    pub burst_id: Option<String>,
    pub tiff_path: PathBuf,
}

impl ResultRow {
    pub fn pixel_window(&self, buffer: i64) -> PixelWindow {
        PixelWindow::around(self.az_idx, self.range_idx, buffer)
    }
}

impl fmt::Display for ResultRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            format_float(self.lon),
            format_float(self.lat),
            self.az_idx,
            self.range_idx,
            self.burst_id.as_deref().unwrap_or(""),
            self.tiff_path.display()
        )
    }
}

/// Shortest round-trip form, keeping a `.0` on integral values.
///
/// Magnitudes below 1e-4 or from 1e16 up use an exponent with a sign and at
/// least two digits (`1e-05`, `1.5e+16`).
pub fn format_float(value: f64) -> String {
    let magnitude = value.abs();
    if value.is_finite() && value != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let s = format!("{:e}", value);
        return match s.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exp),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => s,
        };
    }

    let s = value.to_string();
    if value.is_finite() && !s.contains('.') {
        format!("{}.0", s)
    } else {
        s
    }
}

/// Locate the point in one burst
pub fn locate_in_burst(solver: &dyn Geo2Rdr, point: &PointQuery, burst: &Burst) -> SarResult<ResultRow> {
    let coord = s1_geo2rdr(solver, point, burst)?;
    let (az_idx, range_idx) = radar_indices(&coord, &burst.radar_grid());
    Ok(ResultRow {
        lon: point.lon,
        lat: point.lat,
        az_idx,
        range_idx,
        burst_id: burst.burst_id_string(),
        tiff_path: burst.tiff_path.clone(),
    })
}

/// Optional burst ID and sub-swath restrictions on the reported bursts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BurstFilter {
    pub burst_id: Option<String>,
    pub swath: Option<u8>,
}

impl BurstFilter {
    pub fn matches(&self, burst: &Burst) -> bool {
        if let Some(wanted) = &self.burst_id {
            if burst.burst_id_string().as_deref() != Some(wanted.as_str()) {
                return false;
            }
        }
        self.swath.map_or(true, |swath| burst.swath == swath)
    }
}

/// Row/column ranges `buffer` pixels around a center pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelWindow {
    pub rows: RangeInclusive<i64>,
    pub cols: RangeInclusive<i64>,
}

impl PixelWindow {
    pub fn around(az_idx: i64, range_idx: i64, buffer: i64) -> Self {
        Self {
            rows: az_idx - buffer..=az_idx + buffer,
            cols: range_idx - buffer..=range_idx + buffer,
        }
    }
}
