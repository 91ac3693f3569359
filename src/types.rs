use chrono::{DateTime, Duration, Utc};
use geo::{MultiPolygon, Point};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Speed of light in vacuum (m/s)
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Polarization modes for Sentinel-1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarization {
    VV,
    VH,
    HV,
    HH,
}

impl Polarization {
    /// Lower-case code as used in SAFE file names
    pub fn file_code(&self) -> &'static str {
        match self {
            Polarization::VV => "vv",
            Polarization::VH => "vh",
            Polarization::HV => "hv",
            Polarization::HH => "hh",
        }
    }
}

impl std::fmt::Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarization::VV => write!(f, "VV"),
            Polarization::VH => write!(f, "VH"),
            Polarization::HV => write!(f, "HV"),
            Polarization::HH => write!(f, "HH"),
        }
    }
}

impl std::str::FromStr for Polarization {
    type Err = SarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "VV" => Ok(Polarization::VV),
            "VH" => Ok(Polarization::VH),
            "HV" => Ok(Polarization::HV),
            "HH" => Ok(Polarization::HH),
            _ => Err(SarError::InvalidFormat(format!("Invalid polarization: {}", s))),
        }
    }
}

/// Sentinel-1 acquisition mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionMode {
    IW, // Interferometric Wide swath
    EW, // Extra Wide swath
    SM, // StripMap (S1..S6 beams)
    WV, // Wave
}

impl AcquisitionMode {
    /// Map the annotation `<mode>` value (IW, EW, S1..S6, WV) to a mode
    pub fn from_annotation(mode: &str) -> SarResult<Self> {
        match mode.trim().to_uppercase().as_str() {
            "IW" => Ok(AcquisitionMode::IW),
            "EW" => Ok(AcquisitionMode::EW),
            "WV" => Ok(AcquisitionMode::WV),
            "SM" | "S1" | "S2" | "S3" | "S4" | "S5" | "S6" => Ok(AcquisitionMode::SM),
            other => Err(SarError::Metadata(format!("Unknown acquisition mode: {}", other))),
        }
    }

    /// Burst-mode products carry a burst list, stripmap ones do not
    pub fn is_burst_mode(&self) -> bool {
        matches!(self, AcquisitionMode::IW | AcquisitionMode::EW)
    }
}

/// Side of the ground track the antenna looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookSide {
    Left,
    Right,
}

/// Orbit state vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateVector {
    pub time: DateTime<Utc>,
    pub position: [f64; 3],  // [x, y, z] in meters
    pub velocity: [f64; 3],  // [vx, vy, vz] in m/s
}

/// Orbit ephemeris: time-sorted state vectors plus the epoch azimuth times are measured from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitData {
    pub state_vectors: Vec<StateVector>,
    pub reference_time: DateTime<Utc>,
}

impl OrbitData {
    /// Seconds elapsed from the reference epoch to `time`, at microsecond resolution
    pub fn seconds_since_epoch(&self, time: DateTime<Utc>) -> f64 {
        duration_to_seconds(time - self.reference_time)
    }
}

pub(crate) fn duration_to_seconds(d: Duration) -> f64 {
    match d.num_microseconds() {
        Some(us) => us as f64 * 1e-6,
        None => d.num_milliseconds() as f64 * 1e-3,
    }
}

/// Geospatial transformation parameters (GDAL ordering)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl From<[f64; 6]> for GeoTransform {
    fn from(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }
}

/// ESA burst identifier (track, burst number, sub-swath)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BurstId {
    pub track_number: u32,
    pub esa_burst_id: u32,
    pub subswath: String,
}

impl std::fmt::Display for BurstId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "t{:03}_{:06}_{}",
            self.track_number,
            self.esa_burst_id,
            self.subswath.to_lowercase()
        )
    }
}

/// Regular sampling of a SAR image, times relative to the orbit reference epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarGridParameters {
    /// First line azimuth time (seconds since orbit epoch)
    pub sensing_start: f64,
    /// Azimuth time between lines (seconds)
    pub az_time_interval: f64,
    /// Slant range to the first sample (meters)
    pub starting_range: f64,
    /// Slant range spacing between samples (meters)
    pub range_pixel_spacing: f64,
    pub wavelength: f64,
    pub length: usize,
    pub width: usize,
}

/// Sentinel-1 burst (or the whole swath for stripmap products).
///
/// Populated once by a loader and only read afterwards.
#[derive(Debug, Clone)]
pub struct Burst {
    /// ESA burst ID; `None` for stripmap where no burst grid applies
    pub burst_id: Option<BurstId>,
    /// Sub-swath / beam number (IW1..3, S1..S6)
    pub swath: u8,
    /// Position of the burst within its swath's burst list
    pub burst_index: usize,
    pub mode: AcquisitionMode,
    pub polarization: Polarization,
    pub platform_id: String,
    /// (rows, columns)
    pub shape: (usize, usize),
    /// Footprint in lon/lat
    pub border: MultiPolygon<f64>,
    /// Footprint centroid (x = lon, y = lat)
    pub center: Point<f64>,
    pub orbit: OrbitData,
    pub wavelength: f64,
    pub tiff_path: PathBuf,
    pub sensing_start: DateTime<Utc>,
    pub azimuth_time_interval: f64,
    pub starting_range: f64,
    pub range_pixel_spacing: f64,
}

impl Burst {
    /// Radar grid with azimuth times expressed against this burst's orbit epoch
    pub fn radar_grid(&self) -> RadarGridParameters {
        RadarGridParameters {
            sensing_start: self.orbit.seconds_since_epoch(self.sensing_start),
            az_time_interval: self.azimuth_time_interval,
            starting_range: self.starting_range,
            range_pixel_spacing: self.range_pixel_spacing,
            wavelength: self.wavelength,
            length: self.shape.0,
            width: self.shape.1,
        }
    }

    pub fn burst_id_string(&self) -> Option<String> {
        self.burst_id.as_ref().map(|id| id.to_string())
    }
}

/// Error types for SAR processing
#[derive(Debug, thiserror::Error)]
pub enum SarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("XML parsing error: {0}")]
    XmlParsing(String),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("geo2rdr did not converge after {iterations} iterations (last step {residual:.3e} s)")]
    Convergence { iterations: usize, residual: f64 },

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// Result type for SAR operations
pub type SarResult<T> = Result<T, SarError>;
