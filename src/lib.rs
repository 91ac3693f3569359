//! s1reader: locate geographic points in Sentinel-1 SLC bursts
//!
//! Loads burst metadata from SAFE products (directory or zip), finds the
//! bursts whose footprint contains a lon/lat point, and converts the point to
//! azimuth/range pixel indices with a zero-Doppler geo2rdr solver.

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    AcquisitionMode, Burst, BurstId, LookSide, OrbitData, Polarization, RadarGridParameters,
    SarError, SarResult, StateVector,
};

pub use crate::core::{find_overlapping_bursts, BurstLoader, NewtonGeo2Rdr, SearchConfig};
pub use io::{get_orbit_file_from_dir, load_bursts, DemReader, OrbitReader, SafeBurstLoader};
