//! Readers for Sentinel-1 products, orbit files and DEMs

pub mod annotation;
pub mod dem;
pub mod orbit;
pub mod safe;

pub use annotation::AnnotationParser;
pub use dem::DemReader;
pub use orbit::{OrbitFileName, OrbitReader, OrbitType};
pub use safe::{get_orbit_file_from_dir, load_bursts, LoadOptions, SafeBurstLoader, SafeProduct};
