//! Geometry and point lookup

pub mod burst_search;
pub mod footprint;
pub mod geo2rdr;
pub mod locate;

// Re-export main types
pub use burst_search::{burst_contains, find_overlapping_bursts, BurstLoader, SearchConfig};
pub use footprint::{border_from_grid, footprint_center, split_antimeridian};
pub use geo2rdr::{
    DopplerModel, Ellipsoid, Geo2Rdr, Geo2RdrConfig, NewtonGeo2Rdr, RadarCoordinate, ZeroDoppler,
};
pub use locate::{
    locate_in_burst, radar_indices, s1_geo2rdr, BurstFilter, HeightSource, PixelWindow,
    PointQuery, ResultRow, CSV_HEADER,
};
