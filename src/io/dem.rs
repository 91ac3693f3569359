use crate::types::{GeoTransform, SarResult};
use gdal::Dataset;
use std::path::Path;

/// Digital Elevation Model reader
pub struct DemReader;

impl DemReader {
    /// Nearest pixel `(column, row)` for a lon/lat under `transform`.
    ///
    /// No bounds checking; the result may lie outside the raster.
    pub fn pixel_index(transform: &GeoTransform, lon: f64, lat: f64) -> (isize, isize) {
        let px = ((lon - transform.top_left_x) / transform.pixel_width).floor();
        let py = ((lat - transform.top_left_y) / transform.pixel_height).floor();
        (px as isize, py as isize)
    }

    /// Height of the DEM pixel nearest to (lon, lat), read from band 1
    pub fn height_at<P: AsRef<Path>>(dem_path: P, lon: f64, lat: f64) -> SarResult<f64> {
        log::info!("Reading DEM height from: {}", dem_path.as_ref().display());

        let dataset = Dataset::open(dem_path.as_ref())?;
        let transform = GeoTransform::from(dataset.geo_transform()?);
        let (px, py) = Self::pixel_index(&transform, lon, lat);
        log::debug!("DEM pixel for ({}, {}): x={}, y={}", lon, lat, px, py);

        let band = dataset.rasterband(1)?;
        let buffer = band.read_as::<f64>((px, py), (1, 1), (1, 1), None)?;
        let height = buffer.data[0];

        log::debug!("DEM height: {} m", height);
        Ok(height)
    }
}
