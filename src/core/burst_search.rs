//! Find the bursts of a product whose footprint contains a point

use crate::types::{Burst, Polarization, SarResult};
use geo::{Contains, Point};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source of bursts for a product
pub trait BurstLoader {
    /// Load all bursts of one sub-swath and polarization
    fn load_bursts(
        &self,
        product: &Path,
        orbit_path: Option<&Path>,
        swath: u8,
        pol: Polarization,
    ) -> SarResult<Vec<Burst>>;

    /// Resolve the orbit file in `orbit_dir` that covers `product`
    fn orbit_file_from_dir(&self, product: &Path, orbit_dir: &Path) -> SarResult<PathBuf>;
}

/// Which sub-swaths a search visits, in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub swaths: Vec<u8>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        // IW1..IW3
        Self { swaths: vec![1, 2, 3] }
    }
}

/// Point-in-footprint test; points on the boundary are outside
pub fn burst_contains(burst: &Burst, lon: f64, lat: f64) -> bool {
    burst.border.contains(&Point::new(lon, lat))
}

/// Bursts containing (lon, lat), ordered by swath then loader order
pub fn find_overlapping_bursts(
    loader: &dyn BurstLoader,
    product: &Path,
    lon: f64,
    lat: f64,
    orbit_dir: Option<&Path>,
    pol: Polarization,
    config: &SearchConfig,
) -> SarResult<Vec<Burst>> {
    let orbit_file = orbit_dir
        .map(|dir| loader.orbit_file_from_dir(product, dir))
        .transpose()?;

    let mut bursts = Vec::new();
    for &swath in &config.swaths {
        let loaded = loader.load_bursts(product, orbit_file.as_deref(), swath, pol)?;
        let total = loaded.len();
        bursts.extend(loaded.into_iter().filter(|b| burst_contains(b, lon, lat)));
        log::debug!("Swath {}: {} bursts, {} overlapping so far", swath, total, bursts.len());
    }

    if bursts.is_empty() {
        log::info!("No burst of {} contains ({}, {})", product.display(), lon, lat);
    }
    Ok(bursts)
}
