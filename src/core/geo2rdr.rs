//! Inverse geocoding: ground point to (azimuth time, slant range)

use crate::io::orbit::OrbitReader;
use crate::types::{LookSide, OrbitData, SarError, SarResult};
use serde::{Deserialize, Serialize};

/// Reference ellipsoid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (m)
    pub a: f64,
    /// First eccentricity squared
    pub e2: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        e2: 0.006_694_379_990_14,
    };

    /// Convert `[lon_rad, lat_rad, height_m]` to ECEF
    pub fn llh_to_ecef(&self, llh: [f64; 3]) -> [f64; 3] {
        let [lon, lat, h] = llh;
        let n = self.a / (1.0 - self.e2 * lat.sin().powi(2)).sqrt();

        [
            (n + h) * lat.cos() * lon.cos(),
            (n + h) * lat.cos() * lon.sin(),
            (n * (1.0 - self.e2) + h) * lat.sin(),
        ]
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

/// Doppler centroid as a function of azimuth time and slant range
pub trait DopplerModel {
    /// Doppler frequency (Hz) at `az_time` seconds since the orbit epoch
    fn doppler(&self, az_time: f64, slant_range: f64) -> f64;
}

/// Broadside imaging: zero Doppler everywhere
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroDoppler;

impl DopplerModel for ZeroDoppler {
    fn doppler(&self, _az_time: f64, _slant_range: f64) -> f64 {
        0.0
    }
}

/// Iteration controls for the azimuth-time search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geo2RdrConfig {
    /// Convergence threshold on the azimuth time update (seconds)
    pub threshold: f64,
    pub max_iterations: usize,
}

impl Default for Geo2RdrConfig {
    fn default() -> Self {
        Self {
            threshold: 1e-8,
            max_iterations: 50,
        }
    }
}

/// Radar coordinates of a ground point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarCoordinate {
    /// Seconds since the orbit reference epoch
    pub azimuth_time: f64,
    /// Meters
    pub slant_range: f64,
}

/// Maps a geodetic point to radar coordinates for a given orbit
pub trait Geo2Rdr {
    /// `llh` is `[lon_rad, lat_rad, height_m]`
    fn geo2rdr(
        &self,
        llh: [f64; 3],
        orbit: &OrbitData,
        doppler: &dyn DopplerModel,
        wavelength: f64,
        side: LookSide,
    ) -> SarResult<RadarCoordinate>;
}

/// Newton-Raphson solver on the Doppler equation
#[derive(Debug, Clone, Default)]
pub struct NewtonGeo2Rdr {
    pub ellipsoid: Ellipsoid,
    pub config: Geo2RdrConfig,
}

impl NewtonGeo2Rdr {
    pub fn new(config: Geo2RdrConfig) -> Self {
        Self {
            ellipsoid: Ellipsoid::WGS84,
            config,
        }
    }

    /// Time of the state vector closest to the target
    fn initial_guess(orbit: &OrbitData, target: &[f64; 3]) -> SarResult<f64> {
        orbit
            .state_vectors
            .iter()
            .min_by(|a, b| {
                distance(&a.position, target).total_cmp(&distance(&b.position, target))
            })
            .map(|sv| orbit.seconds_since_epoch(sv.time))
            .ok_or_else(|| SarError::Processing("No state vectors in orbit data".to_string()))
    }
}

impl Geo2Rdr for NewtonGeo2Rdr {
    fn geo2rdr(
        &self,
        llh: [f64; 3],
        orbit: &OrbitData,
        doppler: &dyn DopplerModel,
        wavelength: f64,
        side: LookSide,
    ) -> SarResult<RadarCoordinate> {
        let target = self.ellipsoid.llh_to_ecef(llh);
        let mut t = Self::initial_guess(orbit, &target)?;
        let mut step = f64::INFINITY;

        for iteration in 0..self.config.max_iterations {
            let (pos, vel) = OrbitReader::interpolate(orbit, t)?;
            let dr = sub(&target, &pos);
            let range = norm(&dr);

            let fdop = 0.5 * wavelength * doppler.doppler(t, range);
            let f = dot(&dr, &vel) / range - fdop;
            let fprime = -dot(&vel, &vel) / range;

            step = f / fprime;
            t -= step;

            if step.abs() < self.config.threshold {
                let (pos, vel) = OrbitReader::interpolate(orbit, t)?;
                let dr = sub(&target, &pos);
                let slant_range = norm(&dr);

                let right = dot(&dr, &cross(&vel, &pos)) > 0.0;
                let expected_right = side == LookSide::Right;
                if right != expected_right {
                    return Err(SarError::Geometry(format!(
                        "Target is on the {} of the ground track for a {:?}-looking sensor",
                        if right { "right" } else { "left" },
                        side
                    )));
                }

                log::debug!(
                    "geo2rdr converged in {} iterations: t={:.9} s, r={:.4} m",
                    iteration + 1,
                    t,
                    slant_range
                );
                return Ok(RadarCoordinate {
                    azimuth_time: t,
                    slant_range,
                });
            }
        }

        Err(SarError::Convergence {
            iterations: self.config.max_iterations,
            residual: step.abs(),
        })
    }
}

fn sub(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: &[f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    norm(&sub(a, b))
}
