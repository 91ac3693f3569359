use crate::core::burst_search::BurstLoader;
use crate::core::footprint::{border_from_grid, footprint_center};
use crate::io::annotation::{AnnotationParser, AnnotationRoot};
use crate::io::orbit::{parse_compact_time, parse_utc_time, OrbitReader};
use crate::types::{
    AcquisitionMode, Burst, BurstId, OrbitData, Polarization, SarError, SarResult, SPEED_OF_LIGHT,
};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Burst duration used by the ESA burst ID grid (s)
const T_BEAM: f64 = 2.758273;
/// Preamble before the first burst of an orbit (s)
const T_PRE: f64 = 2.299849;
/// Nominal orbit period (s), 175 orbits per 12-day cycle
const T_ORB: f64 = 12.0 * 24.0 * 3600.0 / 175.0;

/// Options applied while loading bursts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Elevation antenna pattern correction (needs auxiliary calibration files)
    pub apply_eap: bool,
    /// Orbit kept around the product window (seconds)
    pub orbit_margin_secs: i64,
    /// Minimum number of state vectors kept after cropping
    pub min_orbit_vectors: usize,
    /// Padding when matching orbit file validity to the product window (seconds)
    pub orbit_file_padding_secs: i64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            apply_eap: false,
            orbit_margin_secs: 120,
            min_orbit_vectors: 8,
            orbit_file_padding_secs: 60,
        }
    }
}

/// Fields encoded in a Sentinel-1 SLC product name, e.g.
/// `S1C_S3_SLC__1SDV_20250809T044136_20250809T044157_003591_007305_E501.SAFE`
#[derive(Debug, Clone, PartialEq)]
pub struct ProductName {
    pub mission: String,
    pub mode: String,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub absolute_orbit: u32,
}

impl ProductName {
    pub fn parse(name: &str) -> Option<Self> {
        let re = Regex::new(
            r"(S1[ABCD])_(IW|EW|WV|S[1-6])_SLC__1S[SD][VH]_(\d{8}T\d{6})_(\d{8}T\d{6})_(\d{6})_",
        )
        .ok()?;
        let caps = re.captures(name)?;
        Some(Self {
            mission: caps[1].to_string(),
            mode: caps[2].to_string(),
            start: parse_compact_time(&caps[3])?,
            stop: parse_compact_time(&caps[4])?,
            absolute_orbit: caps[5].parse().ok()?,
        })
    }

    pub fn from_path(path: &Path) -> SarResult<Self> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(Self::parse)
            .ok_or_else(|| {
                SarError::InvalidFormat(format!(
                    "Not a Sentinel-1 SLC product name: {}",
                    path.display()
                ))
            })
    }
}

enum Container {
    Directory,
    Zip(ZipArchive<File>),
}

/// A Sentinel-1 SAFE product, either unpacked (`.SAFE` directory) or zipped
pub struct SafeProduct {
    path: PathBuf,
    container: Container,
    files: Vec<String>,
}

impl SafeProduct {
    pub fn open<P: AsRef<Path>>(path: P) -> SarResult<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(SarError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )));
        }

        if path.is_dir() {
            let mut files = Vec::new();
            Self::walk(&path, "", &mut files)?;
            files.sort();
            Ok(Self {
                path,
                container: Container::Directory,
                files,
            })
        } else {
            let archive = ZipArchive::new(File::open(&path)?)?;
            let files = archive.file_names().map(str::to_string).collect();
            Ok(Self {
                path,
                container: Container::Zip(archive),
                files,
            })
        }
    }

    fn walk(dir: &Path, prefix: &str, files: &mut Vec<String>) -> SarResult<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let relative = if prefix.is_empty() {
                name
            } else {
                format!("{}/{}", prefix, name)
            };
            if entry.file_type()?.is_dir() {
                Self::walk(&entry.path(), &relative, files)?;
            } else {
                files.push(relative);
            }
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List all files in the product
    pub fn list_files(&self) -> &[String] {
        &self.files
    }

    /// Swath annotation XML for a beam number and polarization
    pub fn find_annotation(&self, swath: u8, pol: Polarization) -> SarResult<String> {
        self.find_member("annotation", ".xml", swath, pol)
            .ok_or_else(|| {
                SarError::InvalidFormat(format!(
                    "No annotation for swath {} polarization {} in {}",
                    swath,
                    pol,
                    self.path.display()
                ))
            })
    }

    /// Measurement TIFF for a beam number and polarization
    pub fn find_measurement(&self, swath: u8, pol: Polarization) -> SarResult<String> {
        self.find_member("measurement", ".tiff", swath, pol)
            .ok_or_else(|| {
                SarError::InvalidFormat(format!(
                    "No measurement for swath {} polarization {} in {}",
                    swath,
                    pol,
                    self.path.display()
                ))
            })
    }

    /// Matches `<folder>/s1?-{iw|ew|s}{swath}-slc-{pol}-*{ext}` directly under `folder`
    fn find_member(&self, folder: &str, ext: &str, swath: u8, pol: Polarization) -> Option<String> {
        let beams = [format!("iw{}", swath), format!("ew{}", swath), format!("s{}", swath)];
        self.files
            .iter()
            .find(|file| {
                let mut parts = file.rsplit('/');
                let (Some(base), Some(parent)) = (parts.next(), parts.next()) else {
                    return false;
                };
                let fields: Vec<&str> = base.split('-').collect();
                parent == folder
                    && base.ends_with(ext)
                    && fields.len() > 3
                    && beams.iter().any(|b| b == fields[1])
                    && fields[2] == "slc"
                    && fields[3] == pol.file_code()
            })
            .cloned()
    }

    pub fn read_file_as_string(&mut self, member: &str) -> SarResult<String> {
        let mut content = String::new();
        match &mut self.container {
            Container::Directory => {
                content = fs::read_to_string(self.path.join(member))?;
            }
            Container::Zip(archive) => {
                archive.by_name(member)?.read_to_string(&mut content)?;
            }
        }
        Ok(content)
    }

    /// First and last absolute orbit from `manifest.safe`
    pub fn orbit_range(&mut self) -> Option<(u32, u32)> {
        let manifest = self.files.iter().find(|f| f.ends_with("manifest.safe"))?.clone();
        let xml = match self.read_file_as_string(&manifest) {
            Ok(xml) => xml,
            Err(e) => {
                log::warn!("Failed to read {}: {}", manifest, e);
                return None;
            }
        };
        parse_orbit_range(&xml)
    }

    /// Path GDAL can open for a member, using `/vsizip/` for archives
    pub fn gdal_path(&self, member: &str) -> PathBuf {
        match self.container {
            Container::Directory => self.path.join(member),
            Container::Zip(_) => PathBuf::from(format!("/vsizip/{}/{}", self.path.display(), member)),
        }
    }
}

/// `orbitNumber` start/stop pair of a SAFE manifest
pub fn parse_orbit_range(manifest: &str) -> Option<(u32, u32)> {
    let re = Regex::new(r#"orbitNumber type="(start|stop)">\s*(\d+)\s*<"#).ok()?;
    let (mut start, mut stop) = (None, None);
    for caps in re.captures_iter(manifest) {
        let orbit = caps[2].parse().ok();
        match &caps[1] {
            "start" => start = start.or(orbit),
            _ => stop = stop.or(orbit),
        }
    }
    Some((start?, stop?))
}

/// Relative orbit (track) from the absolute orbit number
pub fn track_number(mission: &str, absolute_orbit: u32) -> Option<u32> {
    let offset: i64 = match mission {
        "S1A" => 73,
        "S1B" => 27,
        "S1C" => 172,
        _ => return None,
    };
    Some(((absolute_orbit as i64 - offset).rem_euclid(175) + 1) as u32)
}

/// Burst durations of IW1, IW2 and IW3 in the burst ID grid (s)
const IW_BURST_TIMES: [f64; 3] = [0.832, 1.078, 0.848];

/// ESA burst ID of an IW burst as `(track, burst number)`.
///
/// Bursts of one cycle share a number across the three sub-swaths, so the
/// sensing start is moved to the matching IW2 mid-burst time. `start_track`
/// and `end_track` are the tracks of the first and last absolute orbit of the
/// product; past one orbit period from the node the burst belongs to the end
/// track. Returns `None` for beams other than IW1..IW3.
pub fn esa_burst_id(
    sensing_start: DateTime<Utc>,
    ascending_node: DateTime<Utc>,
    swath: u8,
    start_track: u32,
    end_track: u32,
) -> Option<(u32, u32)> {
    let iw1_offset = match swath {
        1 => 0.0,
        2 => -IW_BURST_TIMES[0],
        3 => -IW_BURST_TIMES[0] - IW_BURST_TIMES[1],
        _ => return None,
    };
    let since_anx_iw1 = crate::types::duration_to_seconds(sensing_start - ascending_node) + iw1_offset;
    let mut since_anx = since_anx_iw1 + IW_BURST_TIMES[0] + T_BEAM / 2.0;

    let crosses_anx = end_track == start_track + 1 || (end_track == 1 && start_track == 175);
    let track = if since_anx_iw1 < T_ORB {
        start_track
    } else {
        if !crosses_anx {
            since_anx -= T_ORB;
        }
        end_track
    };

    let dt_b = since_anx + (track as f64 - 1.0) * T_ORB;
    Some((track, (1.0 + ((dt_b - T_PRE) / T_BEAM).floor()) as u32))
}

/// Loads bursts from SAFE products on disk
#[derive(Debug, Clone, Default)]
pub struct SafeBurstLoader {
    pub options: LoadOptions,
}

impl SafeBurstLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    fn load_orbit(&self, annotation: &AnnotationRoot, orbit_path: Option<&Path>) -> SarResult<OrbitData> {
        let orbit = match orbit_path {
            Some(path) => OrbitReader::read_orbit_file(path)?,
            None => {
                log::warn!("No orbit file given, using the annotation orbit");
                AnnotationParser::extract_orbit(annotation)?
            }
        };

        let start = AnnotationParser::first_line_time(annotation)?;
        let stop = AnnotationParser::last_line_time(annotation)?;
        let cropped = OrbitReader::crop(
            &orbit,
            start,
            stop,
            Duration::seconds(self.options.orbit_margin_secs),
            self.options.min_orbit_vectors,
        );
        if cropped.state_vectors.len() < 2 {
            return Err(SarError::Processing(format!(
                "Orbit does not cover product window {} to {}",
                start, stop
            )));
        }
        Ok(cropped)
    }

    fn build_bursts(
        &self,
        annotation: &AnnotationRoot,
        orbit: OrbitData,
        tiff_path: PathBuf,
        swath: u8,
        pol: Polarization,
        orbit_range: Option<(u32, u32)>,
    ) -> SarResult<Vec<Burst>> {
        let header = &annotation.ads_header;
        let info = &annotation.image_annotation.image_information;
        let mode = AcquisitionMode::from_annotation(&header.mode)?;

        let wavelength = SPEED_OF_LIGHT / annotation.general_annotation.product_information.radar_frequency;
        let starting_range = info.slant_range_time * SPEED_OF_LIGHT / 2.0;
        let grid = AnnotationParser::grid_points(annotation);

        let base = Burst {
            burst_id: None,
            swath,
            burst_index: 0,
            mode,
            polarization: pol,
            platform_id: header.mission_id.clone(),
            shape: (info.number_of_lines, info.number_of_samples),
            border: geo::MultiPolygon::new(vec![]),
            center: geo::Point::new(0.0, 0.0),
            orbit,
            wavelength,
            tiff_path,
            sensing_start: AnnotationParser::first_line_time(annotation)?,
            azimuth_time_interval: info.azimuth_time_interval,
            starting_range,
            range_pixel_spacing: info.range_pixel_spacing,
        };

        let timing = annotation
            .swath_timing
            .as_ref()
            .filter(|t| mode.is_burst_mode() && !t.burst_list.bursts.is_empty());

        let Some(timing) = timing else {
            // stripmap: the whole swath is one burst
            let last_line = info.number_of_lines.saturating_sub(1) as u32;
            let border = border_from_grid(grid, 0, last_line)?;
            let center = footprint_center(&border)?;
            log::debug!("Stripmap swath {}: {} x {}", swath, info.number_of_lines, info.number_of_samples);
            return Ok(vec![Burst { border, center, ..base }]);
        };

        let lines = timing.lines_per_burst;
        let ascending_node = parse_utc_time(&info.ascending_node_time)?;
        let (first_orbit, last_orbit) = orbit_range.unwrap_or_else(|| {
            log::debug!("No manifest orbit range, using absolute orbit {}", header.absolute_orbit_number);
            (header.absolute_orbit_number, header.absolute_orbit_number)
        });
        let tracks = track_number(&header.mission_id, first_orbit)
            .zip(track_number(&header.mission_id, last_orbit));
        if tracks.is_none() {
            log::warn!("No track offset known for {}, burst IDs unavailable", header.mission_id);
        }

        timing
            .burst_list
            .bursts
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let sensing_start = parse_utc_time(&entry.azimuth_time)?;
                let first_line = (i * lines) as u32;
                let last_line = ((i + 1) * lines).saturating_sub(1) as u32;
                let border = border_from_grid(grid, first_line, last_line)?;
                let center = footprint_center(&border)?;

                let burst_id = tracks
                    .and_then(|(start, end)| esa_burst_id(sensing_start, ascending_node, swath, start, end))
                    .map(|(track, id)| BurstId {
                        track_number: track,
                        esa_burst_id: id,
                        subswath: header.swath.to_uppercase(),
                    });

                Ok(Burst {
                    burst_id,
                    burst_index: i,
                    shape: (lines, timing.samples_per_burst),
                    border,
                    center,
                    sensing_start,
                    ..base.clone()
                })
            })
            .collect()
    }
}

impl BurstLoader for SafeBurstLoader {
    fn load_bursts(
        &self,
        product: &Path,
        orbit_path: Option<&Path>,
        swath: u8,
        pol: Polarization,
    ) -> SarResult<Vec<Burst>> {
        if self.options.apply_eap {
            return Err(SarError::Unsupported(
                "Elevation antenna pattern correction is not available".to_string(),
            ));
        }

        log::info!("Loading swath {} {} bursts from {}", swath, pol, product.display());
        let mut safe = SafeProduct::open(product)?;
        let annotation_file = safe.find_annotation(swath, pol)?;
        let measurement_file = safe.find_measurement(swath, pol)?;

        let xml = safe.read_file_as_string(&annotation_file)?;
        let annotation = AnnotationParser::parse_annotation(&xml)?;
        let orbit = self.load_orbit(&annotation, orbit_path)?;
        let tiff_path = safe.gdal_path(&measurement_file);
        let orbit_range = safe.orbit_range();

        let bursts = self.build_bursts(&annotation, orbit, tiff_path, swath, pol, orbit_range)?;
        log::info!("Loaded {} bursts for swath {}", bursts.len(), swath);
        Ok(bursts)
    }

    fn orbit_file_from_dir(&self, product: &Path, orbit_dir: &Path) -> SarResult<PathBuf> {
        let name = ProductName::from_path(product)?;
        OrbitReader::find_orbit_file(
            orbit_dir,
            &name.mission,
            name.start,
            name.stop,
            Duration::seconds(self.options.orbit_file_padding_secs),
        )
    }
}

/// Load bursts with default options
pub fn load_bursts<P: AsRef<Path>>(
    product: P,
    orbit_path: Option<&Path>,
    swath: u8,
    pol: Polarization,
) -> SarResult<Vec<Burst>> {
    SafeBurstLoader::default().load_bursts(product.as_ref(), orbit_path, swath, pol)
}

/// Find the orbit file in `orbit_dir` covering `product`
pub fn get_orbit_file_from_dir<P: AsRef<Path>>(product: P, orbit_dir: &Path) -> SarResult<PathBuf> {
    SafeBurstLoader::default().orbit_file_from_dir(product.as_ref(), orbit_dir)
}
