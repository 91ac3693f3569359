use crate::types::{OrbitData, SarError, SarResult, StateVector};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Number of state vectors used for Lagrange interpolation
const INTERPOLATION_POINTS: usize = 8;

/// Orbit file types available from ESA
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrbitType {
    /// Precise Orbit Ephemerides (best accuracy, ~20 days delay)
    POEORB,
    /// Restituted Orbit Ephemerides (lower accuracy, ~3 hours delay)
    RESORB,
}

impl std::fmt::Display for OrbitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrbitType::POEORB => write!(f, "POEORB"),
            OrbitType::RESORB => write!(f, "RESORB"),
        }
    }
}

/// Fields encoded in an ESA orbit file name, e.g.
/// `S1C_OPER_AUX_POEORB_OPOD_20250829T070946_V20250808T225942_20250810T005942.EOF`
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitFileName {
    pub mission: String,
    pub orbit_type: OrbitType,
    pub created: DateTime<Utc>,
    pub valid_start: DateTime<Utc>,
    pub valid_stop: DateTime<Utc>,
}

impl OrbitFileName {
    pub fn parse(file_name: &str) -> Option<Self> {
        let re = Regex::new(
            r"^(S1[ABCD])_OPER_AUX_(POEORB|RESORB)_OPOD_(\d{8}T\d{6})_V(\d{8}T\d{6})_(\d{8}T\d{6})\.EOF$",
        )
        .ok()?;
        let caps = re.captures(file_name)?;
        let orbit_type = match &caps[2] {
            "POEORB" => OrbitType::POEORB,
            _ => OrbitType::RESORB,
        };
        Some(Self {
            mission: caps[1].to_string(),
            orbit_type,
            created: parse_compact_time(&caps[3])?,
            valid_start: parse_compact_time(&caps[4])?,
            valid_stop: parse_compact_time(&caps[5])?,
        })
    }

    /// True if the validity window covers `[start, stop]`
    pub fn covers(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> bool {
        self.valid_start <= start && self.valid_stop >= stop
    }
}

/// Parse `YYYYMMDDTHHMMSS` as used in Sentinel-1 file names
pub fn parse_compact_time(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Parse the `%Y-%m-%dT%H:%M:%S%.f` timestamps used in EOF and annotation files
pub fn parse_utc_time(s: &str) -> SarResult<DateTime<Utc>> {
    let s = s.trim();
    let s = s.strip_prefix("UTC=").unwrap_or(s);
    let s = s.strip_suffix('Z').unwrap_or(s);
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
        .map_err(|e| SarError::Metadata(format!("Invalid UTC time '{}': {}", s, e)))
}

/// Precise orbit file reader for Sentinel-1
pub struct OrbitReader;

impl OrbitReader {
    /// Read precise orbit file (EOF format)
    pub fn read_orbit_file<P: AsRef<Path>>(path: P) -> SarResult<OrbitData> {
        log::info!("Reading orbit file: {}", path.as_ref().display());

        let content = fs::read_to_string(&path)?;
        Self::parse_eof_content(&content)
    }

    /// Parse the `<OSV>` blocks of an Earth Explorer orbit file
    pub fn parse_eof_content(content: &str) -> SarResult<OrbitData> {
        let mut state_vectors = Vec::new();
        let mut current: Option<OsvBuilder> = None;

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.contains("<OSV>") {
                current = Some(OsvBuilder::default());
                continue;
            }

            if line.contains("</OSV>") {
                if let Some(osv) = current.take() {
                    match osv.build() {
                        Some(sv) => state_vectors.push(sv),
                        None => log::warn!("Incomplete OSV block ending at line {}", line_no + 1),
                    }
                }
                continue;
            }

            let Some(osv) = current.as_mut() else {
                continue;
            };

            if let Some(value) = Self::extract_xml_value(line, "UTC") {
                osv.time = Some(parse_utc_time(&value)?);
                continue;
            }

            for (tag, slot) in [
                ("X", 0usize),
                ("Y", 1),
                ("Z", 2),
                ("VX", 3),
                ("VY", 4),
                ("VZ", 5),
            ] {
                if let Some(raw) = Self::extract_xml_value(line, tag) {
                    let prefix = format!("{}=", tag);
                    let value = raw.strip_prefix(prefix.as_str()).unwrap_or(&raw);
                    let parsed = value.trim().parse::<f64>().map_err(|e| {
                        SarError::Metadata(format!(
                            "Invalid {} value '{}' at line {}: {}",
                            tag,
                            value,
                            line_no + 1,
                            e
                        ))
                    })?;
                    osv.values[slot] = Some(parsed);
                    break;
                }
            }
        }

        if state_vectors.is_empty() {
            return Err(SarError::Processing(
                "No valid state vectors found in orbit file".to_string(),
            ));
        }

        state_vectors.sort_by_key(|sv| sv.time);
        let reference_time = state_vectors[0].time;

        log::info!("Parsed {} orbit state vectors", state_vectors.len());
        Ok(OrbitData {
            state_vectors,
            reference_time,
        })
    }

    /// Extract value from XML element (handles tags with attributes)
    fn extract_xml_value(line: &str, tag: &str) -> Option<String> {
        let open_plain = format!("<{}>", tag);
        let open_attr = format!("<{} ", tag);
        let end_tag = format!("</{}>", tag);

        let start = line.find(&open_plain).or_else(|| line.find(&open_attr))?;
        let content_start = start + line[start..].find('>')? + 1;
        let end = line[content_start..].find(&end_tag)?;
        Some(line[content_start..content_start + end].to_string())
    }

    /// Find the orbit file in `dir` matching a product's mission and time window.
    ///
    /// Precise orbits win over restituted ones; among equals the newest file wins.
    pub fn find_orbit_file(
        dir: &Path,
        mission: &str,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        margin: Duration,
    ) -> SarResult<PathBuf> {
        let want_start = start - margin;
        let want_stop = stop + margin;

        let mut candidates = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(parsed) = OrbitFileName::parse(name) else {
                continue;
            };
            if parsed.mission == mission && parsed.covers(want_start, want_stop) {
                candidates.push((parsed, path));
            }
        }

        candidates.sort_by(|(a, _), (b, _)| {
            a.orbit_type
                .cmp(&b.orbit_type)
                .then_with(|| b.created.cmp(&a.created))
        });

        match candidates.into_iter().next() {
            Some((parsed, path)) => {
                log::info!("Selected {} orbit file: {}", parsed.orbit_type, path.display());
                Ok(path)
            }
            None => Err(SarError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!(
                    "No {} orbit file in {} covers {} to {}",
                    mission,
                    dir.display(),
                    start,
                    stop
                ),
            ))),
        }
    }

    /// Keep state vectors within `[start - margin, stop + margin]`.
    ///
    /// Widens the selection symmetrically until at least `min_vectors` remain
    /// (or the whole orbit is used).
    pub fn crop(
        orbit: &OrbitData,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        margin: Duration,
        min_vectors: usize,
    ) -> OrbitData {
        let svs = &orbit.state_vectors;
        let lo = svs.partition_point(|sv| sv.time < start - margin);
        let hi = svs.partition_point(|sv| sv.time <= stop + margin);
        let (mut lo, mut hi) = (lo.min(hi), hi);

        while hi - lo < min_vectors && (lo > 0 || hi < svs.len()) {
            if lo > 0 {
                lo -= 1;
            }
            if hi < svs.len() && hi - lo < min_vectors {
                hi += 1;
            }
        }

        let state_vectors = svs[lo..hi].to_vec();
        let reference_time = state_vectors
            .first()
            .map(|sv| sv.time)
            .unwrap_or(orbit.reference_time);
        log::debug!(
            "Cropped orbit from {} to {} state vectors",
            svs.len(),
            state_vectors.len()
        );
        OrbitData {
            state_vectors,
            reference_time,
        }
    }

    /// Interpolate orbit position and velocity at `t` seconds since the orbit epoch
    pub fn interpolate(orbit: &OrbitData, t: f64) -> SarResult<([f64; 3], [f64; 3])> {
        let selected = Self::find_interpolation_vectors(orbit, t)?;
        let times: Vec<f64> = selected
            .iter()
            .map(|sv| orbit.seconds_since_epoch(sv.time))
            .collect();

        let mut position = [0.0; 3];
        let mut velocity = [0.0; 3];
        for (i, sv) in selected.iter().enumerate() {
            let mut li = 1.0;
            for (j, &tj) in times.iter().enumerate() {
                if i != j {
                    li *= (t - tj) / (times[i] - tj);
                }
            }
            for coord in 0..3 {
                position[coord] += li * sv.position[coord];
                velocity[coord] += li * sv.velocity[coord];
            }
        }
        Ok((position, velocity))
    }

    /// Select the state vectors centred on `t`
    fn find_interpolation_vectors(orbit: &OrbitData, t: f64) -> SarResult<&[StateVector]> {
        let svs = &orbit.state_vectors;
        if svs.len() < 2 {
            return Err(SarError::Processing(format!(
                "Orbit interpolation needs at least 2 state vectors, got {}",
                svs.len()
            )));
        }

        let first = orbit.seconds_since_epoch(svs[0].time);
        let last = orbit.seconds_since_epoch(svs[svs.len() - 1].time);
        if t < first || t > last {
            return Err(SarError::Processing(format!(
                "Time {:.6} s outside orbit span [{:.3}, {:.3}] s",
                t, first, last
            )));
        }

        let n = INTERPOLATION_POINTS.min(svs.len());
        let closest = svs.partition_point(|sv| orbit.seconds_since_epoch(sv.time) < t);
        let start = closest.saturating_sub(n / 2).min(svs.len() - n);
        Ok(&svs[start..start + n])
    }
}

#[derive(Default)]
struct OsvBuilder {
    time: Option<DateTime<Utc>>,
    values: [Option<f64>; 6],
}

impl OsvBuilder {
    fn build(&self) -> Option<StateVector> {
        let mut v = [0.0; 6];
        for (slot, value) in v.iter_mut().zip(self.values.iter()) {
            *slot = (*value)?;
        }
        Some(StateVector {
            time: self.time?,
            position: [v[0], v[1], v[2]],
            velocity: [v[3], v[4], v[5]],
        })
    }
}
