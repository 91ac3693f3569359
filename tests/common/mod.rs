//! Synthetic Sentinel-1 IW product shared by the integration tests.
//!
//! The orbit is a northbound circle through lon 0 that crosses the equator
//! 60 s after `EPOCH`, so the zero-Doppler time of any target has a closed
//! form. Each of the three sub-swaths holds three 3 s bursts starting at
//! 58 s, 61 s and 64 s.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const PRODUCT: &str =
    "S1A_IW_SLC__1SDV_20250809T044058_20250809T044107_060000_075A1C_ABCD";
pub const POEORB: &str =
    "S1A_OPER_AUX_POEORB_OPOD_20250829T070946_V20250808T225942_20250810T005942.EOF";
pub const RESORB: &str =
    "S1A_OPER_AUX_RESORB_OPOD_20250809T080000_V20250809T034000_20250809T065000.EOF";

pub const RADIUS: f64 = 7_071_000.0;
pub const SPEED: f64 = 7_500.0;
pub const WAVELENGTH_FREQ: f64 = 5.405e9;
pub const AZIMUTH_TIME_INTERVAL: f64 = 0.002;
pub const LINES_PER_BURST: usize = 1500;
pub const SAMPLES: usize = 20000;
pub const RANGE_PIXEL_SPACING: f64 = 2.33;
pub const BURST_STARTS: [f64; 3] = [58.0, 61.0, 64.0];

const C: f64 = 299_792_458.0;

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 9, 4, 40, 0).unwrap()
}

pub fn ascending_node() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 9, 4, 25, 0).unwrap()
}

pub fn at(seconds: f64) -> DateTime<Utc> {
    epoch() + Duration::microseconds((seconds * 1e6).round() as i64)
}

fn timestamp(seconds: f64) -> String {
    at(seconds).format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

pub fn omega() -> f64 {
    SPEED / RADIUS
}

/// Orbit angle from the equator at `t` seconds after the epoch
pub fn orbit_angle(t: f64) -> f64 {
    omega() * (t - 60.0)
}

pub fn state_vector(t: f64) -> ([f64; 3], [f64; 3]) {
    let a = orbit_angle(t);
    (
        [RADIUS * a.cos(), 0.0, RADIUS * a.sin()],
        [-SPEED * a.sin(), 0.0, SPEED * a.cos()],
    )
}

/// (lon near range, lon far range) covered by a sub-swath
pub fn swath_lons(swath: u8) -> (f64, f64) {
    match swath {
        1 => (1.5, 3.0),
        2 => (2.8, 4.3),
        _ => (4.1, 5.6),
    }
}

pub fn starting_range(swath: u8) -> f64 {
    match swath {
        1 => 740_000.0,
        2 => 760_000.0,
        _ => 790_000.0,
    }
}

fn state_vector_times() -> impl Iterator<Item = f64> {
    (0..13).map(|i| i as f64 * 10.0)
}

pub fn annotation_xml(swath: u8, pol: &str) -> String {
    let mut orbits = String::new();
    for t in state_vector_times() {
        let (p, v) = state_vector(t);
        orbits.push_str(&format!(
            "      <orbit><time>{}</time><frame>Earth Fixed</frame>\
             <position><x>{}</x><y>{}</y><z>{}</z></position>\
             <velocity><x>{}</x><y>{}</y><z>{}</z></velocity></orbit>\n",
            timestamp(t),
            p[0],
            p[1],
            p[2],
            v[0],
            v[1],
            v[2]
        ));
    }

    let mut bursts = String::new();
    for (i, &start) in BURST_STARTS.iter().enumerate() {
        bursts.push_str(&format!(
            "      <burst><azimuthTime>{}</azimuthTime><azimuthAnxTime>{}</azimuthAnxTime>\
             <byteOffset>{}</byteOffset></burst>\n",
            timestamp(start),
            900.0 + start,
            109_035 + i * LINES_PER_BURST * SAMPLES * 4
        ));
    }

    let (near, far) = swath_lons(swath);
    let mut grid = String::new();
    let mut count = 0;
    for line in (0..=BURST_STARTS.len()).map(|i| i * LINES_PER_BURST) {
        let t = BURST_STARTS[0] + line as f64 * AZIMUTH_TIME_INTERVAL;
        let lat = orbit_angle(t).to_degrees();
        for (pixel, lon) in [(0, near), (SAMPLES / 2, (near + far) / 2.0), (SAMPLES - 1, far)] {
            count += 1;
            grid.push_str(&format!(
                "      <geolocationGridPoint><azimuthTime>{}</azimuthTime><line>{}</line>\
                 <pixel>{}</pixel><latitude>{}</latitude><longitude>{}</longitude>\
                 <height>0</height></geolocationGridPoint>\n",
                timestamp(t),
                line,
                pixel,
                lat,
                lon
            ));
        }
    }

    let lines = BURST_STARTS.len() * LINES_PER_BURST;
    let first = BURST_STARTS[0];
    let last = first + (lines - 1) as f64 * AZIMUTH_TIME_INTERVAL;

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<product>
  <adsHeader>
    <missionId>S1A</missionId>
    <productType>SLC</productType>
    <polarisation>{pol_upper}</polarisation>
    <mode>IW</mode>
    <swath>IW{swath}</swath>
    <startTime>{first_time}</startTime>
    <stopTime>{last_time}</stopTime>
    <absoluteOrbitNumber>60000</absoluteOrbitNumber>
  </adsHeader>
  <generalAnnotation>
    <productInformation>
      <pass>Ascending</pass>
      <rangeSamplingRate>6.4345238125e+07</rangeSamplingRate>
      <radarFrequency>{freq}</radarFrequency>
    </productInformation>
    <orbitList count="13">
{orbits}    </orbitList>
  </generalAnnotation>
  <imageAnnotation>
    <imageInformation>
      <productFirstLineUtcTime>{first_time}</productFirstLineUtcTime>
      <productLastLineUtcTime>{last_time}</productLastLineUtcTime>
      <ascendingNodeTime>{anx}</ascendingNodeTime>
      <slantRangeTime>{srt}</slantRangeTime>
      <rangePixelSpacing>{rps}</rangePixelSpacing>
      <azimuthTimeInterval>{ati}</azimuthTimeInterval>
      <numberOfSamples>{samples}</numberOfSamples>
      <numberOfLines>{lines}</numberOfLines>
    </imageInformation>
  </imageAnnotation>
  <swathTiming>
    <linesPerBurst>{lpb}</linesPerBurst>
    <samplesPerBurst>{samples}</samplesPerBurst>
    <burstList count="3">
{bursts}    </burstList>
  </swathTiming>
  <geolocationGrid>
    <geolocationGridPointList count="{count}">
{grid}    </geolocationGridPointList>
  </geolocationGrid>
</product>
"#,
        pol_upper = pol.to_uppercase(),
        swath = swath,
        first_time = timestamp(first),
        last_time = timestamp(last),
        freq = WAVELENGTH_FREQ,
        orbits = orbits,
        anx = ascending_node().format("%Y-%m-%dT%H:%M:%S%.6f"),
        srt = 2.0 * starting_range(swath) / C,
        rps = RANGE_PIXEL_SPACING,
        ati = AZIMUTH_TIME_INTERVAL,
        samples = SAMPLES,
        lines = lines,
        lpb = LINES_PER_BURST,
        bursts = bursts,
        count = count,
        grid = grid,
    )
}

/// Earth Explorer orbit file holding the same state vectors as the annotation
pub fn eof_content() -> String {
    let mut osvs = String::new();
    for t in state_vector_times() {
        let (p, v) = state_vector(t);
        osvs.push_str(&format!(
            "      <OSV>\n\
             \x20       <TAI>TAI={tai}</TAI>\n\
             \x20       <UTC>UTC={utc}</UTC>\n\
             \x20       <UT1>UT1={utc}</UT1>\n\
             \x20       <Absolute_Orbit>+60000</Absolute_Orbit>\n\
             \x20       <X unit=\"m\">{:.6}</X>\n\
             \x20       <Y unit=\"m\">{:.6}</Y>\n\
             \x20       <Z unit=\"m\">{:.6}</Z>\n\
             \x20       <VX unit=\"m/s\">{:.6}</VX>\n\
             \x20       <VY unit=\"m/s\">{:.6}</VY>\n\
             \x20       <VZ unit=\"m/s\">{:.6}</VZ>\n\
             \x20       <Quality>NOMINAL</Quality>\n\
             \x20     </OSV>\n",
            p[0],
            p[1],
            p[2],
            v[0],
            v[1],
            v[2],
            tai = timestamp(t + 37.0),
            utc = timestamp(t),
        ));
    }
    format!(
        "<?xml version=\"1.0\" ?>\n<Earth_Explorer_File>\n  <Data_Block type=\"xml\">\n    \
         <List_of_OSVs count=\"13\">\n{}    </List_of_OSVs>\n  </Data_Block>\n</Earth_Explorer_File>\n",
        osvs
    )
}

fn stem(swath: u8, pol: &str, index: usize) -> String {
    format!(
        "s1a-iw{}-slc-{}-20250809t044058-20250809t044107-060000-075a1c-{:03}",
        swath, pol, index
    )
}

/// Relative member paths and contents of the synthetic product
pub fn product_members() -> Vec<(String, String)> {
    let manifest = "<xfdu:XFDU><safe:orbitReference>\
                    <safe:orbitNumber type=\"start\">60000</safe:orbitNumber>\
                    <safe:orbitNumber type=\"stop\">60000</safe:orbitNumber>\
                    </safe:orbitReference></xfdu:XFDU>";
    let mut members = vec![("manifest.safe".to_string(), manifest.to_string())];
    // same naming as a swath annotation, must never be picked up
    members.push((
        format!("annotation/calibration/{}.xml", stem(1, "vv", 4)),
        "<calibration/>".to_string(),
    ));

    let mut index = 1;
    for swath in 1..=3u8 {
        for pol in ["vh", "vv"] {
            members.push((
                format!("annotation/{}.xml", stem(swath, pol, index)),
                annotation_xml(swath, pol),
            ));
            members.push((format!("measurement/{}.tiff", stem(swath, pol, index)), String::new()));
            index += 1;
        }
    }
    members
}

pub fn write_safe_dir(root: &Path) -> PathBuf {
    let safe = root.join(format!("{}.SAFE", PRODUCT));
    for (member, content) in product_members() {
        let path = safe.join(&member);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    safe
}

pub fn write_safe_zip(root: &Path) -> PathBuf {
    let zip_path = root.join(format!("{}.zip", PRODUCT));
    let mut writer = zip::ZipWriter::new(File::create(&zip_path).unwrap());
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (member, content) in product_members() {
        writer
            .start_file(format!("{}.SAFE/{}", PRODUCT, member), options)
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    zip_path
}

/// Orbit directory with a precise, a restituted and two non-matching files
pub fn write_orbit_dir(root: &Path) -> PathBuf {
    let dir = root.join("orbits");
    fs::create_dir_all(&dir).unwrap();
    let content = eof_content();
    for name in [
        POEORB,
        RESORB,
        "S1B_OPER_AUX_POEORB_OPOD_20250829T070946_V20250808T225942_20250810T005942.EOF",
        "S1A_OPER_AUX_POEORB_OPOD_20250828T070946_V20250807T225942_20250809T005942.EOF",
    ] {
        fs::write(dir.join(name), &content).unwrap();
    }
    fs::write(dir.join("README.txt"), "not an orbit").unwrap();
    dir
}
