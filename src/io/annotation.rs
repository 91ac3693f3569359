use crate::io::orbit::parse_utc_time;
use crate::types::{OrbitData, SarError, SarResult, StateVector};
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;

/// Sentinel-1 product annotation, rooted at the `<product>` element.
///
/// Only the parts needed to build bursts are modelled; everything else in
/// the file is ignored.
#[derive(Debug, Deserialize)]
pub struct AnnotationRoot {
    #[serde(rename = "adsHeader")]
    pub ads_header: AdsHeader,
    #[serde(rename = "generalAnnotation")]
    pub general_annotation: GeneralAnnotation,
    #[serde(rename = "imageAnnotation")]
    pub image_annotation: ImageAnnotation,
    #[serde(rename = "swathTiming")]
    pub swath_timing: Option<SwathTiming>,
    #[serde(rename = "geolocationGrid")]
    pub geolocation_grid: GeolocationGrid,
}

#[derive(Debug, Deserialize)]
pub struct AdsHeader {
    #[serde(rename = "missionId")]
    pub mission_id: String,
    #[serde(rename = "productType")]
    pub product_type: String,
    pub polarisation: String,
    pub mode: String,
    pub swath: String,
    #[serde(rename = "startTime")]
    pub start_time: String,
    #[serde(rename = "stopTime")]
    pub stop_time: String,
    #[serde(rename = "absoluteOrbitNumber")]
    pub absolute_orbit_number: u32,
}

#[derive(Debug, Deserialize)]
pub struct GeneralAnnotation {
    #[serde(rename = "productInformation")]
    pub product_information: ProductInformation,
    #[serde(rename = "orbitList")]
    pub orbit_list: Option<OrbitList>,
}

#[derive(Debug, Deserialize)]
pub struct ProductInformation {
    pub pass: Option<String>,
    #[serde(rename = "rangeSamplingRate")]
    pub range_sampling_rate: f64,
    #[serde(rename = "radarFrequency")]
    pub radar_frequency: f64,
}

#[derive(Debug, Deserialize)]
pub struct OrbitList {
    #[serde(rename = "orbit", default)]
    pub orbits: Vec<AnnotationOrbit>,
}

#[derive(Debug, Deserialize)]
pub struct AnnotationOrbit {
    pub time: String,
    pub position: Xyz,
    pub velocity: Xyz,
}

#[derive(Debug, Deserialize)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Deserialize)]
pub struct ImageAnnotation {
    #[serde(rename = "imageInformation")]
    pub image_information: ImageInformation,
}

#[derive(Debug, Deserialize)]
pub struct ImageInformation {
    #[serde(rename = "productFirstLineUtcTime")]
    pub product_first_line_utc_time: String,
    #[serde(rename = "productLastLineUtcTime")]
    pub product_last_line_utc_time: String,
    #[serde(rename = "ascendingNodeTime")]
    pub ascending_node_time: String,
    #[serde(rename = "slantRangeTime")]
    pub slant_range_time: f64,
    #[serde(rename = "rangePixelSpacing")]
    pub range_pixel_spacing: f64,
    #[serde(rename = "azimuthTimeInterval")]
    pub azimuth_time_interval: f64,
    #[serde(rename = "numberOfSamples")]
    pub number_of_samples: usize,
    #[serde(rename = "numberOfLines")]
    pub number_of_lines: usize,
}

#[derive(Debug, Deserialize)]
pub struct SwathTiming {
    #[serde(rename = "linesPerBurst")]
    pub lines_per_burst: usize,
    #[serde(rename = "samplesPerBurst")]
    pub samples_per_burst: usize,
    #[serde(rename = "burstList")]
    pub burst_list: BurstList,
}

#[derive(Debug, Deserialize)]
pub struct BurstList {
    #[serde(rename = "burst", default)]
    pub bursts: Vec<BurstEntry>,
}

#[derive(Debug, Deserialize)]
pub struct BurstEntry {
    #[serde(rename = "azimuthTime")]
    pub azimuth_time: String,
    #[serde(rename = "azimuthAnxTime")]
    pub azimuth_anx_time: Option<f64>,
    #[serde(rename = "byteOffset")]
    pub byte_offset: u64,
}

/// Geolocation grid for geographic coordinate extraction
#[derive(Debug, Deserialize)]
pub struct GeolocationGrid {
    #[serde(rename = "geolocationGridPointList")]
    pub geolocation_grid_point_list: GeolocationGridPointList,
}

#[derive(Debug, Deserialize)]
pub struct GeolocationGridPointList {
    #[serde(rename = "geolocationGridPoint", default)]
    pub geolocation_grid_points: Vec<GeolocationGridPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeolocationGridPoint {
    pub line: u32,
    pub pixel: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
}

/// Parser for Sentinel-1 annotation XML files
pub struct AnnotationParser;

impl AnnotationParser {
    /// Parse complete annotation XML
    pub fn parse_annotation(xml_content: &str) -> SarResult<AnnotationRoot> {
        from_str::<AnnotationRoot>(xml_content)
            .map_err(|e| SarError::XmlParsing(format!("Failed to parse annotation XML: {}", e)))
    }

    pub fn first_line_time(annotation: &AnnotationRoot) -> SarResult<DateTime<Utc>> {
        parse_utc_time(&annotation.image_annotation.image_information.product_first_line_utc_time)
    }

    pub fn last_line_time(annotation: &AnnotationRoot) -> SarResult<DateTime<Utc>> {
        parse_utc_time(&annotation.image_annotation.image_information.product_last_line_utc_time)
    }

    /// Orbit state vectors embedded in `generalAnnotation/orbitList`
    pub fn extract_orbit(annotation: &AnnotationRoot) -> SarResult<OrbitData> {
        let orbits = annotation
            .general_annotation
            .orbit_list
            .as_ref()
            .map(|list| list.orbits.as_slice())
            .unwrap_or_default();

        let mut state_vectors = orbits
            .iter()
            .map(|o| {
                Ok(StateVector {
                    time: parse_utc_time(&o.time)?,
                    position: [o.position.x, o.position.y, o.position.z],
                    velocity: [o.velocity.x, o.velocity.y, o.velocity.z],
                })
            })
            .collect::<SarResult<Vec<_>>>()?;

        if state_vectors.is_empty() {
            return Err(SarError::Metadata(
                "No orbit state vectors in annotation".to_string(),
            ));
        }

        state_vectors.sort_by_key(|sv| sv.time);
        let reference_time = state_vectors[0].time;
        Ok(OrbitData {
            state_vectors,
            reference_time,
        })
    }

    pub fn grid_points(annotation: &AnnotationRoot) -> &[GeolocationGridPoint] {
        &annotation
            .geolocation_grid
            .geolocation_grid_point_list
            .geolocation_grid_points
    }
}
