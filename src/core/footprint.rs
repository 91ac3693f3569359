//! Burst footprints from the annotation geolocation grid

use crate::io::annotation::GeolocationGridPoint;
use crate::types::{SarError, SarResult};
use geo::{BooleanOps, Centroid, Coord, LineString, MultiPolygon, Point, Polygon, Rect};

/// Outline the area covered by image lines `first_line..=last_line`.
///
/// Uses the grid row at or above `first_line` and the row at or below
/// `last_line`, walking the first row left to right and the last row back.
pub fn border_from_grid(
    points: &[GeolocationGridPoint],
    first_line: u32,
    last_line: u32,
) -> SarResult<MultiPolygon<f64>> {
    let mut lines: Vec<u32> = points.iter().map(|p| p.line).collect();
    lines.sort_unstable();
    lines.dedup();

    let (Some(&min_line), Some(&max_line)) = (lines.first(), lines.last()) else {
        return Err(SarError::Metadata("Empty geolocation grid".to_string()));
    };

    let top = lines
        .iter()
        .rev()
        .find(|&&l| l <= first_line)
        .copied()
        .unwrap_or(min_line);
    let bottom = lines
        .iter()
        .find(|&&l| l >= last_line)
        .copied()
        .unwrap_or(max_line);

    if top == bottom {
        return Err(SarError::Metadata(format!(
            "Geolocation grid has a single row around lines {}..{}",
            first_line, last_line
        )));
    }

    let row = |line: u32| {
        let mut row: Vec<&GeolocationGridPoint> =
            points.iter().filter(|p| p.line == line).collect();
        row.sort_by_key(|p| p.pixel);
        row
    };

    let mut ring: Vec<Coord<f64>> = row(top)
        .into_iter()
        .map(|p| Coord { x: p.longitude, y: p.latitude })
        .collect();
    ring.extend(
        row(bottom)
            .into_iter()
            .rev()
            .map(|p| Coord { x: p.longitude, y: p.latitude }),
    );

    Ok(split_antimeridian(Polygon::new(LineString::new(ring), vec![])))
}

/// Split a polygon whose longitudes jump across ±180° into east/west parts
pub fn split_antimeridian(polygon: Polygon<f64>) -> MultiPolygon<f64> {
    let (min_lon, max_lon) = polygon
        .exterior()
        .coords()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c.x), hi.max(c.x))
        });

    if max_lon - min_lon <= 180.0 {
        return MultiPolygon::new(vec![polygon]);
    }

    log::debug!("Footprint crosses the antimeridian, splitting");

    let unwrapped: LineString<f64> = polygon
        .exterior()
        .coords()
        .map(|c| Coord {
            x: if c.x < 0.0 { c.x + 360.0 } else { c.x },
            y: c.y,
        })
        .collect();
    let unwrapped = Polygon::new(unwrapped, vec![]);

    let west = Rect::new(Coord { x: 0.0, y: -90.0 }, Coord { x: 180.0, y: 90.0 }).to_polygon();
    let east = Rect::new(Coord { x: 180.0, y: -90.0 }, Coord { x: 360.0, y: 90.0 }).to_polygon();

    let mut parts: Vec<Polygon<f64>> = unwrapped.intersection(&west).into_iter().collect();
    for part in unwrapped.intersection(&east) {
        let shifted: LineString<f64> = part
            .exterior()
            .coords()
            .map(|c| Coord { x: c.x - 360.0, y: c.y })
            .collect();
        parts.push(Polygon::new(shifted, vec![]));
    }

    MultiPolygon::new(parts)
}

/// Centroid of a footprint
pub fn footprint_center(border: &MultiPolygon<f64>) -> SarResult<Point<f64>> {
    border
        .centroid()
        .ok_or_else(|| SarError::Metadata("Burst border has no centroid".to_string()))
}
