/// Local coordinate reprojection for region construction.
///
/// Only the handful of CRS families this service configures are supported:
/// WGS84 geographic, Web Mercator, and the UTM grid. Everything heavier
/// (per-pixel warping, raster reprojection) happens on the platform side —
/// this module exists solely so the square ROI can be laid out in meters and
/// handed back to the catalog as a geographic footprint.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::model::RegionError;

/// WGS84 geographic (longitude/latitude in degrees).
pub const EPSG_WGS84: u32 = 4326;

/// Web Mercator.
pub const EPSG_WEB_MERCATOR: u32 = 3857;

/// Returns the proj-string for a supported EPSG code, `None` otherwise.
pub fn proj_string_for_epsg(epsg: u32) -> Option<String> {
    match epsg {
        EPSG_WGS84 => Some("+proj=longlat +datum=WGS84 +no_defs".to_string()),
        EPSG_WEB_MERCATOR => Some(
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 \
             +k=1 +units=m +nadgrids=@null +no_defs"
                .to_string(),
        ),
        // UTM north zones 1-60
        32601..=32660 => Some(format!(
            "+proj=utm +zone={} +datum=WGS84 +units=m +no_defs",
            epsg - 32600
        )),
        // UTM south zones 1-60
        32701..=32760 => Some(format!(
            "+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs",
            epsg - 32700
        )),
        _ => None,
    }
}

/// True if the CRS uses degrees (needs radian conversion around proj4rs).
pub fn is_geographic(epsg: u32) -> bool {
    epsg == EPSG_WGS84
}

fn proj_for(epsg: u32) -> Result<Proj, RegionError> {
    let s = proj_string_for_epsg(epsg).ok_or(RegionError::UnsupportedEpsg(epsg))?;
    Proj::from_proj_string(&s)
        .map_err(|e| RegionError::Projection(format!("EPSG:{epsg}: {e:?}")))
}

/// Transforms a single coordinate between two supported CRS.
///
/// Geographic coordinates are degrees on both sides; proj4rs works in
/// radians internally, so the conversion is handled here.
pub fn transform_point(
    source_epsg: u32,
    target_epsg: u32,
    x: f64,
    y: f64,
) -> Result<(f64, f64), RegionError> {
    let source = proj_for(source_epsg)?;
    let target = proj_for(target_epsg)?;

    let (in_x, in_y) = if is_geographic(source_epsg) {
        (x.to_radians(), y.to_radians())
    } else {
        (x, y)
    };

    let mut point = (in_x, in_y, 0.0);
    transform(&source, &target, &mut point)
        .map_err(|e| RegionError::Projection(format!("{e:?}")))?;

    if is_geographic(target_epsg) {
        Ok((point.0.to_degrees(), point.1.to_degrees()))
    } else {
        Ok((point.0, point.1))
    }
}

/// Projects a WGS84 lon/lat coordinate into the target CRS (meters).
pub fn forward(target_epsg: u32, lon: f64, lat: f64) -> Result<(f64, f64), RegionError> {
    transform_point(EPSG_WGS84, target_epsg, lon, lat)
}

/// Unprojects a coordinate from the source CRS back to WGS84 lon/lat.
pub fn inverse(source_epsg: u32, x: f64, y: f64) -> Result<(f64, f64), RegionError> {
    transform_point(source_epsg, EPSG_WGS84, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_epsg_codes_have_proj_strings() {
        assert!(proj_string_for_epsg(4326).is_some());
        assert!(proj_string_for_epsg(3857).is_some());
        assert!(proj_string_for_epsg(32633).is_some());
        assert!(proj_string_for_epsg(32733).is_some());
    }

    #[test]
    fn test_unknown_epsg_code_is_unsupported() {
        assert!(proj_string_for_epsg(27700).is_none());
        let err = forward(27700, 0.0, 51.0).unwrap_err();
        assert!(matches!(err, RegionError::UnsupportedEpsg(27700)));
    }

    #[test]
    fn test_utm_zone_number_is_derived_from_the_code() {
        let s = proj_string_for_epsg(32610).unwrap();
        assert!(s.contains("+zone=10"));
        assert!(!s.contains("+south"));

        let s = proj_string_for_epsg(32722).unwrap();
        assert!(s.contains("+zone=22"));
        assert!(s.contains("+south"));
    }

    #[test]
    fn test_utm_central_meridian_maps_near_false_easting() {
        // Zone 33's central meridian is 15°E; a point on it should project
        // very close to the 500 km false easting.
        let (x, _y) = forward(32633, 15.0, 48.0).expect("forward projection");
        assert!(
            (x - 500_000.0).abs() < 1.0,
            "central meridian should sit at the false easting, got {x}"
        );
    }

    #[test]
    fn test_forward_then_inverse_round_trips() {
        let (x, y) = forward(32633, 17.1093, 48.1517).expect("forward");
        let (lon, lat) = inverse(32633, x, y).expect("inverse");
        assert!((lon - 17.1093).abs() < 1e-6, "lon round trip, got {lon}");
        assert!((lat - 48.1517).abs() < 1e-6, "lat round trip, got {lat}");
    }

    #[test]
    fn test_one_degree_of_latitude_is_about_111_km() {
        let (_x1, y1) = forward(32633, 15.0, 48.0).expect("forward");
        let (_x2, y2) = forward(32633, 15.0, 49.0).expect("forward");
        let dy = y2 - y1;
        assert!(
            (dy - 111_000.0).abs() < 1_000.0,
            "expected ~111 km per degree latitude, got {dy}"
        );
    }
}
