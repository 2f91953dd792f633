/// Region builder: derives the square ROI and its inset export polygon.
///
/// The square is laid out axis-aligned in the configured projected CRS,
/// centered on the projected center point, with side length sqrt(area). The
/// export polygon shrinks every side by the buffer distance so metric
/// reduction and export stay clear of edge artifacts. Both polygons are also
/// carried as WGS84 footprints for catalog bbox queries and display.
///
/// Geometry here is intentionally minimal — axis-aligned rectangles only.
/// Anything fancier is the platform's job.

use geo_types::{LineString, Polygon};

use crate::config::RegionConfig;
use crate::model::RegionError;
use crate::projection;

/// The fully-derived region for one pipeline run. Immutable once built.
#[derive(Debug, Clone)]
pub struct Region {
    /// EPSG code of the projected CRS the squares are constructed in.
    pub epsg: u32,
    /// Full square ROI in the projected CRS (meters).
    pub roi: Polygon<f64>,
    /// ROI inset by the buffer on all sides, in the projected CRS.
    pub export: Polygon<f64>,
    /// ROI reprojected to WGS84 lon/lat.
    pub roi_geographic: Polygon<f64>,
    /// Export polygon reprojected to WGS84 lon/lat.
    pub export_geographic: Polygon<f64>,
    side_m: f64,
    buffer_m: f64,
}

impl Region {
    /// Builds the region from configuration. Fails only if the configured
    /// CRS is unsupported or the projection itself errors; degenerate areas
    /// and oversized buffers are left for the platform to reject at
    /// evaluation time.
    pub fn build(cfg: &RegionConfig) -> Result<Region, RegionError> {
        let side_m = cfg.area_m2.sqrt();
        let half = side_m / 2.0;

        let (cx, cy) = projection::forward(cfg.epsg, cfg.center_lon, cfg.center_lat)?;

        let roi = axis_aligned_square(cx, cy, half);
        let export = axis_aligned_square(cx, cy, half - cfg.buffer_m);

        let roi_geographic = unproject_polygon(cfg.epsg, &roi)?;
        let export_geographic = unproject_polygon(cfg.epsg, &export)?;

        Ok(Region {
            epsg: cfg.epsg,
            roi,
            export,
            roi_geographic,
            export_geographic,
            side_m,
            buffer_m: cfg.buffer_m,
        })
    }

    /// Side length of the full ROI in meters (sqrt of the configured area).
    pub fn side_m(&self) -> f64 {
        self.side_m
    }

    /// Half the side length — distance from center to any ROI edge.
    pub fn half_side_m(&self) -> f64 {
        self.side_m / 2.0
    }

    /// Buffer distance between the ROI and the export polygon.
    pub fn buffer_m(&self) -> f64 {
        self.buffer_m
    }

    /// WGS84 bounding box of the full ROI as (west, south, east, north),
    /// the order catalog `bbox` parameters expect.
    pub fn bbox_geographic(&self) -> (f64, f64, f64, f64) {
        bounds(&self.roi_geographic)
    }
}

/// Axis-aligned square centered on (cx, cy) with the given half-side,
/// wound counter-clockwise and explicitly closed.
fn axis_aligned_square(cx: f64, cy: f64, half: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (cx - half, cy - half),
            (cx + half, cy - half),
            (cx + half, cy + half),
            (cx - half, cy + half),
            (cx - half, cy - half),
        ]),
        vec![],
    )
}

/// Reprojects every exterior vertex back to WGS84 lon/lat.
fn unproject_polygon(epsg: u32, polygon: &Polygon<f64>) -> Result<Polygon<f64>, RegionError> {
    let mut coords = Vec::with_capacity(polygon.exterior().0.len());
    for c in &polygon.exterior().0 {
        let (lon, lat) = projection::inverse(epsg, c.x, c.y)?;
        coords.push((lon, lat));
    }
    Ok(Polygon::new(LineString::from(coords), vec![]))
}

/// (min_x, min_y, max_x, max_y) over the exterior ring.
fn bounds(polygon: &Polygon<f64>) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for c in &polygon.exterior().0 {
        min_x = min_x.min(c.x);
        min_y = min_y.min(c.y);
        max_x = max_x.max(c.x);
        max_y = max_y.max(c.y);
    }
    (min_x, min_y, max_x, max_y)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
