/// Render and export requests for chosen scenes.
///
/// Rendering is declarative: the request carries the RGB band triple and a
/// fixed linear stretch, and the platform produces the 8-bit composite
/// clipped to the export polygon. Export submission is fire-and-forget —
/// this module returns the job id and never polls; job success or failure
/// is observed on the platform's own job-monitoring surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bands::rgb_bands;
use crate::config::{ExportConfig, PlatformConfig, VisualizationConfig};
use crate::ingest::reduce::geojson_polygon;
use crate::model::{CandidateScene, PlatformError, WindowRole};
use crate::region::Region;

/// Output format requested for every export: cloud-optimized GeoTIFF.
pub const EXPORT_FORMAT: &str = "COG";

// ============================================================================
// Visualization parameters
// ============================================================================

/// Linear-stretch visualization over the RGB triple.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VisParams {
    /// Bands in red-green-blue order.
    pub bands: [&'static str; 3],
    /// Reflectance mapped to 0.
    pub min: f64,
    /// Reflectance mapped to 255.
    pub max: f64,
    /// Gamma correction applied after the stretch.
    pub gamma: f64,
}

impl VisParams {
    pub fn from_config(cfg: &VisualizationConfig) -> VisParams {
        VisParams {
            bands: rgb_bands(),
            min: cfg.stretch_min,
            max: cfg.stretch_max,
            gamma: cfg.gamma,
        }
    }
}

// ============================================================================
// Export requests
// ============================================================================

/// Export job request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub scene_id: String,
    pub file_name: String,
    pub folder: String,
    /// Export polygon in WGS84, as GeoJSON.
    pub geometry: serde_json::Value,
    /// Output pixel size in meters.
    pub scale: f64,
    /// Output CRS, e.g. "EPSG:32633".
    pub crs: String,
    pub max_pixels: u64,
    pub format: &'static str,
    pub skip_empty_tiles: bool,
    pub visualization: VisParams,
}

#[derive(Debug, Deserialize)]
struct ExportResponse {
    id: Option<String>,
}

/// File name for one export, keyed by window role and acquisition date:
/// `s2_before_20251123`.
pub fn export_file_name(role: WindowRole, acquired: DateTime<Utc>) -> String {
    format!("s2_{}_{}", role.label(), acquired.format("%Y%m%d"))
}

/// Builds the export job request for a chosen scene.
pub fn build_export_request(
    export_cfg: &ExportConfig,
    vis_cfg: &VisualizationConfig,
    region: &Region,
    role: WindowRole,
    chosen: &CandidateScene,
) -> ExportRequest {
    ExportRequest {
        scene_id: chosen.scene_id.clone(),
        file_name: export_file_name(role, chosen.acquired),
        folder: export_cfg.folder.clone(),
        geometry: geojson_polygon(&region.export_geographic),
        scale: export_cfg.scale_m,
        crs: format!("EPSG:{}", export_cfg.epsg),
        max_pixels: export_cfg.max_pixels,
        format: EXPORT_FORMAT,
        skip_empty_tiles: export_cfg.skip_empty_tiles,
        visualization: VisParams::from_config(vis_cfg),
    }
}

/// Submits an export job and returns its id. The job runs asynchronously on
/// the platform; nothing here waits for it.
pub fn submit_export(
    client: &reqwest::blocking::Client,
    cfg: &PlatformConfig,
    request: &ExportRequest,
) -> Result<String, PlatformError> {
    let url = format!("{}/exports", cfg.processing_url.trim_end_matches('/'));

    let response = crate::ingest::with_auth(client.post(&url)).json(request).send()?;
    if !response.status().is_success() {
        return Err(PlatformError::HttpStatus(response.status().as_u16()));
    }

    let parsed: ExportResponse = response
        .json()
        .map_err(|e| PlatformError::Parse(e.to_string()))?;
    parsed.id.ok_or(PlatformError::MissingField("id"))
}

// ============================================================================
// Thumbnails
// ============================================================================

/// URL of a small rendered preview of a scene over the region.
pub fn thumbnail_url(
    cfg: &PlatformConfig,
    scene_id: &str,
    bbox: (f64, f64, f64, f64),
    width: u32,
    height: u32,
) -> String {
    let (w, s, e, n) = bbox;
    format!(
        "{}/thumbnails/{}?bbox={},{},{},{}&width={}&height={}&format=png",
        cfg.processing_url.trim_end_matches('/'),
        scene_id,
        w,
        s,
        e,
        n,
        width,
        height
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegionConfig;
    use crate::model::SceneMetrics;
    use chrono::TimeZone;

    fn chosen() -> CandidateScene {
        CandidateScene {
            scene_id: "S2B_T33UXP_20251123".to_string(),
            acquired: Utc.with_ymd_and_hms(2025, 11, 23, 10, 4, 11).unwrap(),
            cloud_item: Some("S2B_T33UXP_20251123".to_string()),
            metrics: SceneMetrics {
                mean_cloud_prob: 9.0,
                cloud_fraction: 0.05,
                valid_fraction: 0.99,
            },
        }
    }

    #[test]
    fn test_file_name_is_keyed_by_role_and_acquisition_date() {
        assert_eq!(
            export_file_name(WindowRole::Before, chosen().acquired),
            "s2_before_20251123"
        );
        assert_eq!(
            export_file_name(
                WindowRole::On,
                Utc.with_ymd_and_hms(2025, 11, 30, 10, 0, 0).unwrap()
            ),
            "s2_on_20251130"
        );
    }

    #[test]
    fn test_export_request_carries_format_crs_and_tile_skipping() {
        let region = Region::build(&RegionConfig::default()).expect("region");
        let request = build_export_request(
            &ExportConfig::default(),
            &VisualizationConfig::default(),
            &region,
            WindowRole::Before,
            &chosen(),
        );

        let body = serde_json::to_value(&request).expect("serialize");
        assert_eq!(body["sceneId"], "S2B_T33UXP_20251123");
        assert_eq!(body["fileName"], "s2_before_20251123");
        assert_eq!(body["folder"], "s2select");
        assert_eq!(body["format"], "COG");
        assert_eq!(body["crs"], "EPSG:32633");
        assert_eq!(body["scale"], 10.0);
        assert_eq!(body["skipEmptyTiles"], true);
        assert_eq!(body["maxPixels"], 1_000_000_000u64);
        assert_eq!(body["geometry"]["type"], "Polygon");
    }

    #[test]
    fn test_export_geometry_is_the_inset_polygon_not_the_roi() {
        let cfg = RegionConfig::default();
        let region = Region::build(&cfg).expect("region");
        let request = build_export_request(
            &ExportConfig::default(),
            &VisualizationConfig::default(),
            &region,
            WindowRole::After,
            &chosen(),
        );

        let expected = geojson_polygon(&region.export_geographic);
        assert_eq!(request.geometry, expected);
        assert_ne!(request.geometry, geojson_polygon(&region.roi_geographic));
    }

    #[test]
    fn test_visualization_uses_the_rgb_triple_and_configured_stretch() {
        let vis = VisParams::from_config(&VisualizationConfig::default());
        assert_eq!(vis.bands, ["B04", "B03", "B02"]);
        assert_eq!(vis.min, 0.0);
        assert_eq!(vis.max, 3000.0);
        assert_eq!(vis.gamma, 1.2);
    }

    #[test]
    fn test_thumbnail_url_carries_region_and_dimensions() {
        let cfg = PlatformConfig::default();
        let url = thumbnail_url(&cfg, "S2B_T33UXP_20251123", (17.0, 48.1, 17.2, 48.2), 512, 512);
        assert!(url.starts_with("https://sh.dataspace.copernicus.eu/api/v1/thumbnails/S2B_T33UXP_20251123?"));
        assert!(url.contains("bbox=17,48.1,17.2,48.2"));
        assert!(url.contains("width=512"));
        assert!(url.contains("height=512"));
        assert!(url.contains("format=png"));
    }
}
