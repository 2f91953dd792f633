/// Metric reduction client: per-scene quality statistics.
///
/// For each candidate the service POSTs a statistics request over the export
/// polygon and receives area-weighted summary values back. The reduction is
/// bounded: the request names a pixel ceiling and asks for best-effort
/// degradation, so the platform samples more coarsely instead of failing on
/// large regions. A degraded response is logged but its values are used
/// as-is — metric values are approximate by contract, never exact.
///
/// Every response field is optional. Whatever the platform could not compute
/// is replaced with its worst-case default so that a failed or partial
/// reduction biases selection away from the affected scene, never toward it.

use geo_types::Polygon;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::bands::{BAND_CLOUD_PROB, REFERENCE_BAND};
use crate::config::PlatformConfig;
use crate::ingest::catalog::SceneItem;
use crate::model::{CandidateScene, PlatformError, SceneMetrics};

// ============================================================================
// Request / response structures
// ============================================================================

/// Statistics request body for one scene.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsRequest {
    /// Imagery item the reduction runs against.
    pub scene_id: String,
    /// Cloud-probability item joined to the scene, when the catalog had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_item: Option<String>,
    /// Band carrying per-pixel cloud probability.
    pub cloud_band: String,
    /// Band whose mask defines valid-pixel accounting.
    pub reference_band: String,
    /// GeoJSON polygon (WGS84) the statistics are computed over.
    pub geometry: serde_json::Value,
    /// Sampling resolution in meters.
    pub scale: f64,
    /// Pixels with cloud probability above this count as cloudy.
    pub cloud_prob_threshold: f64,
    /// Ceiling on sampled pixels before best-effort degradation kicks in.
    pub max_pixels: u64,
    /// Ask the platform to degrade sampling rather than fail the reduction.
    pub best_effort: bool,
}

/// Statistics response. All metric fields are optional — the platform omits
/// whatever it could not compute (no coverage, missing band, masked input).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub mean_cloud_prob: Option<f64>,
    pub cloud_fraction: Option<f64>,
    pub valid_fraction: Option<f64>,
    /// How many pixels actually went into the reduction.
    pub sampled_pixels: Option<u64>,
    /// True when the pixel ceiling forced coarser sampling or the reduction
    /// covered only part of the polygon.
    #[serde(default)]
    pub degraded: bool,
}

// ============================================================================
// Request construction and parsing
// ============================================================================

/// GeoJSON encoding of a polygon's exterior ring.
pub fn geojson_polygon(polygon: &Polygon<f64>) -> serde_json::Value {
    let ring: Vec<[f64; 2]> = polygon.exterior().0.iter().map(|c| [c.x, c.y]).collect();
    json!({
        "type": "Polygon",
        "coordinates": [ring],
    })
}

/// Builds the statistics request for one scene over the export polygon.
pub fn build_statistics_request(
    cfg: &PlatformConfig,
    scene: &SceneItem,
    cloud_item: Option<&str>,
    export_polygon: &Polygon<f64>,
    cloud_prob_threshold: f64,
) -> StatisticsRequest {
    StatisticsRequest {
        scene_id: scene.id.clone(),
        cloud_item: cloud_item.map(str::to_string),
        cloud_band: BAND_CLOUD_PROB.to_string(),
        reference_band: REFERENCE_BAND.to_string(),
        geometry: geojson_polygon(export_polygon),
        scale: cfg.reduce_scale_m,
        cloud_prob_threshold,
        max_pixels: cfg.reduce_max_pixels,
        best_effort: true,
    }
}

/// Parses a statistics response body.
pub fn parse_statistics_response(body: &str) -> Result<StatisticsResponse, PlatformError> {
    serde_json::from_str(body).map_err(|e| PlatformError::Parse(e.to_string()))
}

/// Collapses a statistics response into scene metrics, substituting the
/// worst-case default for every absent value.
pub fn metrics_from_response(response: &StatisticsResponse) -> SceneMetrics {
    let worst = SceneMetrics::worst_case();
    SceneMetrics {
        mean_cloud_prob: response.mean_cloud_prob.unwrap_or(worst.mean_cloud_prob),
        cloud_fraction: response.cloud_fraction.unwrap_or(worst.cloud_fraction),
        valid_fraction: response.valid_fraction.unwrap_or(worst.valid_fraction),
    }
}

// ============================================================================
// Live reduction calls
// ============================================================================

/// Runs the statistics reduction for one scene.
pub fn fetch_metrics(
    client: &reqwest::blocking::Client,
    cfg: &PlatformConfig,
    scene: &SceneItem,
    cloud_item: Option<&str>,
    export_polygon: &Polygon<f64>,
    cloud_prob_threshold: f64,
) -> Result<SceneMetrics, PlatformError> {
    let url = format!("{}/statistics", cfg.processing_url.trim_end_matches('/'));
    let request = build_statistics_request(cfg, scene, cloud_item, export_polygon, cloud_prob_threshold);

    let response = super::with_auth(client.post(&url)).json(&request).send()?;
    if !response.status().is_success() {
        return Err(PlatformError::HttpStatus(response.status().as_u16()));
    }

    let parsed = parse_statistics_response(&response.text()?)?;
    if parsed.degraded {
        warn!(
            scene = %scene.id,
            sampled_pixels = ?parsed.sampled_pixels,
            "statistics reduction was degraded; using best-effort values"
        );
    }

    Ok(metrics_from_response(&parsed))
}

/// Scores one window's paired items into candidates.
///
/// A reduction that fails outright is treated the same as one that returned
/// nothing: the scene keeps worst-case metrics and stays in the pool, where
/// the quality tiers will pass it over unless nothing better exists.
pub fn score_candidates(
    client: &reqwest::blocking::Client,
    cfg: &PlatformConfig,
    paired: Vec<(SceneItem, Option<String>)>,
    export_polygon: &Polygon<f64>,
    cloud_prob_threshold: f64,
) -> Vec<CandidateScene> {
    paired
        .into_iter()
        .map(|(scene, cloud_item)| {
            let metrics = match fetch_metrics(
                client,
                cfg,
                &scene,
                cloud_item.as_deref(),
                export_polygon,
                cloud_prob_threshold,
            ) {
                Ok(metrics) => metrics,
                Err(e) => {
                    warn!(scene = %scene.id, error = %e, "reduction failed; scoring worst-case");
                    SceneMetrics::worst_case()
                }
            };
            CandidateScene {
                scene_id: scene.id,
                acquired: scene.acquired,
                cloud_item,
                metrics,
            }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use geo_types::LineString;

    fn unit_square() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (17.0, 48.0),
                (17.1, 48.0),
                (17.1, 48.1),
                (17.0, 48.1),
                (17.0, 48.0),
            ]),
            vec![],
        )
    }

    fn scene() -> SceneItem {
        SceneItem {
            id: "S2A_T33UXP_20251128".to_string(),
            acquired: Utc.with_ymd_and_hms(2025, 11, 28, 10, 2, 31).unwrap(),
        }
    }

    #[test]
    fn test_geojson_polygon_encodes_the_exterior_ring() {
        let geometry = geojson_polygon(&unit_square());
        assert_eq!(geometry["type"], "Polygon");
        let ring = geometry["coordinates"][0].as_array().expect("ring");
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0][0], 17.0);
        assert_eq!(ring[0][1], 48.0);
        assert_eq!(ring[0], ring[4], "ring must be closed");
    }

    #[test]
    fn test_request_carries_bands_threshold_and_ceiling() {
        let cfg = PlatformConfig::default();
        let request =
            build_statistics_request(&cfg, &scene(), Some("S2A_T33UXP_20251128"), &unit_square(), 40.0);

        let body = serde_json::to_value(&request).expect("serialize");
        assert_eq!(body["sceneId"], "S2A_T33UXP_20251128");
        assert_eq!(body["cloudBand"], "probability");
        assert_eq!(body["referenceBand"], "B04");
        assert_eq!(body["cloudProbThreshold"], 40.0);
        assert_eq!(body["maxPixels"], 100_000_000);
        assert_eq!(body["bestEffort"], true);
        assert_eq!(body["scale"], 20.0);
    }

    #[test]
    fn test_request_omits_absent_cloud_item() {
        let cfg = PlatformConfig::default();
        let request = build_statistics_request(&cfg, &scene(), None, &unit_square(), 40.0);
        let body = serde_json::to_value(&request).expect("serialize");
        assert!(body.get("cloudItem").is_none());
    }

    #[test]
    fn test_full_response_parses_into_metrics() {
        let response = parse_statistics_response(
            r#"{"meanCloudProb": 12.5, "cloudFraction": 0.08, "validFraction": 0.97,
                "sampledPixels": 24500, "degraded": false}"#,
        )
        .expect("should parse");

        let metrics = metrics_from_response(&response);
        assert!((metrics.mean_cloud_prob - 12.5).abs() < 1e-9);
        assert!((metrics.cloud_fraction - 0.08).abs() < 1e-9);
        assert!((metrics.valid_fraction - 0.97).abs() < 1e-9);
        assert!(!response.degraded);
    }

    #[test]
    fn test_absent_metrics_fall_back_to_worst_case() {
        let response = parse_statistics_response(
            r#"{"meanCloudProb": null, "cloudFraction": null, "validFraction": null}"#,
        )
        .expect("should parse");

        let metrics = metrics_from_response(&response);
        assert_eq!(metrics, SceneMetrics::worst_case());
    }

    #[test]
    fn test_partially_absent_response_defaults_only_the_missing_fields() {
        let response =
            parse_statistics_response(r#"{"meanCloudProb": 33.0}"#).expect("should parse");

        let metrics = metrics_from_response(&response);
        assert!((metrics.mean_cloud_prob - 33.0).abs() < 1e-9);
        assert_eq!(metrics.cloud_fraction, 1.0);
        assert_eq!(metrics.valid_fraction, 0.0);
    }

    #[test]
    fn test_degraded_flag_is_surfaced() {
        let response = parse_statistics_response(
            r#"{"meanCloudProb": 20.0, "cloudFraction": 0.2, "validFraction": 0.9,
                "sampledPixels": 100000000, "degraded": true}"#,
        )
        .expect("should parse");
        assert!(response.degraded);
        assert_eq!(response.sampled_pixels, Some(100_000_000));
    }

    #[test]
    fn test_malformed_response_is_a_parse_error() {
        let result = parse_statistics_response("not json");
        assert!(matches!(result, Err(PlatformError::Parse(_))));
    }
}
