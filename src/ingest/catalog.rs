/// STAC catalog client for the scene selection service.
///
/// Retrieves imagery and cloud-probability items over the region of interest
/// for a query window and pairs the two collections client-side. Both
/// collections derive their item ids from the granule identifier, so pairing
/// is a plain id join; a scene whose cloud-probability sibling is missing is
/// kept and later carries worst-case cloud metrics.
///
/// Windows are at most a few weeks of a 5-day-revisit constellation, so a
/// single search page at the configured limit is sufficient.
///
/// API shape: `GET {catalog_url}/collections/{collection}/items` with
/// `bbox`, `datetime` (RFC 3339 interval `start/end`), and `limit`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::config::PlatformConfig;
use crate::model::PlatformError;

// ============================================================================
// Catalog response structures
// ============================================================================

/// STAC item-collection response (the subset of fields this service reads).
#[derive(Debug, Deserialize)]
struct StacItemCollection {
    #[serde(default)]
    features: Vec<StacItem>,
}

#[derive(Debug, Deserialize)]
struct StacItem {
    id: String,
    properties: StacProperties,
}

#[derive(Debug, Deserialize)]
struct StacProperties {
    datetime: Option<String>,
}

/// One catalog item reduced to what selection needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneItem {
    pub id: String,
    pub acquired: DateTime<Utc>,
}

// ============================================================================
// URL construction and parsing
// ============================================================================

/// Builds an item-search URL for one collection, window, and bbox.
///
/// `bbox` is (west, south, east, north) in WGS84; `interval` is an RFC 3339
/// `start/end` pair as produced by `SelectionWindow::datetime_interval`.
pub fn build_item_search_url(
    catalog_url: &str,
    collection: &str,
    bbox: (f64, f64, f64, f64),
    interval: &str,
    limit: u32,
) -> String {
    let (w, s, e, n) = bbox;
    format!(
        "{}/collections/{}/items?bbox={},{},{},{}&datetime={}&limit={}",
        catalog_url.trim_end_matches('/'),
        collection,
        w,
        s,
        e,
        n,
        interval,
        limit
    )
}

/// Parses an item-collection body into scene items.
///
/// Items without a parseable acquisition timestamp are dropped — a scene the
/// catalog cannot date is useless to a date-window selection.
pub fn parse_item_collection(body: &str) -> Result<Vec<SceneItem>, PlatformError> {
    let parsed: StacItemCollection =
        serde_json::from_str(body).map_err(|e| PlatformError::Parse(e.to_string()))?;

    let mut items = Vec::with_capacity(parsed.features.len());
    for feature in parsed.features {
        let Some(datetime) = feature.properties.datetime else {
            continue;
        };
        let Ok(acquired) = DateTime::parse_from_rfc3339(&datetime) else {
            continue;
        };
        items.push(SceneItem {
            id: feature.id,
            acquired: acquired.with_timezone(&Utc),
        });
    }
    Ok(items)
}

// ============================================================================
// Imagery / cloud-probability pairing
// ============================================================================

/// Pairs imagery items with their cloud-probability siblings by shared id.
///
/// The pairing is total over the imagery side: every imagery item appears in
/// the output, with `None` where the join found no sibling. Cloud items with
/// no imagery counterpart are discarded.
pub fn pair_with_cloud(
    imagery: Vec<SceneItem>,
    cloud: &[SceneItem],
) -> Vec<(SceneItem, Option<String>)> {
    let cloud_ids: HashMap<&str, &SceneItem> =
        cloud.iter().map(|c| (c.id.as_str(), c)).collect();

    imagery
        .into_iter()
        .map(|scene| {
            let sibling = cloud_ids.get(scene.id.as_str()).map(|c| c.id.clone());
            (scene, sibling)
        })
        .collect()
}

// ============================================================================
// Live catalog calls
// ============================================================================

/// Fetches all items of one collection intersecting the bbox and window.
pub fn fetch_items(
    client: &reqwest::blocking::Client,
    cfg: &PlatformConfig,
    collection: &str,
    bbox: (f64, f64, f64, f64),
    interval: &str,
) -> Result<Vec<SceneItem>, PlatformError> {
    let url = build_item_search_url(&cfg.catalog_url, collection, bbox, interval, cfg.search_limit);

    let response = super::with_auth(client.get(&url)).send()?;
    if !response.status().is_success() {
        return Err(PlatformError::HttpStatus(response.status().as_u16()));
    }

    parse_item_collection(&response.text()?)
}

/// Fetches one window's candidates: imagery items paired with their
/// cloud-probability siblings.
///
/// An empty window is a normal outcome and returns an empty list; only
/// transport and parse failures are errors.
pub fn fetch_window(
    client: &reqwest::blocking::Client,
    cfg: &PlatformConfig,
    bbox: (f64, f64, f64, f64),
    interval: &str,
) -> Result<Vec<(SceneItem, Option<String>)>, PlatformError> {
    let imagery = fetch_items(client, cfg, &cfg.imagery_collection, bbox, interval)?;
    if imagery.is_empty() {
        return Ok(Vec::new());
    }

    let cloud = fetch_items(client, cfg, &cfg.cloud_collection, bbox, interval)?;
    let paired = pair_with_cloud(imagery, &cloud);

    for (scene, sibling) in &paired {
        if sibling.is_none() {
            warn!(
                scene = %scene.id,
                "no cloud-probability sibling; scene will carry worst-case cloud metrics"
            );
        }
    }

    Ok(paired)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(id: &str, datetime: &str) -> String {
        format!(
            r#"{{"id": "{id}", "properties": {{"datetime": "{datetime}"}}}}"#
        )
    }

    fn item_collection(items: &[String]) -> String {
        format!(r#"{{"type": "FeatureCollection", "features": [{}]}}"#, items.join(","))
    }

    #[test]
    fn test_search_url_carries_bbox_window_and_limit() {
        let url = build_item_search_url(
            "https://catalogue.dataspace.copernicus.eu/stac",
            "sentinel-2-l2a",
            (17.0, 48.1, 17.2, 48.2),
            "2025-10-31T00:00:00Z/2025-11-30T00:00:00Z",
            100,
        );
        assert!(url.starts_with(
            "https://catalogue.dataspace.copernicus.eu/stac/collections/sentinel-2-l2a/items?"
        ));
        assert!(url.contains("bbox=17,48.1,17.2,48.2"));
        assert!(url.contains("datetime=2025-10-31T00:00:00Z/2025-11-30T00:00:00Z"));
        assert!(url.contains("limit=100"));
    }

    #[test]
    fn test_trailing_slash_on_catalog_url_is_tolerated() {
        let url = build_item_search_url(
            "https://example.net/stac/",
            "sentinel-2-l2a",
            (0.0, 0.0, 1.0, 1.0),
            "2025-01-01T00:00:00Z/2025-01-02T00:00:00Z",
            50,
        );
        assert!(!url.contains("stac//"));
    }

    #[test]
    fn test_parse_item_collection_extracts_id_and_timestamp() {
        let body = item_collection(&[
            item("S2A_T33UXP_20251128", "2025-11-28T10:02:31Z"),
            item("S2B_T33UXP_20251123", "2025-11-23T10:04:11Z"),
        ]);
        let items = parse_item_collection(&body).expect("should parse");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "S2A_T33UXP_20251128");
        assert_eq!(
            items[0].acquired,
            Utc.with_ymd_and_hms(2025, 11, 28, 10, 2, 31).unwrap()
        );
    }

    #[test]
    fn test_items_without_a_timestamp_are_dropped() {
        let body = format!(
            r#"{{"features": [
                {},
                {{"id": "undated", "properties": {{"datetime": null}}}},
                {{"id": "garbled", "properties": {{"datetime": "not-a-date"}}}}
            ]}}"#,
            item("dated", "2025-11-28T10:02:31Z"),
        );
        let items = parse_item_collection(&body).expect("should parse");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "dated");
    }

    #[test]
    fn test_empty_feature_list_parses_to_no_items() {
        let items = parse_item_collection(r#"{"features": []}"#).expect("should parse");
        assert!(items.is_empty());
    }

    #[test]
    fn test_malformed_body_is_a_parse_error() {
        let result = parse_item_collection("{not json");
        assert!(matches!(result, Err(PlatformError::Parse(_))));
    }

    #[test]
    fn test_pairing_joins_on_shared_id() {
        let imagery = parse_item_collection(&item_collection(&[
            item("granule-a", "2025-11-28T10:02:31Z"),
            item("granule-b", "2025-11-23T10:04:11Z"),
        ]))
        .unwrap();
        let cloud = parse_item_collection(&item_collection(&[
            item("granule-b", "2025-11-23T10:04:11Z"),
            item("granule-c", "2025-11-18T10:05:51Z"),
        ]))
        .unwrap();

        let paired = pair_with_cloud(imagery, &cloud);
        assert_eq!(paired.len(), 2);

        // granule-a has no sibling, granule-b does, granule-c is discarded
        assert_eq!(paired[0].0.id, "granule-a");
        assert_eq!(paired[0].1, None);
        assert_eq!(paired[1].0.id, "granule-b");
        assert_eq!(paired[1].1.as_deref(), Some("granule-b"));
    }

    #[test]
    fn test_pairing_keeps_every_imagery_item() {
        let imagery = parse_item_collection(&item_collection(&[
            item("a", "2025-11-28T10:02:31Z"),
            item("b", "2025-11-23T10:04:11Z"),
            item("c", "2025-11-18T10:05:51Z"),
        ]))
        .unwrap();

        let paired = pair_with_cloud(imagery.clone(), &[]);
        assert_eq!(paired.len(), imagery.len());
        assert!(paired.iter().all(|(_, sibling)| sibling.is_none()));
    }
}
