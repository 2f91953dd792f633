/// Replay mode for working without live platform access.
///
/// When the platform is unreachable (or a run should be reproducible), the
/// pipeline can load a previously captured candidate list from a local JSON
/// file instead of searching and scoring live. Selection, rendering
/// parameters, and the printed summary behave identically; only ingest is
/// bypassed. Export submission still requires the live platform.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::CandidateScene;
use crate::select::SelectionWindow;

/// Errors raised while loading a replay capture.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse replay file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk capture format: scored candidates plus an optional note about
/// when they were captured.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReplayCapture {
    #[serde(default)]
    pub captured_at: Option<String>,
    pub candidates: Vec<CandidateScene>,
}

/// Loads all candidates from a capture file.
pub fn load_candidates(path: &Path) -> Result<Vec<CandidateScene>, ReplayError> {
    let text = std::fs::read_to_string(path)?;
    let capture: ReplayCapture = serde_json::from_str(&text)?;
    Ok(capture.candidates)
}

/// Filters a candidate list down to one query window.
pub fn candidates_in_window(
    candidates: &[CandidateScene],
    window: &SelectionWindow,
) -> Vec<CandidateScene> {
    candidates
        .iter()
        .filter(|c| window.contains(c.acquired))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SceneMetrics;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::io::Write;

    fn capture_json() -> String {
        r#"{
            "captured_at": "2025-12-05T08:00:00Z",
            "candidates": [
                {
                    "scene_id": "S2A_T33UXP_20251128",
                    "acquired": "2025-11-28T10:02:31Z",
                    "cloud_item": "S2A_T33UXP_20251128",
                    "metrics": {
                        "mean_cloud_prob": 12.5,
                        "cloud_fraction": 0.08,
                        "valid_fraction": 0.97
                    }
                },
                {
                    "scene_id": "S2B_T33UXP_20251203",
                    "acquired": "2025-12-03T10:04:11Z",
                    "cloud_item": null,
                    "metrics": {
                        "mean_cloud_prob": 100.0,
                        "cloud_fraction": 1.0,
                        "valid_fraction": 0.0
                    }
                }
            ]
        }"#
        .to_string()
    }

    #[test]
    fn test_capture_file_round_trips() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(capture_json().as_bytes()).expect("write");

        let candidates = load_candidates(file.path()).expect("load should succeed");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].scene_id, "S2A_T33UXP_20251128");
        assert_eq!(candidates[1].cloud_item, None);
        assert_eq!(candidates[1].metrics, SceneMetrics::worst_case());
    }

    #[test]
    fn test_malformed_capture_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"{\"candidates\": [{\"scene_id\": 7}]}").expect("write");

        let result = load_candidates(file.path());
        assert!(matches!(result, Err(ReplayError::Parse(_))));
    }

    #[test]
    fn test_missing_capture_is_an_io_error() {
        let result = load_candidates(Path::new("/nonexistent/capture.json"));
        assert!(matches!(result, Err(ReplayError::Io(_))));
    }

    #[test]
    fn test_window_filter_respects_half_open_bounds() {
        let target = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        let window = SelectionWindow::before(target, 30);

        let mk = |id: &str, y: i32, m: u32, d: u32| CandidateScene {
            scene_id: id.to_string(),
            acquired: Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap(),
            cloud_item: None,
            metrics: SceneMetrics::worst_case(),
        };

        let all = vec![
            mk("too-early", 2025, 10, 15),
            mk("inside", 2025, 11, 12),
            mk("on-target", 2025, 11, 30),
        ];
        let filtered = candidates_in_window(&all, &window);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].scene_id, "inside");
    }
}
