/// Core data types for the Sentinel-2 scene selection service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O — only types, their fail-safe constructors, and the
/// error enums raised by the platform-facing modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Metric defaults
// ---------------------------------------------------------------------------

/// Mean cloud probability substituted when a scene has no usable cloud
/// probability data. 100 = fully cloudy, so an unscored scene never wins.
pub const DEFAULT_MEAN_CLOUD_PROB: f64 = 100.0;

/// Cloud-pixel fraction substituted when unavailable (1.0 = fully cloudy).
pub const DEFAULT_CLOUD_FRACTION: f64 = 1.0;

/// Valid-pixel fraction substituted when unavailable (0.0 = fully invalid).
pub const DEFAULT_VALID_FRACTION: f64 = 0.0;

// ---------------------------------------------------------------------------
// Scene types
// ---------------------------------------------------------------------------

/// Quality metrics for one candidate scene, reduced over the export polygon
/// by the platform's statistics endpoint.
///
/// All three values are area-weighted means over the sampled pixels. Any
/// metric the platform could not compute is replaced with its worst-case
/// default, so absence biases selection away from the affected scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneMetrics {
    /// Mean per-pixel cloud probability over the export polygon, 0–100.
    pub mean_cloud_prob: f64,
    /// Fraction of sampled pixels whose cloud probability exceeds the
    /// configured threshold, 0–1.
    pub cloud_fraction: f64,
    /// Fraction of sampled pixels with unmasked data in the reference band,
    /// 0–1.
    pub valid_fraction: f64,
}

impl SceneMetrics {
    /// The fully-cloudy, fully-invalid metric set used whenever a reduction
    /// yields nothing usable.
    pub fn worst_case() -> Self {
        SceneMetrics {
            mean_cloud_prob: DEFAULT_MEAN_CLOUD_PROB,
            cloud_fraction: DEFAULT_CLOUD_FRACTION,
            valid_fraction: DEFAULT_VALID_FRACTION,
        }
    }
}

/// One remote-sensing observation covering the region of interest within a
/// query window, paired with its cloud-probability sibling where one exists.
///
/// Candidates are materialized per window and discarded once the window's
/// best scene has been chosen — nothing is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScene {
    /// Catalog item id of the surface-reflectance scene.
    pub scene_id: String,
    /// Acquisition timestamp (UTC).
    pub acquired: DateTime<Utc>,
    /// Catalog item id of the matching cloud-probability item, if the join
    /// found one. `None` means the scene will carry worst-case cloud metrics.
    pub cloud_item: Option<String>,
    /// Reduced quality metrics for this scene.
    pub metrics: SceneMetrics,
}

// ---------------------------------------------------------------------------
// Selection types
// ---------------------------------------------------------------------------

/// Which of the three query windows a selection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowRole {
    Before,
    On,
    After,
}

impl WindowRole {
    /// Lowercase label used in export file names and log output.
    pub fn label(&self) -> &'static str {
        match self {
            WindowRole::Before => "before",
            WindowRole::On => "on",
            WindowRole::After => "after",
        }
    }
}

impl std::fmt::Display for WindowRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Tie-break direction within a near-tie band of equally-cloudy candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePreference {
    /// Prefer the latest acquisition (before-window: closest to the target
    /// date from below).
    Latest,
    /// Prefer the earliest acquisition (after-window: closest to the target
    /// date from above).
    Earliest,
}

/// The outcome of selecting one scene for a window.
///
/// `candidate = None` is the masked-empty placeholder: the window held no
/// candidates at all. Metric accessors return `None` in that case and the
/// condition is visible only through the printed summary — it is not an
/// error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub role: WindowRole,
    pub candidate: Option<CandidateScene>,
    /// For the on-target window only: whether an exact-day match was used
    /// (`Some(false)` means the nearest-day fallback supplied the scene).
    pub exact_day: Option<bool>,
    /// How many candidates the window held before filtering.
    pub window_size: usize,
}

impl Selection {
    /// Mean cloud probability of the chosen scene, absent for the
    /// masked-empty placeholder.
    pub fn roi_cloud(&self) -> Option<f64> {
        self.candidate.as_ref().map(|c| c.metrics.mean_cloud_prob)
    }

    /// Cloud-pixel fraction of the chosen scene, absent when empty.
    pub fn cloud_frac(&self) -> Option<f64> {
        self.candidate.as_ref().map(|c| c.metrics.cloud_fraction)
    }

    /// Valid-pixel fraction of the chosen scene, absent when empty.
    pub fn valid_frac(&self) -> Option<f64> {
        self.candidate.as_ref().map(|c| c.metrics.valid_fraction)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when talking to the EO platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Non-2xx HTTP response from a platform endpoint.
    #[error("HTTP error: {0}")]
    HttpStatus(u16),
    /// The request could not be sent or the response body not read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body could not be deserialized.
    #[error("parse error: {0}")]
    Parse(String),
    /// A response was structurally valid but missing a required field.
    #[error("missing field `{0}` in platform response")]
    MissingField(&'static str),
}

/// Errors raised while deriving the region polygons locally.
#[derive(Debug, Error)]
pub enum RegionError {
    /// The configured EPSG code has no known proj-string.
    #[error("unsupported CRS: EPSG:{0}")]
    UnsupportedEpsg(u32),
    /// proj4rs rejected the projection or the transform itself failed.
    #[error("projection failed: {0}")]
    Projection(String),
}
