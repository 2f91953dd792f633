/// Pipeline configuration for the Sentinel-2 scene selection service.
///
/// Every tunable of the pipeline lives in one immutable `PipelineConfig`
/// passed into each stage — there is no process-global state. Values come
/// from an optional TOML file layered over compiled-in defaults, so a config
/// file only needs to name the fields it changes.
///
/// Dates are written as quoted ISO strings (`target_date = "2025-11-30"`).

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the platform bearer token. Loaded via
/// `.env` support in the binary; URL building and replay work without it.
pub const TOKEN_ENV: &str = "EO_PLATFORM_TOKEN";

// ---------------------------------------------------------------------------
// Configuration sections
// ---------------------------------------------------------------------------

/// Region geometry: where the square ROI sits and how it is projected.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// WGS84 latitude of the region center.
    pub center_lat: f64,
    /// WGS84 longitude of the region center.
    pub center_lon: f64,
    /// Target area of the square ROI in square meters.
    pub area_m2: f64,
    /// Inset applied to every side of the ROI to form the export polygon,
    /// in meters. Keeps edge artifacts out of metric reduction and export.
    pub buffer_m: f64,
    /// EPSG code of the projected CRS the square is constructed in.
    pub epsg: u32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        RegionConfig {
            center_lat: 48.1517,
            center_lon: 17.1093,
            area_m2: 10_000_000.0, // 10 km²
            buffer_m: 100.0,
            epsg: 32633,
        }
    }
}

/// Date windows around the target acquisition date.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// The date the three windows are anchored on.
    pub target_date: NaiveDate,
    /// Length of the before-window in days, ending the day before target.
    pub lookback_days: i64,
    /// Length of the after-window in days, starting the day after target.
    pub lookahead_days: i64,
    /// Half-width of the nearest-day fallback window used when no scene was
    /// acquired exactly on the target date.
    pub on_day_fallback_days: i64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            target_date: NaiveDate::from_ymd_opt(2025, 11, 30)
                .unwrap_or(NaiveDate::MIN),
            lookback_days: 30,
            lookahead_days: 30,
            on_day_fallback_days: 3,
        }
    }
}

/// Quality thresholds and the cloud-score tie tolerance.
///
/// These are empirically chosen constants, not derived invariants — tune
/// them per region and season.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Per-pixel cloud probability above which a pixel counts as cloudy.
    pub cloud_prob_threshold: f64,
    /// Maximum cloud-pixel fraction accepted by the strict quality tier.
    pub max_cloud_fraction: f64,
    /// Minimum valid-pixel fraction accepted by the strict and valid-only
    /// tiers.
    pub min_valid_fraction: f64,
    /// Near-tie band around the minimum mean cloud probability within which
    /// candidates count as equally good and time preference decides.
    pub cloud_tie_tolerance: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        QualityConfig {
            cloud_prob_threshold: 40.0,
            max_cloud_fraction: 0.30,
            min_valid_fraction: 0.80,
            cloud_tie_tolerance: 5.0,
        }
    }
}

/// Export job parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Destination folder on the platform side.
    pub folder: String,
    /// Output pixel size in meters.
    pub scale_m: f64,
    /// EPSG code of the export CRS.
    pub epsg: u32,
    /// Ceiling on the number of output pixels the job may produce.
    pub max_pixels: u64,
    /// Skip fully-masked output tiles instead of writing empty ones.
    pub skip_empty_tiles: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            folder: "s2select".to_string(),
            scale_m: 10.0,
            epsg: 32633,
            max_pixels: 1_000_000_000,
            skip_empty_tiles: true,
        }
    }
}

/// Linear stretch applied when rendering reflectance to 8-bit RGB.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    /// Reflectance value mapped to 0.
    pub stretch_min: f64,
    /// Reflectance value mapped to 255.
    pub stretch_max: f64,
    /// Gamma correction applied after the linear stretch.
    pub gamma: f64,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        VisualizationConfig {
            stretch_min: 0.0,
            stretch_max: 3000.0,
            gamma: 1.2,
        }
    }
}

/// Endpoints and collection ids of the EO platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Base URL of the STAC catalog.
    pub catalog_url: String,
    /// Base URL of the processing API (statistics, exports, thumbnails).
    pub processing_url: String,
    /// Collection id of the surface-reflectance imagery.
    pub imagery_collection: String,
    /// Collection id of the paired cloud-probability product.
    pub cloud_collection: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling resolution for metric reductions, in meters. Coarser than
    /// the export scale — reductions only need summary statistics.
    pub reduce_scale_m: f64,
    /// Pixel ceiling for metric reductions. The platform degrades to
    /// best-effort sampling above this rather than failing.
    pub reduce_max_pixels: u64,
    /// Page size for catalog item searches.
    pub search_limit: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        PlatformConfig {
            catalog_url: "https://catalogue.dataspace.copernicus.eu/stac".to_string(),
            processing_url: "https://sh.dataspace.copernicus.eu/api/v1".to_string(),
            imagery_collection: "sentinel-2-l2a".to_string(),
            cloud_collection: "sentinel-2-cloud-probability".to_string(),
            timeout_secs: 30,
            reduce_scale_m: 20.0,
            reduce_max_pixels: 100_000_000,
            search_limit: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub region: RegionConfig,
    pub selection: SelectionConfig,
    pub quality: QualityConfig,
    pub export: ExportConfig,
    pub visualization: VisualizationConfig,
    pub platform: PlatformConfig,
}

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl PipelineConfig {
    /// Loads configuration from a TOML file. Fields absent from the file
    /// keep their compiled-in defaults.
    pub fn load(path: &Path) -> Result<PipelineConfig, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Loads from `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(PipelineConfig::default()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
