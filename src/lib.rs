//! Sentinel-2 best-scene selection service.
//!
//! Picks the three best-available Sentinel-2 scenes (before, on, and after a
//! target date) over a fixed square region, scores them for cloud quality
//! through a remote EO platform's statistics endpoint, and submits rendered
//! 8-bit RGB GeoTIFF exports. All pixel work happens on the platform; this
//! crate holds the region math, the selection policy, and thin clients for
//! the catalog, statistics, and export APIs.
//!
//! Module map:
//! - `model` — shared domain types and error enums.
//! - `config` — immutable TOML-backed pipeline configuration.
//! - `bands` — canonical Sentinel-2 band registry.
//! - `projection` / `region` — local ROI construction in a projected CRS.
//! - `ingest` — catalog search, collection pairing, metric reduction.
//! - `select` — windows, quality tiers, and the per-window policies.
//! - `pipeline` — pure orchestration from scored pools to selections.
//! - `export` — visualization parameters, export jobs, thumbnails.
//! - `replay` — offline candidate capture loading.
//! - `verify` — live probes of the configured platform collections.

pub mod bands;
pub mod config;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod projection;
pub mod region;
pub mod replay;
pub mod select;
pub mod verify;
