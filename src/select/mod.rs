/// Scene selection for the three query windows.
///
/// Submodules:
/// - `windows` — half-open date window derivation around the target date.
/// - `tiers` — the three-tier quality filter chain.
/// - `policy` — the per-window selection policies (min-cloud with time
///   preference; exact-day with nearest fallback).
///
/// Everything in here is pure: candidates come in as plain data, decisions
/// come out as plain data. All remote work happens in `ingest` before these
/// functions run.

pub mod policy;
pub mod tiers;
pub mod windows;

pub use policy::{select_min_cloud_with_time_pref, select_on_day_exact_or_nearest, OnDaySelection};
pub use tiers::{quality_tier, QualityThresholds, TierLevel};
pub use windows::SelectionWindow;
