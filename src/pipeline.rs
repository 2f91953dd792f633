/// Window orchestration: from scored candidate pools to three selections.
///
/// This is the pure tail of the pipeline — ingest has already produced one
/// candidate pool per query window, and everything below is deterministic
/// selection logic. The binary wires live (or replayed) pools into
/// `select_all` and hands the result to rendering and export.

use crate::config::{PipelineConfig, QualityConfig, SelectionConfig};
use crate::model::{CandidateScene, Selection, WindowRole};
use crate::select::policy::{select_min_cloud_with_time_pref, select_on_day_exact_or_nearest};
use crate::select::tiers::QualityThresholds;
use crate::select::windows::SelectionWindow;

/// The three query windows of one run, in before / nearest-span / after
/// order. The on-target window queries the wider nearest-day span; the
/// on-day policy separates exact-day candidates itself.
pub fn query_windows(cfg: &SelectionConfig) -> (SelectionWindow, SelectionWindow, SelectionWindow) {
    (
        SelectionWindow::before(cfg.target_date, cfg.lookback_days),
        SelectionWindow::nearest(cfg.target_date, cfg.on_day_fallback_days),
        SelectionWindow::after(cfg.target_date, cfg.lookahead_days),
    )
}

fn thresholds(cfg: &QualityConfig) -> QualityThresholds {
    QualityThresholds {
        max_cloud_fraction: cfg.max_cloud_fraction,
        min_valid_fraction: cfg.min_valid_fraction,
    }
}

/// Runs selection for all three windows over already-scored pools.
///
/// Always returns exactly three selections in before/on/after order; empty
/// pools yield masked-empty placeholders rather than dropping out.
pub fn select_all(
    cfg: &PipelineConfig,
    before_pool: Vec<CandidateScene>,
    on_span_pool: Vec<CandidateScene>,
    after_pool: Vec<CandidateScene>,
) -> Vec<Selection> {
    let th = thresholds(&cfg.quality);
    let tolerance = cfg.quality.cloud_tie_tolerance;

    let (before_window, _, after_window) = query_windows(&cfg.selection);

    let before = Selection {
        role: WindowRole::Before,
        window_size: before_pool.len(),
        candidate: select_min_cloud_with_time_pref(
            &before_pool,
            &th,
            tolerance,
            before_window.preference,
        ),
        exact_day: None,
    };

    let on_result =
        select_on_day_exact_or_nearest(&on_span_pool, cfg.selection.target_date, &th);
    let on = Selection {
        role: WindowRole::On,
        window_size: on_span_pool.len(),
        exact_day: on_result.candidate.as_ref().map(|_| on_result.exact_day),
        candidate: on_result.candidate,
    };

    let after = Selection {
        role: WindowRole::After,
        window_size: after_pool.len(),
        candidate: select_min_cloud_with_time_pref(
            &after_pool,
            &th,
            tolerance,
            after_window.preference,
        ),
        exact_day: None,
    };

    vec![before, on, after]
}
