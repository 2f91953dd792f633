/// Per-window selection policies.
///
/// Both policies run on candidates that already carry reduced metrics; they
/// never touch the network. Cloud scores are noisy estimates, so neither
/// policy trusts a strict minimum: the before/after policy keeps a near-tie
/// band around the minimum and lets acquisition time break the tie, and the
/// on-day fallback ranks day distance three orders of magnitude above cloud
/// quality so a same-day scene always beats a cleaner one further away.

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{CandidateScene, TimePreference};
use crate::select::tiers::{quality_tier, QualityThresholds};

/// Weight separating day distance from cloud quality in the nearest-day
/// composite key. Cloud probability is bounded by 100, so any difference in
/// distance dominates any difference in cloudiness.
const DISTANCE_WEIGHT: f64 = 1000.0;

// ---------------------------------------------------------------------------
// Before/after policy
// ---------------------------------------------------------------------------

/// Picks the best scene from a before- or after-window.
///
/// Within the winning quality tier, every candidate whose mean cloud
/// probability lies within `tie_tolerance` of the tier minimum is considered
/// equally good; the near-tie set is then resolved by acquisition time
/// (latest for before-windows, earliest for after-windows).
///
/// An empty window returns `None` — the caller renders that as the
/// masked-empty placeholder rather than an error.
pub fn select_min_cloud_with_time_pref(
    candidates: &[CandidateScene],
    thresholds: &QualityThresholds,
    tie_tolerance: f64,
    preference: TimePreference,
) -> Option<CandidateScene> {
    if candidates.is_empty() {
        return None;
    }

    let (tier, _level) = quality_tier(candidates, thresholds);

    let min_cloud = tier
        .iter()
        .map(|c| c.metrics.mean_cloud_prob)
        .fold(f64::INFINITY, f64::min);

    let near_tie: Vec<&CandidateScene> = tier
        .into_iter()
        .filter(|c| c.metrics.mean_cloud_prob <= min_cloud + tie_tolerance)
        .collect();

    let chosen = match preference {
        TimePreference::Latest => near_tie.into_iter().max_by_key(|c| c.acquired),
        TimePreference::Earliest => near_tie.into_iter().min_by_key(|c| c.acquired),
    };

    chosen.cloned()
}

// ---------------------------------------------------------------------------
// On-day policy
// ---------------------------------------------------------------------------

/// Result of the on-target-date selection.
#[derive(Debug, Clone, PartialEq)]
pub struct OnDaySelection {
    pub candidate: Option<CandidateScene>,
    /// True when a scene acquired exactly on the target date was chosen.
    pub exact_day: bool,
}

/// Whole days between an acquisition and the target date, absolute.
pub fn day_distance(acquired: DateTime<Utc>, target: NaiveDate) -> i64 {
    (acquired.date_naive() - target).num_days().abs()
}

/// Composite ranking key for the nearest-day fallback: distance dominates,
/// cloud quality breaks ties within the same distance.
pub fn nearest_sort_key(distance_days: i64, mean_cloud_prob: f64) -> f64 {
    distance_days as f64 * DISTANCE_WEIGHT + mean_cloud_prob
}

/// Picks the scene for the on-target window from the nearest-day span.
///
/// Two pools are formed: "exact" holds candidates acquired on the target
/// date, "nearest" holds the whole span. Each passes the quality tier chain
/// independently. If the exact pool is non-empty at all, the choice comes
/// from its filtered tier by lowest mean cloud probability — an exact-day
/// match beats any cleaner scene on a neighboring day. Otherwise the
/// nearest pool's filtered tier is ranked by the composite key.
pub fn select_on_day_exact_or_nearest(
    candidates: &[CandidateScene],
    target: NaiveDate,
    thresholds: &QualityThresholds,
) -> OnDaySelection {
    let exact: Vec<CandidateScene> = candidates
        .iter()
        .filter(|c| c.acquired.date_naive() == target)
        .cloned()
        .collect();

    if !exact.is_empty() {
        let (tier, _level) = quality_tier(&exact, thresholds);
        let chosen = tier
            .into_iter()
            .min_by(|a, b| {
                a.metrics
                    .mean_cloud_prob
                    .total_cmp(&b.metrics.mean_cloud_prob)
            })
            .cloned();
        return OnDaySelection {
            candidate: chosen,
            exact_day: true,
        };
    }

    let (tier, _level) = quality_tier(candidates, thresholds);
    let chosen = tier
        .into_iter()
        .min_by(|a, b| {
            let key_a = nearest_sort_key(day_distance(a.acquired, target), a.metrics.mean_cloud_prob);
            let key_b = nearest_sort_key(day_distance(b.acquired, target), b.metrics.mean_cloud_prob);
            key_a.total_cmp(&key_b)
        })
        .cloned();

    OnDaySelection {
        exact_day: false,
        candidate: chosen,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
