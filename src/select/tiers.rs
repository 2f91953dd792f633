/// Three-tier quality filter chain.
///
/// Candidates are filtered in successive tiers and the first non-empty tier
/// wins:
///   1. Strict — enough valid pixels AND few enough cloudy pixels.
///   2. Valid-only — enough valid pixels, cloud fraction ignored.
///   3. Unfiltered — everything in the window.
///
/// Each tier's predicate is implied by the previous tier's, so the tiers
/// form a monotone chain: strict ⊆ valid-only ⊆ unfiltered. The chain
/// therefore degrades gracefully — whenever the window holds at least one
/// candidate, some tier is non-empty and selection produces a result.

use crate::model::CandidateScene;

/// Thresholds the strict and valid-only tiers test against.
#[derive(Debug, Clone, Copy)]
pub struct QualityThresholds {
    /// Maximum cloud-pixel fraction accepted by the strict tier.
    pub max_cloud_fraction: f64,
    /// Minimum valid-pixel fraction accepted by the strict and valid-only
    /// tiers.
    pub min_valid_fraction: f64,
}

/// Which tier supplied the winning candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierLevel {
    Strict,
    ValidOnly,
    Unfiltered,
}

/// Strict-tier predicate.
pub fn passes_strict(candidate: &CandidateScene, thresholds: &QualityThresholds) -> bool {
    candidate.metrics.valid_fraction >= thresholds.min_valid_fraction
        && candidate.metrics.cloud_fraction <= thresholds.max_cloud_fraction
}

/// Valid-only-tier predicate.
pub fn passes_valid_only(candidate: &CandidateScene, thresholds: &QualityThresholds) -> bool {
    candidate.metrics.valid_fraction >= thresholds.min_valid_fraction
}

/// Runs the filter chain and returns the first non-empty tier along with
/// the level that produced it. An empty input yields an empty unfiltered
/// tier — the caller decides what an empty window means.
pub fn quality_tier<'a>(
    candidates: &'a [CandidateScene],
    thresholds: &QualityThresholds,
) -> (Vec<&'a CandidateScene>, TierLevel) {
    let strict: Vec<&CandidateScene> = candidates
        .iter()
        .filter(|c| passes_strict(c, thresholds))
        .collect();
    if !strict.is_empty() {
        return (strict, TierLevel::Strict);
    }

    let valid_only: Vec<&CandidateScene> = candidates
        .iter()
        .filter(|c| passes_valid_only(c, thresholds))
        .collect();
    if !valid_only.is_empty() {
        return (valid_only, TierLevel::ValidOnly);
    }

    (candidates.iter().collect(), TierLevel::Unfiltered)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SceneMetrics;
    use chrono::{TimeZone, Utc};

    fn thresholds() -> QualityThresholds {
        QualityThresholds {
            max_cloud_fraction: 0.30,
            min_valid_fraction: 0.80,
        }
    }

    fn candidate(id: &str, cloud_fraction: f64, valid_fraction: f64) -> CandidateScene {
        CandidateScene {
            scene_id: id.to_string(),
            acquired: Utc.with_ymd_and_hms(2025, 11, 20, 10, 0, 0).unwrap(),
            cloud_item: None,
            metrics: SceneMetrics {
                mean_cloud_prob: 50.0,
                cloud_fraction,
                valid_fraction,
            },
        }
    }

    #[test]
    fn test_strict_tier_wins_when_any_candidate_passes_both_checks() {
        let pool = vec![
            candidate("clean", 0.10, 0.95),
            candidate("cloudy", 0.60, 0.95),
            candidate("partial", 0.10, 0.40),
        ];
        let (tier, level) = quality_tier(&pool, &thresholds());
        assert_eq!(level, TierLevel::Strict);
        assert_eq!(tier.len(), 1);
        assert_eq!(tier[0].scene_id, "clean");
    }

    #[test]
    fn test_valid_only_tier_ignores_cloud_fraction() {
        let pool = vec![
            candidate("cloudy-but-valid", 0.60, 0.95),
            candidate("invalid", 0.10, 0.40),
        ];
        let (tier, level) = quality_tier(&pool, &thresholds());
        assert_eq!(level, TierLevel::ValidOnly);
        assert_eq!(tier.len(), 1);
        assert_eq!(tier[0].scene_id, "cloudy-but-valid");
    }

    #[test]
    fn test_unfiltered_tier_keeps_everything_as_a_last_resort() {
        let pool = vec![
            candidate("bad-a", 0.90, 0.10),
            candidate("bad-b", 0.95, 0.05),
        ];
        let (tier, level) = quality_tier(&pool, &thresholds());
        assert_eq!(level, TierLevel::Unfiltered);
        assert_eq!(tier.len(), 2);
    }

    #[test]
    fn test_empty_pool_yields_an_empty_unfiltered_tier() {
        let (tier, level) = quality_tier(&[], &thresholds());
        assert_eq!(level, TierLevel::Unfiltered);
        assert!(tier.is_empty());
    }

    #[test]
    fn test_tier_membership_is_monotone() {
        // Every candidate passing strict must also pass valid-only, and
        // every candidate is in the unfiltered set. A violation here would
        // mean the fallback chain can lose candidates while degrading.
        let pool = vec![
            candidate("a", 0.05, 0.99),
            candidate("b", 0.25, 0.85),
            candidate("c", 0.50, 0.90),
            candidate("d", 0.10, 0.50),
            candidate("e", 0.95, 0.02),
        ];
        let th = thresholds();

        let strict: Vec<&str> = pool
            .iter()
            .filter(|c| passes_strict(c, &th))
            .map(|c| c.scene_id.as_str())
            .collect();
        let valid_only: Vec<&str> = pool
            .iter()
            .filter(|c| passes_valid_only(c, &th))
            .map(|c| c.scene_id.as_str())
            .collect();

        for id in &strict {
            assert!(valid_only.contains(id), "strict ⊄ valid-only: {id}");
        }
        assert!(strict.len() <= valid_only.len());
        assert!(valid_only.len() <= pool.len());
    }

    #[test]
    fn test_threshold_boundaries_are_inclusive() {
        // valid_fraction == minimum and cloud_fraction == maximum both pass.
        let pool = vec![candidate("edge", 0.30, 0.80)];
        let (tier, level) = quality_tier(&pool, &thresholds());
        assert_eq!(level, TierLevel::Strict);
        assert_eq!(tier.len(), 1);
    }

    #[test]
    fn test_worst_case_scored_candidate_only_survives_unfiltered() {
        let mut unscored = candidate("unscored", 0.0, 0.0);
        unscored.metrics = SceneMetrics::worst_case();
        let pool = vec![unscored, candidate("scored", 0.10, 0.95)];

        let (tier, level) = quality_tier(&pool, &thresholds());
        assert_eq!(level, TierLevel::Strict);
        assert!(tier.iter().all(|c| c.scene_id == "scored"));
    }
}
