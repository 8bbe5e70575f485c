//! Ranking engine: normalization, growth tiers, gates and final score
//!
//! Combines normalized volume, a volume-tiered growth heuristic and the
//! semantic score into one weighted final score, applies the volume and
//! relevance gates, and truncates to the top N.

use crate::models::ScoredTrend;

/// Weight of the normalized search volume in the final score
pub const VOLUME_WEIGHT: f32 = 0.5;

/// Weight of the growth tier in the final score
pub const GROWTH_WEIGHT: f32 = 0.3;

/// Weight of the semantic score in the final score
pub const SEMANTIC_WEIGHT: f32 = 0.2;

/// Entries scoring below this semantic floor are never published
pub const SEMANTIC_FLOOR: f32 = 0.35;

/// Volume-tiered growth heuristic
///
/// A coarse proxy for how established a trend already is, not a true
/// rate of change. Boundaries are strict: exactly 50000 falls into the
/// 0.8 tier.
pub fn growth_score(search_volume: u64) -> f32 {
    if search_volume > 50_000 {
        1.0
    } else if search_volume > 10_000 {
        0.8
    } else if search_volume > 1_000 {
        0.6
    } else {
        0.4
    }
}

/// Min-max normalize volumes over the full candidate set
///
/// When all volumes are equal every value normalizes to 1.0, which also
/// covers the single-candidate case and avoids division by zero.
pub fn normalize_volumes(volumes: &[u64]) -> Vec<f32> {
    let Some(&min) = volumes.iter().min() else {
        return Vec::new();
    };
    let max = *volumes.iter().max().unwrap_or(&min);

    if max == min {
        return vec![1.0; volumes.len()];
    }

    let span = (max - min) as f32;
    volumes.iter().map(|&v| (v - min) as f32 / span).collect()
}

/// Rank scored candidates into the final top list
///
/// Steps, in order: normalize volumes over the full candidate set,
/// assign growth tiers, gate on minimum volume, compute the weighted
/// final score, gate on the semantic floor, sort descending (stable, so
/// input order breaks ties) and truncate to `top_n`. Fewer survivors
/// than `top_n` is returned as-is, never padded.
pub fn rank(mut candidates: Vec<ScoredTrend>, min_volume: u64, top_n: usize) -> Vec<ScoredTrend> {
    let volumes: Vec<u64> = candidates.iter().map(|t| t.search_volume).collect();
    let normalized = normalize_volumes(&volumes);

    for (trend, volume_norm) in candidates.iter_mut().zip(normalized) {
        trend.volume_norm = volume_norm;
        trend.growth_score = growth_score(trend.search_volume);
    }

    let mut survivors: Vec<ScoredTrend> = candidates
        .into_iter()
        .filter(|t| t.search_volume >= min_volume)
        .map(|mut t| {
            t.final_score = VOLUME_WEIGHT * t.volume_norm
                + GROWTH_WEIGHT * t.growth_score
                + SEMANTIC_WEIGHT * t.semantic_score;
            t
        })
        .filter(|t| t.semantic_score >= SEMANTIC_FLOOR)
        .collect();

    // sort_by is stable; ties keep their input order
    survivors.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    survivors.truncate(top_n);
    survivors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawTrend;

    fn candidate(query: &str, volume: u64, semantic: f32) -> ScoredTrend {
        ScoredTrend::from_raw(
            RawTrend {
                query: query.to_string(),
                geo: String::from("US"),
                search_volume: volume,
                news_link: String::new(),
            },
            semantic,
        )
    }

    #[test]
    fn test_growth_tiers() {
        assert_eq!(growth_score(60_000), 1.0);
        assert_eq!(growth_score(15_000), 0.8);
        assert_eq!(growth_score(5_000), 0.6);
        assert_eq!(growth_score(500), 0.4);
    }

    #[test]
    fn test_growth_tier_boundaries_are_strict() {
        // ">" not ">=": exact boundary values fall into the lower tier
        assert_eq!(growth_score(50_000), 0.8);
        assert_eq!(growth_score(10_000), 0.6);
        assert_eq!(growth_score(1_000), 0.4);
        assert_eq!(growth_score(50_001), 1.0);
    }

    #[test]
    fn test_normalize_equal_volumes() {
        assert_eq!(normalize_volumes(&[7_000, 7_000, 7_000]), vec![1.0, 1.0, 1.0]);
        assert_eq!(normalize_volumes(&[42]), vec![1.0]);
        assert!(normalize_volumes(&[]).is_empty());
    }

    #[test]
    fn test_normalize_min_max() {
        let norms = normalize_volumes(&[1_000, 3_000, 5_000]);
        assert_eq!(norms[0], 0.0);
        assert!((norms[1] - 0.5).abs() < 1e-6);
        assert_eq!(norms[2], 1.0);
    }

    #[test]
    fn test_volume_gate_is_absolute() {
        // High semantic relevance cannot rescue a low-volume entry
        let candidates = vec![
            candidate("tiny ai query", 500, 0.99),
            candidate("big ai query", 60_000, 0.80),
        ];

        let top = rank(candidates, 15_000, 10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].query, "big ai query");
    }

    #[test]
    fn test_semantic_gate_is_absolute() {
        // Massive volume cannot rescue an irrelevant entry
        let candidates = vec![
            candidate("celebrity gossip", 900_000, 0.05),
            candidate("openai gpt-5", 60_000, 0.80),
        ];

        let top = rank(candidates, 15_000, 10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].query, "openai gpt-5");
    }

    #[test]
    fn test_semantic_floor_boundary_kept() {
        let candidates = vec![candidate("borderline ai", 60_000, SEMANTIC_FLOOR)];
        assert_eq!(rank(candidates, 15_000, 10).len(), 1);
    }

    #[test]
    fn test_final_score_weights() {
        let top = rank(vec![candidate("solo", 60_000, 0.5)], 15_000, 10);
        // single candidate: volume_norm 1.0, growth 1.0, semantic 0.5
        let expected = 0.5 * 1.0 + 0.3 * 1.0 + 0.2 * 0.5;
        assert!((top[0].final_score - expected).abs() < 1e-6);
    }

    #[test]
    fn test_tie_order_is_stable() {
        // Same volume and semantic score produce identical final scores
        let candidates = vec![
            candidate("first", 30_000, 0.6),
            candidate("second", 30_000, 0.6),
            candidate("third", 30_000, 0.6),
        ];

        let top = rank(candidates, 15_000, 10);
        let order: Vec<&str> = top.iter().map(|t| t.query.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_truncates_to_top_n() {
        let candidates: Vec<ScoredTrend> = (0..20)
            .map(|i| candidate(&format!("ai topic {i}"), 20_000 + i * 1_000, 0.6))
            .collect();

        let top = rank(candidates, 15_000, 10);
        assert_eq!(top.len(), 10);
        // Highest volume first after normalization
        assert_eq!(top[0].query, "ai topic 19");
    }

    #[test]
    fn test_fewer_survivors_than_n() {
        let candidates = vec![candidate("only one", 60_000, 0.7)];
        let top = rank(candidates, 15_000, 10);
        assert_eq!(top.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank(Vec::new(), 15_000, 10).is_empty());
    }

    #[test]
    fn test_normalization_precedes_volume_gate() {
        // The gated-out low entry still anchors the min of the range, so
        // the surviving mid-volume entry does not normalize to 0.0
        let candidates = vec![
            candidate("low", 1_000, 0.9),
            candidate("mid ai", 30_000, 0.9),
            candidate("high ai", 60_000, 0.9),
        ];

        let top = rank(candidates, 15_000, 10);
        assert_eq!(top.len(), 2);
        let mid = top.iter().find(|t| t.query == "mid ai").unwrap();
        assert!(mid.volume_norm > 0.0);
    }
}
