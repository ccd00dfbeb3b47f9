//! Hotspot scoring and selection.
//!
//! A hotspot's score is
//!
//! ```text
//! complaint_count ^ severity_exponent / (distance + epsilon) ^ distance_exponent
//! ```
//!
//! With the default exponents a moderate hotspot right on the corridor
//! outranks a severe one a few blocks away. `epsilon` keeps the score finite
//! for hotspots lying on the corridor.

use std::cmp::Ordering;

use safer_route_models::Hotspot;
use serde::{Deserialize, Serialize};

/// Tunables for hotspot ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Hotspots with fewer complaints are ignored.
    pub min_complaint_count: u32,
    /// Weight of the complaint count.
    pub severity_exponent: f64,
    /// Power applied to the corridor distance.
    pub distance_exponent: f64,
    /// Added to the distance before the power is applied, in degrees.
    pub distance_epsilon: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_complaint_count: 5,
            severity_exponent: 0.7,
            distance_exponent: 1.5,
            distance_epsilon: 0.001,
        }
    }
}

/// Scores a hotspot; higher is more worth avoiding.
#[must_use]
pub fn score(hotspot: &Hotspot, config: &RankingConfig) -> f64 {
    let severity = f64::from(hotspot.complaint_count).powf(config.severity_exponent);
    let proximity =
        (hotspot.distance.max(0.0) + config.distance_epsilon).powf(config.distance_exponent);
    severity / proximity
}

/// Whether `candidate` lies within `min_distance` degrees of any hotspot
/// in `exclude`.
#[must_use]
pub fn is_excluded(candidate: &Hotspot, exclude: &[Hotspot], min_distance: f64) -> bool {
    exclude.iter().any(|other| {
        let d = (candidate.longitude - other.longitude).hypot(candidate.latitude - other.latitude);
        d <= min_distance
    })
}

/// Filters, ranks, and truncates store candidates.
///
/// Drops candidates below [`RankingConfig::min_complaint_count`] and those
/// excluded by [`is_excluded`] (only when `exclude` is non-empty), orders
/// the rest by descending [`score`] with ties going to the closer hotspot,
/// and keeps the first `limit`.
#[must_use]
pub fn select_hotspots(
    candidates: Vec<Hotspot>,
    exclude: &[Hotspot],
    limit: usize,
    min_exclusion_distance: f64,
    config: &RankingConfig,
) -> Vec<Hotspot> {
    let mut scored: Vec<(f64, Hotspot)> = candidates
        .into_iter()
        .filter(|h| h.complaint_count >= config.min_complaint_count)
        .filter(|h| exclude.is_empty() || !is_excluded(h, exclude, min_exclusion_distance))
        .map(|h| (score(&h, config), h))
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .total_cmp(score_a)
            .then_with(|| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal))
    });
    scored.truncate(limit);

    scored.into_iter().map(|(_, h)| h).collect()
}
