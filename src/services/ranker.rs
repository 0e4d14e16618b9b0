use std::cmp::Ordering;

use crate::models::Recommendation;

/// Reorders candidate recommendations against the user's vibe preferences.
///
/// The score for a record is the fraction of preference tags present in its
/// `vibe_tags` (case-insensitive), plus uniform jitter in `[-jitter, +jitter]`
/// to vary presentation between requests. With jitter set to zero the ordering
/// is fully deterministic: descending score, ties broken by ascending id.
#[derive(Debug, Clone)]
pub struct Ranker {
    jitter: f64,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl Ranker {
    pub fn new(jitter: f64) -> Self {
        Self {
            jitter: jitter.max(0.0),
        }
    }

    /// Same set in, same set out; only the order changes. Empty preferences
    /// are the identity.
    pub fn rank(&self, recommendations: Vec<Recommendation>, preferences: &[String]) -> Vec<Recommendation> {
        if preferences.is_empty() || recommendations.len() < 2 {
            return recommendations;
        }

        let mut scored: Vec<(f64, Recommendation)> = recommendations
            .into_iter()
            .map(|rec| (self.score(&rec, preferences), rec))
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.id.cmp(&b.1.id))
        });

        scored.into_iter().map(|(_, rec)| rec).collect()
    }

    /// Raw preference match ratio without jitter, in [0, 1]
    pub fn match_ratio(recommendation: &Recommendation, preferences: &[String]) -> f64 {
        let matches = preferences
            .iter()
            .filter(|pref| {
                recommendation
                    .vibe_tags
                    .iter()
                    .any(|tag| tag.eq_ignore_ascii_case(pref))
            })
            .count();

        matches as f64 / preferences.len().max(1) as f64
    }

    fn score(&self, recommendation: &Recommendation, preferences: &[String]) -> f64 {
        let base = Self::match_ratio(recommendation, preferences);
        if self.jitter == 0.0 {
            base
        } else {
            base + (fastrand::f64() * 2.0 - 1.0) * self.jitter
        }
    }
}
