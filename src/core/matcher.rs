use crate::core::scoring::score_match_candidate;
use crate::models::{ConsumerIntent, MatchCandidate, RankedMatch, ScoringWeights};

/// Result of ranking a batch of candidates
#[derive(Debug)]
pub struct RankResult {
    pub matches: Vec<RankedMatch>,
    pub total_candidates: usize,
}

/// Ranks advisor listings for a consumer intent
///
/// Every candidate is scored; results are ordered by score (descending) and
/// then by listing id so equal scores always come back in the same order.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score, sort and truncate `candidates` to at most `limit` matches
    pub fn rank(
        &self,
        intent: &ConsumerIntent,
        candidates: &[MatchCandidate],
        limit: usize,
    ) -> RankResult {
        let mut ranked: Vec<RankedMatch> = candidates
            .iter()
            .map(|candidate| {
                let result = score_match_candidate(intent, candidate, &self.weights);
                RankedMatch {
                    listing_id: candidate.listing_id,
                    score: result.score,
                    reasons: result.reasons,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.listing_id.cmp(&b.listing_id))
        });
        ranked.truncate(limit);

        RankResult {
            matches: ranked,
            total_candidates: candidates.len(),
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
