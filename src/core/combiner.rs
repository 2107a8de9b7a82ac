use std::collections::BTreeMap;

use crate::core::weights::{Dimension, WeightingProfile};

/// Multiplier applied to the score of a posting with an active boost
pub const DEFAULT_BOOST_MULTIPLIER: f64 = 1.5;

/// Final score and the weighted contribution of each dimension
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedScore {
    pub score: u8,
    pub contributions: BTreeMap<Dimension, f64>,
}

/// Applies weights and boost to a breakdown and clamps the result to 0-100
#[derive(Debug, Clone, Copy)]
pub struct ScoreCombiner {
    boost_multiplier: f64,
}

impl ScoreCombiner {
    /// A multiplier below 1.0 (or not finite) falls back to 1.0 so a boost
    /// never lowers a score
    pub fn new(boost_multiplier: f64) -> Self {
        let boost_multiplier = if boost_multiplier.is_finite() && boost_multiplier >= 1.0 {
            boost_multiplier
        } else {
            1.0
        };
        Self { boost_multiplier }
    }

    pub fn boost_multiplier(&self) -> f64 {
        self.boost_multiplier
    }

    /// Weighted sum rounded to an integer, multiplied on boost, then clamped
    pub fn combine(
        &self,
        breakdown: &BTreeMap<Dimension, u8>,
        profile: &WeightingProfile,
        boost_active: bool,
    ) -> CombinedScore {
        let contributions: BTreeMap<Dimension, f64> = breakdown
            .iter()
            .map(|(dimension, score)| {
                let contribution = f64::from(*score) * profile.weight(*dimension);
                (*dimension, contribution.clamp(0.0, 100.0))
            })
            .collect();

        let mut total = contributions.values().sum::<f64>().round();
        if boost_active {
            total = (total * self.boost_multiplier).round();
        }

        CombinedScore {
            score: total.clamp(0.0, 100.0) as u8,
            contributions,
        }
    }
}

impl Default for ScoreCombiner {
    fn default() -> Self {
        Self::new(DEFAULT_BOOST_MULTIPLIER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_breakdown(profile: &WeightingProfile, value: u8) -> BTreeMap<Dimension, u8> {
        profile.dimensions().map(|d| (d, value)).collect()
    }

    #[test]
    fn weighted_sum_of_uniform_breakdown() {
        let profile = WeightingProfile::helper_profile();
        let combined = ScoreCombiner::default().combine(&full_breakdown(&profile, 80), &profile, false);

        assert_eq!(combined.score, 80);
        assert!((combined.contributions[&Dimension::JobType] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn boost_is_clamped() {
        let profile = WeightingProfile::helper_profile();
        let combiner = ScoreCombiner::default();

        let boosted = combiner.combine(&full_breakdown(&profile, 90), &profile, true);
        assert_eq!(boosted.score, 100);

        let modest = combiner.combine(&full_breakdown(&profile, 40), &profile, true);
        assert_eq!(modest.score, 60);
    }

    #[test]
    fn boost_never_lowers() {
        let profile = WeightingProfile::preferences();
        for value in [0u8, 13, 50, 67, 100] {
            let breakdown = full_breakdown(&profile, value);
            let plain = ScoreCombiner::default().combine(&breakdown, &profile, false);
            let boosted = ScoreCombiner::default().combine(&breakdown, &profile, true);
            assert!(boosted.score >= plain.score);
        }
    }

    #[test]
    fn multiplier_below_one_is_ignored() {
        assert_eq!(ScoreCombiner::new(0.5).boost_multiplier(), 1.0);
        assert_eq!(ScoreCombiner::new(f64::NAN).boost_multiplier(), 1.0);
        assert_eq!(ScoreCombiner::new(2.0).boost_multiplier(), 2.0);
    }
}
