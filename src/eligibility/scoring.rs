//! Match score generation.
//!
//! There is no scoring formula yet: `PlaceholderScorer` draws a pseudo-random
//! score from a fixed band and ignores the profile and course category
//! entirely. Keep it that way until a real formula is agreed on; consumers
//! only rely on the score being in `[floor, ceiling]`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::profile::AcademicProfile;

pub const DEFAULT_SCORE_FLOOR: u8 = 75;
pub const DEFAULT_SCORE_CEILING: u8 = 95;

pub trait MatchScorer {
    fn match_score(&mut self, profile: &AcademicProfile, category: &str) -> u8;
}

#[derive(Debug, Clone)]
pub struct PlaceholderScorer {
    rng: StdRng,
    floor: u8,
    ceiling: u8,
}

impl PlaceholderScorer {
    pub fn new(floor: u8, ceiling: u8) -> Self {
        Self::with_rng(StdRng::from_entropy(), floor, ceiling)
    }

    /// Reproducible scores for a given seed.
    pub fn seeded(seed: u64, floor: u8, ceiling: u8) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), floor, ceiling)
    }

    fn with_rng(rng: StdRng, floor: u8, ceiling: u8) -> Self {
        let ceiling = ceiling.min(100);
        Self {
            rng,
            floor: floor.min(ceiling),
            ceiling,
        }
    }
}

impl Default for PlaceholderScorer {
    fn default() -> Self {
        Self::new(DEFAULT_SCORE_FLOOR, DEFAULT_SCORE_CEILING)
    }
}

impl MatchScorer for PlaceholderScorer {
    // Draws from [floor, ceiling); the ceiling is only reached when floor == ceiling.
    fn match_score(&mut self, _profile: &AcademicProfile, _category: &str) -> u8 {
        if self.floor >= self.ceiling {
            return self.ceiling;
        }
        self.rng.gen_range(self.floor..self.ceiling)
    }
}

/// Always returns the same score.
#[derive(Debug, Clone, Copy)]
pub struct FixedScorer(pub u8);

impl MatchScorer for FixedScorer {
    fn match_score(&mut self, _profile: &AcademicProfile, _category: &str) -> u8 {
        self.0.min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::SubjectResult;

    #[test]
    fn placeholder_stays_in_band() {
        let mut scorer = PlaceholderScorer::default();
        let profile = AcademicProfile::default();
        for _ in 0..500 {
            let score = scorer.match_score(&profile, "computer_science");
            assert!((75..=95).contains(&score), "score {score} out of band");
        }
    }

    #[test]
    fn placeholder_ignores_profile() {
        let strong = AcademicProfile::new(vec![SubjectResult::new("Mathematics", 100)]);
        let weak = AcademicProfile::new(vec![SubjectResult::new("Mathematics", 10)]);
        let mut a = PlaceholderScorer::seeded(7, 75, 95);
        let mut b = PlaceholderScorer::seeded(7, 75, 95);
        for _ in 0..20 {
            assert_eq!(
                a.match_score(&strong, "data_science"),
                b.match_score(&weak, "business_science")
            );
        }
    }

    #[test]
    fn degenerate_band_returns_ceiling() {
        let mut scorer = PlaceholderScorer::seeded(1, 90, 90);
        assert_eq!(scorer.match_score(&AcademicProfile::default(), ""), 90);

        let mut inverted = PlaceholderScorer::seeded(1, 99, 80);
        assert_eq!(inverted.match_score(&AcademicProfile::default(), ""), 80);
    }

    #[test]
    fn fixed_scorer_caps_at_100() {
        assert_eq!(FixedScorer(120).match_score(&AcademicProfile::default(), ""), 100);
    }
}
