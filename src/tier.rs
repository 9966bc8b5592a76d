//! Performance tiering for CPUs and GPUs

use std::fmt;

use crate::models::Component;

/// Normalized performance class, 1 (entry) through 4 (enthusiast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tier(u8);

impl Tier {
    pub const MIN: Tier = Tier(1);
    pub const MAX: Tier = Tier(4);
    /// Assumed when a part carries no performance data.
    pub const MID: Tier = Tier(2);

    pub fn clamped(raw: i64) -> Self {
        Tier(raw.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0)) as u8)
    }

    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Tier(4)
        } else if score >= 65.0 {
            Tier(3)
        } else if score >= 45.0 {
            Tier(2)
        } else {
            Tier(1)
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Signed difference `self - other`.
    pub fn delta(self, other: Tier) -> i8 {
        self.0 as i8 - other.0 as i8
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Tier of a component: explicit tier wins, then score, then mid-range.
pub fn tier(component: &Component) -> Tier {
    match (component.performance_tier, component.performance_score) {
        (Some(raw), _) => Tier::clamped(raw),
        (None, Some(score)) => Tier::from_score(score),
        (None, None) => Tier::MID,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, PartRecord, component};
    use proptest::prelude::*;

    fn gpu() -> PartRecord {
        PartRecord::new("g", Category::Gpu, "Test GPU")
    }

    #[test]
    fn explicit_tier_is_clamped() {
        assert_eq!(tier(&component(gpu().with_tier(3))).get(), 3);
        assert_eq!(tier(&component(gpu().with_tier(9))), Tier::MAX);
        assert_eq!(tier(&component(gpu().with_tier(0))), Tier::MIN);
    }

    #[test]
    fn tier_takes_precedence_over_score() {
        let part = component(gpu().with_tier(1).with_score(99.0));
        assert_eq!(tier(&part), Tier::MIN);
    }

    #[test]
    fn score_thresholds() {
        let cases = [(100.0, 4), (85.0, 4), (84.9, 3), (65.0, 3), (64.0, 2), (45.0, 2), (44.9, 1), (0.0, 1)];
        for (score, expected) in cases {
            assert_eq!(tier(&component(gpu().with_score(score))).get(), expected, "score {score}");
        }
    }

    #[test]
    fn missing_data_defaults_to_mid_range() {
        assert_eq!(tier(&component(gpu())), Tier::MID);
    }

    proptest! {
        #[test]
        fn tier_is_monotonic_in_score(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(Tier::from_score(low) <= Tier::from_score(high));
        }

        #[test]
        fn tier_is_always_in_range(raw in any::<i64>()) {
            let t = Tier::clamped(raw).get();
            prop_assert!((1..=4).contains(&t));
        }
    }
}
