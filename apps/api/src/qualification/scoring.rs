//! Lead scoring: a fixed additive rubric over `Analysis`, capped at 100.
//!
//! | component      | values                                                        | max |
//! |----------------|---------------------------------------------------------------|-----|
//! | urgency        | high=30, medium=20, low=10                                    | 30  |
//! | buying intent  | ready_to_buy=40, evaluating=30, exploring=20, just_browsing=10 | 40  |
//! | budget signals | ≥3=15, 2=10, 1=5, 0=0                                         | 15  |
//! | pain points    | ≥4=15, 3=12, 2=8, 1=4, 0=0                                    | 15  |
//!
//! Unrecognized urgency/intent values score as medium/exploring.

use crate::qualification::models::{Analysis, BuyingIntent, Priority, Thresholds, UrgencyLevel};

pub const MAX_SCORE: f64 = 100.0;

pub fn urgency_points(level: &UrgencyLevel) -> f64 {
    match level {
        UrgencyLevel::High => 30.0,
        UrgencyLevel::Medium | UrgencyLevel::Unrecognized(_) => 20.0,
        UrgencyLevel::Low => 10.0,
    }
}

pub fn intent_points(intent: &BuyingIntent) -> f64 {
    match intent {
        BuyingIntent::ReadyToBuy => 40.0,
        BuyingIntent::Evaluating => 30.0,
        BuyingIntent::Exploring | BuyingIntent::Unrecognized(_) => 20.0,
        BuyingIntent::JustBrowsing => 10.0,
    }
}

pub fn budget_signal_points(count: usize) -> f64 {
    match count {
        0 => 0.0,
        1 => 5.0,
        2 => 10.0,
        _ => 15.0,
    }
}

pub fn pain_point_points(count: usize) -> f64 {
    match count {
        0 => 0.0,
        1 => 4.0,
        2 => 8.0,
        3 => 12.0,
        _ => 15.0,
    }
}

/// Sum of the four independent components, capped at [`MAX_SCORE`].
pub fn score(analysis: &Analysis) -> f64 {
    let total = urgency_points(&analysis.urgency_level)
        + intent_points(&analysis.buying_intent)
        + budget_signal_points(analysis.budget_signals.len())
        + pain_point_points(analysis.pain_points.len());

    total.clamp(0.0, MAX_SCORE)
}

/// `score >= high` → hot, else `score >= medium` → warm, else cold.
pub fn classify(score: f64, thresholds: &Thresholds) -> Priority {
    if score >= thresholds.high() {
        Priority::Hot
    } else if score >= thresholds.medium() {
        Priority::Warm
    } else {
        Priority::Cold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(
        urgency: &str,
        intent: &str,
        budget_signals: usize,
        pain_points: usize,
    ) -> Analysis {
        Analysis {
            urgency_level: UrgencyLevel::from(urgency),
            buying_intent: BuyingIntent::from(intent),
            budget_signals: (0..budget_signals).map(|i| format!("signal {i}")).collect(),
            pain_points: (0..pain_points).map(|i| format!("pain {i}")).collect(),
            ..Analysis::default()
        }
    }

    #[test]
    fn test_hot_lead_scores_100() {
        let a = analysis("high", "ready_to_buy", 3, 4);
        let s = score(&a);
        assert_eq!(s, 100.0);
        assert_eq!(classify(s, &Thresholds::default()), Priority::Hot);
    }

    #[test]
    fn test_browsing_lead_scores_24() {
        let a = analysis("low", "just_browsing", 0, 1);
        let s = score(&a);
        assert_eq!(s, 24.0);
        assert_eq!(classify(s, &Thresholds::default()), Priority::Cold);
    }

    #[test]
    fn test_fallback_analysis_scores_44() {
        let a = crate::qualification::normalizer::fallback_analysis();
        let s = score(&a);
        assert_eq!(s, 44.0);
        assert_eq!(classify(s, &Thresholds::default()), Priority::Cold);
    }

    #[test]
    fn test_unrecognized_values_score_as_medium_and_exploring() {
        let known = score(&analysis("medium", "exploring", 1, 2));
        let unknown = score(&analysis("urgent", "very_interested", 1, 2));
        assert_eq!(known, unknown);
        assert_eq!(unknown, 20.0 + 20.0 + 5.0 + 8.0);
    }

    #[test]
    fn test_counts_beyond_table_saturate() {
        assert_eq!(budget_signal_points(10), 15.0);
        assert_eq!(pain_point_points(25), 15.0);
        assert_eq!(score(&analysis("high", "ready_to_buy", 40, 40)), MAX_SCORE);
    }

    #[test]
    fn test_score_bounded_over_all_combinations() {
        for urgency in ["high", "medium", "low", "bogus"] {
            for intent in ["ready_to_buy", "evaluating", "exploring", "just_browsing", "bogus"] {
                for budget in 0..6 {
                    for pains in 0..7 {
                        let s = score(&analysis(urgency, intent, budget, pains));
                        assert!((0.0..=MAX_SCORE).contains(&s), "score {s} out of range");
                    }
                }
            }
        }
    }

    #[test]
    fn test_score_monotonic_in_each_component() {
        let urgency_order = ["low", "medium", "high"];
        for pair in urgency_order.windows(2) {
            assert!(
                score(&analysis(pair[0], "exploring", 1, 1))
                    <= score(&analysis(pair[1], "exploring", 1, 1))
            );
        }

        let intent_order = ["just_browsing", "exploring", "evaluating", "ready_to_buy"];
        for pair in intent_order.windows(2) {
            assert!(
                score(&analysis("medium", pair[0], 1, 1))
                    <= score(&analysis("medium", pair[1], 1, 1))
            );
        }

        for n in 0..8 {
            assert!(budget_signal_points(n) <= budget_signal_points(n + 1));
            assert!(pain_point_points(n) <= pain_point_points(n + 1));
        }
    }

    #[test]
    fn test_classify_boundaries_are_inclusive() {
        let t = Thresholds::default();
        assert_eq!(classify(80.0, &t), Priority::Hot);
        assert_eq!(classify(79.999, &t), Priority::Warm);
        assert_eq!(classify(60.0, &t), Priority::Warm);
        assert_eq!(classify(59.999, &t), Priority::Cold);
        assert_eq!(classify(0.0, &t), Priority::Cold);
        assert_eq!(classify(100.0, &t), Priority::Hot);
    }

    #[test]
    fn test_classify_matches_legacy_examples() {
        let t = Thresholds::default();
        assert_eq!(classify(85.0, &t), Priority::Hot);
        assert_eq!(classify(70.0, &t), Priority::Warm);
        assert_eq!(classify(50.0, &t), Priority::Cold);
    }

    #[test]
    fn test_classify_uses_supplied_thresholds() {
        let strict = Thresholds::new(95.0, 90.0).unwrap();
        assert_eq!(classify(92.0, &strict), Priority::Warm);
        assert_eq!(classify(85.0, &strict), Priority::Cold);

        let lenient = Thresholds::new(40.0, 20.0).unwrap();
        assert_eq!(classify(44.0, &lenient), Priority::Hot);
    }

    #[test]
    fn test_classify_partitions_scores_disjointly() {
        let t = Thresholds::new(75.0, 45.0).unwrap();
        for tenth in 0..=1000 {
            let s = tenth as f64 / 10.0;
            let expected = if s >= 75.0 {
                Priority::Hot
            } else if s >= 45.0 {
                Priority::Warm
            } else {
                Priority::Cold
            };
            assert_eq!(classify(s, &t), expected, "score {s}");
        }
    }
}
