//! Probability estimator: marks vs. latest historical cutoff.
//!
//! Tiers on `d = marks - cutoff`:
//!
//! | range          | label  | score                 |
//! |----------------|--------|-----------------------|
//! | `d >= 5`       | high   | `min(95, 85 + 2d)`    |
//! | `0 <= d < 5`   | medium | `min(75, 60 + 3d)`    |
//! | `-3 <= d < 0`  | medium | `max(30, 50 + 5d)`    |
//! | `d < -3`       | low    | `max(5, 25 + 2d)`     |

use crate::domain::{CutoffRecord, Probability, ProbabilityEstimate};

/// Score returned when there is no cutoff history at all. Always below the
/// predictor's inclusion threshold.
pub const NO_HISTORY_SCORE: f64 = 0.0;

/// Most recent cutoff record. On a tie for the latest year the first record
/// in iteration order wins.
pub fn latest_record<'a, I>(records: I) -> Option<&'a CutoffRecord>
where
    I: IntoIterator<Item = &'a CutoffRecord>,
{
    records.into_iter().fold(None, |best, r| match best {
        Some(b) if b.year >= r.year => Some(b),
        _ => Some(r),
    })
}

/// Estimate the admission chance for one `(college, branch, category)` history.
pub fn estimate_probability<'a, I>(student_marks: f64, records: I) -> ProbabilityEstimate
where
    I: IntoIterator<Item = &'a CutoffRecord>,
{
    match latest_record(records) {
        Some(latest) => score_difference(student_marks - latest.cutoff_mark),
        None => ProbabilityEstimate {
            probability: Probability::Low,
            probability_score: NO_HISTORY_SCORE,
        },
    }
}

/// Map a marks-minus-cutoff difference to a label and score.
pub fn score_difference(difference: f64) -> ProbabilityEstimate {
    let (probability, probability_score) = if difference >= 5.0 {
        (Probability::High, (85.0 + difference * 2.0).min(95.0))
    } else if difference >= 0.0 {
        (Probability::Medium, (60.0 + difference * 3.0).min(75.0))
    } else if difference >= -3.0 {
        (Probability::Medium, (50.0 + difference * 5.0).max(30.0))
    } else {
        (Probability::Low, (25.0 + difference * 2.0).max(5.0))
    };

    ProbabilityEstimate {
        probability,
        probability_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    fn record(year: u16, cutoff_mark: f64) -> CutoffRecord {
        CutoffRecord {
            college_id: "C1".to_string(),
            branch_id: "B1".to_string(),
            category: Category::Oc,
            year,
            cutoff_mark,
            opening_rank: None,
            closing_rank: None,
        }
    }

    fn assert_estimate(d: f64, label: Probability, score: f64) {
        let est = score_difference(d);
        assert_eq!(est.probability, label, "label for d={d}");
        assert!(
            (est.probability_score - score).abs() < 1e-9,
            "score for d={d}: expected {score}, got {}",
            est.probability_score
        );
    }

    #[test]
    fn tier_boundaries() {
        assert_estimate(5.0, Probability::High, 95.0);
        assert_estimate(20.0, Probability::High, 95.0);
        assert_estimate(4.9, Probability::Medium, 74.7);
        assert_estimate(0.0, Probability::Medium, 60.0);
        assert_estimate(-0.5, Probability::Medium, 47.5);
        assert_estimate(-3.0, Probability::Medium, 35.0);
        assert_estimate(-3.5, Probability::Low, 18.0);
        assert_estimate(-10.0, Probability::Low, 5.0);
        assert_estimate(-25.0, Probability::Low, 5.0);
    }

    #[test]
    fn uses_most_recent_year() {
        let records = vec![record(2021, 150.0), record(2023, 175.0), record(2022, 190.0)];
        let est = estimate_probability(180.0, &records);
        assert_eq!(est.probability, Probability::High);
        assert!((est.probability_score - 95.0).abs() < 1e-9);
    }

    #[test]
    fn tie_on_latest_year_keeps_first_record() {
        let records = vec![record(2023, 170.0), record(2022, 100.0), record(2023, 185.0)];
        let latest = latest_record(&records).unwrap();
        assert!((latest.cutoff_mark - 170.0).abs() < 1e-12);

        // 180 - 170 = 10 -> high; the second 2023 row (185) would have given low.
        let est = estimate_probability(180.0, &records);
        assert_eq!(est.probability, Probability::High);
    }

    #[test]
    fn empty_history_is_below_threshold() {
        let est = estimate_probability(200.0, std::iter::empty());
        assert_eq!(est.probability, Probability::Low);
        assert_eq!(est.probability_score, NO_HISTORY_SCORE);
    }
}
