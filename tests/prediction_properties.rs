use proptest::prelude::*;

use tnea_predictor::domain::{
    Branch, Category, College, CollegeType, CutoffRecord, PredictionFilters, Probability,
};
use tnea_predictor::predict::{
    estimate_fees, predict_colleges_from_database, predict_colleges_parallel, score_difference,
    MIN_PROBABILITY_SCORE,
};

const DISTRICTS: [&str; 3] = ["Chennai", "Madurai", "Salem"];

fn college(i: usize, type_idx: usize, district_idx: usize) -> College {
    College {
        id: format!("C{i}"),
        name: format!("College {i}"),
        district: DISTRICTS[district_idx].to_string(),
        location: DISTRICTS[district_idx].to_string(),
        college_type: CollegeType::ALL[type_idx],
        accreditation: None,
        established_year: None,
        facilities: Vec::new(),
    }
}

fn branches() -> Vec<Branch> {
    ["CSE", "ECE", "MECH"]
        .iter()
        .enumerate()
        .map(|(i, code)| Branch {
            id: format!("B{i}"),
            name: code.to_string(),
            code: code.to_string(),
            duration: 4,
        })
        .collect()
}

fn colleges_strategy() -> impl Strategy<Value = Vec<College>> {
    prop::collection::vec((0..3usize, 0..3usize), 1..7).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (t, d))| college(i, t, d))
            .collect()
    })
}

fn cutoffs_strategy() -> impl Strategy<Value = Vec<CutoffRecord>> {
    prop::collection::vec(
        (0..7usize, 0..3usize, 0..7usize, 2019u16..2025, 0.0f64..200.0),
        0..80,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(c, b, cat, year, mark)| CutoffRecord {
                college_id: format!("C{c}"),
                branch_id: format!("B{b}"),
                category: Category::ALL[cat],
                year,
                cutoff_mark: mark,
                opening_rank: None,
                closing_rank: None,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn score_stays_in_range_and_matches_tier(d in -250.0f64..250.0) {
        let est = score_difference(d);
        prop_assert!((5.0..=95.0).contains(&est.probability_score));
        let expected = if d >= 5.0 {
            Probability::High
        } else if d >= -3.0 {
            Probability::Medium
        } else {
            Probability::Low
        };
        prop_assert_eq!(est.probability, expected);
    }

    #[test]
    fn score_is_monotone_in_difference(a in -250.0f64..250.0, b in -250.0f64..250.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(score_difference(lo).probability_score <= score_difference(hi).probability_score);
    }

    #[test]
    fn results_are_filtered_and_ranked(
        colleges in colleges_strategy(),
        cutoffs in cutoffs_strategy(),
        marks in 0.5f64..200.0,
        cat in 0..7usize,
        type_idx in 0..3usize,
    ) {
        let branches = branches();
        let category = Category::ALL[cat];
        let wanted = CollegeType::ALL[type_idx];
        let filters = PredictionFilters::new(marks, category).with_college_types([wanted]);

        let results = predict_colleges_from_database(&filters, &colleges, &branches, &cutoffs);

        for r in &results {
            prop_assert_eq!(r.college.college_type, wanted);
            prop_assert!(r.probability_score > MIN_PROBABILITY_SCORE);
            prop_assert!(!r.cutoffs.is_empty());
            prop_assert!(r.cutoffs.iter().all(|c| c.category == category));
            prop_assert_eq!(r.fees, estimate_fees(wanted));
        }
        for pair in results.windows(2) {
            prop_assert!(pair[0].probability_score >= pair[1].probability_score);
        }
    }

    #[test]
    fn prediction_is_deterministic_and_parallel_matches(
        colleges in colleges_strategy(),
        cutoffs in cutoffs_strategy(),
        marks in 0.5f64..200.0,
        cat in 0..7usize,
    ) {
        let branches = branches();
        let filters = PredictionFilters::new(marks, Category::ALL[cat]);

        let first = predict_colleges_from_database(&filters, &colleges, &branches, &cutoffs);
        let second = predict_colleges_from_database(&filters, &colleges, &branches, &cutoffs);
        let parallel = predict_colleges_parallel(&filters, &colleges, &branches, &cutoffs);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &parallel);
    }

    #[test]
    fn unknown_district_matches_nothing(
        colleges in colleges_strategy(),
        cutoffs in cutoffs_strategy(),
        marks in 0.5f64..200.0,
    ) {
        let filters = PredictionFilters::new(marks, Category::Oc).with_district("Atlantis");
        let results = predict_colleges_from_database(&filters, &colleges, &branches(), &cutoffs);
        prop_assert!(results.is_empty());
    }

    #[test]
    fn non_positive_marks_predict_nothing(
        colleges in colleges_strategy(),
        cutoffs in cutoffs_strategy(),
        marks in -200.0f64..=0.0,
    ) {
        let filters = PredictionFilters::new(marks, Category::Bc);
        prop_assert!(predict_colleges_from_database(&filters, &colleges, &branches(), &cutoffs).is_empty());
        prop_assert!(predict_colleges_parallel(&filters, &colleges, &branches(), &cutoffs).is_empty());
    }
}

#[test]
fn aided_fee_breakdown() {
    let fees = estimate_fees(CollegeType::Aided);
    assert_eq!((fees.tuition, fees.hostel, fees.total), (75_000, 40_000, 115_000));
}
