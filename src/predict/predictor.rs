//! Admission predictor: enumerate `(college, branch)` pairs, filter, score, rank.
//!
//! The engine is a pure function over caller-owned snapshots. It never fails:
//! missing history, unmatched filters or invalid marks all yield fewer (or no)
//! results.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{
    Branch, Category, College, CollegeWithCutoff, CutoffEntry, CutoffRecord, PredictionFilters,
};
use crate::predict::estimator::estimate_probability;
use crate::predict::fees::estimate_fees;

/// Results must score strictly above this to be reported.
pub const MIN_PROBABILITY_SCORE: f64 = 5.0;

/// Cutoff rows for one category, grouped by college id then branch id.
///
/// Rows keep their data-store order inside each group, which is what the
/// latest-year tie-break relies on.
struct CutoffIndex<'a> {
    by_college: HashMap<&'a str, HashMap<&'a str, Vec<&'a CutoffRecord>>>,
}

impl<'a> CutoffIndex<'a> {
    fn build(cutoffs: &'a [CutoffRecord], category: Category) -> Self {
        let mut by_college: HashMap<&str, HashMap<&str, Vec<&CutoffRecord>>> = HashMap::new();
        for r in cutoffs.iter().filter(|r| r.category == category) {
            by_college
                .entry(r.college_id.as_str())
                .or_default()
                .entry(r.branch_id.as_str())
                .or_default()
                .push(r);
        }
        Self { by_college }
    }

    fn get(&self, college_id: &str, branch_id: &str) -> &[&'a CutoffRecord] {
        self.by_college
            .get(college_id)
            .and_then(|branches| branches.get(branch_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Predict admission candidates for a student.
///
/// Colleges are visited in order, branches in order within each college;
/// the output is sorted by `probability_score` descending and ties keep that
/// visiting order.
pub fn predict_colleges_from_database(
    filters: &PredictionFilters,
    colleges: &[College],
    branches: &[Branch],
    cutoffs: &[CutoffRecord],
) -> Vec<CollegeWithCutoff> {
    if !filters.has_valid_marks() {
        debug!(marks = filters.marks, "marks not positive; no prediction");
        return Vec::new();
    }

    let index = CutoffIndex::build(cutoffs, filters.category);
    let mut out: Vec<CollegeWithCutoff> = colleges
        .iter()
        .filter(|c| filters.admits_college(c))
        .flat_map(|c| predict_for_college(filters, c, branches, &index))
        .collect();

    sort_by_score(&mut out);
    out
}

/// Same contract and output as [`predict_colleges_from_database`], with the
/// college loop spread over the rayon pool.
pub fn predict_colleges_parallel(
    filters: &PredictionFilters,
    colleges: &[College],
    branches: &[Branch],
    cutoffs: &[CutoffRecord],
) -> Vec<CollegeWithCutoff> {
    if !filters.has_valid_marks() {
        debug!(marks = filters.marks, "marks not positive; no prediction");
        return Vec::new();
    }

    let index = CutoffIndex::build(cutoffs, filters.category);
    // `collect` keeps the original college order, so the stable sort below
    // reproduces the sequential tie order.
    let mut out: Vec<CollegeWithCutoff> = colleges
        .par_iter()
        .filter(|c| filters.admits_college(c))
        .flat_map_iter(|c| predict_for_college(filters, c, branches, &index))
        .collect();

    sort_by_score(&mut out);
    out
}

fn predict_for_college(
    filters: &PredictionFilters,
    college: &College,
    branches: &[Branch],
    index: &CutoffIndex<'_>,
) -> Vec<CollegeWithCutoff> {
    let mut out = Vec::new();
    for branch in branches.iter().filter(|b| filters.admits_branch(b)) {
        let records = index.get(&college.id, &branch.id);
        if records.is_empty() {
            continue;
        }

        let estimate = estimate_probability(filters.marks, records.iter().copied());
        if estimate.probability_score <= MIN_PROBABILITY_SCORE {
            continue;
        }

        out.push(CollegeWithCutoff {
            college: college.clone(),
            branch: branch.clone(),
            cutoffs: records.iter().map(|r| CutoffEntry::from(*r)).collect(),
            probability: estimate.probability,
            probability_score: estimate.probability_score,
            fees: estimate_fees(college.college_type),
        });
    }
    out
}

fn sort_by_score(results: &mut [CollegeWithCutoff]) {
    results.sort_by(|a, b| {
        b.probability_score
            .partial_cmp(&a.probability_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
