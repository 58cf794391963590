//! Synthetic TNEA dataset generation.
//!
//! Produces a deterministic demo dataset (same seed, same rows) shaped like
//! real counselling data: a handful of districts, the usual engineering
//! branches, per-category cutoffs that drift year over year.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Branch, Category, College, CollegeType, CutoffRecord, MARK_MAX, MARK_MIN};
use crate::error::AppError;

const DISTRICTS: [&str; 10] = [
    "Chennai",
    "Coimbatore",
    "Madurai",
    "Tiruchirappalli",
    "Salem",
    "Tirunelveli",
    "Vellore",
    "Erode",
    "Thanjavur",
    "Kanchipuram",
];

/// `(code, name, popularity)`; popularity shifts the cutoff up.
const BRANCHES: [(&str, &str, f64); 8] = [
    ("CSE", "Computer Science and Engineering", 12.0),
    ("IT", "Information Technology", 10.0),
    ("AIDS", "Artificial Intelligence and Data Science", 10.0),
    ("ECE", "Electronics and Communication Engineering", 8.0),
    ("EEE", "Electrical and Electronics Engineering", 3.0),
    ("MECH", "Mechanical Engineering", 0.0),
    ("CIVIL", "Civil Engineering", -4.0),
    ("CHEM", "Chemical Engineering", -6.0),
];

const FACILITIES: [&str; 6] = ["Library", "Hostel", "Labs", "Sports", "Wi-Fi", "Transport"];

/// Year-over-year standard deviation of a cutoff, in marks.
const YEAR_DRIFT_SD: f64 = 2.0;

/// Knobs for `tnea sample`.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub colleges: usize,
    pub seed: u64,
    pub year_from: u16,
    pub year_to: u16,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            colleges: 60,
            seed: 42,
            year_from: 2021,
            year_to: 2023,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SampleDataset {
    pub colleges: Vec<College>,
    pub branches: Vec<Branch>,
    pub cutoffs: Vec<CutoffRecord>,
}

pub fn generate_dataset(config: &SampleConfig) -> Result<SampleDataset, AppError> {
    if config.colleges == 0 {
        return Err(AppError::usage("College count must be > 0."));
    }
    if config.year_from > config.year_to {
        return Err(AppError::usage("`--year-from` must not be after `--year-to`."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let drift = Normal::new(0.0, YEAR_DRIFT_SD)
        .map_err(|e| AppError::usage(format!("Drift distribution error: {e}")))?;

    let branches: Vec<Branch> = BRANCHES
        .iter()
        .enumerate()
        .map(|(i, (code, name, _))| Branch {
            id: format!("B{}", i + 1),
            name: name.to_string(),
            code: code.to_string(),
            duration: 4,
        })
        .collect();

    let mut colleges = Vec::with_capacity(config.colleges);
    let mut cutoffs = Vec::new();

    for i in 0..config.colleges {
        let college_type = pick_type(&mut rng);
        let district = DISTRICTS[rng.gen_range(0..DISTRICTS.len())];
        // Prestige sets the base OC cutoff for the college's least popular branch.
        let prestige: f64 = match college_type {
            CollegeType::Government => rng.gen_range(170.0..190.0),
            CollegeType::Aided => rng.gen_range(155.0..180.0),
            CollegeType::SelfFinancing => rng.gen_range(110.0..175.0),
        };

        let id = format!("C{:03}", i + 1);
        let facilities = FACILITIES
            .iter()
            .filter(|_| rng.gen_bool(0.6))
            .map(|f| f.to_string())
            .collect();

        colleges.push(College {
            name: format!("{district} {} College of Engineering #{}", college_type.short_label(), i + 1),
            location: format!("{district}, Tamil Nadu"),
            district: district.to_string(),
            college_type,
            accreditation: pick_accreditation(&mut rng, prestige),
            established_year: Some(rng.gen_range(1950..=2012)),
            facilities,
            id,
        });

        // Not every college offers every branch.
        for (b, (_, _, popularity)) in branches.iter().zip(BRANCHES.iter()) {
            if !rng.gen_bool(0.75) {
                continue;
            }
            let college_id = &colleges[i].id;
            for category in Category::ALL {
                let base = prestige + popularity - category_relaxation(category);
                let mut level = base;
                for year in config.year_from..=config.year_to {
                    level += drift.sample(&mut rng);
                    let cutoff_mark = round2(level.clamp(MARK_MIN, MARK_MAX));
                    let closing_rank = rank_for_mark(cutoff_mark, category);
                    cutoffs.push(CutoffRecord {
                        college_id: college_id.clone(),
                        branch_id: b.id.clone(),
                        category,
                        year,
                        cutoff_mark,
                        opening_rank: Some((closing_rank / 10).max(1)),
                        closing_rank: Some(closing_rank),
                    });
                }
            }
        }
    }

    Ok(SampleDataset {
        colleges,
        branches,
        cutoffs,
    })
}

fn pick_type(rng: &mut StdRng) -> CollegeType {
    let u: f64 = rng.gen_range(0.0..1.0);
    if u < 0.15 {
        CollegeType::Government
    } else if u < 0.30 {
        CollegeType::Aided
    } else {
        CollegeType::SelfFinancing
    }
}

fn pick_accreditation(rng: &mut StdRng, prestige: f64) -> Option<String> {
    let grade = if prestige >= 180.0 {
        "A++"
    } else if prestige >= 165.0 {
        "A+"
    } else if prestige >= 145.0 {
        "A"
    } else {
        return rng.gen_bool(0.3).then(|| "B++".to_string());
    };
    Some(grade.to_string())
}

/// How far below OC a category's cutoff typically sits.
fn category_relaxation(category: Category) -> f64 {
    match category {
        Category::Oc => 0.0,
        Category::Bc => 3.0,
        Category::Bcm => 5.0,
        Category::Mbc => 7.0,
        Category::Sc => 15.0,
        Category::Sca => 20.0,
        Category::St => 25.0,
    }
}

/// Rough general-merit rank for a mark; rarer categories close earlier in rank.
fn rank_for_mark(mark: f64, category: Category) -> u32 {
    let gap = (MARK_MAX - mark).max(0.0);
    let general = 50.0 + gap * gap * 12.0;
    let share = match category {
        Category::Oc => 1.0,
        Category::Bc => 0.9,
        Category::Bcm => 0.6,
        Category::Mbc => 0.8,
        Category::Sc => 0.5,
        Category::Sca => 0.3,
        Category::St => 0.2,
    };
    (general * share).round().max(1.0) as u32
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
