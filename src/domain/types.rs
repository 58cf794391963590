//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - loaded from the cutoff data store (CSV directory or REST backend)
//! - passed by reference into the prediction engine
//! - exported to JSON/CSV after a run

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Lowest cutoff mark on the TNEA aggregate scale.
pub const MARK_MIN: f64 = 0.0;
/// Highest cutoff mark on the TNEA aggregate scale.
pub const MARK_MAX: f64 = 200.0;

/// How a college is funded. Drives the fee estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollegeType {
    Government,
    Aided,
    SelfFinancing,
}

impl CollegeType {
    pub const ALL: [CollegeType; 3] = [
        CollegeType::Government,
        CollegeType::Aided,
        CollegeType::SelfFinancing,
    ];

    /// Wire name used by the data store (`government`, `aided`, `self-financing`).
    pub fn as_str(self) -> &'static str {
        match self {
            CollegeType::Government => "government",
            CollegeType::Aided => "aided",
            CollegeType::SelfFinancing => "self-financing",
        }
    }

    /// Short label for terminal tables.
    pub fn short_label(self) -> &'static str {
        match self {
            CollegeType::Government => "Govt",
            CollegeType::Aided => "Aided",
            CollegeType::SelfFinancing => "Self-fin",
        }
    }
}

impl fmt::Display for CollegeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollegeType {
    type Err = String;

    /// Accepts the store spelling plus the usual variants seen in exports
    /// (`Self Financing`, `self_financing`, `Govt`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '_' { '-' } else { c })
            .collect();
        match norm.as_str() {
            "government" | "govt" => Ok(CollegeType::Government),
            "aided" | "government-aided" => Ok(CollegeType::Aided),
            "self-financing" | "selffinancing" => Ok(CollegeType::SelfFinancing),
            _ => Err(format!(
                "Unknown college type '{}'. Expected one of: government, aided, self-financing.",
                s.trim()
            )),
        }
    }
}

/// TNEA community (reservation) category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Open competition.
    Oc,
    /// Backward class.
    Bc,
    /// Backward class (Muslim).
    Bcm,
    /// Most backward class.
    Mbc,
    /// Scheduled caste.
    Sc,
    /// Scheduled caste (Arunthathiyar).
    Sca,
    /// Scheduled tribe.
    St,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Oc,
        Category::Bc,
        Category::Bcm,
        Category::Mbc,
        Category::Sc,
        Category::Sca,
        Category::St,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Category::Oc => "OC",
            Category::Bc => "BC",
            Category::Bcm => "BCM",
            Category::Mbc => "MBC",
            Category::Sc => "SC",
            Category::Sca => "SCA",
            Category::St => "ST",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| {
                if code.is_empty() {
                    "Missing category.".to_string()
                } else {
                    format!("Unknown category '{code}'. Expected one of: OC, BC, BCM, MBC, SC, SCA, ST.")
                }
            })
    }
}

/// Qualitative admission chance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Probability {
    High,
    Medium,
    Low,
}

impl Probability {
    pub const ALL: [Probability; 3] = [Probability::High, Probability::Medium, Probability::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Probability::High => "high",
            Probability::Medium => "medium",
            Probability::Low => "low",
        }
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An engineering college as stored in the data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct College {
    pub id: String,
    pub name: String,
    pub district: String,
    pub location: String,
    #[serde(rename = "type")]
    pub college_type: CollegeType,
    /// NAAC grade (e.g. `A++`), when accredited.
    pub accreditation: Option<String>,
    pub established_year: Option<u16>,
    #[serde(default)]
    pub facilities: Vec<String>,
}

/// A branch (programme) offered by colleges. Independent of any college;
/// cutoff records join the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub code: String,
    /// Programme length in years.
    pub duration: u8,
}

/// Historical cutoff fact for `(college, branch, category, year)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffRecord {
    pub college_id: String,
    pub branch_id: String,
    pub category: Category,
    pub year: u16,
    /// Aggregate mark on the 0–200 scale.
    pub cutoff_mark: f64,
    pub opening_rank: Option<u32>,
    pub closing_rank: Option<u32>,
}

/// Cutoff record as carried on a prediction result (the college/branch keys
/// are implied by the owning result).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffEntry {
    pub category: Category,
    pub year: u16,
    pub cutoff_mark: f64,
    pub opening_rank: Option<u32>,
    pub closing_rank: Option<u32>,
}

impl From<&CutoffRecord> for CutoffEntry {
    fn from(r: &CutoffRecord) -> Self {
        Self {
            category: r.category,
            year: r.year,
            cutoff_mark: r.cutoff_mark,
            opening_rank: r.opening_rank,
            closing_rank: r.closing_rank,
        }
    }
}

/// Annual fee breakdown in rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEstimate {
    pub tuition: u32,
    pub hostel: u32,
    pub total: u32,
}

/// Output of the probability estimator for one `(college, branch, category)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityEstimate {
    pub probability: Probability,
    /// Synthetic 0–100 confidence score.
    pub probability_score: f64,
}

/// One admission candidate produced by a prediction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeWithCutoff {
    #[serde(flatten)]
    pub college: College,
    pub branch: Branch,
    /// Every cutoff record for this college/branch in the student's category,
    /// in data-store order.
    pub cutoffs: Vec<CutoffEntry>,
    pub probability: Probability,
    pub probability_score: f64,
    pub fees: FeeEstimate,
}

impl CollegeWithCutoff {
    /// Cutoff the estimate was computed from (most recent year, first wins on ties).
    pub fn latest_cutoff(&self) -> Option<&CutoffEntry> {
        self.cutoffs.iter().fold(None, |best, c| match best {
            Some(b) if b.year >= c.year => Some(b),
            _ => Some(c),
        })
    }
}

/// Student profile plus preferences for one prediction call.
///
/// Empty `college_types` / `branch_ids` mean "no restriction".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionFilters {
    pub marks: f64,
    pub category: Category,
    pub preferred_district: Option<String>,
    pub college_types: Vec<CollegeType>,
    pub branch_ids: Vec<String>,
}

impl PredictionFilters {
    pub fn new(marks: f64, category: Category) -> Self {
        Self {
            marks,
            category,
            preferred_district: None,
            college_types: Vec::new(),
            branch_ids: Vec::new(),
        }
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.preferred_district = Some(district.into());
        self
    }

    pub fn with_college_types(mut self, types: impl IntoIterator<Item = CollegeType>) -> Self {
        self.college_types = types.into_iter().collect();
        self
    }

    pub fn with_branches<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.branch_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Marks must be a positive finite number for any prediction to be made.
    pub fn has_valid_marks(&self) -> bool {
        self.marks.is_finite() && self.marks > 0.0
    }

    /// College-level filters: funding type and preferred district.
    pub fn admits_college(&self, college: &College) -> bool {
        if !self.college_types.is_empty() && !self.college_types.contains(&college.college_type) {
            return false;
        }
        match self.preferred_district.as_deref().map(str::trim) {
            Some(district) if !district.is_empty() => district == college.district,
            _ => true,
        }
    }

    pub fn admits_branch(&self, branch: &Branch) -> bool {
        self.branch_ids.is_empty() || self.branch_ids.iter().any(|id| *id == branch.id)
    }
}

/// Raw college row as delivered by the data store (before validation).
///
/// Mirrors the store schema loosely so that ingest can produce row-level
/// errors instead of failing a whole fetch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollegeRow {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "type")]
    pub college_type: Option<String>,
    #[serde(default)]
    pub accreditation: Option<String>,
    #[serde(default)]
    pub established_year: Option<i64>,
    #[serde(default, deserialize_with = "de_facilities")]
    pub facilities: Vec<String>,
}

/// Raw branch row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchRow {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
}

/// Raw cutoff row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CutoffRow {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub college_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub cutoff_mark: Option<f64>,
    #[serde(default)]
    pub opening_rank: Option<i64>,
    #[serde(default)]
    pub closing_rank: Option<i64>,
}

/// Store ids may be text keys or integer serials.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
    Text(String),
    Int(i64),
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<IdValue>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        let s = match v {
            IdValue::Text(s) => s.trim().to_string(),
            IdValue::Int(i) => i.to_string(),
        };
        (!s.is_empty()).then_some(s)
    }))
}

/// Facilities arrive either as a JSON array or a `;`-separated string.
#[derive(Deserialize)]
#[serde(untagged)]
enum FacilitiesValue {
    List(Vec<String>),
    Joined(String),
}

fn de_facilities<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<FacilitiesValue>::deserialize(deserializer)?;
    Ok(match value {
        None => Vec::new(),
        Some(FacilitiesValue::List(items)) => items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(FacilitiesValue::Joined(s)) => split_facilities(&s),
    })
}

/// Split a `;`-separated facilities cell.
pub fn split_facilities(s: &str) -> Vec<String> {
    s.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Where the pipeline reads colleges/branches/cutoffs from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Directory holding `colleges.csv`, `branches.csv`, `cutoffs.csv`.
    Csv(PathBuf),
    /// Hosted REST backend configured through the environment.
    Remote,
}

/// A full `tnea predict` run as understood by the pipeline.
///
/// Derived from CLI flags (plus an optional JSON request file).
#[derive(Debug, Clone)]
pub struct PredictConfig {
    pub source: DataSource,
    pub request: crate::io::request::PredictionRequest,
    /// Rows shown in the terminal table (0 = all).
    pub top_n: usize,
    pub parallel: bool,
    pub export_results: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    /// Append each request to this JSONL file.
    pub log_requests: Option<PathBuf>,
}
