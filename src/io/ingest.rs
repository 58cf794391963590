//! Dataset ingest and normalization.
//!
//! Turns loosely-typed store rows (CSV records or REST JSON rows) into the
//! closed domain types the prediction engine works with.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **One normalization path** shared by every store backend
//! - **Separation of concerns**: no prediction logic here

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{
    split_facilities, Branch, BranchRow, Category, College, CollegeRow, CollegeType, CutoffRecord,
    CutoffRow, MARK_MAX, MARK_MIN,
};
use crate::error::{AppError, EXIT_EMPTY};

const YEAR_MIN: i64 = 1900;
const YEAR_MAX: i64 = 2100;
const DEFAULT_DURATION: u8 = 4;

/// The three store tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Colleges,
    Branches,
    Cutoffs,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Colleges => "colleges",
            Table::Branches => "branches",
            Table::Cutoffs => "cutoffs",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Table::Colleges => "colleges.csv",
            Table::Branches => "branches.csv",
            Table::Cutoffs => "cutoffs.csv",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub table: Table,
    /// 1-based line (CSV) or row position (REST).
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Validated rows of one table plus what was rejected.
#[derive(Debug, Clone)]
pub struct TableLoad<T> {
    pub rows: Vec<T>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// A raw store row that can be validated into a domain entity.
pub trait StoreRow: Sized {
    type Output;

    const TABLE: Table;
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Parse a CSV record (column presence already checked).
    fn from_record(record: &StringRecord, header_map: &HeaderMap) -> Result<Self, String>;

    /// Best-effort identifier for error messages.
    fn row_id(&self) -> Option<String>;

    fn normalize(&self) -> Result<Self::Output, String>;
}

/// Summary stats about the dataset actually used for prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_colleges: usize,
    pub n_branches: usize,
    pub n_cutoffs: usize,
    pub n_districts: usize,
    pub year_min: u16,
    pub year_max: u16,
    pub categories: Vec<Category>,
    /// Cutoff rows pointing at a college or branch that is not in the dataset.
    pub orphan_cutoffs: usize,
}

/// Ingest output: validated collections + stats + row errors.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub colleges: Vec<College>,
    pub branches: Vec<Branch>,
    pub cutoffs: Vec<CutoffRecord>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

pub type HeaderMap = HashMap<String, usize>;

impl StoreRow for CollegeRow {
    type Output = College;

    const TABLE: Table = Table::Colleges;
    const REQUIRED_COLUMNS: &'static [&'static str] = &["id", "name", "district", "type"];

    fn from_record(record: &StringRecord, header_map: &HeaderMap) -> Result<Self, String> {
        Ok(CollegeRow {
            id: get_optional(record, header_map, "id").map(str::to_string),
            name: get_optional(record, header_map, "name").map(str::to_string),
            district: get_optional(record, header_map, "district").map(str::to_string),
            location: get_optional(record, header_map, "location").map(str::to_string),
            college_type: get_optional(record, header_map, "type").map(str::to_string),
            accreditation: get_optional(record, header_map, "accreditation").map(str::to_string),
            established_year: parse_opt_num(get_optional(record, header_map, "established_year"), "established_year")?,
            facilities: get_optional(record, header_map, "facilities")
                .map(split_facilities)
                .unwrap_or_default(),
        })
    }

    fn row_id(&self) -> Option<String> {
        self.id.clone()
    }

    fn normalize(&self) -> Result<College, String> {
        let id = required_text(self.id.as_deref(), "id")?;
        let name = required_text(self.name.as_deref(), "name")?;
        let district = required_text(self.district.as_deref(), "district")?;
        let college_type = CollegeType::from_str(&required_text(self.college_type.as_deref(), "type")?)?;

        let established_year = match self.established_year {
            None => None,
            Some(y) if (1700..=YEAR_MAX).contains(&y) => Some(y as u16),
            Some(y) => return Err(format!("Invalid `established_year` {y}.")),
        };

        Ok(College {
            id,
            name,
            location: optional_text(self.location.as_deref()).unwrap_or_else(|| district.clone()),
            district,
            college_type,
            accreditation: optional_text(self.accreditation.as_deref()),
            established_year,
            facilities: self.facilities.clone(),
        })
    }
}

impl StoreRow for BranchRow {
    type Output = Branch;

    const TABLE: Table = Table::Branches;
    const REQUIRED_COLUMNS: &'static [&'static str] = &["id", "name", "code"];

    fn from_record(record: &StringRecord, header_map: &HeaderMap) -> Result<Self, String> {
        Ok(BranchRow {
            id: get_optional(record, header_map, "id").map(str::to_string),
            name: get_optional(record, header_map, "name").map(str::to_string),
            code: get_optional(record, header_map, "code").map(str::to_string),
            duration: parse_opt_num(get_optional(record, header_map, "duration"), "duration")?,
        })
    }

    fn row_id(&self) -> Option<String> {
        self.id.clone()
    }

    fn normalize(&self) -> Result<Branch, String> {
        let duration = match self.duration {
            None => DEFAULT_DURATION,
            Some(d) if (1..=6).contains(&d) => d as u8,
            Some(d) => return Err(format!("Invalid `duration` {d} (expected 1-6 years).")),
        };

        Ok(Branch {
            id: required_text(self.id.as_deref(), "id")?,
            name: required_text(self.name.as_deref(), "name")?,
            code: required_text(self.code.as_deref(), "code")?.to_ascii_uppercase(),
            duration,
        })
    }
}

impl StoreRow for CutoffRow {
    type Output = CutoffRecord;

    const TABLE: Table = Table::Cutoffs;
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &["college_id", "branch_id", "category", "year", "cutoff_mark"];

    fn from_record(record: &StringRecord, header_map: &HeaderMap) -> Result<Self, String> {
        Ok(CutoffRow {
            college_id: get_optional(record, header_map, "college_id").map(str::to_string),
            branch_id: get_optional(record, header_map, "branch_id").map(str::to_string),
            category: get_optional(record, header_map, "category").map(str::to_string),
            year: parse_opt_num(get_optional(record, header_map, "year"), "year")?,
            cutoff_mark: parse_opt_num(get_optional(record, header_map, "cutoff_mark"), "cutoff_mark")?,
            opening_rank: parse_opt_num(get_optional(record, header_map, "opening_rank"), "opening_rank")?,
            closing_rank: parse_opt_num(get_optional(record, header_map, "closing_rank"), "closing_rank")?,
        })
    }

    fn row_id(&self) -> Option<String> {
        match (&self.college_id, &self.branch_id) {
            (Some(c), Some(b)) => Some(format!("{c}/{b}")),
            (Some(c), None) => Some(c.clone()),
            _ => None,
        }
    }

    fn normalize(&self) -> Result<CutoffRecord, String> {
        let college_id = required_text(self.college_id.as_deref(), "college_id")?;
        let branch_id = required_text(self.branch_id.as_deref(), "branch_id")?;
        let category = Category::from_str(self.category.as_deref().unwrap_or(""))?;

        let year = self.year.ok_or_else(|| "Missing required value: `year`".to_string())?;
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            return Err(format!("Invalid `year` {year}."));
        }

        let cutoff_mark = self
            .cutoff_mark
            .ok_or_else(|| "Missing required value: `cutoff_mark`".to_string())?;
        if !cutoff_mark.is_finite() || !(MARK_MIN..=MARK_MAX).contains(&cutoff_mark) {
            return Err(format!(
                "Invalid `cutoff_mark` {cutoff_mark} (expected {MARK_MIN}-{MARK_MAX})."
            ));
        }

        let opening_rank = rank(self.opening_rank, "opening_rank")?;
        let closing_rank = rank(self.closing_rank, "closing_rank")?;
        if let (Some(open), Some(close)) = (opening_rank, closing_rank) {
            if open > close {
                return Err(format!("`opening_rank` {open} is after `closing_rank` {close}."));
            }
        }

        Ok(CutoffRecord {
            college_id,
            branch_id,
            category,
            year: year as u16,
            cutoff_mark,
            opening_rank,
            closing_rank,
        })
    }
}

/// Load and validate one CSV table.
pub fn read_table_csv<R: StoreRow>(path: &Path) -> Result<TableLoad<R::Output>, AppError> {
    let table = R::TABLE;
    let file = File::open(path).map_err(|e| {
        AppError::usage(format!("Failed to open {table} CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::usage(format!("Failed to read {table} CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for col in R::REQUIRED_COLUMNS {
        if !header_map.contains_key(*col) {
            return Err(AppError::usage(format!(
                "Missing required column in {}: `{col}`",
                table.file_name()
            )));
        }
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header line, lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    table,
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match R::from_record(&record, &header_map) {
            Ok(raw) => match raw.normalize() {
                Ok(row) => rows.push(row),
                Err(message) => row_errors.push(RowError {
                    table,
                    line,
                    id: raw.row_id(),
                    message,
                }),
            },
            Err(message) => row_errors.push(RowError {
                table,
                line,
                id: None,
                message,
            }),
        }
    }

    debug!(%table, rows_read, rows_used = rows.len(), "loaded CSV table");
    Ok(TableLoad {
        rows,
        row_errors,
        rows_read,
    })
}

/// Validate already-deserialized rows (REST backend).
pub fn normalize_rows<R: StoreRow>(raw_rows: Vec<R>) -> TableLoad<R::Output> {
    let rows_read = raw_rows.len();
    let mut rows = Vec::with_capacity(rows_read);
    let mut row_errors = Vec::new();

    for (idx, raw) in raw_rows.iter().enumerate() {
        match raw.normalize() {
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError {
                table: R::TABLE,
                line: idx + 1,
                id: raw.row_id(),
                message,
            }),
        }
    }

    TableLoad {
        rows,
        row_errors,
        rows_read,
    }
}

/// Combine three table loads into a dataset, failing if any table is empty.
pub fn assemble_dataset(
    colleges: TableLoad<College>,
    branches: TableLoad<Branch>,
    cutoffs: TableLoad<CutoffRecord>,
) -> Result<Dataset, AppError> {
    for (table, n) in [
        (Table::Colleges, colleges.rows.len()),
        (Table::Branches, branches.rows.len()),
        (Table::Cutoffs, cutoffs.rows.len()),
    ] {
        if n == 0 {
            return Err(AppError::new(
                EXIT_EMPTY,
                format!("No valid {table} rows remain after validation."),
            ));
        }
    }

    let stats = compute_stats(&colleges.rows, &branches.rows, &cutoffs.rows).ok_or_else(|| {
        AppError::new(EXIT_EMPTY, "No valid cutoff rows remain after validation.")
    })?;
    if stats.orphan_cutoffs > 0 {
        warn!(
            orphan_cutoffs = stats.orphan_cutoffs,
            "cutoff rows reference unknown colleges or branches"
        );
    }

    let rows_read = colleges.rows_read + branches.rows_read + cutoffs.rows_read;
    let mut row_errors = colleges.row_errors;
    row_errors.extend(branches.row_errors);
    row_errors.extend(cutoffs.row_errors);

    Ok(Dataset {
        colleges: colleges.rows,
        branches: branches.rows,
        cutoffs: cutoffs.rows,
        stats,
        row_errors,
        rows_read,
    })
}

fn compute_stats(colleges: &[College], branches: &[Branch], cutoffs: &[CutoffRecord]) -> Option<DatasetStats> {
    let year_min = cutoffs.iter().map(|c| c.year).min()?;
    let year_max = cutoffs.iter().map(|c| c.year).max()?;

    let college_ids: HashSet<&str> = colleges.iter().map(|c| c.id.as_str()).collect();
    let branch_ids: HashSet<&str> = branches.iter().map(|b| b.id.as_str()).collect();
    let orphan_cutoffs = cutoffs
        .iter()
        .filter(|c| !college_ids.contains(c.college_id.as_str()) || !branch_ids.contains(c.branch_id.as_str()))
        .count();

    let categories: BTreeSet<Category> = cutoffs.iter().map(|c| c.category).collect();
    let districts: HashSet<&str> = colleges.iter().map(|c| c.district.as_str()).collect();

    Some(DatasetStats {
        n_colleges: colleges.len(),
        n_branches: branches.len(),
        n_cutoffs: cutoffs.len(),
        n_districts: districts.len(),
        year_min,
        year_max,
        categories: categories.into_iter().collect(),
        orphan_cutoffs,
    })
}

fn build_header_map(headers: &StringRecord) -> HeaderMap {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase();
    match name.as_str() {
        "college_type" => "type".to_string(),
        _ => name,
    }
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HeaderMap, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_opt_num<T: FromStr>(s: Option<&str>, name: &str) -> Result<Option<T>, String> {
    match s {
        None => Ok(None),
        Some(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("Invalid `{name}` value '{s}'.")),
    }
}

fn required_text(value: Option<&str>, name: &str) -> Result<String, String> {
    optional_text(value).ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn rank(value: Option<i64>, name: &str) -> Result<Option<u32>, String> {
    match value {
        None => Ok(None),
        Some(r) if r > 0 && r <= u32::MAX as i64 => Ok(Some(r as u32)),
        Some(r) => Err(format!("Invalid `{name}` {r} (must be a positive rank).")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_map(cols: &[&str]) -> HeaderMap {
        build_header_map(&StringRecord::from(cols.to_vec()))
    }

    #[test]
    fn header_names_are_normalized() {
        let map = header_map(&["\u{feff}ID", " Name ", "College_Type"]);
        assert_eq!(map.get("id"), Some(&0));
        assert_eq!(map.get("name"), Some(&1));
        assert_eq!(map.get("type"), Some(&2));
    }

    #[test]
    fn college_row_validation() {
        let map = header_map(&["id", "name", "district", "type", "facilities", "established_year"]);
        let record = StringRecord::from(vec!["C1", "PSG Tech", "Coimbatore", "Self Financing", "Library; Hostel;", "1951"]);
        let college = CollegeRow::from_record(&record, &map).unwrap().normalize().unwrap();
        assert_eq!(college.college_type, CollegeType::SelfFinancing);
        assert_eq!(college.location, "Coimbatore");
        assert_eq!(college.facilities, vec!["Library", "Hostel"]);
        assert_eq!(college.established_year, Some(1951));

        let bad = StringRecord::from(vec!["C2", "X", "Salem", "private", "", ""]);
        let err = CollegeRow::from_record(&bad, &map).unwrap().normalize().unwrap_err();
        assert!(err.contains("Unknown college type"));
    }

    #[test]
    fn cutoff_row_validation() {
        let ok = CutoffRow {
            college_id: Some("C1".to_string()),
            branch_id: Some("B1".to_string()),
            category: Some("mbc".to_string()),
            year: Some(2023),
            cutoff_mark: Some(187.5),
            opening_rank: Some(10),
            closing_rank: Some(300),
        };
        let rec = ok.normalize().unwrap();
        assert_eq!(rec.category, Category::Mbc);
        assert_eq!(rec.closing_rank, Some(300));

        let out_of_scale = CutoffRow {
            cutoff_mark: Some(201.0),
            ..ok.clone()
        };
        assert!(out_of_scale.normalize().unwrap_err().contains("cutoff_mark"));

        let empty_category = CutoffRow {
            category: Some(String::new()),
            ..ok.clone()
        };
        assert!(empty_category.normalize().is_err());

        let inverted_ranks = CutoffRow {
            opening_rank: Some(500),
            closing_rank: Some(100),
            ..ok
        };
        assert!(inverted_ranks.normalize().is_err());
    }

    #[test]
    fn unparseable_number_is_row_error() {
        let map = header_map(&["college_id", "branch_id", "category", "year", "cutoff_mark"]);
        let record = StringRecord::from(vec!["C1", "B1", "OC", "2023", "abc"]);
        let err = CutoffRow::from_record(&record, &map).unwrap_err();
        assert!(err.contains("cutoff_mark"));
    }

    #[test]
    fn normalize_rows_collects_errors() {
        let rows = vec![
            BranchRow {
                id: Some("B1".to_string()),
                name: Some("Computer Science".to_string()),
                code: Some("cse".to_string()),
                duration: None,
            },
            BranchRow {
                id: None,
                name: Some("Nameless".to_string()),
                code: Some("X".to_string()),
                duration: Some(4),
            },
        ];
        let load = normalize_rows(rows);
        assert_eq!(load.rows_read, 2);
        assert_eq!(load.rows.len(), 1);
        assert_eq!(load.rows[0].code, "CSE");
        assert_eq!(load.rows[0].duration, DEFAULT_DURATION);
        assert_eq!(load.row_errors.len(), 1);
        assert_eq!(load.row_errors[0].line, 2);
        assert_eq!(load.row_errors[0].table, Table::Branches);
    }

    #[test]
    fn assemble_counts_orphans_and_rejects_empty_tables() {
        let college = College {
            id: "C1".to_string(),
            name: "A".to_string(),
            district: "Chennai".to_string(),
            location: "Chennai".to_string(),
            college_type: CollegeType::Government,
            accreditation: None,
            established_year: None,
            facilities: Vec::new(),
        };
        let branch = Branch {
            id: "B1".to_string(),
            name: "CSE".to_string(),
            code: "CSE".to_string(),
            duration: 4,
        };
        let cutoff = |college_id: &str, year: u16| CutoffRecord {
            college_id: college_id.to_string(),
            branch_id: "B1".to_string(),
            category: Category::Oc,
            year,
            cutoff_mark: 180.0,
            opening_rank: None,
            closing_rank: None,
        };
        fn load<T>(rows: Vec<T>) -> TableLoad<T> {
            TableLoad { rows, row_errors: Vec::new(), rows_read: 0 }
        }

        let ds = assemble_dataset(
            load(vec![college.clone()]),
            load(vec![branch.clone()]),
            load(vec![cutoff("C1", 2021), cutoff("C9", 2023)]),
        )
        .unwrap();
        assert_eq!(ds.stats.orphan_cutoffs, 1);
        assert_eq!((ds.stats.year_min, ds.stats.year_max), (2021, 2023));
        assert_eq!(ds.stats.categories, vec![Category::Oc]);

        let err = assemble_dataset(load(vec![college]), load(vec![branch]), load(Vec::new())).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_EMPTY);
    }
}
