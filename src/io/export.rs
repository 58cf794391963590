//! Export prediction results (CSV/JSON) and datasets (CSV).
//!
//! Result exports are meant to be easy to consume in spreadsheets or
//! downstream scripts; dataset exports use the exact layout `CsvStore` reads.

use std::fs::{create_dir_all, File};
use std::path::Path;

use crate::domain::{Branch, College, CollegeWithCutoff, CutoffRecord};
use crate::error::AppError;
use crate::io::ingest::Table;

/// Write one CSV row per result, with the cutoff the score was computed from.
pub fn write_results_csv(path: &Path, results: &[CollegeWithCutoff]) -> Result<(), AppError> {
    let mut w = csv_writer(path, "results")?;

    w.write_record([
        "rank",
        "college_id",
        "college_name",
        "district",
        "type",
        "branch_id",
        "branch_code",
        "branch_name",
        "latest_year",
        "latest_cutoff",
        "closing_rank",
        "probability",
        "probability_score",
        "tuition_fee",
        "hostel_fee",
        "total_fee",
    ])
    .map_err(|e| AppError::usage(format!("Failed to write results CSV header: {e}")))?;

    for (idx, r) in results.iter().enumerate() {
        let latest = r.latest_cutoff();
        w.write_record([
            (idx + 1).to_string(),
            r.college.id.clone(),
            r.college.name.clone(),
            r.college.district.clone(),
            r.college.college_type.as_str().to_string(),
            r.branch.id.clone(),
            r.branch.code.clone(),
            r.branch.name.clone(),
            latest.map(|c| c.year.to_string()).unwrap_or_default(),
            latest.map(|c| format!("{:.2}", c.cutoff_mark)).unwrap_or_default(),
            latest
                .and_then(|c| c.closing_rank)
                .map(|v| v.to_string())
                .unwrap_or_default(),
            r.probability.as_str().to_string(),
            format!("{:.2}", r.probability_score),
            r.fees.tuition.to_string(),
            r.fees.hostel.to_string(),
            r.fees.total.to_string(),
        ])
        .map_err(|e| AppError::usage(format!("Failed to write results CSV row: {e}")))?;
    }

    w.flush()
        .map_err(|e| AppError::usage(format!("Failed to flush results CSV: {e}")))
}

/// Write the full result list (including every cutoff year) as JSON.
pub fn write_results_json(path: &Path, results: &[CollegeWithCutoff]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create results JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, results)
        .map_err(|e| AppError::usage(format!("Failed to write results JSON: {e}")))
}

/// Write `colleges.csv`, `branches.csv`, `cutoffs.csv` into `dir`.
pub fn write_dataset_csv(
    dir: &Path,
    colleges: &[College],
    branches: &[Branch],
    cutoffs: &[CutoffRecord],
) -> Result<(), AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::usage(format!("Failed to create dataset dir '{}': {e}", dir.display())))?;

    let mut w = csv_writer(&dir.join(Table::Colleges.file_name()), "colleges")?;
    write_row(
        &mut w,
        [
            "id",
            "name",
            "district",
            "location",
            "type",
            "accreditation",
            "established_year",
            "facilities",
        ]
        .map(str::to_string),
    )?;
    for c in colleges {
        write_row(
            &mut w,
            [
                c.id.clone(),
                c.name.clone(),
                c.district.clone(),
                c.location.clone(),
                c.college_type.as_str().to_string(),
                c.accreditation.clone().unwrap_or_default(),
                c.established_year.map(|y| y.to_string()).unwrap_or_default(),
                c.facilities.join(";"),
            ],
        )?;
    }
    finish(w)?;

    let mut w = csv_writer(&dir.join(Table::Branches.file_name()), "branches")?;
    write_row(&mut w, ["id", "name", "code", "duration"].map(str::to_string))?;
    for b in branches {
        write_row(
            &mut w,
            [b.id.clone(), b.name.clone(), b.code.clone(), b.duration.to_string()],
        )?;
    }
    finish(w)?;

    let mut w = csv_writer(&dir.join(Table::Cutoffs.file_name()), "cutoffs")?;
    write_row(
        &mut w,
        [
            "college_id",
            "branch_id",
            "category",
            "year",
            "cutoff_mark",
            "opening_rank",
            "closing_rank",
        ]
        .map(str::to_string),
    )?;
    for r in cutoffs {
        write_row(
            &mut w,
            [
                r.college_id.clone(),
                r.branch_id.clone(),
                r.category.code().to_string(),
                r.year.to_string(),
                format!("{:.2}", r.cutoff_mark),
                r.opening_rank.map(|v| v.to_string()).unwrap_or_default(),
                r.closing_rank.map(|v| v.to_string()).unwrap_or_default(),
            ],
        )?;
    }
    finish(w)
}

fn csv_writer(path: &Path, what: &str) -> Result<csv::Writer<File>, AppError> {
    csv::Writer::from_path(path)
        .map_err(|e| AppError::usage(format!("Failed to create {what} CSV '{}': {e}", path.display())))
}

fn write_row<const N: usize>(w: &mut csv::Writer<File>, row: [String; N]) -> Result<(), AppError> {
    w.write_record(&row)
        .map_err(|e| AppError::usage(format!("Failed to write CSV row: {e}")))
}

fn finish(mut w: csv::Writer<File>) -> Result<(), AppError> {
    w.flush()
        .map_err(|e| AppError::usage(format!("Failed to flush CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, CollegeType, CutoffEntry, Probability};
    use crate::predict::estimate_fees;

    fn result() -> CollegeWithCutoff {
        CollegeWithCutoff {
            college: College {
                id: "C1".to_string(),
                name: "Anna University, CEG".to_string(),
                district: "Chennai".to_string(),
                location: "Guindy".to_string(),
                college_type: CollegeType::Government,
                accreditation: Some("A++".to_string()),
                established_year: Some(1794),
                facilities: vec!["Library".to_string()],
            },
            branch: Branch {
                id: "B1".to_string(),
                name: "Computer Science".to_string(),
                code: "CSE".to_string(),
                duration: 4,
            },
            cutoffs: vec![
                CutoffEntry {
                    category: Category::Oc,
                    year: 2022,
                    cutoff_mark: 198.0,
                    opening_rank: None,
                    closing_rank: Some(80),
                },
                CutoffEntry {
                    category: Category::Oc,
                    year: 2023,
                    cutoff_mark: 199.25,
                    opening_rank: Some(1),
                    closing_rank: Some(95),
                },
            ],
            probability: Probability::Medium,
            probability_score: 62.25,
            fees: estimate_fees(CollegeType::Government),
        }
    }

    #[test]
    fn results_csv_uses_latest_cutoff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_results_csv(&path, &[result()]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 16);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(&row[0], "1");
        assert_eq!(&row[2], "Anna University, CEG");
        assert_eq!(&row[4], "government");
        assert_eq!(&row[8], "2023");
        assert_eq!(&row[9], "199.25");
        assert_eq!(&row[10], "95");
        assert_eq!(&row[11], "medium");
        assert_eq!(&row[15], "90000");
    }

    #[test]
    fn results_json_keeps_full_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        write_results_json(&path, &[result()]).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<CollegeWithCutoff> = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, vec![result()]);
        assert!(body.contains("\"type\": \"government\""));
    }
}
