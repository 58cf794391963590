//! Hosted relational backend (PostgREST-style REST API).
//!
//! Each table is read with a single `GET {base}/rest/v1/{table}?select=*`.
//! Rows are deserialized loosely and then validated through the same
//! normalization as CSV rows.

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::data::store::CutoffStore;
use crate::domain::{Branch, BranchRow, College, CollegeRow, CutoffRecord, CutoffRow};
use crate::error::AppError;
use crate::io::ingest::{normalize_rows, StoreRow, TableLoad};

pub const STORE_URL_ENV: &str = "TNEA_STORE_URL";
pub const STORE_KEY_ENV: &str = "TNEA_STORE_KEY";

pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Build from `TNEA_STORE_URL` / `TNEA_STORE_KEY` (a `.env` file is honored).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var(STORE_URL_ENV)
            .map_err(|_| AppError::usage(format!("Missing {STORE_URL_ENV} in environment (.env).")))?;
        let api_key = std::env::var(STORE_KEY_ENV)
            .map_err(|_| AppError::usage(format!("Missing {STORE_KEY_ENV} in environment (.env).")))?;
        Ok(Self::new(base_url, api_key))
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn fetch_table<R>(&self) -> Result<TableLoad<R::Output>, AppError>
    where
        R: StoreRow + DeserializeOwned,
    {
        let table = R::TABLE.as_str();
        let resp = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| AppError::remote(format!("Store request for {table} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::remote(format!(
                "Store request for {table} failed with status {}.",
                resp.status()
            )));
        }

        let rows: Vec<R> = resp
            .json()
            .map_err(|e| AppError::remote(format!("Failed to parse {table} rows from store: {e}")))?;
        debug!(table, rows = rows.len(), "fetched table from store");

        Ok(normalize_rows(rows))
    }
}

impl CutoffStore for RestStore {
    fn describe(&self) -> String {
        format!("rest:{}", self.base_url)
    }

    fn fetch_colleges(&self) -> Result<TableLoad<College>, AppError> {
        self.fetch_table::<CollegeRow>()
    }

    fn fetch_branches(&self) -> Result<TableLoad<Branch>, AppError> {
        self.fetch_table::<BranchRow>()
    }

    fn fetch_cutoffs(&self) -> Result<TableLoad<CutoffRecord>, AppError> {
        self.fetch_table::<CutoffRow>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, CollegeType};

    #[test]
    fn table_url_strips_trailing_slash() {
        let store = RestStore::new("https://example.test/", "key");
        assert_eq!(store.table_url("colleges"), "https://example.test/rest/v1/colleges");
        assert_eq!(store.describe(), "rest:https://example.test");
    }

    #[test]
    fn json_rows_share_csv_validation() {
        let colleges: Vec<CollegeRow> = serde_json::from_str(
            r#"[
                {"id": 7, "name": "GCT", "district": "Coimbatore", "type": "Government",
                 "facilities": ["Library", " ", "Hostel"], "established_year": 1945},
                {"id": "C8", "name": "Nowhere", "district": "Salem", "type": "deemed"}
            ]"#,
        )
        .unwrap();
        let load = normalize_rows(colleges);
        assert_eq!(load.rows.len(), 1);
        assert_eq!(load.rows[0].id, "7");
        assert_eq!(load.rows[0].college_type, CollegeType::Government);
        assert_eq!(load.rows[0].facilities, vec!["Library", "Hostel"]);
        assert_eq!(load.row_errors[0].id.as_deref(), Some("C8"));

        let cutoffs: Vec<CutoffRow> = serde_json::from_str(
            r#"[{"college_id": 7, "branch_id": 1, "category": "SCA", "year": 2024,
                 "cutoff_mark": 161.5, "opening_rank": null, "closing_rank": 40211}]"#,
        )
        .unwrap();
        let load = normalize_rows(cutoffs);
        assert_eq!(load.rows[0].college_id, "7");
        assert_eq!(load.rows[0].category, Category::Sca);
        assert_eq!(load.rows[0].closing_rank, Some(40211));
    }
}
