//! Thin client for the spreadsheet values API: range get, append and
//! update-by-range, authenticated with a per-call bearer token.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::errors::SheetsError;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ValueRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    major_dimension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<Vec<Vec<serde_json::Value>>>,
}

/// Cells come back as whatever JSON type the backend felt like; everything
/// downstream works on strings
fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(b) => if b { "TRUE" } else { "FALSE" }.to_string(),
        other => other.to_string(),
    }
}

/// 0-based column index to A1 letters: 0 -> A, 25 -> Z, 26 -> AA
pub fn column_letter(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ascii letters")
}

/// Sheet row number for the nth data row: row 1 is the header
pub fn sheet_row_number(data_index: usize) -> usize {
    data_index + 2
}

#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
}

impl SheetsClient {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into() }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SheetsError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Backend { status: status.as_u16(), body });
        }
        Ok(response)
    }

    /// Full contents of a tab, header row included
    pub async fn get_rows(
        &self,
        token: &str,
        document_id: &str,
        tab: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = format!("{}/{document_id}/values/{tab}", self.base_url);
        let response = self.http.get(url).bearer_auth(token).send().await?;
        let range: ValueRange = Self::check(response).await?.json().await?;

        Ok(range
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Insert a new row after the existing data. Never overwrites
    pub async fn append_row(
        &self,
        token: &str,
        document_id: &str,
        tab: &str,
        row: Vec<String>,
    ) -> Result<(), SheetsError> {
        let url = format!("{}/{document_id}/values/{tab}:append", self.base_url);
        let body = ValueRange {
            range: None,
            major_dimension: Some("ROWS".to_string()),
            values: Some(vec![row.into_iter().map(serde_json::Value::String).collect()]),
        };
        let response = self
            .http
            .post(url)
            .query(&[("valueInputOption", "USER_ENTERED"), ("insertDataOption", "INSERT_ROWS")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Overwrite exactly one row's range. The caller resolves the row
    /// number by scanning an identifier column first; concurrent writers to
    /// the same row race, last write wins
    pub async fn update_row(
        &self,
        token: &str,
        document_id: &str,
        tab: &str,
        row_number: usize,
        row: Vec<String>,
    ) -> Result<(), SheetsError> {
        let last_column = column_letter(row.len().max(1) - 1);
        let range = format!("{tab}!A{row_number}:{last_column}{row_number}");
        let url = format!("{}/{document_id}/values/{range}", self.base_url);
        let body = ValueRange {
            range: Some(range),
            major_dimension: Some("ROWS".to_string()),
            values: Some(vec![row.into_iter().map(serde_json::Value::String).collect()]),
        };
        let response = self
            .http
            .put(url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(13), "N");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
    }

    #[test]
    fn header_offset() {
        assert_eq!(sheet_row_number(0), 2);
        assert_eq!(sheet_row_number(10), 12);
    }

    #[test]
    fn cells_coerce_to_strings() {
        use serde_json::json;
        assert_eq!(cell_to_string(json!("abc")), "abc");
        assert_eq!(cell_to_string(json!(102.5)), "102.5");
        assert_eq!(cell_to_string(json!(true)), "TRUE");
        assert_eq!(cell_to_string(json!(null)), "");
    }
}
