//! Per-site NPS read from a published spreadsheet.
//!
//! The sheet is published as CSV with at least `site_code` and `nps` columns,
//! one row per site for the current calendar month. NPS is an independent KPI:
//! a failed read logs a warning and never blocks compliance or forecasting.

use anyhow::Result;
use std::collections::HashMap;

/// Fetch the published sheet and return NPS by site code
pub async fn fetch_nps_by_site_code(sheet_url: &str) -> Result<HashMap<String, f64>> {
    if sheet_url.is_empty() {
        anyhow::bail!("NPS sheet URL is not configured");
    }

    let response = reqwest::get(sheet_url).await?;
    if !response.status().is_success() {
        anyhow::bail!("NPS sheet request failed with status {}", response.status());
    }
    let text = response.text().await?;

    parse_nps_csv(&text)
}

fn parse_nps_csv(text: &str) -> Result<HashMap<String, f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            anyhow::bail!("Failed to read CSV headers: {}", e);
        }
    };

    let code_idx = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("site_code"))
        .ok_or_else(|| anyhow::anyhow!("NPS sheet has no site_code column"))?;
    let nps_idx = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("nps"))
        .ok_or_else(|| anyhow::anyhow!("NPS sheet has no nps column"))?;

    let mut scores = HashMap::new();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Skipping malformed NPS row: {}", e);
                continue;
            }
        };

        let code = match record.get(code_idx) {
            Some(c) if !c.trim().is_empty() => c.trim().to_string(),
            _ => continue,
        };
        // Sheets in pt-BR locale export decimal commas.
        let raw = record.get(nps_idx).unwrap_or("").trim().replace(',', ".");
        match raw.parse::<f64>() {
            Ok(value) => {
                scores.insert(code, value);
            }
            Err(_) => {
                tracing::warn!("Skipping NPS row for {}: bad value {:?}", code, raw);
            }
        }
    }

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_sheet() {
        let csv_text = "site_code,nps\nVIB-001,72\nVIB-002,68.5\n";
        let scores = parse_nps_csv(csv_text).unwrap();
        assert_eq!(scores.get("VIB-001"), Some(&72.0));
        assert_eq!(scores.get("VIB-002"), Some(&68.5));
    }

    #[test]
    fn test_parse_decimal_comma_and_extra_columns() {
        let csv_text = "month,site_code,nps,notes\n2025-08,VIB-003,\"70,4\",ok\n";
        let scores = parse_nps_csv(csv_text).unwrap();
        assert_eq!(scores.get("VIB-003"), Some(&70.4));
    }

    #[test]
    fn test_parse_skips_bad_rows() {
        let csv_text = "site_code,nps\nVIB-001,seventy\n,55\nVIB-002,61\n";
        let scores = parse_nps_csv(csv_text).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores.get("VIB-002"), Some(&61.0));
    }

    #[test]
    fn test_missing_columns_is_an_error() {
        assert!(parse_nps_csv("code,score\nA,1\n").is_err());
    }
}
