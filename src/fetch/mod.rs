// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::path::PathBuf;
use tracing::{error, info};
use url::Url;

use crate::process::RawTable;

/// Open-data resource with the education coverage indicators.
pub const DEFAULT_SOURCE_URL: &str = "https://www.datos.gov.co/resource/nudc-7mev.json";

/// Rows requested per fetch (`$limit`).
pub const DEFAULT_LIMIT: usize = 50_000;

/// Where the raw rows come from.
#[derive(Debug, Clone)]
pub enum Source {
    Api { url: String, limit: usize },
    File(PathBuf),
}

/// Module for fetching raw rows from the open-data API
pub mod api {
    use super::*;

    /// Build the request URL with the `$limit` query parameter.
    pub fn resource_url(base: &str, limit: usize) -> Result<Url> {
        Url::parse_with_params(base, &[("$limit", limit.to_string())])
            .with_context(|| format!("invalid source URL {}", base))
    }

    /// GET the resource and decode its JSON array of row objects.
    pub async fn fetch_raw_table(client: &Client, base: &str, limit: usize) -> Result<RawTable> {
        let url = resource_url(base, limit)?;
        let body = client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {}", url))?
            .error_for_status()?
            .text()
            .await
            .with_context(|| format!("reading body from {}", url))?;
        let table = RawTable::from_json_str(&body)
            .with_context(|| format!("decoding rows from {}", url))?;
        Ok(table)
    }
}

/// Module for reading the same JSON shape from disk
pub mod local {
    use super::*;
    use std::path::Path;

    pub fn load_raw_table(path: impl AsRef<Path>) -> Result<RawTable> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        RawTable::from_json_str(&body).with_context(|| format!("decoding {}", path.display()))
    }
}

/// Load raw rows from `source`. Any I/O or decode failure is logged and
/// degrades to an empty table, which the pipeline treats as "no data".
pub async fn load_or_empty(client: &Client, source: &Source) -> RawTable {
    let loaded = match source {
        Source::Api { url, limit } => api::fetch_raw_table(client, url, *limit).await,
        Source::File(path) => local::load_raw_table(path),
    };
    match loaded {
        Ok(table) => {
            info!(rows = table.len(), columns = table.columns.len(), "raw rows loaded");
            table
        }
        Err(e) => {
            error!("no data available: {:#}", e);
            RawTable::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn resource_url_carries_limit() -> Result<()> {
        let url = api::resource_url(DEFAULT_SOURCE_URL, 10)?;
        assert_eq!(url.query(), Some("%24limit=10"));
        assert!(url.as_str().starts_with(DEFAULT_SOURCE_URL));
        Ok(())
    }

    #[test]
    fn loads_rows_from_file() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(
            tmp,
            r#"[{{"a_o": "2020", "departamento": "Huila", "municipio": "Neiva"}}]"#
        )?;
        let table = local::load_raw_table(tmp.path())?;
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].municipality.as_deref(), Some("Neiva"));
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_source_degrades_to_empty() {
        let client = Client::new();
        let source = Source::File(PathBuf::from("/nonexistent/raw.json"));
        let table = load_or_empty(&client, &source).await;
        assert!(table.is_empty());
        assert_eq!(table.missing_columns().len(), 8);
    }
}
