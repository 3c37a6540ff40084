//! Hugging Face datasets-server `/rows` client.
//!
//! Rows are fetched a page at a time as the exporter drains them, so at most
//! one page is held in memory. A page request looks like
//!
//! ```text
//! GET {endpoint}/rows?dataset=Salesforce/wikitext&config=wikitext-103-v1&split=train&offset=0&length=100
//! ```
//!
//! and answers `{"rows": [{"row_idx": 0, "row": {"text": "..."}, "truncated_cells": []}], "num_rows_total": N}`.

use crate::core::{ConfigProvider, Record, RecordSource};
use crate::utils::error::{ExportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use url::Url;

/// Largest `length` the server accepts for one `/rows` call.
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_ENDPOINT: &str = "https://datasets-server.huggingface.co";

#[derive(Debug, Deserialize)]
struct RowsResponse {
    #[serde(default)]
    rows: Vec<RowEntry>,
    num_rows_total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row: HashMap<String, serde_json::Value>,
    #[serde(default)]
    truncated_cells: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct DatasetRef {
    pub dataset: String,
    pub config: String,
    pub split: String,
}

impl std::fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}/{}]", self.dataset, self.config, self.split)
    }
}

pub struct DatasetsServerSource {
    client: Client,
    rows_url: Url,
    dataset: DatasetRef,
    page_size: usize,
    max_records: Option<u64>,
    token: Option<String>,
    buffer: VecDeque<Record>,
    next_offset: u64,
    total: Option<u64>,
    exhausted: bool,
}

impl DatasetsServerSource {
    pub fn new(endpoint: &str, dataset: DatasetRef, timeout: Duration) -> Result<Self> {
        let rows_url = format!("{}/rows", endpoint.trim_end_matches('/'));
        let rows_url = Url::parse(&rows_url).map_err(|e| ExportError::InvalidConfigValueError {
            field: "endpoint".to_string(),
            value: endpoint.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wikitext-export/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            rows_url,
            dataset,
            page_size: MAX_PAGE_SIZE,
            max_records: None,
            token: None,
            buffer: VecDeque::new(),
            next_offset: 0,
            total: None,
            exhausted: false,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let dataset = DatasetRef {
            dataset: config.dataset().to_string(),
            config: config.config_name().to_string(),
            split: config.split().to_string(),
        };
        let source = Self::new(
            config.endpoint(),
            dataset,
            Duration::from_secs(config.timeout_seconds()),
        )?
        .with_page_size(config.page_size())
        .with_max_records(config.max_records());

        Ok(match config.hf_token() {
            Some(token) => source.with_token(token),
            None => source,
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_max_records(mut self, max_records: Option<u64>) -> Self {
        self.max_records = max_records;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn remaining_budget(&self) -> Option<u64> {
        self.max_records
            .map(|max| max.saturating_sub(self.next_offset))
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let mut length = self.page_size as u64;
        if let Some(remaining) = self.remaining_budget() {
            length = length.min(remaining);
        }
        if let Some(total) = self.total {
            length = length.min(total.saturating_sub(self.next_offset));
        }
        if length == 0 {
            self.exhausted = true;
            return Ok(());
        }

        tracing::debug!(
            "Fetching rows {}..{} of {}",
            self.next_offset,
            self.next_offset + length,
            self.dataset
        );

        let offset = self.next_offset.to_string();
        let length = length.to_string();
        let mut request = self.client.get(self.rows_url.clone()).query(&[
            ("dataset", self.dataset.dataset.as_str()),
            ("config", self.dataset.config.as_str()),
            ("split", self.dataset.split.as_str()),
            ("offset", offset.as_str()),
            ("length", length.as_str()),
        ]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(ExportError::acquisition(format!(
                "{} returned {} at offset {}: {}",
                self.dataset, status, self.next_offset, detail
            )));
        }

        let page: RowsResponse = serde_json::from_str(&body).map_err(|e| {
            ExportError::acquisition(format!(
                "{} sent an unreadable page at offset {}: {}",
                self.dataset, self.next_offset, e
            ))
        })?;
        if self.total.is_none() {
            if let Some(total) = page.num_rows_total {
                tracing::info!("{} has {} rows", self.dataset, total);
            }
        }
        self.total = page.num_rows_total.or(self.total);

        if page.rows.is_empty() {
            self.exhausted = true;
            return Ok(());
        }

        for entry in page.rows {
            if self.remaining_budget() == Some(0) {
                break;
            }
            if !entry.truncated_cells.is_empty() {
                tracing::warn!(
                    "Row {} has truncated cells: {}",
                    self.next_offset,
                    entry.truncated_cells.join(", ")
                );
            }
            self.buffer.push_back(Record::new(self.next_offset, entry.row));
            self.next_offset += 1;
        }

        if self.total.is_some_and(|total| self.next_offset >= total)
            || self.remaining_budget() == Some(0)
        {
            self.exhausted = true;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordSource for DatasetsServerSource {
    async fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Ok(Some(record));
            }
            if self.exhausted {
                return Ok(None);
            }
            self.fetch_page().await?;
        }
    }

    fn size_hint(&self) -> Option<u64> {
        match (self.total, self.max_records) {
            (Some(total), Some(max)) => Some(total.min(max)),
            (total, None) => total,
            (None, Some(_)) => None,
        }
    }
}
