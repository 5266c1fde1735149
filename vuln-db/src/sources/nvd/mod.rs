use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use super::{PageSource, TransportError};

pub mod cve;
pub mod normalize;

pub const SOURCE_NAME: &str = "NVD";
pub const API_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";
pub const DEFAULT_PAGE_SIZE: u32 = 2000;

/// One page of the CVE API response. Records are kept raw so that a malformed
/// one can be skipped without losing the rest of the page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub results_per_page: u32,
    pub start_index: Option<u64>,
    pub total_results: Option<u64>,
    #[serde(default)]
    pub vulnerabilities: Vec<Value>,
}

impl Page {
    /// The API signals the end of the collection with an empty page.
    pub fn is_exhausted(&self) -> bool {
        self.results_per_page == 0
    }
}

pub struct NvdClient {
    client: reqwest::blocking::Client,
    api_url: String,
    api_key: Option<String>,
}

impl NvdClient {
    pub fn new(
        api_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Some(timeout))
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key,
        })
    }
}

impl PageSource for NvdClient {
    fn fetch_page(&self, start_index: u64, results_per_page: u32) -> Result<Page, TransportError> {
        log::debug!(
            "requesting {} records from {} at {} ...",
            results_per_page,
            self.api_url,
            start_index
        );

        let mut request = self.client.get(&self.api_url).query(&[
            ("resultsPerPage", u64::from(results_per_page)),
            ("startIndex", start_index),
        ]);
        if let Some(key) = &self.api_key {
            request = request.header("apiKey", key);
        }

        let response = request.send().map_err(|source| TransportError::Request {
            url: self.api_url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: response.url().to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Page>().map_err(|source| TransportError::Decode {
            url: self.api_url.clone(),
            source,
        })
    }
}
