use std::thread;
use std::time::{Duration, Instant};

use crate::db::VulnerabilityStore;
use crate::sources::nvd::{self, normalize::normalize, Page};
use crate::sources::{PageSource, TransportError};

mod loader;

pub use loader::{load, LoadOutcome};

/// Upper bound of the wait between two attempts at the same page.
pub const MAX_BACKOFF: Duration = Duration::from_secs(5 * 60);

/// How many times a failed page request is tried again before the run aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Wait before the first retry, doubled on each following one up to
    /// [`MAX_BACKOFF`].
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn fail_fast() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.backoff
            .checked_mul(2u32.saturating_pow(attempt))
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fail_fast()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub page_size: u32,
    pub retry: RetryPolicy,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            page_size: nvd::DEFAULT_PAGE_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub pages: u32,
    pub records: u32,
    pub skipped_records: u32,
    pub rows: LoadOutcome,
}

#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("page size must be between 1 and 2000, got {0}")]
    InvalidPageSize(u32),
    #[error("failed fetching page at index {start_index}")]
    Transport {
        start_index: u64,
        #[source]
        source: TransportError,
    },
}

/// Pages through `source` from index zero until it returns an empty page, loading
/// every record into `store`.
///
/// Records that cannot be normalized and rows that cannot be written are logged and
/// skipped. A page that cannot be fetched, once the retry policy is exhausted, aborts
/// the run; everything loaded before it stays in the store.
pub fn run<P, S>(source: &P, store: &S, options: &IngestOptions) -> Result<IngestReport, IngestError>
where
    P: PageSource + ?Sized,
    S: VulnerabilityStore + ?Sized,
{
    // the API rejects pages larger than its default size
    if options.page_size == 0 || options.page_size > nvd::DEFAULT_PAGE_SIZE {
        return Err(IngestError::InvalidPageSize(options.page_size));
    }

    let mut report = IngestReport::default();
    let mut start_index: u64 = 0;

    log::info!(
        "importing {} records in pages of {} ...",
        nvd::SOURCE_NAME,
        options.page_size
    );

    loop {
        let start = Instant::now();
        let page = fetch_with_retry(source, start_index, options)?;

        if page.is_exhausted() {
            log::info!("no records left at index {}", start_index);
            break;
        }

        load_page(store, &page, &mut report);
        report.pages += 1;

        match page.total_results {
            Some(total) => log::info!(
                "processed {}/{} records in {:?}",
                report.records,
                total,
                start.elapsed()
            ),
            None => log::info!(
                "processed {} records in {:?}",
                report.records,
                start.elapsed()
            ),
        }

        start_index += u64::from(options.page_size);
    }

    Ok(report)
}

fn fetch_with_retry<P>(
    source: &P,
    start_index: u64,
    options: &IngestOptions,
) -> Result<Page, IngestError>
where
    P: PageSource + ?Sized,
{
    let mut attempt = 0;

    loop {
        match source.fetch_page(start_index, options.page_size) {
            Ok(page) => return Ok(page),
            Err(e) if attempt < options.retry.max_retries => {
                let delay = options.retry.delay(attempt);
                attempt += 1;
                log::warn!(
                    "fetching page at index {} failed ({}), retry {}/{} in {:?}",
                    start_index,
                    e,
                    attempt,
                    options.retry.max_retries,
                    delay
                );
                thread::sleep(delay);
            }
            Err(e) => {
                log::error!("fetching page at index {} failed: {}", start_index, e);
                return Err(IngestError::Transport {
                    start_index,
                    source: e,
                });
            }
        }
    }
}

fn load_page<S>(store: &S, page: &Page, report: &mut IngestReport)
where
    S: VulnerabilityStore + ?Sized,
{
    for raw in &page.vulnerabilities {
        report.records += 1;

        match normalize(raw) {
            Ok(record) => report.rows.merge(load(store, &record)),
            Err(e) => {
                report.skipped_records += 1;
                log::warn!("skipping record: {}", e);
            }
        }
    }
}
