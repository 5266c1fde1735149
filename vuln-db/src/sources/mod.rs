use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

pub mod nvd;

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("could not create http client")]
    Client(#[source] reqwest::Error),
    #[error("error requesting {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode the page returned by {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A remote collection of records served in fixed-size pages.
pub trait PageSource {
    fn fetch_page(
        &self,
        start_index: u64,
        results_per_page: u32,
    ) -> Result<nvd::Page, TransportError>;
}

// Field-level deserializers for loosely structured upstream records: a field that
// is missing or has an unexpected shape becomes `None` instead of failing the
// whole record.

pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Sequence counterpart of [`lenient`], applied per element: an entry with the
/// wrong shape keeps its position as `T::default()` so that "first entry" and
/// "one row per entry" still hold. A value that is not an array is `None`.
pub(crate) fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        _ => return Ok(None),
    };

    Ok(Some(
        entries
            .into_iter()
            .map(|entry| T::deserialize(entry).unwrap_or_default())
            .collect(),
    ))
}

/// Accepts JSON numbers and numeric strings, anything else (including NaN and
/// infinities) is `None`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}
