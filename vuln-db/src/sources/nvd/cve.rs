//! Wire types of a CVE record as served by the NVD CVE API 2.0.
//!
//! Every field is optional and mistyped values collapse to `None`, so a record
//! only fails to deserialize when it is not a JSON object at all. Malformed
//! entries of a list become all-`None` entries in place.

use serde::Deserialize;

use crate::sources::{lenient, lenient_f64, lenient_seq};

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct Vulnerability {
    #[serde(deserialize_with = "lenient")]
    pub cve: Option<CVE>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default, rename_all = "camelCase")]
#[allow(clippy::upper_case_acronyms)]
pub struct CVE {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub source_identifier: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub published: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub last_modified: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub vuln_status: Option<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub descriptions: Option<Vec<LangString>>,
    #[serde(deserialize_with = "lenient")]
    pub metrics: Option<Metrics>,
    #[serde(deserialize_with = "lenient_seq")]
    pub configurations: Option<Vec<Configuration>>,
}

impl CVE {
    pub fn first_description(&self) -> Option<&str> {
        self.descriptions
            .as_deref()
            .and_then(<[_]>::first)
            .and_then(|desc| desc.value.as_deref())
    }

    pub fn first_metric_v2(&self) -> Option<&CvssMetricV2> {
        self.metrics
            .as_ref()
            .and_then(|metrics| metrics.cvss_metric_v2.as_deref())
            .and_then(<[_]>::first)
    }

    /// Match entries of the first node of the first configuration; any other
    /// node is not read.
    pub fn first_node_matches(&self) -> &[CpeMatch] {
        self.configurations
            .as_deref()
            .and_then(<[_]>::first)
            .and_then(|conf| conf.nodes.as_deref())
            .and_then(<[_]>::first)
            .and_then(|node| node.cpe_match.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct LangString {
    #[serde(deserialize_with = "lenient")]
    pub lang: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub value: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct Metrics {
    #[serde(deserialize_with = "lenient_seq")]
    pub cvss_metric_v2: Option<Vec<CvssMetricV2>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct CvssMetricV2 {
    #[serde(deserialize_with = "lenient")]
    pub source: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub cvss_data: Option<CvssDataV2>,
    #[serde(deserialize_with = "lenient")]
    pub base_severity: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub exploitability_score: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub impact_score: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct CvssDataV2 {
    #[serde(deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub vector_string: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub access_vector: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub access_complexity: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub authentication: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub confidentiality_impact: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub integrity_impact: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub availability_impact: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub base_score: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct Configuration {
    #[serde(deserialize_with = "lenient_seq")]
    pub nodes: Option<Vec<Node>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct Node {
    #[serde(deserialize_with = "lenient")]
    pub operator: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub negate: Option<bool>,
    #[serde(deserialize_with = "lenient_seq")]
    pub cpe_match: Option<Vec<CpeMatch>>,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CpeMatch {
    #[serde(deserialize_with = "lenient")]
    pub vulnerable: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub criteria: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub match_criteria_id: Option<String>,
}
