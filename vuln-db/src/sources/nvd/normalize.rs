use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::cve::{Vulnerability, CVE};
use crate::db::models::{
    NewConfiguration, NewCveInformation, NewDescription, NewImpactVector, NewSeverityMetric,
};

lazy_static! {
    static ref DIGIT_RUN: Regex = Regex::new(r"\d+").unwrap();
}

#[derive(thiserror::Error, Debug)]
pub enum NormalizeError {
    #[error("identifier {0:?} has no numeric key")]
    MalformedIdentifier(String),
    #[error("record is not a CVE object")]
    Shape(#[source] serde_json::Error),
}

/// One upstream record split into the rows of each target table.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub key: i64,
    pub information: NewCveInformation,
    pub description: NewDescription,
    pub severity: NewSeverityMetric,
    pub impact: NewImpactVector,
    pub configurations: Vec<NewConfiguration>,
}

/// Concatenates all digit runs of `id` in order, `"CVE-2024-1234"` gives `20241234`.
pub fn numeric_key(id: &str) -> Result<i64, NormalizeError> {
    let digits: String = DIGIT_RUN.find_iter(id).map(|m| m.as_str()).collect();

    digits
        .parse::<i64>()
        .map_err(|_| NormalizeError::MalformedIdentifier(id.to_string()))
}

/// Date portion of an ISO-8601 timestamp, `None` when absent or unparsable.
pub fn date_part(timestamp: Option<&str>) -> Option<NaiveDate> {
    let date = timestamp?.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

pub fn normalize(raw: &Value) -> Result<NormalizedRecord, NormalizeError> {
    let vulnerability = Vulnerability::deserialize(raw).map_err(NormalizeError::Shape)?;
    let cve = vulnerability.cve.unwrap_or_default();

    let id = cve.id.clone().unwrap_or_default();
    let key = numeric_key(&id)?;

    let record = NormalizedRecord {
        key,
        information: NewCveInformation {
            cve_id: key,
            cve_name: id,
            identifier: cve.source_identifier.clone(),
            published_date: date_part(cve.published.as_deref()),
            last_modified_date: date_part(cve.last_modified.as_deref()),
            status: cve.vuln_status.clone(),
        },
        description: NewDescription {
            cve_id: key,
            description: cve.first_description().map(str::to_string),
        },
        severity: severity_metric(key, &cve),
        impact: impact_vector(key, &cve),
        configurations: configurations(key, &cve),
    };

    if record.severity.is_empty() {
        log::debug!("{} has no CVSS v2 metric", record.information.cve_name);
    }

    Ok(record)
}

fn severity_metric(key: i64, cve: &CVE) -> NewSeverityMetric {
    let metric = cve.first_metric_v2();
    let data = metric.and_then(|m| m.cvss_data.as_ref());

    NewSeverityMetric {
        cve_id: key,
        severity: metric.and_then(|m| m.base_severity.clone()),
        score: data.and_then(|d| d.base_score),
        vector_string: data.and_then(|d| d.vector_string.clone()),
        exploitability_score: metric.and_then(|m| m.exploitability_score),
        impact_score: metric.and_then(|m| m.impact_score),
    }
}

fn impact_vector(key: i64, cve: &CVE) -> NewImpactVector {
    let data = cve.first_metric_v2().and_then(|m| m.cvss_data.as_ref());

    NewImpactVector {
        cve_id: key,
        access_vector: data.and_then(|d| d.access_vector.clone()),
        access_complexity: data.and_then(|d| d.access_complexity.clone()),
        authentication: data.and_then(|d| d.authentication.clone()),
        confidentiality_impact: data.and_then(|d| d.confidentiality_impact.clone()),
        integrity_impact: data.and_then(|d| d.integrity_impact.clone()),
        availability_impact: data.and_then(|d| d.availability_impact.clone()),
    }
}

fn configurations(key: i64, cve: &CVE) -> Vec<NewConfiguration> {
    cve.first_node_matches()
        .iter()
        .map(|m| NewConfiguration {
            cve_id: key,
            vulnerable: m.vulnerable,
            criteria: m.criteria.clone(),
            match_criteria_id: m.match_criteria_id.clone(),
        })
        .collect()
}
