use chrono::NaiveDate;
use diesel::prelude::*;

use super::schema::{configurations, cve_description, cve_information, cvss_data, cvss_v2_metrics};

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = cve_information)]
pub struct NewCveInformation {
    pub cve_id: i64,
    pub cve_name: String,
    pub identifier: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub last_modified_date: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = cve_description)]
pub struct NewDescription {
    pub cve_id: i64,
    pub description: Option<String>,
}

/// Severity figures of the CVSS v2 metric block.
#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = cvss_v2_metrics)]
pub struct NewSeverityMetric {
    pub cve_id: i64,
    pub severity: Option<String>,
    pub score: Option<f64>,
    pub vector_string: Option<String>,
    pub exploitability_score: Option<f64>,
    pub impact_score: Option<f64>,
}

impl NewSeverityMetric {
    pub fn is_empty(&self) -> bool {
        self.severity.is_none()
            && self.score.is_none()
            && self.vector_string.is_none()
            && self.exploitability_score.is_none()
            && self.impact_score.is_none()
    }
}

/// Access and impact vector of the CVSS v2 metric block.
#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = cvss_data)]
pub struct NewImpactVector {
    pub cve_id: i64,
    pub access_vector: Option<String>,
    pub access_complexity: Option<String>,
    pub authentication: Option<String>,
    pub confidentiality_impact: Option<String>,
    pub integrity_impact: Option<String>,
    pub availability_impact: Option<String>,
}

#[derive(Insertable, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[diesel(table_name = configurations)]
pub struct NewConfiguration {
    pub cve_id: i64,
    pub vulnerable: Option<bool>,
    pub criteria: Option<String>,
    pub match_criteria_id: Option<String>,
}
