use crate::db::{StoreError, Table, VulnerabilityStore};
use crate::sources::nvd::normalize::NormalizedRecord;

/// Row counts of loading one or more records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    pub inserted: u32,
    pub existing: u32,
    pub failed: u32,
}

impl LoadOutcome {
    fn record(&mut self, table: Table, key: i64, result: Result<bool, StoreError>) {
        match result {
            Ok(true) => self.inserted += 1,
            Ok(false) => self.existing += 1,
            Err(e) => {
                self.failed += 1;
                log::error!("could not write {} row for cve {}: {}", table, key, error_chain(&e));
            }
        }
    }

    pub fn merge(&mut self, other: LoadOutcome) {
        self.inserted += other.inserted;
        self.existing += other.existing;
        self.failed += other.failed;
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Writes every row of `record`, each insert independent of the others: a failed
/// write is logged and counted, and the remaining rows are still attempted.
pub fn load<S>(store: &S, record: &NormalizedRecord) -> LoadOutcome
where
    S: VulnerabilityStore + ?Sized,
{
    let key = record.key;
    let mut outcome = LoadOutcome::default();

    outcome.record(
        Table::Information,
        key,
        store.insert_information(&record.information),
    );
    outcome.record(
        Table::Description,
        key,
        store.insert_description(&record.description),
    );
    outcome.record(
        Table::SeverityMetric,
        key,
        store.insert_severity(&record.severity),
    );
    outcome.record(Table::ImpactVector, key, store.insert_impact(&record.impact));

    for configuration in &record.configurations {
        outcome.record(
            Table::Configuration,
            key,
            store.insert_configuration(configuration),
        );
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::sources::nvd::normalize::normalize;
    use serde_json::json;

    fn sample_record() -> NormalizedRecord {
        normalize(&json!({
            "cve": {
                "id": "CVE-2021-44228",
                "sourceIdentifier": "security@apache.org",
                "published": "2021-12-10T10:15:09.143",
                "lastModified": "2023-11-07T03:39:36.747",
                "vulnStatus": "Analyzed",
                "descriptions": [{"lang": "en", "value": "Apache Log4j2 JNDI features do not protect against attacker controlled LDAP."}],
                "metrics": {
                    "cvssMetricV2": [{
                        "cvssData": {
                            "vectorString": "AV:N/AC:M/Au:N/C:C/I:C/A:C",
                            "accessVector": "NETWORK",
                            "accessComplexity": "MEDIUM",
                            "authentication": "NONE",
                            "confidentialityImpact": "COMPLETE",
                            "integrityImpact": "COMPLETE",
                            "availabilityImpact": "COMPLETE",
                            "baseScore": 9.3
                        },
                        "baseSeverity": "HIGH",
                        "exploitabilityScore": 8.6,
                        "impactScore": 10.0
                    }]
                },
                "configurations": [{"nodes": [{"operator": "OR", "cpeMatch": [
                    {"vulnerable": true, "criteria": "cpe:2.3:a:apache:log4j:*:*:*:*:*:*:*:*", "matchCriteriaId": "03FA5E81-F9C0-403E-8A4B-E4284E4E7B72"},
                    {"vulnerable": true, "criteria": "cpe:2.3:a:apache:log4j:2.0:-:*:*:*:*:*:*", "matchCriteriaId": "17854E42-7063-4A55-BF2A-4C7074CC2D60"}
                ]}]}]
            }
        }))
        .unwrap()
    }

    #[test]
    fn loads_every_table() {
        let store = MemoryStore::default();
        let record = sample_record();

        let outcome = load(&store, &record);

        assert_eq!(
            outcome,
            LoadOutcome {
                inserted: 6,
                existing: 0,
                failed: 0
            }
        );

        let tables = store.snapshot();
        assert_eq!(tables.information[&202144228], record.information);
        assert_eq!(tables.descriptions[&202144228], record.description);
        assert_eq!(tables.severities[&202144228], record.severity);
        assert_eq!(tables.impacts[&202144228], record.impact);
        assert_eq!(tables.configurations.len(), 2);
    }

    #[test]
    fn second_load_is_a_no_op() {
        let store = MemoryStore::default();
        let record = sample_record();

        load(&store, &record);
        let before = store.snapshot();
        let outcome = load(&store, &record);

        assert_eq!(
            outcome,
            LoadOutcome {
                inserted: 0,
                existing: 6,
                failed: 0
            }
        );
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn failing_table_does_not_block_siblings() {
        let store = MemoryStore::failing_on(Table::SeverityMetric);
        let record = sample_record();

        let outcome = load(&store, &record);

        assert_eq!(
            outcome,
            LoadOutcome {
                inserted: 5,
                existing: 0,
                failed: 1
            }
        );

        let tables = store.snapshot();
        assert!(tables.severities.is_empty());
        assert!(tables.information.contains_key(&202144228));
        assert!(tables.impacts.contains_key(&202144228));
        assert_eq!(tables.configurations.len(), 2);
    }

    #[test]
    fn failing_core_table_still_writes_the_rest() {
        let store = MemoryStore::failing_on(Table::Information);

        let outcome = load(&store, &sample_record());

        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.inserted, 5);
        assert!(store.snapshot().information.is_empty());
    }

    #[test]
    fn record_without_optional_data_still_gets_its_core_row() {
        let store = MemoryStore::default();
        let record = normalize(&json!({"cve": {"id": "CVE-2024-5000", "descriptions": []}})).unwrap();

        let outcome = load(&store, &record);

        // information, description, severity, impact; no configurations
        assert_eq!(outcome.inserted, 4);
        let tables = store.snapshot();
        assert_eq!(tables.information[&20245000].cve_name, "CVE-2024-5000");
        assert_eq!(tables.descriptions[&20245000].description, None);
        assert!(tables.configurations.is_empty());
    }

    #[test]
    fn merge_adds_counters() {
        let mut total = LoadOutcome {
            inserted: 3,
            existing: 1,
            failed: 0,
        };
        total.merge(LoadOutcome {
            inserted: 2,
            existing: 0,
            failed: 4,
        });

        assert_eq!(
            total,
            LoadOutcome {
                inserted: 5,
                existing: 1,
                failed: 4
            }
        );
    }
}
