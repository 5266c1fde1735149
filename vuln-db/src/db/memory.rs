use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::models::{
    NewConfiguration, NewCveInformation, NewDescription, NewImpactVector, NewSeverityMetric,
};
use super::{StoreError, Table, VulnerabilityStore};

/// In-memory stand-in for the PostgreSQL tables, with the same
/// insert-if-absent semantics.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tables {
    pub information: BTreeMap<i64, NewCveInformation>,
    pub descriptions: BTreeMap<i64, NewDescription>,
    pub severities: BTreeMap<i64, NewSeverityMetric>,
    pub impacts: BTreeMap<i64, NewImpactVector>,
    pub configurations: BTreeSet<NewConfiguration>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RefCell<Tables>,
    failing: HashSet<Table>,
}

impl MemoryStore {
    /// Every write to `table` fails as if the database rejected it.
    pub fn failing_on(table: Table) -> Self {
        Self {
            failing: HashSet::from([table]),
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> Tables {
        self.tables.borrow().clone()
    }

    fn check(&self, table: Table) -> Result<(), StoreError> {
        if self.failing.contains(&table) {
            return Err(StoreError::Query {
                table,
                source: diesel::result::Error::QueryBuilderError("rejected by test store".into()),
            });
        }
        Ok(())
    }
}

fn insert_keyed<T: Clone>(map: &mut BTreeMap<i64, T>, key: i64, values: &T) -> bool {
    if map.contains_key(&key) {
        return false;
    }
    map.insert(key, values.clone());
    true
}

impl VulnerabilityStore for MemoryStore {
    fn insert_information(&self, values: &NewCveInformation) -> Result<bool, StoreError> {
        self.check(Table::Information)?;
        let mut tables = self.tables.borrow_mut();
        Ok(insert_keyed(&mut tables.information, values.cve_id, values))
    }

    fn insert_description(&self, values: &NewDescription) -> Result<bool, StoreError> {
        self.check(Table::Description)?;
        let mut tables = self.tables.borrow_mut();
        Ok(insert_keyed(&mut tables.descriptions, values.cve_id, values))
    }

    fn insert_severity(&self, values: &NewSeverityMetric) -> Result<bool, StoreError> {
        self.check(Table::SeverityMetric)?;
        let mut tables = self.tables.borrow_mut();
        Ok(insert_keyed(&mut tables.severities, values.cve_id, values))
    }

    fn insert_impact(&self, values: &NewImpactVector) -> Result<bool, StoreError> {
        self.check(Table::ImpactVector)?;
        let mut tables = self.tables.borrow_mut();
        Ok(insert_keyed(&mut tables.impacts, values.cve_id, values))
    }

    fn insert_configuration(&self, values: &NewConfiguration) -> Result<bool, StoreError> {
        self.check(Table::Configuration)?;
        Ok(self.tables.borrow_mut().configurations.insert(values.clone()))
    }
}
