use std::fmt;

use diesel::insert_into;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};

#[cfg(test)]
pub(crate) mod memory;
pub mod models;
pub mod schema;

pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Target tables of the loader, named as in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Information,
    Description,
    SeverityMetric,
    ImpactVector,
    Configuration,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Information => "cve_information",
            Self::Description => "cve_description",
            Self::SeverityMetric => "cvss_v2_metrics",
            Self::ImpactVector => "cvss_data",
            Self::Configuration => "configurations",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug)]
#[error("Database error.")]
pub struct DatabaseError {
    #[from]
    source: r2d2::PoolError,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("could not get a database connection")]
    Pool(#[from] r2d2::PoolError),
    #[error("error inserting into {table}")]
    Query {
        table: Table,
        #[source]
        source: diesel::result::Error,
    },
}

/// Insert-if-absent write path for the normalized vulnerability tables.
///
/// Every method returns `Ok(true)` when a row was written and `Ok(false)` when an
/// identical key (or, for configurations, an identical row) was already stored.
pub trait VulnerabilityStore {
    fn insert_information(&self, values: &models::NewCveInformation) -> Result<bool, StoreError>;

    fn insert_description(&self, values: &models::NewDescription) -> Result<bool, StoreError>;

    fn insert_severity(&self, values: &models::NewSeverityMetric) -> Result<bool, StoreError>;

    fn insert_impact(&self, values: &models::NewImpactVector) -> Result<bool, StoreError>;

    fn insert_configuration(&self, values: &models::NewConfiguration) -> Result<bool, StoreError>;
}

pub struct PostgresRepository {
    pool: Pool,
}

impl PostgresRepository {
    /// Opens the single connection shared by the whole run.
    pub fn new(database_url: &str) -> Result<Self, DatabaseError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder().max_size(1).build(manager)?;
        Ok(Self { pool })
    }
}

/// `INSERT ... ON CONFLICT DO NOTHING` of one row into `$table`.
macro_rules! insert_if_absent {
    ($table:path, $values:expr) => {
        insert_into($table).values($values).on_conflict_do_nothing()
    };
}

fn inserted(table: Table, result: QueryResult<usize>) -> Result<bool, StoreError> {
    result
        .map(|rows| rows > 0)
        .map_err(|source| StoreError::Query { table, source })
}

impl VulnerabilityStore for PostgresRepository {
    fn insert_information(&self, values: &models::NewCveInformation) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;

        let result = insert_if_absent!(schema::cve_information::table, values).execute(&mut conn);

        inserted(Table::Information, result)
    }

    fn insert_description(&self, values: &models::NewDescription) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;

        let result = insert_if_absent!(schema::cve_description::table, values).execute(&mut conn);

        inserted(Table::Description, result)
    }

    fn insert_severity(&self, values: &models::NewSeverityMetric) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;

        let result = insert_if_absent!(schema::cvss_v2_metrics::table, values).execute(&mut conn);

        inserted(Table::SeverityMetric, result)
    }

    fn insert_impact(&self, values: &models::NewImpactVector) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;

        let result = insert_if_absent!(schema::cvss_data::table, values).execute(&mut conn);

        inserted(Table::ImpactVector, result)
    }

    fn insert_configuration(&self, values: &models::NewConfiguration) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;

        // relies on the unique (cve_id, vulnerable, criteria, match_criteria_id) constraint
        let result = insert_if_absent!(schema::configurations::table, values).execute(&mut conn);

        inserted(Table::Configuration, result)
    }
}
