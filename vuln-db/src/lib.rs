pub mod db;
pub mod ingest;
pub mod sources;
