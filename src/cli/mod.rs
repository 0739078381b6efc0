pub mod db_counts;
pub mod fetch_export;
pub mod import_db;
