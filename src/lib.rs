//! FreeToGame catalog ETL: per-genre CSV export and CSV -> Product upsert.

pub mod cli;
pub mod database_ops;
pub mod error;
pub mod models;
pub mod normalization;
pub mod tracing;

pub mod util {
    pub mod db;
    pub mod env;
}
