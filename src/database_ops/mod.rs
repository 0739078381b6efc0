pub mod csv_export;
pub mod csv_import;
pub mod export_pipeline;
pub mod freetogame;
pub mod genre_index;
pub mod products;
