pub mod download;
pub mod encoding;
pub mod error;
pub mod export_as_engine;
pub mod exporter;
mod table;
