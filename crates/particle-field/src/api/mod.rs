pub mod config;
pub mod field;
pub mod host;
pub mod types;
