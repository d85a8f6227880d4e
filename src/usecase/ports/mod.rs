pub mod exporter;
pub mod store;
