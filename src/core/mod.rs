pub mod exporter;
pub mod file_selector;
