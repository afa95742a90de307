mod file_scenario_catalog;

pub use file_scenario_catalog::{CatalogError, FileScenarioCatalog};
