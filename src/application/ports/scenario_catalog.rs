use crate::domain::{AirportProfile, Scenario};

/// Read-only scenario templates, loaded once at startup.
pub trait ScenarioCatalog: Send + Sync {
    fn scenario(&self, id: &str) -> Option<&Scenario>;

    fn default_scenario_id(&self) -> &str;

    fn airport(&self) -> &AirportProfile;
}
