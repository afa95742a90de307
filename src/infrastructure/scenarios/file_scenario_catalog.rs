use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::application::ports::ScenarioCatalog;
use crate::domain::{AirportProfile, Scenario};
use crate::presentation::config::ScenarioSettings;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Scenario templates and the airport profile, read from disk once.
#[derive(Debug, Clone)]
pub struct FileScenarioCatalog {
    scenarios: BTreeMap<String, Scenario>,
    default_scenario_id: String,
    airport: AirportProfile,
}

impl FileScenarioCatalog {
    pub fn new(
        scenarios: BTreeMap<String, Scenario>,
        default_scenario_id: impl Into<String>,
        airport: AirportProfile,
    ) -> Self {
        Self {
            scenarios,
            default_scenario_id: default_scenario_id.into(),
            airport,
        }
    }

    pub fn load(settings: &ScenarioSettings) -> Result<Self, CatalogError> {
        let scenarios = load_scenarios(Path::new(&settings.directory))?;
        let airport = load_airport(
            Path::new(&settings.airports_directory),
            &settings.default_airport,
        );

        if !scenarios.contains_key(&settings.default_scenario_id) {
            tracing::warn!(
                default_scenario_id = %settings.default_scenario_id,
                "Default scenario not found in catalog"
            );
        }

        tracing::info!(
            scenarios = scenarios.len(),
            airport = %airport.icao,
            "Scenario catalog loaded"
        );

        Ok(Self::new(
            scenarios,
            settings.default_scenario_id.clone(),
            airport,
        ))
    }
}

impl ScenarioCatalog for FileScenarioCatalog {
    fn scenario(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.get(id)
    }

    fn default_scenario_id(&self) -> &str {
        &self.default_scenario_id
    }

    fn airport(&self) -> &AirportProfile {
        &self.airport
    }
}

/// Reads every `*.json` in `directory`. A file is keyed by its `id` field,
/// or its stem when the id is missing. Unparsable files are skipped.
fn load_scenarios(directory: &Path) -> Result<BTreeMap<String, Scenario>, CatalogError> {
    let mut scenarios = BTreeMap::new();

    if !directory.exists() {
        tracing::warn!(directory = %directory.display(), "Scenario directory does not exist");
        return Ok(scenarios);
    }

    let entries = std::fs::read_dir(directory).map_err(|source| CatalogError::Io {
        path: directory.display().to_string(),
        source,
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match read_json::<Scenario>(&path) {
            Ok(mut scenario) => {
                let id = scenario
                    .id
                    .clone()
                    .filter(|id| !id.trim().is_empty())
                    .unwrap_or_else(|| stem.to_string());
                scenario.id = Some(id.clone());
                tracing::debug!(scenario_id = %id, phases = scenario.phases.len(), "Scenario loaded");
                scenarios.insert(id, scenario);
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "Skipping invalid scenario file");
            }
        }
    }

    Ok(scenarios)
}

/// `{directory}/{code}.json` (lowercase code). Missing or invalid files
/// fall back to a bare profile for `code`.
fn load_airport(directory: &Path, code: &str) -> AirportProfile {
    let path = directory.join(format!("{}.json", code.to_lowercase()));
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Airport profile not found, using defaults");
        return AirportProfile::new(code.to_uppercase());
    }

    let parsed = read_json::<Value>(&path).and_then(|mut value| {
        if let Value::Object(map) = &mut value {
            map.entry("icao")
                .or_insert_with(|| Value::String(code.to_uppercase()));
        }
        serde_json::from_value::<AirportProfile>(value).map_err(|e| e.to_string())
    });

    parsed.unwrap_or_else(|error| {
        tracing::warn!(path = %path.display(), %error, "Invalid airport profile, using defaults");
        AirportProfile::new(code.to_uppercase())
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}
