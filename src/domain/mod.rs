mod airport_profile;
mod audio_format;
mod difficulty;
mod dynamic_assignments;
mod frequency;
mod frequency_group;
pub(crate) mod lenient;
mod meteo;
mod phase;
mod phase_score;
mod scenario;
mod session_id;
mod session_state;
mod storage_path;
mod turn;
mod turn_history;
mod turn_role;

pub use airport_profile::AirportProfile;
pub use audio_format::AudioFormat;
pub use difficulty::{Difficulty, StrictnessTier};
pub use dynamic_assignments::{DynamicAssignments, TAXI_ROUTES};
pub use frequency::{FrequencyCheck, normalize_frequency};
pub use frequency_group::{FrequencyGroup, FrequencyMap};
pub use meteo::{Meteo, parse_wind_components};
pub use phase::{ControllerSection, GuidanceText, LlmGuidance, Phase, PhaseMap, PhaseTransitions};
pub use phase_score::{FREQUENCY_USAGE_ERROR_PHASE, PhaseScore};
pub use scenario::Scenario;
pub use session_id::SessionId;
pub use session_state::SessionState;
pub use storage_path::StoragePath;
pub use turn::Turn;
pub use turn_history::{MAX_TURNS_STORED, TurnHistory};
pub use turn_role::TurnRole;
