use serde_json::{Map, Value};

use crate::domain::{Phase, PhaseMap};

/// The parts of a turn outcome that drive phase transitions.
#[derive(Debug, Clone, Copy)]
pub struct TransitionSignal<'a> {
    pub next_phase_hint: Option<&'a str>,
    pub allow_response: bool,
}

impl<'a> TransitionSignal<'a> {
    pub fn new(metadata: &'a Map<String, Value>, allow_response: bool) -> Self {
        Self {
            next_phase_hint: next_phase_hint(metadata),
            allow_response,
        }
    }
}

/// `metadata.nextPhase`, falling back to `metadata.next_phase`.
pub fn next_phase_hint(metadata: &Map<String, Value>) -> Option<&str> {
    ["nextPhase", "next_phase"]
        .iter()
        .filter_map(|key| metadata.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|id| !id.is_empty())
}

/// Where the session goes after `current` was graded.
///
/// An explicit model hint wins; otherwise `onSuccess` applies only when the
/// controller actually replied. A target missing from `phase_map` means no
/// transition, even when a lower-priority candidate exists.
pub fn next_phase<'a>(
    current: &Phase,
    signal: TransitionSignal<'_>,
    phase_map: &'a PhaseMap,
) -> Option<&'a Phase> {
    let candidate = signal.next_phase_hint.or_else(|| {
        signal
            .allow_response
            .then(|| current.transitions.on_success_target())
            .flatten()
    })?;

    let target = phase_map.get(candidate);
    if target.is_none() {
        tracing::debug!(from = %current.id, to = %candidate, "Transition target not in phase map");
    }
    target
}
