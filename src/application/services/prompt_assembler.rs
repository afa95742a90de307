use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::domain::{
    Difficulty, FrequencyGroup, GuidanceText, Phase, Scenario, StrictnessTier, TurnHistory,
    TurnRole,
};

/// Turns of prior context shown to the model.
pub const PROMPT_TURN_TAIL: usize = 6;

static DATA_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[data\.([\w_]+)\]").unwrap());

const EVALUATION_SUFFIX: &str =
    " Debes evaluar transmisiones de entrenamiento ATC y proporcionar retroalimentación.";

const RESPONSE_SCHEMA: &str = concat!(
    " Responde únicamente en formato JSON válido con la estructura exacta:",
    " {\n",
    "  \"intent\": string,\n",
    "  \"allowResponse\": boolean,\n",
    "  \"controllerText\": string | null,\n",
    "  \"feedback\": string,\n",
    "  \"confidence\": number | null,\n",
    "  \"score\": number | null,\n",
    "  \"metadata\": object\n",
    " }.\n",
    "El campo \"score\" debe ser un número de 0 a 100 que evalúe la calidad de la transmisión del alumno ",
    "para la fase actual, considerando: fraseología correcta, información completa, orden lógico, ",
    "y uso apropiado de la frecuencia. Un score de 100 es perfecto, 0 es completamente incorrecto.\n",
    "Si necesitas proponer un cambio de fase, incluye en metadata la clave \"nextPhase\".",
    " No escribas texto adicional antes o después del JSON."
);

const EVALUATION_RULES: &str = concat!(
    "Evalúa la transmisión del alumno usando la información anterior. Decide si el controlador debe ",
    "responder (allowResponse=true) y redacta tanto la respuesta del controlador como la retroalimentación.\n",
    "Reglas:\n",
    "- Si falta información crítica u observas errores serios, establece allowResponse=false, ",
    "  deja controllerText en null y explica la razón en feedback.\n",
    "- Cuando allowResponse sea true, escribe controllerText con fraseología ATC costarricense adecuada ",
    "  para la frecuencia indicada.\n",
    "- Usa metadata para detallar elementos faltantes, próximos pasos o \"nextPhase\" si corresponde.\n",
    "- Respeta estrictamente el formato JSON solicitado; no incluyas texto fuera de la estructura."
);

/// Default controller persona for a radio channel.
pub fn persona_for(group: &FrequencyGroup) -> &'static str {
    match group {
        FrequencyGroup::Ground => concat!(
            "Eres un controlador de superficie en español (Costa Rica). ",
            "Gestionas rodajes, puntos de espera y pistas activas."
        ),
        FrequencyGroup::Approach => concat!(
            "Eres un controlador radar de aproximación en español (Costa Rica). ",
            "Gestionas vectores, niveles y transferencias de frecuencia."
        ),
        FrequencyGroup::Radar => concat!(
            "Eres un controlador radar en español (Costa Rica). ",
            "Entrega instrucciones concisas de rumbo, altitud y transferencia."
        ),
        FrequencyGroup::Tower | FrequencyGroup::Other(_) => concat!(
            "Eres un controlador de torre en español (Costa Rica). ",
            "Gestionas autorizaciones de despegue/aterrizaje, transferencias y avisos de pista."
        ),
    }
}

pub fn strictness_instruction(difficulty: Difficulty) -> &'static str {
    match difficulty.tier() {
        StrictnessTier::Relaxed => concat!(
            " Modo relajado: Sé flexible con la fraseología. Acepta variaciones informales siempre que la intención sea clara y segura. ",
            "No penalices errores menores."
        ),
        StrictnessTier::Normal => concat!(
            " Modo normal: Balancea la precisión con la fluidez. Penaliza errores de seguridad o información crítica, ",
            "pero permite ligeras variaciones."
        ),
        StrictnessTier::Strict => {
            " Modo estricto: Exige fraseología estándar perfecta. Penaliza cualquier desviación o error menor."
        }
    }
}

/// Replaces `[data.key]` with the phase's data value; unknown keys stay as written.
pub fn substitute_placeholders(text: &str, data: &Map<String, Value>) -> String {
    DATA_PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| match data.get(&caps[1]) {
            Some(Value::Null) | None => caps[0].to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        })
        .into_owned()
}

/// Everything the prompts are built from.
pub struct PromptInput<'a> {
    pub transcript: &'a str,
    pub intent: &'a str,
    pub frequency: &'a str,
    pub frequency_group: &'a FrequencyGroup,
    pub airport: &'a str,
    pub scenario: &'a Scenario,
    pub phase: &'a Phase,
    pub turn_history: &'a TurnHistory,
    pub difficulty: Difficulty,
}

/// The two prompts plus the values the next stage echoes back.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptBundle {
    pub system_prompt: String,
    pub user_prompt: String,
    pub intent: String,
    pub frequency: String,
    pub frequency_group: FrequencyGroup,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PromptAssembler;

impl PromptAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(&self, input: &PromptInput<'_>) -> PromptBundle {
        PromptBundle {
            system_prompt: self.system_prompt(input),
            user_prompt: self.user_prompt(input),
            intent: input.intent.to_string(),
            frequency: input.frequency.to_string(),
            frequency_group: input.frequency_group.clone(),
        }
    }

    fn system_prompt(&self, input: &PromptInput<'_>) -> String {
        let mut prompt = match input.phase.controller_role() {
            Some(role) => substitute_placeholders(role, &input.phase.data),
            None => format!("{}{}", persona_for(input.frequency_group), EVALUATION_SUFFIX),
        };
        prompt.push_str(strictness_instruction(input.difficulty));
        prompt.push_str(RESPONSE_SCHEMA);
        prompt
    }

    fn user_prompt(&self, input: &PromptInput<'_>) -> String {
        let phase = input.phase;
        let phase_id = (!phase.id.is_empty()).then_some(phase.id.as_str());
        let header = phase
            .display_name()
            .or(phase_id)
            .unwrap_or("desconocida");

        let scenario_json = serde_json::to_string_pretty(input.scenario).unwrap_or_else(|_| "{}".into());
        let phase_json = serde_json::to_string_pretty(phase).unwrap_or_else(|_| "{}".into());

        format!(
            "Fase actual: {header}\n\
             Intent esperado: {intent}\n\
             Transcripción textual del alumno:\n{transcript}\n\n\
             Contexto operativo:\n\
             - Aeropuerto: {airport}\n\
             - Grupo de frecuencia: {group}\n\
             - Fase ID: {phase_id}\n\n\
             {guidance}\n\n\
             Escenario (JSON):\n{scenario_json}\n\n\
             Fase (JSON):\n{phase_json}\n\n\
             {turns}{rules}",
            intent = input.intent,
            transcript = input.transcript.trim(),
            airport = input.airport,
            group = input.frequency_group,
            phase_id = phase_id.unwrap_or("desconocido"),
            guidance = guidance_sections(phase),
            turns = format_turn_history(input.turn_history),
            rules = EVALUATION_RULES,
        )
    }
}

fn guidance_sections(phase: &Phase) -> String {
    let Some(llm) = phase.llm.as_ref() else {
        return String::new();
    };

    let listed = [
        ("Checklist alumno", &llm.student_checklist),
        ("Checklist controlador", &llm.controller_checklist),
        ("Cuándo responder", &llm.allow_response_rules),
        ("Guía de feedback", &llm.feedback_guidance),
    ];

    let mut sections: Vec<String> = listed
        .into_iter()
        .filter_map(|(title, guidance)| {
            guidance
                .as_ref()
                .filter(|g| !g.is_empty())
                .map(|g| format_guidance(title, g, &phase.data))
        })
        .collect();

    if let Some(notes) = llm.notes.as_deref().filter(|n| !n.is_empty()) {
        sections.push(format!(
            "Notas adicionales: {}",
            substitute_placeholders(notes, &phase.data)
        ));
    }

    sections.join("\n\n")
}

fn format_guidance(title: &str, guidance: &GuidanceText, data: &Map<String, Value>) -> String {
    let items = guidance
        .items()
        .iter()
        .map(|item| format!("- {}", substitute_placeholders(item, data)))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{title}:\n{items}")
}

/// Recent turns as a numbered list with lightweight hints, or nothing when
/// the session has no history yet.
pub fn format_turn_history(history: &TurnHistory) -> String {
    if history.is_empty() {
        return String::new();
    }

    let mut out = String::from("Turnos previos:\n");
    for (idx, turn) in history.recent(PROMPT_TURN_TAIL).enumerate() {
        let mut hints = Vec::new();
        if let Some(frequency) = turn.frequency.as_deref().filter(|f| !f.is_empty()) {
            hints.push(format!("freq={frequency}"));
        }
        if let Some(intent) = turn.intent.as_deref().filter(|i| !i.is_empty()) {
            hints.push(format!("intent={intent}"));
        }
        if turn.allow_response == Some(false) {
            hints.push("allowResponse=false".to_string());
        }
        if turn.role != TurnRole::Student {
            if let Some(feedback) = turn.feedback.as_deref().filter(|f| !f.is_empty()) {
                hints.push(format!("feedback={feedback}"));
            }
        }

        let hints = if hints.is_empty() {
            String::new()
        } else {
            format!(" ({})", hints.join(", "))
        };
        let _ = writeln!(
            out,
            "  {}. {}: {}{}",
            idx + 1,
            turn.role.display_label(),
            turn.text.trim(),
            hints
        );
    }
    out.push('\n');
    out
}
