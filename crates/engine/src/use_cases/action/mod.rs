//! Free-text player actions.

pub mod interpreter;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use officesbx_domain::coerce::{as_i64, as_text, clamp_delta};
use officesbx_domain::{
    ActionOutcome, AnimationCommand, AnimationKind, NpcReaction, PlayerInfo, StateChanges,
    WorkplaceStatus,
};

use crate::infrastructure::ports::{ChatMessage, LlmPort, RandomPort};
use crate::prompt_templates::{self, PromptKind};

use super::completion::complete;
use super::response_parser::{extract_json, JsonKind};

pub use interpreter::{classify, interpret, ActionCategory};

/// Model-reported state deltas are clamped into this symmetric range.
pub const STATE_DELTA_BOUND: i32 = 100;

/// Longest animation step the model may request, in milliseconds.
const MAX_ANIMATION_MS: i64 = 10_000;

#[derive(Debug, Clone, Default)]
pub struct ActionInput {
    pub action: String,
    pub player: Option<PlayerInfo>,
    pub status: Option<WorkplaceStatus>,
    pub visible_objects: Vec<String>,
    pub visible_npcs: Vec<String>,
}

pub struct ActionInterpreter {
    llm: Option<Arc<dyn LlmPort>>,
    random: Arc<dyn RandomPort>,
}

impl ActionInterpreter {
    pub fn new(llm: Option<Arc<dyn LlmPort>>, random: Arc<dyn RandomPort>) -> Self {
        Self { llm, random }
    }

    pub async fn interpret(&self, input: &ActionInput) -> ActionOutcome {
        let system_prompt = prompt_templates::action_system_prompt(
            input.player.as_ref(),
            input.status.as_ref(),
            &input.visible_objects,
            &input.visible_npcs,
        );
        let messages = vec![ChatMessage::user(input.action.clone())];

        if let Some(raw) = complete(self.llm.as_ref(), PromptKind::Action, system_prompt, messages).await
        {
            match extract_json(&raw, JsonKind::Object).and_then(|v| outcome_from_value(&v)) {
                Some(outcome) => {
                    tracing::info!(feasible = outcome.feasible, "Model judged player action");
                    return outcome;
                }
                None => tracing::warn!("Unusable action verdict, using local interpreter"),
            }
        }

        let outcome = interpret(
            &input.action,
            &input.visible_objects,
            &input.visible_npcs,
            self.random.as_ref(),
        );
        tracing::debug!(
            category = ?classify(&input.action),
            feasible = outcome.feasible,
            "Interpreted action locally"
        );
        outcome
    }
}

/// Lenient conversion of the model's verdict. A description is required.
fn outcome_from_value(value: &Value) -> Option<ActionOutcome> {
    let description = value.get("description").and_then(as_text)?;
    let feasible = value
        .get("feasible")
        .map(|v| match v {
            Value::Bool(b) => *b,
            Value::String(s) => !matches!(s.trim().to_ascii_lowercase().as_str(), "false" | "no"),
            _ => true,
        })
        .unwrap_or(true);

    let mut outcome = if feasible {
        ActionOutcome::feasible(description)
    } else {
        ActionOutcome::infeasible(description)
    };

    outcome.animations = value
        .get("animations")
        .and_then(Value::as_array)
        .map(|steps| steps.iter().filter_map(animation_from_value).collect())
        .unwrap_or_default();

    outcome.npc_reactions = value
        .get("npc_reactions")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(npc, reaction)| {
                    let reaction = NpcReaction::parse(&as_text(reaction)?)?;
                    Some((npc.clone(), reaction))
                })
                .collect()
        })
        .unwrap_or_default();

    if let Some(changes) = value.get("state_changes") {
        outcome.state_changes = state_changes_from_value(changes);
    }
    outcome.dialogue = value.get("dialogue").and_then(as_text);

    Some(outcome)
}

fn animation_from_value(value: &Value) -> Option<AnimationCommand> {
    let kind = AnimationKind::parse_lenient(&value.get("type").and_then(as_text)?);
    let millis = |key: &str| {
        value
            .get(key)
            .and_then(as_i64)
            .map(|ms| ms.clamp(0, MAX_ANIMATION_MS) as u32)
    };

    Some(AnimationCommand {
        kind,
        target: value.get("target").and_then(as_text),
        object: value.get("object").and_then(as_text),
        duration: millis("duration"),
        delay: millis("delay"),
    })
}

fn state_changes_from_value(value: &Value) -> StateChanges {
    let delta = |v: &Value| as_i64(v).map(|d| clamp_delta(d, STATE_DELTA_BOUND));
    let field = |key: &str| value.get(key).and_then(delta);

    let relationships: BTreeMap<String, i32> = value
        .get("relationships")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(npc, d)| Some((npc.clone(), delta(d)?)))
                .collect()
        })
        .unwrap_or_default();

    StateChanges {
        mood: field("mood"),
        stress: field("stress"),
        work_progress: field("work_progress"),
        relationships,
    }
}
