//! Workplace events: office politics, bullying, opportunities and crises,
//! each offering the player a handful of choices with stat effects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value_objects::coerce::clamp_delta;
use crate::RELATIONSHIP_CHANGE_BOUND;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    #[default]
    Politics,
    Bullying,
    Opportunity,
    Crisis,
}

impl EventKind {
    pub fn all() -> &'static [EventKind] {
        &[
            EventKind::Politics,
            EventKind::Bullying,
            EventKind::Opportunity,
            EventKind::Crisis,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Politics => "politics",
            EventKind::Bullying => "bullying",
            EventKind::Opportunity => "opportunity",
            EventKind::Crisis => "crisis",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(raw))
    }
}

/// The `event_type` a client asks for: a specific kind or anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventRequestKind {
    #[default]
    Random,
    Kind(EventKind),
}

impl EventRequestKind {
    /// Unrecognised requests are treated as `random`.
    pub fn parse(raw: &str) -> Self {
        EventKind::parse(raw)
            .map(EventRequestKind::Kind)
            .unwrap_or(EventRequestKind::Random)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventRequestKind::Random => "random",
            EventRequestKind::Kind(kind) => kind.as_str(),
        }
    }

    pub fn accepts(&self, kind: EventKind) -> bool {
        match self {
            EventRequestKind::Random => true,
            EventRequestKind::Kind(wanted) => *wanted == kind,
        }
    }
}

/// Stat changes applied when a choice is taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEffects {
    #[serde(default)]
    pub kpi: i32,
    #[serde(default)]
    pub stress: i32,
    #[serde(default)]
    pub reputation: i32,
    /// Per-NPC relationship deltas, each within ±10.
    #[serde(default)]
    pub relationship: BTreeMap<String, i32>,
}

impl EventEffects {
    pub fn new(kpi: i32, stress: i32, reputation: i32) -> Self {
        Self {
            kpi,
            stress,
            reputation,
            relationship: BTreeMap::new(),
        }
    }

    /// Add a relationship delta, clamped into range.
    pub fn with_relationship(mut self, npc: impl Into<String>, delta: i64) -> Self {
        self.relationship
            .insert(npc.into(), clamp_delta(delta, RELATIONSHIP_CHANGE_BOUND));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventChoice {
    pub text: String,
    #[serde(default)]
    pub effects: EventEffects,
}

impl EventChoice {
    pub fn new(text: impl Into<String>, effects: EventEffects) -> Self {
        Self {
            text: text.into(),
            effects,
        }
    }
}

/// What `/api/event` returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkplaceEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub choices: Vec<EventChoice>,
}
