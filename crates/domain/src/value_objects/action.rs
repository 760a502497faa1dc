//! Outcome of interpreting a free-text player action.
//!
//! The client plays `animations` in order, applies `npc_reactions` to the named
//! sprites, and folds `state_changes` into its own save state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Animation the client knows how to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    Throw,
    Hit,
    Debris,
    Hurt,
    Dodge,
    Charge,
    Work,
    Idle,
    Walk,
    Generic,
}

impl AnimationKind {
    pub fn all() -> &'static [AnimationKind] {
        &[
            AnimationKind::Throw,
            AnimationKind::Hit,
            AnimationKind::Debris,
            AnimationKind::Hurt,
            AnimationKind::Dodge,
            AnimationKind::Charge,
            AnimationKind::Work,
            AnimationKind::Idle,
            AnimationKind::Walk,
            AnimationKind::Generic,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationKind::Throw => "throw",
            AnimationKind::Hit => "hit",
            AnimationKind::Debris => "debris",
            AnimationKind::Hurt => "hurt",
            AnimationKind::Dodge => "dodge",
            AnimationKind::Charge => "charge",
            AnimationKind::Work => "work",
            AnimationKind::Idle => "idle",
            AnimationKind::Walk => "walk",
            AnimationKind::Generic => "generic",
        }
    }

    /// Unknown animation names play as the generic animation.
    pub fn parse_lenient(raw: &str) -> Self {
        let raw = raw.trim();
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(raw))
            .unwrap_or(AnimationKind::Generic)
    }
}

/// One step of an animation sequence. Timing fields are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationCommand {
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
}

impl AnimationCommand {
    pub fn new(kind: AnimationKind) -> Self {
        Self {
            kind,
            target: None,
            object: None,
            duration: None,
            delay: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn with_duration(mut self, ms: u32) -> Self {
        self.duration = Some(ms);
        self
    }

    pub fn with_delay(mut self, ms: u32) -> Self {
        self.delay = Some(ms);
        self
    }
}

/// How a bystander NPC reacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcReaction {
    Hurt,
    Dodge,
    Gather,
    Flee,
    Shock,
    Notice,
    Talk,
}

impl NpcReaction {
    pub fn all() -> &'static [NpcReaction] {
        &[
            NpcReaction::Hurt,
            NpcReaction::Dodge,
            NpcReaction::Gather,
            NpcReaction::Flee,
            NpcReaction::Shock,
            NpcReaction::Notice,
            NpcReaction::Talk,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NpcReaction::Hurt => "hurt",
            NpcReaction::Dodge => "dodge",
            NpcReaction::Gather => "gather",
            NpcReaction::Flee => "flee",
            NpcReaction::Shock => "shock",
            NpcReaction::Notice => "notice",
            NpcReaction::Talk => "talk",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::all()
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(raw))
    }
}

/// Deltas the client applies to its own state. Absent fields mean "no change".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_progress: Option<i32>,
    #[serde(default)]
    pub relationships: BTreeMap<String, i32>,
}

impl StateChanges {
    pub fn new(mood: i32, stress: i32, work_progress: i32) -> Self {
        Self {
            mood: Some(mood),
            stress: Some(stress),
            work_progress: Some(work_progress),
            relationships: BTreeMap::new(),
        }
    }

    pub fn with_relationship(mut self, npc: impl Into<String>, delta: i32) -> Self {
        self.relationships.insert(npc.into(), delta);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mood.is_none()
            && self.stress.is_none()
            && self.work_progress.is_none()
            && self.relationships.is_empty()
    }
}

/// What `/api/action` returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub feasible: bool,
    pub description: String,
    #[serde(default)]
    pub animations: Vec<AnimationCommand>,
    #[serde(default)]
    pub npc_reactions: BTreeMap<String, NpcReaction>,
    #[serde(default)]
    pub state_changes: StateChanges,
    #[serde(default)]
    pub dialogue: Option<String>,
}

impl ActionOutcome {
    pub fn feasible(description: impl Into<String>) -> Self {
        Self {
            feasible: true,
            description: description.into(),
            animations: Vec::new(),
            npc_reactions: BTreeMap::new(),
            state_changes: StateChanges::default(),
            dialogue: None,
        }
    }

    pub fn infeasible(description: impl Into<String>) -> Self {
        Self {
            feasible: false,
            ..Self::feasible(description)
        }
    }

    /// Kind of each animation step, in play order.
    pub fn animation_kinds(&self) -> Vec<AnimationKind> {
        self.animations.iter().map(|a| a.kind).collect()
    }
}
