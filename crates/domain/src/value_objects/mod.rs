//! Value objects - Immutable objects defined by their attributes

mod action;
mod candidate;
mod chat;
pub mod coerce;
mod player;

// Outcome of a free-text player action
pub use action::{ActionOutcome, AnimationCommand, AnimationKind, NpcReaction, StateChanges};

// Interview inputs (resume + context supplied by the client)
pub use candidate::{CandidateProfile, CompanyBrief, InterviewRound, JobBrief};

// NPC dialogue
pub use chat::{ChatTurn, Emotion, NpcReply, RELATIONSHIP_CHANGE_BOUND};

pub use coerce::clamp_delta;

// Caller-supplied player state
pub use player::{KpiTier, PlayerInfo, WorkplaceStatus};
