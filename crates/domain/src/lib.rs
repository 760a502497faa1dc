//! Office Sandbox domain types.
//!
//! Everything here is a transient, request-scoped value: the caller resends the
//! full player state with every request and nothing is persisted.

pub mod entities;
pub mod error;
pub mod value_objects;

pub use entities::{
    Company, CompanyKind, DailyTasks, EventChoice, EventEffects, EventKind, EventRequestKind,
    Fund, InterviewMode, InterviewQuestion, JobListing, MarketSnapshot, NpcProfile, NpcRoster,
    Position, SalaryRange, Stock, Task, TaskDifficulty, TaskKind, Urgency, WorkType,
    WorkplaceEvent,
};
pub use error::DomainError;
pub use value_objects::coerce;
pub use value_objects::{
    clamp_delta, ActionOutcome, AnimationCommand, AnimationKind, CandidateProfile, ChatTurn,
    CompanyBrief, Emotion, InterviewRound, JobBrief, KpiTier, NpcReaction, NpcReply, PlayerInfo,
    StateChanges, WorkplaceStatus, RELATIONSHIP_CHANGE_BOUND,
};
