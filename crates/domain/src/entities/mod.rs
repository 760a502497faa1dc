//! Domain entities - Records the engine produces for the client

mod interview;
mod job;
mod market;
mod npc;
mod task;
mod workplace_event;

pub use interview::{InterviewMode, InterviewQuestion};
pub use job::{Company, CompanyKind, JobListing, Position, SalaryRange, Urgency, WorkType};
pub use market::{Fund, MarketSnapshot, Stock};
pub use npc::{NpcProfile, NpcRoster};
pub use task::{DailyTasks, Task, TaskDifficulty, TaskKind};
pub use workplace_event::{EventChoice, EventEffects, EventKind, EventRequestKind, WorkplaceEvent};
