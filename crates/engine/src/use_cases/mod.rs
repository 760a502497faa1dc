//! Use cases - one per endpoint.
//!
//! Each use case builds a prompt, asks the model once, normalizes the reply,
//! and serves a local fallback whenever the model is missing or unusable.

pub mod action;
pub mod chat;
pub mod completion;
pub mod event;
pub mod interview;
pub mod jobs;
pub mod market;
pub mod response_parser;
pub mod tasks;

pub use action::{ActionInput, ActionInterpreter};
pub use chat::{ChatError, ChatInput, NpcChat};
pub use event::{EventInput, WorkplaceEvents};
pub use interview::{InterviewCoach, InterviewInput, InterviewStream, InterviewStreamEvent};
pub use jobs::JobBoard;
pub use market::MarketTicker;
pub use tasks::DailyTaskPlanner;
