//! Application state and composition.

use std::sync::Arc;

use officesbx_domain::NpcRoster;

use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    config::EngineConfig,
    ports::{ClockPort, LlmPort, RandomPort},
};
use crate::use_cases;

/// Main application state.
///
/// Built once at startup and passed to HTTP handlers via Axum state. Nothing
/// in it changes after construction.
pub struct App {
    pub config: EngineConfig,
    pub roster: Arc<NpcRoster>,
    pub clock: Arc<dyn ClockPort>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub chat: use_cases::NpcChat,
    pub tasks: use_cases::DailyTaskPlanner,
    pub jobs: use_cases::JobBoard,
    pub interview: use_cases::InterviewCoach,
    pub action: use_cases::ActionInterpreter,
    pub event: use_cases::WorkplaceEvents,
    pub market: use_cases::MarketTicker,
}

impl App {
    /// Wire up every use case. `llm` is `None` in fallback mode.
    pub fn new(config: EngineConfig, llm: Option<Arc<dyn LlmPort>>) -> Self {
        Self::with_ports(
            config,
            NpcRoster::office_default(),
            llm,
            Arc::new(SystemClock::new()),
            Arc::new(SystemRandom::new()),
        )
    }

    pub fn with_ports(
        config: EngineConfig,
        roster: NpcRoster,
        llm: Option<Arc<dyn LlmPort>>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let roster = Arc::new(roster);

        let use_cases = UseCases {
            chat: use_cases::NpcChat::new(roster.clone(), llm.clone(), random.clone()),
            tasks: use_cases::DailyTaskPlanner::new(llm.clone(), random.clone()),
            jobs: use_cases::JobBoard::new(llm.clone(), random.clone()),
            interview: use_cases::InterviewCoach::new(llm.clone(), random.clone()),
            action: use_cases::ActionInterpreter::new(llm.clone(), random.clone()),
            event: use_cases::WorkplaceEvents::new(roster.clone(), llm, random.clone()),
            market: use_cases::MarketTicker::new(clock.clone(), random),
        };

        Self {
            config,
            roster,
            clock,
            use_cases,
        }
    }

    /// Whether a model credential was configured.
    pub fn ai_available(&self) -> bool {
        self.config.ai_available()
    }
}
