//! Office Sandbox Engine library.
//!
//! This crate contains all server-side code for the office sandbox game.
//!
//! ## Structure
//!
//! - `prompt_templates` - Prompt text for every model-backed endpoint
//! - `use_cases/` - One orchestrator per endpoint, with local fallbacks
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod prompt_templates;
pub mod use_cases;

pub use app::App;
