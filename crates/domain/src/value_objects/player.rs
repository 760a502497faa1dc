//! Caller-supplied player state.
//!
//! The client owns the save game; every request carries a fresh copy of these
//! records and the server never derives or stores them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::DomainError;

/// The player character as the client last saw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    /// Job title. Open set; the client promotes through titles like 实习生 → 员工 → 经理.
    #[serde(default = "default_position")]
    pub position: String,
    #[serde(default = "default_money")]
    pub money: f64,
    /// In-game day, starting at 1.
    #[serde(default = "default_day")]
    pub day: u32,
    #[serde(default)]
    pub skills: Map<String, Value>,
}

fn default_position() -> String {
    "实习生".to_string()
}

fn default_money() -> f64 {
    5000.0
}

fn default_day() -> u32 {
    1
}

impl PlayerInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: default_position(),
            money: default_money(),
            day: default_day(),
            skills: Map::new(),
        }
    }

    /// Check the invariants the client is expected to uphold.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.money.is_finite() || self.money < 0.0 {
            return Err(DomainError::validation("money must be a non-negative number"));
        }
        if self.day == 0 {
            return Err(DomainError::validation("day must be at least 1"));
        }
        Ok(())
    }
}

/// The player's standing at work. Values are conventionally 0-100 but are not
/// clamped on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkplaceStatus {
    #[serde(default = "default_kpi")]
    pub kpi: i32,
    #[serde(default = "default_stress")]
    pub stress: i32,
    #[serde(default)]
    pub reputation: i32,
    #[serde(default)]
    pub faction: Option<String>,
}

fn default_kpi() -> i32 {
    60
}

fn default_stress() -> i32 {
    20
}

impl Default for WorkplaceStatus {
    fn default() -> Self {
        Self {
            kpi: default_kpi(),
            stress: default_stress(),
            reputation: 0,
            faction: None,
        }
    }
}

impl WorkplaceStatus {
    pub fn kpi_tier(&self) -> KpiTier {
        KpiTier::from_kpi(self.kpi)
    }

    /// Faction name for prompts, `无` when unaligned.
    pub fn faction_label(&self) -> &str {
        self.faction
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or("无")
    }
}

/// Coarse KPI band used to pick NPC attitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KpiTier {
    High,
    Medium,
    Low,
}

impl KpiTier {
    pub fn from_kpi(kpi: i32) -> Self {
        if kpi >= 75 {
            KpiTier::High
        } else if kpi < 50 {
            KpiTier::Low
        } else {
            KpiTier::Medium
        }
    }
}
