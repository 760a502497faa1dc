//! NPC profiles and the office roster
//!
//! The roster is built once at startup and shared read-only; lookups are exact
//! name matches.

use serde::{Deserialize, Serialize};

/// A coworker the player can talk to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcProfile {
    pub name: String,
    /// Free-text character sketch fed to the model.
    pub personality: String,
    pub position: String,
    pub speaking_style: String,
    pub faction: String,
    /// Display colour as a CSS hex string.
    pub color: String,
}

impl NpcProfile {
    pub fn new(
        name: impl Into<String>,
        position: impl Into<String>,
        faction: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            personality: String::new(),
            position: position.into(),
            speaking_style: String::new(),
            faction: faction.into(),
            color: color.into(),
        }
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = personality.into();
        self
    }

    pub fn with_speaking_style(mut self, style: impl Into<String>) -> Self {
        self.speaking_style = style.into();
        self
    }
}

/// Immutable table of NPCs, in display order.
#[derive(Debug, Clone, Default)]
pub struct NpcRoster {
    profiles: Vec<NpcProfile>,
}

impl NpcRoster {
    pub fn new(profiles: Vec<NpcProfile>) -> Self {
        Self { profiles }
    }

    /// The three coworkers every new game starts with.
    pub fn office_default() -> Self {
        Self::new(vec![
            NpcProfile::new("张经理", "部门经理", "管理派", "#e63946")
                .with_personality("严肃但公正，注重效率，偶尔会关心下属，但更看重KPI")
                .with_speaking_style("简洁专业，偶尔使用管理术语，对KPI低的人态度冷淡"),
            NpcProfile::new("李同事", "资深员工", "新人帮", "#f4a261")
                .with_personality("表面热情友好，实际上爱八卦、会抢功，对威胁到自己的人有敌意")
                .with_speaking_style("轻松随意，经常使用网络用语，但话里有话"),
            NpcProfile::new("王前辈", "高级工程师", "元老派", "#118ab2")
                .with_personality("沉稳内敛，经验丰富，愿意指导新人，但不喜欢不努力的人")
                .with_speaking_style("温和有耐心，喜欢用比喻解释问题，有时会透露职场真相"),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&NpcProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NpcProfile> {
        self.profiles.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }
}
