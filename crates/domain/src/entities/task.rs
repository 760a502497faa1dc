//! Daily work tasks

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl TaskDifficulty {
    /// Unknown difficulties read as medium.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" | "简单" => TaskDifficulty::Easy,
            "hard" | "困难" => TaskDifficulty::Hard,
            _ => TaskDifficulty::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Document,
    Meeting,
    Communication,
    Emergency,
}

impl TaskKind {
    /// Unknown kinds read as document work.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "meeting" => TaskKind::Meeting,
            "communication" => TaskKind::Communication,
            "emergency" => TaskKind::Emergency,
            _ => TaskKind::Document,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: TaskDifficulty,
    /// Cash reward, never negative.
    pub reward: f64,
    /// Wall-clock deadline such as `17:00`.
    pub deadline: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            difficulty: TaskDifficulty::default(),
            reward: 0.0,
            deadline: "18:00".to_string(),
            kind: TaskKind::default(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: TaskDifficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Negative or non-finite rewards are stored as zero.
    pub fn with_reward(mut self, reward: f64) -> Self {
        self.reward = if reward.is_finite() { reward.max(0.0) } else { 0.0 };
        self
    }

    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = deadline.into();
        self
    }

    pub fn with_kind(mut self, kind: TaskKind) -> Self {
        self.kind = kind;
        self
    }
}

/// What `/api/tasks` returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTasks {
    pub tasks: Vec<Task>,
    pub daily_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_is_never_negative() {
        let task = Task::new("t", "写周报", "").with_reward(-20.0);
        assert_eq!(task.reward, 0.0);
        let task = Task::new("t", "写周报", "").with_reward(f64::NAN);
        assert_eq!(task.reward, 0.0);
    }

    #[test]
    fn task_serializes_kind_as_type() {
        let task = Task::new("task_002", "参加项目周会", "")
            .with_kind(TaskKind::Meeting)
            .with_difficulty(TaskDifficulty::Easy);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["type"], "meeting");
        assert_eq!(json["difficulty"], "easy");
    }

    #[test]
    fn lenient_parsers_default_unknowns() {
        assert_eq!(TaskDifficulty::parse_lenient("HARD"), TaskDifficulty::Hard);
        assert_eq!(TaskDifficulty::parse_lenient("???"), TaskDifficulty::Medium);
        assert_eq!(TaskKind::parse_lenient("party"), TaskKind::Document);
    }
}
