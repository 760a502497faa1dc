//! Interview questions

use serde::{Deserialize, Serialize};

/// What the client wants back from one interview turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewMode {
    /// Critique the previous answer, then ask the next question.
    #[default]
    Full,
    /// Ask the next question only.
    Question,
    /// Critique the previous answer only.
    Analysis,
}

impl InterviewMode {
    /// Map the request's `action` field; unknown values mean a full turn.
    pub fn from_action(action: &str) -> Self {
        match action.trim().to_ascii_lowercase().as_str() {
            "question" | "next" => InterviewMode::Question,
            "analysis" | "analyze" => InterviewMode::Analysis,
            _ => InterviewMode::Full,
        }
    }

    /// How many trailing history turns go upstream.
    pub fn history_limit(&self) -> usize {
        match self {
            InterviewMode::Full | InterviewMode::Question => 4,
            InterviewMode::Analysis => 2,
        }
    }

    pub fn wants_analysis(&self) -> bool {
        matches!(self, InterviewMode::Full | InterviewMode::Analysis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    pub question: String,
    pub sample_answer: String,
    /// `technical | behavioral | personal | stress`, or `analysis` for critique-only turns.
    #[serde(rename = "type")]
    pub kind: String,
    pub display_type: String,
}

impl InterviewQuestion {
    pub fn new(
        question: impl Into<String>,
        sample_answer: impl Into<String>,
        kind: impl Into<String>,
        display_type: impl Into<String>,
    ) -> Self {
        Self {
            analysis: None,
            question: question.into(),
            sample_answer: sample_answer.into(),
            kind: kind.into(),
            display_type: display_type.into(),
        }
    }

    /// A critique-only turn with empty question fields.
    pub fn analysis_only(analysis: impl Into<String>) -> Self {
        Self {
            analysis: Some(analysis.into()),
            question: String::new(),
            sample_answer: String::new(),
            kind: "analysis".to_string(),
            display_type: "回答点评".to_string(),
        }
    }

    pub fn with_analysis(mut self, analysis: impl Into<String>) -> Self {
        self.analysis = Some(analysis.into());
        self
    }
}
