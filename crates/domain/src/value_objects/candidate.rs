//! Interview inputs: the candidate's resume and the interview context.
//!
//! The job-hunt screens send these loosely; every field has a default so a
//! half-filled resume still produces a usable prompt.

use serde::{Deserialize, Serialize};

/// Resume fields used by the job board and the interviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub name: String,
    pub education: String,
    pub school: String,
    pub major: String,
    /// Years of experience.
    pub experience: u32,
    pub skills: Vec<String>,
}

impl Default for CandidateProfile {
    fn default() -> Self {
        Self {
            name: "求职者".to_string(),
            education: "本科".to_string(),
            school: "某大学".to_string(),
            major: "计算机".to_string(),
            experience: 0,
            skills: Vec::new(),
        }
    }
}

impl CandidateProfile {
    /// Skills joined for a prompt, or `fallback` when the resume lists none.
    pub fn skills_or(&self, fallback: &str) -> String {
        if self.skills.is_empty() {
            fallback.to_string()
        } else {
            self.skills.join(", ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyBrief {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for CompanyBrief {
    fn default() -> Self {
        Self {
            name: "某公司".to_string(),
            kind: "中型企业".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobBrief {
    pub title: String,
}

impl Default for JobBrief {
    fn default() -> Self {
        Self {
            title: "应聘岗位".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InterviewRound {
    pub round: u32,
    pub interviewer_role: String,
    pub is_pressure: bool,
}

impl Default for InterviewRound {
    fn default() -> Self {
        Self {
            round: 1,
            interviewer_role: "面试官".to_string(),
            is_pressure: false,
        }
    }
}
