//! Job board listings
//!
//! Inner company/position fields are camelCase on the wire because the job
//! screens read the same shape the model is asked to produce.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyKind {
    Large,
    #[default]
    Mid,
    Startup,
    Foreign,
    Small,
}

impl CompanyKind {
    pub fn all() -> &'static [CompanyKind] {
        &[
            CompanyKind::Large,
            CompanyKind::Mid,
            CompanyKind::Startup,
            CompanyKind::Foreign,
            CompanyKind::Small,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyKind::Large => "large",
            CompanyKind::Mid => "mid",
            CompanyKind::Startup => "startup",
            CompanyKind::Foreign => "foreign",
            CompanyKind::Small => "small",
        }
    }

    pub fn parse_lenient(raw: &str) -> Self {
        let raw = raw.trim();
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(raw))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    #[default]
    Onsite,
    Remote,
    Hybrid,
}

impl WorkType {
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "remote" => WorkType::Remote,
            "hybrid" => WorkType::Hybrid,
            _ => WorkType::Onsite,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Normal,
    Urgent,
    Asap,
}

impl Urgency {
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "urgent" => Urgency::Urgent,
            "asap" => Urgency::Asap,
            _ => Urgency::Normal,
        }
    }
}

/// Monthly salary band. Always ordered; serialized as `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct SalaryRange {
    lo: u32,
    hi: u32,
}

impl SalaryRange {
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    pub fn lo(&self) -> u32 {
        self.lo
    }

    pub fn hi(&self) -> u32 {
        self.hi
    }
}

impl From<[u32; 2]> for SalaryRange {
    fn from([a, b]: [u32; 2]) -> Self {
        Self::new(a, b)
    }
}

impl From<SalaryRange> for [u32; 2] {
    fn from(range: SalaryRange) -> Self {
        [range.lo, range.hi]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CompanyKind,
    pub industry: String,
    pub size: String,
    /// 1-5
    pub reputation: u8,
    /// 1-5
    pub difficulty: u8,
    /// 1-5
    pub salary_level: u8,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub title: String,
    pub department: String,
    pub salary_range: SalaryRange,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub work_type: WorkType,
    pub experience: String,
    pub education: String,
    /// At least 1.
    pub headcount: u32,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub company: Company,
    pub position: Position,
}

/// Clamp a 1-5 rating.
fn rating(value: i64) -> u8 {
    value.clamp(1, 5) as u8
}

impl Company {
    /// Build with ratings clamped into 1-5.
    pub fn rated(
        name: impl Into<String>,
        kind: CompanyKind,
        reputation: i64,
        difficulty: i64,
        salary_level: i64,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            industry: String::new(),
            size: String::new(),
            reputation: rating(reputation),
            difficulty: rating(difficulty),
            salary_level: rating(salary_level),
            description: String::new(),
        }
    }
}
