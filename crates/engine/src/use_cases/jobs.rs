//! Job board listings for the job-hunt screen.

use std::sync::Arc;

use serde_json::Value;

use officesbx_domain::coerce::{as_f64, as_i64, as_text, as_text_list};
use officesbx_domain::{
    CandidateProfile, Company, CompanyKind, JobListing, Position, SalaryRange, Urgency, WorkType,
};

use crate::infrastructure::ports::{choose, ChatMessage, LlmPort, RandomPort};
use crate::prompt_templates::{self, PromptKind};

use super::completion::complete;
use super::response_parser::{extract_json, JsonKind};

pub const MIN_JOB_COUNT: usize = 1;
pub const MAX_JOB_COUNT: usize = 30;
pub const DEFAULT_JOB_COUNT: usize = 15;

const MOCK_COMPANY_KINDS: &[CompanyKind] = &[
    CompanyKind::Large,
    CompanyKind::Mid,
    CompanyKind::Startup,
    CompanyKind::Foreign,
];
const MOCK_TITLES: &[&str] = &["前端开发", "后端开发", "产品经理", "UI设计师", "销售经理"];

pub struct JobBoard {
    llm: Option<Arc<dyn LlmPort>>,
    random: Arc<dyn RandomPort>,
}

impl JobBoard {
    pub fn new(llm: Option<Arc<dyn LlmPort>>, random: Arc<dyn RandomPort>) -> Self {
        Self { llm, random }
    }

    /// Generate up to `count` listings, clamped to `1..=30`.
    pub async fn generate(&self, candidate: &CandidateProfile, count: usize) -> Vec<JobListing> {
        let count = count.clamp(MIN_JOB_COUNT, MAX_JOB_COUNT);
        let system_prompt = prompt_templates::jobs_system_prompt(candidate, count);
        let messages = vec![ChatMessage::user(prompt_templates::jobs_user_prompt(count))];

        if let Some(raw) = complete(self.llm.as_ref(), PromptKind::Jobs, system_prompt, messages).await
        {
            let listings: Vec<JobListing> = extract_json(&raw, JsonKind::Array)
                .and_then(|v| v.as_array().cloned())
                .unwrap_or_default()
                .iter()
                .filter_map(|raw| self.listing_from_value(raw))
                .take(count)
                .collect();

            if !listings.is_empty() {
                tracing::info!(requested = count, generated = listings.len(), "Generated job listings");
                return listings;
            }
            tracing::warn!(requested = count, "Unusable job listing reply, using fallback");
        }

        self.mock_listings(count)
    }

    fn listing_from_value(&self, raw: &Value) -> Option<JobListing> {
        let company = raw.get("company")?;
        let position = raw.get("position")?;
        let title = position.get("title").and_then(as_text)?;

        let text = |v: &Value, key: &str| v.get(key).and_then(as_text).unwrap_or_default();
        let rating = |key: &str| company.get(key).and_then(as_i64).unwrap_or(3);

        let mut company_out = Company::rated(
            company
                .get("name")
                .and_then(as_text)
                .unwrap_or_else(|| "未知公司".to_string()),
            CompanyKind::parse_lenient(&text(company, "type")),
            rating("reputation"),
            rating("difficulty"),
            rating("salaryLevel"),
        );
        company_out.industry = text(company, "industry");
        company_out.size = text(company, "size");
        company_out.description = text(company, "description");

        let id = raw.get("id").and_then(as_text).unwrap_or_else(|| {
            let uuid = self.random.gen_uuid().simple().to_string();
            format!("job_{}", &uuid[..8])
        });

        Some(JobListing {
            id,
            company: company_out,
            position: Position {
                title,
                department: text(position, "department"),
                salary_range: salary_range_from_value(position.get("salaryRange")),
                requirements: position.get("requirements").map(as_text_list).unwrap_or_default(),
                benefits: position.get("benefits").map(as_text_list).unwrap_or_default(),
                work_type: WorkType::parse_lenient(&text(position, "workType")),
                experience: text(position, "experience"),
                education: text(position, "education"),
                headcount: position
                    .get("headcount")
                    .and_then(as_i64)
                    .map(|n| n.clamp(1, i64::from(u32::MAX)) as u32)
                    .unwrap_or(1),
                urgency: Urgency::parse_lenient(&text(position, "urgency")),
            },
        })
    }

    fn mock_listings(&self, count: usize) -> Vec<JobListing> {
        let random = self.random.as_ref();
        (0..count)
            .map(|i| {
                let mut company = Company::rated(
                    format!("模拟科技_{i}"),
                    choose(random, MOCK_COMPANY_KINDS)
                        .copied()
                        .unwrap_or_default(),
                    i64::from(random.gen_range(1, 5)),
                    i64::from(random.gen_range(1, 5)),
                    i64::from(random.gen_range(1, 5)),
                );
                company.industry = "互联网".to_string();
                company.size = "100-500人".to_string();
                company.description = "一家正在快速发展的模拟公司。".to_string();

                let lo = 10000 + random.gen_range(0, 5000).max(0) as u32;
                let hi = 20000 + random.gen_range(0, 10000).max(0) as u32;

                JobListing {
                    id: format!("mock_job_{i}"),
                    company,
                    position: Position {
                        title: choose(random, MOCK_TITLES)
                            .copied()
                            .unwrap_or(MOCK_TITLES[0])
                            .to_string(),
                        department: "技术部".to_string(),
                        salary_range: SalaryRange::new(lo, hi),
                        requirements: vec!["熟悉 JavaScript".to_string(), "良好的沟通能力".to_string()],
                        benefits: vec!["五险一金".to_string(), "带薪休假".to_string()],
                        work_type: WorkType::Onsite,
                        experience: "1-3年".to_string(),
                        education: "本科".to_string(),
                        headcount: 1,
                        urgency: Urgency::Normal,
                    },
                }
            })
            .collect()
    }
}

/// `[lo, hi]` in any order, numbers or numeric strings. Missing reads as 0.
fn salary_range_from_value(value: Option<&Value>) -> SalaryRange {
    let bound = |i: usize| {
        value
            .and_then(|v| v.get(i))
            .and_then(as_f64)
            .map(|f| f.clamp(0.0, f64::from(u32::MAX)) as u32)
            .unwrap_or(0)
    };
    SalaryRange::new(bound(0), bound(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedRandom, SeededRandom};
    use crate::use_cases::completion::testing::ScriptedLlm;

    fn board(llm: Option<Arc<dyn LlmPort>>) -> JobBoard {
        JobBoard::new(llm, Arc::new(SeededRandom::new(42)))
    }

    #[tokio::test]
    async fn count_is_clamped() {
        let board = board(None);
        let candidate = CandidateProfile::default();
        assert_eq!(board.generate(&candidate, 0).await.len(), 1);
        assert_eq!(board.generate(&candidate, 100).await.len(), MAX_JOB_COUNT);
        assert_eq!(board.generate(&candidate, 7).await.len(), 7);
    }

    #[tokio::test]
    async fn mock_listings_satisfy_schema() {
        let listings = board(None).generate(&CandidateProfile::default(), 30).await;
        for listing in &listings {
            let range = listing.position.salary_range;
            assert!(range.lo() <= range.hi());
            assert!((10000..=15000).contains(&range.lo()));
            assert!((1..=5).contains(&listing.company.reputation));
            assert!(listing.position.headcount >= 1);
            assert!(MOCK_TITLES.contains(&listing.position.title.as_str()));
        }
        assert_eq!(listings[3].id, "mock_job_3");
    }

    #[tokio::test]
    async fn parses_model_array_leniently() {
        let llm = ScriptedLlm::replying(
            r#"以下是职位：[
  {"id": "job_a1", "company": {"name": "字节某动", "type": "large", "reputation": 9, "difficulty": "4", "salaryLevel": 5},
   "position": {"title": "后端开发", "salaryRange": [40000, 25000], "requirements": ["Rust", "分布式"], "workType": "hybrid", "headcount": 0, "urgency": "asap"}},
  {"company": {"name": "某小厂"}, "position": {"department": "缺少标题"}},
  {"company": {"name": "草台班子", "type": "weird"}, "position": {"title": "全栈", "salaryRange": ["8000", "12000"]}}
]"#,
        );
        let listings = JobBoard::new(Some(llm), Arc::new(FixedRandom(0, 0.0)))
            .generate(&CandidateProfile::default(), 5)
            .await;

        assert_eq!(listings.len(), 2);
        let first = &listings[0];
        assert_eq!(first.company.kind, CompanyKind::Large);
        assert_eq!(first.company.reputation, 5);
        assert_eq!(first.company.difficulty, 4);
        assert_eq!(
            (first.position.salary_range.lo(), first.position.salary_range.hi()),
            (25000, 40000)
        );
        assert_eq!(first.position.work_type, WorkType::Hybrid);
        assert_eq!(first.position.headcount, 1);
        assert_eq!(first.position.urgency, Urgency::Asap);

        let second = &listings[1];
        assert_eq!(second.company.kind, CompanyKind::Mid);
        assert_eq!(second.id, "job_00000000");
        assert_eq!(second.position.salary_range.hi(), 12000);
    }

    #[tokio::test]
    async fn model_output_is_truncated_to_count() {
        let one = r#"{"company": {"name": "甲"}, "position": {"title": "运营"}}"#;
        let reply = format!("[{one}, {one}, {one}]");
        let listings = JobBoard::new(Some(ScriptedLlm::replying(reply)), Arc::new(FixedRandom(0, 0.0)))
            .generate(&CandidateProfile::default(), 2)
            .await;
        assert_eq!(listings.len(), 2);
    }

    #[tokio::test]
    async fn object_reply_falls_back_to_mocks() {
        let llm = ScriptedLlm::replying(r#"{"error": "no"}"#);
        let listings = JobBoard::new(Some(llm), Arc::new(FixedRandom(0, 0.0)))
            .generate(&CandidateProfile::default(), 4)
            .await;
        assert_eq!(listings.len(), 4);
        assert!(listings[0].id.starts_with("mock_job_"));
    }
}
