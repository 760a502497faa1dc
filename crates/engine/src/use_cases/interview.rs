//! AI interviewer: next question, critique of the last answer, or both.
//!
//! The streaming variant forwards raw model text as it arrives and finishes
//! with the parsed question, so the client can show progress while the
//! model is still writing.

use std::sync::Arc;

use futures_util::stream::{self, BoxStream, StreamExt};

use officesbx_domain::coerce::as_text;
use officesbx_domain::{
    CandidateProfile, ChatTurn, CompanyBrief, InterviewMode, InterviewQuestion, InterviewRound,
    JobBrief,
};

use crate::infrastructure::ports::{choose, ChatMessage, LlmPort, LlmStream, RandomPort};
use crate::prompt_templates::{self, PromptKind, INTERVIEW_OPENING_PROMPT};

use super::completion::{complete, complete_stream};
use super::response_parser::{extract_json, JsonKind};

const FALLBACK_ANALYSIS: &str =
    "回答思路基本清晰，但缺少具体案例和数据支撑。建议用“情境-任务-行动-结果”的结构，突出你个人的贡献。";

/// (question, type, display_type, sample answer)
const FALLBACK_POOL: &[(&str, &str, &str, &str)] = &[
    (
        "你为什么从上一家公司离职？",
        "stress",
        "离职原因",
        "我在上一家公司工作了两年，主要负责后端开发。虽然团队很好，但我希望接触更多高并发架构的挑战，而贵公司的业务规模正是我向往的。",
    ),
    (
        "你觉得自己最大的缺点是什么？",
        "stress",
        "自我认知",
        "我有时候对自己要求过于完美，导致项目初期进度较慢。现在我会设定明确的时间节点，在保证质量的前提下优先完成核心功能。",
    ),
    (
        "如果领导的决定明显是错的，你会怎么做？",
        "behavioral",
        "价值观",
        "我会先私下与领导沟通，用数据和事实说明我的顾虑。如果领导坚持，我会保留意见并全力执行，同时做好风险预案。",
    ),
    (
        "描述一次你和同事发生冲突的经历",
        "behavioral",
        "冲突处理",
        "之前在API接口定义上和前端同事有分歧。我通过画时序图梳理了业务流程，发现是我们对需求理解不一致。统一认知后，问题很快就解决了。",
    ),
];

#[derive(Debug, Clone, Default)]
pub struct InterviewInput {
    pub candidate: CandidateProfile,
    pub company: CompanyBrief,
    pub job: JobBrief,
    pub round: InterviewRound,
    pub history: Vec<ChatTurn>,
    pub mode: InterviewMode,
}

/// One item of a streamed interview turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewStreamEvent {
    /// Raw model text, in arrival order.
    Delta(String),
    /// Always the last item.
    Done(InterviewQuestion),
}

pub type InterviewStream = BoxStream<'static, InterviewStreamEvent>;

pub struct InterviewCoach {
    llm: Option<Arc<dyn LlmPort>>,
    random: Arc<dyn RandomPort>,
}

impl InterviewCoach {
    pub fn new(llm: Option<Arc<dyn LlmPort>>, random: Arc<dyn RandomPort>) -> Self {
        Self { llm, random }
    }

    pub async fn generate(&self, input: &InterviewInput) -> InterviewQuestion {
        let (system_prompt, messages) = build_prompt(input);

        if let Some(raw) =
            complete(self.llm.as_ref(), PromptKind::Interview, system_prompt, messages).await
        {
            if let Some(question) = parse_question(&raw, input.mode) {
                tracing::info!(mode = ?input.mode, kind = %question.kind, "Generated interview turn");
                return question;
            }
            tracing::warn!(mode = ?input.mode, "Unusable interview reply, using fallback");
        }

        self.fallback_question(input)
    }

    /// Stream deltas, then the parsed question. Dropping the stream drops the
    /// upstream request.
    pub async fn generate_stream(&self, input: &InterviewInput) -> InterviewStream {
        let fallback = self.fallback_question(input);
        let (system_prompt, messages) = build_prompt(input);
        let upstream =
            complete_stream(self.llm.as_ref(), PromptKind::Interview, system_prompt, messages)
                .await;

        let state = StreamState {
            upstream,
            buffer: String::new(),
            mode: input.mode,
            fallback: Some(fallback),
        };

        stream::unfold(state, |mut state| async move {
            let fallback = state.fallback.take()?;

            if let Some(upstream) = state.upstream.as_mut() {
                match upstream.next().await {
                    Some(Ok(delta)) => {
                        state.buffer.push_str(&delta);
                        state.fallback = Some(fallback);
                        return Some((InterviewStreamEvent::Delta(delta), state));
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Interview stream broke off, using fallback");
                        state.buffer.clear();
                    }
                    None => {}
                }
                state.upstream = None;
            }

            let question = match parse_question(&state.buffer, state.mode) {
                Some(question) => question,
                None => {
                    if !state.buffer.is_empty() {
                        tracing::warn!(mode = ?state.mode, "Unusable streamed reply, using fallback");
                    }
                    fallback
                }
            };
            Some((InterviewStreamEvent::Done(question), state))
        })
        .boxed()
    }

    fn fallback_question(&self, input: &InterviewInput) -> InterviewQuestion {
        if input.mode == InterviewMode::Analysis {
            return InterviewQuestion::analysis_only(FALLBACK_ANALYSIS);
        }

        if input.history.is_empty() {
            return self_introduction(&input.candidate);
        }

        let (question, kind, display, sample) = choose(self.random.as_ref(), FALLBACK_POOL)
            .copied()
            .unwrap_or(FALLBACK_POOL[0]);
        let fallback = InterviewQuestion::new(question, sample, kind, display);
        if input.mode.wants_analysis() {
            fallback.with_analysis(FALLBACK_ANALYSIS)
        } else {
            fallback
        }
    }
}

struct StreamState {
    upstream: Option<LlmStream>,
    buffer: String,
    mode: InterviewMode,
    /// Taken when the final item is emitted.
    fallback: Option<InterviewQuestion>,
}

fn build_prompt(input: &InterviewInput) -> (String, Vec<ChatMessage>) {
    let system_prompt = prompt_templates::interview_system_prompt(
        input.mode,
        &input.candidate,
        &input.company,
        &input.job,
        &input.round,
    );
    let mut messages = prompt_templates::history_messages(&input.history, input.mode.history_limit());
    if messages.is_empty() {
        messages.push(ChatMessage::user(INTERVIEW_OPENING_PROMPT));
    }
    (system_prompt, messages)
}

fn parse_question(raw: &str, mode: InterviewMode) -> Option<InterviewQuestion> {
    let value = extract_json(raw, JsonKind::Object)?;
    let text = |key: &str| value.get(key).and_then(as_text);

    if mode == InterviewMode::Analysis {
        return text("analysis").map(InterviewQuestion::analysis_only);
    }

    let question = InterviewQuestion::new(
        text("question")?,
        text("sample_answer").unwrap_or_default(),
        text("type")
            .map(|kind| question_kind(&kind))
            .unwrap_or_else(|| "behavioral".to_string()),
        text("display_type").unwrap_or_else(|| "综合问题".to_string()),
    );

    match text("analysis") {
        Some(analysis) if mode.wants_analysis() => Some(question.with_analysis(analysis)),
        _ => Some(question),
    }
}

/// Older clients call pressure questions `trap`.
fn question_kind(raw: &str) -> String {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trap" => "stress".to_string(),
        other => other.to_string(),
    }
}

fn self_introduction(candidate: &CandidateProfile) -> InterviewQuestion {
    let skills = if candidate.skills.is_empty() {
        "相关技术".to_string()
    } else {
        candidate
            .skills
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    InterviewQuestion::new(
        "请简单介绍一下你自己。",
        format!(
            "您好，我叫{}，有{}年工作经验，毕业于{}，{}专业。我的技术栈包括{}。在之前的工作中，我主要负责核心业务模块的开发，具备较强的解决问题能力和团队合作精神。",
            candidate.name, candidate.experience, candidate.school, candidate.major, skills
        ),
        "personal",
        "自我介绍",
    )
}
