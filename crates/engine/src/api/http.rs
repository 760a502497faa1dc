//! HTTP routes.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use officesbx_domain::{
    ActionOutcome, CandidateProfile, ChatTurn, CompanyBrief, DailyTasks, DomainError,
    EventRequestKind, InterviewMode, InterviewQuestion, InterviewRound, JobBrief, JobListing,
    MarketSnapshot, NpcProfile, NpcReply, PlayerInfo, WorkplaceEvent, WorkplaceStatus,
};

use crate::app::App;
use crate::infrastructure::clock::local_timestamp;
use crate::use_cases::jobs::DEFAULT_JOB_COUNT;
use crate::use_cases::{
    ActionInput, ChatError, ChatInput, EventInput, InterviewInput, InterviewStreamEvent,
};

const SERVICE_NAME: &str = "职场沙盒 API";

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(status))
        .route("/api/status", get(status))
        .route("/api/npcs", get(list_npcs))
        .route("/api/chat", post(chat))
        .route("/api/tasks", post(daily_tasks))
        .route("/api/market", get(market))
        .route("/api/jobs/generate", post(generate_jobs))
        .route("/api/interview/question", post(interview_question))
        .route("/api/interview/question/stream", post(interview_question_stream))
        .route("/api/action", post(player_action))
        .route("/api/event", post(workplace_event))
}

// =============================================================================
// Request / response bodies
// =============================================================================

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    service: &'static str,
    timestamp: String,
    ai_available: bool,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    npc_name: String,
    player_message: String,
    #[serde(default)]
    conversation_history: Vec<ChatTurn>,
    #[serde(default)]
    player_info: Option<PlayerInfo>,
    #[serde(default)]
    workplace_status: Option<WorkplaceStatus>,
}

#[derive(Debug, Deserialize)]
struct TasksRequest {
    player_info: PlayerInfo,
    #[serde(default = "default_current_time")]
    current_time: String,
}

fn default_current_time() -> String {
    "09:00".to_string()
}

#[derive(Debug, Deserialize)]
struct JobsRequest {
    #[serde(default)]
    player_resume: CandidateProfile,
    #[serde(default = "default_job_count")]
    count: i64,
}

fn default_job_count() -> i64 {
    DEFAULT_JOB_COUNT as i64
}

#[derive(Debug, Deserialize)]
struct InterviewRequest {
    #[serde(default)]
    player_info: CandidateProfile,
    #[serde(default)]
    company_info: CompanyBrief,
    #[serde(default)]
    job_info: JobBrief,
    #[serde(default)]
    round_info: InterviewRound,
    #[serde(default)]
    conversation_history: Vec<ChatTurn>,
    #[serde(default = "default_interview_action")]
    action: String,
}

fn default_interview_action() -> String {
    "full".to_string()
}

impl From<InterviewRequest> for InterviewInput {
    fn from(req: InterviewRequest) -> Self {
        InterviewInput {
            candidate: req.player_info,
            company: req.company_info,
            job: req.job_info,
            round: req.round_info,
            history: req.conversation_history,
            mode: InterviewMode::from_action(&req.action),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ActionRequest {
    action: String,
    #[serde(default)]
    player_info: Option<PlayerInfo>,
    #[serde(default)]
    workplace_status: Option<WorkplaceStatus>,
    #[serde(default)]
    visible_objects: Vec<String>,
    #[serde(default)]
    visible_npcs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EventRequest {
    #[serde(default)]
    player_info: Option<PlayerInfo>,
    #[serde(default)]
    workplace_status: Option<WorkplaceStatus>,
    #[serde(default = "default_event_type")]
    event_type: String,
}

fn default_event_type() -> String {
    "random".to_string()
}

fn validate_player(player: Option<&PlayerInfo>) -> Result<(), ApiError> {
    match player {
        Some(player) => Ok(player.validate()?),
        None => Ok(()),
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn status(State(app): State<Arc<App>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "running",
        service: SERVICE_NAME,
        timestamp: local_timestamp(app.clock.now()),
        ai_available: app.ai_available(),
    })
}

async fn list_npcs(State(app): State<Arc<App>>) -> Json<Vec<NpcProfile>> {
    Json(app.roster.iter().cloned().collect())
}

async fn chat(
    State(app): State<Arc<App>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<NpcReply>, ApiError> {
    validate_player(req.player_info.as_ref())?;
    let reply = app
        .use_cases
        .chat
        .reply(ChatInput {
            npc_name: req.npc_name,
            player_message: req.player_message,
            history: req.conversation_history,
            player: req.player_info,
            status: req.workplace_status,
        })
        .await?;
    Ok(Json(reply))
}

async fn daily_tasks(
    State(app): State<Arc<App>>,
    Json(req): Json<TasksRequest>,
) -> Result<Json<DailyTasks>, ApiError> {
    validate_player(Some(&req.player_info))?;
    let tasks = app
        .use_cases
        .tasks
        .plan(&req.player_info, &req.current_time)
        .await;
    Ok(Json(tasks))
}

async fn market(State(app): State<Arc<App>>) -> Json<MarketSnapshot> {
    Json(app.use_cases.market.snapshot())
}

async fn generate_jobs(
    State(app): State<Arc<App>>,
    Json(req): Json<JobsRequest>,
) -> Json<Vec<JobListing>> {
    // Negative counts clamp up to the minimum inside the board.
    let count = usize::try_from(req.count).unwrap_or(0);
    Json(app.use_cases.jobs.generate(&req.player_resume, count).await)
}

async fn interview_question(
    State(app): State<Arc<App>>,
    Json(req): Json<InterviewRequest>,
) -> Json<InterviewQuestion> {
    let input = InterviewInput::from(req);
    Json(app.use_cases.interview.generate(&input).await)
}

/// Streams raw model text as `delta` events, then one unnamed frame holding
/// the parsed question.
async fn interview_question_stream(
    State(app): State<Arc<App>>,
    Json(req): Json<InterviewRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let input = InterviewInput::from(req);
    let stream = app.use_cases.interview.generate_stream(&input).await;
    Sse::new(stream.map(|event| Ok(sse_frame(event))))
}

fn sse_frame(event: InterviewStreamEvent) -> Event {
    match event {
        InterviewStreamEvent::Delta(text) => Event::default().event("delta").data(text),
        InterviewStreamEvent::Done(question) => match Event::default().json_data(&question) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode final interview frame");
                Event::default().data("{}")
            }
        },
    }
}

async fn player_action(
    State(app): State<Arc<App>>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<ActionOutcome>, ApiError> {
    validate_player(req.player_info.as_ref())?;
    let input = ActionInput {
        action: req.action,
        player: req.player_info,
        status: req.workplace_status,
        visible_objects: req.visible_objects,
        visible_npcs: req.visible_npcs,
    };
    Ok(Json(app.use_cases.action.interpret(&input).await))
}

async fn workplace_event(
    State(app): State<Arc<App>>,
    Json(req): Json<EventRequest>,
) -> Result<Json<WorkplaceEvent>, ApiError> {
    validate_player(req.player_info.as_ref())?;
    let input = EventInput {
        player: req.player_info,
        status: req.workplace_status,
        request: EventRequestKind::parse(&req.event_type),
    };
    Ok(Json(app.use_cases.event.generate(&input).await))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::NpcNotFound(_) => ApiError::NotFound(e.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) => ApiError::BadRequest(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request},
    };
    use chrono::{Local, TimeZone};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use officesbx_domain::NpcRoster;

    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::config::EngineConfig;
    use crate::infrastructure::ports::LlmPort;
    use crate::use_cases::completion::testing::ScriptedLlm;

    fn router(llm: Option<Arc<dyn LlmPort>>) -> Router {
        let config = EngineConfig::from_lookup(|_| None).unwrap();
        let now = Local
            .with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
            .single()
            .unwrap();
        let app = App::with_ports(
            config,
            NpcRoster::office_default(),
            llm,
            Arc::new(FixedClock(now)),
            Arc::new(FixedRandom(0, 0.0)),
        );
        routes().with_state(Arc::new(app))
    }

    async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        router.oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    fn player() -> Value {
        json!({"name": "小明", "position": "实习生", "money": 5000, "day": 3})
    }

    #[tokio::test]
    async fn status_reports_fallback_mode() {
        for uri in ["/", "/api/status"] {
            let response = send(router(None), Method::GET, uri, None).await;
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response).await;
            assert_eq!(body["status"], "running");
            assert_eq!(body["service"], SERVICE_NAME);
            assert_eq!(body["ai_available"], false);
            assert_eq!(body["timestamp"], "2025-03-14T09:30:00.000000");
        }
    }

    #[tokio::test]
    async fn unknown_npc_is_404_with_detail() {
        let response = send(
            router(None),
            Method::POST,
            "/api/chat",
            Some(json!({"npc_name": "赵总", "player_message": "你好"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "NPC 赵总 不存在");
    }

    #[tokio::test]
    async fn chat_survives_malformed_model_output() {
        let llm: Arc<dyn LlmPort> = ScriptedLlm::replying("");
        let response = send(
            router(Some(llm)),
            Method::POST,
            "/api/chat",
            Some(json!({
                "npc_name": "李同事",
                "player_message": "今天忙吗",
                "conversation_history": [{"role": "user", "content": "早"}],
                "player_info": player(),
                "workplace_status": {"kpi": 80}
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["emotion"], "neutral");
        assert!(!body["npc_response"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_player_is_400() {
        let response = send(
            router(None),
            Method::POST,
            "/api/tasks",
            Some(json!({"player_info": {"name": "小明", "money": -1}})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().unwrap().contains("money"));
    }

    #[tokio::test]
    async fn missing_required_field_is_rejected() {
        let response = send(router(None), Method::POST, "/api/tasks", Some(json!({}))).await;
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn tasks_fallback_has_message() {
        let response = send(
            router(None),
            Method::POST,
            "/api/tasks",
            Some(json!({"player_info": player()})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["tasks"].as_array().unwrap().len(), 3);
        assert!(body["daily_message"].is_string());
    }

    #[tokio::test]
    async fn job_count_is_clamped() {
        let response = send(
            router(None),
            Method::POST,
            "/api/jobs/generate",
            Some(json!({"player_resume": {"name": "小红"}, "count": 100})),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 30);

        let response = send(
            router(None),
            Method::POST,
            "/api/jobs/generate",
            Some(json!({"count": -4})),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn market_lists_quotes() {
        let response = send(router(None), Method::GET, "/api/market", None).await;
        let body = body_json(response).await;
        assert_eq!(body["stocks"].as_array().unwrap().len(), 3);
        assert_eq!(body["funds"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn interview_opening_without_model() {
        let response = send(
            router(None),
            Method::POST,
            "/api/interview/question",
            Some(json!({"action": "question"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["display_type"], "自我介绍");
        assert!(body.get("analysis").is_none());
    }

    #[tokio::test]
    async fn interview_stream_sends_deltas_then_result() {
        let llm: Arc<dyn LlmPort> = ScriptedLlm::replying(
            r#"{"question": "讲讲你做过的项目", "sample_answer": "我负责过支付系统", "type": "technical", "display_type": "技术题"}"#,
        );
        let response = send(
            router(Some(llm)),
            Method::POST,
            "/api/interview/question/stream",
            Some(json!({"action": "question"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));

        let text = body_text(response).await;
        assert!(text.contains("event: delta"));
        let last = text
            .split("\n\n")
            .filter(|frame| !frame.trim().is_empty())
            .last()
            .unwrap();
        assert!(!last.contains("event:"));
        let payload: Value = serde_json::from_str(last.trim_start_matches("data: ")).unwrap();
        assert_eq!(payload["question"], "讲讲你做过的项目");
    }

    #[tokio::test]
    async fn throw_scenario_over_http() {
        let response = send(
            router(None),
            Method::POST,
            "/api/action",
            Some(json!({
                "action": "摔水杯砸李同事",
                "visible_objects": ["水杯"],
                "visible_npcs": ["李同事", "张经理"]
            })),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["feasible"], true);
        assert_eq!(body["state_changes"]["stress"], 50);
        assert_eq!(body["npc_reactions"]["李同事"], "hurt");
    }

    #[tokio::test]
    async fn event_honours_requested_type() {
        let response = send(
            router(None),
            Method::POST,
            "/api/event",
            Some(json!({"event_type": "crisis"})),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["type"], "crisis");
        assert!(!body["choices"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn npcs_lists_roster() {
        let response = send(router(None), Method::GET, "/api/npcs", None).await;
        let body = body_json(response).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|npc| npc["name"].as_str())
            .collect();
        assert!(names.contains(&"李同事"));
        assert!(names.contains(&"张经理"));
    }
}
