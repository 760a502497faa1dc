//! Office Sandbox Engine - Main entry point.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use officesbx_engine::api;
use officesbx_engine::infrastructure::{
    config::EngineConfig, openai::OpenAiCompatClient, ports::LlmPort,
};
use officesbx_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be started from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "officesbx_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Office Sandbox Engine");

    let config = EngineConfig::from_env()?;

    let llm: Option<Arc<dyn LlmPort>> = match &config.llm {
        Some(llm_config) => {
            let client = OpenAiCompatClient::new(llm_config)?;
            tracing::info!(
                model = client.model(),
                base_url = %llm_config.base_url,
                timeout_secs = llm_config.timeout_secs,
                "Completion API configured"
            );
            let client: Arc<dyn LlmPort> = Arc::new(client);
            Some(client)
        }
        None => {
            tracing::warn!("MODELSCOPE_API_KEY not set, serving local fallbacks only");
            None
        }
    };

    let addr = config.socket_addr()?;
    let cors = build_cors_layer(config.cors_allowed_origins.as_deref());
    let app = Arc::new(App::new(config, llm));

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors {
        router = router.layer(cors);
    }

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
