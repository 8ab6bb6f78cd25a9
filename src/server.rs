use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tower_http::services::{ServeDir, ServeFile};

use crate::api::{ApiAnalyzeRequest, ApiKeywordRequest, ApiResearchRequest, ApiResearchResponse};
use crate::completion::CompletionClient;
use crate::research::run_research;
use crate::video_api::VideoApiClient;
use trendscope::config::AppConfig;
use trendscope::keywords::{KeywordOpportunity, OpportunityScorer};
use trendscope::{analyze_videos_at, now_epoch_secs, AnalysisResult};

#[derive(Clone)]
struct AppState {
    completion: Option<CompletionClient>,
    video_api: Option<VideoApiClient>,
    config: AppConfig,
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<StreamEvent>>>>,
}

#[derive(Clone, Serialize)]
struct StreamEvent {
    event: String,
    message: String,
    timestamp_ms: u128,
}

#[derive(serde::Deserialize)]
struct StreamQuery {
    request_id: String,
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

// How long a finished (or failed) research keeps its channel alive so late
// stream subscribers still see the tail of the events.
const FINISHED_CHANNEL_LINGER: Duration = Duration::from_secs(10);
// Channels created by a stream subscription that never matches a research
// call are swept after this, so the map cannot grow under bad input.
const ORPHAN_CHANNEL_TTL: Duration = Duration::from_secs(900);

pub async fn serve(args: crate::ServeArgs) -> Result<(), String> {
    let config = AppConfig::load(None).map(|(config, _)| config).unwrap_or_default();
    let state = AppState {
        completion: CompletionClient::from_env(None),
        video_api: VideoApiClient::from_env(),
        config,
        channels: Arc::new(Mutex::new(HashMap::new())),
    };

    let web_root = args.web_root;
    let index_path = format!("{}/index.html", web_root.trim_end_matches('/'));
    let static_service = ServeDir::new(web_root).not_found_service(ServeFile::new(index_path));

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/keyword", post(keyword_handler))
        .route("/api/research", post(research_handler))
        .route("/api/research/stream", get(stream_handler))
        .nest_service("/", static_service)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| format!("failed to bind server: {}", err))?,
        app,
    )
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiAnalyzeRequest>,
) -> Result<Json<AnalysisResult>, (StatusCode, String)> {
    let sort_by = request
        .sort_by()
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;

    let mut analyzer_config = state.config.analyzer.clone();
    if let Some(top_hashtags) = request.top_hashtags {
        analyzer_config.top_hashtags = top_hashtags;
    }

    let result = analyze_videos_at(&request.items, sort_by, now_epoch_secs(), &analyzer_config);
    Ok(Json(result))
}

async fn keyword_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiKeywordRequest>,
) -> Result<Json<KeywordOpportunity>, (StatusCode, String)> {
    let keyword = request
        .keyword()
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let video_api = state.video_api.as_ref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "video API not configured: set RAPIDAPI_KEY".to_string(),
    ))?;

    let observation = video_api
        .observe_keyword(keyword)
        .await
        .map_err(|err| (StatusCode::BAD_GATEWAY, err))?;
    let scorer = OpportunityScorer::new(state.config.keywords.clone());
    Ok(Json(scorer.score(&observation)))
}

async fn research_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiResearchRequest>,
) -> Result<Json<ApiResearchResponse>, (StatusCode, String)> {
    let content = request
        .content()
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let completion = state.completion.as_ref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "AI completion not configured: set AI_API_KEY".to_string(),
    ))?;
    let video_api = state.video_api.as_ref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "video API not configured: set RAPIDAPI_KEY".to_string(),
    ))?;

    let request_id = request
        .request_id
        .clone()
        .unwrap_or_else(generate_request_id);
    let max_keywords = request
        .max_keywords
        .unwrap_or(state.config.keywords.max_keywords);

    let sender = get_or_create_channel(&state, &request_id).await;
    let report = run_research(
        completion,
        video_api,
        &state.config.keywords,
        content,
        max_keywords,
        |event, message| send_event(&sender, event, message),
    )
    .await
    .map_err(|err| {
        send_event(&sender, "error", &err);
        schedule_cleanup(
            state.channels.clone(),
            request_id.clone(),
            FINISHED_CHANNEL_LINGER,
        );
        (StatusCode::BAD_GATEWAY, err)
    })?;

    schedule_cleanup(
        state.channels.clone(),
        request_id.clone(),
        FINISHED_CHANNEL_LINGER,
    );

    let warnings = report.errors.clone();
    Ok(Json(ApiResearchResponse {
        request_id,
        report,
        warnings,
    }))
}

async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>, StatusCode>
{
    let sender = get_or_create_channel(&state, &query.request_id).await;
    let receiver = sender.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|event| match event {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data)))
        }
        Err(_) => None,
    });

    send_event(&sender, "connected", "Streaming research progress");
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(8))))
}

async fn get_or_create_channel(
    state: &AppState,
    request_id: &str,
) -> broadcast::Sender<StreamEvent> {
    let mut guard = state.channels.lock().await;
    if let Some(sender) = guard.get(request_id) {
        return sender.clone();
    }
    let (sender, _) = broadcast::channel(32);
    guard.insert(request_id.to_string(), sender.clone());
    schedule_cleanup(
        state.channels.clone(),
        request_id.to_string(),
        ORPHAN_CHANNEL_TTL,
    );
    sender
}

fn send_event(sender: &broadcast::Sender<StreamEvent>, event: &str, message: &str) {
    let _ = sender.send(StreamEvent {
        event: event.to_string(),
        message: message.to_string(),
        timestamp_ms: now_ms(),
    });
}

fn schedule_cleanup(
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<StreamEvent>>>>,
    request_id: String,
    delay: Duration,
) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let mut guard = channels.lock().await;
        guard.remove(&request_id);
    });
}

fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{}", now_ms(), counter)
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}
