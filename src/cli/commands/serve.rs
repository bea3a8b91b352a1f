//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for transcription and transcript download.

use crate::audio_source::{fetch_audio, parse_input};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::TranscriptionPipeline;
use crate::storage::TranscriptStore;
use crate::transcription::{OutputFormat, WhisperBackend};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    pipeline: TranscriptionPipeline,
    store: TranscriptStore,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<&str>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve) {
        Output::error(&format!("{}", e));
        Output::info("Run 'skrift doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let host = host.unwrap_or(&settings.server.host).to_string();
    let port = port.unwrap_or(settings.server.port);

    let backend = Arc::new(WhisperBackend::new(&settings.transcription.model)?);
    let pipeline = TranscriptionPipeline::new(backend, &settings.transcription);
    let store = TranscriptStore::new(&settings.data_dir())?;

    let state = Arc::new(AppState {
        pipeline,
        store,
        settings,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/transcribe", post(transcribe))
        .route("/transcripts", get(list_transcripts))
        .route("/download/{media_id}/{format}", get(download))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Skrift API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Transcribe", "POST /transcribe");
    Output::kv("List", "GET  /transcripts");
    Output::kv("Download", "GET  /download/:media_id/:format");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct TranscribeRequest {
    /// YouTube URL/ID or local file path
    input: String,
    /// Language hint for transcription
    #[serde(default)]
    language: Option<String>,
    /// Force re-processing even if a transcript exists
    #[serde(default)]
    force: bool,
}

#[derive(Serialize)]
struct TranscribeResponse {
    media_id: String,
    title: String,
    segment_count: usize,
    character_count: usize,
    duration_seconds: f64,
    processing_time_seconds: f64,
    excerpt: String,
}

#[derive(Serialize)]
struct TranscriptListResponse {
    transcripts: Vec<TranscriptInfo>,
    total: usize,
}

#[derive(Serialize)]
struct TranscriptInfo {
    media_id: String,
    segment_count: usize,
    duration_seconds: f64,
    processed_at: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, msg: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error: msg })).into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn transcribe(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranscribeRequest>,
) -> impl IntoResponse {
    let Some((source, media_id)) = parse_input(&req.input) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Could not parse input: {}", req.input),
        );
    };

    let metadata = match source.fetch_media(&media_id).await {
        Ok(m) => m,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    if state.store.exists(&metadata.id) && !req.force {
        match state.store.load(&metadata.id) {
            Ok(existing) => {
                return Json(TranscribeResponse {
                    media_id: existing.media_id.clone(),
                    title: metadata.title,
                    segment_count: existing.segments.len(),
                    character_count: existing.text.chars().count(),
                    duration_seconds: existing.duration_seconds(),
                    processing_time_seconds: 0.0,
                    excerpt: existing.excerpt(500),
                })
                .into_response();
            }
            Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    }

    let max_duration = state.settings.transcription.max_duration_seconds;
    if let Some(duration) = metadata.duration_seconds {
        if max_duration > 0 && duration > max_duration {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Media duration {}s exceeds the {}s limit", duration, max_duration),
            );
        }
    }

    let temp_dir = state.settings.temp_dir();
    if let Err(e) = std::fs::create_dir_all(&temp_dir) {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    let cookies_file = state
        .settings
        .youtube
        .cookies_file
        .as_deref()
        .map(|p| PathBuf::from(shellexpand::tilde(p).to_string()));

    let audio_path =
        match fetch_audio(&metadata, &temp_dir, req.force, cookies_file.as_deref()).await {
            Ok(p) => p,
            Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

    let language = req.language.as_deref().or_else(|| {
        let lang = state.settings.transcription.language.trim();
        (!lang.is_empty()).then_some(lang)
    });

    let started = std::time::Instant::now();
    let result = state.pipeline.run(&audio_path, &metadata.id, language).await;

    let transcript = match result {
        Ok(t) => t,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    if let Err(e) = state.store.save(&transcript) {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    Json(TranscribeResponse {
        media_id: transcript.media_id.clone(),
        title: metadata.title,
        segment_count: transcript.segments.len(),
        character_count: transcript.text.chars().count(),
        duration_seconds: transcript.duration_seconds(),
        processing_time_seconds: started.elapsed().as_secs_f64(),
        excerpt: transcript.excerpt(500),
    })
    .into_response()
}

async fn list_transcripts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list() {
        Ok(transcripts) => Json(TranscriptListResponse {
            total: transcripts.len(),
            transcripts: transcripts
                .into_iter()
                .map(|t| TranscriptInfo {
                    segment_count: t.segments.len(),
                    duration_seconds: t.duration_seconds(),
                    processed_at: t.processed_at.to_rfc3339(),
                    media_id: t.media_id,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn download(
    State(state): State<Arc<AppState>>,
    Path((media_id, format)): Path<(String, String)>,
) -> impl IntoResponse {
    let output_format: OutputFormat = match format.parse() {
        Ok(f) => f,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    let path = state.store.path_for(&media_id, output_format);

    match tokio::fs::read(&path).await {
        Ok(content) => {
            let filename = format!("{}.{}", media_id, output_format.extension());
            (
                [
                    (header::CONTENT_TYPE, output_format.mime_type().to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                content,
            )
                .into_response()
        }
        Err(_) => error_response(
            StatusCode::NOT_FOUND,
            format!("No {} transcript found for '{}'", output_format, media_id),
        ),
    }
}
