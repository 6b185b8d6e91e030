use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path as AxumPath, Query, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use layers::{matches_answer, QuizDeck, QuizKind};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::state::{AppState, MapState, PublishedMap};

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/map/features", get(get_features))
        .route("/map/markers/countries", get(get_country_markers))
        .route("/map/markers/capitals", get(get_capital_markers))
        .route("/map/regions", get(get_regions))
        .route("/map/regions/:view", get(get_region_view))
        .route("/quiz/deck/:kind", get(get_quiz_deck))
        .route("/quiz/answer", post(post_answer))
        .route("/corrections", get(get_corrections))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

fn published(state: &AppState) -> Result<Arc<PublishedMap>, Response> {
    match &state.map {
        MapState::Ready(map) => Ok(map.clone()),
        MapState::Unavailable { .. } => {
            Err((StatusCode::SERVICE_UNAVAILABLE, "data unavailable").into_response())
        }
    }
}

fn json_response<T: Serialize + ?Sized>(value: &T) -> Response {
    let body = match serde_json::to_string(value) {
        Ok(v) => v,
        Err(err) => {
            error!("response serialization failed: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "serialization error").into_response();
        }
    };
    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    (StatusCode::OK, headers, Body::from(body)).into_response()
}

async fn get_features(State(state): State<AppState>) -> Response {
    match published(&state) {
        Ok(map) => json_response(&map.features),
        Err(resp) => resp,
    }
}

async fn get_country_markers(State(state): State<AppState>) -> Response {
    match published(&state) {
        Ok(map) => json_response(&map.map.country_markers),
        Err(resp) => resp,
    }
}

async fn get_capital_markers(State(state): State<AppState>) -> Response {
    match published(&state) {
        Ok(map) => json_response(&map.map.capital_markers),
        Err(resp) => resp,
    }
}

async fn get_regions(State(state): State<AppState>) -> Response {
    let map = match published(&state) {
        Ok(map) => map,
        Err(resp) => return resp,
    };
    let views: Vec<&str> = map.regions.view_names().collect();
    json_response(&json!({
        "default": map.map.filter_regions,
        "views": views,
    }))
}

async fn get_region_view(
    State(state): State<AppState>,
    AxumPath(view): AxumPath<String>,
) -> Response {
    let map = match published(&state) {
        Ok(map) => map,
        Err(resp) => return resp,
    };
    match map.regions.view(&view) {
        Some(codes) => json_response(codes),
        None => (StatusCode::NOT_FOUND, "unknown view").into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeckQuery {
    pub view: Option<String>,
    #[serde(default)]
    pub territories: bool,
}

async fn get_quiz_deck(
    State(state): State<AppState>,
    AxumPath(kind): AxumPath<String>,
    Query(query): Query<DeckQuery>,
) -> Response {
    let map = match published(&state) {
        Ok(map) => map,
        Err(resp) => return resp,
    };
    let kind: QuizKind = match kind.parse() {
        Ok(kind) => kind,
        Err(err) => return (StatusCode::NOT_FOUND, format!("{err}")).into_response(),
    };
    let Some(visible) = map.visible(query.view.as_deref()) else {
        return (StatusCode::NOT_FOUND, "unknown view").into_response();
    };
    let deck = QuizDeck::build(&map.map.entities, visible, kind, query.territories);
    json_response(&deck)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub kind: QuizKind,
    pub alpha3_code: String,
    pub guess: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnswerResponse<'a> {
    correct: bool,
    alpha3_code: &'a str,
    name: &'a str,
}

async fn post_answer(State(state): State<AppState>, Json(req): Json<AnswerRequest>) -> Response {
    let map = match published(&state) {
        Ok(map) => map,
        Err(resp) => return resp,
    };
    let Some(entity) = map
        .index
        .by_alpha3(&req.alpha3_code)
        .and_then(|id| map.map.entities.get(id))
    else {
        return (StatusCode::NOT_FOUND, "unknown entity").into_response();
    };
    json_response(&AnswerResponse {
        correct: matches_answer(req.kind, entity, &req.guess),
        alpha3_code: &req.alpha3_code,
        name: entity.name().unwrap_or_default(),
    })
}

async fn get_corrections(State(state): State<AppState>) -> Response {
    match published(&state) {
        Ok(map) => json_response(&map.corrections),
        Err(resp) => resp,
    }
}
