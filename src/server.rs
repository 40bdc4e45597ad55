use crate::app::{self, App, LocateOutcome, SelectionReport, LOCATION_NOT_FOUND};
use crate::config::{AppConfig, ViewConfig};
use crate::data::Datasets;
use crate::error::ResolutionMiss;
use crate::geocoder::{GeocodeCandidate, Geocoder};
use crate::info::InfoResult;
use crate::search::{SearchDebouncer, SearchOutcome};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub struct ServerState<G> {
    pub app: Mutex<App>,
    pub geocoder: G,
    pub search: SearchDebouncer,
}

impl<G: Geocoder> ServerState<G> {
    pub fn new(app: App, geocoder: G, search: SearchDebouncer) -> Self {
        Self {
            app: Mutex::new(app),
            geocoder,
            search,
        }
    }
}

#[derive(Deserialize)]
pub struct QueryParams {
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
pub struct QueryResponse {
    region: String,
    info: InfoResult,
}

#[derive(Deserialize)]
pub struct SelectRequest {
    name: String,
}

#[derive(Deserialize)]
pub struct PointRequest {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
pub struct LocateRequest {
    query: String,
}

pub async fn start_server<G: Geocoder>(
    config: AppConfig,
    datasets: Datasets,
    geocoder: G,
) -> Result<()> {
    let search = SearchDebouncer::new(
        Duration::from_millis(config.geocoder.debounce_ms),
        config.geocoder.min_query_chars,
    );
    let app = App::new(datasets, config.view.clone());
    let state = Arc::new(ServerState::new(app, geocoder, search));

    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    info!("Starting server on http://{}", addr);

    let app = router(state, &config.server.static_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router<G: Geocoder>(state: Arc<ServerState<G>>, static_dir: &std::path::Path) -> Router {
    Router::new()
        .route("/api/view", get(view_handler::<G>))
        .route("/api/regions", get(regions_handler::<G>))
        .route("/api/query", get(query_handler::<G>))
        .route("/api/selection", get(selection_handler::<G>))
        .route("/api/select", post(select_handler::<G>))
        .route("/api/select/point", post(select_point_handler::<G>))
        .route("/api/select/candidate", post(select_candidate_handler::<G>))
        .route("/api/clear", post(clear_handler::<G>))
        .route("/api/info/:name", get(info_handler::<G>))
        .route("/api/suggest", get(suggest_handler::<G>))
        .route("/api/locate", post(locate_handler::<G>))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn view_handler<G: Geocoder>(State(state): State<Arc<ServerState<G>>>) -> Json<ViewConfig> {
    Json(state.app.lock().await.view_config().clone())
}

async fn regions_handler<G: Geocoder>(
    State(state): State<Arc<ServerState<G>>>,
) -> Json<FeatureCollection> {
    Json(state.app.lock().await.regions())
}

/// Resolve a coordinate without touching the selection.
async fn query_handler<G: Geocoder>(
    State(state): State<Arc<ServerState<G>>>,
    Query(params): Query<QueryParams>,
) -> Json<Option<QueryResponse>> {
    let app = state.app.lock().await;

    let response = app.resolve(params.lat, params.lon).map(|region| QueryResponse {
        region: region.to_string(),
        info: app.info_for(region),
    });

    Json(response)
}

async fn selection_handler<G: Geocoder>(
    State(state): State<Arc<ServerState<G>>>,
) -> Json<SelectionReport> {
    Json(state.app.lock().await.report())
}

async fn select_handler<G: Geocoder>(
    State(state): State<Arc<ServerState<G>>>,
    Json(request): Json<SelectRequest>,
) -> Json<SelectionReport> {
    Json(state.app.lock().await.select_region(&request.name))
}

async fn select_point_handler<G: Geocoder>(
    State(state): State<Arc<ServerState<G>>>,
    Json(request): Json<PointRequest>,
) -> Json<LocateOutcome> {
    let result = state.app.lock().await.select_point(request.lat, request.lon);
    Json(outcome(result))
}

async fn select_candidate_handler<G: Geocoder>(
    State(state): State<Arc<ServerState<G>>>,
    Json(candidate): Json<GeocodeCandidate>,
) -> Json<LocateOutcome> {
    let result = state.app.lock().await.select_candidate(&candidate);
    Json(outcome(result))
}

async fn clear_handler<G: Geocoder>(State(state): State<Arc<ServerState<G>>>) -> Json<SelectionReport> {
    Json(state.app.lock().await.clear())
}

async fn info_handler<G: Geocoder>(
    State(state): State<Arc<ServerState<G>>>,
    Path(name): Path<String>,
) -> Json<InfoResult> {
    Json(state.app.lock().await.info_for(&name))
}

async fn suggest_handler<G: Geocoder>(
    State(state): State<Arc<ServerState<G>>>,
    Query(params): Query<SuggestParams>,
) -> Json<SearchOutcome> {
    Json(state.search.submit(&state.geocoder, &params.q).await)
}

async fn locate_handler<G: Geocoder>(
    State(state): State<Arc<ServerState<G>>>,
    Json(request): Json<LocateRequest>,
) -> Json<LocateOutcome> {
    Json(app::locate(&state.app, &state.geocoder, &request.query).await)
}

fn outcome(result: Result<SelectionReport, ResolutionMiss>) -> LocateOutcome {
    match result {
        Ok(report) => LocateOutcome::Selected(report),
        Err(_) => LocateOutcome::NotFound {
            notice: LOCATION_NOT_FOUND,
        },
    }
}
