//! HTTP boundary for the cherry-asset pipeline.
//!
//! The server is a thin layer: `GET /data` triggers a full pipeline run
//! over the configured dataset files and returns the refreshed collection;
//! the city-code route only reads what is already stored. The pipeline
//! itself stays ignorant of HTTP.
//!
//! # API Endpoints
//!
//! | Method | Path               | Description                              |
//! |--------|--------------------|------------------------------------------|
//! | GET    | `/health`          | Health check                             |
//! | GET    | `/data`            | Run the pipeline, return all records     |
//! | GET    | `/data/{citycode}` | Look up one stored record by `cityCode`  |
//! | GET    | `/api/logs`        | SSE stream for real-time pipeline logs   |

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{error_response, DataResponse};
use crate::config::Config;
use crate::pipeline::{run_pipeline, PipelineReport};
use crate::store::{records_to_documents, RecordStore};

/// Shared handler state: the configuration and the record store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn RecordStore>,
}

type HandlerError = (StatusCode, Json<Value>);

/// Start the HTTP server with the given configuration and store.
pub async fn start_server(
    config: Config,
    store: Arc<dyn RecordStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.port;
    let state = AppState { config: Arc::new(config), store };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/data", get(get_data))
        .route("/data/{citycode}", get(get_data_by_city_code))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("Cherryload server running on http://localhost:{}", port);
    println!("   GET  /data            - Run pipeline, fetch all records");
    println!("   GET  /data/{{citycode}} - Look up one stored record");
    println!("   GET  /api/logs        - SSE log stream");
    println!("   GET  /health          - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "cherryload",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "data": "GET /data",
            "dataByCityCode": "GET /data/{citycode}",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Refresh the collection and return every record.
async fn get_data(State(state): State<AppState>) -> Result<Json<DataResponse>, HandlerError> {
    let report = run_pipeline_blocking(&state).await?;

    let records = state
        .store
        .fetch_all(&state.config.collection)
        .map_err(|e| internal_error(&e.to_string()))?;

    Ok(Json(DataResponse::new(&report, records_to_documents(&records))))
}

/// Return the first stored record matching `citycode`. Read-only: the
/// collection is whatever the last pipeline run left behind.
async fn get_data_by_city_code(
    State(state): State<AppState>,
    Path(citycode): Path<String>,
) -> Result<Json<Value>, HandlerError> {
    let record = state
        .store
        .find_by_city_code(&state.config.collection, &citycode)
        .map_err(|e| internal_error(&e.to_string()))?;

    match record {
        Some(record) => serde_json::to_value(&record)
            .map(Json)
            .map_err(|e| internal_error(&e.to_string())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(error_response(&format!("No record with cityCode '{}'", citycode))),
        )),
    }
}

/// Run the synchronous pipeline off the async runtime.
async fn run_pipeline_blocking(state: &AppState) -> Result<PipelineReport, HandlerError> {
    let config = Arc::clone(&state.config);
    let store = Arc::clone(&state.store);

    tokio::task::spawn_blocking(move || run_pipeline(&config, store.as_ref()))
        .await
        .map_err(|e| internal_error(&format!("Pipeline task failed: {}", e)))?
        .map_err(|e| {
            eprintln!("Pipeline error: {}", e);
            internal_error(&e.to_string())
        })
}

fn internal_error(message: &str) -> HandlerError {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response(message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OutputRecord, Ownership};
    use crate::store::InMemoryStore;

    fn record(city: &str) -> OutputRecord {
        OutputRecord {
            cherry_asset_id: format!("1-{}-A-3-12", city),
            city_code: city.into(),
            catasto: "A".into(),
            sezione: String::new(),
            foglio: "3".into(),
            particella: "12".into(),
            subalterno: "5".into(),
            ownerships: Ownership {
                entity_id: "9".into(),
                vat_code: "V1".into(),
                tax_code: "T1".into(),
                ownership_share: Some(0.5),
            },
        }
    }

    fn state_with(records: Vec<OutputRecord>) -> AppState {
        let config = Config::default();
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        store.insert_many(&config.collection, records).unwrap();
        AppState { config: Arc::new(config), store }
    }

    #[tokio::test]
    async fn test_city_code_lookup_reads_stored_state_only() {
        // No dataset files exist here: the lookup must not run the pipeline,
        // only read the collection as-is.
        let state = state_with(vec![record("H211"), record("F205")]);

        let response = get_data_by_city_code(State(state.clone()), Path("F205".into()))
            .await
            .unwrap();
        assert_eq!(response.0["cityCode"], "F205");
        assert_eq!(response.0["cherry_asset_id"], "1-F205-A-3-12");

        // The collection is untouched by the lookup.
        let kept = state.store.fetch_all(&state.config.collection).unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].city_code, "H211");
    }

    #[tokio::test]
    async fn test_city_code_lookup_unknown_is_404() {
        let state = state_with(vec![record("H211")]);

        let err = get_data_by_city_code(State(state), Path("X000".into()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
        assert_eq!(err.1 .0["status"], "error");
    }
}
