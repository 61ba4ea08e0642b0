//! HTTP surface of the lookup service.
//!
//! ## Endpoints
//!
//! - `GET /customer/phone/:phone` - customer by phone number
//! - `GET /customer/contract/:contract_code` - customer by contract code
//! - `GET /customer/{numTec,numAmm,wifiActive,userName}/:contract_code` - one counter by contract code
//! - `GET /phone/{numTec,numAmm,wifiActive,userName}/:phone` - one counter by phone number
//! - `GET /health` - snapshot summary
//! - `GET /` - liveness
//!
//! Both customer endpoints accept `?fields=a,b` to narrow the response.
//! Repeated `fields` parameters are merged. Every error, unknown routes
//! included, answers with a JSON `{"detail": ...}` body.

pub mod error;

use crate::core::lookup::LookupService;
use crate::domain::model::{Counter, CounterReading, Projection};
use crate::utils::error::LookupError;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use error::ApiError;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub type AppState = Arc<LookupService>;

/// Raw query pairs; a struct extractor would reject repeated keys.
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;
type PathParam = Result<Path<String>, PathRejection>;

#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub data: Projection,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub source: String,
    pub records: usize,
    pub indexed_phones: usize,
    pub duplicate_phones: usize,
    pub loaded_at: DateTime<Utc>,
}

pub fn build_router(service: AppState, cors: bool) -> Router {
    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/customer/phone/:phone", get(get_by_phone))
        .route("/customer/contract/:contract_code", get(get_by_contract));

    for counter in Counter::ALL {
        router = router
            .route(
                &format!("/customer/{}/:contract_code", counter.route()),
                get(move |state: State<AppState>, path: PathParam| {
                    counter_by_contract(state, path, counter)
                }),
            )
            .route(
                &format!("/phone/{}/:phone", counter.route()),
                get(move |state: State<AppState>, path: PathParam| {
                    counter_by_phone(state, path, counter)
                }),
            );
    }

    let router = router
        .fallback(error::route_not_found)
        .with_state(service)
        .layer(TraceLayer::new_for_http());

    if cors {
        router.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
    } else {
        router
    }
}

async fn root() -> &'static str {
    "API is running"
}

async fn health(State(service): State<AppState>) -> Json<HealthResponse> {
    let snapshot = service.store().current();
    Json(HealthResponse {
        status: "ok",
        source: snapshot.source().to_string(),
        records: snapshot.len(),
        indexed_phones: snapshot.indexed_phones(),
        duplicate_phones: snapshot.duplicate_phones(),
        loaded_at: snapshot.loaded_at(),
    })
}

/// GET /customer/phone/:phone
async fn get_by_phone(
    State(service): State<AppState>,
    path: PathParam,
    query: QueryPairs,
) -> Result<Json<DataResponse>, ApiError> {
    let phone = path_param(path)?;
    let fields = fields_param(query)?;
    let data = service.find_by_phone(&phone, fields.as_deref())?;
    Ok(Json(DataResponse { data }))
}

/// GET /customer/contract/:contract_code
async fn get_by_contract(
    State(service): State<AppState>,
    path: PathParam,
    query: QueryPairs,
) -> Result<Json<DataResponse>, ApiError> {
    let contract_code = path_param(path)?;
    let fields = fields_param(query)?;
    let data = service.find_by_contract(&contract_code, fields.as_deref())?;
    Ok(Json(DataResponse { data }))
}

async fn counter_by_contract(
    State(service): State<AppState>,
    path: PathParam,
    counter: Counter,
) -> Result<Json<CounterReading>, ApiError> {
    let contract_code = path_param(path)?;
    Ok(Json(service.counter_by_contract(&contract_code, counter)?))
}

async fn counter_by_phone(
    State(service): State<AppState>,
    path: PathParam,
    counter: Counter,
) -> Result<Json<CounterReading>, ApiError> {
    let phone = path_param(path)?;
    Ok(Json(service.counter_by_phone(&phone, counter)?))
}

fn path_param(path: PathParam) -> Result<String, ApiError> {
    let Path(value) = path.map_err(|e| LookupError::InvalidRequest {
        message: e.body_text(),
    })?;
    Ok(value)
}

/// Joins every `fields` value with commas; `None` when the key is absent.
fn fields_param(query: QueryPairs) -> Result<Option<String>, ApiError> {
    let Query(pairs) = query.map_err(|e| LookupError::InvalidRequest {
        message: e.body_text(),
    })?;

    let values: Vec<&str> = pairs
        .iter()
        .filter(|(key, _)| key == "fields")
        .map(|(_, value)| value.as_str())
        .collect();

    if values.is_empty() {
        Ok(None)
    } else {
        Ok(Some(values.join(",")))
    }
}
