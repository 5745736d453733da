//! Point forecast handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use forecast_common::{render_table, Coordinate, ForecastError};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::state::AppState;

/// Query parameters for the forecast endpoint.
///
/// Both are kept as raw strings so that missing and malformed values get
/// the same JSON error body as out-of-range ones.
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub lon: Option<String>,
    pub lat: Option<String>,
}

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

/// GET /forecast?lon=..&lat=..
pub async fn forecast_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ForecastQuery>,
) -> Response {
    let coord = match Coordinate::parse(params.lon.as_deref(), params.lat.as_deref()) {
        Ok(coord) => coord,
        Err(e) => {
            debug!(error = %e, "Rejected forecast request");
            counter!("forecast_requests_total", "outcome" => "bad_request").increment(1);
            return error_response(&e);
        }
    };

    match state.engine.forecast(coord).await {
        Ok(points) => {
            debug!("\n{}", render_table(&coord, &points));
            counter!("forecast_requests_total", "outcome" => "ok").increment(1);
            Json(points).into_response()
        }
        Err(e) => {
            error!(lon = coord.lon, lat = coord.lat, error = %e, "Forecast query failed");
            counter!("forecast_requests_total", "outcome" => "error").increment(1);
            error_response(&ForecastError::from(e))
        }
    }
}

pub fn error_response(err: &ForecastError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorBody {
        error: err.to_string(),
        status: status.as_u16(),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_status() {
        let response = error_response(&ForecastError::MissingParameter("lat".to_string()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = error_response(&ForecastError::DataReadError("boom".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
