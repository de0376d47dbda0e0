//! Grid-products route handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cartwheel_core::GridSection;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Maximum number of sections accepted in one grid document.
const MAX_SECTIONS: usize = 16;

/// Grid request/response envelope: `{ "sections": [...] }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct GridEnvelope {
    #[serde(default)]
    pub sections: Vec<GridSection>,
}

/// Response body for a successful save.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
}

/// Build the grid-products router.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/admin/grid-products",
        get(get_sections).post(set_sections),
    )
}

/// Return the configured grid sections (empty when never configured).
#[instrument(skip(state))]
async fn get_sections(State(state): State<AppState>) -> Json<GridEnvelope> {
    Json(GridEnvelope {
        sections: state.store().sections(),
    })
}

/// Replace the grid sections, persisting before responding.
#[instrument(skip(state, body), fields(sections = body.sections.len()))]
async fn set_sections(
    State(state): State<AppState>,
    Json(body): Json<GridEnvelope>,
) -> Result<Json<SaveResponse>> {
    if body.sections.len() > MAX_SECTIONS {
        return Err(AppError::BadRequest(format!(
            "at most {MAX_SECTIONS} sections allowed"
        )));
    }

    state.store().replace(body.sections)?;
    tracing::info!("Grid sections updated");

    Ok(Json(SaveResponse { success: true }))
}
