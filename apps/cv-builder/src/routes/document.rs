//! Form edits. Every handler returns the whole updated document so the form and preview
//! redraw from one value.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Document, EntryField, ListKind, PersonalField};
use crate::orchestrator::SessionSnapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PersonalEdit {
    pub field: PersonalField,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryEdit {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct EntryEdit {
    pub field: String,
    pub value: String,
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot())
}

/// PATCH /api/v1/document/personal
pub async fn handle_set_personal(
    State(state): State<AppState>,
    Json(edit): Json<PersonalEdit>,
) -> Json<Document> {
    Json((*state.session.set_personal_field(edit.field, &edit.value)).clone())
}

/// PUT /api/v1/document/summary
pub async fn handle_set_summary(
    State(state): State<AppState>,
    Json(edit): Json<SummaryEdit>,
) -> Json<Document> {
    Json((*state.session.set_summary(&edit.value)).clone())
}

/// POST /api/v1/document/:list
pub async fn handle_add_entry(
    State(state): State<AppState>,
    Path(list): Path<ListKind>,
) -> (StatusCode, Json<Document>) {
    let doc = state.session.add_entry(list);
    (StatusCode::CREATED, Json((*doc).clone()))
}

/// PATCH /api/v1/document/:list/:index
pub async fn handle_set_entry_field(
    State(state): State<AppState>,
    Path((list, index)): Path<(ListKind, usize)>,
    Json(edit): Json<EntryEdit>,
) -> Result<Json<Document>, AppError> {
    let field = EntryField::parse(list, &edit.field).ok_or_else(|| {
        AppError::Validation(format!("{list} entries have no field '{}'", edit.field))
    })?;
    let doc = state.session.set_entry_field(index, field, &edit.value)?;
    Ok(Json((*doc).clone()))
}

/// DELETE /api/v1/document/:list/:index
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path((list, index)): Path<(ListKind, usize)>,
) -> Result<Json<Document>, AppError> {
    let doc = state.session.remove_entry(list, index)?;
    Ok(Json((*doc).clone()))
}
