// src/handlers/commands.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::StudioContext},
    models::command::{AddItemPayload, CommandDetail, CommandQuery, CommandSummary, OpenCommandPayload},
};

// POST /api/commands
#[utoipa::path(
    post,
    path = "/api/commands",
    tag = "Commands",
    request_body = OpenCommandPayload,
    responses(
        (status = 201, description = "Comanda aberta", body = CommandDetail),
        (status = 400, description = "Informe o cliente ou o agendamento"),
        (status = 404, description = "Agendamento não encontrado")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn open_command(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Json(payload): Json<OpenCommandPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state.command_service
        .open_command(&mut *rls_conn, studio.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/commands?status=open
#[utoipa::path(
    get,
    path = "/api/commands",
    tag = "Commands",
    responses(
        (status = 200, description = "Comandas do estúdio", body = Vec<CommandSummary>)
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        CommandQuery
    ),
    security(("api_jwt" = []))
)]
pub async fn list_commands(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Query(query): Query<CommandQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let commands = app_state.command_service
        .list_commands(&mut *rls_conn, studio.0, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(commands)))
}

// GET /api/commands/{id}
#[utoipa::path(
    get,
    path = "/api/commands/{id}",
    tag = "Commands",
    responses(
        (status = 200, description = "Comanda com itens", body = CommandDetail),
        (status = 404, description = "Comanda não encontrada")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID da comanda")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_command(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(command_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state.command_service
        .get_detail(&mut *rls_conn, studio.0, command_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// POST /api/commands/{id}/items
#[utoipa::path(
    post,
    path = "/api/commands/{id}/items",
    tag = "Commands",
    request_body = AddItemPayload,
    responses(
        (status = 201, description = "Item adicionado", body = CommandDetail),
        (status = 409, description = "Comanda já está paga")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID da comanda")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(command_id): Path<Uuid>,
    Json(payload): Json<AddItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state.command_service
        .add_item(&mut *rls_conn, studio.0, command_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// DELETE /api/commands/{id}/items/{item_id}
#[utoipa::path(
    delete,
    path = "/api/commands/{id}/items/{item_id}",
    tag = "Commands",
    responses(
        (status = 200, description = "Item removido", body = CommandDetail),
        (status = 404, description = "Item não encontrado"),
        (status = 409, description = "Comanda já está paga")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID da comanda"),
        ("item_id" = Uuid, Path, description = "ID do item")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path((command_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state.command_service
        .remove_item(&mut *rls_conn, studio.0, command_id, item_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}
