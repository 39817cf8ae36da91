// src/handlers/professionals.rs

use axum::{
    extract::{Path, State},
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
    models::professional::{Professional, ProfessionalPayload},
};

// POST /api/professionals
#[utoipa::path(
    post,
    path = "/api/professionals",
    tag = "Professionals",
    request_body = ProfessionalPayload,
    responses(
        (status = 201, description = "Profissional criado", body = Professional),
        (status = 400, description = "Dados inválidos (comissão entre 0 e 100)")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_professional(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Json(payload): Json<ProfessionalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let professional = app_state.professional_repo
        .create_professional(&mut *rls_conn, studio.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(professional)))
}

// GET /api/professionals
#[utoipa::path(
    get,
    path = "/api/professionals",
    tag = "Professionals",
    responses(
        (status = 200, description = "Profissionais do estúdio", body = Vec<Professional>)
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_professionals(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let professionals = app_state.professional_repo
        .list_professionals(&mut *rls_conn, studio.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(professionals)))
}

// PUT /api/professionals/{id}
#[utoipa::path(
    put,
    path = "/api/professionals/{id}",
    tag = "Professionals",
    request_body = ProfessionalPayload,
    responses(
        (status = 200, description = "Profissional atualizado", body = Professional),
        (status = 404, description = "Profissional não encontrado")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID do profissional")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_professional(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(professional_id): Path<Uuid>,
    Json(payload): Json<ProfessionalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let professional = app_state.professional_repo
        .update_professional(&mut *rls_conn, studio.0, professional_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(professional)))
}

// DELETE /api/professionals/{id}
#[utoipa::path(
    delete,
    path = "/api/professionals/{id}",
    tag = "Professionals",
    responses(
        (status = 204, description = "Profissional removido"),
        (status = 409, description = "Profissional com agendamentos ou vendas")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID do profissional")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_professional(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(professional_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state.professional_repo
        .delete_professional(&mut *rls_conn, studio.0, professional_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
