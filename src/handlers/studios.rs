// src/handlers/studios.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::StudioContext},
    models::studio::{CreateStudioPayload, MyStudio, Studio, UpdateStudioPayload},
};

// POST /api/studios
#[utoipa::path(
    post,
    path = "/api/studios",
    tag = "Studios",
    request_body = CreateStudioPayload,
    responses(
        (status = 201, description = "Estúdio criado; o usuário vira dono", body = Studio),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Já existe um estúdio seu com esse nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_studio(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateStudioPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let studio = app_state.studio_service
        .create_studio_with_owner(&payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(studio)))
}

// GET /api/studios
#[utoipa::path(
    get,
    path = "/api/studios",
    tag = "Studios",
    responses(
        (status = 200, description = "Estúdios do usuário logado", body = Vec<MyStudio>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_studios(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let studios = app_state.studio_service
        .list_user_studios(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(studios)))
}

// GET /api/studio
#[utoipa::path(
    get,
    path = "/api/studio",
    tag = "Studios",
    responses(
        (status = 200, description = "Dados do estúdio ativo", body = Studio),
        (status = 403, description = "Usuário não é membro do estúdio")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let profile = app_state.studio_service
        .get_studio(&mut *rls_conn, studio.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(profile)))
}

// PUT /api/studio
#[utoipa::path(
    put,
    path = "/api/studio",
    tag = "Studios",
    request_body = UpdateStudioPayload,
    responses(
        (status = 200, description = "Estúdio atualizado", body = Studio),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Json(payload): Json<UpdateStudioPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let profile = app_state.studio_service
        .update_studio(&mut *rls_conn, studio.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(profile)))
}
