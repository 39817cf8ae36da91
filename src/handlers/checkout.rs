// src/handlers/checkout.rs

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
    models::checkout::{CheckoutRequest, CheckoutSummary, FinalizeRequest, FinalizeResponse},
};

// POST /api/commands/{id}/checkout/preview
#[utoipa::path(
    post,
    path = "/api/commands/{id}/checkout/preview",
    tag = "Checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Totais, taxas e restante (nada é gravado)", body = CheckoutSummary),
        (status = 422, description = "Pagamento inválido, acima do restante ou sem taxa cadastrada")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID da comanda")
    ),
    security(("api_jwt" = []))
)]
pub async fn preview(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(command_id): Path<Uuid>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state.checkout_service
        .preview(&mut *rls_conn, studio.0, command_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// POST /api/commands/{id}/checkout
#[utoipa::path(
    post,
    path = "/api/commands/{id}/checkout",
    tag = "Checkout",
    request_body = FinalizeRequest,
    responses(
        (status = 200, description = "Comanda paga (ou fechamento repetido pela mesma chave)", body = FinalizeResponse),
        (status = 409, description = "Comanda não está aberta"),
        (status = 422, description = "Pagamentos não fecham o total"),
        (status = 500, description = "Falha ao registrar um pagamento; nada foi gravado")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID da comanda")
    ),
    security(("api_jwt" = []))
)]
pub async fn finalize(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(command_id): Path<Uuid>,
    Json(payload): Json<FinalizeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state.checkout_service
        .finalize(&mut *rls_conn, studio.0, command_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}
