// src/handlers/payments.rs
//
// Configuração de formas de pagamento e da tabela de taxas.

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
    models::payment::{PaymentMethod, PaymentMethodPayload, PaymentRate, PaymentRatePayload},
};

// POST /api/payment-methods
#[utoipa::path(
    post,
    path = "/api/payment-methods",
    tag = "Payments",
    request_body = PaymentMethodPayload,
    responses(
        (status = 201, description = "Forma de pagamento criada", body = PaymentMethod),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_method(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Json(payload): Json<PaymentMethodPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let method = app_state.payment_repo
        .create_method(&mut *rls_conn, studio.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(method)))
}

// GET /api/payment-methods
#[utoipa::path(
    get,
    path = "/api/payment-methods",
    tag = "Payments",
    responses(
        (status = 200, description = "Formas de pagamento", body = Vec<PaymentMethod>)
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_methods(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let methods = app_state.payment_repo
        .list_methods(&mut *rls_conn, studio.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(methods)))
}

// PUT /api/payment-methods/{id}
#[utoipa::path(
    put,
    path = "/api/payment-methods/{id}",
    tag = "Payments",
    request_body = PaymentMethodPayload,
    responses(
        (status = 200, description = "Forma de pagamento atualizada", body = PaymentMethod),
        (status = 404, description = "Forma de pagamento não encontrada"),
        (status = 409, description = "Troca de tipo com taxas cadastradas")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID da forma de pagamento")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_method(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(method_id): Path<Uuid>,
    Json(payload): Json<PaymentMethodPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let method = app_state.payment_service
        .update_method(&mut *rls_conn, studio.0, method_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(method)))
}

// DELETE /api/payment-methods/{id}
#[utoipa::path(
    delete,
    path = "/api/payment-methods/{id}",
    tag = "Payments",
    responses(
        (status = 204, description = "Forma de pagamento removida"),
        (status = 409, description = "Forma de pagamento usada em transações")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID da forma de pagamento")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_method(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(method_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state.payment_repo
        .delete_method(&mut *rls_conn, studio.0, method_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/payment-rates
#[utoipa::path(
    post,
    path = "/api/payment-rates",
    tag = "Payments",
    request_body = PaymentRatePayload,
    responses(
        (status = 201, description = "Taxa cadastrada", body = PaymentRate),
        (status = 409, description = "Já existe taxa para essa combinação"),
        (status = 422, description = "Cartão sem bandeira")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_rate(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Json(payload): Json<PaymentRatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // O tipo da taxa é o da forma de pagamento
    let method = app_state.payment_repo
        .get_method(&mut *rls_conn, studio.0, payload.payment_method_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let rate = app_state.payment_repo
        .create_rate(&mut *rls_conn, studio.0, method.kind, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(rate)))
}

// GET /api/payment-rates
#[utoipa::path(
    get,
    path = "/api/payment-rates",
    tag = "Payments",
    responses(
        (status = 200, description = "Tabela de taxas das formas ativas", body = Vec<PaymentRate>)
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_rates(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let rates = app_state.payment_repo
        .list_rates(&mut *rls_conn, studio.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rates)))
}

// DELETE /api/payment-rates/{id}
#[utoipa::path(
    delete,
    path = "/api/payment-rates/{id}",
    tag = "Payments",
    responses(
        (status = 204, description = "Taxa removida"),
        (status = 404, description = "Taxa não encontrada")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID da taxa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_rate(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(rate_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state.payment_repo
        .delete_rate(&mut *rls_conn, studio.0, rate_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
