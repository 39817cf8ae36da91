// src/handlers/finance.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::{ApiError, AppError},
        period::MonthPeriod,
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::StudioContext},
    models::finance::{FinanceQuery, FinanceSummary, FinancialTransaction, ManualTransactionPayload},
};

// GET /api/finance/transactions?month=2026-10&type=income
#[utoipa::path(
    get,
    path = "/api/finance/transactions",
    tag = "Finance",
    responses(
        (status = 200, description = "Transações do mês", body = Vec<FinancialTransaction>),
        (status = 422, description = "Mês inválido")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        FinanceQuery
    ),
    security(("api_jwt" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Query(query): Query<FinanceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = MonthPeriod::from_query(query.month.as_deref())
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let transactions = app_state.finance_service
        .list_transactions(&mut *rls_conn, studio.0, &period, query.transaction_type)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(transactions)))
}

// GET /api/finance/summary?month=2026-10
#[utoipa::path(
    get,
    path = "/api/finance/summary",
    tag = "Finance",
    responses(
        (status = 200, description = "Entradas, saídas, taxas e saldo do mês", body = FinanceSummary),
        (status = 422, description = "Mês inválido")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        FinanceQuery
    ),
    security(("api_jwt" = []))
)]
pub async fn month_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Query(query): Query<FinanceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = MonthPeriod::from_query(query.month.as_deref())
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state.finance_service
        .month_summary(&mut *rls_conn, studio.0, &period)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// POST /api/finance/transactions
#[utoipa::path(
    post,
    path = "/api/finance/transactions",
    tag = "Finance",
    request_body = ManualTransactionPayload,
    responses(
        (status = 201, description = "Lançamento registrado", body = FinancialTransaction),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_transaction(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Json(payload): Json<ManualTransactionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let transaction = app_state.finance_service
        .record_manual(&mut *rls_conn, studio.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
