// src/handlers/payroll.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{db_utils::get_rls_connection, error::ApiError, period::MonthPeriod},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::StudioContext},
    models::payroll::{CommissionReport, PayrollQuery},
};

// GET /api/payroll/commissions?month=2026-10&basis=transaction
#[utoipa::path(
    get,
    path = "/api/payroll/commissions",
    tag = "Payroll",
    responses(
        (status = 200, description = "Comissão por profissional no mês", body = CommissionReport),
        (status = 422, description = "Mês inválido")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        PayrollQuery
    ),
    security(("api_jwt" = []))
)]
pub async fn commissions(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Query(query): Query<PayrollQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = MonthPeriod::from_query(query.month.as_deref())
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let report = app_state.payroll_service
        .commission_report(&mut *rls_conn, studio.0, &period, query.basis.unwrap_or_default())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}
