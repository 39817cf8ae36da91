// src/handlers/agenda.rs

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
    models::agenda::{AgendaEntry, AgendaRange, Appointment, CreateAppointmentPayload, UpdateAppointmentStatusPayload},
};

// POST /api/appointments
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Agenda",
    request_body = CreateAppointmentPayload,
    responses(
        (status = 201, description = "Agendamento criado", body = Appointment),
        (status = 409, description = "Profissional já ocupado no horário"),
        (status = 422, description = "Término antes do início")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_appointment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Json(payload): Json<CreateAppointmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let appointment = app_state.agenda_service
        .create_appointment(&mut *rls_conn, studio.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

// GET /api/appointments?from=&to=&professional_id=
#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Agenda",
    responses(
        (status = 200, description = "Agenda do período", body = Vec<AgendaEntry>)
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        AgendaRange
    ),
    security(("api_jwt" = []))
)]
pub async fn list_appointments(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Query(range): Query<AgendaRange>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let entries = app_state.agenda_service
        .list_agenda(&mut *rls_conn, studio.0, &range)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entries)))
}

// PATCH /api/appointments/{id}/status
#[utoipa::path(
    patch,
    path = "/api/appointments/{id}/status",
    tag = "Agenda",
    request_body = UpdateAppointmentStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Appointment),
        (status = 404, description = "Agendamento não encontrado"),
        (status = 409, description = "Reativação conflita com outro horário")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID do agendamento")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_appointment_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(appointment_id): Path<Uuid>,
    Json(payload): Json<UpdateAppointmentStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let appointment = app_state.agenda_service
        .update_status(&mut *rls_conn, studio.0, appointment_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(appointment)))
}
