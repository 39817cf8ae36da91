// src/services/agenda_service.rs

use chrono::{DateTime, Duration, Utc};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AgendaRepository, CatalogRepository},
    models::agenda::{AgendaEntry, AgendaRange, Appointment, AppointmentStatus, CreateAppointmentPayload},
};

/// Janela padrão da listagem quando o `to` não é informado.
const DEFAULT_WINDOW_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AgendaService {
    agenda_repo: AgendaRepository,
    catalog_repo: CatalogRepository,
}

/// Fim do atendimento: o informado, ou início + duração do serviço.
pub fn resolve_end(
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
    duration_minutes: i32,
) -> Result<DateTime<Utc>, AppError> {
    let ends_at = ends_at.unwrap_or(starts_at + Duration::minutes(i64::from(duration_minutes)));
    if ends_at <= starts_at {
        return Err(AppError::InvalidPeriod("o término deve ser depois do início".into()));
    }
    Ok(ends_at)
}

/// Intervalo [from, to) da listagem, com os padrões aplicados.
pub fn resolve_window(range: &AgendaRange, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let from = range.from.unwrap_or(now);
    let to = range.to.unwrap_or(from + Duration::days(DEFAULT_WINDOW_DAYS));
    if to <= from {
        return Err(AppError::InvalidPeriod("'to' deve ser depois de 'from'".into()));
    }
    Ok((from, to))
}

impl AgendaService {
    pub fn new(agenda_repo: AgendaRepository, catalog_repo: CatalogRepository) -> Self {
        Self { agenda_repo, catalog_repo }
    }

    /// Agenda um atendimento, recusando sobreposição com outro agendamento ativo
    /// do mesmo profissional.
    pub async fn create_appointment<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        payload: &CreateAppointmentPayload,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let service = self.catalog_repo
            .get_service(&mut *tx, studio_id, payload.service_id)
            .await?;
        let ends_at = resolve_end(payload.starts_at, payload.ends_at, service.duration_minutes)?;

        // Serializa agendamentos do mesmo profissional até o commit
        self.agenda_repo
            .lock_professional_schedule(&mut *tx, payload.professional_id)
            .await?;

        if let Some(conflict) = self.agenda_repo
            .find_conflict(&mut *tx, studio_id, payload.professional_id, payload.starts_at, ends_at, None)
            .await?
        {
            return Err(AppError::AppointmentConflict(conflict));
        }

        let appointment = self.agenda_repo
            .create_appointment(
                &mut *tx,
                studio_id,
                payload.client_id,
                payload.professional_id,
                payload.service_id,
                payload.resource_id,
                payload.starts_at,
                ends_at,
                payload.notes.as_deref(),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(appointment_id = %appointment.id, professional_id = %appointment.professional_id, "Agendamento criado");
        Ok(appointment)
    }

    pub async fn list_agenda<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        range: &AgendaRange,
    ) -> Result<Vec<AgendaEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (from, to) = resolve_window(range, Utc::now())?;
        self.agenda_repo
            .list_range(executor, studio_id, from, to, range.professional_id)
            .await
    }

    pub async fn get_appointment<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.agenda_repo.get_appointment(executor, studio_id, appointment_id).await
    }

    /// Muda o status. Reativar um horário cancelado passa de novo pela checagem de conflito.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self.agenda_repo
            .get_appointment(&mut *tx, studio_id, appointment_id)
            .await?;

        if status.blocks_slot() && !current.status.blocks_slot() {
            self.agenda_repo
                .lock_professional_schedule(&mut *tx, current.professional_id)
                .await?;

            if let Some(conflict) = self.agenda_repo
                .find_conflict(
                    &mut *tx,
                    studio_id,
                    current.professional_id,
                    current.starts_at,
                    current.ends_at,
                    Some(current.id),
                )
                .await?
            {
                return Err(AppError::AppointmentConflict(conflict));
            }
        }

        let updated = self.agenda_repo
            .update_status(&mut *tx, studio_id, appointment_id, status)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 20, hour, minute, 0).unwrap()
    }

    #[test]
    fn end_defaults_to_service_duration() {
        assert_eq!(resolve_end(at(9, 0), None, 90).unwrap(), at(10, 30));
    }

    #[test]
    fn explicit_end_wins_over_duration() {
        assert_eq!(resolve_end(at(9, 0), Some(at(9, 45)), 90).unwrap(), at(9, 45));
    }

    #[test]
    fn end_must_be_after_start() {
        assert!(matches!(resolve_end(at(9, 0), Some(at(9, 0)), 30), Err(AppError::InvalidPeriod(_))));
        assert!(matches!(resolve_end(at(9, 0), Some(at(8, 0)), 30), Err(AppError::InvalidPeriod(_))));
    }

    #[test]
    fn window_defaults_to_a_week() {
        let range = AgendaRange { from: None, to: None, professional_id: None };
        let (from, to) = resolve_window(&range, at(8, 0)).unwrap();
        assert_eq!(from, at(8, 0));
        assert_eq!(to - from, Duration::days(7));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let range = AgendaRange { from: Some(at(12, 0)), to: Some(at(8, 0)), professional_id: None };
        assert!(resolve_window(&range, at(8, 0)).is_err());
    }
}
