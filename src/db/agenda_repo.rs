// src/db/agenda_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::agenda::{AgendaEntry, Appointment, AppointmentStatus},
};

const APPOINTMENT_COLUMNS: &str = "id, studio_id, client_id, professional_id, service_id, resource_id, \
     starts_at, ends_at, status, notes, created_at";

/// Sem estado: cada método recebe o executor (conexão RLS ou transação).
#[derive(Clone, Default)]
pub struct AgendaRepository;

impl AgendaRepository {
    pub fn new() -> Self {
        Self
    }

    /// Trava de transação por profissional: dois agendamentos simultâneos para a
    /// mesma pessoa não passam juntos pela checagem de conflito.
    pub async fn lock_professional_schedule<'e, E>(&self, executor: E, professional_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(professional_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Procura um agendamento ativo do profissional que se sobreponha a [starts_at, ends_at).
    pub async fn find_conflict<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        professional_id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        ignore_id: Option<Uuid>,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let conflict: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM appointments
            WHERE studio_id = $1
              AND professional_id = $2
              AND status NOT IN ('cancelled', 'no_show')
              AND starts_at < $4 AND ends_at > $3
              AND ($5::uuid IS NULL OR id <> $5)
            ORDER BY starts_at ASC
            LIMIT 1
            "#,
        )
            .bind(studio_id)
            .bind(professional_id)
            .bind(starts_at)
            .bind(ends_at)
            .bind(ignore_id)
            .fetch_optional(executor)
            .await?;

        Ok(conflict)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_appointment<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        client_id: Uuid,
        professional_id: Uuid,
        service_id: Uuid,
        resource_id: Option<Uuid>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO appointments (
                studio_id, client_id, professional_id, service_id, resource_id,
                starts_at, ends_at, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        );
        let appointment = sqlx::query_as::<_, Appointment>(&sql)
            .bind(studio_id)
            .bind(client_id)
            .bind(professional_id)
            .bind(service_id)
            .bind(resource_id)
            .bind(starts_at)
            .bind(ends_at)
            .bind(notes)
            .fetch_one(executor)
            .await
            .map_err(|e| map_constraint_error(e, "agendamento"))?;

        Ok(appointment)
    }

    pub async fn list_range<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        professional_id: Option<Uuid>,
    ) -> Result<Vec<AgendaEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, AgendaEntry>(
            r#"
            SELECT
                a.id, a.studio_id, a.client_id, a.professional_id, a.service_id, a.resource_id,
                a.starts_at, a.ends_at, a.status, a.notes, a.created_at,
                c.full_name AS client_name,
                p.full_name AS professional_name,
                s.name AS service_name
            FROM appointments a
            JOIN clients c ON c.id = a.client_id
            JOIN professionals p ON p.id = a.professional_id
            JOIN services s ON s.id = a.service_id
            WHERE a.studio_id = $1
              AND a.starts_at >= $2 AND a.starts_at < $3
              AND ($4::uuid IS NULL OR a.professional_id = $4)
            ORDER BY a.starts_at ASC
            "#,
        )
            .bind(studio_id)
            .bind(from)
            .bind(to)
            .bind(professional_id)
            .fetch_all(executor)
            .await?;

        Ok(entries)
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
        let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE studio_id = $1 AND id = $2");
        sqlx::query_as::<_, Appointment>(&sql)
            .bind(studio_id)
            .bind(appointment_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Agendamento {appointment_id}")))
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE appointments SET status = $3 WHERE studio_id = $1 AND id = $2 RETURNING {APPOINTMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Appointment>(&sql)
            .bind(studio_id)
            .bind(appointment_id)
            .bind(status)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Agendamento {appointment_id}")))
    }
}
